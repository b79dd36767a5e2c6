//! Error types for offload-core operations

use offload_backends::{BackendError, DType, DeviceId};

/// Result type for offload-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by arrays, streams and devices
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A required argument is missing or out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operand shapes differ, or a reshape changes the total size
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Element types differ from the array's declared type
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: DType, actual: DType },

    /// Operands or streams belong to different devices
    #[error("Device mismatch: expected {expected}, got {actual}")]
    DeviceMismatch { expected: DeviceId, actual: DeviceId },

    /// Operation not defined for this element type or rank
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// A command referenced a device buffer that was already released
    #[error("Use after free: {0}")]
    UseAfterFree(String),

    /// Failure reported by the device backend
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// The stream's worker is no longer running
    #[error("Stream closed")]
    StreamClosed,
}

impl Error {
    pub(crate) fn type_mismatch(expected: DType, actual: DType) -> Self {
        Self::TypeMismatch { expected, actual }
    }

    pub(crate) fn device_mismatch(expected: DeviceId, actual: DeviceId) -> Self {
        Self::DeviceMismatch { expected, actual }
    }

    /// Map a backend failure, treating unknown buffers as use-after-free
    pub(crate) fn from_backend(err: BackendError, context: &str) -> Self {
        match err {
            BackendError::InvalidBufferHandle(id) => Self::UseAfterFree(format!("{context}: buffer buf{id} is not live")),
            other => Self::Backend(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_handle_maps_to_use_after_free() {
        let err = Error::from_backend(BackendError::InvalidBufferHandle(3), "release");
        assert_eq!(err, Error::UseAfterFree("release: buffer buf3 is not live".into()));
    }

    #[test]
    fn test_other_backend_errors_are_wrapped() {
        let err = Error::from_backend(BackendError::execution("boom"), "launch");
        assert_eq!(err, Error::Backend(BackendError::execution("boom")));

        let converted: Error = BackendError::KernelNotFound("x".into()).into();
        assert!(matches!(converted, Error::Backend(BackendError::KernelNotFound(_))));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::type_mismatch(DType::I32, DType::F64).to_string(),
            "Type mismatch: expected i32, got f64"
        );
        assert_eq!(
            Error::device_mismatch(DeviceId::new(0), DeviceId::new(1)).to_string(),
            "Device mismatch: expected dev0, got dev1"
        );
    }
}
