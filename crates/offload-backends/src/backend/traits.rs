//! Backend trait for device memory and kernel launch
//!
//! A backend is one accelerator's memory plus the ability to run entry points
//! from a [`KernelLibrary`](crate::kernels::KernelLibrary) against it.

use super::types::BufferHandle;
use crate::error::Result;
use crate::kernels::{KernelArg, KernelEntry};
use std::any::Any;

/// Device memory and execution for one accelerator
///
/// ```text
///        Stream worker
///             │  allocate / copy / launch / free
///             ▼
///   ┌───────────────────┐
///   │   Backend trait   │
///   └─────────┬─────────┘
///             ▼
///       ┌──────────┐
///       │   CPU    │   (emulated accelerator)
///       │ Backend  │
///       └──────────┘
/// ```
///
/// # Usage
///
/// ```rust
/// use offload_backends::{Backend, CpuBackend};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut backend = CpuBackend::new();
///
/// let buffer = backend.allocate_buffer(16)?;
/// let data = vec![1.0f32, 2.0, 3.0, 4.0];
/// backend.copy_to_buffer(buffer, bytemuck::cast_slice(&data))?;
///
/// let mut results = vec![0.0f32; 4];
/// backend.copy_from_buffer(buffer, bytemuck::cast_slice_mut(&mut results))?;
/// assert_eq!(results, data);
///
/// backend.free_buffer(buffer)?;
/// # Ok(())
/// # }
/// ```
pub trait Backend {
    /// Allocate a zero-filled buffer of `size` bytes
    fn allocate_buffer(&mut self, size: usize) -> Result<BufferHandle>;

    /// Free a previously allocated buffer
    ///
    /// # Errors
    ///
    /// Returns `InvalidBufferHandle` if the buffer is unknown, including when
    /// it has already been freed.
    fn free_buffer(&mut self, handle: BufferHandle) -> Result<()>;

    /// Copy `data` from the host into the start of the buffer
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is invalid or `data` is larger than
    /// the buffer.
    fn copy_to_buffer(&mut self, handle: BufferHandle, data: &[u8]) -> Result<()>;

    /// Copy the start of the buffer into `data`
    fn copy_from_buffer(&self, handle: BufferHandle, data: &mut [u8]) -> Result<()>;

    /// Size of the buffer in bytes
    fn buffer_size(&self, handle: BufferHandle) -> Result<usize>;

    /// Number of buffers currently allocated
    fn live_buffer_count(&self) -> usize;

    /// Run a kernel entry point with positional arguments
    fn launch(&mut self, kernel: &KernelEntry, args: &[KernelArg]) -> Result<()>;

    /// Downcasting hook for backend-specific access
    fn as_any(&self) -> &dyn Any;
}
