//! Device-mirrored arrays
//!
//! An [`OffloadArray`] is a host mirror paired with a buffer on one device.
//! Arithmetic runs on the device through the array's stream; data moves
//! between the two copies only through [`OffloadArray::update_device`] and
//! [`OffloadArray::update_host`].
//!
//! Owners allocate and release device storage. Views produced by
//! [`OffloadArray::reshape`] borrow their owner, share its buffer and mirror,
//! and release nothing.

use crate::device::Device;
use crate::dispatch::{BinaryDispatch, DispatchOperand};
use crate::error::{Error, Result};
use crate::host::{HostArray, HostMirror};
use crate::operand::Operand;
use crate::shape::{IntoShape, Layout, Shape};
use crate::stream::Stream;
use ndarray::{ArrayD, IxDyn, ShapeBuilder};
use offload_backends::{BufferHandle, DType, Element, KernelArg, KernelLibrary, Scalar};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

const KERNEL_ADD: &str = "offload_array_add";
const KERNEL_SUB: &str = "offload_array_sub";
const KERNEL_MUL: &str = "offload_array_mul";
const KERNEL_POW: &str = "offload_array_pow";
const KERNEL_ABS: &str = "offload_array_abs";
const KERNEL_FILL: &str = "offload_array_fill";
const KERNEL_REVERSE: &str = "offload_array_reverse";
const KERNEL_SETSLICE: &str = "offload_array_setslice";

enum Ownership<'a> {
    /// Allocated the device buffer and releases it on drop
    Owner,
    /// Shares the root owner's storage
    View(&'a OffloadArray<'a>),
    /// Release already enqueued
    Released,
}

/// An array that owns its device storage
pub type OwnedArray = OffloadArray<'static>;

/// Numeric array mirrored between host memory and one device
///
/// ```rust
/// use offload_core::{DType, Device, DeviceId};
///
/// # fn main() -> offload_core::Result<()> {
/// let device = Device::cpu(DeviceId::new(0));
/// let stream = device.stream()?;
///
/// let a = stream.bind(&vec![1.0f64, 2.0, 3.0])?;
/// let b = a.add(10.0f64)?.mul(&a)?;
/// b.update_host()?;
/// assert_eq!(b.to_vec::<f64>()?, vec![11.0, 24.0, 39.0]);
/// # Ok(())
/// # }
/// ```
///
/// Arrays are not hashable; compare storage with [`OffloadArray::same_storage`].
///
/// ```compile_fail
/// use offload_core::{DType, Device, DeviceId};
/// use std::collections::HashSet;
///
/// let device = Device::cpu(DeviceId::new(0));
/// let stream = device.stream().unwrap();
/// let mut set = HashSet::new();
/// set.insert(stream.zeros(4, DType::F32).unwrap());
/// ```
pub struct OffloadArray<'a> {
    shape: Shape,
    dtype: DType,
    layout: Layout,
    host: Arc<HostMirror>,
    buffer: BufferHandle,
    device: Device,
    stream: Stream,
    library: Arc<KernelLibrary>,
    ownership: Ownership<'a>,
}

/// Factory for owning arrays
///
/// ```rust
/// use offload_core::{ArrayBuilder, DType, Device, DeviceId, Layout};
///
/// # fn main() -> offload_core::Result<()> {
/// let device = Device::cpu(DeviceId::new(0));
/// let stream = device.stream()?;
/// let a = ArrayBuilder::new([2, 3], DType::I32)
///     .layout(Layout::ColumnMajor)
///     .device(&device)
///     .stream(&stream)
///     .build()?;
/// assert_eq!(a.nbytes(), 24);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ArrayBuilder {
    shape: Result<Shape>,
    dtype: DType,
    layout: Layout,
    device: Option<Device>,
    stream: Option<Stream>,
}

impl ArrayBuilder {
    pub fn new(shape: impl IntoShape, dtype: DType) -> Self {
        Self {
            shape: shape.into_shape(),
            dtype,
            layout: Layout::default(),
            device: None,
            stream: None,
        }
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn device(mut self, device: &Device) -> Self {
        self.device = Some(device.clone());
        self
    }

    pub fn stream(mut self, stream: &Stream) -> Self {
        self.stream = Some(stream.clone());
        self
    }

    /// Allocate the host mirror and the paired device buffer
    pub fn build(self) -> Result<OwnedArray> {
        let shape = self.shape?;
        let device = self
            .device
            .ok_or_else(|| Error::InvalidArgument("an array needs a device".into()))?;
        let stream = self
            .stream
            .ok_or_else(|| Error::InvalidArgument("an array needs a stream".into()))?;
        if stream.device() != &device {
            return Err(Error::device_mismatch(device.id(), stream.device().id()));
        }

        let start = Instant::now();
        let nbytes = shape.size().checked_mul(self.dtype.size_bytes()).ok_or_else(|| {
            Error::InvalidArgument(format!("byte size of a {} array of shape {shape} overflows usize", self.dtype))
        })?;
        let host = Arc::new(HostMirror::zeroed(nbytes));
        let buffer = stream.allocate_buffer(&host)?;

        tracing::debug!(
            device = %device.id(),
            stream = stream.id(),
            buffer = %buffer,
            shape = %shape,
            dtype = %self.dtype,
            bytes = nbytes,
            duration_us = start.elapsed().as_micros() as u64,
            "array_allocated"
        );

        Ok(OffloadArray {
            shape,
            dtype: self.dtype,
            layout: self.layout,
            host,
            buffer,
            library: Arc::clone(device.library()),
            device,
            stream,
            ownership: Ownership::Owner,
        })
    }
}

impl<'a> OffloadArray<'a> {
    // ============================================================================================
    // Metadata
    // ============================================================================================

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn size(&self) -> usize {
        self.shape.size()
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Bytes of device (and host) storage
    pub fn nbytes(&self) -> usize {
        self.size() * self.dtype.size_bytes()
    }

    /// Extent of the first axis, or 1 for rank-0 arrays
    pub fn len(&self) -> usize {
        self.shape.dims().first().copied().unwrap_or(1)
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn is_view(&self) -> bool {
        matches!(self.ownership, Ownership::View(_))
    }

    /// The owner whose storage this view shares, `None` for owners
    pub fn base(&self) -> Option<&OffloadArray<'a>> {
        match self.ownership {
            Ownership::View(base) => Some(base),
            _ => None,
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    /// Both handles address the same device buffer
    pub fn same_storage(&self, other: &OffloadArray<'_>) -> bool {
        self.device == other.device && self.buffer == other.buffer
    }

    pub(crate) fn host_mirror(&self) -> &Arc<HostMirror> {
        &self.host
    }

    // ============================================================================================
    // Host / Device Synchronization
    // ============================================================================================

    /// Enqueue a copy of the host mirror to the device
    pub fn update_device(&self) -> Result<&Self> {
        self.stream.update_on_target(self.buffer, &self.host)?;
        Ok(self)
    }

    /// Copy device data into the host mirror and wait for it
    ///
    /// Errors recorded by earlier asynchronous commands on the stream are
    /// returned here.
    #[tracing::instrument(skip(self), fields(buffer = %self.buffer, bytes = self.nbytes()))]
    pub fn update_host(&self) -> Result<&Self> {
        self.stream.update_on_host(self.buffer, &self.host)?;
        self.stream.synchronize()?;
        Ok(self)
    }

    /// Rebind to another stream on the same device
    ///
    /// Outstanding work on the old stream is not waited for.
    pub fn assign_stream(&mut self, stream: &Stream) -> Result<&mut Self> {
        if stream.device() != &self.device {
            return Err(Error::device_mismatch(self.device.id(), stream.device().id()));
        }
        tracing::debug!(buffer = %self.buffer, from = self.stream.id(), to = stream.id(), "stream_reassigned");
        self.stream = stream.clone();
        Ok(self)
    }

    /// Host mirror contents as elements of `T`
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        if T::DTYPE != self.dtype {
            return Err(Error::type_mismatch(self.dtype, T::DTYPE));
        }
        Ok(self.host.to_vec())
    }

    /// Host mirror contents as an `ndarray` of this array's shape
    pub fn to_ndarray<T: Element>(&self) -> Result<ArrayD<T>> {
        let values = self.to_vec::<T>()?;
        let dims = IxDyn(self.shape.dims());
        let array = match self.layout {
            Layout::RowMajor => ArrayD::from_shape_vec(dims, values),
            Layout::ColumnMajor => ArrayD::from_shape_vec(dims.f(), values),
        };
        array.map_err(|e| Error::ShapeMismatch(e.to_string()))
    }

    /// Raw host mirror bytes in this array's layout
    pub fn host_bytes(&self) -> Vec<u8> {
        self.host.snapshot()
    }

    // ============================================================================================
    // Element-wise Arithmetic
    // ============================================================================================

    /// `self + other` into a new array
    pub fn add<'o>(&self, other: impl Into<Operand<'o>>) -> Result<OwnedArray> {
        self.binary(KERNEL_ADD, other.into())
    }

    /// `self - other` into a new array
    pub fn sub<'o>(&self, other: impl Into<Operand<'o>>) -> Result<OwnedArray> {
        self.binary(KERNEL_SUB, other.into())
    }

    /// `self * other` into a new array
    pub fn mul<'o>(&self, other: impl Into<Operand<'o>>) -> Result<OwnedArray> {
        self.binary(KERNEL_MUL, other.into())
    }

    /// `self ** other` into a new array
    pub fn pow<'o>(&self, other: impl Into<Operand<'o>>) -> Result<OwnedArray> {
        self.binary(KERNEL_POW, other.into())
    }

    fn binary(&self, kernel: &'static str, other: Operand<'_>) -> Result<OwnedArray> {
        self.check_operand(&other)?;
        let entry = self.library.get(kernel)?;
        let result = self.allocate(self.dtype)?;

        let mut transient = None;
        let right = match other {
            Operand::Array(array) => DispatchOperand::Buffer(array.buffer),
            Operand::Host(host) => {
                let bound = transient.insert(self.stream.bind_with_layout(host, self.layout)?);
                DispatchOperand::Buffer(bound.buffer)
            }
            Operand::Scalar(value) => DispatchOperand::Broadcast(value),
        };

        let dispatch = BinaryDispatch::new(self.dtype, self.size(), self.buffer, right, result.buffer);
        tracing::debug!(
            kernel,
            dtype = %self.dtype,
            elements = self.size(),
            operand = other.kind(),
            stride = right.stride(),
            "binary_dispatch"
        );
        self.stream.invoke(&entry, dispatch.to_args())?;
        drop(transient);
        Ok(result)
    }

    fn check_operand(&self, other: &Operand<'_>) -> Result<()> {
        match other {
            Operand::Array(array) => {
                if array.device != self.device {
                    return Err(Error::device_mismatch(self.device.id(), array.device.id()));
                }
                if array.shape != self.shape {
                    return Err(Error::ShapeMismatch(format!(
                        "operand shape {} does not match {}",
                        array.shape, self.shape
                    )));
                }
                if array.layout != self.layout {
                    return Err(Error::ShapeMismatch(format!(
                        "operand layout {:?} does not match {:?}",
                        array.layout, self.layout
                    )));
                }
            }
            Operand::Host(host) => {
                let dims = host.dims();
                if dims.as_slice() != self.shape.dims() {
                    return Err(Error::ShapeMismatch(format!(
                        "host operand shape {dims:?} does not match {}",
                        self.shape
                    )));
                }
            }
            Operand::Scalar(_) => {}
        }

        if other.dtype() != self.dtype {
            return Err(Error::type_mismatch(self.dtype, other.dtype()));
        }
        Ok(())
    }

    fn allocate(&self, dtype: DType) -> Result<OwnedArray> {
        ArrayBuilder::new(&self.shape, dtype)
            .layout(self.layout)
            .device(&self.device)
            .stream(&self.stream)
            .build()
    }

    // ============================================================================================
    // Mutation
    // ============================================================================================

    /// Set every element on the device to `value`
    pub fn fill(&mut self, value: impl Into<Scalar>) -> Result<&mut Self> {
        let value = value.into();
        if value.dtype() != self.dtype {
            return Err(Error::type_mismatch(self.dtype, value.dtype()));
        }

        let entry = self.library.get(KERNEL_FILL)?;
        self.stream.invoke(
            &entry,
            vec![
                KernelArg::dtype(self.dtype),
                KernelArg::Count(self.size()),
                KernelArg::Buffer(self.buffer),
                KernelArg::Scalar(value),
            ],
        )?;
        Ok(self)
    }

    /// Fill with the additive identity of the dtype
    pub fn zero(&mut self) -> Result<&mut Self> {
        self.fill(Scalar::zero(self.dtype))
    }

    /// Fill with the multiplicative identity of the dtype
    pub fn one(&mut self) -> Result<&mut Self> {
        self.fill(Scalar::one(self.dtype))
    }

    /// Copy a host array into the mirror and on to the device
    pub fn fill_from(&mut self, source: &(impl HostArray + ?Sized)) -> Result<&mut Self> {
        let dims = source.dims();
        if dims.as_slice() != self.shape.dims() {
            return Err(Error::ShapeMismatch(format!(
                "source shape {dims:?} does not match {}",
                self.shape
            )));
        }
        if source.dtype() != self.dtype {
            return Err(Error::type_mismatch(self.dtype, source.dtype()));
        }

        self.host.write(&source.to_bytes(self.layout));
        self.update_device()?;
        Ok(self)
    }

    /// Assign `source` to the flat element range `range`
    ///
    /// Bounds are clamped to the array size. A scalar source fills the whole
    /// array. Array and host sources must hold exactly as many elements as the
    /// clamped range.
    pub fn set_slice<'o>(&mut self, range: Range<usize>, source: impl Into<Operand<'o>>) -> Result<&mut Self> {
        let source = source.into();
        if let Operand::Scalar(value) = source {
            return self.fill(value);
        }
        if source.dtype() != self.dtype {
            return Err(Error::type_mismatch(self.dtype, source.dtype()));
        }

        let size = self.size();
        let lb = range.start.min(size);
        let ub = range.end.min(size);
        if lb >= ub {
            return Ok(self);
        }

        let expected = ub - lb;
        let actual = match source {
            Operand::Array(array) => {
                if array.device != self.device {
                    return Err(Error::device_mismatch(self.device.id(), array.device.id()));
                }
                array.size()
            }
            Operand::Host(host) => host.len(),
            Operand::Scalar(_) => expected,
        };
        if actual != expected {
            return Err(Error::ShapeMismatch(format!(
                "cannot assign {actual} elements to range {lb}..{ub} of length {expected}"
            )));
        }

        let entry = self.library.get(KERNEL_SETSLICE)?;
        let mut transient = None;
        let src = match source {
            Operand::Array(array) => array.buffer,
            Operand::Host(host) => transient.insert(self.stream.bind_with_layout(host, self.layout)?).buffer,
            Operand::Scalar(_) => return Ok(self),
        };

        self.stream.invoke(
            &entry,
            vec![
                KernelArg::dtype(self.dtype),
                KernelArg::Count(lb),
                KernelArg::Count(ub),
                KernelArg::Buffer(self.buffer),
                KernelArg::Buffer(src),
            ],
        )?;
        drop(transient);
        Ok(self)
    }

    // ============================================================================================
    // Unary
    // ============================================================================================

    /// Element-wise magnitude into a new array
    ///
    /// Complex arrays produce their real component type.
    pub fn abs(&self) -> Result<OwnedArray> {
        let entry = self.library.get(KERNEL_ABS)?;
        let result = self.allocate(self.dtype.real_counterpart())?;
        self.stream.invoke(
            &entry,
            vec![
                KernelArg::dtype(self.dtype),
                KernelArg::Count(self.size()),
                KernelArg::Buffer(self.buffer),
                KernelArg::Buffer(result.buffer),
            ],
        )?;
        Ok(result)
    }

    /// Elements in reverse order, into a new array
    pub fn reverse(&self) -> Result<OwnedArray> {
        if self.rank() > 1 {
            return Err(Error::UnsupportedType(format!(
                "multi-dimensional arrays cannot be reversed (shape {})",
                self.shape
            )));
        }

        let entry = self.library.get(KERNEL_REVERSE)?;
        let result = self.allocate(self.dtype)?;
        self.stream.invoke(
            &entry,
            vec![
                KernelArg::dtype(self.dtype),
                KernelArg::Count(self.size()),
                KernelArg::Buffer(self.buffer),
                KernelArg::Buffer(result.buffer),
            ],
        )?;
        Ok(result)
    }

    // ============================================================================================
    // Views
    // ============================================================================================

    /// View with a new shape over the same storage
    pub fn reshape(&self, shape: impl IntoShape) -> Result<OffloadArray<'_>> {
        let shape = shape.into_shape().map_err(|err| match err {
            Error::InvalidArgument(message) => Error::ShapeMismatch(format!("total size must be unchanged: {message}")),
            other => other,
        })?;
        if shape.size() != self.size() {
            return Err(Error::ShapeMismatch(format!(
                "total size must be unchanged: cannot reshape {} into {}",
                self.shape, shape
            )));
        }

        let base: &OffloadArray<'_> = match self.ownership {
            Ownership::View(base) => base,
            _ => self,
        };

        Ok(OffloadArray {
            shape,
            dtype: self.dtype,
            layout: self.layout,
            host: Arc::clone(&self.host),
            buffer: self.buffer,
            device: self.device.clone(),
            stream: self.stream.clone(),
            library: Arc::clone(&self.library),
            ownership: Ownership::View(base),
        })
    }

    /// One-dimensional view of all elements
    pub fn ravel(&self) -> Result<OffloadArray<'_>> {
        self.reshape(self.size())
    }

    // ============================================================================================
    // Release
    // ============================================================================================

    /// Enqueue release of the device buffer now
    ///
    /// Dropping an owner does the same; this form reports failures.
    pub fn release(mut self) -> Result<()> {
        match self.ownership {
            Ownership::View(_) => Err(Error::InvalidArgument(
                "views do not own device storage and cannot be released".into(),
            )),
            Ownership::Released => Ok(()),
            Ownership::Owner => {
                self.ownership = Ownership::Released;
                self.stream.release_buffer(self.buffer)
            }
        }
    }
}

impl Drop for OffloadArray<'_> {
    fn drop(&mut self) {
        if let Ownership::Owner = self.ownership {
            if let Err(err) = self.stream.release_buffer(self.buffer) {
                tracing::warn!(buffer = %self.buffer, error = %err, "failed to release device buffer");
            }
        }
    }
}

impl fmt::Display for OffloadArray<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        offload_backends::with_element_type!(self.dtype, T => match self.to_ndarray::<T>() {
            Ok(array) => write!(f, "{array}"),
            Err(_) => Err(fmt::Error),
        })
    }
}

impl fmt::Debug for OffloadArray<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OffloadArray")
            .field("shape", &self.shape)
            .field("dtype", &self.dtype)
            .field("layout", &self.layout)
            .field("device", &self.device.id())
            .field("stream", &self.stream.id())
            .field("buffer", &self.buffer)
            .field("view", &self.is_view())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offload_backends::DeviceId;

    fn setup() -> (Device, Stream) {
        let device = Device::cpu(DeviceId::new(0));
        let stream = device.stream().unwrap();
        (device, stream)
    }

    #[test]
    fn test_builder_requires_device_and_stream() {
        let (device, stream) = setup();
        let err = ArrayBuilder::new(4, DType::F32).stream(&stream).build().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = ArrayBuilder::new(4, DType::F32).device(&device).build().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = ArrayBuilder::new([2, 0], DType::F32)
            .device(&device)
            .stream(&stream)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_builder_rejects_overflowing_byte_size() {
        let (device, stream) = setup();
        let err = ArrayBuilder::new(usize::MAX / 2 + 1, DType::F64)
            .device(&device)
            .stream(&stream)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(message) if message.contains("overflows")));
        assert_eq!(device.live_buffers(), 0);
    }

    #[test]
    fn test_builder_rejects_foreign_stream() {
        let (device, _stream) = setup();
        let other = Device::cpu(DeviceId::new(1));
        let foreign = other.stream().unwrap();
        let err = ArrayBuilder::new(4, DType::F32)
            .device(&device)
            .stream(&foreign)
            .build()
            .unwrap_err();
        assert_eq!(err, Error::device_mismatch(DeviceId::new(0), DeviceId::new(1)));
    }

    #[test]
    fn test_metadata() {
        let (_device, stream) = setup();
        let a = stream.empty([2, 3], DType::C128, Layout::ColumnMajor, false).unwrap();
        assert_eq!(a.size(), 6);
        assert_eq!(a.rank(), 2);
        assert_eq!(a.len(), 2);
        assert_eq!(a.nbytes(), 96);
        assert_eq!(a.layout(), Layout::ColumnMajor);
        assert!(!a.is_view());
        assert!(a.base().is_none());

        let s = stream.empty(Shape::scalar(), DType::U8, Layout::RowMajor, false).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.size(), 1);
    }

    #[test]
    fn test_to_vec_checks_type() {
        let (_device, stream) = setup();
        let a = stream.zeros(3, DType::I16).unwrap();
        assert_eq!(a.to_vec::<i16>().unwrap(), vec![0, 0, 0]);
        assert_eq!(a.to_vec::<u16>().unwrap_err(), Error::type_mismatch(DType::I16, DType::U16));
    }

    #[test]
    fn test_column_major_round_trip() {
        let (_device, stream) = setup();
        let host = ndarray::array![[1i32, 2, 3], [4, 5, 6]];
        let a = stream.bind_with_layout(&host, Layout::ColumnMajor).unwrap();
        assert_eq!(a.to_vec::<i32>().unwrap(), vec![1, 4, 2, 5, 3, 6]);

        a.update_host().unwrap();
        assert_eq!(a.to_ndarray::<i32>().unwrap(), host.into_dyn());
    }

    #[test]
    fn test_display_matches_ndarray() {
        let (_device, stream) = setup();
        let host = ndarray::array![[1.5f32, 2.0], [3.0, 4.0]];
        let a = stream.bind(&host).unwrap();
        assert_eq!(a.to_string(), host.to_string());
    }

    #[test]
    fn test_debug_shows_metadata() {
        let (_device, stream) = setup();
        let a = stream.zeros([2, 2], DType::F64).unwrap();
        let text = format!("{a:?}");
        assert!(text.contains("OffloadArray"));
        assert!(text.contains("F64"));
    }

    #[test]
    fn test_view_chain_points_at_root() {
        let (_device, stream) = setup();
        let a = stream.zeros([2, 3], DType::F32).unwrap();
        let v = a.reshape([3, 2]).unwrap();
        let w = v.ravel().unwrap();
        assert!(w.is_view());
        assert!(w.base().is_some_and(|base| !base.is_view() && base.same_storage(&a)));
        assert!(w.same_storage(&a));
    }

    #[test]
    fn test_release_view_is_rejected() {
        let (device, stream) = setup();
        let a = stream.zeros(4, DType::F32).unwrap();
        let v = a.reshape([2, 2]).unwrap();
        assert!(matches!(v.release(), Err(Error::InvalidArgument(_))));

        a.release().unwrap();
        stream.synchronize().unwrap();
        assert_eq!(device.live_buffers(), 0);
    }
}
