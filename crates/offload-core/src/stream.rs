//! Ordered command queues bound to one device
//!
//! Each stream owns a worker thread that executes copies, kernel launches and
//! buffer releases strictly in submission order. Submitting never blocks;
//! only [`Stream::synchronize`] (and operations built on it) wait for the
//! worker.
//!
//! ```text
//!  caller ──submit──► [ cmd | cmd | cmd ] ──► worker ──► Backend
//!     ▲                                          │
//!     └───────── synchronize (wait on seq) ◄─────┘
//! ```
//!
//! The first failure of an asynchronous command is recorded and returned by
//! the next `synchronize`.

use crate::array::{ArrayBuilder, OffloadArray, OwnedArray};
use crate::device::Device;
use crate::error::{Error, Result};
use crate::host::{HostArray, HostMirror};
use crate::shape::{IntoShape, Layout, Shape};
use offload_backends::{BackendError, BufferHandle, DType, KernelArg, KernelEntry};
use offload_tracing::performance::{record_kernel, record_transfer};
use offload_tracing::{perf_event, perf_span_threshold};
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(0);

/// Behaviour switches for a stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamOptions {
    /// Wait for each kernel and return its error from `invoke`
    pub blocking_launches: bool,
    /// Only log kernel spans at least this long
    pub perf_threshold_us: Option<u64>,
}

enum Command {
    CopyToDevice { buffer: BufferHandle, bytes: Vec<u8> },
    CopyToHost { buffer: BufferHandle, host: Arc<HostMirror> },
    Launch { kernel: KernelEntry, args: Vec<KernelArg> },
    Release { buffer: BufferHandle },
    Fence,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::CopyToDevice { .. } => "copy_to_device",
            Command::CopyToHost { .. } => "copy_to_host",
            Command::Launch { .. } => "launch",
            Command::Release { .. } => "release",
            Command::Fence => "fence",
        }
    }
}

struct QueueState {
    pending: VecDeque<(u64, Command)>,
    submitted: u64,
    completed: u64,
    error: Option<Error>,
    shutdown: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    work_available: Condvar,
    progress: Condvar,
}

struct StreamInner {
    id: u64,
    device: Device,
    options: StreamOptions,
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

/// Ordered command queue on one device
///
/// Clones share the same queue and worker. The worker drains outstanding
/// commands and exits when the last clone is dropped.
#[derive(Clone)]
pub struct Stream {
    inner: Arc<StreamInner>,
}

impl Stream {
    /// Open a stream with default options
    pub fn new(device: &Device) -> Result<Self> {
        Self::with_options(device, StreamOptions::default())
    }

    pub fn with_options(device: &Device, options: StreamOptions) -> Result<Self> {
        let id = NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed);
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                submitted: 0,
                completed: 0,
                error: None,
                shutdown: false,
            }),
            work_available: Condvar::new(),
            progress: Condvar::new(),
        });

        let worker = {
            let shared = Arc::clone(&shared);
            let device = device.clone();
            thread::Builder::new()
                .name(format!("offload-stream-{id}"))
                .spawn(move || run_worker(shared, device, options))
                .map_err(|e| Error::InvalidArgument(format!("failed to spawn stream worker: {e}")))?
        };

        tracing::debug!(stream = id, device = %device.id(), blocking = options.blocking_launches, "stream_created");

        Ok(Self {
            inner: Arc::new(StreamInner {
                id,
                device: device.clone(),
                options,
                shared,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn device(&self) -> &Device {
        &self.inner.device
    }

    pub fn options(&self) -> StreamOptions {
        self.inner.options
    }

    /// Both handles drive the same queue
    pub fn same_stream(&self, other: &Stream) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ============================================================================================
    // Buffer Management
    // ============================================================================================

    /// Allocate a device buffer paired with `host`
    ///
    /// Allocation is synchronous; the new buffer is zero-filled.
    pub fn allocate_buffer(&self, host: &HostMirror) -> Result<BufferHandle> {
        let start = Instant::now();
        let size_bytes = host.len();
        let buffer = self.inner.device.backend().write().allocate_buffer(size_bytes)?;

        tracing::debug!(
            stream = self.inner.id,
            buffer = %buffer,
            bytes = size_bytes,
            duration_us = start.elapsed().as_micros() as u64,
            "buffer_allocated"
        );
        Ok(buffer)
    }

    /// Enqueue release of a device buffer
    pub fn release_buffer(&self, buffer: BufferHandle) -> Result<()> {
        self.submit(Command::Release { buffer }).map(|_| ())
    }

    /// Enqueue a host-to-device copy of the mirror's current contents
    pub fn update_on_target(&self, buffer: BufferHandle, host: &HostMirror) -> Result<()> {
        self.submit(Command::CopyToDevice {
            buffer,
            bytes: host.snapshot(),
        })
        .map(|_| ())
    }

    /// Enqueue a device-to-host copy into the mirror
    ///
    /// The mirror is updated when the worker reaches the command; call
    /// [`Stream::synchronize`] before reading it.
    pub fn update_on_host(&self, buffer: BufferHandle, host: &Arc<HostMirror>) -> Result<()> {
        self.submit(Command::CopyToHost {
            buffer,
            host: Arc::clone(host),
        })
        .map(|_| ())
    }

    /// Enqueue a kernel launch
    ///
    /// With [`StreamOptions::blocking_launches`] the call waits for the kernel
    /// and returns its error directly.
    pub fn invoke(&self, kernel: &KernelEntry, args: Vec<KernelArg>) -> Result<()> {
        tracing::debug!(stream = self.inner.id, kernel = kernel.name(), args = args.len(), "kernel_enqueued");
        let seq = self.submit(Command::Launch { kernel: *kernel, args })?;

        if self.inner.options.blocking_launches {
            self.wait_for(seq);
            if let Some(err) = self.take_error() {
                return Err(err);
            }
        }
        Ok(())
    }

    /// Block until every command submitted so far has executed
    ///
    /// Returns the first error recorded since the last synchronization.
    #[tracing::instrument(skip(self), fields(stream = self.inner.id))]
    pub fn synchronize(&self) -> Result<()> {
        let seq = self.submit(Command::Fence)?;
        self.wait_for(seq);
        match self.take_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    // ============================================================================================
    // Array Constructors
    // ============================================================================================

    /// Uninitialized-on-device array bound to this stream
    ///
    /// The device buffer starts zeroed. With `update_host` the host mirror is
    /// refreshed from the device before returning.
    pub fn empty(&self, shape: impl IntoShape, dtype: DType, layout: Layout, update_host: bool) -> Result<OwnedArray> {
        let array = ArrayBuilder::new(shape, dtype)
            .layout(layout)
            .device(&self.inner.device)
            .stream(self)
            .build()?;
        if update_host {
            array.update_host()?;
        }
        Ok(array)
    }

    /// Array with the shape, dtype and layout of `like`
    pub fn empty_like(&self, like: &OffloadArray<'_>, update_host: bool) -> Result<OwnedArray> {
        self.empty(like.shape(), like.dtype(), like.layout(), update_host)
    }

    /// Array filled with zeros on the device and the host
    pub fn zeros(&self, shape: impl IntoShape, dtype: DType) -> Result<OwnedArray> {
        let mut array = self.empty(shape, dtype, Layout::RowMajor, false)?;
        array.zero()?;
        Ok(array)
    }

    /// Array filled with ones on the device
    ///
    /// The host mirror is not refreshed; call `update_host` to read it.
    pub fn ones(&self, shape: impl IntoShape, dtype: DType) -> Result<OwnedArray> {
        let mut array = self.empty(shape, dtype, Layout::RowMajor, false)?;
        array.one()?;
        Ok(array)
    }

    /// Copy a host array to a new row-major device array
    pub fn bind(&self, host: &(impl HostArray + ?Sized)) -> Result<OwnedArray> {
        self.bind_with_layout(host, Layout::RowMajor)
    }

    pub(crate) fn bind_with_layout(&self, host: &(impl HostArray + ?Sized), layout: Layout) -> Result<OwnedArray> {
        let shape = Shape::new(host.dims())?;
        let array = ArrayBuilder::new(shape, host.dtype())
            .layout(layout)
            .device(&self.inner.device)
            .stream(self)
            .build()?;
        array.host_mirror().write(&host.to_bytes(layout));
        array.update_device()?;
        Ok(array)
    }

    // ============================================================================================
    // Queue
    // ============================================================================================

    fn submit(&self, command: Command) -> Result<u64> {
        let shared = &self.inner.shared;
        let mut state = shared.state.lock();
        if state.shutdown {
            return Err(Error::StreamClosed);
        }
        state.submitted += 1;
        let seq = state.submitted;
        tracing::trace!(stream = self.inner.id, seq, command = command.name(), "command_submitted");
        state.pending.push_back((seq, command));
        shared.work_available.notify_one();
        Ok(seq)
    }

    fn wait_for(&self, seq: u64) {
        let shared = &self.inner.shared;
        let mut state = shared.state.lock();
        while state.completed < seq {
            shared.progress.wait(&mut state);
        }
    }

    fn take_error(&self) -> Option<Error> {
        self.inner.shared.state.lock().error.take()
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("id", &self.inner.id)
            .field("device", &self.inner.device.id())
            .field("options", &self.inner.options)
            .finish()
    }
}

impl Drop for StreamInner {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
            self.shared.work_available.notify_all();
        }

        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                tracing::warn!(stream = self.id, "stream worker panicked");
            }
        }
        tracing::debug!(stream = self.id, "stream_closed");
    }
}

fn run_worker(shared: Arc<Shared>, device: Device, options: StreamOptions) {
    loop {
        let (seq, command) = {
            let mut state = shared.state.lock();
            loop {
                if let Some(next) = state.pending.pop_front() {
                    break next;
                }
                if state.shutdown {
                    return;
                }
                shared.work_available.wait(&mut state);
            }
        };

        let name = command.name();
        // A panicking kernel fails its command; the worker keeps draining
        let result = panic::catch_unwind(AssertUnwindSafe(|| execute(&device, command, &options)))
            .unwrap_or_else(|payload| {
                Err(Error::Backend(BackendError::execution(format!(
                    "{name} panicked: {}",
                    panic_message(payload.as_ref())
                ))))
            });

        let mut state = shared.state.lock();
        state.completed = seq;
        if let Err(err) = result {
            tracing::debug!(seq, command = name, error = %err, "command_failed");
            if state.error.is_none() {
                state.error = Some(err);
            }
        }
        shared.progress.notify_all();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

fn execute(device: &Device, command: Command, options: &StreamOptions) -> Result<()> {
    match command {
        Command::CopyToDevice { buffer, bytes } => {
            let start = Instant::now();
            device
                .backend()
                .write()
                .copy_to_buffer(buffer, &bytes)
                .map_err(|e| Error::from_backend(e, "copy to device"))?;
            record_transfer(bytes.len(), "H2D", start.elapsed().as_micros() as u64);
            Ok(())
        }
        Command::CopyToHost { buffer, host } => {
            let start = Instant::now();
            let nbytes = host.len();
            host.with_bytes_mut(|bytes| device.backend().read().copy_from_buffer(buffer, bytes))
                .map_err(|e| Error::from_backend(e, "copy to host"))?;
            record_transfer(nbytes, "D2H", start.elapsed().as_micros() as u64);
            Ok(())
        }
        Command::Launch { kernel, args } => {
            let elements = args
                .iter()
                .find_map(|arg| match arg {
                    KernelArg::Count(n) => Some(*n),
                    _ => None,
                })
                .unwrap_or(0);

            let span = perf_span_threshold!(kernel.name(), options.perf_threshold_us);
            let _entered = span.enter();
            device
                .backend()
                .write()
                .launch(&kernel, &args)
                .map_err(|e| Error::from_backend(e, kernel.name()))?;
            record_kernel(kernel.name(), elements, span.elapsed_us());
            Ok(())
        }
        Command::Release { buffer } => {
            device
                .backend()
                .write()
                .free_buffer(buffer)
                .map_err(|e| Error::from_backend(e, "release"))?;
            perf_event!("buffer_released", buffer = buffer.id());
            Ok(())
        }
        Command::Fence => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offload_backends::{CpuBackend, DeviceId, KernelLibrary, MemoryManager, Scalar};

    fn cpu_stream() -> (Device, Stream) {
        let device = Device::cpu(DeviceId::new(0));
        let stream = Stream::new(&device).unwrap();
        (device, stream)
    }

    #[test]
    fn test_copy_round_trip_through_device() {
        let (_device, stream) = cpu_stream();
        let host = Arc::new(HostMirror::zeroed(8));
        let buffer = stream.allocate_buffer(&host).unwrap();

        host.write(bytemuck::cast_slice::<i32, u8>(&[7i32, 9][..]));
        stream.update_on_target(buffer, &host).unwrap();
        host.write(&[0u8; 8]);

        stream.update_on_host(buffer, &host).unwrap();
        stream.synchronize().unwrap();
        assert_eq!(host.to_vec::<i32>(), vec![7, 9]);
    }

    #[test]
    fn test_update_on_target_snapshots_at_submission() {
        let (_device, stream) = cpu_stream();
        let host = Arc::new(HostMirror::zeroed(4));
        let buffer = stream.allocate_buffer(&host).unwrap();

        host.write(bytemuck::bytes_of(&1u32));
        stream.update_on_target(buffer, &host).unwrap();
        host.write(bytemuck::bytes_of(&2u32));

        stream.update_on_host(buffer, &host).unwrap();
        stream.synchronize().unwrap();
        assert_eq!(host.to_vec::<u32>(), vec![1]);
    }

    #[test]
    fn test_release_is_ordered_after_launch() {
        let (device, stream) = cpu_stream();
        let library = KernelLibrary::offload_array();
        let host = HostMirror::zeroed(16);
        let buffer = stream.allocate_buffer(&host).unwrap();
        assert_eq!(device.live_buffers(), 1);

        let fill = library.get("offload_array_fill").unwrap();
        stream
            .invoke(
                &fill,
                vec![
                    KernelArg::dtype(DType::F32),
                    KernelArg::Count(4),
                    KernelArg::Buffer(buffer),
                    KernelArg::Scalar(Scalar::F32(1.0)),
                ],
            )
            .unwrap();
        stream.release_buffer(buffer).unwrap();
        stream.synchronize().unwrap();
        assert_eq!(device.live_buffers(), 0);
    }

    #[test]
    fn test_async_error_surfaces_once() {
        let (_device, stream) = cpu_stream();
        let host = HostMirror::zeroed(4);
        let buffer = stream.allocate_buffer(&host).unwrap();

        stream.release_buffer(buffer).unwrap();
        stream.release_buffer(buffer).unwrap();

        assert!(matches!(stream.synchronize(), Err(Error::UseAfterFree(_))));
        assert!(stream.synchronize().is_ok());
    }

    #[test]
    fn test_blocking_launch_reports_kernel_error() {
        let device = Device::cpu(DeviceId::new(0));
        let stream = Stream::with_options(
            &device,
            StreamOptions {
                blocking_launches: true,
                perf_threshold_us: None,
            },
        )
        .unwrap();
        let fill = device.library().get("offload_array_fill").unwrap();

        let err = stream
            .invoke(
                &fill,
                vec![
                    KernelArg::dtype(DType::F32),
                    KernelArg::Count(4),
                    KernelArg::Buffer(BufferHandle::new(4242)),
                    KernelArg::Scalar(Scalar::F32(1.0)),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, Error::UseAfterFree(_)));
    }

    fn panicking_kernel(_memory: &mut MemoryManager, _args: &[KernelArg]) -> offload_backends::Result<()> {
        panic!("kernel exploded")
    }

    #[test]
    fn test_kernel_panic_is_reported_and_stream_survives() {
        let mut library = KernelLibrary::new("faulty");
        library.register(KernelEntry::new("faulty_kernel", panicking_kernel));
        let device = Device::new(DeviceId::new(0), Box::new(CpuBackend::new()), library);
        let stream = Stream::new(&device).unwrap();

        let kernel = device.library().get("faulty_kernel").unwrap();
        stream.invoke(&kernel, vec![KernelArg::Count(1)]).unwrap();
        assert_eq!(
            stream.synchronize().unwrap_err(),
            Error::Backend(BackendError::execution("launch panicked: kernel exploded"))
        );

        let host = HostMirror::zeroed(4);
        let buffer = stream.allocate_buffer(&host).unwrap();
        stream.release_buffer(buffer).unwrap();
        stream.synchronize().unwrap();
        assert_eq!(device.live_buffers(), 0);
    }

    #[test]
    fn test_drop_drains_queue() {
        let (device, stream) = cpu_stream();
        let host = HostMirror::zeroed(8);
        let buffers: Vec<_> = (0..4).map(|_| stream.allocate_buffer(&host).unwrap()).collect();
        for buffer in buffers {
            stream.release_buffer(buffer).unwrap();
        }
        drop(stream);
        assert_eq!(device.live_buffers(), 0);
    }

    #[test]
    fn test_clones_share_queue() {
        let (_device, stream) = cpu_stream();
        let other = stream.clone();
        assert!(stream.same_stream(&other));
        assert_eq!(stream.id(), other.id());

        let fresh = Stream::new(stream.device()).unwrap();
        assert!(!stream.same_stream(&fresh));
        assert_ne!(stream.id(), fresh.id());
    }
}
