//! CPU backend implementation
//!
//! Emulates an accelerator in host memory. Kernels run on the calling
//! thread (the stream worker) and split element loops across the rayon pool.
//!
//! ```rust
//! use offload_backends::{Backend, CpuBackend, DType, KernelArg, KernelLibrary};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut backend = CpuBackend::new();
//! let library = KernelLibrary::offload_array();
//!
//! let x = backend.allocate_buffer(3 * 4)?;
//! backend.copy_to_buffer(x, bytemuck::cast_slice(&[1i32, 2, 3]))?;
//! let r = backend.allocate_buffer(3 * 4)?;
//!
//! let reverse = library.get("offload_array_reverse")?;
//! backend.launch(
//!     &reverse,
//!     &[KernelArg::dtype(DType::I32), KernelArg::Count(3), KernelArg::Buffer(x), KernelArg::Buffer(r)],
//! )?;
//!
//! let mut out = [0i32; 3];
//! backend.copy_from_buffer(r, bytemuck::cast_slice_mut(&mut out))?;
//! assert_eq!(out, [3, 2, 1]);
//! # Ok(())
//! # }
//! ```

pub(crate) mod memory;

use crate::backend::{Backend, BufferHandle};
use crate::error::Result;
use crate::kernels::{KernelArg, KernelEntry};
pub use memory::MemoryManager;
use parking_lot::RwLock;
use std::any::Any;
use std::sync::Arc;

/// CPU backend: buffers in a [`MemoryManager`], kernels as native functions
#[derive(Clone, Default)]
pub struct CpuBackend {
    memory: Arc<RwLock<MemoryManager>>,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self {
            memory: Arc::new(RwLock::new(MemoryManager::new())),
        }
    }

    /// Shared access to the memory manager
    pub fn memory(&self) -> &Arc<RwLock<MemoryManager>> {
        &self.memory
    }
}

impl Backend for CpuBackend {
    fn allocate_buffer(&mut self, size: usize) -> Result<BufferHandle> {
        self.memory.write().allocate_buffer(size)
    }

    fn free_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        self.memory.write().free_buffer(handle)
    }

    fn copy_to_buffer(&mut self, handle: BufferHandle, data: &[u8]) -> Result<()> {
        self.memory.write().copy_to_buffer(handle, data)
    }

    fn copy_from_buffer(&self, handle: BufferHandle, data: &mut [u8]) -> Result<()> {
        self.memory.read().copy_from_buffer(handle, data)
    }

    fn buffer_size(&self, handle: BufferHandle) -> Result<usize> {
        self.memory.read().buffer_size(handle)
    }

    fn live_buffer_count(&self) -> usize {
        self.memory.read().buffer_count()
    }

    fn launch(&mut self, kernel: &KernelEntry, args: &[KernelArg]) -> Result<()> {
        let mut memory = self.memory.write();
        kernel.call(&mut memory, args)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
