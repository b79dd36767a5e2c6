//! Memory manager for the CPU backend
//!
//! Device buffers are plain heap vectors keyed by handle id. Ids start at 1
//! and are never reused, so a stale handle always fails lookup instead of
//! aliasing a newer allocation.

use crate::backend::BufferHandle;
use crate::dtype::Element;
use crate::error::{BackendError, Result};
use std::collections::HashMap;

/// Buffer storage for one emulated device
#[derive(Debug)]
pub struct MemoryManager {
    buffers: HashMap<u64, Vec<u8>>,
    next_buffer_id: u64,
}

impl MemoryManager {
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
            next_buffer_id: 1,
        }
    }

    // ============================================================================================
    // Buffer Management
    // ============================================================================================

    /// Allocate a zero-filled buffer
    pub fn allocate_buffer(&mut self, size: usize) -> Result<BufferHandle> {
        let id = self.next_buffer_id;
        self.next_buffer_id += 1;

        self.buffers.insert(id, vec![0u8; size]);

        Ok(BufferHandle::new(id))
    }

    /// Free a buffer
    pub fn free_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        if self.buffers.remove(&handle.id()).is_none() {
            return Err(BackendError::InvalidBufferHandle(handle.id()));
        }
        Ok(())
    }

    /// Copy data into the start of a buffer
    pub fn copy_to_buffer(&mut self, handle: BufferHandle, data: &[u8]) -> Result<()> {
        let buffer = self.buffer_mut(handle)?;

        if data.len() > buffer.len() {
            return Err(BackendError::BufferOutOfBounds {
                offset: 0,
                size: data.len(),
                buffer_size: buffer.len(),
            });
        }

        buffer[..data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Copy the start of a buffer out
    pub fn copy_from_buffer(&self, handle: BufferHandle, data: &mut [u8]) -> Result<()> {
        let buffer = self.buffer(handle)?;

        if data.len() > buffer.len() {
            return Err(BackendError::BufferOutOfBounds {
                offset: 0,
                size: data.len(),
                buffer_size: buffer.len(),
            });
        }

        data.copy_from_slice(&buffer[..data.len()]);
        Ok(())
    }

    /// Get buffer size
    pub fn buffer_size(&self, handle: BufferHandle) -> Result<usize> {
        self.buffer(handle).map(|b| b.len())
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn buffer(&self, handle: BufferHandle) -> Result<&[u8]> {
        self.buffers
            .get(&handle.id())
            .map(|b| b.as_slice())
            .ok_or(BackendError::InvalidBufferHandle(handle.id()))
    }

    pub fn buffer_mut(&mut self, handle: BufferHandle) -> Result<&mut [u8]> {
        self.buffers
            .get_mut(&handle.id())
            .map(|b| b.as_mut_slice())
            .ok_or(BackendError::InvalidBufferHandle(handle.id()))
    }

    // ============================================================================================
    // Typed Access (used by kernels)
    // ============================================================================================

    /// Read `count` elements of `T` from the start of a buffer
    pub fn read_elements<T: Element>(&self, handle: BufferHandle, count: usize) -> Result<Vec<T>> {
        let buffer = self.buffer(handle)?;
        let bytes = count * std::mem::size_of::<T>();

        if bytes > buffer.len() {
            return Err(BackendError::BufferOutOfBounds {
                offset: 0,
                size: bytes,
                buffer_size: buffer.len(),
            });
        }

        Ok(bytemuck::pod_collect_to_vec(&buffer[..bytes]))
    }

    /// Write `values` starting at element index `offset`
    pub fn write_elements<T: Element>(&mut self, handle: BufferHandle, offset: usize, values: &[T]) -> Result<()> {
        let buffer = self.buffer_mut(handle)?;
        let width = std::mem::size_of::<T>();
        let start = offset * width;
        let src: &[u8] = bytemuck::cast_slice(values);

        if start + src.len() > buffer.len() {
            return Err(BackendError::BufferOutOfBounds {
                offset: start,
                size: src.len(),
                buffer_size: buffer.len(),
            });
        }

        buffer[start..start + src.len()].copy_from_slice(src);
        Ok(())
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new()
    }
}
