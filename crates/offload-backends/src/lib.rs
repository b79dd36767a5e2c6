//! Device memory and native kernels for offloaded arrays
//!
//! This crate provides:
//! - **Element types**: the closed [`DType`] set, the [`Element`] trait and tagged [`Scalar`] values
//! - **Backend trait**: buffer allocation, host/device copies and kernel launch
//! - **CPU backend**: an emulated accelerator backed by host memory
//! - **Kernel library**: the `offload_array_*` entry points
//!
//! ```text
//!   offload-core (arrays, streams)
//!                │
//!                ▼
//!   KernelLibrary ──► Backend::launch
//!                        │
//!                        ▼
//!                   CpuBackend
//!                  (MemoryManager)
//! ```
//!
//! # Usage
//!
//! ```rust
//! use offload_backends::{Backend, CpuBackend, DType, KernelArg, KernelLibrary, Scalar};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut backend = CpuBackend::new();
//! let library = KernelLibrary::offload_array();
//!
//! let x = backend.allocate_buffer(4 * 4)?;
//! backend.copy_to_buffer(x, bytemuck::cast_slice(&[1.0f32, 2.0, 3.0, 4.0]))?;
//! let r = backend.allocate_buffer(4 * 4)?;
//!
//! // r = x + 0.5, the scalar broadcast with stride 0
//! let add = library.get("offload_array_add")?;
//! backend.launch(
//!     &add,
//!     &[
//!         KernelArg::dtype(DType::F32),
//!         KernelArg::Count(4),
//!         KernelArg::Buffer(x),
//!         KernelArg::Stride(1),
//!         KernelArg::Scalar(Scalar::F32(0.5)),
//!         KernelArg::Stride(0),
//!         KernelArg::Buffer(r),
//!         KernelArg::Stride(1),
//!     ],
//! )?;
//!
//! let mut out = [0.0f32; 4];
//! backend.copy_from_buffer(r, bytemuck::cast_slice_mut(&mut out))?;
//! assert_eq!(out, [1.5, 2.5, 3.5, 4.5]);
//! # Ok(())
//! # }
//! ```

#[macro_use]
mod macros;

pub mod backend;
pub mod backends;
pub mod dtype;
pub mod error;
pub mod kernels;
pub mod scalar;

pub use backend::{Backend, BufferHandle, DeviceId};
pub use backends::{CpuBackend, MemoryManager};
pub use dtype::{DType, DTypeCategory, Element};
pub use error::{BackendError, Result};
pub use kernels::{Arith, KernelArg, KernelEntry, KernelFn, KernelLibrary};
pub use scalar::Scalar;

#[doc(hidden)]
pub use num_complex;
