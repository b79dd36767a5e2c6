//! # offload-core - Device-Mirrored Arrays
//!
//! Numeric arrays that live both in host memory and in a buffer on an
//! attached accelerator. Arithmetic runs on the accelerator; data crosses
//! between the two copies only when asked to.
//!
//! ## Architecture
//!
//! ```text
//!   OffloadArray ──validate──► BinaryDispatch ──invoke──► Stream (worker thread)
//!        │                                                   │
//!   HostMirror ◄──────────── update_host / update_device ────┤
//!                                                            ▼
//!                                             Device (Backend + KernelLibrary)
//! ```
//!
//! - **Owners and views**: an owner allocates its device buffer and releases
//!   it on drop. [`OffloadArray::reshape`] and [`OffloadArray::ravel`] return
//!   views that borrow the owner and share its storage.
//! - **Operands**: binary operations accept another array, a host array
//!   (`ndarray`, slice or `Vec`) or a scalar. Scalars are broadcast with a
//!   stride of 0.
//! - **Streams**: commands on one stream execute in submission order. Only
//!   [`OffloadArray::update_host`] and [`Stream::synchronize`] block.
//!
//! ## Example
//!
//! ```rust
//! use offload_core::{DeviceRegistry, DType, RuntimeConfig};
//!
//! # fn main() -> offload_core::Result<()> {
//! let registry = DeviceRegistry::from_config(&RuntimeConfig::default())?;
//! let stream = registry.stream(0)?;
//!
//! let mut a = stream.zeros([2, 3], DType::I32)?;
//! a.one()?;
//! let host = ndarray::Array2::from_elem((2, 3), 1i32);
//! let b = a.add(&host)?;
//! let c = b.pow(3i32)?;
//!
//! c.update_host()?;
//! assert_eq!(c.to_vec::<i32>()?, vec![8; 6]);
//! # Ok(())
//! # }
//! ```

pub mod array;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod operand;
pub mod shape;
pub mod stream;

// Re-export primary types
pub use array::{ArrayBuilder, OffloadArray, OwnedArray};
pub use config::RuntimeConfig;
pub use device::{Device, DeviceRegistry};
pub use dispatch::{BinaryDispatch, DispatchOperand};
pub use error::{Error, Result};
pub use host::{HostArray, HostMirror};
pub use operand::Operand;
pub use shape::{IntoShape, Layout, Shape};
pub use stream::{Stream, StreamOptions};

pub use offload_backends::{BackendError, BufferHandle, DType, DTypeCategory, DeviceId, Element, KernelLibrary, Scalar};
