//! Backend trait and handle types

mod traits;
mod types;

pub use traits::Backend;
pub use types::{BufferHandle, DeviceId};
