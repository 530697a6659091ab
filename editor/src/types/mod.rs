//! Type definitions

pub mod apply;
pub mod change;
pub mod device;

pub use apply::*;
pub use change::*;
pub use device::*;
