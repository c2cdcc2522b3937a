//! Parameter-backed GPU buffer management

pub mod buffer;
pub mod uniform;
pub mod binding;

pub use buffer::Buffer;
pub use uniform::{UniformBuffer, MAX_BUFFERS_IN_FLIGHT, UNIFORM_ALIGNMENT};
pub use binding::{StorageBinding, UniformBinding};
