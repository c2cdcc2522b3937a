//! Satin - typed shader parameters and uniform buffer packing for wgpu

pub mod core;
pub mod parameters;
pub mod buffers;
