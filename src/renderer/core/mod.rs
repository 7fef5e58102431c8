//! The thin GPU-resource layer shared by every renderer component: a
//! device/queue context and the mipmap generator.

pub mod context;
pub mod mipmap;

pub use context::GpuContext;
pub use mipmap::MipmapGenerator;
