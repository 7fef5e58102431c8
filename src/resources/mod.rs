//! Plain value types shared across the renderer: `RenderState` and its
//! component structs, the dirty-flag set, texture snapshots, and the
//! `UniformValue` sum type. Nothing in this module touches a `wgpu` handle
//! directly — GPU resource ownership lives under [`crate::renderer`].

pub mod background;
pub mod color;
pub mod dirty_flags;
pub mod render_state;
pub mod shader_defines;
pub mod texture_snapshot;
pub mod tone_mapping;
pub mod transition;
pub mod uniform_value;

pub use dirty_flags::DirtyFlags;
pub use render_state::RenderState;
pub use shader_defines::ShaderDefines;
pub use texture_snapshot::{TextureData, TextureKind, TextureMetadata, TextureSnapshot};
pub use uniform_value::UniformValue;
