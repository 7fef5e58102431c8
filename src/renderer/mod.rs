//! The GPU rendering stack: the colour fragment pipeline, the dirty-flag
//! state manager, the luminance analyzer, and the optional filter/
//! transition/HDR-surface paths that sit around it.

pub mod core;
pub mod filters;
pub mod hdr_surface;
pub mod luminance_analyzer;
pub mod pipeline;
pub mod state_manager;
pub mod texture_cache;
pub mod transition;

pub use luminance_analyzer::{LuminanceAnalyzer, LuminanceResult};
pub use state_manager::{StateManager, UniformSink};
pub use texture_cache::TextureCache;
pub use transition::TransitionRenderer;
