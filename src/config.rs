//! Process-wide configuration.
//!
//! Everything that varies *per frame* lives in [`crate::resources::render_state::RenderState`]
//! and flows through the [`crate::renderer::state_manager::StateManager`]'s
//! dirty-flag machinery. `RendererConfig` is the much smaller set of knobs
//! fixed at construction time — the host loads it once (typically from a
//! JSON blob it owns) and hands it to [`crate::engine::Core::new`].

use serde::{Deserialize, Serialize};

/// Construction-time configuration for the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Request asynchronous (parallel) shader compilation when the backend
    /// supports it. See the `ShaderProgram` polling state machine in
    /// [`crate::renderer::pipeline::uniform_uploader`].
    pub parallel_shader_compile: bool,

    /// Side length of the luminance analyzer's log-luminance FBO. The design
    /// fixes this at 256 for an 8-level mip chain down to 1×1; exposed here
    /// only so hosts targeting constrained GPUs can shrink it.
    pub luminance_fbo_size: u32,

    /// Preferred HDR surface formats, tried in order, before the design's
    /// built-in fallback chain (linear-sRGB float16 → legacy key →
    /// Rec.2100-HLG float16 → legacy key). Empty means "use the built-in
    /// order only".
    pub hdr_surface_format_overrides: Vec<HdrSurfaceFormat>,

    /// Label used as the `log` target for this core instance, useful when a
    /// host runs more than one core (e.g. split-screen compare).
    pub log_target: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            parallel_shader_compile: true,
            luminance_fbo_size: 256,
            hdr_surface_format_overrides: Vec::new(),
            log_target: "chromacore".to_string(),
        }
    }
}

impl RendererConfig {
    /// Parses a `RendererConfig` from a host-supplied JSON string.
    ///
    /// The crate performs no filesystem or network I/O itself; loading the
    /// bytes is the host's responsibility.
    pub fn from_json(json: &str) -> crate::errors::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// HDR surface colour-space/format pair, matching the design's priority list
/// (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HdrSurfaceFormat {
    LinearSrgbFloat16,
    LinearSrgbFloat16Legacy,
    Rec2100HlgFloat16,
    Rec2100HlgFloat16Legacy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_json() {
        let cfg = RendererConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let parsed = RendererConfig::from_json(&json).unwrap();
        assert_eq!(parsed.luminance_fbo_size, cfg.luminance_fbo_size);
        assert_eq!(parsed.parallel_shader_compile, cfg.parallel_shader_compile);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let parsed = RendererConfig::from_json(r#"{"luminance_fbo_size": 128}"#).unwrap();
        assert_eq!(parsed.luminance_fbo_size, 128);
        assert!(parsed.parallel_shader_compile);
    }
}
