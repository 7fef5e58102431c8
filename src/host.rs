//! Host-side collaborators (design §6.2, §9).
//!
//! The core never reaches out to global state. Everything it needs from its
//! embedder — texture uploads, canvas size queries, and (in test builds) a
//! way to observe internal events — is passed in explicitly as a trait
//! object at construction. This replaces the source pattern of a
//! runtime-queried global mutable test hook: production code binds
//! [`NoopTestHandle`], tests bind a recording implementation, and neither
//! needs a global singleton.

/// Callbacks the core invokes when a dirty [`crate::resources::texture_snapshot::TextureSnapshot`]
/// needs to be realized on the GPU, and when it needs the host's current
/// canvas dimensions for pixel-space effects (zebra stripes, background
/// patterns).
///
/// Texture uploads are requested lazily: the [`crate::renderer::state_manager::StateManager`]
/// calls the matching method only when `applyUniforms` observes that
/// snapshot's dirty flag set, never speculatively.
pub trait HostHooks {
    /// Upload (or clear, if `data` is `None`) the curves 1D LUT texture.
    fn bind_curves_lut_texture(&mut self, data: Option<&[u8]>);

    /// Upload (or clear) the false-colour 1D LUT texture.
    fn bind_false_color_lut_texture(&mut self, data: Option<&[u8]>);

    /// Upload the 3D LUT cube texture (`size`³ RGB texels).
    fn bind_lut3d_texture(&mut self, data: &[f32], size: u32);

    /// Upload the active film emulation stock's LUT.
    fn bind_film_lut_texture(&mut self, data: &[f32]);

    /// Upload the inline 1D LUT carried directly on `RenderState::color`.
    fn bind_inline_lut_texture(&mut self, data: &[u8], size: u32, channels: u32);

    /// Current canvas size in physical pixels, used for zebra-stripe phase
    /// and background-pattern checker/crosshatch coordinates.
    fn canvas_size(&self) -> (u32, u32);
}

/// A `HostHooks` implementation that does nothing and reports a fixed size.
///
/// Useful for headless construction (tests, benchmarks) where no real GPU
/// texture uploads are exercised.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHostHooks {
    pub width: u32,
    pub height: u32,
}

impl HostHooks for NoopHostHooks {
    fn bind_curves_lut_texture(&mut self, _data: Option<&[u8]>) {}
    fn bind_false_color_lut_texture(&mut self, _data: Option<&[u8]>) {}
    fn bind_lut3d_texture(&mut self, _data: &[f32], _size: u32) {}
    fn bind_film_lut_texture(&mut self, _data: &[f32]) {}
    fn bind_inline_lut_texture(&mut self, _data: &[u8], _size: u32, _channels: u32) {}

    fn canvas_size(&self) -> (u32, u32) {
        (self.width.max(1), self.height.max(1))
    }
}

/// Observability hook for test builds (design §9: "replace the runtime
/// global test hook with a typed test-handle capability").
///
/// Production code constructs [`crate::engine::Core`] with
/// [`NoopTestHandle`]; tests that need to assert on internal scheduling
/// (e.g. "did the parallel shader compile fall back to synchronous mode?")
/// inject a recording implementation instead.
pub trait TestHandle {
    /// Called once whenever the [`crate::renderer::pipeline::uniform_uploader::ShaderProgram`]
    /// falls back from parallel to synchronous compilation.
    fn on_parallel_compile_fallback(&mut self) {}

    /// Called once whenever the luminance analyzer logs a non-finite
    /// readback and retains its cached value.
    fn on_non_finite_luminance(&mut self) {}

    /// Called once whenever the HDR blit surface exhausts its format
    /// fallback chain without acquiring a surface.
    fn on_hdr_surface_unavailable(&mut self) {}
}

/// The production, do-nothing [`TestHandle`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTestHandle;

impl TestHandle for NoopTestHandle {}

#[cfg(test)]
pub(crate) mod recording {
    use super::TestHandle;

    /// A `TestHandle` that counts how many times each event fired, for
    /// assertions in unit tests elsewhere in this crate.
    #[derive(Debug, Default)]
    pub struct RecordingTestHandle {
        pub parallel_compile_fallbacks: u32,
        pub non_finite_luminance_events: u32,
        pub hdr_surface_unavailable_events: u32,
    }

    impl TestHandle for RecordingTestHandle {
        fn on_parallel_compile_fallback(&mut self) {
            self.parallel_compile_fallbacks += 1;
        }
        fn on_non_finite_luminance(&mut self) {
            self.non_finite_luminance_events += 1;
        }
        fn on_hdr_surface_unavailable(&mut self) {
            self.hdr_surface_unavailable_events += 1;
        }
    }
}
