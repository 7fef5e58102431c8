//! [`Core`], the facade the host drives (design §6.1).
//!
//! `Core` owns the GPU context, the dirty-flag [`StateManager`], the
//! compiled-pipeline cache, the texture cache, and the luminance analyzer,
//! wiring them together the way the teacher's `Engine` wires its renderer
//! and scene manager — except this core never owns a window or surface of
//! its own; the host delivers frames as textures and reads pixels back
//! through its own surface (or through [`crate::renderer::hdr_surface::HdrSurface`]
//! when the host's surface can't carry floating-point output).

use std::sync::Arc;

use crate::config::RendererConfig;
use crate::errors::Result;
use crate::host::{HostHooks, TestHandle};
use crate::renderer::core::GpuContext;
use crate::renderer::pipeline::FragmentPipeline;
use crate::renderer::state_manager::StateManager;
use crate::renderer::texture_cache::TextureCache;
use crate::renderer::{LuminanceAnalyzer, LuminanceResult};
use crate::resources::render_state::RenderState;
use crate::resources::texture_snapshot::{TextureData, TextureKind};

/// One frame of input delivered by the host (design §6.1): either raw
/// pixels or a pre-existing GPU texture, plus the input transfer function
/// code the fragment pipeline's EOTF step (0) needs to decode it correctly.
pub enum InputFrame<'a> {
    Pixels { width: u32, height: u32, pixels: &'a [u8], input_transfer_code: u8 },
    Texture { view: &'a wgpu::TextureView, width: u32, height: u32, input_transfer_code: u8 },
}

impl InputFrame<'_> {
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            InputFrame::Pixels { width, height, .. } | InputFrame::Texture { width, height, .. } => (*width, *height),
        }
    }

    #[must_use]
    pub fn input_transfer_code(&self) -> u8 {
        match self {
            InputFrame::Pixels { input_transfer_code, .. } | InputFrame::Texture { input_transfer_code, .. } => *input_transfer_code,
        }
    }
}

/// Bridges [`StateManager::apply_uniforms`]'s per-texture-kind callbacks
/// into [`TextureCache::sync`]; borrowed for the duration of one
/// `apply_uniforms` call and otherwise not kept around.
struct TextureCacheHost<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    cache: &'a mut TextureCache,
    canvas_size: (u32, u32),
}

impl HostHooks for TextureCacheHost<'_> {
    fn bind_curves_lut_texture(&mut self, data: Option<&[u8]>) {
        let payload = data.map_or(TextureData::None, |bytes| TextureData::Bytes(bytes.to_vec()));
        self.cache.sync(self.device, self.queue, TextureKind::CurvesLut, &payload);
    }

    fn bind_false_color_lut_texture(&mut self, data: Option<&[u8]>) {
        let payload = data.map_or(TextureData::None, |bytes| TextureData::Bytes(bytes.to_vec()));
        self.cache.sync(self.device, self.queue, TextureKind::FalseColorLut, &payload);
    }

    fn bind_lut3d_texture(&mut self, data: &[f32], _size: u32) {
        self.cache.sync(self.device, self.queue, TextureKind::Lut3d, &TextureData::Floats(data.to_vec()));
    }

    fn bind_film_lut_texture(&mut self, data: &[f32]) {
        self.cache.sync(self.device, self.queue, TextureKind::FilmLut, &TextureData::Floats(data.to_vec()));
    }

    fn bind_inline_lut_texture(&mut self, data: &[u8], _size: u32, channels: u32) {
        self.cache.sync_inline_lut(self.device, self.queue, data, channels);
    }

    fn canvas_size(&self) -> (u32, u32) {
        self.canvas_size
    }
}

/// The core rendering facade: owns everything between "a decoded video
/// frame" and "a graded, tone-mapped, dithered frame in a render target".
pub struct Core {
    device: wgpu::Device,
    queue: wgpu::Queue,
    state_manager: StateManager,
    fragment_pipeline: FragmentPipeline,
    texture_cache: TextureCache,
    luminance_analyzer: LuminanceAnalyzer,
    test_handle: Box<dyn TestHandle>,
    canvas_size: (u32, u32),
    config: RendererConfig,
}

impl Core {
    /// Creates a `Core` from an existing GPU context. Hosts that need their
    /// own adapter/device selection (e.g. to share a device with a video
    /// decoder) construct [`GpuContext`] themselves; [`Core::new_standalone`]
    /// is the convenience path for hosts that don't.
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, canvas_size: (u32, u32), config: RendererConfig) -> Self {
        let texture_cache = TextureCache::new(&device, &queue);
        let luminance_analyzer = LuminanceAnalyzer::new(&device, true, config.luminance_fbo_size);
        Self {
            device,
            queue,
            state_manager: StateManager::new(),
            fragment_pipeline: FragmentPipeline::new(),
            texture_cache,
            luminance_analyzer,
            test_handle: Box::new(crate::host::NoopTestHandle),
            canvas_size,
            config,
        }
    }

    /// Requests its own adapter/device via [`GpuContext`]. The common path
    /// for hosts that don't need to share a device with other GPU work.
    pub async fn new_standalone(canvas_size: (u32, u32), config: RendererConfig) -> Result<Self> {
        let context = GpuContext::new().await?;
        Ok(Self::new(context.device, context.queue, canvas_size, config))
    }

    /// Swaps in a test-observing handle; used by integration tests that
    /// assert on internal scheduling events (design §9).
    pub fn set_test_handle(&mut self, test_handle: Box<dyn TestHandle>) {
        self.test_handle = test_handle;
    }

    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn resize_canvas(&mut self, width: u32, height: u32) {
        self.canvas_size = (width.max(1), height.max(1));
    }

    /// Applies a new [`RenderState`] snapshot, diffing it against the
    /// cached state and marking the affected dirty-flag groups (design
    /// §6.1: `applyRenderState`).
    pub fn apply_render_state(&mut self, state: RenderState) {
        self.state_manager.apply_render_state(state);
    }

    #[must_use]
    pub fn state(&self) -> &RenderState {
        self.state_manager.state()
    }

    /// Renders one frame into `target`. Uploads any uniforms/textures made
    /// dirty since the last call, ensures the compiled pipeline variant for
    /// `(hdr_output, target_format)` exists, and draws.
    ///
    /// Returns `false` without drawing anything if the variant's shader is
    /// still compiling (design §5: "the first frame requiring a shader is
    /// dropped if `isReady()` is false") — the host should simply present
    /// whatever was already in `target` and try again next frame.
    #[must_use]
    pub fn render(&mut self, frame: &InputFrame<'_>, hdr_output: bool, target_format: wgpu::TextureFormat, target: &wgpu::TextureView) -> bool {
        {
            let mut host = TextureCacheHost {
                device: &self.device,
                queue: &self.queue,
                cache: &mut self.texture_cache,
                canvas_size: self.canvas_size,
            };
            self.state_manager.apply_uniforms(self.fragment_pipeline.uniform_sink(), &mut host);
        }

        let Some(variant) = self.fragment_pipeline.ensure_variant(&self.device, hdr_output, target_format, self.config.parallel_shader_compile) else {
            return false;
        };
        self.fragment_pipeline.flush_uniforms(&self.queue, &variant);

        let input_view_storage;
        let input_view = match frame {
            InputFrame::Texture { view, .. } => *view,
            InputFrame::Pixels { width, height, pixels, .. } => {
                input_view_storage = self.upload_pixels(*width, *height, pixels);
                &input_view_storage
            }
        };

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("chromacore-frame-encoder"),
        });
        self.fragment_pipeline.render(
            &self.device,
            &mut encoder,
            &variant,
            input_view,
            self.texture_cache.view(TextureKind::CurvesLut),
            self.texture_cache.view(TextureKind::FalseColorLut),
            self.texture_cache.view(TextureKind::Lut3d),
            self.texture_cache.inline_lut_view(),
            target,
        );
        self.queue.submit(Some(encoder.finish()));

        self.luminance_analyzer.render_and_request_readback(&self.device, &self.queue, input_view);
        true
    }

    fn upload_pixels(&self, width: u32, height: u32, pixels: &[u8]) -> wgpu::TextureView {
        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("chromacore-input-frame"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo { texture: &texture, mip_level: 0, origin: wgpu::Origin3d::ZERO, aspect: wgpu::TextureAspect::All },
            pixels,
            wgpu::TexelCopyBufferLayout { offset: 0, bytes_per_row: Some(4 * width), rows_per_image: Some(height) },
            size,
        );
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Non-blocking luminance query (design §6.1: `requestLuminance`).
    /// Always returns immediately with the last known-good value; never
    /// stalls waiting on the GPU.
    pub fn request_luminance(&mut self) -> LuminanceResult {
        self.luminance_analyzer.poll(&self.device, self.test_handle.as_mut())
    }

    /// Idempotent teardown (design §5: "disposal is idempotent and
    /// ordered: filters and analyzers first, then shader programs, then the
    /// underlying context's buffers/textures"). `Core`'s fields are all
    /// RAII-managed wgpu handles, so drop order already matches that
    /// sequence; `dispose` exists as the documented, explicitly-callable
    /// entry point design §6.1 specifies, and is safe to call more than
    /// once.
    pub fn dispose(self) {
        drop(self);
    }
}

/// Convenience wrapper pairing an owned `Core` with the `Arc`-shared
/// `RenderState` most hosts keep around for UI data-binding. Not part of
/// the design's external interface; purely a host ergonomics helper.
pub struct SharedCore {
    pub core: Core,
    pub state: Arc<RenderState>,
}
