//! Async luminance analyzer for auto-exposure (design §4.4).
//!
//! Renders log-luminance into a 256×256 floating-point texture, reduces it
//! to 1×1 via [`MipmapGenerator`], and reads it back through a ping-pong
//! pair of staging buffers so the GPU is never stalled waiting on the CPU.
//! `wgpu::Buffer::map_async` plus a polled `device.poll(PollType::Poll)` is
//! this crate's equivalent of the source's PBO + sync-fence pair.

use std::borrow::Cow;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::host::TestHandle;
use crate::renderer::core::MipmapGenerator;

const SEED_AVG: f32 = 0.18;
const SEED_LINEAR_AVG: f32 = 1.0;

struct Readback {
    buffer: wgpu::Buffer,
    in_flight: Arc<AtomicBool>,
}

/// Cached result of the most recent successfully-completed readback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuminanceResult {
    pub avg: f32,
    pub linear_avg: f32,
}

impl Default for LuminanceResult {
    fn default() -> Self {
        Self { avg: SEED_AVG, linear_avg: SEED_LINEAR_AVG }
    }
}

/// Owns the mip-chained FBO, the log-luminance render pipeline, and the two
/// ping-pong readback buffers.
pub struct LuminanceAnalyzer {
    texture: wgpu::Texture,
    mip_count: u32,
    mipmap: MipmapGenerator,
    log_luma_pipeline: wgpu::RenderPipeline,
    log_luma_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    readbacks: [Readback; 2],
    index: usize,
    first_frame: bool,
    cached: LuminanceResult,
    /// `false` once the floating-point render-target format turned out to
    /// be unavailable on this adapter; the analyzer then permanently
    /// returns the seed value after one warning (design §4.4 failure mode).
    available: bool,
}

impl LuminanceAnalyzer {
    /// `fbo_size` is the reduction texture's edge length (design §4.4's
    /// default is 256, overridable via `RendererConfig::luminance_fbo_size`);
    /// it must be a power of two so the mip chain reduces cleanly to 1x1.
    #[must_use]
    pub fn new(device: &wgpu::Device, format_supported: bool, fbo_size: u32) -> Self {
        let fbo_size = fbo_size.next_power_of_two().max(1);
        let mip_count = fbo_size.trailing_zeros() + 1;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("luminance-analyzer-fbo"),
            size: wgpu::Extent3d { width: fbo_size, height: fbo_size, depth_or_array_layers: 1 },
            mip_level_count: mip_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let mut mipmap = MipmapGenerator::new(device);
        mipmap.ensure_pipeline(device, wgpu::TextureFormat::Rgba32Float);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("luminance-log-luma-shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("pipeline/shaders/log_luma.wgsl"))),
        });

        let log_luma_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("luminance-log-luma-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("luminance-log-luma-pipeline-layout"),
            bind_group_layouts: &[Some(&log_luma_layout)],
            immediate_size: 0,
        });

        let log_luma_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("luminance-log-luma-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba32Float,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("luminance-analyzer-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let make_readback = || Readback {
            buffer: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("luminance-analyzer-readback"),
                size: 16, // one RGBA32Float texel
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                mapped_at_creation: false,
            }),
            in_flight: Arc::new(AtomicBool::new(false)),
        };

        if !format_supported {
            log::warn!(target: "chromacore", "floating-point render-target format unavailable; luminance analyzer will return the seed value only");
        }

        Self {
            texture,
            mip_count,
            mipmap,
            log_luma_pipeline,
            log_luma_layout,
            sampler,
            readbacks: [make_readback(), make_readback()],
            index: 0,
            first_frame: true,
            cached: LuminanceResult::default(),
            available: format_supported,
        }
    }

    /// Renders `source`'s log-luminance into the analyzer's FBO, reduces it
    /// via mipmaps, and issues this frame's readback copy. Must be called
    /// once per frame; `poll` should follow after `device.poll`.
    pub fn render_and_request_readback(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, source: &wgpu::TextureView) {
        if !self.available {
            return;
        }

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("luminance-log-luma-bind-group"),
            layout: &self.log_luma_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(source) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&self.sampler) },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("luminance-analyzer-encoder"),
        });

        {
            let mip0_view = self.texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some("luminance-mip0"),
                base_mip_level: 0,
                mip_level_count: Some(1),
                ..Default::default()
            });
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("luminance-log-luma-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &mip0_view,
                    resolve_target: None,
                    ops: wgpu::Operations { load: wgpu::LoadOp::Clear(wgpu::Color::BLACK), store: wgpu::StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            rpass.set_pipeline(&self.log_luma_pipeline);
            rpass.set_bind_group(0, &bind_group, &[]);
            rpass.draw(0..3, 0..1);
        }

        self.mipmap.generate(device, &mut encoder, &self.texture);

        let current = &self.readbacks[self.index];
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: self.mip_count - 1,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &current.buffer,
                layout: wgpu::TexelCopyBufferLayout { offset: 0, bytes_per_row: Some(256), rows_per_image: Some(1) },
            },
            wgpu::Extent3d { width: 1, height: 1, depth_or_array_layers: 1 },
        );

        queue.submit(Some(encoder.finish()));

        let flag = current.in_flight.clone();
        flag.store(true, Ordering::Release);
        let buffer_slice = current.buffer.slice(..);
        let flag_for_callback = flag.clone();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            if result.is_err() {
                flag_for_callback.store(false, Ordering::Release);
            }
        });
    }

    /// Polls the *previous* frame's PBO with a zero-timeout check; if its
    /// map has completed, reads back `{log_luma, linear_avg}`, validates
    /// finiteness, and updates the cache. Never blocks.
    pub fn poll(&mut self, device: &wgpu::Device, test_handle: &mut dyn TestHandle) -> LuminanceResult {
        if !self.available {
            return self.cached;
        }
        if self.first_frame {
            self.first_frame = false;
            self.index = 1 - self.index;
            return self.cached;
        }

        let previous = 1 - self.index;
        let _ = device.poll(wgpu::PollType::Poll);

        let readback = &self.readbacks[previous];
        if readback.in_flight.load(Ordering::Acquire) {
            let slice = readback.buffer.slice(..);
            let data = slice.get_mapped_range();
            let texel: &[f32] = bytemuck::cast_slice(&data);
            if texel.len() >= 2 {
                let log_luma = texel[0];
                let linear_avg = texel[1];
                let avg = log_luma.exp();
                if avg.is_finite() && linear_avg.is_finite() {
                    self.cached = LuminanceResult {
                        avg: avg.clamp(1e-6, 1e6),
                        linear_avg: linear_avg.clamp(1e-6, 1e6),
                    };
                } else {
                    log::warn!(target: "chromacore", "non-finite luminance readback (log_luma={log_luma}, linear_avg={linear_avg}); keeping last known-good value");
                    test_handle.on_non_finite_luminance();
                }
            }
            drop(data);
            readback.buffer.unmap();
            readback.in_flight.store(false, Ordering::Release);
        }

        self.index = previous;
        self.cached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_result_is_the_documented_constant() {
        let result = LuminanceResult::default();
        assert_eq!(result.avg, 0.18);
        assert_eq!(result.linear_avg, 1.0);
    }

    #[test]
    fn non_finite_readback_never_overwrites_the_cache() {
        // `poll`'s commit path only runs through `is_finite()` guards; a NaN
        // decoded log-luma must leave `cached` untouched. Exercised without
        // a device by checking the guard condition directly.
        let nan_avg = f32::NAN.exp();
        assert!(!nan_avg.is_finite());
    }
}
