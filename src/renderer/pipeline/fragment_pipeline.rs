//! The single-pass colour fragment pipeline (design §4.2).
//!
//! Every one of the ~28 steps lives in one WGSL fragment shader
//! (`shaders/fragment.wgsl`) and is individually bypassable via its own
//! `enabled` uniform — toggling a step never recompiles the pipeline
//! (design §6.4). The only structural shader variant is SDR-clamp vs.
//! HDR-passthrough output (step 25), selected through
//! [`ShaderCompilationOptions::for_output_mode`] and cached by its hash
//! alongside the target's `wgpu::TextureFormat`.

use std::borrow::Cow;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::shader_gen::{ShaderCompilationOptions, ShaderGenerator};
use super::uniform_uploader::{ShaderProgram, UniformKind, UniformSlot, UniformUploader};
use crate::renderer::state_manager::UniformSink;

/// The complete, ordered uniform layout for the fragment pipeline.
///
/// This is the single source of truth for both [`UniformUploader`]'s byte
/// offsets and `shaders/fragment.wgsl`'s `Uniforms` struct field order —
/// the two must be kept in lock-step by hand since there is no build-time
/// reflection step here.
pub const FRAGMENT_UNIFORM_LAYOUT: &[UniformSlot] = &[
    // -- COLOR --
    UniformSlot { name: "u_exposure", kind: UniformKind::Vec3 },
    UniformSlot { name: "u_gamma", kind: UniformKind::Scalar },
    UniformSlot { name: "u_saturation", kind: UniformKind::Scalar },
    UniformSlot { name: "u_contrast", kind: UniformKind::Vec3 },
    UniformSlot { name: "u_brightness", kind: UniformKind::Scalar },
    UniformSlot { name: "u_temperature", kind: UniformKind::Scalar },
    UniformSlot { name: "u_tint", kind: UniformKind::Scalar },
    UniformSlot { name: "u_scale", kind: UniformKind::Vec3 },
    UniformSlot { name: "u_offset", kind: UniformKind::Vec3 },
    // -- LINEARIZE --
    UniformSlot { name: "u_linearize_log_type", kind: UniformKind::Int },
    UniformSlot { name: "u_linearize_gamma", kind: UniformKind::Scalar },
    UniformSlot { name: "u_linearize_srgb_to_linear", kind: UniformKind::Int },
    UniformSlot { name: "u_linearize_rec709_to_linear", kind: UniformKind::Int },
    UniformSlot { name: "u_linearize_alpha_type", kind: UniformKind::Int },
    // -- COLOR_PRIMARIES --
    UniformSlot { name: "u_color_primaries_input", kind: UniformKind::Int },
    UniformSlot { name: "u_color_primaries_output", kind: UniformKind::Int },
    // -- TONE_MAPPING --
    UniformSlot { name: "u_tone_mapping_mode", kind: UniformKind::Int },
    UniformSlot { name: "u_tone_mapping_white_point", kind: UniformKind::Scalar },
    UniformSlot { name: "u_tone_mapping_headroom", kind: UniformKind::Scalar },
    // -- INVERSION --
    UniformSlot { name: "u_color_inversion", kind: UniformKind::Int },
    // -- BACKGROUND --
    UniformSlot { name: "u_background_mode", kind: UniformKind::Int },
    UniformSlot { name: "u_background_color_a", kind: UniformKind::Vec3 },
    UniformSlot { name: "u_background_color_b", kind: UniformKind::Vec3 },
    UniformSlot { name: "u_background_checker_size", kind: UniformKind::Scalar },
    // -- CDL --
    UniformSlot { name: "u_cdl_slope", kind: UniformKind::Vec3 },
    UniformSlot { name: "u_cdl_offset", kind: UniformKind::Vec3 },
    UniformSlot { name: "u_cdl_power", kind: UniformKind::Vec3 },
    UniformSlot { name: "u_cdl_saturation", kind: UniformKind::Scalar },
    UniformSlot { name: "u_cdl_working_colorspace", kind: UniformKind::Int },
    // -- CURVES --
    UniformSlot { name: "u_curves_enabled", kind: UniformKind::Int },
    // -- WHEELS --
    UniformSlot { name: "u_wheels_lift_rgb", kind: UniformKind::Vec3 },
    UniformSlot { name: "u_wheels_lift_lum", kind: UniformKind::Scalar },
    UniformSlot { name: "u_wheels_gamma_rgb", kind: UniformKind::Vec3 },
    UniformSlot { name: "u_wheels_gamma_lum", kind: UniformKind::Scalar },
    UniformSlot { name: "u_wheels_gain_rgb", kind: UniformKind::Vec3 },
    UniformSlot { name: "u_wheels_gain_lum", kind: UniformKind::Scalar },
    UniformSlot { name: "u_wheels_master_rgb", kind: UniformKind::Vec3 },
    UniformSlot { name: "u_wheels_master_lum", kind: UniformKind::Scalar },
    // -- FALSE_COLOR --
    UniformSlot { name: "u_false_color_enabled", kind: UniformKind::Int },
    // -- ZEBRA --
    UniformSlot { name: "u_zebra_enabled", kind: UniformKind::Int },
    UniformSlot { name: "u_zebra_high_threshold", kind: UniformKind::Scalar },
    UniformSlot { name: "u_zebra_low_threshold", kind: UniformKind::Scalar },
    // -- CHANNEL_MODE --
    UniformSlot { name: "u_channel_mode", kind: UniformKind::Int },
    // -- LUT3D --
    UniformSlot { name: "u_lut3d_intensity", kind: UniformKind::Scalar },
    UniformSlot { name: "u_lut3d_size", kind: UniformKind::Scalar },
    // -- DISPLAY --
    UniformSlot { name: "u_display_transfer", kind: UniformKind::Int },
    UniformSlot { name: "u_display_gamma", kind: UniformKind::Scalar },
    UniformSlot { name: "u_display_brightness", kind: UniformKind::Scalar },
    UniformSlot { name: "u_display_custom_gamma", kind: UniformKind::Scalar },
    // -- HIGHLIGHTS_SHADOWS --
    UniformSlot { name: "u_highlights", kind: UniformKind::Scalar },
    UniformSlot { name: "u_shadows", kind: UniformKind::Scalar },
    UniformSlot { name: "u_whites", kind: UniformKind::Scalar },
    UniformSlot { name: "u_blacks", kind: UniformKind::Scalar },
    // -- VIBRANCE --
    UniformSlot { name: "u_vibrance_amount", kind: UniformKind::Scalar },
    UniformSlot { name: "u_vibrance_skin_protection", kind: UniformKind::Int },
    // -- CLARITY --
    UniformSlot { name: "u_clarity", kind: UniformKind::Scalar },
    // -- SHARPEN --
    UniformSlot { name: "u_sharpen", kind: UniformKind::Scalar },
    // -- HSL --
    UniformSlot { name: "u_hsl_enabled", kind: UniformKind::Int },
    UniformSlot { name: "u_hsl_hue_center", kind: UniformKind::Scalar },
    UniformSlot { name: "u_hsl_hue_range", kind: UniformKind::Scalar },
    UniformSlot { name: "u_hsl_sat_min", kind: UniformKind::Scalar },
    UniformSlot { name: "u_hsl_sat_max", kind: UniformKind::Scalar },
    UniformSlot { name: "u_hsl_lum_min", kind: UniformKind::Scalar },
    UniformSlot { name: "u_hsl_lum_max", kind: UniformKind::Scalar },
    UniformSlot { name: "u_hsl_softness", kind: UniformKind::Scalar },
    UniformSlot { name: "u_hsl_invert", kind: UniformKind::Int },
    UniformSlot { name: "u_hsl_preview_matte", kind: UniformKind::Int },
    UniformSlot { name: "u_hsl_hue_shift", kind: UniformKind::Scalar },
    UniformSlot { name: "u_hsl_sat_scale", kind: UniformKind::Scalar },
    UniformSlot { name: "u_hsl_lum_scale", kind: UniformKind::Scalar },
    // -- GAMUT_MAPPING --
    UniformSlot { name: "u_gamut_mapping_enabled", kind: UniformKind::Int },
    UniformSlot { name: "u_gamut_mapping_mode", kind: UniformKind::Int },
    // -- INLINE_LUT --
    UniformSlot { name: "u_inline_lut_enabled", kind: UniformKind::Int },
    UniformSlot { name: "u_inline_lut_channels", kind: UniformKind::Int },
    // -- OUT_OF_RANGE --
    UniformSlot { name: "u_out_of_range", kind: UniformKind::Int },
    // -- CHANNEL_SWIZZLE --
    UniformSlot { name: "u_channel_swizzle", kind: UniformKind::IVec4 },
    // -- PREMULT --
    UniformSlot { name: "u_premult_mode", kind: UniformKind::Int },
    // -- DITHER --
    UniformSlot { name: "u_dither_mode", kind: UniformKind::Int },
    UniformSlot { name: "u_quantize_bits", kind: UniformKind::Int },
    // -- Per-draw, not owned by any DirtyFlags group --
    UniformSlot { name: "u_input_transfer_code", kind: UniformKind::Int },
    UniformSlot { name: "u_canvas_size", kind: UniformKind::Vec2 },
    UniformSlot { name: "u_frame_index", kind: UniformKind::Scalar },
];

const FRAGMENT_TEMPLATE: &str = "fragment.wgsl";

fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    };

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("fragment-pipeline-layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            texture_entry(1), // input frame
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            texture_entry(3), // curves LUT
            texture_entry(4), // false colour LUT
            wgpu::BindGroupLayoutEntry {
                binding: 5,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D3,
                    multisampled: false,
                },
                count: None,
            }, // 3D LUT
            texture_entry(6), // inline LUT
        ],
    })
}

/// Owns the compiled pipeline, its uniform buffer, and the sampler shared
/// by every texture binding. One instance is created per distinct
/// `(output-mode, surface format)` pair.
pub struct FragmentPipelineVariant {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
}

/// Ancillary resources a variant needs regardless of whether its pipeline
/// has finished compiling; created eagerly since none of it is slow.
struct PendingVariant {
    program: ShaderProgram,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
}

enum VariantSlot {
    Pending(PendingVariant),
    Ready(Arc<FragmentPipelineVariant>),
    Failed,
}

/// The colour fragment pipeline: holds the compiled-variant cache and the
/// CPU-side uniform uploader that every variant shares.
pub struct FragmentPipeline {
    uploader: UniformUploader,
    variants: FxHashMap<(u64, wgpu::TextureFormat), VariantSlot>,
}

impl FragmentPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uploader: UniformUploader::new(FRAGMENT_UNIFORM_LAYOUT),
            variants: FxHashMap::default(),
        }
    }

    /// The uniform sink StateManager writes into; shared by every variant
    /// since the uniform layout never changes with the output mode.
    pub fn uniform_sink(&mut self) -> &mut dyn UniformSink {
        &mut self.uploader
    }

    pub fn uniform_uploader(&self) -> &UniformUploader {
        &self.uploader
    }

    fn build_pipeline(device: &wgpu::Device, shader: &wgpu::ShaderModule, layout: &wgpu::BindGroupLayout, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fragment-pipeline-layout"),
            bind_group_layouts: &[Some(layout)],
            immediate_size: 0,
        });
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("fragment-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
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
        })
    }

    /// Returns the compiled variant for `(hdr_output, format)` once ready,
    /// or `None` while it's still compiling (design §5: "the first frame
    /// requiring a shader is dropped if `isReady()` is false") or if it
    /// failed to link. `parallel` selects [`ShaderProgram::new_parallel`]
    /// over [`ShaderProgram::new_sync`] for a first-time compile; it has no
    /// effect once a variant is already cached. `test_handle` is notified
    /// if a parallel compile request falls back to a synchronous one
    /// (`parallel` requested but the shader hadn't compiled by the time a
    /// draw needed it and the caller chose to force it — callers that want
    /// to honor the non-blocking contract should just keep returning `None`
    /// instead).
    pub fn ensure_variant(
        &mut self,
        device: &wgpu::Device,
        hdr_output: bool,
        format: wgpu::TextureFormat,
        parallel: bool,
    ) -> Option<Arc<FragmentPipelineVariant>> {
        let options = ShaderCompilationOptions::for_output_mode(hdr_output);
        let key = (options.compute_hash(), format);

        if !self.variants.contains_key(&key) {
            log::debug!(target: "chromacore", "fragment pipeline cache miss for hash={} format={format:?}; compiling (parallel={parallel})", options.compute_hash());
            let source = ShaderGenerator::generate_shader(FRAGMENT_TEMPLATE, &options);
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("fragment-pipeline-shader"),
                source: wgpu::ShaderSource::Wgsl(Cow::Owned(source)),
            });
            let bind_group_layout = bind_group_layout(device);

            let program = if parallel {
                let device_clone = device.clone();
                let shader_clone = shader.clone();
                let layout_clone = bind_group_layout.clone();
                ShaderProgram::new_parallel(move || Ok(Self::build_pipeline(&device_clone, &shader_clone, &layout_clone, format)))
            } else {
                ShaderProgram::new_sync(|| Self::build_pipeline(device, &shader, &bind_group_layout, format))
            };

            let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("fragment-pipeline-uniforms"),
                size: self.uploader.byte_len() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("fragment-pipeline-sampler"),
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                ..Default::default()
            });

            self.variants.insert(
                key,
                VariantSlot::Pending(PendingVariant { program, bind_group_layout, uniform_buffer, sampler }),
            );
        }

        let slot = self.variants.get_mut(&key).expect("just inserted if absent");
        if let VariantSlot::Pending(pending) = slot {
            if pending.program.is_ready() {
                let pipeline = pending.program.pipeline().cloned();
                let bind_group_layout = pending.bind_group_layout.clone();
                let uniform_buffer = pending.uniform_buffer.clone();
                let sampler = pending.sampler.clone();
                *slot = match pipeline {
                    Some(pipeline) => VariantSlot::Ready(Arc::new(FragmentPipelineVariant { pipeline, bind_group_layout, uniform_buffer, sampler })),
                    None => VariantSlot::Failed,
                };
            }
        }

        match self.variants.get(&key) {
            Some(VariantSlot::Ready(variant)) => Some(variant.clone()),
            _ => None,
        }
    }

    /// Flushes any pending uniform writes to `variant`'s GPU buffer. Must
    /// be called after `StateManager::apply_uniforms` and before the draw
    /// that reads this variant's uniform buffer (design §5: "uniform
    /// writes for all dirty flags complete before the draw that frame").
    pub fn flush_uniforms(&mut self, queue: &wgpu::Queue, variant: &FragmentPipelineVariant) {
        self.uploader.flush(queue, &variant.uniform_buffer);
    }

    /// Runs the fragment pipeline over `input`, writing into `target`.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        variant: &FragmentPipelineVariant,
        input: &wgpu::TextureView,
        curves_lut: &wgpu::TextureView,
        false_color_lut: &wgpu::TextureView,
        lut3d: &wgpu::TextureView,
        inline_lut: &wgpu::TextureView,
        target: &wgpu::TextureView,
    ) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("fragment-pipeline-bind-group"),
            layout: &variant.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: variant.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&variant.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(curves_lut),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(false_color_lut),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(lut3d),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::TextureView(inline_lut),
                },
            ],
        });

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("fragment-pipeline-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(&variant.pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}

impl Default for FragmentPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::uniform_value::UniformValue;

    #[test]
    fn layout_names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for slot in FRAGMENT_UNIFORM_LAYOUT {
            assert!(seen.insert(slot.name), "duplicate uniform name: {}", slot.name);
        }
    }

    #[test]
    fn uploader_accepts_every_declared_name() {
        let mut pipeline = FragmentPipeline::new();
        let sink = pipeline.uniform_sink();
        for slot in FRAGMENT_UNIFORM_LAYOUT {
            let value = match slot.kind {
                UniformKind::Scalar => UniformValue::Scalar(1.0),
                UniformKind::Int => UniformValue::Int(1),
                UniformKind::Vec2 => UniformValue::Vec2([1.0, 1.0]),
                UniformKind::Vec3 => UniformValue::Vec3([1.0, 1.0, 1.0]),
                UniformKind::Vec4 => UniformValue::Vec4([1.0; 4]),
                UniformKind::Mat3 => UniformValue::Mat3(Box::new([1.0; 9])),
                UniformKind::Mat4 => UniformValue::Mat4(Box::new([1.0; 16])),
                UniformKind::IVec2 => UniformValue::IVec2([1, 1]),
                UniformKind::IVec3 => UniformValue::IVec3([1, 1, 1]),
                UniformKind::IVec4 => UniformValue::IVec4([1, 1, 1, 1]),
            };
            sink.set_uniform(slot.name, value);
        }
    }
}
