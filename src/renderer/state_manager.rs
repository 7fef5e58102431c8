//! The dirty-flag driven state manager (design §4.1).
//!
//! `StateManager` is the sole owner of the dirty-flag set, the cached
//! `RenderState`, and the four texture snapshots. It never touches a GPU
//! handle directly — `apply_uniforms` writes into a [`UniformSink`] and
//! requests texture uploads through [`crate::host::HostHooks`], so this
//! module stays testable without a GPU.

use crate::host::HostHooks;
use crate::resources::background::BackgroundPattern;
use crate::resources::color::{ChannelSwizzle, ColorPrimaries, DitherMode, GamutMapping, Linearize, OutOfRange, PremultMode, QuantizeBits};
use crate::resources::dirty_flags::DirtyFlags;
use crate::resources::render_state::RenderState;
use crate::resources::texture_snapshot::{TextureData, TextureKind, TextureMetadata, TextureSnapshot};
use crate::resources::uniform_value::UniformValue;

/// Sink the state manager writes typed uniform values into. Implemented by
/// [`crate::renderer::pipeline::uniform_uploader::UniformUploader`] in
/// production; unit tests use a plain recording implementation.
pub trait UniformSink {
    fn set_uniform(&mut self, name: &'static str, value: UniformValue);
}

pub struct StateManager {
    state: RenderState,
    dirty: DirtyFlags,
    curves: TextureSnapshot,
    false_color_lut: TextureSnapshot,
    lut3d: TextureSnapshot,
    film_lut: TextureSnapshot,
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StateManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RenderState::default(),
            // First frame: every group must be uploaded regardless of the
            // (default) cached state.
            dirty: DirtyFlags::ALL,
            curves: TextureSnapshot::new(),
            false_color_lut: TextureSnapshot::new(),
            lut3d: TextureSnapshot::new(),
            film_lut: TextureSnapshot::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    #[must_use]
    pub fn has_pending_state_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty = DirtyFlags::ALL;
        self.curves.mark_dirty();
        self.false_color_lut.mark_dirty();
        self.lut3d.mark_dirty();
        self.film_lut.mark_dirty();
    }

    /// Replaces the cached state wholesale, diffing each field against the
    /// previous snapshot and marking only the flags whose group actually
    /// changed (design §4.1, §3.2 steady-state idempotence).
    pub fn apply_render_state(&mut self, rs: RenderState) {
        let prev = &self.state;

        if rs.color != prev.color {
            self.dirty |= DirtyFlags::COLOR;
        }
        if rs.color_inversion != prev.color_inversion {
            self.dirty |= DirtyFlags::INVERSION;
        }
        if rs.tone_mapping != prev.tone_mapping {
            self.dirty |= DirtyFlags::TONE_MAPPING;
        }
        if rs.background != prev.background {
            self.dirty |= DirtyFlags::BACKGROUND;
        }
        if rs.cdl != prev.cdl {
            self.dirty |= DirtyFlags::CDL;
        }
        if rs.wheels != prev.wheels {
            self.dirty |= DirtyFlags::WHEELS;
        }
        if rs.false_color.enabled != prev.false_color.enabled {
            self.dirty |= DirtyFlags::FALSE_COLOR;
        }
        if rs.zebra != prev.zebra {
            self.dirty |= DirtyFlags::ZEBRA;
        }
        if rs.channel_mode != prev.channel_mode {
            self.dirty |= DirtyFlags::CHANNEL_MODE;
        }
        if rs.display != prev.display {
            self.dirty |= DirtyFlags::DISPLAY;
        }
        if rs.highlights_shadows != prev.highlights_shadows {
            self.dirty |= DirtyFlags::HIGHLIGHTS_SHADOWS;
        }
        if rs.vibrance != prev.vibrance {
            self.dirty |= DirtyFlags::VIBRANCE;
        }
        if rs.clarity != prev.clarity {
            self.dirty |= DirtyFlags::CLARITY;
        }
        if rs.sharpen != prev.sharpen {
            self.dirty |= DirtyFlags::SHARPEN;
        }
        if rs.hsl_qualifier != prev.hsl_qualifier {
            self.dirty |= DirtyFlags::HSL;
        }
        if rs.gamut_mapping != prev.gamut_mapping {
            self.dirty |= DirtyFlags::GAMUT_MAPPING;
        }
        if rs.linearize != prev.linearize {
            self.dirty |= DirtyFlags::LINEARIZE;
        }
        if rs.channel_swizzle != prev.channel_swizzle {
            self.dirty |= DirtyFlags::CHANNEL_SWIZZLE;
        }
        if rs.premult_mode != prev.premult_mode {
            self.dirty |= DirtyFlags::PREMULT;
        }
        if rs.out_of_range != prev.out_of_range {
            self.dirty |= DirtyFlags::OUT_OF_RANGE;
        }
        if rs.dither_mode != prev.dither_mode || rs.quantize_bits != prev.quantize_bits {
            self.dirty |= DirtyFlags::DITHER;
        }
        if rs.color_primaries != prev.color_primaries {
            self.dirty |= DirtyFlags::COLOR_PRIMARIES;
        }
        if rs.color.inline_lut != prev.color.inline_lut {
            self.dirty |= DirtyFlags::INLINE_LUT;
        }

        if rs.curves_lut != prev.curves_lut {
            self.dirty |= DirtyFlags::CURVES;
            match &rs.curves_lut {
                Some(bytes) => self.curves.set(
                    TextureData::Bytes(bytes.clone()),
                    TextureMetadata { size: 256, channels: 4 },
                    1.0,
                ),
                None => self.curves.clear(1.0),
            }
        }

        if rs.false_color.lut != prev.false_color.lut {
            self.dirty |= DirtyFlags::FALSE_COLOR;
            match &rs.false_color.lut {
                Some(bytes) => self.false_color_lut.set(
                    TextureData::Bytes(bytes.clone()),
                    TextureMetadata { size: 256, channels: 1 },
                    1.0,
                ),
                None => self.false_color_lut.clear(1.0),
            }
        }

        // lut3D change detection: intensity, size, and data *identity*
        // (design §4.1 equality rules) — `Lut3d`'s `PartialEq` already
        // implements this.
        if rs.lut3d != prev.lut3d {
            self.dirty |= DirtyFlags::LUT3D;
            match &rs.lut3d.data {
                Some(data) => self.lut3d.set(
                    TextureData::Floats((**data).clone()),
                    TextureMetadata { size: rs.lut3d.size, channels: 3 },
                    rs.lut3d.intensity,
                ),
                None => self.lut3d.clear(rs.lut3d.intensity),
            }
        }

        self.state = rs;
    }

    pub fn set_color_inversion(&mut self, enabled: bool) {
        if self.state.color_inversion != enabled {
            self.state.color_inversion = enabled;
            self.dirty |= DirtyFlags::INVERSION;
        }
    }

    /// `setLUT(data, size, intensity)`. `data = None` takes the disable
    /// path; intensity is still recorded (design §3.2).
    pub fn set_lut(&mut self, data: Option<std::sync::Arc<Vec<f32>>>, size: u32, intensity: f32) {
        let new = crate::resources::color::Lut3d { data, size, intensity };
        if new != self.state.lut3d {
            match &new.data {
                Some(d) => self.lut3d.set(
                    TextureData::Floats((**d).clone()),
                    TextureMetadata { size, channels: 3 },
                    intensity,
                ),
                None => self.lut3d.clear(intensity),
            }
            self.state.lut3d = new;
            self.dirty |= DirtyFlags::LUT3D;
        }
    }

    pub fn set_gamut_mapping(&mut self, value: GamutMapping) {
        if self.state.gamut_mapping != value {
            self.state.gamut_mapping = value;
            self.dirty |= DirtyFlags::GAMUT_MAPPING;
        }
    }

    pub fn set_linearize(&mut self, value: Linearize) {
        if self.state.linearize != value {
            self.state.linearize = value;
            self.dirty |= DirtyFlags::LINEARIZE;
        }
    }

    pub fn set_out_of_range(&mut self, code: u8) {
        let value = OutOfRange(code);
        if self.state.out_of_range != value {
            self.state.out_of_range = value;
            self.dirty |= DirtyFlags::OUT_OF_RANGE;
        }
    }

    pub fn set_premult_mode(&mut self, code: i32) {
        let value = PremultMode::from_code(code);
        if self.state.premult_mode != value {
            self.state.premult_mode = value;
            self.dirty |= DirtyFlags::PREMULT;
        }
    }

    pub fn set_dither_mode(&mut self, code: i32) {
        let value = DitherMode::clamp_from(code);
        if self.state.dither_mode != value {
            self.state.dither_mode = value;
            self.dirty |= DirtyFlags::DITHER;
        }
    }

    pub fn set_quantize_bits(&mut self, bits: i32) {
        let value = QuantizeBits::clamp_from(bits);
        if self.state.quantize_bits != value {
            self.state.quantize_bits = value;
            self.dirty |= DirtyFlags::DITHER;
        }
    }

    pub fn set_channel_swizzle(&mut self, swizzle: ChannelSwizzle) {
        if swizzle != self.state.channel_swizzle {
            self.state.channel_swizzle = swizzle;
            self.dirty |= DirtyFlags::CHANNEL_SWIZZLE;
        }
    }

    pub fn set_color_primaries(&mut self, value: ColorPrimaries) {
        if self.state.color_primaries != value {
            self.state.color_primaries = value;
            self.dirty |= DirtyFlags::COLOR_PRIMARIES;
        }
    }

    pub fn set_background(&mut self, value: BackgroundPattern) {
        if self.state.background != value {
            self.state.background = value;
            self.dirty |= DirtyFlags::BACKGROUND;
        }
    }

    /// Sets the film emulation LUT snapshot directly; this is not part of
    /// `RenderState` (film emulation is a filter-chain effect, design
    /// §4.5.3), but it shares the same lazy-upload machinery as the other
    /// three texture kinds.
    pub fn set_film_lut(&mut self, data: Vec<f32>, size: u32) {
        self.film_lut.set(TextureData::Floats(data), TextureMetadata { size, channels: 3 }, 1.0);
    }

    #[must_use]
    pub fn texture_snapshot(&self, kind: TextureKind) -> &TextureSnapshot {
        match kind {
            TextureKind::CurvesLut => &self.curves,
            TextureKind::FalseColorLut => &self.false_color_lut,
            TextureKind::Lut3d => &self.lut3d,
            TextureKind::FilmLut => &self.film_lut,
        }
    }

    pub fn clear_texture_dirty_flag(&mut self, kind: TextureKind) {
        match kind {
            TextureKind::CurvesLut => self.curves.clear_dirty(),
            TextureKind::FalseColorLut => self.false_color_lut.clear_dirty(),
            TextureKind::Lut3d => self.lut3d.clear_dirty(),
            TextureKind::FilmLut => self.film_lut.clear_dirty(),
        }
    }

    /// Writes every dirty group's uniforms, in the fixed order documented
    /// by [`DirtyFlags::UPLOAD_ORDER`], requesting texture uploads through
    /// `host` when the corresponding snapshot is dirty. Clears each flag
    /// once its group has been written.
    pub fn apply_uniforms(&mut self, sink: &mut dyn UniformSink, host: &mut dyn HostHooks) {
        for &flag in DirtyFlags::UPLOAD_ORDER {
            if !self.dirty.contains(flag) {
                continue;
            }
            self.write_group(flag, sink, host);
            self.dirty.remove(flag);
        }
    }

    fn write_group(&mut self, flag: DirtyFlags, sink: &mut dyn UniformSink, host: &mut dyn HostHooks) {
        let s = &self.state;
        match flag {
            DirtyFlags::COLOR => {
                sink.set_uniform("u_exposure", s.color.effective_exposure().into());
                sink.set_uniform("u_gamma", UniformValue::Scalar(s.color.effective_gamma()));
                sink.set_uniform("u_saturation", UniformValue::Scalar(s.color.saturation));
                sink.set_uniform("u_contrast", s.color.effective_contrast().into());
                sink.set_uniform("u_brightness", UniformValue::Scalar(s.color.brightness));
                sink.set_uniform("u_temperature", UniformValue::Scalar(s.color.temperature));
                sink.set_uniform("u_tint", UniformValue::Scalar(s.color.tint));
                sink.set_uniform("u_scale", s.color.effective_scale().into());
                sink.set_uniform("u_offset", s.color.effective_offset().into());
            }
            DirtyFlags::LINEARIZE => {
                sink.set_uniform("u_linearize_log_type", UniformValue::Int(i32::from(s.linearize.log_type_code)));
                sink.set_uniform("u_linearize_gamma", UniformValue::Scalar(s.linearize.gamma));
                sink.set_uniform("u_linearize_srgb_to_linear", UniformValue::Int(i32::from(s.linearize.srgb_to_linear)));
                sink.set_uniform("u_linearize_rec709_to_linear", UniformValue::Int(i32::from(s.linearize.rec709_to_linear)));
                sink.set_uniform("u_linearize_alpha_type", UniformValue::Int(i32::from(s.linearize.alpha_type_code)));
            }
            DirtyFlags::COLOR_PRIMARIES => {
                sink.set_uniform("u_color_primaries_input", UniformValue::Int(i32::from(s.color_primaries.input_code)));
                sink.set_uniform("u_color_primaries_output", UniformValue::Int(i32::from(s.color_primaries.output_code)));
            }
            DirtyFlags::TONE_MAPPING => {
                sink.set_uniform("u_tone_mapping_mode", UniformValue::Int(i32::from(s.tone_mapping.mode.code())));
                sink.set_uniform("u_tone_mapping_white_point", UniformValue::Scalar(s.tone_mapping.white_point));
                sink.set_uniform("u_tone_mapping_headroom", UniformValue::Scalar(s.tone_mapping.effective_headroom()));
            }
            DirtyFlags::INVERSION => {
                sink.set_uniform("u_color_inversion", UniformValue::Int(i32::from(s.color_inversion)));
            }
            DirtyFlags::BACKGROUND => {
                sink.set_uniform("u_background_mode", UniformValue::Int(i32::from(s.background.mode.code())));
                sink.set_uniform("u_background_color_a", s.background.color_a.into());
                sink.set_uniform("u_background_color_b", s.background.color_b.into());
                sink.set_uniform("u_background_checker_size", UniformValue::Scalar(s.background.checker_size));
            }
            DirtyFlags::CDL => {
                sink.set_uniform("u_cdl_slope", s.cdl.slope.into());
                sink.set_uniform("u_cdl_offset", s.cdl.offset.into());
                sink.set_uniform("u_cdl_power", s.cdl.power.into());
                sink.set_uniform("u_cdl_saturation", UniformValue::Scalar(s.cdl.saturation));
                sink.set_uniform("u_cdl_working_colorspace", UniformValue::Int(i32::from(s.cdl.working_colorspace)));
            }
            DirtyFlags::CURVES => {
                sink.set_uniform("u_curves_enabled", UniformValue::Int(i32::from(s.curves_lut.is_some())));
                if self.curves.is_dirty() {
                    let data = match self.curves.data() {
                        TextureData::Bytes(b) => Some(b.as_slice()),
                        _ => None,
                    };
                    host.bind_curves_lut_texture(data);
                    self.curves.clear_dirty();
                }
            }
            DirtyFlags::WHEELS => {
                sink.set_uniform("u_wheels_lift_rgb", s.wheels.lift.rgb.into());
                sink.set_uniform("u_wheels_lift_lum", UniformValue::Scalar(s.wheels.lift.luminance));
                sink.set_uniform("u_wheels_gamma_rgb", s.wheels.gamma.rgb.into());
                sink.set_uniform("u_wheels_gamma_lum", UniformValue::Scalar(s.wheels.gamma.luminance));
                sink.set_uniform("u_wheels_gain_rgb", s.wheels.gain.rgb.into());
                sink.set_uniform("u_wheels_gain_lum", UniformValue::Scalar(s.wheels.gain.luminance));
                sink.set_uniform("u_wheels_master_rgb", s.wheels.master.rgb.into());
                sink.set_uniform("u_wheels_master_lum", UniformValue::Scalar(s.wheels.master.luminance));
            }
            DirtyFlags::FALSE_COLOR => {
                sink.set_uniform("u_false_color_enabled", UniformValue::Int(i32::from(s.false_color.enabled)));
                if self.false_color_lut.is_dirty() {
                    let data = match self.false_color_lut.data() {
                        TextureData::Bytes(b) => Some(b.as_slice()),
                        _ => None,
                    };
                    host.bind_false_color_lut_texture(data);
                    self.false_color_lut.clear_dirty();
                }
            }
            DirtyFlags::ZEBRA => {
                sink.set_uniform("u_zebra_enabled", UniformValue::Int(i32::from(s.zebra.enabled)));
                sink.set_uniform("u_zebra_high_threshold", UniformValue::Scalar(s.zebra.high_threshold));
                sink.set_uniform("u_zebra_low_threshold", UniformValue::Scalar(s.zebra.low_threshold));
            }
            DirtyFlags::CHANNEL_MODE => {
                sink.set_uniform("u_channel_mode", UniformValue::Int(i32::from(s.channel_mode.code())));
            }
            DirtyFlags::LUT3D => {
                sink.set_uniform("u_lut3d_intensity", UniformValue::Scalar(s.lut3d.intensity));
                sink.set_uniform("u_lut3d_size", UniformValue::Scalar(s.lut3d.size as f32));
                if self.lut3d.is_dirty() {
                    if let TextureData::Floats(floats) = self.lut3d.data() {
                        host.bind_lut3d_texture(floats, self.lut3d.metadata().size);
                    }
                    self.lut3d.clear_dirty();
                }
            }
            DirtyFlags::DISPLAY => {
                sink.set_uniform("u_display_transfer", UniformValue::Int(i32::from(s.display.transfer_code)));
                sink.set_uniform("u_display_gamma", UniformValue::Scalar(s.display.display_gamma));
                sink.set_uniform("u_display_brightness", UniformValue::Scalar(s.display.brightness));
                sink.set_uniform("u_display_custom_gamma", UniformValue::Scalar(s.display.custom_gamma));
            }
            DirtyFlags::HIGHLIGHTS_SHADOWS => {
                sink.set_uniform("u_highlights", UniformValue::Scalar(s.highlights_shadows.highlights));
                sink.set_uniform("u_shadows", UniformValue::Scalar(s.highlights_shadows.shadows));
                sink.set_uniform("u_whites", UniformValue::Scalar(s.highlights_shadows.whites));
                sink.set_uniform("u_blacks", UniformValue::Scalar(s.highlights_shadows.blacks));
            }
            DirtyFlags::VIBRANCE => {
                sink.set_uniform("u_vibrance_amount", UniformValue::Scalar(s.vibrance.amount));
                sink.set_uniform("u_vibrance_skin_protection", UniformValue::Int(i32::from(s.vibrance.skin_protection)));
            }
            DirtyFlags::CLARITY => {
                sink.set_uniform("u_clarity", UniformValue::Scalar(s.clarity));
            }
            DirtyFlags::SHARPEN => {
                sink.set_uniform("u_sharpen", UniformValue::Scalar(s.sharpen));
            }
            DirtyFlags::HSL => {
                let q = &s.hsl_qualifier;
                sink.set_uniform("u_hsl_enabled", UniformValue::Int(i32::from(q.enabled)));
                sink.set_uniform("u_hsl_hue_center", UniformValue::Scalar(q.hue_center));
                sink.set_uniform("u_hsl_hue_range", UniformValue::Scalar(q.hue_range));
                sink.set_uniform("u_hsl_sat_min", UniformValue::Scalar(q.sat_min));
                sink.set_uniform("u_hsl_sat_max", UniformValue::Scalar(q.sat_max));
                sink.set_uniform("u_hsl_lum_min", UniformValue::Scalar(q.lum_min));
                sink.set_uniform("u_hsl_lum_max", UniformValue::Scalar(q.lum_max));
                sink.set_uniform("u_hsl_softness", UniformValue::Scalar(q.softness));
                sink.set_uniform("u_hsl_invert", UniformValue::Int(i32::from(q.invert)));
                sink.set_uniform("u_hsl_preview_matte", UniformValue::Int(i32::from(q.preview_matte)));
                sink.set_uniform("u_hsl_hue_shift", UniformValue::Scalar(q.hue_shift));
                sink.set_uniform("u_hsl_sat_scale", UniformValue::Scalar(q.sat_scale));
                sink.set_uniform("u_hsl_lum_scale", UniformValue::Scalar(q.lum_scale));
            }
            DirtyFlags::GAMUT_MAPPING => {
                sink.set_uniform("u_gamut_mapping_enabled", UniformValue::Int(i32::from(s.gamut_mapping.enabled)));
                sink.set_uniform("u_gamut_mapping_mode", UniformValue::Int(i32::from(s.gamut_mapping.mode)));
            }
            DirtyFlags::INLINE_LUT => {
                match &s.color.inline_lut {
                    Some(lut) => {
                        sink.set_uniform("u_inline_lut_enabled", UniformValue::Int(1));
                        sink.set_uniform("u_inline_lut_channels", UniformValue::Int(i32::from(lut.channels)));
                        host.bind_inline_lut_texture(&lut.data, 256, u32::from(lut.channels));
                    }
                    None => {
                        sink.set_uniform("u_inline_lut_enabled", UniformValue::Int(0));
                    }
                }
            }
            DirtyFlags::OUT_OF_RANGE => {
                sink.set_uniform("u_out_of_range", UniformValue::Int(i32::from(s.out_of_range.0)));
            }
            DirtyFlags::CHANNEL_SWIZZLE => {
                let [a, b, c, d] = s.channel_swizzle.0;
                sink.set_uniform(
                    "u_channel_swizzle",
                    UniformValue::IVec4([i32::from(a), i32::from(b), i32::from(c), i32::from(d)]),
                );
            }
            DirtyFlags::PREMULT => {
                sink.set_uniform("u_premult_mode", UniformValue::Int(s.premult_mode as i32));
            }
            DirtyFlags::DITHER => {
                sink.set_uniform("u_dither_mode", UniformValue::Int(i32::from(s.dither_mode.0)));
                sink.set_uniform("u_quantize_bits", UniformValue::Int(i32::from(s.quantize_bits.0)));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NoopHostHooks;
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingSink {
        writes: HashMap<&'static str, UniformValue>,
    }

    impl UniformSink for RecordingSink {
        fn set_uniform(&mut self, name: &'static str, value: UniformValue) {
            self.writes.insert(name, value);
        }
    }

    #[test]
    fn steady_state_reapply_produces_empty_dirty_set() {
        let mut mgr = StateManager::new();
        let rs = RenderState::default();
        let mut sink = RecordingSink::default();
        let mut host = NoopHostHooks::default();

        mgr.apply_render_state(rs.clone());
        mgr.apply_uniforms(&mut sink, &mut host);
        assert!(!mgr.has_pending_state_changes());

        mgr.apply_render_state(rs);
        assert!(!mgr.has_pending_state_changes(), "identical re-apply must not dirty anything");
    }

    #[test]
    fn changing_one_field_only_dirties_its_group() {
        let mut mgr = StateManager::new();
        let mut sink = RecordingSink::default();
        let mut host = NoopHostHooks::default();
        mgr.apply_render_state(RenderState::default());
        mgr.apply_uniforms(&mut sink, &mut host);

        let mut rs = RenderState::default();
        rs.color_inversion = true;
        mgr.apply_render_state(rs);
        assert!(mgr.has_pending_state_changes());

        sink.writes.clear();
        mgr.apply_uniforms(&mut sink, &mut host);
        assert!(sink.writes.contains_key("u_color_inversion"));
        assert!(!sink.writes.contains_key("u_exposure"));
        assert!(!mgr.has_pending_state_changes());
    }

    #[test]
    fn identity_channel_swizzle_never_dirties() {
        let mut mgr = StateManager::new();
        let mut sink = RecordingSink::default();
        let mut host = NoopHostHooks::default();
        mgr.apply_render_state(RenderState::default());
        mgr.apply_uniforms(&mut sink, &mut host);

        // Reapplying the identity swizzle via a fresh default RenderState
        // must not re-dirty CHANNEL_SWIZZLE.
        mgr.apply_render_state(RenderState::default());
        assert!(!mgr.has_pending_state_changes());
    }

    #[test]
    fn lut_disable_path_records_intensity_without_redirty() {
        let mut mgr = StateManager::new();
        let mut sink = RecordingSink::default();
        let mut host = NoopHostHooks::default();

        mgr.set_lut(None, 0, 0.75);
        mgr.apply_uniforms(&mut sink, &mut host);
        assert!(!mgr.has_pending_state_changes());

        let mut rs = mgr.state().clone();
        rs.lut3d.intensity = 0.75;
        mgr.apply_render_state(rs);
        assert!(
            !mgr.has_pending_state_changes(),
            "re-applying the same disabled intensity must not mark lut3D dirty"
        );
    }

    #[test]
    fn mark_all_dirty_sets_every_flag() {
        let mut mgr = StateManager::new();
        let mut sink = RecordingSink::default();
        let mut host = NoopHostHooks::default();
        mgr.apply_uniforms(&mut sink, &mut host);
        assert!(!mgr.has_pending_state_changes());

        mgr.mark_all_dirty();
        assert!(mgr.has_pending_state_changes());
    }
}
