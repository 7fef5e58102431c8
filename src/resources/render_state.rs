//! `RenderState`: the immutable value snapshot of everything the core needs
//! to draw one frame (design §3.1).
//!
//! Every `applyRenderState` call supplies a complete `RenderState`; there is
//! no partial-update path. Absent optional fields reset to their defaults —
//! the `StateManager` never "keeps the previous value" for a field that is
//! missing from a new snapshot (design §3.2).

use crate::resources::background::BackgroundPattern;
use crate::resources::color::{
    Cdl, ChannelMode, ChannelSwizzle, ColorAdjustments, ColorPrimaries, ColorWheels, DisplayConfig,
    DitherMode, FalseColor, GamutMapping, HighlightsShadows, HslQualifier, Linearize, Lut3d,
    OutOfRange, PremultMode, QuantizeBits, Vibrance, Zebra,
};
use crate::resources::tone_mapping::ToneMappingState;
use crate::resources::transition::TransitionConfig;

/// One complete frame's worth of declarative render state.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub color: ColorAdjustments,
    pub color_inversion: bool,
    pub tone_mapping: ToneMappingState,
    pub background: BackgroundPattern,
    pub cdl: Cdl,
    /// Packed RGBA curves LUT, 256 texels × 4 channels (R, G, B, master in
    /// the alpha channel). `None` disables the curves stage.
    pub curves_lut: Option<Vec<u8>>,
    pub wheels: ColorWheels,
    pub false_color: FalseColor,
    pub zebra: Zebra,
    pub channel_mode: ChannelMode,
    pub lut3d: Lut3d,
    pub display: DisplayConfig,
    pub highlights_shadows: HighlightsShadows,
    pub vibrance: Vibrance,
    pub clarity: f32,
    pub sharpen: f32,
    pub hsl_qualifier: HslQualifier,
    pub gamut_mapping: GamutMapping,
    pub linearize: Linearize,
    pub channel_swizzle: ChannelSwizzle,
    pub premult_mode: PremultMode,
    pub out_of_range: OutOfRange,
    pub dither_mode: DitherMode,
    pub quantize_bits: QuantizeBits,
    pub color_primaries: ColorPrimaries,
    pub transition: Option<TransitionConfig>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            color: ColorAdjustments::default(),
            color_inversion: false,
            tone_mapping: ToneMappingState::default(),
            background: BackgroundPattern::default(),
            cdl: Cdl::default(),
            curves_lut: None,
            wheels: ColorWheels::default(),
            false_color: FalseColor::default(),
            zebra: Zebra::default(),
            channel_mode: ChannelMode::default(),
            lut3d: Lut3d::default(),
            display: DisplayConfig::default(),
            highlights_shadows: HighlightsShadows::default(),
            vibrance: Vibrance::default(),
            clarity: 0.0,
            sharpen: 0.0,
            hsl_qualifier: HslQualifier::default(),
            gamut_mapping: GamutMapping::default(),
            linearize: Linearize::default(),
            channel_swizzle: ChannelSwizzle::default(),
            premult_mode: PremultMode::default(),
            out_of_range: OutOfRange::default(),
            dither_mode: DitherMode::default(),
            quantize_bits: QuantizeBits::default(),
            color_primaries: ColorPrimaries::default(),
            transition: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_equals_default_state() {
        assert_eq!(RenderState::default(), RenderState::default());
    }

    #[test]
    fn color_inversion_alone_differs() {
        let base = RenderState::default();
        let mut inverted = base.clone();
        inverted.color_inversion = true;
        assert_ne!(base, inverted);
    }
}
