//! Value types for the colour-grading portion of `RenderState` (design §3.1,
//! §4.2 steps 0.5–15).
//!
//! Every type here is a plain, `PartialEq`-derived value struct: the
//! `StateManager`'s change detection is a field-by-field `!=` comparison, so
//! equality has to mean exactly "would produce the same uniform uploads".

use glam::Vec3;

/// Per-channel colour adjustments (design §4.2 steps 2–7).
#[derive(Debug, Clone, PartialEq)]
pub struct ColorAdjustments {
    /// Stops of exposure, broadcast to RGB when no per-channel override is
    /// set. Applied as `color * 2^exposure`.
    pub exposure: f32,
    /// Optional per-channel exposure override.
    pub exposure_rgb: Option<Vec3>,
    pub gamma: f32,
    pub saturation: f32,
    pub contrast: f32,
    pub contrast_rgb: Option<Vec3>,
    pub brightness: f32,
    pub temperature: f32,
    pub tint: f32,
    pub scale: Vec3,
    pub offset: Vec3,
    /// Inline 1D LUT carried directly on the colour state, distinct from the
    /// curves/false-colour/3D LUT snapshots the `TextureCache` owns.
    pub inline_lut: Option<InlineLut>,
}

impl Default for ColorAdjustments {
    fn default() -> Self {
        Self {
            exposure: 0.0,
            exposure_rgb: None,
            gamma: 1.0,
            saturation: 1.0,
            contrast: 1.0,
            contrast_rgb: None,
            brightness: 0.0,
            temperature: 0.0,
            tint: 0.0,
            scale: Vec3::ONE,
            offset: Vec3::ZERO,
            inline_lut: None,
        }
    }
}

impl ColorAdjustments {
    /// Resolves the effective per-channel exposure, sanitizing non-finite
    /// components to the identity value (0 stops) and broadcasting the
    /// scalar when no per-channel override is set.
    #[must_use]
    pub fn effective_exposure(&self) -> Vec3 {
        match self.exposure_rgb {
            Some(rgb) => sanitize_vec3(rgb, 0.0),
            None => {
                let e = if self.exposure.is_finite() { self.exposure } else { 0.0 };
                Vec3::splat(e)
            }
        }
    }

    /// Resolves effective per-channel contrast, sanitizing to identity (1.0).
    #[must_use]
    pub fn effective_contrast(&self) -> Vec3 {
        match self.contrast_rgb {
            Some(rgb) => sanitize_vec3(rgb, 1.0),
            None => {
                let c = if self.contrast.is_finite() { self.contrast } else { 1.0 };
                Vec3::splat(c)
            }
        }
    }

    /// Gamma clamped to a small positive epsilon so `pow(x, 1/gamma)` never
    /// sees a zero or negative denominator.
    #[must_use]
    pub fn effective_gamma(&self) -> f32 {
        if self.gamma.is_finite() {
            self.gamma.max(1e-4)
        } else {
            1.0
        }
    }

    /// Scale sanitized to identity (1.0) on non-finite components.
    #[must_use]
    pub fn effective_scale(&self) -> Vec3 {
        sanitize_vec3(self.scale, 1.0)
    }

    /// Offset sanitized to identity (0.0) on non-finite components.
    #[must_use]
    pub fn effective_offset(&self) -> Vec3 {
        sanitize_vec3(self.offset, 0.0)
    }
}

/// Sanitizes each component of `v`, replacing non-finite values with
/// `identity`. Shared by every per-channel setter's validation contract.
#[must_use]
pub fn sanitize_vec3(v: Vec3, identity: f32) -> Vec3 {
    Vec3::new(
        if v.x.is_finite() { v.x } else { identity },
        if v.y.is_finite() { v.y } else { identity },
        if v.z.is_finite() { v.z } else { identity },
    )
}

/// An inline 1D LUT carried on `ColorAdjustments`. Move-on-set per design §9:
/// the `StateManager` takes ownership on `setLUT`/`applyRenderState` and
/// holds it until the next set or dispose, never aliasing the caller's
/// buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineLut {
    pub data: Vec<u8>,
    pub channels: u8,
}

/// Colour Decision List (design §4.2 step 12, GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cdl {
    pub slope: Vec3,
    pub offset: Vec3,
    pub power: Vec3,
    pub saturation: f32,
    pub working_colorspace: u8,
}

impl Default for Cdl {
    fn default() -> Self {
        Self {
            slope: Vec3::ONE,
            offset: Vec3::ZERO,
            power: Vec3::ONE,
            saturation: 1.0,
            working_colorspace: 0,
        }
    }
}

/// One lift/gamma/gain/master wheel: an RGB balance plus an overall
/// luminance term (design §3.1, §4.2 step 11).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorWheel {
    pub rgb: Vec3,
    pub luminance: f32,
}

impl Default for ColorWheel {
    fn default() -> Self {
        Self {
            rgb: Vec3::ZERO,
            luminance: 0.0,
        }
    }
}

/// Lift/gamma/gain/master colour wheels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorWheels {
    pub lift: ColorWheel,
    pub gamma: ColorWheel,
    pub gain: ColorWheel,
    pub master: ColorWheel,
}

/// False-colour exposure visualization (design §4.2 step 23).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FalseColor {
    pub enabled: bool,
    pub lut: Option<Vec<u8>>,
}

/// Zebra-stripe overexposure/underexposure warning (design §4.2 step 24).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zebra {
    pub enabled: bool,
    pub high_threshold: f32,
    pub low_threshold: f32,
}

impl Default for Zebra {
    fn default() -> Self {
        Self {
            enabled: false,
            high_threshold: 1.0,
            low_threshold: 0.0,
        }
    }
}

/// Channel isolation mode (design §6.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelMode {
    #[default]
    Rgb = 0,
    R = 1,
    G = 2,
    B = 3,
    A = 4,
    Luminance = 5,
}

impl ChannelMode {
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => ChannelMode::R,
            2 => ChannelMode::G,
            3 => ChannelMode::B,
            4 => ChannelMode::A,
            5 => ChannelMode::Luminance,
            _ => ChannelMode::Rgb,
        }
    }

    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// 3D LUT cube state (design §3.1, §4.2 step 14).
///
/// Change detection for this type is an identity comparison on `data`, not a
/// byte-content comparison — see `StateManager`'s equality rules.
#[derive(Debug, Clone)]
pub struct Lut3d {
    pub data: Option<std::sync::Arc<Vec<f32>>>,
    pub size: u32,
    pub intensity: f32,
}

impl Default for Lut3d {
    fn default() -> Self {
        Self {
            data: None,
            size: 0,
            intensity: 1.0,
        }
    }
}

impl PartialEq for Lut3d {
    fn eq(&self, other: &Self) -> bool {
        let data_eq = match (&self.data, &other.data) {
            (Some(a), Some(b)) => std::sync::Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        data_eq && self.size == other.size && self.intensity == other.intensity
    }
}

/// Display colour configuration (design §4.2 steps 18–20).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayConfig {
    pub transfer_code: u8,
    pub display_gamma: f32,
    pub brightness: f32,
    pub custom_gamma: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            transfer_code: 1,
            display_gamma: 2.4,
            brightness: 1.0,
            custom_gamma: 2.2,
        }
    }
}

/// Highlights/shadows/whites/blacks rescale (design §4.2 step 7).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HighlightsShadows {
    pub highlights: f32,
    pub shadows: f32,
    pub whites: f32,
    pub blacks: f32,
}

/// Vibrance (design §4.2 step 8).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vibrance {
    pub amount: f32,
    pub skin_protection: bool,
}

impl Default for Vibrance {
    fn default() -> Self {
        Self {
            amount: 0.0,
            skin_protection: true,
        }
    }
}

/// HSL secondary-grading qualifier (design §4.2 step 15, GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HslQualifier {
    pub enabled: bool,
    pub hue_center: f32,
    pub hue_range: f32,
    pub sat_min: f32,
    pub sat_max: f32,
    pub lum_min: f32,
    pub lum_max: f32,
    pub softness: f32,
    pub invert: bool,
    pub preview_matte: bool,
    pub hue_shift: f32,
    pub sat_scale: f32,
    pub lum_scale: f32,
}

impl Default for HslQualifier {
    fn default() -> Self {
        Self {
            enabled: false,
            hue_center: 0.0,
            hue_range: 180.0,
            sat_min: 0.0,
            sat_max: 1.0,
            lum_min: 0.0,
            lum_max: 1.0,
            softness: 0.1,
            invert: false,
            preview_matte: false,
            hue_shift: 0.0,
            sat_scale: 1.0,
            lum_scale: 1.0,
        }
    }
}

/// Gamut-mapping state (spec names the field only as "gamut-mapping state";
/// modelled as an enable flag plus a mode selector, mirroring every other
/// enable/mode pair in this module).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GamutMapping {
    pub enabled: bool,
    pub mode: u8,
}

/// Camera-log decode / linearization configuration (design §4.2 step 0.5).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linearize {
    pub log_type_code: u8,
    pub gamma: f32,
    pub srgb_to_linear: bool,
    pub rec709_to_linear: bool,
    pub alpha_type_code: u8,
}

impl Default for Linearize {
    fn default() -> Self {
        Self {
            log_type_code: 0,
            gamma: 1.0,
            srgb_to_linear: false,
            rec709_to_linear: false,
            alpha_type_code: 0,
        }
    }
}

/// Per-channel output remapping. `[0,1,2,3]` is the identity (design §4.1
/// equality rules: identity swizzle never marks the flag dirty).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSwizzle(pub [u8; 4]);

impl Default for ChannelSwizzle {
    fn default() -> Self {
        Self([0, 1, 2, 3])
    }
}

impl ChannelSwizzle {
    pub const IDENTITY: ChannelSwizzle = ChannelSwizzle([0, 1, 2, 3]);

    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Alpha premultiplication mode (design §4.1 validation contract,
/// §6.3: `0` none, `1` premultiply, `2` unpremultiply).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PremultMode {
    #[default]
    None = 0,
    Premultiply = 1,
    Unpremultiply = 2,
}

impl PremultMode {
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => PremultMode::Premultiply,
            2 => PremultMode::Unpremultiply,
            _ => PremultMode::None,
        }
    }
}

/// Out-of-range visualization mode (design §6.3: `0` off, `1` low, `2` high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutOfRange(pub u8);

/// Quantization dithering mode (design §4.1: `0,1,2` valid, clamp to nearest;
/// NaN → 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DitherMode(pub u8);

impl DitherMode {
    #[must_use]
    pub fn clamp_from(value: i32) -> Self {
        Self(value.clamp(0, 2) as u8)
    }
}

/// Output quantization: `0` disables quantization, else `[2,16]` bits per
/// channel (design §4.1: `1 → 2`, `>16 → 16`, negative/NaN → 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuantizeBits(pub u8);

impl QuantizeBits {
    #[must_use]
    pub fn clamp_from(bits: i32) -> Self {
        Self(match bits {
            ..=0 => 0,
            1 => 2,
            2..=16 => bits as u8,
            _ => 16,
        })
    }
}

/// Input/output colour primaries (design §4.2 steps 1 & 20).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorPrimaries {
    pub input_code: u8,
    pub output_code: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_exposure_sanitizes_to_identity() {
        let adj = ColorAdjustments {
            exposure_rgb: Some(Vec3::new(f32::NAN, f32::INFINITY, 1.0)),
            ..Default::default()
        };
        let e = adj.effective_exposure();
        assert_eq!(e, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn gamma_clamps_away_from_zero() {
        let adj = ColorAdjustments {
            gamma: 0.0,
            ..Default::default()
        };
        assert!(adj.effective_gamma() > 0.0);
    }

    #[test]
    fn channel_swizzle_identity_round_trips() {
        assert!(ChannelSwizzle::default().is_identity());
        assert!(!ChannelSwizzle([1, 0, 2, 3]).is_identity());
    }

    #[test]
    fn quantize_bits_clamp_per_contract() {
        assert_eq!(QuantizeBits::clamp_from(-5).0, 0);
        assert_eq!(QuantizeBits::clamp_from(0).0, 0);
        assert_eq!(QuantizeBits::clamp_from(1).0, 2);
        assert_eq!(QuantizeBits::clamp_from(8).0, 8);
        assert_eq!(QuantizeBits::clamp_from(99).0, 16);
    }

    #[test]
    fn lut3d_identity_equality_is_pointer_based() {
        let data = std::sync::Arc::new(vec![0.0f32; 8]);
        let a = Lut3d {
            data: Some(data.clone()),
            size: 2,
            intensity: 1.0,
        };
        let b = Lut3d {
            data: Some(data.clone()),
            size: 2,
            intensity: 1.0,
        };
        let c = Lut3d {
            data: Some(std::sync::Arc::new((*data).clone())),
            size: 2,
            intensity: 1.0,
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
