//! Dirty-flag set tracked by the [`crate::renderer::state_manager::StateManager`].
//!
//! One flag per uniform group named in the design. `applyRenderState` and the
//! per-field setters only ever *add* bits; `applyUniforms` drains the whole
//! set once it has written every dirty group's uniforms. The set is a closed
//! enumeration: adding a new uniform group means adding a bit here and a
//! matching arm in `StateManager::apply_uniforms`.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DirtyFlags: u32 {
        const COLOR               = 1 << 0;
        const TONE_MAPPING        = 1 << 1;
        const INVERSION            = 1 << 2;
        const BACKGROUND          = 1 << 3;
        const CDL                 = 1 << 4;
        const CURVES              = 1 << 5;
        const WHEELS              = 1 << 6;
        const FALSE_COLOR          = 1 << 7;
        const ZEBRA                = 1 << 8;
        const CHANNEL_MODE         = 1 << 9;
        const LUT3D                = 1 << 10;
        const DISPLAY              = 1 << 11;
        const HIGHLIGHTS_SHADOWS    = 1 << 12;
        const VIBRANCE             = 1 << 13;
        const CLARITY              = 1 << 14;
        const SHARPEN              = 1 << 15;
        const HSL                  = 1 << 16;
        const GAMUT_MAPPING        = 1 << 17;
        const LINEARIZE            = 1 << 18;
        const INLINE_LUT           = 1 << 19;
        const OUT_OF_RANGE          = 1 << 20;
        const CHANNEL_SWIZZLE       = 1 << 21;
        const PREMULT              = 1 << 22;
        const DITHER               = 1 << 23;
        const COLOR_PRIMARIES       = 1 << 24;

        /// Every flag set — used on context loss and the first frame, where
        /// every uniform group must be re-uploaded regardless of cached
        /// state.
        const ALL = u32::MAX;
    }
}

impl DirtyFlags {
    /// Fixed upload order for `applyUniforms`. Identical inputs must produce
    /// an identical GPU command stream, so this order is part of the wire
    /// contract, not an implementation detail.
    pub const UPLOAD_ORDER: &'static [DirtyFlags] = &[
        DirtyFlags::COLOR,
        DirtyFlags::LINEARIZE,
        DirtyFlags::COLOR_PRIMARIES,
        DirtyFlags::TONE_MAPPING,
        DirtyFlags::INVERSION,
        DirtyFlags::BACKGROUND,
        DirtyFlags::CDL,
        DirtyFlags::CURVES,
        DirtyFlags::WHEELS,
        DirtyFlags::FALSE_COLOR,
        DirtyFlags::ZEBRA,
        DirtyFlags::CHANNEL_MODE,
        DirtyFlags::LUT3D,
        DirtyFlags::DISPLAY,
        DirtyFlags::HIGHLIGHTS_SHADOWS,
        DirtyFlags::VIBRANCE,
        DirtyFlags::CLARITY,
        DirtyFlags::SHARPEN,
        DirtyFlags::HSL,
        DirtyFlags::GAMUT_MAPPING,
        DirtyFlags::INLINE_LUT,
        DirtyFlags::OUT_OF_RANGE,
        DirtyFlags::CHANNEL_SWIZZLE,
        DirtyFlags::PREMULT,
        DirtyFlags::DITHER,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_order_covers_every_non_all_flag() {
        let covered = DirtyFlags::UPLOAD_ORDER
            .iter()
            .fold(DirtyFlags::empty(), |acc, &f| acc | f);
        for individual in [
            DirtyFlags::COLOR,
            DirtyFlags::TONE_MAPPING,
            DirtyFlags::INVERSION,
            DirtyFlags::BACKGROUND,
            DirtyFlags::CDL,
            DirtyFlags::CURVES,
            DirtyFlags::WHEELS,
            DirtyFlags::FALSE_COLOR,
            DirtyFlags::ZEBRA,
            DirtyFlags::CHANNEL_MODE,
            DirtyFlags::LUT3D,
            DirtyFlags::DISPLAY,
            DirtyFlags::HIGHLIGHTS_SHADOWS,
            DirtyFlags::VIBRANCE,
            DirtyFlags::CLARITY,
            DirtyFlags::SHARPEN,
            DirtyFlags::HSL,
            DirtyFlags::GAMUT_MAPPING,
            DirtyFlags::LINEARIZE,
            DirtyFlags::INLINE_LUT,
            DirtyFlags::OUT_OF_RANGE,
            DirtyFlags::CHANNEL_SWIZZLE,
            DirtyFlags::PREMULT,
            DirtyFlags::DITHER,
            DirtyFlags::COLOR_PRIMARIES,
        ] {
            assert!(covered.contains(individual), "{individual:?} missing from upload order");
        }
    }

    #[test]
    fn empty_is_falsy_and_all_is_truthy() {
        assert!(DirtyFlags::empty().is_empty());
        assert!(!DirtyFlags::ALL.is_empty());
    }
}
