//! Background pattern composited behind the graded image (design §4.2 step
//! 26, §6.3).

use glam::Vec3;

/// Background rendering mode. Discriminants are the wire-level codes from
/// design §6.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundMode {
    #[default]
    None = 0,
    Solid = 1,
    Checker = 2,
    Crosshatch = 3,
}

impl BackgroundMode {
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => BackgroundMode::Solid,
            2 => BackgroundMode::Checker,
            3 => BackgroundMode::Crosshatch,
            _ => BackgroundMode::None,
        }
    }

    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Background pattern state: mode, the two pattern colours, and the checker
/// cell size. Compared field-by-field by the `StateManager` — identical
/// contents leave the `BACKGROUND` flag clean even across distinct
/// `RenderState` instances (design §4.1 equality rules).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundPattern {
    pub mode: BackgroundMode,
    pub color_a: Vec3,
    pub color_b: Vec3,
    pub checker_size: f32,
}

impl Default for BackgroundPattern {
    fn default() -> Self {
        Self {
            mode: BackgroundMode::None,
            color_a: Vec3::ZERO,
            color_b: Vec3::splat(0.2),
            checker_size: 16.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_contents_are_equal_across_instances() {
        let a = BackgroundPattern {
            mode: BackgroundMode::Checker,
            ..Default::default()
        };
        let b = BackgroundPattern {
            mode: BackgroundMode::Checker,
            ..Default::default()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn mode_codes_match_wire_contract() {
        assert_eq!(BackgroundMode::from_code(2), BackgroundMode::Checker);
        assert_eq!(BackgroundMode::Crosshatch.code(), 3);
    }
}
