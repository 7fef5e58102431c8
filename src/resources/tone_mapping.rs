//! Tone mapping configuration (design §4.2 step 16, §6.3).
//!
//! Placed in the resources layer, same as the teacher's equivalent, so the
//! value type has no dependency on the renderer that consumes it.

use crate::resources::shader_defines::ShaderDefines;

/// Tone-mapping operator selection. Discriminants are the wire-level codes
/// from design §6.3 and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToneMappingMode {
    #[default]
    Off = 0,
    Reinhard = 1,
    Filmic = 2,
    Aces = 3,
    AgX = 4,
    PbrNeutral = 5,
    Gt = 6,
    AcesHill = 7,
}

impl ToneMappingMode {
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => ToneMappingMode::Reinhard,
            2 => ToneMappingMode::Filmic,
            3 => ToneMappingMode::Aces,
            4 => ToneMappingMode::AgX,
            5 => ToneMappingMode::PbrNeutral,
            6 => ToneMappingMode::Gt,
            7 => ToneMappingMode::AcesHill,
            _ => ToneMappingMode::Off,
        }
    }

    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Sets `TONE_MAPPING_MODE` so the fragment pipeline's shader template
    /// compiles only the branch for the active operator.
    pub fn apply_to_defines(self, defines: &mut ShaderDefines) {
        let mode_str = match self {
            ToneMappingMode::Off => "OFF",
            ToneMappingMode::Reinhard => "REINHARD",
            ToneMappingMode::Filmic => "FILMIC",
            ToneMappingMode::Aces => "ACES",
            ToneMappingMode::AgX => "AGX",
            ToneMappingMode::PbrNeutral => "PBR_NEUTRAL",
            ToneMappingMode::Gt => "GT",
            ToneMappingMode::AcesHill => "ACES_HILL",
        };
        defines.set("TONE_MAPPING_MODE", mode_str);
    }
}

/// Tone-mapping state: operator plus the shared parameters every operator
/// reads (design §4.2 step 16: "HDR headroom rescales input and output").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneMappingState {
    pub mode: ToneMappingMode,
    /// Reinhard's white point; ignored by the other operators.
    pub white_point: f32,
    /// Maximum scene-referred value the operator's [0,1] design range maps
    /// to. `1.0` for SDR; > 1.0 under HDR passthrough.
    pub headroom: f32,
}

impl Default for ToneMappingState {
    fn default() -> Self {
        Self {
            mode: ToneMappingMode::default(),
            white_point: 4.0,
            headroom: 1.0,
        }
    }
}

impl ToneMappingState {
    /// Sanitizes headroom to a positive finite value; non-finite or
    /// non-positive input falls back to SDR (1.0).
    #[must_use]
    pub fn effective_headroom(&self) -> f32 {
        if self.headroom.is_finite() && self.headroom > 0.0 {
            self.headroom
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_codes_match_wire_contract() {
        assert_eq!(ToneMappingMode::from_code(3), ToneMappingMode::Aces);
        assert_eq!(ToneMappingMode::Aces.code(), 3);
        assert_eq!(ToneMappingMode::from_code(99), ToneMappingMode::Off);
    }

    #[test]
    fn headroom_sanitizes_non_positive_to_sdr() {
        let mut state = ToneMappingState::default();
        state.headroom = -1.0;
        assert_eq!(state.effective_headroom(), 1.0);
        state.headroom = f32::NAN;
        assert_eq!(state.effective_headroom(), 1.0);
        state.headroom = 4.0;
        assert_eq!(state.effective_headroom(), 4.0);
    }
}
