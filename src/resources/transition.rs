//! Playlist transition configuration (design §3.1, §4.5.5).

/// Transition blend type supported by the `TransitionRenderer`'s fullscreen
/// blend pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionType {
    #[default]
    Crossfade = 0,
    Dissolve = 1,
    WipeLeft = 2,
    WipeRight = 3,
    WipeUp = 4,
    WipeDown = 5,
}

impl TransitionType {
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => TransitionType::Dissolve,
            2 => TransitionType::WipeLeft,
            3 => TransitionType::WipeRight,
            4 => TransitionType::WipeUp,
            5 => TransitionType::WipeDown,
            _ => TransitionType::Crossfade,
        }
    }

    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// `{type_code, duration_frames}` plus the runtime `progress` the playlist
/// host advances frame by frame (design §3.1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionConfig {
    pub transition_type: TransitionType,
    pub duration_frames: u32,
    progress: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            transition_type: TransitionType::default(),
            duration_frames: 0,
            progress: 1.0,
        }
    }
}

impl TransitionConfig {
    #[must_use]
    pub fn new(transition_type: TransitionType, duration_frames: u32) -> Self {
        // A zero-duration transition is treated as already completed on its
        // first frame (design §5 cancellation & timeouts).
        let progress = if duration_frames == 0 { 1.0 } else { 0.0 };
        Self {
            transition_type,
            duration_frames,
            progress,
        }
    }

    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Advances progress by one frame; clamps to `[0, 1]`.
    pub fn advance_frame(&mut self) {
        if self.duration_frames == 0 {
            self.progress = 1.0;
            return;
        }
        let step = 1.0 / self.duration_frames as f32;
        self.progress = (self.progress + step).clamp(0.0, 1.0);
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    /// Directly sets progress, clamping to `[0, 1]` (design §4.5.5).
    pub fn set_progress(&mut self, progress: f32) {
        self.progress = progress.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_completes_immediately() {
        let t = TransitionConfig::new(TransitionType::Crossfade, 0);
        assert!(t.is_complete());
        assert_eq!(t.progress(), 1.0);
    }

    #[test]
    fn progress_clamps_to_unit_range() {
        let mut t = TransitionConfig::new(TransitionType::Dissolve, 4);
        t.set_progress(5.0);
        assert_eq!(t.progress(), 1.0);
        t.set_progress(-5.0);
        assert_eq!(t.progress(), 0.0);
    }

    #[test]
    fn advance_frame_reaches_completion_after_duration() {
        let mut t = TransitionConfig::new(TransitionType::WipeLeft, 4);
        for _ in 0..4 {
            t.advance_frame();
        }
        assert!(t.is_complete());
    }
}
