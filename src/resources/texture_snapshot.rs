//! Lazy GPU texture handles (design §3.1).
//!
//! A [`TextureSnapshot`] is the CPU-side description of a texture the
//! fragment pipeline samples: curves LUT, false-colour LUT, 3D LUT, and film
//! emulation LUT. The `StateManager` owns one of each kind. While
//! `dirty == false` the invariant is that whatever is bound on the GPU
//! already reflects `data`; setting new data (or clearing it) marks the
//! snapshot dirty until the host's upload callback runs and
//! [`TextureSnapshot::clear_dirty`] is called.

/// CPU-side payload backing a texture snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureData {
    /// 8-bit LUT data (curves, false colour): 256 texels, `channels` wide.
    Bytes(Vec<u8>),
    /// Floating-point LUT data (3D LUT, film emulation LUT).
    Floats(Vec<f32>),
    /// No texture bound.
    None,
}

impl Default for TextureData {
    fn default() -> Self {
        TextureData::None
    }
}

/// Shape metadata accompanying a snapshot's data, interpreted per kind:
/// curves/false-colour LUTs use `size` as the 1D LUT length (256) and
/// `channels` as bytes-per-texel; the 3D LUT uses `size` as the cube side
/// length; the film LUT stores its native resolution in `size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureMetadata {
    pub size: u32,
    pub channels: u32,
}

/// The four concrete texture kinds the core's `TextureCache` manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    CurvesLut,
    FalseColorLut,
    Lut3d,
    FilmLut,
}

/// A lazily-realized GPU texture's CPU-side description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureSnapshot {
    dirty: bool,
    data: TextureData,
    metadata: TextureMetadata,
    /// Lerp factor applied against the unmodified input when this texture
    /// is sampled (3D LUT and film LUT use this; curves/false-colour do
    /// not). Tracked here, rather than folded into `data`, because the
    /// design requires intensity to be recorded even on the disable path
    /// (`data = None`) so steady-state reapply stays clean.
    intensity: f32,
}

impl TextureSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self {
            intensity: 1.0,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn data(&self) -> &TextureData {
        &self.data
    }

    #[must_use]
    pub fn metadata(&self) -> TextureMetadata {
        self.metadata
    }

    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Replaces the snapshot's data. Marks dirty only when the new content
    /// actually differs from the cached content (the enclosing
    /// `StateManager` is responsible for deciding when this is called, but
    /// the snapshot itself stays defensive so direct callers get the same
    /// steady-state guarantee).
    pub fn set(&mut self, data: TextureData, metadata: TextureMetadata, intensity: f32) {
        let changed = data != self.data || metadata != self.metadata;
        self.data = data;
        self.metadata = metadata;
        self.intensity = intensity;
        if changed {
            self.dirty = true;
        }
    }

    /// Clears the bound texture (disable path). Per the design's invariant,
    /// `intensity` is still recorded so a subsequent `applyRenderState` with
    /// the same (disabled, same-intensity) state does not re-dirty this
    /// snapshot.
    pub fn clear(&mut self, intensity: f32) {
        let changed = !matches!(self.data, TextureData::None);
        self.data = TextureData::None;
        self.intensity = intensity;
        if changed {
            self.dirty = true;
        }
    }

    /// Invoked by the host's upload callback once the GPU-resident texture
    /// has been updated to match `data`.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Forces the dirty bit, used by `markAllDirty` on context loss.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabling_records_intensity_without_spurious_redirty() {
        let mut snap = TextureSnapshot::new();
        snap.set(TextureData::Floats(vec![1.0; 8]), TextureMetadata { size: 2, channels: 3 }, 0.5);
        snap.clear_dirty();

        snap.clear(0.5);
        assert!(snap.is_dirty(), "disabling a bound texture must dirty once");
        snap.clear_dirty();

        // Re-applying the same disabled state with the same intensity must
        // not re-dirty (steady-state idempotence).
        snap.clear(0.5);
        assert!(!snap.is_dirty());
        assert_eq!(snap.intensity(), 0.5);
    }

    #[test]
    fn identical_data_does_not_redirty() {
        let mut snap = TextureSnapshot::new();
        let meta = TextureMetadata { size: 256, channels: 1 };
        snap.set(TextureData::Bytes(vec![1, 2, 3]), meta, 1.0);
        snap.clear_dirty();
        snap.set(TextureData::Bytes(vec![1, 2, 3]), meta, 1.0);
        assert!(!snap.is_dirty());
    }
}
