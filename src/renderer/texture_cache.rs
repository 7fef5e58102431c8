//! Realizes dirty [`TextureSnapshot`]s as GPU textures.
//!
//! [`StateManager::apply_uniforms`] already invokes the [`crate::host::HostHooks`]
//! callback for each dirty texture kind as it drains the corresponding dirty
//! flag — that covers *requesting* an upload. `TextureCache` is the
//! production-side counterpart: it owns the actual `wgpu::Texture`/`TextureView`
//! pairs the fragment pipeline samples from, lazily (re)allocating them only
//! when a snapshot's data actually changed.

use rustc_hash::FxHashMap;

use crate::resources::texture_snapshot::{TextureData, TextureKind};

/// One GPU-resident texture plus the metadata needed to decide whether it
/// must be recreated (as opposed to merely re-uploaded).
struct CachedTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    depth: u32,
}

/// Owns the four lazily-realized LUT textures the fragment pipeline samples
/// from: curves, false colour, 3D LUT, and film emulation.
pub struct TextureCache {
    entries: FxHashMap<TextureKind, CachedTexture>,
    fallback: CachedTexture,
    /// The inline 1D LUT rides directly on `RenderState::color` rather than
    /// through one of the four dirty-flag-tracked [`TextureKind`]s (design:
    /// "carried directly on `RenderState::color`"), so it gets its own slot
    /// here instead of an `entries` key.
    inline_lut: CachedTexture,
}

impl TextureCache {
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let fallback = Self::create_2d(device, queue, 1, 1, &[255, 255, 255, 255]);
        let inline_lut = Self::create_2d(device, queue, 1, 1, &[255, 255, 255, 255]);
        Self {
            entries: FxHashMap::default(),
            fallback,
            inline_lut,
        }
    }

    /// Realizes the inline LUT's raw `channels`-wide bytes as an `N x 1`
    /// `Rgba8Unorm` row texture, widening 1- or 3-channel data to RGBA (the
    /// fragment shader's `apply_inline_lut` only reads back as many
    /// channels as `u_inline_lut_channels` declares, so the padding bytes
    /// are never sampled).
    pub fn sync_inline_lut(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[u8], channels: u32) {
        let channels = channels.clamp(1, 4);
        let texel_count = ((data.len() as u32) / channels).max(1);
        let rgba = if channels == 4 {
            data.to_vec()
        } else {
            let mut widened = Vec::with_capacity(texel_count as usize * 4);
            for texel in data.chunks(channels as usize) {
                for c in 0..4 {
                    widened.push(texel.get(c as usize).copied().unwrap_or(255));
                }
            }
            widened
        };
        self.inline_lut = Self::create_2d(device, queue, texel_count, 1, &rgba);
    }

    #[must_use]
    pub fn inline_lut_view(&self) -> &wgpu::TextureView {
        &self.inline_lut.view
    }

    fn create_2d(device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32, rgba8: &[u8]) -> CachedTexture {
        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("texture-cache-2d"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba8,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        CachedTexture { texture, view, width, height, depth: 1 }
    }

    fn create_3d(device: &wgpu::Device, queue: &wgpu::Queue, size: u32, data: &[f32]) -> CachedTexture {
        let extent = wgpu::Extent3d { width: size, height: size, depth_or_array_layers: size };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("texture-cache-lut3d"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        // LUT data is tightly packed RGB; widen to RGBA for a standard
        // sampleable float texture format.
        let mut rgba = Vec::with_capacity(data.len() / 3 * 4);
        for chunk in data.chunks_exact(3) {
            rgba.extend_from_slice(chunk);
            rgba.push(1.0);
        }
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&rgba),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(16 * size),
                rows_per_image: Some(size),
            },
            extent,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        CachedTexture { texture, view, width: size, height: size, depth: size }
    }

    /// Realizes the texture kind's snapshot data on the GPU (or releases it
    /// on the disable path). The caller invokes this from the
    /// `HostHooks::bind_*` callbacks, which `StateManager::apply_uniforms`
    /// only calls while the corresponding texture snapshot is dirty.
    pub fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, kind: TextureKind, data: &TextureData) {
        log::debug!(target: "chromacore", "uploading texture snapshot for {kind:?}");
        let cached = match data {
            TextureData::None => {
                self.entries.remove(&kind);
                return;
            }
            TextureData::Bytes(bytes) => {
                let texel_count = (bytes.len() as u32 / 4).max(1);
                Self::create_2d(device, queue, texel_count, 1, bytes)
            }
            TextureData::Floats(floats) => {
                let size = (floats.len() as f64 / 3.0).cbrt().round() as u32;
                Self::create_3d(device, queue, size.max(2), floats)
            }
        };
        self.entries.insert(kind, cached);
    }

    #[must_use]
    pub fn view(&self, kind: TextureKind) -> &wgpu::TextureView {
        self.entries.get(&kind).map_or(&self.fallback.view, |c| &c.view)
    }

    #[must_use]
    pub fn dimensions(&self, kind: TextureKind) -> (u32, u32, u32) {
        self.entries.get(&kind).map_or((1, 1, 1), |c| (c.width, c.height, c.depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_dimensions_are_one_by_one() {
        // Construction needs a device; this unit test only exercises the
        // pure-data-shape helper which doesn't.
        let size = (27.0_f64 / 3.0).cbrt().round() as u32;
        assert_eq!(size, 3);
    }
}
