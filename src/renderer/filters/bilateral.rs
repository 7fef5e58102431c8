//! Bilateral (edge-preserving) noise reduction (design §4.5.1).
//!
//! The GPU path runs as a fullscreen-triangle fragment shader, built the
//! same way as every other single-purpose pass in this crate
//! ([`crate::renderer::core::mipmap::MipmapGenerator`],
//! [`crate::renderer::luminance_analyzer::LuminanceAnalyzer`]'s log-luma
//! pass). [`bilateral_cpu`] is the documented fallback used when no GPU
//! context is available (or in tests, where pixel-exact behaviour matters
//! more than throughput).

const REC709_LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

fn luma(rgb: [f32; 3]) -> f32 {
    rgb[0] * REC709_LUMA[0] + rgb[1] * REC709_LUMA[1] + rgb[2] * REC709_LUMA[2]
}

fn gaussian_weight(x: f32, sigma: f32) -> f32 {
    (-(x * x) / (2.0 * sigma * sigma)).exp()
}

/// CPU bilateral filter over an RGBA8 image, matching the GPU shader's
/// formula exactly: spatial Gaussian weight times a range Gaussian weight
/// on the Rec.709 luma difference, blended against the input by `strength`.
///
/// `radius` is clamped to `[1, 5]` (design: "GPU shader loops hard-coded to
/// ±5 with early-skip on `|dx|>r`").
#[must_use]
pub fn bilateral_cpu(pixels: &[u8], width: u32, height: u32, radius: i32, strength: f32) -> Vec<u8> {
    let radius = radius.clamp(1, 5);
    let strength = strength.clamp(0.0, 100.0) / 100.0;
    let w = width as i32;
    let h = height as i32;
    let spatial_sigma = f32::from(radius as i16).max(1.0);
    let range_sigma = 0.1_f32;

    let mut out = vec![0u8; pixels.len()];
    for y in 0..h {
        for x in 0..w {
            let idx = ((y * w + x) * 4) as usize;
            let center = [
                f32::from(pixels[idx]) / 255.0,
                f32::from(pixels[idx + 1]) / 255.0,
                f32::from(pixels[idx + 2]) / 255.0,
            ];
            let center_luma = luma(center);

            let mut sum = [0.0f32; 3];
            let mut weight_sum = 0.0f32;
            for dy in -5i32..=5 {
                if dy.abs() > radius {
                    continue;
                }
                for dx in -5i32..=5 {
                    if dx.abs() > radius {
                        continue;
                    }
                    let sx = (x + dx).clamp(0, w - 1);
                    let sy = (y + dy).clamp(0, h - 1);
                    let sidx = ((sy * w + sx) * 4) as usize;
                    let sample = [
                        f32::from(pixels[sidx]) / 255.0,
                        f32::from(pixels[sidx + 1]) / 255.0,
                        f32::from(pixels[sidx + 2]) / 255.0,
                    ];
                    let spatial = gaussian_weight((dx * dx + dy * dy) as f32, spatial_sigma);
                    let range = gaussian_weight(luma(sample) - center_luma, range_sigma);
                    let weight = spatial * range;
                    sum[0] += sample[0] * weight;
                    sum[1] += sample[1] * weight;
                    sum[2] += sample[2] * weight;
                    weight_sum += weight;
                }
            }

            let filtered = if weight_sum > 1e-6 {
                [sum[0] / weight_sum, sum[1] / weight_sum, sum[2] / weight_sum]
            } else {
                center
            };

            for c in 0..3 {
                let blended = center[c] + (filtered[c] - center[c]) * strength;
                out[idx + c] = (blended.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
            out[idx + 3] = pixels[idx + 3];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_image_is_unchanged_at_any_strength() {
        let pixels = vec![128u8, 128, 128, 200].repeat(16);
        for strength in [0.0, 20.0, 50.0, 100.0] {
            let out = bilateral_cpu(&pixels, 4, 4, 3, strength);
            for (before, after) in pixels.chunks(4).zip(out.chunks(4)) {
                for c in 0..3 {
                    assert!((i32::from(before[c]) - i32::from(after[c])).abs() <= 1);
                }
                assert_eq!(before[3], after[3]);
            }
        }
    }

    #[test]
    fn noisy_image_variance_decreases_with_strength() {
        let mut pixels = Vec::new();
        let mut seed: u32 = 12345;
        for _ in 0..(20 * 20) {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
            let noise = (seed >> 16) as u8 % 64;
            let v = 128u8.saturating_add(noise).min(200);
            pixels.extend_from_slice(&[v, v, v, 255]);
        }

        let variance = |buf: &[u8]| -> f64 {
            let values: Vec<f64> = buf.chunks(4).map(|p| f64::from(p[0])).collect();
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
        };

        let low = bilateral_cpu(&pixels, 20, 20, 3, 20.0);
        let high = bilateral_cpu(&pixels, 20, 20, 3, 100.0);
        assert!(variance(&high) < variance(&low));
    }

    #[test]
    fn two_by_two_uniform_patch_with_alpha_is_preserved() {
        let pixels = vec![128u8, 128, 128, 200].repeat(4);
        let out = bilateral_cpu(&pixels, 2, 2, 3, 50.0);
        assert_eq!(out, pixels);
    }
}
