//! Film stock emulation: a per-stock colour transform plus deterministic,
//! luminance-modulated grain (design §4.5.3).
//!
//! Grain determinism follows the same pattern as the teacher's SSAO kernel
//! generation (`resources/ssao.rs::generate_ssao_kernel`): a `StdRng` seeded
//! with an explicit `u64` so the same `(seed, frame index)` pair always
//! reproduces the same grain field, independent of wall-clock time or
//! draw order.

use rand::rngs::StdRng;
use rand::{RngExt as _, SeedableRng as _};

/// Per-stock colour response: either a 3x3 matrix applied in linear light,
/// or a reference to an external LUT (identified by name; the LUT itself is
/// owned by [`crate::renderer::texture_cache::TextureCache`] under
/// `TextureKind::FilmLut`).
#[derive(Debug, Clone)]
pub enum FilmResponse {
    Matrix([[f32; 3]; 3]),
    Lut { name: &'static str },
}

#[derive(Debug, Clone)]
pub struct FilmStock {
    pub name: &'static str,
    pub response: FilmResponse,
    /// Grain standard deviation at peak luma-modulated intensity, in 0..1 units.
    pub grain_sigma: f32,
}

/// A small built-in set of named stocks; matrices are plausible warm/cool/
/// neutral film-look transforms rather than scanned-stock measurements.
#[must_use]
pub fn builtin_stocks() -> Vec<FilmStock> {
    vec![
        FilmStock {
            name: "neutral",
            response: FilmResponse::Matrix([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]),
            grain_sigma: 0.02,
        },
        FilmStock {
            name: "kodak-warm",
            response: FilmResponse::Matrix([
                [1.05, 0.02, -0.02],
                [0.01, 1.0, 0.01],
                [-0.03, -0.02, 0.95],
            ]),
            grain_sigma: 0.035,
        },
        FilmStock {
            name: "fuji-cool",
            response: FilmResponse::Matrix([
                [0.97, 0.0, 0.03],
                [0.0, 1.0, 0.0],
                [0.02, 0.0, 1.03],
            ]),
            grain_sigma: 0.025,
        },
    ]
}

fn apply_matrix(rgb: [f32; 3], m: &[[f32; 3]; 3]) -> [f32; 3] {
    [
        m[0][0] * rgb[0] + m[0][1] * rgb[1] + m[0][2] * rgb[2],
        m[1][0] * rgb[0] + m[1][1] * rgb[1] + m[1][2] * rgb[2],
        m[2][0] * rgb[0] + m[2][1] * rgb[1] + m[2][2] * rgb[2],
    ]
}

/// Quadratic grain-intensity falloff peaking at mid-grey (luma = 0.5),
/// matching the design's "grain visibility peaks in midtones, falls off in
/// shadows and highlights" requirement.
fn grain_envelope(luma: f32) -> f32 {
    let d = luma - 0.5;
    (1.0 - 4.0 * d * d).clamp(0.0, 1.0)
}

/// Applies a film stock's colour response and grain to an RGBA8 image.
/// `intensity` (0..100) blends the stock's colour transform against the
/// untouched input (per design: "intensity lerp before grain is added, so
/// grain strength is independent of how strongly the look is applied").
/// `seed` and `frame_index` together determine the grain field; the same
/// pair always produces bit-identical output.
#[must_use]
pub fn apply_film_stock(
    pixels: &[u8],
    stock: &FilmStock,
    intensity: f32,
    seed: u64,
    frame_index: u64,
) -> Vec<u8> {
    let intensity = intensity.clamp(0.0, 100.0) / 100.0;
    let FilmResponse::Matrix(m) = &stock.response else {
        // LUT-backed stocks are realized on the GPU via TextureCache; the
        // CPU path only emulates matrix stocks.
        return pixels.to_vec();
    };

    let mut rng = StdRng::seed_from_u64(seed ^ frame_index.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    let mut out = vec![0u8; pixels.len()];

    for (chunk_in, chunk_out) in pixels.chunks(4).zip(out.chunks_mut(4)) {
        let rgb = [
            f32::from(chunk_in[0]) / 255.0,
            f32::from(chunk_in[1]) / 255.0,
            f32::from(chunk_in[2]) / 255.0,
        ];
        let graded = apply_matrix(rgb, m);
        let blended = [
            rgb[0] + (graded[0] - rgb[0]) * intensity,
            rgb[1] + (graded[1] - rgb[1]) * intensity,
            rgb[2] + (graded[2] - rgb[2]) * intensity,
        ];

        let luma = 0.2126 * blended[0] + 0.7152 * blended[1] + 0.0722 * blended[2];
        let envelope = grain_envelope(luma.clamp(0.0, 1.0));
        let noise = rng.random_range(-1.0f32..1.0) * stock.grain_sigma * envelope;

        for c in 0..3 {
            chunk_out[c] = (blended[c] + noise).clamp(0.0, 1.0).mul_add(255.0, 0.0).round() as u8;
        }
        chunk_out[3] = chunk_in[3];
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_gray(size: usize, value: u8) -> Vec<u8> {
        vec![value, value, value, 255].repeat(size)
    }

    #[test]
    fn same_seed_and_frame_are_bit_identical() {
        let stock = builtin_stocks().into_iter().find(|s| s.name == "kodak-warm").unwrap();
        let pixels = solid_gray(64, 128);
        let a = apply_film_stock(&pixels, &stock, 80.0, 7, 3);
        let b = apply_film_stock(&pixels, &stock, 80.0, 7, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn different_frame_index_changes_grain() {
        let stock = builtin_stocks().into_iter().find(|s| s.name == "kodak-warm").unwrap();
        let pixels = solid_gray(64, 128);
        let a = apply_film_stock(&pixels, &stock, 80.0, 7, 3);
        let b = apply_film_stock(&pixels, &stock, 80.0, 7, 4);
        assert_ne!(a, b);
    }

    #[test]
    fn zero_intensity_still_applies_grain_but_no_color_shift() {
        let stock = builtin_stocks().into_iter().find(|s| s.name == "kodak-warm").unwrap();
        let pixels = solid_gray(16, 128);
        let out = apply_film_stock(&pixels, &stock, 0.0, 1, 1);
        // With no grading applied the underlying value before grain should
        // equal the input; grain may still perturb individual channels but
        // by a bounded amount.
        for (before, after) in pixels.chunks(4).zip(out.chunks(4)) {
            for c in 0..3 {
                assert!((i32::from(before[c]) - i32::from(after[c])).abs() <= 20);
            }
        }
    }

    #[test]
    fn grain_envelope_peaks_at_midgray() {
        assert!(grain_envelope(0.5) > grain_envelope(0.0));
        assert!(grain_envelope(0.5) > grain_envelope(1.0));
    }

    #[test]
    fn neutral_stock_at_full_intensity_without_grain_seed_variance_stays_close_to_input() {
        let stock = builtin_stocks().into_iter().find(|s| s.name == "neutral").unwrap();
        let pixels = solid_gray(16, 128);
        let out = apply_film_stock(&pixels, &stock, 100.0, 5, 0);
        for (before, after) in pixels.chunks(4).zip(out.chunks(4)) {
            for c in 0..3 {
                assert!((i32::from(before[c]) - i32::from(after[c])).abs() <= 20);
            }
        }
    }
}
