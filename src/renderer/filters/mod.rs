//! The optional filter chain that sits alongside the single-pass colour
//! fragment pipeline: `NoiseReduction -> Sharpen -> FilmEmulation ->
//! Stabilization` (design §4.5). Each stage is a CPU-testable pure
//! function; GPU realizations follow the same fullscreen-triangle pattern
//! as [`crate::renderer::core::mipmap::MipmapGenerator`] and
//! [`crate::renderer::luminance_analyzer::LuminanceAnalyzer`] where the
//! design calls for a GPU path (bilateral, sharpen).

pub mod bilateral;
pub mod film_emulation;
pub mod sharpen;
pub mod stabilization;

pub use bilateral::bilateral_cpu;
pub use film_emulation::{apply_film_stock, builtin_stocks, FilmResponse, FilmStock};
pub use sharpen::sharpen_cpu;
pub use stabilization::{apply_shift, estimate_motion, MotionEstimate, PathSmoother};
