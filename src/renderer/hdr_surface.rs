//! Float-framebuffer HDR blit surface (design §4.6).
//!
//! Used when the main renderer produces floating-point output but the host
//! canvas's default context is sRGB-only. Surface-context creation is
//! sticky on the web platform (once a canvas has a 2D or WebGL context it
//! can never get a WebGPU one), so each format attempt acquires a *fresh*
//! canvas clone via [`crate::host::HostHooks`]-adjacent host plumbing; the
//! first attempt that succeeds wins and replaces the original handle in the
//! DOM tree. Row upload flips vertically because GPU readback delivers
//! bottom-to-top rows.

use crate::config::HdrSurfaceFormat;
use crate::host::TestHandle;

/// Fixed priority order per design §4.6: linear-sRGB float16, the same
/// under a legacy pixel-format key, Rec.2100-HLG float16, then its legacy
/// key. [`crate::config::RendererConfig::hdr_surface_format_overrides`]
/// lets a host narrow or reorder this list; an empty override list falls
/// back to this default.
pub const DEFAULT_FORMAT_PRIORITY: [HdrSurfaceFormat; 4] = [
    HdrSurfaceFormat::LinearSrgbFloat16,
    HdrSurfaceFormat::LinearSrgbFloat16Legacy,
    HdrSurfaceFormat::Rec2100HlgFloat16,
    HdrSurfaceFormat::Rec2100HlgFloat16Legacy,
];

#[must_use]
pub fn format_priority(overrides: &[HdrSurfaceFormat]) -> &[HdrSurfaceFormat] {
    if overrides.is_empty() {
        &DEFAULT_FORMAT_PRIORITY
    } else {
        overrides
    }
}

/// Packs an RGBA float frame into a half-precision row buffer for upload,
/// flipping rows top-to-bottom to bottom-to-top (or vice versa — the
/// operation is its own inverse) because GPU readback delivers rows in the
/// opposite order the destination surface expects.
#[must_use]
pub fn pack_f16_rows_flipped(pixels: &[f32], width: u32, height: u32) -> Vec<half::f16> {
    debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
    let row_len = (width * 4) as usize;
    let mut out = vec![half::f16::ZERO; pixels.len()];
    for y in 0..height as usize {
        let src_row = &pixels[y * row_len..(y + 1) * row_len];
        let dst_y = height as usize - 1 - y;
        let dst_row = &mut out[dst_y * row_len..(dst_y + 1) * row_len];
        for (dst, &value) in dst_row.iter_mut().zip(src_row) {
            *dst = half::f16::from_f32(value);
        }
    }
    out
}

/// State machine over the fallback chain: which format is currently
/// acquired, if any, and the surface's pixel dimensions.
pub struct HdrSurface {
    current_format: Option<HdrSurfaceFormat>,
    width: u32,
    height: u32,
}

impl Default for HdrSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HdrSurface {
    #[must_use]
    pub fn new() -> Self {
        Self { current_format: None, width: 0, height: 0 }
    }

    #[must_use]
    pub fn current_format(&self) -> Option<HdrSurfaceFormat> {
        self.current_format
    }

    /// Attempts each format in `priority` order, calling `try_acquire` (host
    /// plumbing that creates a fresh canvas/context pair) for each one until
    /// one succeeds. Reports to `test_handle` if every format fails.
    pub fn acquire(
        &mut self,
        priority: &[HdrSurfaceFormat],
        mut try_acquire: impl FnMut(HdrSurfaceFormat) -> bool,
        test_handle: &mut dyn TestHandle,
    ) -> bool {
        for &format in priority {
            if try_acquire(format) {
                self.current_format = Some(format);
                return true;
            }
        }
        self.current_format = None;
        log::warn!(target: "chromacore", "no HDR surface format in {priority:?} was accepted; falling back to the host's SDR surface");
        test_handle.on_hdr_surface_unavailable();
        false
    }

    /// Resizes the surface to the incoming frame's dimensions. A no-op if
    /// the dimensions are unchanged (mirrors [`crate::renderer::transition::TransitionRenderer`]'s
    /// reallocate-only-on-change discipline).
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use web_sys::{GpuCanvasConfiguration, GpuCanvasContext, GpuTextureFormat, HtmlCanvasElement};

    use super::HdrSurface;
    use crate::config::HdrSurfaceFormat;

    fn gpu_format_and_colorspace(format: HdrSurfaceFormat) -> (GpuTextureFormat, &'static str) {
        match format {
            HdrSurfaceFormat::LinearSrgbFloat16 | HdrSurfaceFormat::LinearSrgbFloat16Legacy => {
                (GpuTextureFormat::Rgba16float, "srgb-linear")
            }
            HdrSurfaceFormat::Rec2100HlgFloat16 | HdrSurfaceFormat::Rec2100HlgFloat16Legacy => {
                (GpuTextureFormat::Rgba16float, "rec2100-hlg")
            }
        }
    }

    /// Clones `original` into a fresh, context-less canvas element — surface
    /// context acquisition is sticky, so every format attempt needs its own
    /// unconfigured canvas.
    fn clone_canvas(original: &HtmlCanvasElement) -> Option<HtmlCanvasElement> {
        let document = original.owner_document()?;
        let clone = document.create_element("canvas").ok()?.dyn_into::<HtmlCanvasElement>().ok()?;
        clone.set_width(original.width());
        clone.set_height(original.height());
        Some(clone)
    }

    /// Attempts to acquire a WebGPU context configured for `format` on a
    /// fresh clone of `original`. Returns the new canvas and context on
    /// success so the host can splice it into the DOM in place of the old
    /// handle.
    pub fn try_acquire(original: &HtmlCanvasElement, format: HdrSurfaceFormat) -> Option<(HtmlCanvasElement, GpuCanvasContext)> {
        let canvas = clone_canvas(original)?;
        let context = canvas.get_context("webgpu").ok()??.dyn_into::<GpuCanvasContext>().ok()?;
        let (gpu_format, color_space) = gpu_format_and_colorspace(format);
        let config = GpuCanvasConfiguration::new(&wasm_bindgen::JsValue::UNDEFINED, gpu_format);
        js_sys::Reflect::set(&config, &"colorSpace".into(), &color_space.into()).ok()?;
        context.configure(&config).ok()?;
        Some((canvas, context))
    }

    impl HdrSurface {
        /// wasm entry point wiring [`try_acquire`] into [`HdrSurface::acquire`]'s
        /// generic callback.
        pub fn acquire_on_canvas(
            &mut self,
            original: &HtmlCanvasElement,
            priority: &[HdrSurfaceFormat],
            test_handle: &mut dyn crate::host::TestHandle,
        ) -> Option<(HtmlCanvasElement, GpuCanvasContext)> {
            let mut result = None;
            self.acquire(
                priority,
                |format| {
                    if let Some(pair) = try_acquire(original, format) {
                        result = Some(pair);
                        true
                    } else {
                        false
                    }
                },
                test_handle,
            );
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::recording::RecordingTestHandle;

    #[test]
    fn empty_override_list_falls_back_to_the_documented_default_order() {
        let priority = format_priority(&[]);
        assert_eq!(priority, &DEFAULT_FORMAT_PRIORITY);
    }

    #[test]
    fn non_empty_overrides_replace_the_default_order() {
        let overrides = vec![HdrSurfaceFormat::Rec2100HlgFloat16];
        let priority = format_priority(&overrides);
        assert_eq!(priority, overrides.as_slice());
    }

    #[test]
    fn first_successful_format_wins_and_stops_further_attempts() {
        let mut surface = HdrSurface::new();
        let mut test_handle = RecordingTestHandle::default();
        let mut attempts = Vec::new();
        let ok = surface.acquire(
            &DEFAULT_FORMAT_PRIORITY,
            |format| {
                attempts.push(format);
                format == HdrSurfaceFormat::Rec2100HlgFloat16
            },
            &mut test_handle,
        );
        assert!(ok);
        assert_eq!(surface.current_format(), Some(HdrSurfaceFormat::Rec2100HlgFloat16));
        assert_eq!(attempts, vec![
            HdrSurfaceFormat::LinearSrgbFloat16,
            HdrSurfaceFormat::LinearSrgbFloat16Legacy,
            HdrSurfaceFormat::Rec2100HlgFloat16,
        ]);
        assert_eq!(test_handle.hdr_surface_unavailable_events, 0);
    }

    #[test]
    fn every_format_failing_reports_to_the_test_handle() {
        let mut surface = HdrSurface::new();
        let mut test_handle = RecordingTestHandle::default();
        let ok = surface.acquire(&DEFAULT_FORMAT_PRIORITY, |_| false, &mut test_handle);
        assert!(!ok);
        assert_eq!(surface.current_format(), None);
        assert_eq!(test_handle.hdr_surface_unavailable_events, 1);
    }

    #[test]
    fn resize_is_a_no_op_when_dimensions_are_unchanged() {
        let mut surface = HdrSurface::new();
        assert!(surface.resize(1920, 1080));
        assert!(!surface.resize(1920, 1080));
        assert!(surface.resize(1280, 720));
    }

    #[test]
    fn pack_f16_rows_flipped_reverses_row_order() {
        // 2x2, row 0 = red, row 1 = green; after flip row 0 should be green.
        let pixels = [
            1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, // row 0 (red)
            0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, // row 1 (green)
        ];
        let packed = pack_f16_rows_flipped(&pixels, 2, 2);
        assert_eq!(packed[0].to_f32(), 0.0);
        assert_eq!(packed[1].to_f32(), 1.0);
        assert_eq!(packed[4].to_f32(), 1.0);
        assert_eq!(packed[5].to_f32(), 0.0);
    }

    #[test]
    fn pack_f16_rows_flipped_is_its_own_inverse() {
        let pixels: Vec<f32> = (0..(4 * 3 * 4)).map(|i| i as f32 / 10.0).collect();
        let once = pack_f16_rows_flipped(&pixels, 4, 3);
        let once_f32: Vec<f32> = once.iter().map(|v| v.to_f32()).collect();
        let twice = pack_f16_rows_flipped(&once_f32, 4, 3);
        let twice_f32: Vec<f32> = twice.iter().map(|v| v.to_f32()).collect();
        for (a, b) in pixels.iter().zip(twice_f32.iter()) {
            assert!((a - b).abs() < 1e-3);
        }
    }
}
