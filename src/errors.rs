//! Error Types
//!
//! This module defines the error types used throughout the core.
//!
//! # Overview
//!
//! Per the design's error-handling policy, most failure modes here are
//! *not* errors: programmer-error inputs are clamped silently
//! ([`crate::resources::render_state`]), resource-unavailable conditions
//! degrade ([`crate::renderer::luminance_analyzer`], [`crate::renderer::hdr_surface`]),
//! and async-readback-not-ready simply retains the last cached value. Only
//! GPU program construction failures are fatal, and those are the only
//! conditions represented by [`ChromaError`].
//!
//! ```rust,ignore
//! use chromacore::errors::{ChromaError, Result};
//!
//! fn compile_pipeline() -> Result<()> {
//!     // Fallible only for genuine construction failures.
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The core's error type.
///
/// Each variant is a fatal construction-time failure. Per-frame degradation
/// (missing extensions, stale async readbacks, non-finite samples) is never
/// represented here — see the module docs above.
#[derive(Error, Debug)]
pub enum ChromaError {
    // ========================================================================
    // GPU & Device Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("failed to request wgpu adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("failed to create wgpu device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    // ========================================================================
    // Shader / Pipeline Errors
    // ========================================================================
    /// A shader module failed to compile.
    #[error("shader compile failed ({stage}): {message}")]
    ShaderCompile {
        /// Which shader stage failed (e.g. "fragment", "vertex").
        stage: &'static str,
        /// Compiler diagnostic text.
        message: String,
    },

    /// Pipeline link/validation failed after a parallel compile completed.
    #[error("pipeline link failed: {0}")]
    PipelineLink(String),

    /// The WGSL template engine failed to render a shader (missing chunk,
    /// undefined macro reference).
    #[error("shader template error: {0}")]
    ShaderTemplate(#[from] minijinja::Error),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Host-supplied configuration JSON failed to parse.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Alias for `Result<T, ChromaError>`.
pub type Result<T> = std::result::Result<T, ChromaError>;
