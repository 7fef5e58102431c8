#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Core rendering pipeline for an HDR-capable video colour grading tool.
//!
//! This crate owns the three tightly coupled components of the design: the
//! dirty-flag driven [`renderer::state_manager::StateManager`], the
//! single-pass colour [`renderer::pipeline`], and the GPU-accelerated
//! [`renderer::filters`]. The surrounding UI, annotation tools,
//! playlist/history management, demuxing, and persistence are the host's
//! responsibility; see [`host`] for the narrow interface this crate expects
//! of it.

pub mod config;
pub mod engine;
pub mod errors;
pub mod host;
pub mod renderer;
pub mod resources;
pub mod utils;

pub use config::RendererConfig;
pub use engine::{Core, InputFrame};
pub use errors::{ChromaError, Result};
pub use resources::render_state::RenderState;
