//! The single-pass colour fragment pipeline: WGSL template generation,
//! the uniform upload path, and the compiled-pipeline cache.

pub mod fragment_pipeline;
pub mod shader_gen;
pub mod shader_manager;
pub mod uniform_uploader;

pub use fragment_pipeline::{FragmentPipeline, FragmentPipelineVariant};
pub use shader_gen::{ShaderCompilationOptions, ShaderGenerator};
pub use uniform_uploader::{ShaderProgram, UniformUploader};
