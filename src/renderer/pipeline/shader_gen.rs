//! Shader Code Generator
//!
//! Renders the fragment pipeline's WGSL template through the macro set in
//! [`ShaderCompilationOptions`]. Unlike a per-material shader generator,
//! this crate has exactly one structural variant axis: whether the output
//! is clamped for SDR display or left as HDR passthrough (design §4.2 step
//! 25). Every other one of the ~28 steps is a runtime uniform branch so
//! toggling it never costs a recompile (design §6.4).

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use super::shader_manager::{LocationAllocator, get_env};
use crate::resources::shader_defines::ShaderDefines;
use minijinja::value::Value;
use serde::Serialize;

/// Compile-time macro set for one fragment pipeline variant.
#[derive(Debug, Clone, Default)]
pub struct ShaderCompilationOptions {
    pub(crate) defines: ShaderDefines,
}

impl ShaderCompilationOptions {
    #[must_use]
    pub fn new() -> Self {
        Self {
            defines: ShaderDefines::new(),
        }
    }

    /// The only variant axis the fragment pipeline needs: HDR output
    /// skips the final SDR clamp.
    #[must_use]
    pub fn for_output_mode(hdr_output: bool) -> Self {
        let mut defines = ShaderDefines::new();
        defines.set("HDR_OUTPUT", if hdr_output { "1" } else { "0" });
        Self { defines }
    }

    #[inline]
    #[must_use]
    pub fn defines(&self) -> &ShaderDefines {
        &self.defines
    }

    /// Computes the hash used to key the compiled-pipeline cache.
    #[must_use]
    pub fn compute_hash(&self) -> u64 {
        self.defines.compute_hash()
    }

    fn to_template_map(&self) -> BTreeMap<String, String> {
        self.defines
            .iter_strings()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Hash for ShaderCompilationOptions {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.defines.as_slice().hash(state);
    }
}

impl PartialEq for ShaderCompilationOptions {
    fn eq(&self, other: &Self) -> bool {
        self.defines == other.defines
    }
}

impl Eq for ShaderCompilationOptions {}

#[derive(Serialize)]
struct ShaderContext {
    #[serde(flatten)]
    defines: BTreeMap<String, String>,
    loc: Value,
}

pub struct ShaderGenerator;

impl ShaderGenerator {
    #[must_use]
    pub fn generate_shader(template_name: &str, options: &ShaderCompilationOptions) -> String {
        let env = get_env();
        let allocator = LocationAllocator::new();
        let loc_value = Value::from_object(allocator);

        let ctx = ShaderContext {
            defines: options.to_template_map(),
            loc: loc_value,
        };

        let template = env
            .get_template(template_name)
            .expect("shader template not found");

        let source = template.render(&ctx).expect("shader render failed");

        format!("// === Auto-generated fragment pipeline shader ===\n{source}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hdr_and_sdr_options_hash_differently() {
        let sdr = ShaderCompilationOptions::for_output_mode(false);
        let hdr = ShaderCompilationOptions::for_output_mode(true);
        assert_ne!(sdr.compute_hash(), hdr.compute_hash());
    }

    #[test]
    fn identical_output_mode_hashes_match() {
        let a = ShaderCompilationOptions::for_output_mode(true);
        let b = ShaderCompilationOptions::for_output_mode(true);
        assert_eq!(a.compute_hash(), b.compute_hash());
    }
}
