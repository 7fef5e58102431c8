//! Global String Interner
//!
//! Converts strings into integer [`Symbol`]s for O(1) comparison and
//! hashing. This is the foundation of [`crate::resources::shader_defines::ShaderDefines`],
//! which needs fast equality/hash over macro sets to key the pipeline cache.

use lasso::Spur;
use once_cell::sync::Lazy;

#[cfg(not(target_arch = "wasm32"))]
use lasso::ThreadedRodeo;

#[cfg(target_arch = "wasm32")]
use lasso::Rodeo;
#[cfg(target_arch = "wasm32")]
use std::cell::UnsafeCell;

/// Global string interner instance (native — thread-safe).
#[cfg(not(target_arch = "wasm32"))]
static INTERNER: Lazy<ThreadedRodeo> = Lazy::new(ThreadedRodeo::new);

/// Global string interner instance (wasm — single-threaded).
///
/// `UnsafeCell` rather than `RefCell`: this crate is single-threaded on wasm
/// and a `RefCell` can double-borrow-panic when the host's event handlers
/// interleave with pipeline compilation.
#[cfg(target_arch = "wasm32")]
thread_local! {
    static INTERNER: UnsafeCell<Rodeo> = UnsafeCell::new(Rodeo::new());
}

/// Compact integer identifier for an interned string.
pub type Symbol = Spur;

/// Interns a string, returning its existing `Symbol` or allocating a new one.
#[cfg(not(target_arch = "wasm32"))]
#[inline]
pub fn intern(s: &str) -> Symbol {
    INTERNER.get_or_intern(s)
}

#[cfg(target_arch = "wasm32")]
#[inline]
pub fn intern(s: &str) -> Symbol {
    // SAFETY: wasm is single-threaded, so there is no concurrent access.
    INTERNER.with(|interner| unsafe { (*interner.get()).get_or_intern(s) })
}

/// Looks up the `Symbol` for an existing string without interning it.
#[cfg(not(target_arch = "wasm32"))]
#[inline]
pub fn get(s: &str) -> Option<Symbol> {
    INTERNER.get(s)
}

#[cfg(target_arch = "wasm32")]
#[inline]
pub fn get(s: &str) -> Option<Symbol> {
    INTERNER.with(|interner| unsafe { (*interner.get()).get(s) })
}

/// Resolves a `Symbol` back to its string contents.
#[cfg(not(target_arch = "wasm32"))]
#[inline]
#[must_use]
pub fn resolve(sym: Symbol) -> std::borrow::Cow<'static, str> {
    std::borrow::Cow::Owned(INTERNER.resolve(&sym).to_string())
}

#[cfg(target_arch = "wasm32")]
#[inline]
#[must_use]
pub fn resolve(sym: Symbol) -> std::borrow::Cow<'static, str> {
    INTERNER.with(|interner| {
        // SAFETY: wasm is single-threaded.
        std::borrow::Cow::Owned(unsafe { (*interner.get()).resolve(&sym) }.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_the_pool() {
        let a = intern("TONE_MAPPING_MODE");
        let b = intern("TONE_MAPPING_MODE");
        assert_eq!(a, b);
        assert_eq!(resolve(a), "TONE_MAPPING_MODE");
    }

    #[test]
    fn get_misses_before_intern() {
        assert!(get("NEVER_INTERNED_SYMBOL_XYZ").is_none());
        let sym = intern("NEVER_INTERNED_SYMBOL_XYZ");
        assert_eq!(get("NEVER_INTERNED_SYMBOL_XYZ"), Some(sym));
    }
}
