//! compiler.rs - Compiles and caches the character-class regexes used by the
//! `blacklist` and `whitelist` transforms.
//!
//! Rules are applied to every instance of a class, so the same character class
//! is compiled once and shared through a global cache keyed by the class body
//! and its polarity.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Maximum accepted length of a character-class body.
pub const MAX_CHAR_CLASS_LENGTH: usize = 500;

/// Whether the compiled class matches the listed characters or everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClassMode {
    /// `[chars]+`
    Listed,
    /// `[^chars]+`
    Unlisted,
}

type CacheKey = (CharClassMode, String);

static CHAR_CLASS_CACHE: Lazy<RwLock<HashMap<CacheKey, Arc<Regex>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Compiles `chars` (the body of a regex character class, escapes included)
/// without consulting the cache.
pub fn compile_char_class(chars: &str, mode: CharClassMode) -> Result<Regex, String> {
    if chars.len() > MAX_CHAR_CLASS_LENGTH {
        return Err(format!(
            "character class length ({}) exceeds maximum allowed ({})",
            chars.len(),
            MAX_CHAR_CLASS_LENGTH
        ));
    }
    let pattern = match mode {
        CharClassMode::Listed => format!("[{}]+", chars),
        CharClassMode::Unlisted => format!("[^{}]+", chars),
    };
    RegexBuilder::new(&pattern)
        .size_limit(10 * (1 << 20))
        .build()
        .map_err(|e| format!("invalid character class '{}': {}", chars, e))
}

/// Gets the compiled class from the cache or compiles and caches it.
pub fn get_or_compile_char_class(chars: &str, mode: CharClassMode) -> Result<Arc<Regex>, String> {
    let key = (mode, chars.to_string());
    {
        let cache = CHAR_CLASS_CACHE.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(regex) = cache.get(&key) {
            return Ok(Arc::clone(regex));
        }
    }

    debug!(target: "sanitas_core::compiler", "Compiling character class {:?} '{}'", mode, chars);
    let compiled = Arc::new(compile_char_class(chars, mode)?);
    CHAR_CLASS_CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key, Arc::clone(&compiled));
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_returns_shared_instance() {
        let a = get_or_compile_char_class("abc", CharClassMode::Listed).unwrap();
        let b = get_or_compile_char_class("abc", CharClassMode::Listed).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let c = get_or_compile_char_class("abc", CharClassMode::Unlisted).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_invalid_and_oversized_classes_fail() {
        assert!(compile_char_class("z-a", CharClassMode::Listed).is_err());
        let long = "a".repeat(MAX_CHAR_CLASS_LENGTH + 1);
        assert!(compile_char_class(&long, CharClassMode::Listed).is_err());
    }
}
