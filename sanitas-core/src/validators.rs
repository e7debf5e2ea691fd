// File: sanitas-core/src/validators.rs
//! Input checks used by the coercion transforms.
//!
//! These decide whether a string is acceptable input for a coercion before the
//! coercion runs, e.g. whether `"1e5"` is a float literal or `"TRUE"` is a strict
//! boolean.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use regex::Regex;

static FLOAT_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[-+])?(?:[0-9]+)?(?:\.[0-9]*)?(?:[eE][\+\-]?(?:[0-9]+))?$")
        .expect("float literal regex is valid")
});

/// Returns `true` for decimal float literals: optional sign, digits, optional
/// fraction, optional exponent. A lone sign, dot or comma is rejected.
pub fn is_float(s: &str) -> bool {
    if matches!(s, "" | "." | "," | "-" | "+") {
        return false;
    }
    FLOAT_LITERAL.is_match(s)
}

/// Strict truthiness: only `1` and `true` (any case).
pub fn is_strict_true(s: &str) -> bool {
    s == "1" || s.eq_ignore_ascii_case("true")
}

/// Loose truthiness: everything except `0`, `false` (any case) and the empty
/// string.
pub fn is_loose_true(s: &str) -> bool {
    s != "0" && !s.eq_ignore_ascii_case("false") && !s.is_empty()
}

/// Control characters removed by `stripLow`: code points below 32 and 127.
/// With `keep_new_lines`, `\n` and `\r` are kept.
pub fn is_low_char(c: char, keep_new_lines: bool) -> bool {
    if keep_new_lines && (c == '\n' || c == '\r') {
        return false;
    }
    (c as u32) < 32 || c as u32 == 127
}
