// sanitas-core/src/debug_log.rs
//! Debug-log helpers that keep field contents out of logs by default.
//!
//! Field values routinely carry personal data (emails, names, free text). They
//! are rendered as a length-only placeholder unless `SANITAS_ALLOW_DEBUG_PII`
//! is set to `true`.

use log::debug;
use once_cell::sync::Lazy;

use crate::metadata::RuleKind;
use crate::value::Value;

static PII_DEBUG_ALLOWED: Lazy<bool> = Lazy::new(|| {
    std::env::var("SANITAS_ALLOW_DEBUG_PII")
        .map(|s| s.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
});

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.len())
    }
}

/// Renders a value for a debug line. Only strings are redacted; other shapes
/// are summarized by type.
pub fn loggable_value(value: &Value) -> String {
    match value {
        Value::String(s) if *PII_DEBUG_ALLOWED => format!("{:?}", s),
        Value::String(s) => redact_sensitive(s),
        Value::Null | Value::Bool(_) | Value::Number(_) if *PII_DEBUG_ALLOWED => value.to_js_string(),
        Value::Array(items) => format!("Array({})", items.len()),
        Value::Set(items) => format!("Set({})", items.len()),
        Value::Map(map) => format!("Map({})", map.len()),
        other => other.type_name().to_string(),
    }
}

pub fn log_rule_applied_debug(target_name: &str, property: &str, kind: RuleKind, before: &Value, after: &Value) {
    debug!(
        target: "sanitas_core::engine",
        "{}.{}: '{}' {} -> {}",
        target_name,
        property,
        kind,
        loggable_value(before),
        loggable_value(after)
    );
}
