//! Built-in value transforms, one per built-in rule kind.
//!
//! Every function is pure. String transforms return non-string input
//! unchanged. The coercions (`to_int`, `to_float`, `to_date`) accept input that
//! already has the target type, parse strings, and reject anything else.
//!
//! License: MIT OR APACHE 2.0

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::errors::SanitasError;
use crate::metadata::RuleKind;
use crate::sanitizers::compiler::{get_or_compile_char_class, CharClassMode};
use crate::sanitizers::email;
use crate::validators;
use crate::value::Value;

type TransformResult = Result<Value, SanitasError>;

fn expected_string(kind: RuleKind, input: &Value) -> SanitasError {
    SanitasError::transform(kind, format!("Expected a string but received a {}", input.type_name()))
}

/// Turns a trim constraint into the set of characters to strip.
///
/// A list is joined with `,` before use, so a comma becomes part of any
/// multi-entry set. `None` means whitespace.
fn trim_chars(chars: Option<&Value>) -> Option<Vec<char>> {
    match chars {
        Some(Value::Array(items)) => {
            let joined = items.iter().map(Value::to_js_string).collect::<Vec<_>>().join(",");
            Some(joined.chars().collect())
        }
        Some(Value::String(s)) => Some(s.chars().collect()),
        _ => None,
    }
}

fn strip_start(s: &str, chars: Option<&[char]>) -> String {
    match chars {
        Some(set) => s.trim_start_matches(|c| set.contains(&c)).to_string(),
        None => s.trim_start().to_string(),
    }
}

fn strip_end(s: &str, chars: Option<&[char]>) -> String {
    match chars {
        Some(set) => s.trim_end_matches(|c| set.contains(&c)).to_string(),
        None => s.trim_end().to_string(),
    }
}

/// Trims characters (whitespace by default) from the start of a string.
pub fn ltrim(input: Value, chars: Option<&Value>) -> Value {
    match input {
        Value::String(s) => Value::String(strip_start(&s, trim_chars(chars).as_deref())),
        other => other,
    }
}

/// Trims characters (whitespace by default) from the end of a string.
pub fn rtrim(input: Value, chars: Option<&Value>) -> Value {
    match input {
        Value::String(s) => Value::String(strip_end(&s, trim_chars(chars).as_deref())),
        other => other,
    }
}

/// Trims characters (whitespace by default) from both ends of a string.
pub fn trim(input: Value, chars: Option<&Value>) -> Value {
    match input {
        Value::String(s) => {
            let set = trim_chars(chars);
            Value::String(strip_end(&strip_start(&s, set.as_deref()), set.as_deref()))
        }
        other => other,
    }
}

/// Replaces `<`, `>`, `&`, `'`, `"`, `/`, `\` and backtick with HTML entities.
pub fn escape(input: Value) -> Value {
    match input {
        Value::String(s) => {
            let mut out = String::with_capacity(s.len());
            for c in s.chars() {
                match c {
                    '&' => out.push_str("&amp;"),
                    '"' => out.push_str("&quot;"),
                    '\'' => out.push_str("&#x27;"),
                    '<' => out.push_str("&lt;"),
                    '>' => out.push_str("&gt;"),
                    '/' => out.push_str("&#x2F;"),
                    '\\' => out.push_str("&#x5C;"),
                    '`' => out.push_str("&#96;"),
                    other => out.push(other),
                }
            }
            Value::String(out)
        }
        other => other,
    }
}

fn char_class_constraint(kind: RuleKind, chars: Option<&Value>) -> Result<String, SanitasError> {
    match chars {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_js_string()),
        None => Err(SanitasError::transform(kind, "a character class constraint is required")),
    }
}

/// Removes every character matched by the character class `chars`.
pub fn blacklist(input: Value, chars: Option<&Value>) -> TransformResult {
    match input {
        Value::String(s) => {
            let class = char_class_constraint(RuleKind::Blacklist, chars)?;
            let regex = get_or_compile_char_class(&class, CharClassMode::Listed)
                .map_err(|e| SanitasError::transform(RuleKind::Blacklist, e))?;
            Ok(Value::String(regex.replace_all(&s, "").into_owned()))
        }
        other => Ok(other),
    }
}

/// Removes every character not matched by the character class `chars`.
pub fn whitelist(input: Value, chars: Option<&Value>) -> TransformResult {
    match input {
        Value::String(s) => {
            let class = char_class_constraint(RuleKind::Whitelist, chars)?;
            let regex = get_or_compile_char_class(&class, CharClassMode::Unlisted)
                .map_err(|e| SanitasError::transform(RuleKind::Whitelist, e))?;
            Ok(Value::String(regex.replace_all(&s, "").into_owned()))
        }
        other => Ok(other),
    }
}

/// Removes control characters; `keep_new_lines` preserves `\n` and `\r`.
pub fn strip_low(input: Value, keep_new_lines: Option<&Value>) -> Value {
    let keep = keep_new_lines.is_some_and(Value::is_truthy);
    match input {
        Value::String(s) => Value::String(s.chars().filter(|c| !validators::is_low_char(*c, keep)).collect()),
        other => other,
    }
}

/// Canonicalizes an email address, lowercasing the local part. Produces `false`
/// when the address cannot be canonicalized. Constraints are ignored.
pub fn normalize_email(input: Value) -> Value {
    match input {
        Value::String(s) => match email::normalize_email(&s, true) {
            Some(normalized) => Value::String(normalized),
            None => Value::Bool(false),
        },
        other => other,
    }
}

/// Strings map to booleans (strictly: only `1`/`true`); other values map to
/// their truthiness.
pub fn to_boolean(input: Value, strict: Option<&Value>) -> Value {
    let strict = strict.is_some_and(Value::is_truthy);
    match input {
        Value::String(s) if strict => Value::Bool(validators::is_strict_true(&s)),
        Value::String(s) => Value::Bool(validators::is_loose_true(&s)),
        other => Value::Bool(other.is_truthy()),
    }
}

/// Parses a date; unparseable strings become `Null`.
pub fn to_date(input: Value) -> TransformResult {
    match input {
        Value::Date(d) => Ok(Value::Date(d)),
        Value::String(s) => Ok(parse_date(&s).map(Value::Date).unwrap_or(Value::Null)),
        other => Err(expected_string(RuleKind::ToDate, &other)),
    }
}

/// Parses a float literal; anything else becomes `NaN`.
pub fn to_float(input: Value) -> TransformResult {
    match input {
        Value::Number(n) => Ok(Value::Number(n)),
        Value::String(s) => {
            if !validators::is_float(&s) {
                return Ok(Value::Number(f64::NAN));
            }
            Ok(Value::Number(s.parse::<f64>().unwrap_or(f64::NAN)))
        }
        other => Err(expected_string(RuleKind::ToFloat, &other)),
    }
}

/// Parses the leading integer of a string in `radix` (10 by default); no
/// leading digits gives `NaN`. A `0x` prefix is only read in radix 16.
pub fn to_int(input: Value, radix: Option<&Value>) -> TransformResult {
    match input {
        Value::Number(n) => Ok(Value::Number(n)),
        Value::String(s) => {
            let radix = radix.and_then(Value::as_f64).map(|r| r as u32).filter(|r| *r != 0).unwrap_or(10);
            Ok(Value::Number(parse_int(&s, radix)))
        }
        other => Err(expected_string(RuleKind::ToInt, &other)),
    }
}

/// String coercion of any value.
pub fn to_string(input: Value) -> Value {
    match input {
        Value::String(s) => Value::String(s),
        other => Value::String(other.to_js_string()),
    }
}

pub fn to_lower_case(input: Value) -> Value {
    match input {
        Value::String(s) => Value::String(s.to_lowercase()),
        other => other,
    }
}

pub fn to_upper_case(input: Value) -> Value {
    match input {
        Value::String(s) => Value::String(s.to_uppercase()),
        other => other,
    }
}

/// Applies the built-in transform for `kind`, reading its argument from the
/// first constraint slot.
///
/// `nested` and `custom` are orchestrated by the engine, not transformed here,
/// so handing them to this function is a configuration error.
pub fn apply(kind: RuleKind, input: Value, constraint: Option<&Value>) -> TransformResult {
    match kind {
        RuleKind::Blacklist => blacklist(input, constraint),
        RuleKind::Escape => Ok(escape(input)),
        RuleKind::Ltrim => Ok(ltrim(input, constraint)),
        RuleKind::NormalizeEmail => Ok(normalize_email(input)),
        RuleKind::Rtrim => Ok(rtrim(input, constraint)),
        RuleKind::StripLow => Ok(strip_low(input, constraint)),
        RuleKind::ToBoolean => Ok(to_boolean(input, constraint)),
        RuleKind::ToDate => to_date(input),
        RuleKind::ToFloat => to_float(input),
        RuleKind::ToInt => to_int(input, constraint),
        RuleKind::ToString => Ok(to_string(input)),
        RuleKind::Trim => Ok(trim(input, constraint)),
        RuleKind::Whitelist => whitelist(input, constraint),
        RuleKind::ToLowerCase => Ok(to_lower_case(input)),
        RuleKind::ToUpperCase => Ok(to_upper_case(input)),
        RuleKind::Custom | RuleKind::Nested => Err(SanitasError::WrongSanitizationType {
            kind,
            value: input.to_js_string(),
        }),
    }
}

fn parse_int(s: &str, radix: u32) -> f64 {
    let mut rest = s.trim_start();
    let mut sign = 1.0;
    if let Some(stripped) = rest.strip_prefix('-') {
        sign = -1.0;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    if radix == 16 && (rest.starts_with("0x") || rest.starts_with("0X")) {
        rest = &rest[2..];
    }

    let mut value = 0.0_f64;
    let mut digits = 0usize;
    for c in rest.chars() {
        match c.to_digit(radix) {
            Some(d) => {
                value = value * f64::from(radix) + f64::from(d);
                digits += 1;
            }
            None => break,
        }
    }

    if digits == 0 { f64::NAN } else { sign * value }
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    if let Ok(d) = DateTime::parse_from_rfc2822(s) {
        return Some(d.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    None
}
