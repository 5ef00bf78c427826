//! Coercion of dynamic values to declared [`TypeTag`]s.
//!
//! | tag       | accepts                                                               |
//! |-----------|-----------------------------------------------------------------------|
//! | `string`  | strings; integers, floats and booleans are rendered as text           |
//! | `integer` | integers; finite floats (truncated); numeric text (float text truncated) |
//! | `number`  | floats; integers; integer- or float-formatted text                    |
//! | `boolean` | booleans; integers `0`/`1`; the literals in [`TRUE_LITERALS`] / [`FALSE_LITERALS`] |
//! | `array`   | sequences only                                                        |
//! | `map`     | maps only                                                             |
//! | `any`     | everything, unchanged                                                 |
//!
//! `null` only satisfies `any`. Text is never split into arrays or maps.

use super::schema::TypeTag;
use crate::value::Value;

/// Text accepted as boolean `true` (compared trimmed and ASCII case-insensitively).
pub const TRUE_LITERALS: [&str; 6] = ["true", "t", "yes", "y", "on", "1"];

/// Text accepted as boolean `false` (compared trimmed and ASCII case-insensitively).
pub const FALSE_LITERALS: [&str; 6] = ["false", "f", "no", "n", "off", "0"];

/// Coerce `value` to `tag`, returning `None` when the value is not representable.
pub fn coerce(value: &Value, tag: TypeTag) -> Option<Value> {
    match tag {
        TypeTag::Any => Some(value.clone()),
        TypeTag::String => coerce_string(value),
        TypeTag::Integer => coerce_integer(value),
        TypeTag::Number => coerce_number(value),
        TypeTag::Boolean => coerce_boolean(value),
        TypeTag::Array => matches!(value, Value::Sequence(_)).then(|| value.clone()),
        TypeTag::Map => matches!(value, Value::Map(_)).then(|| value.clone()),
    }
}

/// Short description of `value` for error messages.
pub fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => {
            let mut shown: String = s.chars().take(40).collect();
            if shown.len() < s.len() {
                shown.push('…');
            }
            format!("string \"{shown}\"")
        }
        Value::Integer(i) => format!("integer {i}"),
        Value::Float(f) => format!("float {f}"),
        Value::Bool(b) => format!("boolean {b}"),
        other => other.kind().to_string(),
    }
}

fn coerce_string(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Integer(_) | Value::Float(_) | Value::Bool(_) => Some(Value::String(value.render())),
        Value::Null | Value::Sequence(_) | Value::Map(_) => None,
    }
}

fn coerce_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Integer(_) => Some(value.clone()),
        Value::Float(f) => truncate(*f).map(Value::Integer),
        Value::String(s) => parse_integer_text(s).map(Value::Integer),
        _ => None,
    }
}

fn coerce_number(value: &Value) -> Option<Value> {
    match value {
        Value::Float(f) if f.is_finite() => Some(value.clone()),
        #[allow(clippy::cast_precision_loss)]
        Value::Integer(i) => Some(Value::Float(*i as f64)),
        Value::String(s) => parse_float_text(s).map(Value::Float),
        _ => None,
    }
}

fn coerce_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::Integer(1) => Some(Value::Bool(true)),
        Value::Integer(0) => Some(Value::Bool(false)),
        Value::String(s) => parse_boolean_text(s).map(Value::Bool),
        _ => None,
    }
}

pub fn parse_boolean_text(text: &str) -> Option<bool> {
    let text = text.trim();
    if TRUE_LITERALS.iter().any(|lit| text.eq_ignore_ascii_case(lit)) {
        Some(true)
    } else if FALSE_LITERALS.iter().any(|lit| text.eq_ignore_ascii_case(lit)) {
        Some(false)
    } else {
        None
    }
}

fn parse_integer_text(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Some(i);
    }
    parse_float_text(text).and_then(truncate)
}

/// Only plain decimal/exponent notation; `inf`, `nan` and friends are not numbers here.
fn parse_float_text(text: &str) -> Option<f64> {
    let text = text.trim();
    let looks_numeric = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && text.chars().any(|c| c.is_ascii_digit());
    if !looks_numeric {
        return None;
    }
    text.parse::<f64>().ok().filter(|f| f.is_finite())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn truncate(f: f64) -> Option<i64> {
    if !f.is_finite() {
        return None;
    }
    let t = f.trunc();
    if t < i64::MIN as f64 || t >= i64::MAX as f64 {
        return None;
    }
    Some(t as i64)
}
