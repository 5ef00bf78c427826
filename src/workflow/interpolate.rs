//! `{step.field}` placeholder substitution.
//!
//! A placeholder whose step or field cannot be found is left in the output
//! verbatim, braces included.

use super::store::StepResultStore;
use crate::value::{Value, ValueMap};

/// Substitute every resolvable placeholder in `template`.
pub fn interpolate(template: &str, results: &StepResultStore) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let inner = &after[..close];
        if inner.contains('{') {
            // Not a placeholder; emit this brace and rescan from the next one.
            out.push('{');
            rest = after;
            continue;
        }
        match resolve(inner, results) {
            Some(value) => out.push_str(&value.render()),
            None => {
                out.push('{');
                out.push_str(inner);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Interpolate every string leaf of `params`.
///
/// A leaf that is exactly one resolvable placeholder takes the referenced
/// value itself, so `"{fetch.status}"` stays an integer.
pub fn interpolate_params(params: &ValueMap, results: &StepResultStore) -> ValueMap {
    params
        .iter()
        .map(|(k, v)| (k.clone(), interpolate_value(v, results)))
        .collect()
}

fn interpolate_value(value: &Value, results: &StepResultStore) -> Value {
    match value {
        Value::String(text) => {
            if let Some(inner) = whole_placeholder(text)
                && let Some(resolved) = resolve(inner, results)
            {
                return resolved.clone();
            }
            Value::String(interpolate(text, results))
        }
        Value::Sequence(items) => {
            Value::Sequence(items.iter().map(|v| interpolate_value(v, results)).collect())
        }
        Value::Map(map) => Value::Map(interpolate_params(map, results)),
        other => other.clone(),
    }
}

fn whole_placeholder(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('{')?.strip_suffix('}')?;
    (!inner.contains(['{', '}'])).then_some(inner)
}

/// `step.field[.nested...]` → the referenced value.
fn resolve<'a>(reference: &str, results: &'a StepResultStore) -> Option<&'a Value> {
    let (step, path) = reference.trim().split_once('.')?;
    let mut fields = path.split('.');
    let first = fields.next()?;
    let mut value = results.lookup(step, first)?;
    for field in fields {
        value = value.get(field)?;
    }
    Some(value)
}
