//! `{{dot.path}}` placeholder substitution against a context object.
//!
//! An unresolved path leaves the placeholder literal in the output — a
//! visible failure mode that is much easier to debug than silent blanking.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("placeholder pattern is valid"));

/// Walk `value` along a dot-separated path.
///
/// Returns `None` as soon as a segment is missing or the current value is
/// not an object.
#[must_use]
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.get(segment))
}

/// Replace every `{{path}}` occurrence in `template` with the value found by
/// walking `context`. Unresolved paths pass through unchanged.
#[must_use]
pub fn interpolate(template: &str, context: &Value) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let path = caps[1].trim();
            match lookup_path(context, path) {
                Some(value) => render(value),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Recursively apply [`interpolate`] to every string inside a JSON value.
///
/// Used to templatize webhook payloads and record updates; non-string
/// scalars are passed through untouched.
#[must_use]
pub fn interpolate_value(value: &Value, context: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(interpolate(s, context)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| interpolate_value(item, context))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), interpolate_value(item, context)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Render a resolved value for textual substitution.
///
/// Strings substitute verbatim; other scalars use their JSON rendering;
/// composites substitute as compact JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
