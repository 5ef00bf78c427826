use crate::value::Value;
use serde::Serialize;
use std::collections::BTreeMap;

/// Results produced so far by one workflow execution, by step name.
///
/// Append-only: a step's result is never replaced once stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepResultStore {
    results: BTreeMap<String, Value>,
    #[serde(skip)]
    order: Vec<String>,
}

impl StepResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` for `step`. Returns `false` (and keeps the first value)
    /// when the step already has a result.
    pub(crate) fn record(&mut self, step: &str, value: Value) -> bool {
        if self.results.contains_key(step) {
            return false;
        }
        self.order.push(step.to_string());
        self.results.insert(step.to_string(), value);
        true
    }

    pub fn get(&self, step: &str) -> Option<&Value> {
        self.results.get(step)
    }

    pub fn contains(&self, step: &str) -> bool {
        self.results.contains_key(step)
    }

    /// Look up `field` inside the map produced by `step`.
    pub fn lookup(&self, step: &str, field: &str) -> Option<&Value> {
        self.get(step)?.get(field)
    }

    /// Results in the order they were produced.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.order
            .iter()
            .filter_map(|name| self.results.get(name).map(|v| (name.as_str(), v)))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Map(self.results.into_iter().collect())
    }
}
