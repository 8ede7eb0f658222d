//! # Model State
//!
//! Per-request accumulator mapping binding keys to the raw input that arrived
//! under them and the validation errors raised against them. Binding never
//! aborts the request on bad input; it records everything here and lets the
//! action (or a validation-aware filter) decide what to do with an invalid
//! model.

use serde_json::Value;
use std::collections::HashMap;

/// Validation status of one binding key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidationState {
    /// Value recorded, not yet visited by the validation walk.
    #[default]
    Unvalidated,
    Valid,
    Invalid,
    /// Deliberately excluded from validation.
    Skipped,
}

/// One error attached to a binding key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelError {
    pub message: String,
}

impl ModelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The state recorded for one binding key.
#[derive(Clone, Debug, Default)]
pub struct ModelStateEntry {
    /// The value as the source stored it.
    pub raw_value: Option<Value>,
    /// The submitted string form, kept for re-display.
    pub attempted_value: Option<String>,
    pub errors: Vec<ModelError>,
    pub state: ValidationState,
}

/// Insertion-ordered map of binding key → [`ModelStateEntry`].
///
/// Lookup order is irrelevant; enumeration order (error reporting) follows
/// insertion. `error_count` is tracked incrementally so binders can detect
/// that a delegate call (e.g. an input formatter) reported an error without
/// raising one; the count always equals the sum of errors across entries.
#[derive(Default)]
pub struct ModelState {
    entries: Vec<(String, ModelStateEntry)>,
    index: HashMap<String, usize>,
    error_count: usize,
}

impl ModelState {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_mut(&mut self, key: &str) -> &mut ModelStateEntry {
        if let Some(&i) = self.index.get(key) {
            return &mut self.entries[i].1;
        }
        self.index.insert(key.to_string(), self.entries.len());
        self.entries
            .push((key.to_string(), ModelStateEntry::default()));
        &mut self.entries.last_mut().expect("just pushed").1
    }

    pub fn get(&self, key: &str) -> Option<&ModelStateEntry> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Records the value that arrived under `key` without touching its
    /// validation state.
    pub fn set_model_value(
        &mut self,
        key: &str,
        raw_value: Option<Value>,
        attempted_value: Option<String>,
    ) {
        let entry = self.entry_mut(key);
        entry.raw_value = raw_value;
        entry.attempted_value = attempted_value;
    }

    /// Attaches an error to `key` and marks it invalid.
    pub fn add_model_error(&mut self, key: &str, message: impl Into<String>) {
        let entry = self.entry_mut(key);
        entry.errors.push(ModelError::new(message));
        entry.state = ValidationState::Invalid;
        self.error_count += 1;
    }

    /// Marks `key` valid unless an error already made it invalid.
    pub fn mark_field_valid(&mut self, key: &str) {
        let entry = self.entry_mut(key);
        if entry.state != ValidationState::Invalid {
            entry.state = ValidationState::Valid;
        }
    }

    pub fn mark_field_skipped(&mut self, key: &str) {
        let entry = self.entry_mut(key);
        if entry.state != ValidationState::Invalid {
            entry.state = ValidationState::Skipped;
        }
    }

    /// Total errors across all keys.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn is_valid(&self) -> bool {
        self.error_count == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelStateEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_count_tracks_sum_across_keys() {
        let mut state = ModelState::new();
        state.add_model_error("a", "first");
        state.add_model_error("a", "second");
        state.add_model_error("b", "third");

        assert_eq!(state.error_count(), 3);
        let by_hand: usize = state.iter().map(|(_, e)| e.errors.len()).sum();
        assert_eq!(state.error_count(), by_hand);
        assert!(!state.is_valid());
    }

    #[test]
    fn set_model_value_keeps_validation_state() {
        let mut state = ModelState::new();
        state.set_model_value("id", Some(json!("42")), Some("42".to_string()));
        let entry = state.get("id").unwrap();
        assert_eq!(entry.attempted_value.as_deref(), Some("42"));
        assert_eq!(entry.state, ValidationState::Unvalidated);
    }

    #[test]
    fn invalid_wins_over_valid() {
        let mut state = ModelState::new();
        state.add_model_error("id", "bad");
        state.mark_field_valid("id");
        assert_eq!(state.get("id").unwrap().state, ValidationState::Invalid);
    }

    #[test]
    fn enumeration_follows_insertion_order() {
        let mut state = ModelState::new();
        state.set_model_value("z", None, None);
        state.set_model_value("a", None, None);
        state.set_model_value("m", None, None);
        let keys: Vec<&str> = state.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }
}
