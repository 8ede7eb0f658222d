//! # Post-Bind Validation
//!
//! Binders do not validate; they build a [`ValidationNode`] tree mirroring
//! the bound object's structure. After all arguments are bound, the tree is
//! walked exactly once, depth-first, validating each node's value against its
//! metadata-declared rules and raising `ModelState` errors under the node's
//! key.

use super::metadata::{ModelMetadata, ValidationRule};
use super::model_state::ModelState;
use serde_json::Value;

/// One node of the lazily-built validation graph over a bound value.
#[derive(Clone, Debug)]
pub struct ValidationNode {
    pub key: String,
    pub metadata: ModelMetadata,
    pub model: Value,
    pub children: Vec<ValidationNode>,
    /// Descend into every metadata-declared property even without explicit
    /// child nodes. Set for body-bound models, whose properties were never
    /// individually bound.
    pub validate_all_properties: bool,
}

impl ValidationNode {
    pub fn new(key: impl Into<String>, metadata: ModelMetadata, model: Value) -> Self {
        Self {
            key: key.into(),
            metadata,
            model,
            children: Vec::new(),
            validate_all_properties: false,
        }
    }

    pub fn with_children(mut self, children: Vec<ValidationNode>) -> Self {
        self.children = children;
        self
    }

    pub fn validating_all_properties(mut self, flag: bool) -> Self {
        self.validate_all_properties = flag;
        self
    }

    /// Walks this subtree depth-first (children before self), applying rules
    /// and recording the outcome per key: errors, or a `Valid` mark.
    pub fn validate(&self, model_state: &mut ModelState) {
        for child in &self.children {
            child.validate(model_state);
        }

        if self.validate_all_properties {
            for property in &self.metadata.properties {
                let key = join_key(&self.key, &property.name);
                let value = self
                    .model
                    .get(&property.name)
                    .cloned()
                    .unwrap_or(Value::Null);
                let node = ValidationNode::new(key, property.metadata.clone(), value)
                    .validating_all_properties(true);
                node.validate(model_state);
            }
        }

        apply_rules(&self.key, &self.metadata.rules, &self.model, model_state);

        let clean = model_state
            .get(&self.key)
            .map(|e| e.errors.is_empty())
            .unwrap_or(true);
        if clean {
            model_state.mark_field_valid(&self.key);
        }
    }
}

fn join_key(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn apply_rules(key: &str, rules: &[ValidationRule], model: &Value, model_state: &mut ModelState) {
    for rule in rules {
        match rule {
            ValidationRule::Required => {
                if model.is_null() {
                    model_state.add_model_error(key, format!("The {key} field is required."));
                }
            }
            ValidationRule::MaxLength(max) => {
                if let Value::String(s) = model {
                    if s.chars().count() > *max {
                        model_state.add_model_error(
                            key,
                            format!(
                                "The field {key} must be a string with a maximum length of {max}."
                            ),
                        );
                    }
                }
            }
            ValidationRule::Range { min, max } => {
                if let Some(n) = model.as_f64() {
                    if n < *min || n > *max {
                        model_state.add_model_error(
                            key,
                            format!("The field {key} must be between {min} and {max}."),
                        );
                    }
                }
            }
        }
    }
}
