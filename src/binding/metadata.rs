//! # Model Metadata
//!
//! Type descriptors and validation rules for binding targets, built once when
//! actions are registered and carried on parameter descriptors. There is no
//! runtime reflection: an application declares the shape of each bindable
//! parameter up-front and the engine binds and validates against that
//! declaration.

/// The kind of value a binding target expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeHint {
    String,
    Integer,
    Float,
    Boolean,
    /// A structured object with declared properties.
    Object,
}

impl TypeHint {
    pub fn is_simple(self) -> bool {
        self != Self::Object
    }
}

/// A declarative validation rule applied during the post-bind walk.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationRule {
    /// The value must be present and non-null.
    Required,
    /// Maximum length for string values.
    MaxLength(usize),
    /// Inclusive numeric range.
    Range { min: f64, max: f64 },
}

/// One declared property of an [`TypeHint::Object`] target.
#[derive(Clone, Debug)]
pub struct PropertyMetadata {
    pub name: String,
    pub metadata: ModelMetadata,
}

/// Registration-time description of a binding target: its kind, its declared
/// properties (for objects), and the rules to validate it against.
#[derive(Clone, Debug)]
pub struct ModelMetadata {
    pub type_hint: TypeHint,
    pub properties: Vec<PropertyMetadata>,
    pub rules: Vec<ValidationRule>,
}

impl ModelMetadata {
    pub fn new(type_hint: TypeHint) -> Self {
        Self {
            type_hint,
            properties: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::new(TypeHint::String)
    }

    pub fn integer() -> Self {
        Self::new(TypeHint::Integer)
    }

    pub fn float() -> Self {
        Self::new(TypeHint::Float)
    }

    pub fn boolean() -> Self {
        Self::new(TypeHint::Boolean)
    }

    pub fn object() -> Self {
        Self::new(TypeHint::Object)
    }

    pub fn with_property(mut self, name: impl Into<String>, metadata: ModelMetadata) -> Self {
        self.properties.push(PropertyMetadata {
            name: name.into(),
            metadata,
        });
        self
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self) -> Self {
        self.with_rule(ValidationRule::Required)
    }

    pub fn is_required(&self) -> bool {
        self.rules.contains(&ValidationRule::Required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_properties_and_rules() {
        let metadata = ModelMetadata::object()
            .with_property("name", ModelMetadata::string().required())
            .with_property(
                "quantity",
                ModelMetadata::integer().with_rule(ValidationRule::Range { min: 1.0, max: 100.0 }),
            );
        assert_eq!(metadata.type_hint, TypeHint::Object);
        assert_eq!(metadata.properties.len(), 2);
        assert!(metadata.properties[0].metadata.is_required());
        assert!(!metadata.is_required());
    }

    #[test]
    fn simple_covers_everything_but_object() {
        assert!(TypeHint::Integer.is_simple());
        assert!(!TypeHint::Object.is_simple());
    }
}
