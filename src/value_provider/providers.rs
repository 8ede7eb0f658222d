//! Concrete providers and the per-request factories that build them.

use super::{
    BindingSource, Culture, PrefixContainer, ValueProvider, ValueProviderFactory,
    ValueProviderResult,
};
use crate::http::Request;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Provider backed by a single-valued string map (route values, explicit
/// dictionaries).
///
/// The prefix index is built lazily on first containment query and cached for
/// the provider's lifetime; `OnceLock` resolves the construction race without
/// per-lookup locking.
pub struct DictionaryValueProvider {
    source: BindingSource,
    values: HashMap<String, String>,
    prefixes: OnceLock<PrefixContainer>,
}

impl DictionaryValueProvider {
    pub fn new(source: BindingSource, values: HashMap<String, String>) -> Self {
        Self {
            source,
            values,
            prefixes: OnceLock::new(),
        }
    }

    fn prefix_container(&self) -> &PrefixContainer {
        self.prefixes
            .get_or_init(|| PrefixContainer::new(self.values.keys().cloned()))
    }
}

impl ValueProvider for DictionaryValueProvider {
    fn contains_prefix(&self, key: &str) -> bool {
        self.prefix_container().contains_prefix(key)
    }

    fn get_value(&self, key: &str) -> Option<ValueProviderResult> {
        self.values.get(key).map(|v| {
            ValueProviderResult::new(
                Value::String(v.clone()),
                Some(v.clone()),
                Culture::Invariant,
            )
        })
    }

    fn binding_source(&self) -> BindingSource {
        self.source
    }
}

/// Provider backed by a multi-valued string map (query string, form body).
///
/// A key holding several values yields a JSON array raw value and a
/// comma-joined attempted value, matching how repeated query/form keys read
/// back for error reporting.
pub struct MultiValueProvider {
    source: BindingSource,
    culture: Culture,
    values: HashMap<String, Vec<String>>,
    prefixes: OnceLock<PrefixContainer>,
}

impl MultiValueProvider {
    pub fn new(
        source: BindingSource,
        culture: Culture,
        values: HashMap<String, Vec<String>>,
    ) -> Self {
        Self {
            source,
            culture,
            values,
            prefixes: OnceLock::new(),
        }
    }

    fn prefix_container(&self) -> &PrefixContainer {
        self.prefixes
            .get_or_init(|| PrefixContainer::new(self.values.keys().cloned()))
    }
}

impl ValueProvider for MultiValueProvider {
    fn contains_prefix(&self, key: &str) -> bool {
        self.prefix_container().contains_prefix(key)
    }

    fn get_value(&self, key: &str) -> Option<ValueProviderResult> {
        let values = self.values.get(key)?;
        let result = match values.as_slice() {
            [] => return None,
            [single] => ValueProviderResult::new(
                Value::String(single.clone()),
                Some(single.clone()),
                self.culture,
            ),
            many => ValueProviderResult::new(
                Value::Array(many.iter().cloned().map(Value::String).collect()),
                Some(many.join(",")),
                self.culture,
            ),
        };
        Some(result)
    }

    fn binding_source(&self) -> BindingSource {
        self.source
    }
}

/// Factory for the route-value provider (`BindingSource::Path`).
pub struct RouteValueProviderFactory;

impl ValueProviderFactory for RouteValueProviderFactory {
    fn value_provider(&self, request: &Request) -> Option<Arc<dyn ValueProvider>> {
        Some(Arc::new(DictionaryValueProvider::new(
            BindingSource::Path,
            request.route_values.clone(),
        )))
    }
}

/// Factory for the query-string provider (`BindingSource::Query`).
pub struct QueryStringValueProviderFactory;

impl ValueProviderFactory for QueryStringValueProviderFactory {
    fn value_provider(&self, request: &Request) -> Option<Arc<dyn ValueProvider>> {
        Some(Arc::new(MultiValueProvider::new(
            BindingSource::Query,
            Culture::Invariant,
            request.query.clone(),
        )))
    }
}

/// Factory for the posted-form provider (`BindingSource::Form`).
///
/// Yields nothing unless the request actually carries a form content type, so
/// non-form requests never consult form data.
pub struct FormValueProviderFactory;

impl ValueProviderFactory for FormValueProviderFactory {
    fn value_provider(&self, request: &Request) -> Option<Arc<dyn ValueProvider>> {
        if !request.has_form_content_type() {
            return None;
        }
        Some(Arc::new(MultiValueProvider::new(
            BindingSource::Form,
            Culture::Current,
            request.form.clone(),
        )))
    }
}
