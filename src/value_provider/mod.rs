//! # Value Providers
//!
//! A value provider adapts one ambient data source (route values, the query
//! string, a posted form, or an explicit dictionary) into a uniform
//! key→value lookup with prefix-containment queries. The composite merges an
//! ordered list of providers so that a key resolves by *source precedence*:
//! the first registered provider holding the key wins.
//!
//! ## Key Types
//!
//! - [`BindingSource`]: where a value may legally come from.
//! - [`ValueProvider`]: the per-source lookup contract.
//! - [`CompositeValueProvider`]: ordered merge with first-match resolution.
//! - [`ValueProviderFactory`]: builds the providers applicable to a request.
//!
//! # Architecture Note
//! Lookups are synchronous on purpose. Every concrete provider resolves from
//! request data the host already parsed into memory; the genuinely I/O-bound
//! binding step (reading the body) goes through input formatters instead.

pub mod prefix;
mod providers;

pub use prefix::PrefixContainer;
pub use providers::{
    DictionaryValueProvider, FormValueProviderFactory, MultiValueProvider,
    QueryStringValueProviderFactory, RouteValueProviderFactory,
};

use crate::http::Request;
use serde_json::Value;
use std::sync::Arc;

/// Tag naming the legitimate origin of a bound value.
///
/// Drives which providers are eligible for a binding target. `Body` is
/// singular: at most one binder may claim it per bind, and no value provider
/// serves it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingSource {
    /// Route/path values captured during route matching.
    Path,
    /// The query string.
    Query,
    /// A posted form body.
    Form,
    /// A request header.
    Header,
    /// The raw request body, read through an input formatter.
    Body,
    /// Resolved from application services, not request data.
    Services,
    /// An application-defined source.
    Custom,
}

impl BindingSource {
    /// Greedy sources consume their input wholesale instead of resolving
    /// individual keys, so value providers never serve them.
    pub fn is_greedy(self) -> bool {
        matches!(self, Self::Body | Self::Services)
    }
}

/// Culture tag recorded on a produced value.
///
/// Conversion formatting is reported with the value; parsing itself is always
/// invariant here (locale-aware parsing is a formatter concern).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Culture {
    Invariant,
    Current,
}

/// A single value produced by a provider. Immutable once produced.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueProviderResult {
    /// The raw value as the source stored it.
    pub raw_value: Value,
    /// The string form the user submitted, kept for error reporting and
    /// re-display.
    pub attempted_value: Option<String>,
    pub culture: Culture,
}

impl ValueProviderResult {
    pub fn new(raw_value: Value, attempted_value: Option<String>, culture: Culture) -> Self {
        Self {
            raw_value,
            attempted_value,
            culture,
        }
    }
}

/// Uniform lookup over one ambient data source.
pub trait ValueProvider: Send + Sync {
    /// Does any stored key equal `key` or continue it with `.` or `[`?
    fn contains_prefix(&self, key: &str) -> bool;

    /// The value stored under exactly `key`, or `None` when absent.
    fn get_value(&self, key: &str) -> Option<ValueProviderResult>;

    /// The source this provider's data came from.
    fn binding_source(&self) -> BindingSource;
}

/// Ordered merge of providers; registration order encodes source precedence.
#[derive(Clone, Default)]
pub struct CompositeValueProvider {
    providers: Vec<Arc<dyn ValueProvider>>,
}

impl CompositeValueProvider {
    pub fn new(providers: Vec<Arc<dyn ValueProvider>>) -> Self {
        Self { providers }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// The sub-composite of providers serving `source`, preserving order.
    /// Binding targets with an explicit source only consult eligible
    /// providers.
    pub fn filter(&self, source: BindingSource) -> CompositeValueProvider {
        Self {
            providers: self
                .providers
                .iter()
                .filter(|p| p.binding_source() == source)
                .cloned()
                .collect(),
        }
    }
}

impl ValueProvider for CompositeValueProvider {
    fn contains_prefix(&self, key: &str) -> bool {
        self.providers.iter().any(|p| p.contains_prefix(key))
    }

    fn get_value(&self, key: &str) -> Option<ValueProviderResult> {
        self.providers.iter().find_map(|p| p.get_value(key))
    }

    fn binding_source(&self) -> BindingSource {
        BindingSource::Custom
    }
}

/// Builds the provider for one source, when the request carries that source.
pub trait ValueProviderFactory: Send + Sync {
    /// `None` when the source is absent from this request (e.g. no form body).
    fn value_provider(&self, request: &Request) -> Option<Arc<dyn ValueProvider>>;
}

/// Runs the registered factories in order and assembles the composite for one
/// request. Factory registration order is the source-precedence order.
pub fn compose(
    factories: &[Arc<dyn ValueProviderFactory>],
    request: &Request,
) -> CompositeValueProvider {
    let providers = factories
        .iter()
        .filter_map(|f| f.value_provider(request))
        .collect();
    CompositeValueProvider::new(providers)
}
