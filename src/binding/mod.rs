//! # Model Binding
//!
//! Maps ambient request data (route values, query string, form fields, the
//! request body) into the typed argument values an action declared, while
//! accumulating structured validation errors instead of failing fast.
//!
//! ## Key Types
//!
//! - [`ModelState`]: per-request accumulator of raw input and errors.
//! - [`ModelMetadata`]: registration-time description of a binding target.
//! - [`ModelBinder`]: a pluggable binding strategy.
//! - [`ModelBindingResult`]: declined / failed / succeeded, as a tagged union.
//! - [`bind_model`]: the binder chain; the first non-declining binder wins.
//!
//! # Architecture Note
//! Binders are consulted in registration order and must be explicit about
//! their outcome. `NoResult` means "not my target, try the next strategy";
//! `Failed` means "my target, but the input is bad: stop, record errors, and
//! do not fall back to defaults". Callers must branch on the tag and never
//! assume a value is present.

pub mod binders;
pub mod body;
pub mod metadata;
pub mod model_state;
pub mod validation;

pub use binders::{ComplexTypeModelBinder, SimpleTypeModelBinder};
pub use body::{BodyModelBinder, FormatterError, InputFormatter, InputFormatterContext,
    JsonInputFormatter, BODY_MODEL_STATE_KEY};
pub use metadata::{ModelMetadata, PropertyMetadata, TypeHint, ValidationRule};
pub use model_state::{ModelError, ModelState, ModelStateEntry, ValidationState};
pub use validation::ValidationNode;

use crate::http::Request;
use crate::value_provider::{BindingSource, CompositeValueProvider};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Ambient state shared by every bind attempt of one invocation: the request,
/// the composed value providers, and the registered formatter/binder chains.
/// Shared (not owned) across nested binding calls for sub-properties.
pub struct OperationBindingContext {
    pub request: Request,
    pub value_provider: CompositeValueProvider,
    pub input_formatters: Vec<Arc<dyn InputFormatter>>,
    pub binders: Vec<Arc<dyn ModelBinder>>,
}

/// Per-bind-attempt state: the target's key prefix and metadata, the shared
/// [`ModelState`], and the ambient [`OperationBindingContext`].
///
/// A fresh context is created per top-level argument; nested properties get a
/// derived child context with an extended key prefix via [`Self::child`].
pub struct ModelBindingContext<'op> {
    /// Key prefix for this subtree ("", "order", "order.total", ...).
    pub model_name: String,
    pub metadata: ModelMetadata,
    /// Explicit source restriction for this target, if declared.
    pub binding_source: Option<BindingSource>,
    pub model_state: &'op mut ModelState,
    pub operation: &'op OperationBindingContext,
}

impl<'op> ModelBindingContext<'op> {
    /// Derives the context for a nested property, extending the key prefix
    /// with a `.`-separated segment. The child borrows the same `ModelState`.
    pub fn child<'s>(&'s mut self, name: &str, metadata: ModelMetadata) -> ModelBindingContext<'s> {
        let model_name = if self.model_name.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.model_name, name)
        };
        ModelBindingContext {
            model_name,
            metadata,
            binding_source: None,
            model_state: &mut *self.model_state,
            operation: self.operation,
        }
    }

    /// The value providers eligible for this target: all of them, or the
    /// source-filtered subset when the target declared a source.
    pub fn eligible_providers(&self) -> CompositeValueProvider {
        match self.binding_source {
            Some(source) => self.operation.value_provider.filter(source),
            None => self.operation.value_provider.clone(),
        }
    }
}

/// Outcome of one bind attempt. Mutually exclusive; branch on the tag.
#[derive(Clone, Debug)]
pub enum ModelBindingResult {
    /// The binder declined; the chain tries the next one.
    NoResult,
    /// The binder was applicable but failed. Errors are already recorded in
    /// `ModelState` under `key`; no other binder runs and nothing falls back.
    Failed { key: String },
    /// A value was produced.
    Success {
        key: String,
        value: Value,
        /// False when the binder ran but deliberately left the model unset.
        is_model_set: bool,
        /// Tree consumed by the post-bind validation walk.
        validation_node: Option<ValidationNode>,
    },
}

/// A pluggable binding strategy.
#[async_trait]
pub trait ModelBinder: Send + Sync {
    async fn bind(&self, ctx: &mut ModelBindingContext<'_>) -> ModelBindingResult;
}

/// Runs the binder chain for one target: binders in registration order, first
/// non-[`ModelBindingResult::NoResult`] outcome wins. All-declined is returned
/// as `NoResult` and the caller decides whether absence is an error.
pub async fn bind_model(ctx: &mut ModelBindingContext<'_>) -> ModelBindingResult {
    let binders = ctx.operation.binders.clone();
    for binder in binders {
        match binder.bind(ctx).await {
            ModelBindingResult::NoResult => continue,
            outcome => {
                tracing::debug!(
                    key = %ctx.model_name,
                    failed = matches!(outcome, ModelBindingResult::Failed { .. }),
                    "Bound"
                );
                return outcome;
            }
        }
    }
    tracing::debug!(key = %ctx.model_name, "No binder produced a result");
    ModelBindingResult::NoResult
}
