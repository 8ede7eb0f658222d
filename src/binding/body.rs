//! # Body Binding
//!
//! The request body is a *greedy* source: exactly one binder owns it, and it
//! delegates the actual reading to the first registered input formatter that
//! accepts the request's content type. Everything that can go wrong (no
//! matching formatter, a formatter error, a formatter that reports a model
//! error without raising) is recorded in `ModelState` under the reserved
//! [`BODY_MODEL_STATE_KEY`] and never crashes the invocation.

use super::{
    ModelBinder, ModelBindingContext, ModelBindingResult, ModelMetadata, ModelState,
    ValidationNode,
};
use crate::value_provider::BindingSource;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

/// Reserved `ModelState` key for body-bound models. Consumers inspecting
/// validation errors for body-bound models must look under this exact key.
pub const BODY_MODEL_STATE_KEY: &str = "$body";

/// Failure raised by an input formatter while reading the body.
#[derive(Debug, thiserror::Error)]
pub enum FormatterError {
    #[error("failed to deserialize request body: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

/// What a formatter sees while reading: the negotiated content type, the
/// buffered body, the target's metadata, and the shared `ModelState` for
/// in-line error reporting.
pub struct InputFormatterContext<'a> {
    pub content_type: Option<&'a str>,
    pub body: &'a [u8],
    pub metadata: &'a ModelMetadata,
    pub model_state: &'a mut ModelState,
}

/// Deserializes a request body into a model value.
#[async_trait]
pub trait InputFormatter: Send + Sync {
    /// Whether this formatter accepts the request's content type for the
    /// given target.
    fn can_read(&self, content_type: Option<&str>, metadata: &ModelMetadata) -> bool;

    /// Reads and deserializes the body. May record model errors on the
    /// context instead of (or in addition to) returning `Err`.
    async fn read(&self, ctx: &mut InputFormatterContext<'_>) -> Result<Value, FormatterError>;
}

/// JSON formatter over `serde_json`. Serialization internals stay opaque: the
/// engine only sees a `Value` or an error.
pub struct JsonInputFormatter;

#[async_trait]
impl InputFormatter for JsonInputFormatter {
    fn can_read(&self, content_type: Option<&str>, _metadata: &ModelMetadata) -> bool {
        matches!(
            content_type,
            Some(ct) if ct.starts_with("application/json") || ct.starts_with("text/json")
        )
    }

    async fn read(&self, ctx: &mut InputFormatterContext<'_>) -> Result<Value, FormatterError> {
        let value = serde_json::from_slice(ctx.body)?;
        Ok(value)
    }
}

/// Binds the unique `Body`-sourced argument through the formatter list.
///
/// # Architecture Note
/// This binder is the only handler for the `Body` source and cannot run
/// twice, so it never answers `NoResult` once the source matches: every
/// failure is `Failed`, telling the chain to skip other binders and never
/// fall back to defaults.
pub struct BodyModelBinder;

#[async_trait]
impl ModelBinder for BodyModelBinder {
    async fn bind(&self, ctx: &mut ModelBindingContext<'_>) -> ModelBindingResult {
        if ctx.binding_source != Some(BindingSource::Body) {
            return ModelBindingResult::NoResult;
        }

        let operation = ctx.operation;
        let content_type = operation.request.content_type().map(str::to_string);

        let formatter = operation
            .input_formatters
            .iter()
            .find(|f| f.can_read(content_type.as_deref(), &ctx.metadata))
            .cloned();

        let Some(formatter) = formatter else {
            let message = format!(
                "Unsupported content type '{}'.",
                content_type.as_deref().unwrap_or("")
            );
            warn!(content_type = ?content_type, "No input formatter accepted the request");
            ctx.model_state.add_model_error(BODY_MODEL_STATE_KEY, message);
            return ModelBindingResult::Failed {
                key: BODY_MODEL_STATE_KEY.to_string(),
            };
        };

        // Snapshot the error count: a formatter that records a model error
        // without raising still fails the bind, because a partially populated
        // model must not be trusted.
        let previous_error_count = ctx.model_state.error_count();

        let read_result = {
            let mut formatter_ctx = InputFormatterContext {
                content_type: content_type.as_deref(),
                body: &operation.request.body,
                metadata: &ctx.metadata,
                model_state: &mut *ctx.model_state,
            };
            formatter.read(&mut formatter_ctx).await
        };

        match read_result {
            Ok(model) => {
                if ctx.model_state.error_count() != previous_error_count {
                    debug!("Formatter reported a model error; discarding the model");
                    return ModelBindingResult::Failed {
                        key: BODY_MODEL_STATE_KEY.to_string(),
                    };
                }

                // Track the entry so validation state exists for the model;
                // the body is not re-displayable, so no attempted value.
                ctx.model_state
                    .set_model_value(BODY_MODEL_STATE_KEY, None, None);

                let validation_node =
                    ValidationNode::new(BODY_MODEL_STATE_KEY, ctx.metadata.clone(), model.clone())
                        .validating_all_properties(true);

                ModelBindingResult::Success {
                    key: BODY_MODEL_STATE_KEY.to_string(),
                    value: model,
                    is_model_set: true,
                    validation_node: Some(validation_node),
                }
            }
            Err(e) => {
                // A deserialization failure becomes a validation failure, not
                // a crashed invocation.
                warn!(error = %e, "Body formatter failed");
                ctx.model_state
                    .add_model_error(BODY_MODEL_STATE_KEY, e.to_string());
                ModelBindingResult::Failed {
                    key: BODY_MODEL_STATE_KEY.to_string(),
                }
            }
        }
    }
}
