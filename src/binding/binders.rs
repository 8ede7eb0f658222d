//! Value-provider-backed binders: scalar conversion and recursive object
//! assembly.

use super::{
    bind_model, ModelBinder, ModelBindingContext, ModelBindingResult, TypeHint, ValidationNode,
};
use crate::value_provider::ValueProvider;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Binds scalar targets (string, integer, float, boolean) by looking the key
/// up in the eligible value providers and converting the submitted string.
///
/// Declines when the target is not scalar, when the source is greedy, or when
/// no provider holds the key. Conversion failure records the attempted value
/// and a model error, and stops the chain.
pub struct SimpleTypeModelBinder;

#[async_trait]
impl ModelBinder for SimpleTypeModelBinder {
    async fn bind(&self, ctx: &mut ModelBindingContext<'_>) -> ModelBindingResult {
        if !ctx.metadata.type_hint.is_simple() {
            return ModelBindingResult::NoResult;
        }
        if matches!(ctx.binding_source, Some(s) if s.is_greedy()) {
            return ModelBindingResult::NoResult;
        }

        let key = ctx.model_name.clone();
        let Some(result) = ctx.eligible_providers().get_value(&key) else {
            return ModelBindingResult::NoResult;
        };

        // Record what arrived before converting, so a failed conversion still
        // re-displays the submitted text.
        ctx.model_state.set_model_value(
            &key,
            Some(result.raw_value.clone()),
            result.attempted_value.clone(),
        );

        let attempted = result.attempted_value.unwrap_or_default();
        match convert(&attempted, ctx.metadata.type_hint) {
            Ok(value) => {
                let node = ValidationNode::new(&key, ctx.metadata.clone(), value.clone());
                ModelBindingResult::Success {
                    key,
                    value,
                    is_model_set: true,
                    validation_node: Some(node),
                }
            }
            Err(()) => {
                debug!(%key, %attempted, "Conversion failed");
                let message = format!("The value '{attempted}' is not valid for {key}.");
                ctx.model_state.add_model_error(&key, message);
                ModelBindingResult::Failed { key }
            }
        }
    }
}

fn convert(attempted: &str, hint: TypeHint) -> Result<Value, ()> {
    match hint {
        TypeHint::String => Ok(Value::String(attempted.to_string())),
        TypeHint::Integer => attempted
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(drop),
        TypeHint::Float => {
            let parsed = attempted.trim().parse::<f64>().map_err(drop)?;
            serde_json::Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or(())
        }
        TypeHint::Boolean => match attempted.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "on" => Ok(Value::Bool(true)),
            "false" | "0" | "off" => Ok(Value::Bool(false)),
            _ => Err(()),
        },
        TypeHint::Object => Err(()),
    }
}

/// Binds object targets from value providers by recursively binding each
/// declared property through the chain with an extended key prefix
/// (`order.total`, `order.items[0]`, ...).
///
/// Declines when no provider contains the target's prefix, so an absent
/// object stays absent instead of materializing empty. Properties that no
/// binder can produce are simply left off the assembled object; requiredness
/// is the validation walk's business.
pub struct ComplexTypeModelBinder;

#[async_trait]
impl ModelBinder for ComplexTypeModelBinder {
    async fn bind(&self, ctx: &mut ModelBindingContext<'_>) -> ModelBindingResult {
        if ctx.metadata.type_hint != TypeHint::Object {
            return ModelBindingResult::NoResult;
        }
        if matches!(ctx.binding_source, Some(s) if s.is_greedy()) {
            return ModelBindingResult::NoResult;
        }
        if !ctx.model_name.is_empty() && !ctx.eligible_providers().contains_prefix(&ctx.model_name)
        {
            return ModelBindingResult::NoResult;
        }

        let properties = ctx.metadata.properties.clone();
        let mut object = serde_json::Map::new();
        let mut children = Vec::new();

        for property in &properties {
            let mut child = ctx.child(&property.name, property.metadata.clone());
            match bind_model(&mut child).await {
                // Every binder declined the property. Absence of a required
                // property is a model error under the extended key, the same
                // convention the invoker applies to top-level parameters.
                ModelBindingResult::NoResult => {
                    if property.metadata.is_required() {
                        let key = child.model_name.clone();
                        child
                            .model_state
                            .add_model_error(&key, format!("A value for '{key}' is required."));
                    }
                }
                // Property errors are already in ModelState; the property
                // stays absent and binding of siblings continues.
                ModelBindingResult::Failed { .. } => {}
                ModelBindingResult::Success {
                    value,
                    is_model_set,
                    validation_node,
                    ..
                } => {
                    if is_model_set {
                        object.insert(property.name.clone(), value);
                    }
                    if let Some(node) = validation_node {
                        children.push(node);
                    }
                }
            }
        }

        let key = ctx.model_name.clone();
        debug!(%key, properties = object.len(), "Assembled object");
        let model = Value::Object(object);
        let node = ValidationNode::new(&key, ctx.metadata.clone(), model.clone())
            .with_children(children);
        ModelBindingResult::Success {
            key,
            value: model,
            is_model_set: true,
            validation_node: Some(node),
        }
    }
}
