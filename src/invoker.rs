//! # Action Invoker
//!
//! The top-level driver for one request: compose value providers from the
//! registered factories, resolve each declared parameter through the binder
//! chain, run the validation walk over the collected validation nodes, then
//! execute the filter pipeline around the action and hand back the rendered
//! response together with the accumulated model state.
//!
//! # Architecture Note
//! Everything the invoker consults (value-provider factories, input
//! formatters, model binders) is passed in explicitly at construction
//! through [`InvokerConfig`], ordered by priority. There is no ambient
//! registry to reach into, so two invokers with different configurations can
//! coexist and a test can wire exactly the strategies it wants to observe.

use crate::binding::{
    bind_model, BodyModelBinder, ComplexTypeModelBinder, InputFormatter, JsonInputFormatter,
    ModelBinder, ModelBindingContext, ModelBindingResult, ModelMetadata, ModelState,
    OperationBindingContext, SimpleTypeModelBinder, ValidationNode,
};
use crate::filters::{
    ActionArguments, ActionContext, ActionHandler, BindingStep, FilterEntry, FilterPipeline,
    PipelineError,
};
use crate::http::{Request, Response};
use crate::value_provider::{
    compose, BindingSource, FormValueProviderFactory, QueryStringValueProviderFactory,
    RouteValueProviderFactory, ValueProviderFactory,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// One bindable action parameter: its name (the binding key prefix), its
/// declared shape, and an optional source restriction.
#[derive(Clone)]
pub struct ParameterDescriptor {
    pub name: String,
    pub metadata: ModelMetadata,
    pub source: Option<BindingSource>,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, metadata: ModelMetadata) -> Self {
        Self {
            name: name.into(),
            metadata,
            source: None,
        }
    }

    pub fn from_source(mut self, source: BindingSource) -> Self {
        self.source = Some(source);
        self
    }
}

/// A registered action: a name for diagnostics and the parameters to bind.
#[derive(Clone)]
pub struct ActionDescriptor {
    pub name: String,
    pub parameters: Vec<ParameterDescriptor>,
}

impl ActionDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// Explicit invoker configuration: the registered strategies, each list in
/// priority order.
pub struct InvokerConfig {
    pub value_provider_factories: Vec<Arc<dyn ValueProviderFactory>>,
    pub input_formatters: Vec<Arc<dyn InputFormatter>>,
    pub binders: Vec<Arc<dyn ModelBinder>>,
}

impl Default for InvokerConfig {
    /// Route values before query string before form (source precedence), a
    /// JSON body formatter, and the body → simple → complex binder chain.
    fn default() -> Self {
        Self {
            value_provider_factories: vec![
                Arc::new(RouteValueProviderFactory),
                Arc::new(QueryStringValueProviderFactory),
                Arc::new(FormValueProviderFactory),
            ],
            input_formatters: vec![Arc::new(JsonInputFormatter)],
            binders: vec![
                Arc::new(BodyModelBinder),
                Arc::new(SimpleTypeModelBinder),
                Arc::new(ComplexTypeModelBinder),
            ],
        }
    }
}

/// The outcome of one invocation: the rendered response plus the model state
/// accumulated while binding and validating.
pub struct InvocationOutcome {
    pub response: Response,
    pub model_state: ModelState,
}

/// Binds the declared parameters when the pipeline reaches its model-binding
/// stage.
struct ArgumentBinder<'a> {
    config: &'a InvokerConfig,
    request: &'a Request,
    descriptor: &'a ActionDescriptor,
}

#[async_trait]
impl BindingStep for ArgumentBinder<'_> {
    async fn bind(&self, model_state: &mut ModelState) -> ActionArguments {
        let value_provider = compose(&self.config.value_provider_factories, self.request);
        let operation = OperationBindingContext {
            request: self.request.clone(),
            value_provider,
            input_formatters: self.config.input_formatters.clone(),
            binders: self.config.binders.clone(),
        };

        let mut arguments = ActionArguments::new();
        let mut validation_nodes: Vec<ValidationNode> = Vec::new();

        for parameter in &self.descriptor.parameters {
            let mut ctx = ModelBindingContext {
                model_name: parameter.name.clone(),
                metadata: parameter.metadata.clone(),
                binding_source: parameter.source,
                model_state: &mut *model_state,
                operation: &operation,
            };
            match bind_model(&mut ctx).await {
                ModelBindingResult::NoResult => {
                    // Every binder declined. The argument stays unset; for a
                    // required target that absence is itself a model error.
                    if parameter.metadata.is_required() {
                        model_state.add_model_error(
                            &parameter.name,
                            format!("A value for '{}' is required.", parameter.name),
                        );
                    }
                }
                ModelBindingResult::Failed { key } => {
                    debug!(%key, "Binding failed; errors recorded");
                }
                ModelBindingResult::Success {
                    value,
                    is_model_set,
                    validation_node,
                    ..
                } => {
                    if is_model_set {
                        arguments.insert(parameter.name.clone(), value);
                    }
                    if let Some(node) = validation_node {
                        validation_nodes.push(node);
                    }
                }
            }
        }

        // Each node is consumed exactly once, after all arguments are bound.
        for node in &validation_nodes {
            node.validate(model_state);
        }

        arguments
    }
}

/// Resolves arguments, runs validation, and drives the filter pipeline
/// around the action.
pub struct ActionInvoker {
    config: InvokerConfig,
}

impl ActionInvoker {
    pub fn new(config: InvokerConfig) -> Self {
        Self { config }
    }

    #[instrument(skip_all, fields(action = %descriptor.name))]
    pub async fn invoke(
        &self,
        request: Request,
        descriptor: &ActionDescriptor,
        filters: &[FilterEntry],
        handler: &dyn ActionHandler,
        token: CancellationToken,
    ) -> Result<InvocationOutcome, PipelineError> {
        let action_ctx = ActionContext {
            request: request.clone(),
            action_name: descriptor.name.clone(),
        };
        let binder = ArgumentBinder {
            config: &self.config,
            request: &request,
            descriptor,
        };

        let mut model_state = ModelState::new();
        let pipeline = FilterPipeline::new(&action_ctx, filters, token);
        let response = pipeline.run(&binder, handler, &mut model_state).await?;

        Ok(InvocationOutcome {
            response,
            model_state,
        })
    }
}

impl Default for ActionInvoker {
    fn default() -> Self {
        Self::new(InvokerConfig::default())
    }
}
