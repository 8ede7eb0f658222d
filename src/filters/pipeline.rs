//! # Filter Pipeline Executor
//!
//! Drives the stage protocol around one action invocation. The executor owns
//! the stage ordering guarantees filter authors rely on:
//!
//! 1. `Authorization` (ascending)
//! 2. `Resource` executing (ascending)
//! 3. Model binding
//! 4. `Action` executing (ascending)
//! 5. The action itself
//! 6. `Action` executed (descending)
//! 7. `Result` executing (ascending)
//! 8. Result execution (the response write)
//! 9. `Result` executed (descending)
//! 10. `Resource` executed (descending)
//!
//! A filter that sets a `result` on its executing-stage context
//! short-circuits: downstream normal-path stages are skipped in favor of
//! rendering that result, and the paired "executed" stages still run so
//! cleanup filters observe the short-circuit. A fired cancellation token
//! abandons the remaining stages instead of continuing to write to a
//! disconnected response.

use super::context::{
    ActionArguments, ActionContext, ActionExecutedContext, ActionExecutingContext,
    AuthorizationContext, ResourceExecutedContext, ResourceExecutingContext,
    ResultExecutedContext, ResultExecutingContext,
};
use super::{
    action_stage, authorization_stage, resource_stage, result_stage, FilterEntry, ResourceFilter,
};
use crate::binding::ModelState;
use crate::http::{ActionResult, Response};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Failures of the pipeline itself. Expected per-request failures (denied
/// authorization, bad input) travel as results and model state, not errors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The ambient cancellation signal fired; the request was aborted.
    #[error("request aborted")]
    Cancelled,
}

/// The model-binding stage, supplied by the invoker. Runs after resource
/// filters so a resource short-circuit skips binding entirely.
#[async_trait]
pub trait BindingStep: Send + Sync {
    async fn bind(&self, model_state: &mut ModelState) -> ActionArguments;
}

/// The action itself. Binding failures do not abort the invocation; the
/// handler is expected to consult `model_state.is_valid()` and decide.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn invoke(&self, arguments: &ActionArguments, model_state: &ModelState) -> ActionResult;
}

/// Executes the stage protocol for one invocation.
pub struct FilterPipeline<'a> {
    action: &'a ActionContext,
    filters: &'a [FilterEntry],
    token: CancellationToken,
}

impl<'a> FilterPipeline<'a> {
    pub fn new(
        action: &'a ActionContext,
        filters: &'a [FilterEntry],
        token: CancellationToken,
    ) -> Self {
        Self {
            action,
            filters,
            token,
        }
    }

    /// Runs the full protocol and returns the rendered response.
    pub async fn run(
        &self,
        binding: &dyn BindingStep,
        handler: &dyn ActionHandler,
        model_state: &mut ModelState,
    ) -> Result<Response, PipelineError> {
        let mut response = Response::default();
        debug!(action = %self.action.action_name, "Pipeline started");

        // --- Authorization ---
        self.ensure_not_cancelled()?;
        let auth_result = {
            let mut ctx = AuthorizationContext::new(self.action, self.filters);
            for filter in &authorization_stage(self.filters) {
                filter.on_authorization(&mut ctx).await;
                if ctx.result.is_some() {
                    break;
                }
            }
            ctx.result.take()
        };
        if let Some(result) = auth_result {
            info!(
                action = %self.action.action_name,
                status = result.status_code(),
                "Authorization short-circuit"
            );
            // No resource filter ran, so nothing unwinds; the result-executed
            // stage still observes the short-circuited result.
            self.render_short_circuit(&result, &mut response).await;
            return Ok(response);
        }

        // --- Resource executing ---
        self.ensure_not_cancelled()?;
        let resources = resource_stage(self.filters);
        let resource_result = {
            let mut ctx = ResourceExecutingContext::new(self.action, self.filters);
            for filter in &resources {
                filter.on_resource_executing(&mut ctx).await;
                if ctx.result.is_some() {
                    break;
                }
            }
            ctx.result.take()
        };
        if let Some(result) = resource_result {
            info!(
                action = %self.action.action_name,
                status = result.status_code(),
                "Resource filter short-circuit"
            );
            self.render_short_circuit(&result, &mut response).await;
            self.unwind_resources(&resources, Some(&result)).await;
            return Ok(response);
        }

        // --- Model binding ---
        self.ensure_not_cancelled()?;
        let mut arguments = binding.bind(model_state).await;
        debug!(
            action = %self.action.action_name,
            arguments = arguments.len(),
            errors = model_state.error_count(),
            "Arguments bound"
        );

        // --- Action executing / action / action executed ---
        self.ensure_not_cancelled()?;
        let actions = action_stage(self.filters);
        let short_circuit = {
            let mut ctx = ActionExecutingContext::new(self.action, self.filters, &mut arguments);
            for filter in &actions {
                filter.on_action_executing(&mut ctx).await;
                if ctx.result.is_some() {
                    break;
                }
            }
            ctx.result.take()
        };

        let (canceled, result) = match short_circuit {
            Some(result) => {
                debug!(action = %self.action.action_name, "Action short-circuit");
                (true, result)
            }
            None => {
                let result = handler.invoke(&arguments, model_state).await;
                (false, result)
            }
        };

        // The executed stage runs even when executing short-circuited, so
        // filters can reliably release resources; it may replace the result.
        // A filter that clears the result discards it, and the request falls
        // through to an empty 200.
        let result = {
            let mut ctx =
                ActionExecutedContext::new(self.action, self.filters, canceled, Some(result));
            for filter in actions.iter().rev() {
                filter.on_action_executed(&mut ctx).await;
            }
            ctx.result.take().unwrap_or(ActionResult::Status(200))
        };

        // --- Result stage and resource unwind ---
        self.ensure_not_cancelled()?;
        let final_result = self.run_result_stage(result, &mut response).await;
        self.unwind_resources(&resources, Some(&final_result)).await;

        debug!(action = %self.action.action_name, status = response.status, "Pipeline finished");
        Ok(response)
    }

    /// The full result stage: executing ascending (stops at `cancel`), the
    /// response write unless canceled, executed descending.
    async fn run_result_stage(
        &self,
        result: ActionResult,
        response: &mut Response,
    ) -> ActionResult {
        let stage = result_stage(self.filters);

        let mut ctx = ResultExecutingContext::new(self.action, self.filters, result);
        for filter in &stage {
            filter.on_result_executing(&mut ctx).await;
            if ctx.cancel {
                break;
            }
        }
        let canceled = ctx.cancel;
        let final_result = ctx.result;

        if canceled {
            debug!(action = %self.action.action_name, "Result execution canceled");
        } else {
            response.write(&final_result);
        }

        let mut executed =
            ResultExecutedContext::new(self.action, self.filters, &final_result, canceled);
        for filter in stage.iter().rev() {
            filter.on_result_executed(&mut executed).await;
        }

        final_result
    }

    /// Renders a filter-supplied result and runs only the result-executed
    /// stage: the executing stage belongs to the normal path that was skipped.
    async fn render_short_circuit(&self, result: &ActionResult, response: &mut Response) {
        response.write(result);
        let stage = result_stage(self.filters);
        let mut executed = ResultExecutedContext::new(self.action, self.filters, result, false);
        for filter in stage.iter().rev() {
            filter.on_result_executed(&mut executed).await;
        }
    }

    async fn unwind_resources(
        &self,
        stage: &[Arc<dyn ResourceFilter>],
        result: Option<&ActionResult>,
    ) {
        let mut ctx = ResourceExecutedContext::new(self.action, self.filters, result);
        for filter in stage.iter().rev() {
            filter.on_resource_executed(&mut ctx).await;
        }
    }

    fn ensure_not_cancelled(&self) -> Result<(), PipelineError> {
        if self.token.is_cancelled() {
            warn!(action = %self.action.action_name, "Request aborted; abandoning pipeline");
            return Err(PipelineError::Cancelled);
        }
        Ok(())
    }
}
