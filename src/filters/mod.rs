//! # Filters
//!
//! Cross-cutting hooks that run around an action invocation in a fixed stage
//! protocol: Authorization → Resource(executing) → model binding →
//! Action(executing) → the action → Action(executed) → Result(executing) →
//! result execution → Result(executed) → Resource(executed).
//!
//! ## Key Types
//!
//! - Capability traits: [`AuthorizationFilter`], [`ResourceFilter`],
//!   [`ActionFilter`], [`ResultFilter`], one async operation per hook; the
//!   executor treats every call as a suspension point.
//! - [`FilterKind`] / [`FilterEntry`]: the closed capability set with its
//!   declared ordering, built explicitly at registration time. There is no
//!   attribute scanning or runtime discovery.
//! - [`FilterPipeline`]: the stage executor (see [`pipeline`]).
//!
//! # Architecture Note
//! Within a stage, filters run in ascending declared `order`, ties broken by
//! registration order (stable sort). The paired "executed" stage runs in
//! descending order: the filter that ran first on the way in runs last on the
//! way out, mirroring a nested scope that unwinds. Filters express expected
//! failure by setting a `result` on their context, never by panicking.

pub mod authorize;
pub mod context;
pub mod pipeline;

pub use authorize::RequireHeaderFilter;
pub use context::{
    ActionArguments, ActionContext, ActionExecutedContext, ActionExecutingContext,
    AuthorizationContext, ResourceExecutedContext, ResourceExecutingContext,
    ResultExecutedContext, ResultExecutingContext,
};
pub use pipeline::{ActionHandler, BindingStep, FilterPipeline, PipelineError};

use async_trait::async_trait;
use std::sync::Arc;

/// Decides whether the request may proceed at all. Deny by setting
/// `ctx.result`; honor `ctx.has_allow_anonymous()` before denying.
#[async_trait]
pub trait AuthorizationFilter: Send + Sync {
    async fn on_authorization(&self, ctx: &mut AuthorizationContext<'_>);
}

/// Wraps the whole invocation, outermost scope: runs before model binding and
/// unwinds after everything else.
#[async_trait]
pub trait ResourceFilter: Send + Sync {
    async fn on_resource_executing(&self, ctx: &mut ResourceExecutingContext<'_>);

    async fn on_resource_executed(&self, ctx: &mut ResourceExecutedContext<'_>) {
        let _ = ctx;
    }
}

/// Wraps the action call itself, after arguments are bound.
#[async_trait]
pub trait ActionFilter: Send + Sync {
    async fn on_action_executing(&self, ctx: &mut ActionExecutingContext<'_>);

    async fn on_action_executed(&self, ctx: &mut ActionExecutedContext<'_>) {
        let _ = ctx;
    }
}

/// Wraps result execution.
#[async_trait]
pub trait ResultFilter: Send + Sync {
    async fn on_result_executing(&self, ctx: &mut ResultExecutingContext<'_>);

    async fn on_result_executed(&self, ctx: &mut ResultExecutedContext<'_>) {
        let _ = ctx;
    }
}

/// The closed set of filter capabilities.
#[derive(Clone)]
pub enum FilterKind {
    Authorization(Arc<dyn AuthorizationFilter>),
    Resource(Arc<dyn ResourceFilter>),
    Action(Arc<dyn ActionFilter>),
    Result(Arc<dyn ResultFilter>),
    /// Structural marker: authorization filters that see this in the list
    /// skip their own check.
    AllowAnonymous,
}

/// One registered filter with its declared stage order.
#[derive(Clone)]
pub struct FilterEntry {
    pub order: i32,
    pub kind: FilterKind,
}

impl FilterEntry {
    pub fn new(order: i32, kind: FilterKind) -> Self {
        Self { order, kind }
    }

    pub fn authorization(order: i32, filter: Arc<dyn AuthorizationFilter>) -> Self {
        Self::new(order, FilterKind::Authorization(filter))
    }

    pub fn resource(order: i32, filter: Arc<dyn ResourceFilter>) -> Self {
        Self::new(order, FilterKind::Resource(filter))
    }

    pub fn action(order: i32, filter: Arc<dyn ActionFilter>) -> Self {
        Self::new(order, FilterKind::Action(filter))
    }

    pub fn result(order: i32, filter: Arc<dyn ResultFilter>) -> Self {
        Self::new(order, FilterKind::Result(filter))
    }

    pub fn allow_anonymous() -> Self {
        Self::new(0, FilterKind::AllowAnonymous)
    }
}

/// Whether an `AllowAnonymous` marker appears in `filters`.
pub fn has_allow_anonymous(filters: &[FilterEntry]) -> bool {
    filters
        .iter()
        .any(|e| matches!(e.kind, FilterKind::AllowAnonymous))
}

fn ordered<T: Clone>(
    filters: &[FilterEntry],
    mut select: impl FnMut(&FilterKind) -> Option<T>,
) -> Vec<T> {
    let mut stage: Vec<(i32, T)> = filters
        .iter()
        .filter_map(|e| select(&e.kind).map(|f| (e.order, f)))
        .collect();
    // Stable: registration order breaks ties.
    stage.sort_by_key(|(order, _)| *order);
    stage.into_iter().map(|(_, f)| f).collect()
}

/// Authorization filters in ascending stage order.
pub(crate) fn authorization_stage(filters: &[FilterEntry]) -> Vec<Arc<dyn AuthorizationFilter>> {
    ordered(filters, |k| match k {
        FilterKind::Authorization(f) => Some(f.clone()),
        _ => None,
    })
}

pub(crate) fn resource_stage(filters: &[FilterEntry]) -> Vec<Arc<dyn ResourceFilter>> {
    ordered(filters, |k| match k {
        FilterKind::Resource(f) => Some(f.clone()),
        _ => None,
    })
}

pub(crate) fn action_stage(filters: &[FilterEntry]) -> Vec<Arc<dyn ActionFilter>> {
    ordered(filters, |k| match k {
        FilterKind::Action(f) => Some(f.clone()),
        _ => None,
    })
}

pub(crate) fn result_stage(filters: &[FilterEntry]) -> Vec<Arc<dyn ResultFilter>> {
    ordered(filters, |k| match k {
        FilterKind::Result(f) => Some(f.clone()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ActionResult;

    struct Deny;

    #[async_trait]
    impl AuthorizationFilter for Deny {
        async fn on_authorization(&self, ctx: &mut AuthorizationContext<'_>) {
            ctx.result = Some(ActionResult::Status(401));
        }
    }

    #[test]
    fn stage_sort_is_stable_for_equal_orders() {
        let a: Arc<dyn AuthorizationFilter> = Arc::new(Deny);
        let b: Arc<dyn AuthorizationFilter> = Arc::new(Deny);
        let c: Arc<dyn AuthorizationFilter> = Arc::new(Deny);
        let entries = vec![
            FilterEntry::authorization(1, a.clone()),
            FilterEntry::authorization(0, b.clone()),
            FilterEntry::authorization(1, c.clone()),
        ];
        let stage = authorization_stage(&entries);
        assert!(Arc::ptr_eq(&stage[0], &b));
        assert!(Arc::ptr_eq(&stage[1], &a));
        assert!(Arc::ptr_eq(&stage[2], &c));
    }

    #[test]
    fn allow_anonymous_is_detected_structurally() {
        let entries = vec![FilterEntry::allow_anonymous()];
        assert!(has_allow_anonymous(&entries));
        assert!(!has_allow_anonymous(&[]));
    }
}
