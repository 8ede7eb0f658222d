//! Per-stage filter contexts.
//!
//! Instead of a deep context inheritance chain, each stage gets a flat struct
//! embedding the same ambient [`ActionContext`] by reference plus the mutable
//! fields that stage owns (`result`, `cancel`, `arguments`). The executor
//! creates one context per stage and threads the evolving result forward;
//! filters mutate the context they receive but never outlive the invocation.

use super::{has_allow_anonymous, FilterEntry};
use crate::http::{ActionResult, Request};
use serde_json::Value;
use std::collections::HashMap;

/// The action's bound arguments, by parameter name. Executing-stage action
/// filters may add, replace, or remove entries before the action runs.
pub type ActionArguments = HashMap<String, Value>;

/// Ambient invocation state every stage context sees.
#[derive(Clone, Debug)]
pub struct ActionContext {
    pub request: Request,
    pub action_name: String,
}

macro_rules! common_accessors {
    () => {
        /// The ordered filter list applicable to this invocation.
        pub fn filters(&self) -> &[FilterEntry] {
            self.filters
        }

        /// Whether an `AllowAnonymous` marker appears among the applicable
        /// filters. Authorization filters consult this and skip their own
        /// check when it holds; anonymous-access opt-out is structural.
        pub fn has_allow_anonymous(&self) -> bool {
            has_allow_anonymous(self.filters)
        }
    };
}

/// Context for the authorization stage. Setting `result` denies the request
/// and short-circuits the rest of the pipeline.
pub struct AuthorizationContext<'a> {
    pub action: &'a ActionContext,
    filters: &'a [FilterEntry],
    pub result: Option<ActionResult>,
}

impl<'a> AuthorizationContext<'a> {
    pub fn new(action: &'a ActionContext, filters: &'a [FilterEntry]) -> Self {
        Self {
            action,
            filters,
            result: None,
        }
    }

    common_accessors!();
}

/// Context for resource filters on the way in.
pub struct ResourceExecutingContext<'a> {
    pub action: &'a ActionContext,
    filters: &'a [FilterEntry],
    pub result: Option<ActionResult>,
}

impl<'a> ResourceExecutingContext<'a> {
    pub fn new(action: &'a ActionContext, filters: &'a [FilterEntry]) -> Self {
        Self {
            action,
            filters,
            result: None,
        }
    }

    common_accessors!();
}

/// Context for resource filters on the way out (unwind).
pub struct ResourceExecutedContext<'a> {
    pub action: &'a ActionContext,
    filters: &'a [FilterEntry],
    /// The result the invocation produced, if it got that far.
    pub result: Option<&'a ActionResult>,
}

impl<'a> ResourceExecutedContext<'a> {
    pub fn new(
        action: &'a ActionContext,
        filters: &'a [FilterEntry],
        result: Option<&'a ActionResult>,
    ) -> Self {
        Self {
            action,
            filters,
            result,
        }
    }

    common_accessors!();
}

/// Context for action filters before the action runs. Filters may rewrite the
/// bound arguments or set `result` to skip the action entirely.
pub struct ActionExecutingContext<'a> {
    pub action: &'a ActionContext,
    filters: &'a [FilterEntry],
    pub arguments: &'a mut ActionArguments,
    pub result: Option<ActionResult>,
}

impl<'a> ActionExecutingContext<'a> {
    pub fn new(
        action: &'a ActionContext,
        filters: &'a [FilterEntry],
        arguments: &'a mut ActionArguments,
    ) -> Self {
        Self {
            action,
            filters,
            arguments,
            result: None,
        }
    }

    common_accessors!();
}

/// Context for action filters after the action (or its short-circuit).
pub struct ActionExecutedContext<'a> {
    pub action: &'a ActionContext,
    filters: &'a [FilterEntry],
    /// True when an executing-stage filter short-circuited the action.
    pub canceled: bool,
    /// The action's result; a filter may replace it. The executor enters the
    /// stage with `Some`; a filter that clears it discards the result, and
    /// the pipeline substitutes an empty `200`.
    pub result: Option<ActionResult>,
}

impl<'a> ActionExecutedContext<'a> {
    pub fn new(
        action: &'a ActionContext,
        filters: &'a [FilterEntry],
        canceled: bool,
        result: Option<ActionResult>,
    ) -> Self {
        Self {
            action,
            filters,
            canceled,
            result,
        }
    }

    common_accessors!();
}

/// Context for result filters before result execution. `cancel` suppresses
/// the result-writing step while still letting the executed stage run.
pub struct ResultExecutingContext<'a> {
    pub action: &'a ActionContext,
    filters: &'a [FilterEntry],
    pub result: ActionResult,
    pub cancel: bool,
}

impl<'a> ResultExecutingContext<'a> {
    pub fn new(action: &'a ActionContext, filters: &'a [FilterEntry], result: ActionResult) -> Self {
        Self {
            action,
            filters,
            result,
            cancel: false,
        }
    }

    common_accessors!();
}

/// Context for result filters after result execution.
pub struct ResultExecutedContext<'a> {
    pub action: &'a ActionContext,
    filters: &'a [FilterEntry],
    pub result: &'a ActionResult,
    /// True when result execution was canceled.
    pub canceled: bool,
}

impl<'a> ResultExecutedContext<'a> {
    pub fn new(
        action: &'a ActionContext,
        filters: &'a [FilterEntry],
        result: &'a ActionResult,
        canceled: bool,
    ) -> Self {
        Self {
            action,
            filters,
            result,
            canceled,
        }
    }

    common_accessors!();
}
