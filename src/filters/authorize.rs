//! Built-in authorization filter.
//!
//! The smallest useful denial policy: require a named request header. It also
//! serves as the reference for writing [`AuthorizationFilter`]s, showing the
//! contract every authorization filter honors: consult
//! `has_allow_anonymous()` before denying, and deny by setting a result
//! rather than by failing.

use super::{AuthorizationContext, AuthorizationFilter};
use crate::http::ActionResult;
use async_trait::async_trait;
use tracing::debug;

/// Denies with `401` unless the request carries the named header.
///
/// An `AllowAnonymous` marker among the invocation's filters disarms the
/// check entirely.
pub struct RequireHeaderFilter {
    header: String,
}

impl RequireHeaderFilter {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }

    /// Requires the `Authorization` header.
    pub fn authorization() -> Self {
        Self::new("authorization")
    }
}

#[async_trait]
impl AuthorizationFilter for RequireHeaderFilter {
    async fn on_authorization(&self, ctx: &mut AuthorizationContext<'_>) {
        if ctx.has_allow_anonymous() {
            debug!(header = %self.header, "Anonymous access allowed; skipping check");
            return;
        }
        if ctx.action.request.header(&self.header).is_none() {
            debug!(header = %self.header, "Required header absent; denying");
            ctx.result = Some(ActionResult::Status(401));
        }
    }
}
