//! # minimvc
//!
//! > **The execution core of a small MVC web framework: model binding and a
//! > filter pipeline.**
//!
//! This crate dispatches an already-routed HTTP request into an action: it
//! resolves the action's typed arguments from ambient request data (route
//! values, query string, form fields, the body), accumulates validation
//! errors instead of failing fast, and runs an ordered chain of
//! authorization/resource/action/result filters around the action with
//! short-circuit and cancellation semantics.
//!
//! Transport, routing, and view rendering are external collaborators; this
//! crate starts where a parsed [`http::Request`] exists and ends with a
//! rendered [`http::Response`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Sources ([`value_provider`])
//! Adapters exposing each ambient data source as a uniform key→value lookup
//! with prefix-containment queries, merged by an ordered composite that
//! encodes source precedence.
//! - **Key items**: [`value_provider::ValueProvider`],
//!   [`value_provider::CompositeValueProvider`],
//!   [`value_provider::BindingSource`].
//!
//! ### 2. The Binding Engine ([`binding`])
//! Pluggable strategies that turn untyped request data into typed argument
//! values: the body binder delegating to content-type-negotiated formatters,
//! the scalar converter, and the recursive object assembler. Outcomes land in
//! a per-request [`binding::ModelState`]; a [`binding::ValidationNode`] tree
//! drives post-bind validation.
//!
//! ### 3. The Pipeline ([`filters`])
//! The stage protocol around the action: authorization, resource, action,
//! and result filters with ascending-in/descending-out ordering,
//! short-circuit-then-unwind semantics, and an ambient cancellation signal.
//!
//! ### 4. The Driver ([`invoker`])
//! [`invoker::ActionInvoker`] wires it all together per request from an
//! explicit [`invoker::InvokerConfig`], with no ambient registries.
//!
//! ## 🚀 Quick Start
//!
//! ```rust
//! use minimvc::binding::ModelMetadata;
//! use minimvc::filters::{ActionArguments, ActionHandler};
//! use minimvc::http::{ActionResult, Request};
//! use minimvc::invoker::{ActionDescriptor, ActionInvoker, ParameterDescriptor};
//! use minimvc::binding::ModelState;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//!
//! struct GetWidget;
//!
//! #[async_trait]
//! impl ActionHandler for GetWidget {
//!     async fn invoke(&self, args: &ActionArguments, _state: &ModelState) -> ActionResult {
//!         ActionResult::json(&args["id"])
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let descriptor = ActionDescriptor::new("GetWidget")
//!         .with_parameter(ParameterDescriptor::new("id", ModelMetadata::integer()));
//!     let request = Request::new("GET", "/widgets/42").with_route_value("id", "42");
//!
//!     let invoker = ActionInvoker::default();
//!     let outcome = invoker
//!         .invoke(request, &descriptor, &[], &GetWidget, CancellationToken::new())
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(outcome.response.status, 200);
//!     assert!(outcome.model_state.is_valid());
//! }
//! ```
//!
//! ## Architecture Notes
//!
//! ### 1. Explicit outcomes over exceptions
//! A binder answers with a tagged [`binding::ModelBindingResult`]: declined,
//! failed (errors recorded, no fallback), or succeeded. User-code failures
//! such as a body that doesn't parse or a value that doesn't convert become
//! model state errors, never crashed invocations.
//!
//! ### 2. One suspension-point-aware operation per hook
//! Every extension point is a single `async` operation via `async_trait`;
//! the executor treats every filter and formatter call as a suspension point
//! whether or not the implementation needs to suspend.
//!
//! ### 3. Single-writer request state
//! All per-invocation structures (`ModelState`, binding contexts, stage
//! contexts) have exactly one logical writer and need no locking. Shared
//! read-mostly state (a provider's prefix index) is built once behind a
//! single-initialization guard.

pub mod binding;
pub mod filters;
pub mod http;
pub mod invoker;
pub mod runtime;
pub mod value_provider;

// Re-export the types most applications touch.
pub use binding::{ModelMetadata, ModelState, TypeHint, ValidationRule, BODY_MODEL_STATE_KEY};
pub use filters::{ActionHandler, FilterEntry, FilterKind, FilterPipeline, PipelineError};
pub use http::{ActionResult, Request, Response};
pub use invoker::{ActionDescriptor, ActionInvoker, InvokerConfig, ParameterDescriptor};
pub use value_provider::{BindingSource, CompositeValueProvider, ValueProvider};
