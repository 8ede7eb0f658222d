//! # Observability & Tracing
//!
//! Structured logging for the whole engine, built on the `tracing` crate.
//!
//! ## What Gets Traced
//!
//! - **Pipeline stages**: short-circuits, cancellations, and the final status
//! - **Binding**: per-key bind outcomes, conversion failures, formatter errors
//! - **Invocations**: one span per [`crate::invoker::ActionInvoker::invoke`]
//!   call carrying the action name
//!
//! ## Configuration
//!
//! Log verbosity is controlled via the `RUST_LOG` environment variable:
//!
//! ```bash
//! # Stage-level events only
//! RUST_LOG=info cargo run
//!
//! # Per-key binding detail
//! RUST_LOG=debug cargo run
//!
//! # Filter to this crate
//! RUST_LOG=minimvc=debug cargo run
//! ```
//!
//! The compact format hides module paths (`with_target(false)`); events carry
//! an `action` or `key` field instead, which keeps log lines short while still
//! providing rich structured data.

/// Initializes the tracing subscriber with environment-based filtering.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
