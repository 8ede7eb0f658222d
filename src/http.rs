//! # HTTP Surfaces
//!
//! This module defines the request/response shapes the engine consumes and
//! produces. Transport and hosting live elsewhere: by the time a [`Request`]
//! reaches the engine, the route has been matched, the query string and any
//! form body have been parsed into maps, and the raw body bytes have been
//! buffered.
//!
//! ## Key Types
//!
//! - [`Request`]: the parsed inbound request (route values, query, form, body).
//! - [`ActionResult`]: the closed set of results an action or filter can
//!   produce.
//! - [`Response`]: the sink that result execution writes into, exactly once.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// A parsed inbound HTTP request.
///
/// # Architecture Note
/// The engine never touches sockets or wire parsing. Everything it needs is
/// pre-digested into string maps plus buffered body bytes, so tests can build
/// requests directly with [`Request::new`] and the builder methods.
#[derive(Clone, Debug)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    /// Values captured by route matching (e.g. `{id}` segments).
    pub route_values: HashMap<String, String>,
    /// Decoded query string; a key may carry multiple values.
    pub query: HashMap<String, Vec<String>>,
    /// Decoded form body; empty unless the request carried a form.
    pub form: HashMap<String, Vec<String>>,
    /// Raw request body bytes, already buffered by the host.
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
            route_values: HashMap::new(),
            query: HashMap::new(),
            form: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_route_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.route_values.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(key.into()).or_default().push(value.into());
        self
    }

    pub fn with_form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.entry(key.into()).or_default().push(value.into());
        self
    }

    pub fn with_body(mut self, content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.headers
            .insert("content-type".to_string(), content_type.into());
        self.body = body.into();
        self
    }

    /// The `Content-Type` header, if any. Header names are stored lowercased.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }

    /// Whether the body is a URL-encoded or multipart form.
    pub fn has_form_content_type(&self) -> bool {
        matches!(
            self.content_type(),
            Some(ct) if ct.starts_with("application/x-www-form-urlencoded")
                || ct.starts_with("multipart/form-data")
        )
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// The closed set of results an action or filter can produce.
///
/// Filters short-circuit a request by placing one of these on their stage
/// context; result execution renders it into the [`Response`].
#[derive(Clone, Debug, PartialEq)]
pub enum ActionResult {
    /// A bare status code (e.g. `401`, `404`).
    Status(u16),
    /// A text body with an explicit content type.
    Content {
        status: u16,
        content_type: String,
        body: String,
    },
    /// A JSON payload.
    Json { status: u16, value: Value },
}

impl ActionResult {
    /// Serializes `payload` into a `200 application/json` result.
    pub fn json<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => Self::Json { status: 200, value },
            // Serialization of a handler's own type failing is a programming
            // error in the handler; surface it as a 500 rather than panicking.
            Err(e) => Self::Content {
                status: 500,
                content_type: "text/plain".to_string(),
                body: format!("serialization failed: {e}"),
            },
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::Content {
            status,
            content_type: "text/plain".to_string(),
            body: body.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Status(status) => *status,
            Self::Content { status, .. } => *status,
            Self::Json { status, .. } => *status,
        }
    }
}

/// The response sink result execution writes into.
///
/// `written` distinguishes "nothing rendered yet" from "rendered an empty
/// body", which matters when a result filter cancels result execution.
#[derive(Clone, Debug, Default)]
pub struct Response {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub written: bool,
}

impl Response {
    /// Renders `result` into this response. Result execution happens at most
    /// once per invocation; the pipeline enforces that.
    pub fn write(&mut self, result: &ActionResult) {
        match result {
            ActionResult::Status(status) => {
                self.status = *status;
            }
            ActionResult::Content {
                status,
                content_type,
                body,
            } => {
                self.status = *status;
                self.content_type = Some(content_type.clone());
                self.body = body.clone().into_bytes();
            }
            ActionResult::Json { status, value } => {
                self.status = *status;
                self.content_type = Some("application/json".to_string());
                self.body = value.to_string().into_bytes();
            }
        }
        self.written = true;
    }
}
