//! Outbound operation descriptors and their outcomes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// An opaque descriptor of one outbound async request.
///
/// Carries destination and inputs only, no business logic. The query is kept
/// structured so the submitting I/O layer owns the encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Correlation id used by `resume`.
    pub id: Uuid,
    /// Destination URL without query string.
    pub url: String,
    /// Ordered query parameters.
    pub query: Vec<(String, String)>,
    /// Additional request headers.
    pub headers: HashMap<String, String>,
}

impl Operation {
    /// Creates a GET-style operation for a URL.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            query: Vec::new(),
            headers: HashMap::new(),
        }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Adds a request header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// The response delivered by the I/O layer for a completed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResponse {
    /// Status code as reported by the transport.
    pub status: u16,
    /// Raw response body.
    pub body: String,
    /// The URL the response came from, for diagnostics.
    pub url: String,
}

impl OperationResponse {
    /// Creates a 200 response, mostly useful in tests and mocks.
    #[must_use]
    pub fn ok(body: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            url: url.into(),
        }
    }

    /// Returns true for success status codes.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The terminal outcome of one operation, reported exactly once.
///
/// The engine treats a `Failure` uniformly whether it was caused by a
/// timeout, a transport error or a cancelled request; classifying
/// non-success statuses on `Success` responses is the engine's job so every
/// submitter gets the same semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OperationOutcome {
    /// The operation completed and produced a response.
    Success(OperationResponse),
    /// The operation failed before producing a response.
    Failure(String),
}
