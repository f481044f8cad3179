//! How the controller reaches the evaluate endpoint.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

/// Issues one evaluation request and returns the raw response body.
///
/// Any failure (connection error, non-2xx status, unreadable body) is an
/// `Err`; the controller does not distinguish between them.
pub trait Transport: Send + Sync {
    fn evaluate(&self, question: &str) -> Result<String>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn evaluate(&self, question: &str) -> Result<String> {
        (**self).evaluate(question)
    }
}

/// `POST {endpoint}` with `{"question": ...}` over HTTP.
#[derive(Debug)]
pub struct HttpTransport {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    /// Build a transport for `endpoint`. A zero `timeout` waits forever.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        Self {
            endpoint: endpoint.into(),
            agent: builder.build(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    fn evaluate(&self, question: &str) -> Result<String> {
        let resp = self
            .agent
            .post(&self.endpoint)
            .send_json(serde_json::json!({ "question": question }))
            .with_context(|| format!("POST {} failed", self.endpoint))?;

        resp.into_string()
            .context("failed to read evaluation response body")
    }
}
