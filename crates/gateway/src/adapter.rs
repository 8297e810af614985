// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion service adapter boundary.
//!
//! Everything behind this trait is untrusted: responses are validated by
//! the gateway before anything downstream sees them, and malformed output
//! never propagates past it.

use crate::stub;
use async_trait::async_trait;
use mend_core::{CompletionRequest, Role};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("completion request failed: {0}")]
    Request(String),
    #[error("completion service unavailable: {0}")]
    Unavailable(String),
}

/// A single call to the external completion service.
#[async_trait]
pub trait CompletionAdapter: Send + Sync + 'static {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AdapterError>;

    /// Adapter name for logging.
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T: CompletionAdapter> CompletionAdapter for std::sync::Arc<T> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AdapterError> {
        (**self).complete(request).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Deterministic adapter producing the canned per-template responses.
///
/// The default when no API key is configured; also what makes the whole
/// pipeline runnable offline and in tests.
#[derive(Debug, Clone, Default)]
pub struct StubAdapter;

#[async_trait]
impl CompletionAdapter for StubAdapter {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AdapterError> {
        let template = stub::template_from_context(&request.context);
        Ok(match request.role {
            Role::Planner => stub::plan_response(template),
            Role::Coder => stub::patch_response(template),
            Role::Tester => stub::report_response(&request.context),
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Scripted adapter for tests: queued responses per role, with a call log.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeAdapter {
    responses: parking_lot::Mutex<
        std::collections::HashMap<Role, std::collections::VecDeque<Result<String, AdapterError>>>,
    >,
    calls: parking_lot::Mutex<Vec<CompletionRequest>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeAdapter {
    pub fn new() -> Self {
        Self {
            responses: parking_lot::Mutex::new(std::collections::HashMap::new()),
            calls: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Queue the next response for `role`.
    pub fn push(&self, role: Role, response: Result<String, AdapterError>) {
        self.responses.lock().entry(role).or_default().push_back(response);
    }

    /// Requests seen so far.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, role: Role) -> usize {
        self.calls.lock().iter().filter(|c| c.role == role).count()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for FakeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl CompletionAdapter for FakeAdapter {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AdapterError> {
        self.calls.lock().push(request.clone());
        let queued = self.responses.lock().get_mut(&request.role).and_then(|q| q.pop_front());
        match queued {
            Some(response) => response,
            // Out of scripted responses: behave like an unreachable service
            None => Err(AdapterError::Unavailable("no scripted response".to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
