// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mend-gateway: validated access to the external completion service.
//!
//! Every call runs the same small state machine:
//! `attempt → validate → { accept | corrective-retry | fallback }`.
//! Corrective retries quote the validation error back to the service;
//! exhaustion falls back to the deterministic stub for the role, so the
//! pipeline always makes forward progress. Timeouts count as validation
//! failures. Malformed output never propagates past this crate.

pub mod adapter;
pub mod http;
pub mod stub;
pub mod validate;

pub use adapter::{AdapterError, CompletionAdapter, StubAdapter};
#[cfg(any(test, feature = "test-support"))]
pub use adapter::FakeAdapter;
pub use http::HttpAdapter;

use mend_core::{
    CompletionRequest, EngineConfig, GatewayOutcome, Plan, Role, Template, TestReport,
    TestRunResult,
};
use std::time::Duration;

/// Recorded by the reliability tracker when a call fell back to the stub.
pub const FAILURE_MODE_VALIDATION_EXHAUSTED: &str = "agent_validation_exhausted";

/// Gateway call limits.
#[derive(Debug, Clone, Copy)]
pub struct GatewayConfig {
    pub timeout: Duration,
    pub max_corrective_retries: u32,
}

impl GatewayConfig {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.gateway_timeout_secs),
            max_corrective_retries: config.max_corrective_retries,
        }
    }
}

/// A validated gateway result plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply<T> {
    pub value: T,
    pub outcome: GatewayOutcome,
    /// Approximate tokens consumed across all attempts.
    pub tokens: u32,
    /// Set only on fallback.
    pub failure_mode: Option<String>,
}

/// Wraps a completion adapter with validation, bounded corrective retries,
/// and deterministic fallback.
pub struct AgentGateway<A: CompletionAdapter> {
    adapter: A,
    config: GatewayConfig,
}

impl<A: CompletionAdapter> AgentGateway<A> {
    pub fn new(adapter: A, config: GatewayConfig) -> Self {
        Self { adapter, config }
    }

    /// Ask the planner role for a plan.
    pub async fn plan(&self, template: Template, instruction: &str) -> GatewayReply<Plan> {
        let context = plan_context(template, instruction);
        self.call(Role::Planner, context, validate::plan, || {
            stub::fallback_plan(template)
        })
        .await
    }

    /// Ask the coder role for a patch. `feedback` carries the previous
    /// iteration's rejection or test failure for revision.
    pub async fn patch(
        &self,
        template: Template,
        plan: &Plan,
        feedback: Option<&str>,
    ) -> GatewayReply<String> {
        let context = patch_context(template, plan, feedback);
        self.call(Role::Coder, context, validate::patch, || {
            stub::patch_response(template)
        })
        .await
    }

    /// Ask the tester role to turn a test run into a structured report.
    pub async fn report(
        &self,
        template: Template,
        run: &TestRunResult,
    ) -> GatewayReply<TestReport> {
        let context = report_context(template, run);
        self.call(Role::Tester, context, validate::report, || {
            stub::fallback_report(run)
        })
        .await
    }

    /// The attempt state machine shared by all roles.
    async fn call<T>(
        &self,
        role: Role,
        base_context: String,
        validate: impl Fn(&str) -> Result<T, String>,
        fallback: impl FnOnce() -> T,
    ) -> GatewayReply<T> {
        let mut tokens = 0u32;
        let mut last_error: Option<String> = None;

        for attempt in 0..=self.config.max_corrective_retries {
            let context = match &last_error {
                None => base_context.clone(),
                Some(error) => format!(
                    "{}\n\nYour previous response was invalid: {}\nRespond again in the required format.",
                    base_context, error
                ),
            };
            let request = CompletionRequest { role, context };

            let outcome =
                tokio::time::timeout(self.config.timeout, self.adapter.complete(&request)).await;
            let error = match outcome {
                Ok(Ok(raw)) => {
                    tokens += approx_tokens(&raw);
                    match validate(&raw) {
                        Ok(value) => {
                            let outcome = if attempt == 0 {
                                GatewayOutcome::Direct
                            } else {
                                GatewayOutcome::CorrectiveRetry { attempts: attempt }
                            };
                            tracing::debug!(role = %role, outcome = %outcome, "gateway call validated");
                            return GatewayReply {
                                value,
                                outcome,
                                tokens,
                                failure_mode: None,
                            };
                        }
                        Err(reason) => reason,
                    }
                }
                Ok(Err(err)) => err.to_string(),
                // Timeout is treated as a validation failure: it feeds the
                // corrective-retry path rather than raising.
                Err(_) => format!("no response within {}s", self.config.timeout.as_secs()),
            };
            tracing::warn!(role = %role, attempt, error = %error, "gateway attempt invalid");
            last_error = Some(error);
        }

        tracing::warn!(role = %role, adapter = self.adapter.name(), "corrective retries exhausted; using fallback");
        GatewayReply {
            value: fallback(),
            outcome: GatewayOutcome::Fallback,
            tokens,
            failure_mode: Some(FAILURE_MODE_VALIDATION_EXHAUSTED.to_string()),
        }
    }
}

fn plan_context(template: Template, instruction: &str) -> String {
    format!(
        "You are the planning role for an automated code-modification task.\n\n\
         TASK: {}\nTEMPLATE: {}\nFILES: {}\n\n\
         Respond with exactly one JSON object:\n\
         {{\"steps\": [\"...\"], \"files_to_modify\": [\"...\"], \"estimated_time\": \"...\"}}",
        instruction,
        template,
        stub::relevant_files(template).join(", "),
    )
}

fn patch_context(template: Template, plan: &Plan, feedback: Option<&str>) -> String {
    let mut context = format!(
        "You are the coding role for an automated code-modification task.\n\n\
         TEMPLATE: {}\nFILES: {}\nPLAN:\n{}\n\n\
         Respond with only a unified diff against the listed files, ending\n\
         with a line starting `COMMIT:` that summarizes the change.",
        template,
        stub::relevant_files(template).join(", "),
        plan.steps
            .iter()
            .map(|s| format!("- {}", s))
            .collect::<Vec<_>>()
            .join("\n"),
    );
    if let Some(feedback) = feedback {
        context.push_str("\n\nREVISION: the previous patch was not accepted: ");
        context.push_str(feedback);
    }
    context
}

fn report_context(template: Template, run: &TestRunResult) -> String {
    format!(
        "You are the testing role for an automated code-modification task.\n\n\
         TEMPLATE: {}\nPASSED: {}\nFAILED: {}\nOUTPUT:\n{}\n\n\
         Respond with exactly one JSON object:\n\
         {{\"summary\": \"...\", \"passed\": n, \"failed\": n, \"status\": \"passed|failed|partial\"}}",
        template, run.passed, run.failed, run.stdout,
    )
}

/// Rough token estimate (whitespace-delimited words).
fn approx_tokens(raw: &str) -> u32 {
    raw.split_whitespace().count() as u32
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
