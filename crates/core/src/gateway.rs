// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared DTOs for the agent gateway boundary.
//!
//! The gateway crate owns the call/validate/retry machinery; these types are
//! in core because events and reliability counters reference them.

use serde::{Deserialize, Serialize};

/// Agent role for a single completion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Planner,
    Coder,
    Tester,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Planner => "planner",
            Role::Coder => "coder",
            Role::Tester => "tester",
        }
    }
}

crate::simple_display! {
    Role {
        Planner => "planner",
        Coder => "coder",
        Tester => "tester",
    }
}

/// How a gateway call produced its validated value.
///
/// All three outcomes must stay distinguishable in the emitted TaskEvent and
/// in the reliability counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GatewayOutcome {
    /// First response validated cleanly.
    Direct,
    /// A corrective follow-up (carrying the validation error) succeeded.
    CorrectiveRetry { attempts: u32 },
    /// Retries exhausted; the deterministic stub response was used.
    Fallback,
}

impl GatewayOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, GatewayOutcome::Fallback)
    }

    /// Number of corrective follow-up calls this outcome represents.
    pub fn retries(&self) -> u32 {
        match self {
            GatewayOutcome::Direct => 0,
            GatewayOutcome::CorrectiveRetry { attempts } => *attempts,
            GatewayOutcome::Fallback => 0,
        }
    }
}

crate::simple_display! {
    GatewayOutcome {
        Direct => "direct",
        CorrectiveRetry { .. } => "corrective_retry",
        Fallback => "fallback",
    }
}

/// Where a stage's plan or patch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    /// Produced by a gateway call.
    Agent,
    /// Seeded from a prior successful run in the memory layer.
    Memory,
}

crate::simple_display! {
    PlanSource {
        Agent => "agent",
        Memory => "memory",
    }
}

/// Request sent to the external completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub role: Role,
    pub context: String,
}
