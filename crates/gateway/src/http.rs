// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP completion adapter (OpenAI-style chat completions).
//!
//! Optional: constructed only when an API key is configured. Requests from
//! the sandbox have no network; this adapter is the orchestrator's own
//! egress and carries its own timeout at the gateway layer.

use crate::adapter::{AdapterError, CompletionAdapter};
use async_trait::async_trait;
use mend_core::CompletionRequest;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

/// Chat-completions adapter over reqwest.
pub struct HttpAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpAdapter {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// Build from `MEND_API_KEY` / `MEND_MODEL` / `MEND_API_BASE`.
    /// Returns `None` without a key; callers fall back to the stub adapter.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("MEND_API_KEY").ok().filter(|k| !k.is_empty())?;
        Some(Self::new(
            api_key,
            std::env::var("MEND_MODEL").ok(),
            std::env::var("MEND_API_BASE").ok(),
        ))
    }
}

#[async_trait]
impl CompletionAdapter for HttpAdapter {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AdapterError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: request.context.clone(),
            }],
            temperature: 0.1,
            max_tokens: 1000,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AdapterError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AdapterError::Request(format!("{}: {}", status, text)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Request(format!("bad response body: {}", e)))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AdapterError::Request("response had no choices".to_string()))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
