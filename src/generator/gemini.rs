//! Gemini-backed text generator
//!
//! Sends the conversation transcript to Google's Gemini API.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::error::DispatchError;
use crate::generator::TextGenerator;
use crate::models::{Message, MessageRole};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// Reusable Gemini client (connection-pooled)
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiGenerator {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent".to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(
        &self,
        system_instruction: &str,
        conversation: &[Message],
    ) -> crate::Result<String> {
        if self.api_key.is_empty() {
            return Err(DispatchError::InvalidConfig(
                "GEMINI_API_KEY not configured".to_string(),
            ));
        }

        let url = format!("{}?key={}", self.base_url, self.api_key);
        let request = build_request(system_instruction, conversation);

        info!("Calling Gemini API");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                DispatchError::LlmError(format!("Gemini API error: {}", e))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error response: {}", error_text);
            return Err(DispatchError::LlmError(format!(
                "Gemini API error: {}",
                error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            DispatchError::LlmError(format!("Gemini parse error: {}", e))
        })?;

        let answer = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| {
                DispatchError::LlmError("Empty response from Gemini".to_string())
            })?;

        info!("Gemini response received");

        Ok(answer)
    }
}

/// Build the request payload, folding transcript system messages into the
/// system instruction since Gemini contents only accept user/model roles.
fn build_request(system_instruction: &str, conversation: &[Message]) -> GeminiRequest {
    let mut system_text = system_instruction.to_string();
    let mut contents = Vec::with_capacity(conversation.len());

    for message in conversation {
        match message.role {
            MessageRole::System => {
                system_text.push_str("\n\n");
                system_text.push_str(&message.content);
            }
            MessageRole::User | MessageRole::Assistant => {
                contents.push(Content {
                    role: Some(gemini_role(message.role).to_string()),
                    parts: vec![Part {
                        text: message.content.clone(),
                    }],
                });
            }
        }
    }

    GeminiRequest {
        contents,
        generation_config: GenerationConfig {
            temperature: 0.3,
            top_p: 0.9,
            top_k: 40,
            max_output_tokens: 1024,
        },
        system_instruction: SystemInstruction {
            parts: vec![Part { text: system_text }],
        },
    }
}

fn gemini_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User | MessageRole::System => "user",
        MessageRole::Assistant => "model",
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    system_instruction: SystemInstruction,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}
