//! Single-call executor for OpenAI-compatible chat endpoints
//!
//! Issues one `POST {base_url}/chat/completions` per (endpoint, test case)
//! pair, times it, and classifies the outcome into a [`BenchRecord`].
//! [`BenchClient::execute`] never returns an error: transport failures,
//! timeouts, non-200 statuses, and malformed bodies are all captured as
//! failed records so the caller can keep fanning out to sibling endpoints.
//!
//! Token counts are an estimate, not a tokenizer: ~4 bytes per token,
//! which is close enough for cross-endpoint throughput comparison.

use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{EndpointConfig, TestCase};

/// Bytes-per-token divisor for the estimated token count
const BYTES_PER_TOKEN: usize = 4;

/// Default per-call total timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// OpenAI-compatible wire types
// ============================================================================

/// Chat completion request payload
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier
    pub model: String,
    /// Conversation messages; the benchmark sends a single user turn
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Sampling temperature
    pub temperature: f32,
    /// Whether to stream the response (always false here)
    pub stream: bool,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", "assistant"
    #[serde(default)]
    pub role: String,
    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a user-role message
    #[must_use]
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// Chat completion response
///
/// `choices` defaults to empty so that a body which parses as JSON but
/// carries no choices is classified as the fixed schema error rather
/// than a decode failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Response ID, when the server provides one
    #[serde(default)]
    pub id: Option<String>,
    /// Completion choices
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// A single completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// Generated message
    pub message: ChatMessage,
}

// ============================================================================
// Result record
// ============================================================================

/// Outcome of one (endpoint, test case) execution
///
/// Created exactly once per attempt and immutable afterwards. Invariants:
/// a failed record has empty `response_text` and zero `tokens_generated`;
/// `tokens_per_second` is zero whenever `response_time` is zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchRecord {
    /// Test case key
    pub test_name: String,
    /// Endpoint display name the record belongs to
    pub model_name: String,
    /// Full decoded response text; empty on failure
    pub response_text: String,
    /// Wall-clock elapsed seconds, measured at every exit path
    pub response_time: f64,
    /// Estimated tokens in the response (byte length / 4, not a tokenizer)
    pub tokens_generated: u64,
    /// Derived throughput: tokens / response_time, 0 when time is 0
    pub tokens_per_second: f64,
    /// Whether the call produced a usable completion
    pub success: bool,
    /// Failure description; absent on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// RFC 3339 timestamp stamped at record construction
    pub timestamp: String,
}

impl BenchRecord {
    /// Build a successful record from a decoded response text
    #[must_use]
    pub fn success(
        test: &TestCase,
        endpoint: &EndpointConfig,
        elapsed: Duration,
        response_text: String,
    ) -> Self {
        let response_time = elapsed.as_secs_f64();
        let tokens_generated = (response_text.len() / BYTES_PER_TOKEN) as u64;
        let tokens_per_second = if response_time > 0.0 {
            tokens_generated as f64 / response_time
        } else {
            0.0
        };
        Self {
            test_name: test.name.clone(),
            model_name: endpoint.name.clone(),
            response_text,
            response_time,
            tokens_generated,
            tokens_per_second,
            success: true,
            error_message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Build a failed record carrying an error description
    #[must_use]
    pub fn failure(
        test: &TestCase,
        endpoint: &EndpointConfig,
        elapsed: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            test_name: test.name.clone(),
            model_name: endpoint.name.clone(),
            response_text: String::new(),
            response_time: elapsed.as_secs_f64(),
            tokens_generated: 0,
            tokens_per_second: 0.0,
            success: false,
            error_message: Some(error.into()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

// ============================================================================
// Executor
// ============================================================================

/// HTTP executor issuing one timed call per (endpoint, test case)
#[derive(Debug, Clone)]
pub struct BenchClient {
    client: Client,
    timeout_secs: u64,
}

impl Default for BenchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchClient {
    /// Create a client with the default 60 second total timeout
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Create a client with a custom total timeout
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized.
    #[must_use]
    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .expect("failed to build HTTP client"),
            timeout_secs,
        }
    }

    /// Get the configured timeout
    #[must_use]
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Execute one benchmark call and classify the outcome
    ///
    /// Never fails: every transport, protocol, and schema error comes back
    /// as a failed [`BenchRecord`]. Timing covers the full round trip and
    /// is captured at each exit path, so a timed-out call reports roughly
    /// the timeout bound as its `response_time`.
    pub async fn execute(&self, endpoint: &EndpointConfig, test: &TestCase) -> BenchRecord {
        let url = format!(
            "{}/chat/completions",
            endpoint.base_url.trim_end_matches('/')
        );
        let request = ChatCompletionRequest {
            model: endpoint.model_name.clone(),
            messages: vec![ChatMessage::user(&test.prompt)],
            max_tokens: test.max_tokens,
            temperature: test.temperature,
            stream: false,
        };

        let mut builder = self.client.post(&url).json(&request);
        for (name, value) in &endpoint.headers {
            // Authorization is derived from api_key below, never from the
            // static table; an endpoint with no credential sends none at all.
            if name.eq_ignore_ascii_case("authorization") {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }
        if endpoint.requires_auth() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", endpoint.api_key));
        }

        tracing::debug!(test = %test.name, endpoint = %endpoint.name, %url, "issuing benchmark call");
        let start = Instant::now();

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                let description = if err.is_timeout() {
                    format!("Request timed out after {}s", self.timeout_secs)
                } else {
                    format!("HTTP request failed: {err}")
                };
                return BenchRecord::failure(test, endpoint, start.elapsed(), description);
            }
        };

        let status = response.status();
        if status.as_u16() != 200 {
            let body = response.text().await.unwrap_or_default();
            return BenchRecord::failure(
                test,
                endpoint,
                start.elapsed(),
                format!("HTTP {}: {}", status.as_u16(), body),
            );
        }

        let completion: ChatCompletionResponse = match response.json().await {
            Ok(completion) => completion,
            Err(err) => {
                return BenchRecord::failure(
                    test,
                    endpoint,
                    start.elapsed(),
                    format!("Failed to parse completion response: {err}"),
                );
            }
        };
        let elapsed = start.elapsed();

        let Some(choice) = completion.choices.first() else {
            return BenchRecord::failure(test, endpoint, elapsed, "No response choices returned");
        };

        tracing::debug!(
            test = %test.name,
            endpoint = %endpoint.name,
            id = completion.id.as_deref().unwrap_or("-"),
            elapsed_s = elapsed.as_secs_f64(),
            "benchmark call completed"
        );
        BenchRecord::success(test, endpoint, elapsed, choice.message.content.clone())
    }
}
