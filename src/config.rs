//! Benchmark configuration: endpoints, test cases, and suite settings
//!
//! Configuration is injectable, never hardcoded: the endpoint table (and
//! optionally the test suite) is loaded from a JSON file at startup.
//! Credentials stay out of the file itself: an `api_key` written as
//! `"${CEREBRAS_API_KEY}"` is resolved from the process environment at load
//! time, and an unset variable fails fast before any request is issued.
//!
//! A built-in eight-prompt coding suite is used when the file supplies no
//! `tests` array, so a minimal config only needs endpoints:
//!
//! ```json
//! {
//!   "endpoints": [
//!     {
//!       "name": "Local Server",
//!       "base_url": "http://localhost:8000/v1",
//!       "model_name": "qwen3-coder"
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CotejarError, Result};

/// Sentinel `api_key` value marking an endpoint that requires no auth
pub const NO_AUTH: &str = "none";

/// One target chat-completion service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Display name, used as the `model_name` key in results
    pub name: String,
    /// Base URL up to but not including `/chat/completions`
    pub base_url: String,
    /// Bearer credential, `"none"` for unauthenticated endpoints, or
    /// `"${VAR}"` to resolve from the environment at load time
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Model identifier sent in the request payload
    pub model_name: String,
    /// Static headers sent with every request (Authorization is managed
    /// separately from `api_key` and ignored here)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_api_key() -> String {
    NO_AUTH.to_string()
}

impl EndpointConfig {
    /// Whether requests to this endpoint carry an Authorization header
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.api_key != NO_AUTH
    }
}

/// One benchmark prompt with its generation parameters
///
/// Test cases form an ordered sequence; the order defines execution and
/// progress-reporting order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    /// Unique key identifying this test in results
    pub name: String,
    /// Human-readable description shown by `cotejar list`
    #[serde(default)]
    pub description: String,
    /// Prompt text sent identically to every endpoint
    pub prompt: String,
    /// Rough expected response size in tokens (informational only)
    #[serde(default = "default_expected_tokens")]
    pub expected_tokens: usize,
    /// Generation cap sent as `max_tokens`
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_expected_tokens() -> usize {
    500
}

fn default_max_tokens() -> usize {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

/// Complete benchmark suite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Endpoints to benchmark; every test case fans out to all of them
    pub endpoints: Vec<EndpointConfig>,
    /// Ordered test cases; defaults to the built-in coding suite
    #[serde(default = "default_test_suite")]
    pub tests: Vec<TestCase>,
    /// Path the JSON results artifact is written to
    #[serde(default = "default_output")]
    pub output: String,
    /// Seconds to wait between test cases, throttling load on the services
    #[serde(default = "default_pacing_secs")]
    pub pacing_secs: u64,
}

fn default_output() -> String {
    "benchmark_results.json".to_string()
}

fn default_pacing_secs() -> u64 {
    1
}

impl SuiteConfig {
    /// Load and validate a suite configuration from a JSON file
    ///
    /// Resolves `${VAR}` credentials from the environment. Fails if the
    /// file is unreadable, the JSON is invalid, a referenced environment
    /// variable is unset, or no endpoints are configured.
    ///
    /// # Errors
    ///
    /// Returns [`CotejarError::IoError`] or [`CotejarError::ConfigError`].
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| CotejarError::IoError {
            message: format!("failed to read config {}: {e}", path.display()),
        })?;

        let mut config: Self =
            serde_json::from_str(&raw).map_err(|e| CotejarError::ConfigError {
                reason: format!("invalid config {}: {e}", path.display()),
            })?;

        if config.endpoints.is_empty() {
            return Err(CotejarError::ConfigError {
                reason: format!("no endpoints configured in {}", path.display()),
            });
        }

        for endpoint in &mut config.endpoints {
            endpoint.api_key = resolve_env(&endpoint.api_key)?;
        }

        Ok(config)
    }
}

/// Resolve a `${VAR}`-form credential from the environment
///
/// Any other value passes through unchanged, including the `"none"`
/// sentinel.
fn resolve_env(value: &str) -> Result<String> {
    let Some(name) = value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) else {
        return Ok(value.to_string());
    };
    std::env::var(name).map_err(|_| CotejarError::ConfigError {
        reason: format!(
            "environment variable {name} is not set (referenced by an endpoint api_key)"
        ),
    })
}

/// The built-in test suite: eight coding prompts of increasing size
///
/// Varied in length and domain so short prompts stress decode throughput
/// while long design prompts stress end-to-end latency.
#[must_use]
pub fn default_test_suite() -> Vec<TestCase> {
    let cases = [
        (
            "simple_function",
            "Simple Python function implementation",
            "Write a Python function that takes a list of integers and returns the sum of even numbers.".to_string(),
            200,
            500,
        ),
        (
            "algorithm_implementation",
            "Algorithm implementation with explanation",
            "Implement a binary search algorithm in Python with detailed comments explaining each step. Include time and space complexity analysis.".to_string(),
            400,
            800,
        ),
        (
            "data_structure",
            "Data structure implementation",
            "Create a Python class for a binary search tree with insert, delete, and search methods. Include proper error handling.".to_string(),
            600,
            1200,
        ),
        (
            "debugging_task",
            "Code debugging and fixing",
            "Debug this Python code and fix all issues:\n\n\
             def quicksort(arr):\n    if len(arr) <= 1:\n        return arr\n    \
             pivot = arr[len(arr) // 2]\n    left = [x for x in arr if x < pivot]\n    \
             middle = [x for x in arr if x = pivot]\n    \
             right = [x for x in arr if x > pivot]\n    \
             return quicksort(left) + middle + quicksort(right)\n\n\
             # Test\nnumbers = [3, 6, 8, 10, 1, 2, 1]\nprint(quicksort(numbers))"
                .to_string(),
            300,
            600,
        ),
        (
            "code_explanation",
            "Code explanation and optimization",
            "Explain this JavaScript code and suggest optimizations:\n\n\
             function fibonacci(n) {\n    if (n <= 1) return n;\n    \
             return fibonacci(n - 1) + fibonacci(n - 2);\n}\n\n\
             for (let i = 0; i < 40; i++) {\n    console.log(`fib(${i}) = ${fibonacci(i)}`);\n}"
                .to_string(),
            400,
            800,
        ),
        (
            "api_design",
            "REST API design task",
            "Design a RESTful API for a todo list application. Include endpoints, HTTP methods, request/response formats, and error handling. Provide example code in Python using Flask.".to_string(),
            700,
            1400,
        ),
        (
            "performance_analysis",
            "Performance analysis and profiling",
            "Analyze the performance bottlenecks in this Python code and provide optimized versions with explanations:\n\n\
             def process_data(data):\n    result = []\n    for item in data:\n        \
             if item % 2 == 0:\n            result.append(item * 2)\n    \
             return sorted(result, reverse=True)"
                .to_string(),
            500,
            1000,
        ),
        (
            "complex_system_design",
            "System design question",
            "Design a distributed caching system similar to Redis. Explain the architecture, data structures, consistency models, and provide pseudocode for key operations (GET, SET, DELETE). Consider scalability and fault tolerance.".to_string(),
            800,
            1600,
        ),
    ];

    cases
        .into_iter()
        .map(|(name, description, prompt, expected_tokens, max_tokens)| TestCase {
            name: name.to_string(),
            description: description.to_string(),
            prompt,
            expected_tokens,
            max_tokens,
            temperature: default_temperature(),
        })
        .collect()
}
