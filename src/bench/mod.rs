//! Benchmark orchestration: fan-out runner and suite driver
//!
//! One test case fans out to every configured endpoint concurrently on the
//! cooperative scheduler; test cases themselves run strictly sequentially
//! with a pacing delay in between, throttling load on the remote services.
//!
//! The runner owns the append-only result log. Records land in the log in
//! completion order, always after a call's record is fully constructed, and
//! are never mutated afterwards.

use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};

use crate::config::{EndpointConfig, TestCase};
use crate::http_client::{BenchClient, BenchRecord};

pub mod report;

/// Orchestrates the benchmark suite and owns the result log
#[derive(Debug)]
pub struct BenchmarkRunner {
    client: BenchClient,
    endpoints: Vec<EndpointConfig>,
    results: Vec<BenchRecord>,
    pacing: Duration,
}

impl BenchmarkRunner {
    /// Create a runner for a fixed set of endpoints
    #[must_use]
    pub fn new(client: BenchClient, endpoints: Vec<EndpointConfig>) -> Self {
        Self {
            client,
            endpoints,
            results: Vec::new(),
            pacing: Duration::from_secs(1),
        }
    }

    /// Set the delay between test cases
    #[must_use]
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// The accumulated result log, in append (completion) order
    #[must_use]
    pub fn results(&self) -> &[BenchRecord] {
        &self.results
    }

    /// Consume the runner, returning the result log
    #[must_use]
    pub fn into_results(self) -> Vec<BenchRecord> {
        self.results
    }

    /// Run one test case against every endpoint concurrently
    ///
    /// Joins all calls before returning; no early exit on first success or
    /// failure; a slow endpoint resolves via its own timeout and never
    /// cancels its siblings. Every produced record (pass or fail) is
    /// appended to the result log in completion order. A task that dies
    /// without producing a record (a panic inside the scheduler boundary)
    /// is logged and omitted, so the returned list can be shorter than the
    /// endpoint count but the remaining endpoints are unaffected.
    pub async fn run_test(&mut self, test: &TestCase) -> Vec<BenchRecord> {
        let mut calls: FuturesUnordered<_> = self
            .endpoints
            .iter()
            .map(|endpoint| {
                let client = self.client.clone();
                let endpoint = endpoint.clone();
                let test = test.clone();
                tokio::spawn(async move { client.execute(&endpoint, &test).await })
            })
            .collect();

        let mut records = Vec::with_capacity(self.endpoints.len());
        while let Some(joined) = calls.next().await {
            match joined {
                Ok(record) => {
                    self.results.push(record.clone());
                    records.push(record);
                }
                Err(err) => {
                    tracing::warn!(
                        test = %test.name,
                        error = %err,
                        "benchmark task failed before producing a record"
                    );
                }
            }
        }
        records
    }

    /// Run the full ordered suite, printing live progress
    ///
    /// Sequential across test cases; concurrency exists only within a test
    /// case. A test case that yields fewer records than endpoints is
    /// non-fatal; the suite always runs to completion.
    pub async fn run_all(&mut self, tests: &[TestCase]) {
        println!("Starting LLM endpoint benchmark");
        println!("{}", "=".repeat(50));

        for test in tests {
            println!("Running test: {}", test.name);
            let records = self.run_test(test).await;

            for record in &records {
                let marker = if record.success { "✓" } else { "✗" };
                println!(
                    "{marker} {}: {:.2}s, {:.1} tokens/s",
                    record.model_name, record.response_time, record.tokens_per_second
                );
            }

            println!("{}", "-".repeat(30));
            // Pacing delay keeps the remote services from seeing the suite
            // as a burst load.
            if !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn unroutable_endpoint(name: &str) -> EndpointConfig {
        // Bind an ephemeral port, then drop the listener so connections to
        // it are refused quickly.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        EndpointConfig {
            name: name.to_string(),
            base_url: format!("http://{addr}"),
            api_key: "none".to_string(),
            model_name: "m".to_string(),
            headers: BTreeMap::new(),
        }
    }

    fn quick_test(name: &str) -> TestCase {
        TestCase {
            name: name.to_string(),
            description: String::new(),
            prompt: "hello".to_string(),
            expected_tokens: 10,
            max_tokens: 10,
            temperature: 0.0,
        }
    }

    #[test]
    fn test_runner_starts_empty() {
        let runner = BenchmarkRunner::new(BenchClient::new(), vec![]);
        assert!(runner.results().is_empty());
        assert_eq!(runner.pacing, Duration::from_secs(1));
    }

    #[test]
    fn test_runner_pacing_override() {
        let runner =
            BenchmarkRunner::new(BenchClient::new(), vec![]).with_pacing(Duration::ZERO);
        assert!(runner.pacing.is_zero());
    }

    #[tokio::test]
    async fn test_fan_out_one_record_per_endpoint() {
        let endpoints = vec![unroutable_endpoint("A"), unroutable_endpoint("B")];
        let mut runner = BenchmarkRunner::new(BenchClient::new(), endpoints);

        let records = runner.run_test(&quick_test("t1")).await;

        assert_eq!(records.len(), 2);
        assert_eq!(runner.results().len(), 2);
        for record in &records {
            assert!(!record.success);
            assert!(record.error_message.is_some());
            assert!(record.response_text.is_empty());
            assert_eq!(record.tokens_generated, 0);
        }
        let mut names: Vec<&str> = records.iter().map(|r| r.model_name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_suite_preserves_test_order_in_log() {
        let endpoints = vec![unroutable_endpoint("A")];
        let mut runner =
            BenchmarkRunner::new(BenchClient::new(), endpoints).with_pacing(Duration::ZERO);

        runner
            .run_all(&[quick_test("first"), quick_test("second")])
            .await;

        let log = runner.results();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].test_name, "first");
        assert_eq!(log[1].test_name, "second");
    }

    #[tokio::test]
    async fn test_empty_endpoint_set_yields_no_records() {
        let mut runner =
            BenchmarkRunner::new(BenchClient::new(), vec![]).with_pacing(Duration::ZERO);
        let records = runner.run_test(&quick_test("t")).await;
        assert!(records.is_empty());
        assert!(runner.results().is_empty());
    }
}
