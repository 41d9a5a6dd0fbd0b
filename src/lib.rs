//! # Cotejar
//!
//! Side-by-side benchmarking for OpenAI-compatible LLM inference endpoints.
//!
//! Cotejar (Spanish: "to collate, to compare side by side") sends an
//! identical ordered suite of prompts to every configured chat-completion
//! endpoint, measures per-call latency and throughput, and aggregates the
//! outcomes into per-model statistics plus a durable JSON artifact.
//!
//! ## Design
//!
//! - **Fan-out per test case**: within one test case, all endpoint calls run
//!   concurrently on a single-threaded cooperative scheduler and join before
//!   the next test case starts. Test cases run strictly in order with a
//!   pacing delay in between.
//! - **Failures are data**: transport errors, timeouts, non-200 statuses,
//!   and malformed bodies become failed [`BenchRecord`]s; one broken
//!   endpoint never aborts the run.
//! - **Estimated tokens**: throughput uses a ~4-bytes-per-token heuristic,
//!   not a tokenizer, which is sufficient for cross-endpoint comparison.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cotejar::{summarize, BenchClient, BenchmarkRunner, SuiteConfig, SuiteReport};
//!
//! # async fn run() -> cotejar::Result<()> {
//! let config = SuiteConfig::load(std::path::Path::new("benchmark.json"))?;
//!
//! let mut runner = BenchmarkRunner::new(BenchClient::new(), config.endpoints.clone());
//! runner.run_all(&config.tests).await;
//!
//! let summaries = summarize(runner.results());
//! SuiteReport::from_records(runner.results())
//!     .save(std::path::Path::new(&config.output))?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)] // token counts -> f64 throughput is safe
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]

pub mod bench;
pub mod config;
pub mod error;
pub mod http_client;

pub use bench::report::{print_summary, summarize, ModelSummary, SuiteReport};
pub use bench::BenchmarkRunner;
pub use config::{EndpointConfig, SuiteConfig, TestCase};
pub use error::{CotejarError, Result};
pub use http_client::{BenchClient, BenchRecord};
