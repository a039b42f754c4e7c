//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration of the forecast provider endpoint and retry policy
//! - Fetching raw forecast documents, with fixed-delay retry
//! - Weather alert conditions evaluated per sample
//! - Per-day aggregation and the reported window of days
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod condition;
pub mod config;
pub mod model;
pub mod provider;
pub mod select;
pub mod service;

pub use aggregate::aggregate;
pub use condition::Condition;
pub use config::{Config, ProviderConfig, RetryConfig};
pub use model::{DaySummary, ForecastResponse, RawSample};
pub use provider::{FetchError, ForecastFetcher, RetryPolicy};
pub use select::select;
pub use service::{ForecastError, ForecastService};
