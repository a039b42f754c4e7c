use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::{Config, provider::openweather::OpenWeatherFetcher};

pub mod openweather;
pub mod retry;

pub use retry::{RetryPolicy, with_retry};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures of a raw forecast fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure; worth retrying.
    #[error("connection to forecast provider failed: {0}")]
    Connection(#[source] BoxError),

    /// Transport kept failing until the retry policy gave up.
    #[error("forecast provider unreachable after {attempts} attempt(s)")]
    Unavailable {
        attempts: u32,
        #[source]
        source: BoxError,
    },

    /// Provider answered with a non-success HTTP status.
    #[error("forecast provider returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FetchError {
    pub fn connection(err: impl Into<BoxError>) -> Self {
        FetchError::Connection(err.into())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Connection(_))
    }
}

/// Source of raw provider forecast documents for a city.
#[async_trait]
pub trait ForecastFetcher: Send + Sync + Debug {
    /// Returns the provider's JSON body for `city`.
    async fn fetch(&self, city: &str) -> Result<String, FetchError>;
}

/// Construct the configured provider fetcher.
pub fn fetcher_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastFetcher>> {
    let provider = config.provider_config()?;
    let fetcher = OpenWeatherFetcher::new(provider.clone(), config.retry.policy())?;
    Ok(Box::new(fetcher))
}
