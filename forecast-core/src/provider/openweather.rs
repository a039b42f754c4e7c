use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::ProviderConfig;

use super::{FetchError, ForecastFetcher, RetryPolicy, with_retry};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches the multi-day forecast document from an OpenWeather-style endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherFetcher {
    config: ProviderConfig,
    retry: RetryPolicy,
    http: Client,
}

impl OpenWeatherFetcher {
    pub fn new(config: ProviderConfig, retry: RetryPolicy) -> anyhow::Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for forecast provider")?;

        Ok(Self { config, retry, http })
    }

    async fn fetch_once(&self, city: &str) -> Result<String, FetchError> {
        let count = self.config.count.to_string();

        let res = self
            .http
            .get(&self.config.base_url)
            .query(&[
                ("q", city),
                ("appid", self.config.api_key.as_str()),
                ("cnt", count.as_str()),
            ])
            .send()
            .await
            .map_err(classify)?;

        let status = res.status();
        let body = res.text().await.map_err(classify)?;

        debug!("Forecast provider answered {} for '{}' ({} bytes)", status, city, body.len());

        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), body });
        }

        Ok(body)
    }
}

/// Only connectivity failures are retried; anything else (e.g. a request that
/// cannot be built) is unexpected.
fn classify(err: reqwest::Error) -> FetchError {
    if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
        FetchError::connection(err)
    } else {
        FetchError::Other(anyhow::Error::new(err).context("Forecast provider request failed"))
    }
}

#[async_trait]
impl ForecastFetcher for OpenWeatherFetcher {
    async fn fetch(&self, city: &str) -> Result<String, FetchError> {
        with_retry(&self.retry, move || self.fetch_once(city)).await
    }
}
