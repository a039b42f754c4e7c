//! Fetch-and-decode pipeline for one city.

use futures::future::join_all;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    Config,
    aggregate::aggregate,
    condition::Condition,
    model::{ForecastResponse, ProviderText, RawSample},
    provider::{FetchError, ForecastFetcher, fetcher_from_config},
    select::select,
};

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("city name must not be empty")]
    EmptyCity,

    /// Samples are decoded up front; the first bad one fails the whole request.
    #[error("forecast sample #{index} is malformed: {source}")]
    MalformedSample {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("forecast provider returned an undecodable document: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    #[error("unexpected failure while fetching forecast: {0}")]
    Unexpected(#[source] FetchError),
}

/// Success document. `list` is kept loose so each sample can be reported by
/// position when it fails to decode.
#[derive(Debug, Deserialize)]
struct ForecastEnvelope {
    cod: ProviderText,
    #[serde(default)]
    message: ProviderText,
    #[serde(default)]
    list: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    cod: Option<ProviderText>,
    #[serde(default)]
    message: ProviderText,
}

#[derive(Debug)]
pub struct ForecastService {
    fetcher: Box<dyn ForecastFetcher>,
    conditions: &'static [Condition],
}

impl ForecastService {
    pub fn new(fetcher: Box<dyn ForecastFetcher>) -> Self {
        Self { fetcher, conditions: Condition::ALL }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(fetcher_from_config(config)?))
    }

    /// Forecast for `city`. Every failure is folded into the response: an
    /// empty city is `"400"`, anything unrecognized is a generic `"500"`.
    pub async fn forecast(&self, city: &str) -> ForecastResponse {
        let city = city.trim();
        info!("Received forecast request for city: {city}");

        match self.try_forecast(city).await {
            Ok(response) => response,
            Err(ForecastError::EmptyCity) => ForecastResponse::invalid_city(city),
            Err(err) => {
                error!("Forecast for '{city}' failed: {err}");
                ForecastResponse::internal_error(city)
            }
        }
    }

    /// Independent forecasts for several cities, in input order.
    pub async fn forecast_many(&self, cities: &[String]) -> Vec<ForecastResponse> {
        join_all(cities.iter().map(|city| self.forecast(city))).await
    }

    pub async fn try_forecast(&self, city: &str) -> Result<ForecastResponse, ForecastError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(ForecastError::EmptyCity);
        }

        let body = match self.fetcher.fetch(city).await {
            Ok(body) => body,
            Err(FetchError::Unavailable { attempts, source }) => {
                warn!("Forecast provider unavailable after {attempts} attempt(s): {source}");
                return Ok(ForecastResponse::unavailable(city));
            }
            Err(FetchError::Connection(source)) => {
                warn!("Forecast provider unavailable: {source}");
                return Ok(ForecastResponse::unavailable(city));
            }
            Err(FetchError::Status { status, body }) => {
                return provider_error(city, status, &body);
            }
            Err(err) => return Err(ForecastError::Unexpected(err)),
        };

        self.decode(city, &body)
    }

    fn decode(&self, city: &str, body: &str) -> Result<ForecastResponse, ForecastError> {
        let envelope: ForecastEnvelope =
            serde_json::from_str(body).map_err(ForecastError::MalformedEnvelope)?;

        let Some(list) = envelope.list else {
            debug!("Forecast document for '{city}' has no sample list");
            return Ok(ForecastResponse::success(city, &envelope.cod, &envelope.message, None));
        };

        let samples = list
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<RawSample>(value)
                    .map_err(|source| ForecastError::MalformedSample { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let days = aggregate(&samples, self.conditions);
        debug!("Aggregated {} sample(s) for '{city}' into {} day(s)", samples.len(), days.len());

        let forecast = select(days);

        Ok(ForecastResponse::success(city, &envelope.cod, &envelope.message, Some(forecast)))
    }
}

/// Passes the provider's own `cod`/`message` through.
fn provider_error(city: &str, status: u16, body: &str) -> Result<ForecastResponse, ForecastError> {
    let parsed: ProviderErrorBody =
        serde_json::from_str(body).map_err(ForecastError::MalformedEnvelope)?;

    let cod = parsed.cod.map(String::from).unwrap_or_else(|| status.to_string());
    warn!("Forecast provider rejected request for '{city}': {cod} {}", parsed.message);

    Ok(ForecastResponse::provider_error(city, cod, parsed.message))
}
