use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SERVICE_UNAVAILABLE: &str = "Service Not Available.";
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error.";
pub const CITY_REQUIRED: &str = "City parameter is required.";

/// One forecast point as reported by the provider.
///
/// Every field a condition reads is required, so a sample that decodes can be
/// evaluated by all conditions. `rain` and `weather` may be absent as a whole
/// (no rain, no labels), but a present `rain` must carry `3h` and every
/// `weather` entry must carry its `main` label.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSample {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub dt: DateTime<Utc>,
    pub main: SampleMain,
    pub wind: SampleWind,
    #[serde(default)]
    pub rain: Option<SampleRain>,
    #[serde(default)]
    pub weather: Vec<SampleWeather>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SampleMain {
    /// Kelvin.
    pub temp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SampleWind {
    pub speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SampleRain {
    #[serde(rename = "3h")]
    pub three_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SampleWeather {
    pub main: String,
}

impl RawSample {
    /// Calendar date (UTC) the sample belongs to, as `YYYY-MM-DD`.
    pub fn day_key(&self) -> String {
        self.dt.format("%Y-%m-%d").to_string()
    }

    pub fn temperature_k(&self) -> f64 {
        self.main.temp
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind.speed
    }

    pub fn rain_3h(&self) -> Option<f64> {
        self.rain.map(|r| r.three_hours)
    }

    pub fn weather_labels(&self) -> impl Iterator<Item = &str> {
        self.weather.iter().map(|w| w.main.as_str())
    }
}

/// Per-day accumulator, and once finalized, one entry of the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub min_temp: f64,
    pub max_temp: f64,
    pub dt_txt: String,
    pub alerts: Vec<String>,
}

impl DaySummary {
    pub fn new(date_key: impl Into<String>) -> Self {
        Self {
            min_temp: f64::INFINITY,
            max_temp: f64::NEG_INFINITY,
            dt_txt: date_key.into(),
            alerts: Vec::new(),
        }
    }

    pub fn record_temperature(&mut self, temp: f64) {
        self.max_temp = self.max_temp.max(temp);
        self.min_temp = self.min_temp.min(temp);
    }

    /// Appends `alert` unless the day already carries it.
    pub fn push_alert(&mut self, alert: &str) {
        if !self.alerts.iter().any(|a| a == alert) {
            self.alerts.push(alert.to_string());
        }
    }

    /// Copy with both temperatures rounded half up, still in Kelvin.
    pub fn finalized(&self) -> Self {
        Self {
            min_temp: round_half_up(self.min_temp),
            max_temp: round_half_up(self.max_temp),
            dt_txt: self.dt_txt.clone(),
            alerts: self.alerts.clone(),
        }
    }
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Scalar the provider sends either as a string or as a number
/// (`"cod": "200"` on success, `"cod": 401` on errors, `"message": 0`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "ScalarRepr", into = "String")]
pub struct ProviderText(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarRepr {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl From<ScalarRepr> for ProviderText {
    fn from(value: ScalarRepr) -> Self {
        match value {
            ScalarRepr::Text(s) => Self(s),
            ScalarRepr::Number(n) => Self(n.to_string()),
            ScalarRepr::Flag(b) => Self(b.to_string()),
        }
    }
}

impl From<ProviderText> for String {
    fn from(value: ProviderText) -> Self {
        value.0
    }
}

impl From<&str> for ProviderText {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl ProviderText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized answer for a single city query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub city: String,
    pub cod: String,
    pub message: String,
    #[serde(rename = "forecastData", default, skip_serializing_if = "Option::is_none")]
    pub forecast_data: Option<Vec<DaySummary>>,
}

impl ForecastResponse {
    pub fn success(
        city: &str,
        cod: &ProviderText,
        message: &ProviderText,
        forecast_data: Option<Vec<DaySummary>>,
    ) -> Self {
        Self {
            city: city.to_string(),
            cod: cod.to_string(),
            message: message.to_string(),
            forecast_data,
        }
    }

    pub fn provider_error(city: &str, cod: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            city: city.to_string(),
            cod: cod.into(),
            message: message.into(),
            forecast_data: None,
        }
    }

    pub fn unavailable(city: &str) -> Self {
        Self::provider_error(city, "503", SERVICE_UNAVAILABLE)
    }

    pub fn internal_error(city: &str) -> Self {
        Self::provider_error(city, "500", INTERNAL_SERVER_ERROR)
    }

    pub fn invalid_city(city: &str) -> Self {
        Self::provider_error(city, "400", CITY_REQUIRED)
    }

    pub fn is_success(&self) -> bool {
        self.cod == "200"
    }

    pub fn days(&self) -> &[DaySummary] {
        self.forecast_data.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_sample() {
        let json = r#"{
            "dt": 1638288000,
            "main": { "temp": 285.15, "humidity": 80 },
            "wind": { "speed": 5.1, "deg": 200 },
            "rain": { "3h": 0.42 },
            "weather": [{ "id": 211, "main": "Thunderstorm" }],
            "dt_txt": "2021-11-30 16:00:00"
        }"#;

        let sample: RawSample = serde_json::from_str(json).expect("sample should decode");

        assert_eq!(sample.day_key(), "2021-11-30");
        assert_eq!(sample.temperature_k(), 285.15);
        assert_eq!(sample.wind_speed(), 5.1);
        assert_eq!(sample.rain_3h(), Some(0.42));
        assert_eq!(sample.weather_labels().collect::<Vec<_>>(), vec!["Thunderstorm"]);
    }

    #[test]
    fn rain_and_weather_may_be_absent() {
        let json = r#"{ "dt": 1638288000, "main": { "temp": 285.15 }, "wind": { "speed": 1.2 } }"#;

        let sample: RawSample = serde_json::from_str(json).expect("sample should decode");

        assert_eq!(sample.wind_speed(), 1.2);
        assert_eq!(sample.rain_3h(), None);
        assert_eq!(sample.weather_labels().count(), 0);
    }

    #[test]
    fn missing_wind_is_rejected() {
        let json = r#"{ "dt": 1638288000, "main": { "temp": 285.15 } }"#;

        let err = serde_json::from_str::<RawSample>(json).unwrap_err();
        assert!(err.to_string().contains("wind"));
    }

    #[test]
    fn rain_without_three_hour_volume_is_rejected() {
        let json = r#"{ "dt": 1638288000, "main": { "temp": 285.15 }, "wind": { "speed": 1.0 }, "rain": { "1h": 3.0 } }"#;

        let err = serde_json::from_str::<RawSample>(json).unwrap_err();
        assert!(err.to_string().contains("3h"));
    }

    #[test]
    fn weather_entry_without_label_is_rejected() {
        let json = r#"{ "dt": 1638288000, "main": { "temp": 285.15 }, "wind": { "speed": 1.0 }, "weather": [{ "id": 800 }] }"#;

        let err = serde_json::from_str::<RawSample>(json).unwrap_err();
        assert!(err.to_string().contains("main"));
    }

    #[test]
    fn missing_main_is_rejected() {
        let json = r#"{ "dt": 1638288000, "wind": { "speed": 1.0 } }"#;

        let err = serde_json::from_str::<RawSample>(json).unwrap_err();
        assert!(err.to_string().contains("main"));
    }

    #[test]
    fn day_key_uses_utc_midnight_boundary() {
        let before: RawSample =
            serde_json::from_str(r#"{ "dt": 1638316799, "main": { "temp": 280.0 }, "wind": { "speed": 1.0 } }"#).unwrap();
        let after: RawSample =
            serde_json::from_str(r#"{ "dt": 1638316800, "main": { "temp": 280.0 }, "wind": { "speed": 1.0 } }"#).unwrap();

        assert_eq!(before.day_key(), "2021-11-30");
        assert_eq!(after.day_key(), "2021-12-01");
    }

    #[test]
    fn fresh_summary_uses_sentinels() {
        let day = DaySummary::new("2021-11-30");
        assert_eq!(day.min_temp, f64::INFINITY);
        assert_eq!(day.max_temp, f64::NEG_INFINITY);
        assert!(day.alerts.is_empty());
    }

    #[test]
    fn push_alert_keeps_first_trigger_order_without_duplicates() {
        let mut day = DaySummary::new("2021-11-30");
        day.push_alert("Carry umbrella");
        day.push_alert("Use sunscreen lotion");
        day.push_alert("Carry umbrella");

        assert_eq!(day.alerts, vec!["Carry umbrella", "Use sunscreen lotion"]);
    }

    #[test]
    fn finalized_rounds_half_up_in_kelvin() {
        let mut day = DaySummary::new("2021-11-30");
        day.record_temperature(285.5);
        day.record_temperature(287.49);

        let done = day.finalized();
        assert_eq!(done.min_temp, 286.0);
        assert_eq!(done.max_temp, 287.0);
        assert_eq!(done.dt_txt, "2021-11-30");
    }

    #[test]
    fn provider_text_accepts_numbers_and_strings() {
        let code: ProviderText = serde_json::from_str("401").unwrap();
        let msg: ProviderText = serde_json::from_str("0").unwrap();
        let text: ProviderText = serde_json::from_str(r#""city not found""#).unwrap();

        assert_eq!(code.as_str(), "401");
        assert_eq!(msg.as_str(), "0");
        assert_eq!(text.as_str(), "city not found");
    }

    #[test]
    fn response_serializes_with_provider_field_names() {
        let response = ForecastResponse {
            city: "London".into(),
            cod: "200".into(),
            message: "0".into(),
            forecast_data: Some(vec![DaySummary {
                min_temp: 285.0,
                max_temp: 287.0,
                dt_txt: "2021-12-01".into(),
                alerts: vec!["Carry umbrella".into()],
            }]),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["cod"], "200");
        assert_eq!(value["forecastData"][0]["dt_txt"], "2021-12-01");
        assert_eq!(value["forecastData"][0]["min_temp"], 285.0);

        let unavailable = serde_json::to_value(ForecastResponse::unavailable("London")).unwrap();
        assert!(unavailable.get("forecastData").is_none());
        assert_eq!(unavailable["message"], SERVICE_UNAVAILABLE);
    }
}
