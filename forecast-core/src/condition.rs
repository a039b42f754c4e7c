use crate::model::RawSample;

const KELVIN_OFFSET: f64 = 273.15;
const HIGH_TEMPERATURE_C: f64 = 40.0;
/// Provider units (m/s), roughly 10 mph.
const HIGH_WIND_SPEED: f64 = 4.47;
const THUNDERSTORM_LABEL: &str = "Thunderstorm";

/// A weather condition worth warning about.
///
/// Each variant is a pure predicate over one sample plus a fixed alert text.
/// New conditions are added as variants and listed in [`Condition::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    HighTemperature,
    HighWind,
    Rain,
    Thunderstorm,
}

impl Condition {
    /// Registry evaluated for every sample, in this order.
    pub const ALL: &'static [Condition] = &[
        Condition::HighTemperature,
        Condition::HighWind,
        Condition::Rain,
        Condition::Thunderstorm,
    ];

    pub fn is_applicable(&self, sample: &RawSample) -> bool {
        match self {
            Condition::HighTemperature => sample.temperature_k() - KELVIN_OFFSET > HIGH_TEMPERATURE_C,
            Condition::HighWind => sample.wind_speed() > HIGH_WIND_SPEED,
            Condition::Rain => sample.rain_3h().is_some_and(|volume| volume > 0.0),
            Condition::Thunderstorm => sample
                .weather_labels()
                .any(|label| label.contains(THUNDERSTORM_LABEL)),
        }
    }

    pub fn alert_message(&self) -> &'static str {
        match self {
            Condition::HighTemperature => "Use sunscreen lotion",
            Condition::HighWind => "It's too windy, watch out!",
            Condition::Rain => "Carry umbrella",
            Condition::Thunderstorm => "Don't step out! A Storm is brewing!",
        }
    }
}
