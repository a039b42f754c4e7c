use std::collections::HashMap;

use crate::{
    condition::Condition,
    model::{DaySummary, RawSample},
};

/// Folds samples into one running summary per calendar day.
///
/// Samples may arrive in any order; alerts keep the order in which they first
/// triggered within each day. Temperatures are left unrounded.
pub fn aggregate(samples: &[RawSample], conditions: &[Condition]) -> HashMap<String, DaySummary> {
    let mut days: HashMap<String, DaySummary> = HashMap::new();

    for sample in samples {
        let key = sample.day_key();
        let day = days.entry(key).or_insert_with_key(|k| DaySummary::new(k.as_str()));

        day.record_temperature(sample.temperature_k());

        for condition in conditions {
            if condition.is_applicable(sample) {
                day.push_alert(condition.alert_message());
            }
        }
    }

    days
}
