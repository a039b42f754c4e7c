use std::collections::HashMap;

use crate::model::DaySummary;

/// Days taken from the start of the sorted aggregation, before skipping.
pub const LIMIT_DAYS: usize = 4;

/// Leading days dropped from the report.
///
/// The provider's first day is the partial current day, so it is never
/// reported. Providers whose first entry is not "today" would lose a full day
/// here; that is accepted policy.
pub const SKIP_DAYS: usize = 1;

/// Orders aggregated days chronologically, rounds them and applies the
/// `LIMIT_DAYS` / `SKIP_DAYS` window. Returns at most three days.
pub fn select(days: HashMap<String, DaySummary>) -> Vec<DaySummary> {
    let mut sorted: Vec<(String, DaySummary)> = days.into_iter().collect();
    // `YYYY-MM-DD` sorts chronologically as text.
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    sorted
        .iter()
        .take(LIMIT_DAYS)
        .skip(SKIP_DAYS)
        .map(|(_, day)| day.finalized())
        .collect()
}
