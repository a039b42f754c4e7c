use forecast_core::ForecastResponse;
use std::fmt::{self, Write};

/// Human-readable rendering of one response, newline terminated.
pub fn response(response: &ForecastResponse) -> String {
    let mut out = String::new();
    // Writing into a `String` cannot fail.
    let _ = write_response(&mut out, response);
    out
}

fn write_response(out: &mut impl Write, response: &ForecastResponse) -> fmt::Result {
    if !response.is_success() {
        return writeln!(out, "{}: error {} - {}", response.city, response.cod, response.message);
    }

    writeln!(out, "{}", response.city)?;

    let days = response.days();
    if days.is_empty() {
        return writeln!(out, "  no forecast days available");
    }

    for day in days {
        let alerts = if day.alerts.is_empty() { "-".to_string() } else { day.alerts.join("; ") };
        writeln!(
            out,
            "  {}  min {:>3} K  max {:>3} K  {}",
            day.dt_txt, day.min_temp, day.max_temp, alerts
        )?;
    }

    Ok(())
}
