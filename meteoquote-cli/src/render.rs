//! Plain-text rendering of snapshots.

use std::fmt::Write;

use meteoquote_core::refresh::Snapshot;
use meteoquote_core::{City, condition_label};

/// The widget drops the quote rather than wrap it.
pub const WIDGET_QUOTE_MAX: usize = 80;

pub fn city_line(city: &City) -> String {
    format!("{} ({:.4}, {:.4})", city.label, city.lat, city.lon)
}

pub fn snapshot(s: &Snapshot) -> String {
    let w = &s.weather;
    let mut out = String::new();

    let _ = writeln!(out, "{}", s.city.label);
    let _ = writeln!(out, "{} {:.0}°C, {}", s.bucket.icon(), w.current_temp, s.condition);
    let _ = writeln!(out, "{}", s.quote);
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "UV   {:.1} now, {:.1} max ({}){}",
        w.uv_now,
        w.uv_max_today,
        s.uv_level.label(),
        peak_suffix(s.uv_peak.as_deref()),
    );
    let _ = writeln!(
        out,
        "AQI  {} now, {} max ({}){}",
        w.aqi_now,
        w.aqi_max_today,
        s.aqi_level.label(),
        peak_suffix(s.aqi_peak.as_deref()),
    );

    if !w.hourly.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Next hours");
        for hour in &w.hourly {
            let _ = writeln!(
                out,
                "  {}  {:>5.1}°C  {}",
                hour.time.format("%H:%M"),
                hour.temperature,
                condition_label(hour.condition_code),
            );
        }
    }

    if !w.daily.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Next days");
        for day in &w.daily {
            let _ = writeln!(
                out,
                "  {}  {:>5.1} / {:>5.1}°C  {}",
                day.date.format("%a %d"),
                day.temp_min,
                day.temp_max,
                condition_label(day.condition_code),
            );
        }
    }

    out
}

pub fn widget_line(s: &Snapshot) -> String {
    let base = format!("{} {:.0}°C {}", s.city.label, s.weather.current_temp, s.condition);
    if s.quote.chars().count() > WIDGET_QUOTE_MAX {
        base
    } else {
        format!("{base} | {}", s.quote)
    }
}

fn peak_suffix(peak: Option<&str>) -> String {
    peak.map(|t| format!(", peak {t}")).unwrap_or_default()
}
