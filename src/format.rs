// Display formatting for weights, deltas and dates
//
// Values are kept exact everywhere else; rounding happens only here.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;

/// Shown when an animal has no earlier weighing
pub const NO_DELTA: &str = "–";
pub const GAIN_PREFIX: &str = "+";
pub const FLAT_PREFIX: &str = "±";

// ============================================================================
// NUMBERS
// ============================================================================

/// Round to one decimal, ties toward +∞ (1.05 → 1.1, -0.25 → -0.2).
pub fn round_tenth(value: f64) -> f64 {
    let scaled = value * 10.0;
    let floor = scaled.floor();
    let rounded = if scaled - floor >= 0.5 { floor + 1.0 } else { floor };
    let result = rounded / 10.0;
    // -0.0 would print as "-0.0"
    if result == 0.0 {
        0.0
    } else {
        result
    }
}

/// Weight with exactly one decimal digit
pub fn format_weight(weight_kg: f64) -> String {
    format!("{:.1}", round_tenth(weight_kg))
}

/// Delta with sign convention: `+` gain, bare numeral loss, `±` exactly zero,
/// `–` when there is no earlier weighing.
pub fn format_delta(delta_kg: Option<f64>) -> String {
    let Some(delta) = delta_kg else {
        return NO_DELTA.to_string();
    };

    let prefix = if delta > 0.0 {
        GAIN_PREFIX
    } else if delta < 0.0 {
        ""
    } else {
        FLAT_PREFIX
    };

    format!("{}{}", prefix, format_weight(delta))
}

// ============================================================================
// TREND
// ============================================================================

/// Direction of a delta, used to colour views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaTrend {
    NoData,
    Gain,
    Loss,
    Flat,
}

impl DeltaTrend {
    pub fn of(delta_kg: Option<f64>) -> Self {
        match delta_kg {
            None => DeltaTrend::NoData,
            Some(d) if d > 0.0 => DeltaTrend::Gain,
            Some(d) if d < 0.0 => DeltaTrend::Loss,
            Some(_) => DeltaTrend::Flat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeltaTrend::NoData => "no_data",
            DeltaTrend::Gain => "gain",
            DeltaTrend::Loss => "loss",
            DeltaTrend::Flat => "flat",
        }
    }
}

// ============================================================================
// DATES
// ============================================================================

/// Fixed display offset in whole hours (America/Bogota = -5, no DST)
pub fn display_offset(utc_offset_hours: i32) -> FixedOffset {
    utc_offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

/// Day/month/year without padding, e.g. "3/1/2025"
pub fn format_date(date: DateTime<Utc>, offset: FixedOffset) -> String {
    date.with_timezone(&offset).format("%-d/%-m/%Y").to_string()
}

/// Date plus 24h time, e.g. "3/1/2025, 14:05:09"
pub fn format_date_time(date: DateTime<Utc>, offset: FixedOffset) -> String {
    date.with_timezone(&offset)
        .format("%-d/%-m/%Y, %H:%M:%S")
        .to_string()
}

/// Replace anything outside `[A-Za-z0-9-_.]` so the name is safe on disk
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
