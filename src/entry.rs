// ✍️ Entry validation - nothing invalid reaches the ledger
//
// Weights are typed by hand, often with a decimal comma ("23,5").
// Animal ids are trimmed and must not be blank; weights must be > 0.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

use crate::record::WeighingRecord;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryError {
    #[error("animal id is required")]
    MissingAnimalId,

    #[error("invalid weight {0:?}: must be a number greater than 0")]
    InvalidWeight(String),

    #[error("invalid date {0:?}: expected RFC 3339, YYYY-MM-DDTHH:MM or YYYY-MM-DD")]
    InvalidDate(String),
}

// ============================================================================
// NUMBERS
// ============================================================================

/// Lenient number parsing: comma or dot as decimal separator, surrounding
/// whitespace ignored, anything unparseable (or infinite/NaN) is 0.
pub fn parse_number(raw: &str) -> f64 {
    let normalized = raw.trim().replacen(',', ".", 1);
    if normalized.is_empty() {
        return 0.0;
    }
    match normalized.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

// ============================================================================
// DATES
// ============================================================================

const LOCAL_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parse the `YYYY-MM-DDTHH:MM` form of a local date-time input
pub fn parse_local_datetime(raw: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), LOCAL_INPUT_FORMAT).ok()?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Inverse of [`parse_local_datetime`], minute precision
pub fn to_local_input_value(date: DateTime<Utc>, offset: FixedOffset) -> String {
    date.with_timezone(&offset)
        .format(LOCAL_INPUT_FORMAT)
        .to_string()
}

/// Accepts RFC 3339, local `YYYY-MM-DDTHH:MM` or local `YYYY-MM-DD` (midnight)
pub fn parse_date_input(raw: &str, offset: FixedOffset) -> Result<DateTime<Utc>, EntryError> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Some(dt) = parse_local_datetime(trimmed, offset) {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| EntryError::InvalidDate(raw.to_string()))
}

// ============================================================================
// WEIGHING ENTRY
// ============================================================================

/// Raw, unvalidated input for a new weighing
#[derive(Debug, Clone, Default)]
pub struct WeighingEntry {
    /// `None` = weighed now
    pub date: Option<DateTime<Utc>>,
    pub animal_id: String,
    pub weight: String,
}

impl WeighingEntry {
    pub fn new(animal_id: impl Into<String>, weight: impl Into<String>) -> Self {
        WeighingEntry {
            date: None,
            animal_id: animal_id.into(),
            weight: weight.into(),
        }
    }

    pub fn at(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Check the id first, then the weight; builds a record with a new id.
    pub fn validate(&self) -> Result<WeighingRecord, EntryError> {
        let animal_id = self.animal_id.trim();
        if animal_id.is_empty() {
            return Err(EntryError::MissingAnimalId);
        }

        let weight_kg = parse_number(&self.weight);
        if weight_kg <= 0.0 {
            return Err(EntryError::InvalidWeight(self.weight.clone()));
        }

        let date = self.date.unwrap_or_else(Utc::now);
        Ok(WeighingRecord::new(date, animal_id, weight_kg))
    }
}
