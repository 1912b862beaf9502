// ⚖️ Weighing Records - identity + immutable measurement
//
// A record is created once and never edited. The only way a record leaves
// the set is whole-record deletion.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

use crate::entry::parse_number;

// ============================================================================
// WEIGHING RECORD
// ============================================================================

/// One weight measurement for one animal at one instant.
///
/// Field names on the wire follow the flat persisted layout:
/// `{"id", "dateISO", "pigId", "weightKg"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeighingRecord {
    /// Stable identity (UUID v4) - never changes
    #[serde(default = "default_uuid")]
    pub id: String,

    /// When the animal was weighed (stored as UTC)
    #[serde(rename = "dateISO", with = "iso_millis")]
    pub date: DateTime<Utc>,

    /// Free-text animal identifier, e.g. "Lote-12 / 045"
    #[serde(rename = "pigId")]
    pub animal_id: String,

    /// Weight in kilograms
    #[serde(rename = "weightKg", default, deserialize_with = "lenient_weight")]
    pub weight_kg: f64,
}

fn default_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl WeighingRecord {
    /// Create a record with a fresh identity
    pub fn new(date: DateTime<Utc>, animal_id: impl Into<String>, weight_kg: f64) -> Self {
        Self::with_id(default_uuid(), date, animal_id, weight_kg)
    }

    pub fn with_id(
        id: impl Into<String>,
        date: DateTime<Utc>,
        animal_id: impl Into<String>,
        weight_kg: f64,
    ) -> Self {
        WeighingRecord {
            id: id.into(),
            date,
            animal_id: animal_id.into(),
            weight_kg,
        }
    }

    /// Hash of the measurement values, used to skip duplicates on import.
    /// Identity is `id`; two records with different ids can share a hash.
    pub fn idempotency_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{}|{}",
            self.date_iso(),
            self.animal_id,
            self.weight_kg
        ));
        format!("{:x}", hasher.finalize())
    }

    /// ISO-8601 timestamp with millisecond precision and `Z` suffix
    pub fn date_iso(&self) -> String {
        self.date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

// ============================================================================
// ANNOTATED RECORD
// ============================================================================

/// A record plus its weight change against the previous weighing of the
/// same animal. Derived on every read, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedRecord {
    #[serde(flatten)]
    pub record: WeighingRecord,

    /// `None` = no earlier weighing for this animal (not the same as zero)
    #[serde(rename = "deltaKg")]
    pub delta_kg: Option<f64>,
}

impl AnnotatedRecord {
    pub fn new(record: WeighingRecord, delta_kg: Option<f64>) -> Self {
        AnnotatedRecord { record, delta_kg }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn animal_id(&self) -> &str {
        &self.record.animal_id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.record.date
    }

    pub fn weight_kg(&self) -> f64 {
        self.record.weight_kg
    }
}

// ============================================================================
// ORDERING KEYS
// ============================================================================

/// Anything that can be grouped by animal and ordered in time.
pub trait Weighing {
    fn animal_id(&self) -> &str;
    fn date(&self) -> DateTime<Utc>;
}

impl Weighing for WeighingRecord {
    fn animal_id(&self) -> &str {
        &self.animal_id
    }

    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

impl Weighing for AnnotatedRecord {
    fn animal_id(&self) -> &str {
        &self.record.animal_id
    }

    fn date(&self) -> DateTime<Utc> {
        self.record.date
    }
}

// ============================================================================
// SERDE HELPERS
// ============================================================================

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Weights written by older builds may be strings ("23,5"). Coerce them the
/// same way entry does; anything unreadable becomes 0.
fn lenient_weight<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => parse_number(&s),
        // Booleans, null, arrays and objects are not weights
        _ => 0.0,
    })
}
