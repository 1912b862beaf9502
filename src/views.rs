// History & summary views
//
// raw records → sort → annotate → (history | latest per animal)

use std::collections::BTreeSet;

use tracing::debug;

use crate::deltas::with_deltas;
use crate::latest::latest_per_animal;
use crate::ordering::normalize_filter;
use crate::record::{AnnotatedRecord, WeighingRecord};

/// Full history, every animal (animal/date order) or one animal (date order).
/// Deltas are computed over the whole set before the filter is applied.
pub fn history(records: &[WeighingRecord], filter: Option<&str>) -> Vec<AnnotatedRecord> {
    let mut annotated = with_deltas(records);
    if let Some(animal) = normalize_filter(filter) {
        annotated.retain(|r| r.animal_id() == animal);
    }
    debug!(
        total = records.len(),
        shown = annotated.len(),
        filter = filter.unwrap_or(""),
        "history recomputed"
    );
    annotated
}

/// Latest weighing per animal
pub fn summary(records: &[WeighingRecord]) -> Vec<AnnotatedRecord> {
    let latest = latest_per_animal(&with_deltas(records));
    debug!(animals = latest.len(), "summary recomputed");
    latest
}

/// Distinct animal ids in plain lexicographic order (filter suggestions)
pub fn animal_ids(records: &[WeighingRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.animal_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).unwrap()
    }

    fn sample() -> Vec<WeighingRecord> {
        vec![
            WeighingRecord::with_id("1", day(1), "A", 10.0),
            WeighingRecord::with_id("2", day(2), "A", 11.2),
            WeighingRecord::with_id("3", day(1), "B", 9.7),
            WeighingRecord::with_id("4", day(3), "A", 12.0),
            WeighingRecord::with_id("5", day(2), "B", 10.0),
        ]
    }

    #[test]
    fn test_filter_does_not_change_deltas() {
        let records = sample();
        let all = history(&records, None);
        let only_a = history(&records, Some("A"));

        let a_from_all: Vec<_> = all.into_iter().filter(|r| r.animal_id() == "A").collect();
        assert_eq!(only_a, a_from_all);
        assert_eq!(only_a.len(), 3);
    }

    #[test]
    fn test_unknown_filter_is_empty() {
        assert!(history(&sample(), Some("Z")).is_empty());
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let records = sample();
        assert_eq!(history(&records, None), history(&records, None));
        assert_eq!(summary(&records), summary(&records));
    }

    #[test]
    fn test_animal_ids_are_distinct_and_sorted() {
        let mut records = sample();
        records.push(WeighingRecord::with_id("6", day(4), "Ábaco", 3.0));
        assert_eq!(animal_ids(&records), vec!["A", "B", "Ábaco"]);
    }
}
