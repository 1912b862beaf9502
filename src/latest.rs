// Latest weighing per animal (summary view)

use std::collections::HashMap;

use crate::collation::compare_identifiers;
use crate::ordering::sort_by_animal_then_date;
use crate::record::AnnotatedRecord;

/// One record per animal: its chronologically last weighing, with the delta
/// it already carries. Ordered by animal id (Spanish collation).
pub fn latest_per_animal(annotated: &[AnnotatedRecord]) -> Vec<AnnotatedRecord> {
    let mut sorted = annotated.to_vec();
    sort_by_animal_then_date(&mut sorted);

    // Last write wins
    let mut latest: HashMap<String, AnnotatedRecord> = HashMap::new();
    for record in sorted {
        latest.insert(record.animal_id().to_string(), record);
    }

    let mut summary: Vec<AnnotatedRecord> = latest.into_values().collect();
    summary.sort_by(|a, b| compare_identifiers(a.animal_id(), b.animal_id()));
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deltas::with_deltas;
    use crate::record::WeighingRecord;
    use chrono::{DateTime, TimeZone, Utc};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).unwrap()
    }

    fn rec(id: &str, animal: &str, d: u32, kg: f64) -> WeighingRecord {
        WeighingRecord::with_id(id, day(d), animal, kg)
    }

    #[test]
    fn test_one_entry_per_animal_with_max_date() {
        let records = vec![
            rec("1", "B", 5, 20.0),
            rec("2", "A", 1, 10.0),
            rec("3", "B", 9, 21.0),
            rec("4", "A", 4, 11.0),
            rec("5", "B", 2, 19.0),
        ];

        let latest = latest_per_animal(&with_deltas(&records));
        let picked: Vec<(&str, &str)> = latest.iter().map(|r| (r.animal_id(), r.id())).collect();
        assert_eq!(picked, vec![("A", "4"), ("B", "3")]);
        assert_eq!(latest[1].delta_kg, Some(1.0));
    }

    #[test]
    fn test_single_weighing_keeps_no_delta() {
        let latest = latest_per_animal(&with_deltas(&[rec("1", "A", 1, 10.0)]));
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].delta_kg, None);
    }

    #[test]
    fn test_tie_on_date_picks_later_input() {
        let records = vec![rec("x", "A", 2, 10.0), rec("y", "A", 2, 11.0)];
        let latest = latest_per_animal(&with_deltas(&records));
        assert_eq!(latest[0].id(), "y");
    }

    #[test]
    fn test_output_uses_collation() {
        let records = vec![
            rec("1", "ñandú", 1, 1.0),
            rec("2", "Oveja", 1, 1.0),
            rec("3", "nube", 1, 1.0),
            rec("4", "Érica", 1, 1.0),
        ];

        let latest = latest_per_animal(&with_deltas(&records));
        let animals: Vec<&str> = latest.iter().map(|r| r.animal_id()).collect();
        assert_eq!(animals, vec!["Érica", "nube", "ñandú", "Oveja"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(latest_per_animal(&[]).is_empty());
    }
}
