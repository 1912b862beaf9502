// Grouping & sorting of weighings
//
// Unfiltered: animal id (Spanish collation), then date ascending.
// Filtered:   one animal only, date ascending.
// Every sort is stable, so equal (animal, date) keys keep input order.

use std::cmp::Ordering;

use crate::collation::{compare_identifiers, CollationKey};
use crate::record::Weighing;

/// Animal id first, then date. Identical ids always fall through to date.
pub fn by_animal_then_date<W: Weighing>(a: &W, b: &W) -> Ordering {
    compare_identifiers(a.animal_id(), b.animal_id()).then_with(|| a.date().cmp(&b.date()))
}

pub fn by_date<W: Weighing>(a: &W, b: &W) -> Ordering {
    a.date().cmp(&b.date())
}

/// Treat an empty filter as "no filter"
pub fn normalize_filter(filter: Option<&str>) -> Option<&str> {
    filter.filter(|f| !f.is_empty())
}

/// Stable in-place sort by animal then date. Keys are computed once per item.
pub fn sort_by_animal_then_date<W: Weighing>(items: &mut [W]) {
    items.sort_by_cached_key(|w| {
        (
            CollationKey::new(w.animal_id()),
            w.animal_id().to_string(),
            w.date(),
        )
    });
}

/// Ordered copy of `records`, optionally restricted to one animal.
pub fn sort_records<W: Weighing + Clone>(records: &[W], filter: Option<&str>) -> Vec<W> {
    match normalize_filter(filter) {
        None => {
            let mut sorted = records.to_vec();
            sort_by_animal_then_date(&mut sorted);
            sorted
        }
        Some(animal) => {
            let mut sorted: Vec<W> = records
                .iter()
                .filter(|r| r.animal_id() == animal)
                .cloned()
                .collect();
            sorted.sort_by(by_date);
            sorted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::WeighingRecord;
    use chrono::{DateTime, TimeZone, Utc};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).unwrap()
    }

    fn rec(id: &str, animal: &str, d: u32, kg: f64) -> WeighingRecord {
        WeighingRecord::with_id(id, day(d), animal, kg)
    }

    fn ids(records: &[WeighingRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_unfiltered_groups_by_animal_then_date() {
        let records = vec![
            rec("1", "b", 2, 1.0),
            rec("2", "A", 3, 1.0),
            rec("3", "b", 1, 1.0),
            rec("4", "A", 1, 1.0),
        ];

        let sorted = sort_records(&records, None);
        assert_eq!(ids(&sorted), vec!["4", "2", "3", "1"]);
    }

    #[test]
    fn test_accented_ids_sort_with_their_base_letter() {
        let records = vec![
            rec("z", "Zorro", 1, 1.0),
            rec("a", "Ámbar", 1, 1.0),
            rec("b", "Bonita", 1, 1.0),
        ];

        let sorted = sort_records(&records, None);
        assert_eq!(ids(&sorted), vec!["a", "b", "z"]);
    }

    #[test]
    fn test_filter_restricts_and_orders_by_date() {
        let records = vec![
            rec("1", "A", 3, 1.0),
            rec("2", "B", 1, 1.0),
            rec("3", "A", 1, 1.0),
            rec("4", "a", 2, 1.0),
        ];

        let sorted = sort_records(&records, Some("A"));
        assert_eq!(ids(&sorted), vec!["3", "1"]);
    }

    #[test]
    fn test_empty_filter_is_no_filter() {
        let records = vec![rec("1", "B", 1, 1.0), rec("2", "A", 1, 1.0)];
        assert_eq!(ids(&sort_records(&records, Some(""))), vec!["2", "1"]);
    }

    #[test]
    fn test_sort_is_stable_on_equal_keys() {
        let records = vec![
            rec("first", "A", 1, 1.0),
            rec("other", "B", 1, 1.0),
            rec("second", "A", 1, 2.0),
            rec("third", "A", 1, 3.0),
        ];

        let sorted = sort_records(&records, None);
        assert_eq!(ids(&sorted), vec!["first", "second", "third", "other"]);

        let filtered = sort_records(&records, Some("A"));
        assert_eq!(ids(&filtered), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_result_independent_of_input_order() {
        let mut records = vec![
            rec("1", "B", 2, 1.0),
            rec("2", "A", 1, 1.0),
            rec("3", "B", 1, 1.0),
        ];
        let once = sort_records(&records, None);
        records.reverse();
        assert_eq!(sort_records(&records, None), once);
    }

    #[test]
    fn test_comparator_agrees_with_cached_sort() {
        let records = vec![
            rec("1", "ñu", 1, 1.0),
            rec("2", "Nube", 2, 1.0),
            rec("3", "nube", 1, 1.0),
            rec("4", "Nube", 1, 1.0),
        ];

        let mut by_comparator = records.clone();
        by_comparator.sort_by(by_animal_then_date);
        assert_eq!(sort_records(&records, None), by_comparator);
    }
}
