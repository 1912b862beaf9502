// 📈 Delta annotation - weight change vs. the previous weighing
//
// Always walks the unfiltered animal/date order, whatever view is shown
// later, so a display filter can never change a delta.

use std::collections::HashMap;

use crate::ordering::sort_records;
use crate::record::{AnnotatedRecord, WeighingRecord};

/// Annotate every record with `weight - previous weight` for its animal.
///
/// The first weighing of each animal gets `None`. Output is in animal/date
/// order. Subtraction is exact; nothing is rounded here.
pub fn with_deltas(records: &[WeighingRecord]) -> Vec<AnnotatedRecord> {
    let sorted = sort_records(records, None);

    let mut last_seen: HashMap<&str, &WeighingRecord> = HashMap::new();
    let mut annotated = Vec::with_capacity(sorted.len());

    for record in &sorted {
        let delta_kg = last_seen
            .get(record.animal_id.as_str())
            .map(|prev| record.weight_kg - prev.weight_kg);

        annotated.push(AnnotatedRecord::new(record.clone(), delta_kg));
        last_seen.insert(record.animal_id.as_str(), record);
    }

    annotated
}
