// End-to-end checks through the public API: ledger, views, store, report.

use chrono::{DateTime, TimeZone, Utc};

use weighing_ledger::format::{display_offset, round_tenth};
use weighing_ledger::{
    format_delta, format_weight, history, summary, with_deltas, JsonFileStore, MemoryStore,
    ReportFormat, ReportOptions, WeighingEntry, WeighingLedger, WeighingRecord, WeighingStore,
};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, d, 12, 0, 0).unwrap()
}

/// Insertion order deliberately mixed up
fn farm() -> Vec<WeighingRecord> {
    vec![
        WeighingRecord::new(day(2), "B", 10.0),
        WeighingRecord::new(day(3), "A", 12.0),
        WeighingRecord::new(day(1), "A", 10.0),
        WeighingRecord::new(day(1), "B", 9.7),
        WeighingRecord::new(day(2), "A", 11.2),
    ]
}

fn rounded(deltas: impl Iterator<Item = Option<f64>>) -> Vec<Option<f64>> {
    deltas.map(|d| d.map(round_tenth)).collect()
}

#[test]
fn deltas_follow_each_animal_in_date_order() {
    let view = history(&farm(), None);

    let ids: Vec<&str> = view.iter().map(|r| r.animal_id()).collect();
    assert_eq!(ids, vec!["A", "A", "A", "B", "B"]);

    let a = rounded(view.iter().filter(|r| r.animal_id() == "A").map(|r| r.delta_kg));
    let b = rounded(view.iter().filter(|r| r.animal_id() == "B").map(|r| r.delta_kg));
    assert_eq!(a, vec![None, Some(1.2), Some(0.8)]);
    assert_eq!(b, vec![None, Some(0.3)]);
}

#[test]
fn summary_keeps_latest_weighing_per_animal() {
    let latest = summary(&farm());

    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].animal_id(), "A");
    assert_eq!(latest[0].date(), day(3));
    assert_eq!(latest[0].delta_kg.map(round_tenth), Some(0.8));
    assert_eq!(latest[1].animal_id(), "B");
    assert_eq!(latest[1].date(), day(2));
    assert_eq!(latest[1].delta_kg.map(round_tenth), Some(0.3));
}

#[test]
fn pipeline_is_idempotent() {
    let records = farm();
    assert_eq!(history(&records, None), history(&records, None));
    assert_eq!(summary(&records), summary(&records));
    assert_eq!(with_deltas(&records), with_deltas(&records));
}

#[test]
fn filter_does_not_change_deltas() {
    let records = farm();
    let all = history(&records, None);
    let only_a = history(&records, Some("A"));

    let from_all: Vec<_> = all.into_iter().filter(|r| r.animal_id() == "A").collect();
    assert_eq!(only_a, from_all);
}

#[test]
fn same_timestamp_keeps_insertion_order() {
    let records = vec![
        WeighingRecord::with_id("first", day(1), "A", 10.0),
        WeighingRecord::with_id("second", day(1), "A", 10.5),
        WeighingRecord::with_id("third", day(1), "A", 10.5),
    ];

    let view = history(&records, None);
    let ids: Vec<&str> = view.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
    assert_eq!(view[1].delta_kg, Some(0.5));
    assert_eq!(view[2].delta_kg, Some(0.0));
    assert_eq!(format_delta(view[2].delta_kg), "±0.0");
}

#[test]
fn display_strings() {
    assert_eq!(format_weight(1.05), "1.1");
    assert_eq!(format_weight(12.34), "12.3");
    assert_eq!(format_delta(None), "–");
    assert_eq!(format_delta(Some(2.345)), "+2.3");
    assert_eq!(format_delta(Some(0.0)), "±0.0");
    assert_eq!(format_delta(Some(-1.2)), "-1.2");
}

#[test]
fn ledger_survives_reopen_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weighings.json");

    {
        let mut ledger = WeighingLedger::open(JsonFileStore::new(&path)).unwrap();
        ledger.add(&WeighingEntry::new("A", "10").at(day(1))).unwrap();
        ledger.add(&WeighingEntry::new(" A ", "11,2").at(day(2))).unwrap();
        ledger.add(&WeighingEntry::new("B", "9.7").at(day(1))).unwrap();
    }

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"pigId\": \"A\""));
    assert!(raw.contains("\"dateISO\": \"2025-01-01T12:00:00.000Z\""));

    let reopened = WeighingLedger::open(JsonFileStore::new(&path)).unwrap();
    assert_eq!(reopened.len(), 3);
    assert_eq!(reopened.animal_ids(), vec!["A", "B"]);
    let a = reopened.history(Some("A"));
    assert_eq!(a[1].delta_kg.map(round_tenth), Some(1.2));
}

#[test]
fn report_for_the_whole_farm() {
    let mut ledger = WeighingLedger::open(MemoryStore::new()).unwrap();
    ledger.import(farm()).unwrap();

    let options = ReportOptions {
        organization: "ANNCOR".to_string(),
        offset: display_offset(-5),
    };
    let table = ledger.report(None, &options).unwrap();
    assert_eq!(table.title, "Weighings – ANNCOR");
    assert_eq!(table.rows.len(), 5);
    assert_eq!(table.rows[0].date, "1/1/2025");
    assert_eq!(table.rows[0].delta_kg, "–");
    assert_eq!(table.rows[1].delta_kg, "+1.2");

    let mut csv = Vec::new();
    table.render(ReportFormat::Csv, &mut csv).unwrap();
    let csv = String::from_utf8(csv).unwrap();
    assert!(csv.starts_with("Date,Animal ID,Weight (kg),Delta (kg)\n"));
    assert_eq!(ledger.store().load().unwrap().len(), 5);
}
