// 📂 CSV import - bulk load of weighings
//
// Header: date, animal_id, weight_kg (dateISO, pigId, weightKg also accepted).
// Every row goes through the same validation as manual entry.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::Deserialize;

use crate::entry::{parse_date_input, WeighingEntry};
use crate::record::WeighingRecord;

#[derive(Debug, Deserialize)]
struct CsvWeighing {
    #[serde(alias = "dateISO")]
    date: String,

    #[serde(alias = "pigId")]
    animal_id: String,

    #[serde(alias = "weightKg")]
    weight_kg: String,
}

pub fn load_csv(csv_path: &Path, offset: FixedOffset) -> Result<Vec<WeighingRecord>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;
    read_csv(file, offset)
}

/// Parse and validate every row; the first bad row aborts with its line
pub fn read_csv<R: Read>(reader: R, offset: FixedOffset) -> Result<Vec<WeighingRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut records = Vec::new();

    for (index, result) in rdr.deserialize::<CsvWeighing>().enumerate() {
        // Header is line 1
        let line = index + 2;
        let row: CsvWeighing =
            result.with_context(|| format!("Failed to deserialize weighing on line {}", line))?;

        let date = parse_date_input(&row.date, offset)
            .with_context(|| format!("Invalid row on line {}", line))?;

        let record = WeighingEntry::new(row.animal_id, row.weight_kg)
            .at(date)
            .validate()
            .with_context(|| format!("Invalid row on line {}", line))?;

        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryError;
    use crate::format::display_offset;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_reads_native_headers() {
        let csv = "date,animal_id,weight_kg\n\
                   2025-01-01T00:00:00Z,A,10\n\
                   2025-01-02,A,\"11,2\"\n";

        let records = read_csv(csv.as_bytes(), display_offset(-5)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(records[1].date, Utc.with_ymd_and_hms(2025, 1, 2, 5, 0, 0).unwrap());
        assert_eq!(records[1].weight_kg, 11.2);
    }

    #[test]
    fn test_reads_stored_field_names() {
        let csv = "dateISO,pigId,weightKg\n2025-01-01T08:30, Lote-7 ,45.5\n";

        let records = read_csv(csv.as_bytes(), display_offset(0)).unwrap();
        assert_eq!(records[0].animal_id, "Lote-7");
        assert_eq!(records[0].weight_kg, 45.5);
    }

    #[test]
    fn test_invalid_row_reports_line() {
        let csv = "date,animal_id,weight_kg\n2025-01-01,A,10\n2025-01-02,A,0\n";

        let err = read_csv(csv.as_bytes(), display_offset(0)).unwrap_err();
        assert!(err.to_string().contains("line 3"));
        assert!(matches!(
            err.downcast_ref::<EntryError>(),
            Some(EntryError::InvalidWeight(_))
        ));
    }

    #[test]
    fn test_report_layout_is_not_an_import_format() {
        let csv = "Date,Animal ID,Weight (kg),Delta (kg)\n1/1/2025,A,10.0,–\n";

        let err = read_csv(csv.as_bytes(), display_offset(0)).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
