// 🧾 Printable report - table of weighings with deltas
//
// Builds the rows a page renderer lays out. Rendering helpers cover CSV,
// a plain text list and JSON.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::format::{format_date, format_date_time, format_delta, format_weight, sanitize_file_name};
use crate::record::AnnotatedRecord;

pub const REPORT_HEADER: [&str; 4] = ["Date", "Animal ID", "Weight (kg)", "Delta (kg)"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    #[error("there are no weighings to export")]
    NoRecords,
}

// ============================================================================
// SCOPE & OPTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportScope {
    /// Every animal, ordered by animal then date
    All,
    /// One animal's history
    Animal(String),
}

impl ReportScope {
    pub fn from_filter(filter: Option<&str>) -> Self {
        match filter {
            Some(animal) if !animal.is_empty() => ReportScope::Animal(animal.to_string()),
            _ => ReportScope::All,
        }
    }

    pub fn filter(&self) -> Option<&str> {
        match self {
            ReportScope::All => None,
            ReportScope::Animal(animal) => Some(animal),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub organization: String,
    pub offset: FixedOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Text,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
        }
    }
}

// ============================================================================
// REPORT TABLE
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub date: String,
    pub animal_id: String,
    pub weight_kg: String,
    pub delta_kg: String,
}

impl ReportRow {
    pub fn cells(&self) -> [&str; 4] {
        [&self.date, &self.animal_id, &self.weight_kg, &self.delta_kg]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportTable {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub generated_label: String,
    pub header: [&'static str; 4],
    pub rows: Vec<ReportRow>,
    pub footer: String,
    pub file_stem: String,
}

impl ReportTable {
    /// `source` must already be in report order (a history view).
    pub fn build(
        scope: &ReportScope,
        source: &[AnnotatedRecord],
        options: &ReportOptions,
        generated_at: DateTime<Utc>,
    ) -> Result<Self, ReportError> {
        if source.is_empty() {
            return Err(ReportError::NoRecords);
        }

        let (title, file_stem) = match scope {
            ReportScope::All => (
                format!("Weighings – {}", options.organization),
                format!("Weighings_{}", sanitize_file_name(&options.organization)),
            ),
            ReportScope::Animal(animal) => (
                format!("Weighings – Animal {}", animal),
                format!("Weighings_{}", sanitize_file_name(animal)),
            ),
        };

        let rows = source
            .iter()
            .map(|r| ReportRow {
                date: format_date(r.date(), options.offset),
                animal_id: r.animal_id().to_string(),
                weight_kg: format_weight(r.weight_kg()),
                delta_kg: format_delta(r.delta_kg),
            })
            .collect();

        Ok(ReportTable {
            title,
            generated_at,
            generated_label: format!(
                "Generated: {}",
                format_date_time(generated_at, options.offset)
            ),
            header: REPORT_HEADER,
            rows,
            footer: format!("{} • Weighing System", options.organization),
            file_stem,
        })
    }

    pub fn file_name(&self, format: ReportFormat) -> String {
        format!("{}.{}", self.file_stem, format.extension())
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.header)?;
        for row in &self.rows {
            wtr.write_record(row.cells())?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Plain list: title, generated line, header, one `a | b | c | d` per row
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&self.generated_label);
        out.push_str("\n\n");
        out.push_str("Date | ID | Weight (kg) | Δ (kg)\n");
        for row in &self.rows {
            out.push_str(row.cells().join(" | ").trim());
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.footer);
        out.push('\n');
        out
    }

    pub fn render<W: Write>(&self, format: ReportFormat, mut writer: W) -> Result<()> {
        match format {
            ReportFormat::Csv => self.write_csv(writer)?,
            ReportFormat::Text => writer.write_all(self.to_text().as_bytes())?,
            ReportFormat::Json => serde_json::to_writer_pretty(writer, self)?,
        }
        Ok(())
    }
}
