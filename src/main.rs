// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use weighing_ledger::config::DEFAULT_CONFIG_FILE;
use weighing_ledger::entry::parse_date_input;
use weighing_ledger::format::{format_date, format_delta, format_weight};
use weighing_ledger::{
    load_csv, AnnotatedRecord, Config, ReportFormat, WeighingEntry, WeighingLedger,
};

const LOG_FILE: &str = "weighing-ledger.log";

#[derive(Parser)]
#[command(name = "weighing-ledger", version)]
#[command(about = "Livestock weighings with per-animal weight deltas")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Data directory (overrides config file)
    #[arg(short, long, env = "WEIGHING_LEDGER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive terminal UI (default)
    Ui,
    /// Record a weighing
    Add {
        #[arg(short, long)]
        animal: String,
        /// Kilograms; a decimal comma is accepted
        #[arg(short, long)]
        weight: String,
        /// RFC 3339, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD` (local time); defaults to now
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete one weighing by id
    Delete { id: String },
    /// Delete every weighing
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// Weighings with deltas, by animal then date
    History {
        #[arg(short, long)]
        animal: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Latest weighing per animal
    Summary {
        #[arg(long)]
        json: bool,
    },
    /// Distinct animal ids
    Animals,
    /// Import weighings from a CSV file
    Import { csv: PathBuf },
    /// Write a report file
    Export {
        #[arg(short, long)]
        animal: Option<String>,
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Output directory (overrides config file)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Text,
    Json,
}

impl From<ExportFormat> for ReportFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Csv => ReportFormat::Csv,
            ExportFormat::Text => ReportFormat::Text,
            ExportFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = Some(data_dir);
    }

    let command = cli.command.unwrap_or(Command::Ui);
    init_tracing(&config, matches!(command, Command::Ui))?;

    info!(config = %cli.config.display(), "starting weighing-ledger");

    let mut ledger = WeighingLedger::from_config(&config)?;

    match command {
        Command::Ui => run_ui_mode(&mut ledger, &config)?,
        Command::Add { animal, weight, date } => {
            let mut entry = WeighingEntry::new(animal, weight);
            if let Some(raw) = date {
                entry = entry.at(parse_date_input(&raw, config.offset())?);
            }
            let record = ledger.add(&entry)?;
            println!(
                "✓ Recorded {} kg for {} on {}",
                format_weight(record.weight_kg),
                record.animal_id,
                format_date(record.date, config.offset())
            );
            println!("  id: {}", record.id);
        }
        Command::Delete { id } => {
            let label = ledger
                .get(&id)
                .map(|r| format!("{} ({})", r.animal_id, format_date(r.date, config.offset())));
            if ledger.delete(&id)? {
                println!("✓ Deleted weighing {}", label.unwrap_or(id));
            } else {
                println!("⚠️  No weighing with id {}", id);
            }
        }
        Command::Clear { yes } => {
            if !yes {
                bail!("refusing to delete every weighing without --yes");
            }
            let removed = ledger.clear_all()?;
            println!("✓ Deleted {} weighings", removed);
        }
        Command::History { animal, json } => {
            let rows = ledger.history(animal.as_deref());
            print_rows(&rows, json, &config)?;
        }
        Command::Summary { json } => {
            let rows = ledger.summary();
            print_rows(&rows, json, &config)?;
        }
        Command::Animals => {
            for id in ledger.animal_ids() {
                println!("{}", id);
            }
        }
        Command::Import { csv } => {
            println!("📂 Loading CSV...");
            let records = load_csv(&csv, config.offset())?;
            println!("✓ Read {} weighings from {}", records.len(), csv.display());

            let summary = ledger.import(records)?;
            println!("✓ Imported {} weighings", summary.inserted);
            if summary.duplicates > 0 {
                println!("✓ Duplicates skipped: {}", summary.duplicates);
            }
        }
        Command::Export { animal, format, out } => {
            let table = ledger.report(animal.as_deref(), &config.report_options())?;
            let dir = out.unwrap_or_else(|| config.output_dir());
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;

            let format = ReportFormat::from(format);
            let path = dir.join(table.file_name(format));
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            table.render(format, file)?;
            println!("✓ {} rows written to {}", table.rows.len(), path.display());
        }
    }

    Ok(())
}

/// RUST_LOG wins over the configured filter. The UI owns the terminal, so
/// its logs go to a file in the data dir instead of stderr.
fn init_tracing(config: &Config, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .context("Invalid logging filter")?;

    if to_file {
        let data_dir = config.data_dir();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;
        let log_path = data_dir.join(LOG_FILE);
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open {}", log_path.display()))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn print_rows(rows: &[AnnotatedRecord], json: bool, config: &Config) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No weighings recorded yet.");
        return Ok(());
    }

    let offset = config.offset();
    println!("{:<12} {:<20} {:>12} {:>12}", "Date", "Animal ID", "Weight (kg)", "Delta (kg)");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for r in rows {
        println!(
            "{:<12} {:<20} {:>12} {:>12}",
            format_date(r.date(), offset),
            r.animal_id(),
            format_weight(r.weight_kg()),
            format_delta(r.delta_kg)
        );
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(ledger: &mut WeighingLedger, config: &Config) -> Result<()> {
    println!("🖥️  Loading Weighing Ledger UI...\n");
    println!("✓ Loaded {} weighings", ledger.len());
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(ledger, config.report_options(), config.output_dir());
    ui::run_ui(&mut app)?;

    println!(
        "\n✅ UI closed at {}",
        weighing_ledger::format::format_date_time(chrono::Utc::now(), config.offset())
    );

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_ledger: &mut WeighingLedger, _config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the subcommands, see: weighing-ledger --help");
    std::process::exit(1);
}
