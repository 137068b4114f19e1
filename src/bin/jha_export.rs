use clap::{Parser, ValueEnum};
use jha_browser::cache::WorkbookCache;
use jha_browser::config::Config;
use jha_browser::downloader::{CSV_FILE_NAME, XLSX_FILE_NAME};
use jha_browser::error::Result;
use jha_browser::report::PDF_FILE_NAME;
use jha_browser::view::{ViewQuery, resolve};
use log::info;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Xlsx,
    Pdf,
}

impl Format {
    fn default_file_name(self) -> &'static str {
        match self {
            Format::Csv => CSV_FILE_NAME,
            Format::Xlsx => XLSX_FILE_NAME,
            Format::Pdf => PDF_FILE_NAME,
        }
    }
}

/// Export a filtered view of a JHA workbook without starting the web server
#[derive(Parser, Debug)]
#[command(name = "jha-export", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Sheet to export (default: first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Division to keep, or "All"
    #[arg(long)]
    division: Option<String>,

    /// Risk level to keep, or "All"
    #[arg(long)]
    risk: Option<String>,

    /// Case-insensitive text that must appear in some column
    #[arg(long)]
    query: Option<String>,

    #[arg(long, value_enum, default_value = "csv")]
    format: Format,

    /// Output file (default: jha_filtered.csv, jha_filtered.xlsx or jha_report.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn export(cli: &Cli) -> Result<PathBuf> {
    let path = cli.config.workbook_path()?;
    let cache = WorkbookCache::default();
    let workbook = cache.get(&path)?;

    let query = ViewQuery {
        sheet: cli.sheet.clone(),
        division: cli.division.clone(),
        risk: cli.risk.clone(),
        q: cli.query.clone(),
        row: None,
    };
    let view = resolve(&workbook, cache.loader().classifier(), &query)?;

    let bytes = match cli.format {
        Format::Csv => view.csv()?,
        Format::Xlsx => view.xlsx()?,
        Format::Pdf => view.pdf()?,
    };

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(cli.format.default_file_name()));
    std::fs::write(&output, bytes)?;
    info!(
        "Exported {} of {} row(s) from '{}'",
        view.filtered.len(),
        view.table.len(),
        view.criteria.sheet
    );
    Ok(output)
}

fn main() {
    let cli = Cli::parse();
    cli.config.init_logging();

    match export(&cli) {
        Ok(output) => println!("✓ Wrote {}", output.display()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
