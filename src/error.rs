use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, filtering or exporting a workbook.
#[derive(Error, Debug)]
pub enum BrowserError {
    /// No workbook could be located. Fatal for the whole session.
    #[error(
        "No Excel file found in '{}'. Please place your Excel file (e.g., '{default_name}') in the same folder as this app.",
        dir.display()
    )]
    NotFound { dir: PathBuf, default_name: String },

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook read error: {0}")]
    Read(#[from] calamine::Error),

    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Chart rasterization failed. Recovered locally by the PDF export.
    #[error("Chart rendering failed: {0}")]
    Render(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    /// A blocking job of the web server panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, BrowserError>;
