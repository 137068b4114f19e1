use crate::error::{BrowserError, Result};
use crate::loader::{DEFAULT_WORKBOOK, discover_workbook};
use clap::Args;
use std::path::PathBuf;

/// Options shared by the web server and the export tool
#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Workbook to open; when omitted, --dir is searched
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Directory searched for a workbook
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// File name preferred during the search
    #[arg(long, value_name = "NAME", default_value = DEFAULT_WORKBOOK)]
    pub default_name: String,

    /// Log filter, in env_logger syntax (e.g. "info" or "jha_browser=debug")
    #[arg(long, value_name = "FILTER", default_value = "info")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file: None,
            dir: PathBuf::from("."),
            default_name: DEFAULT_WORKBOOK.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Path of the workbook to open
    ///
    /// # Errors
    /// * `BrowserError::NotFound` if `--file` does not exist or the search finds nothing
    pub fn workbook_path(&self) -> Result<PathBuf> {
        match &self.file {
            Some(file) if file.is_file() => Ok(file.clone()),
            Some(file) => Err(BrowserError::NotFound {
                dir: file
                    .parent()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| self.dir.clone()),
                default_name: file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| self.default_name.clone()),
            }),
            None => discover_workbook(&self.dir, &self.default_name),
        }
    }

    /// Initialize env_logger from `--log-level`
    pub fn init_logging(&self) {
        env_logger::Builder::new()
            .parse_filters(&self.log_level)
            .format_timestamp_secs()
            .init();
    }
}
