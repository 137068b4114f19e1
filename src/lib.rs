/*!
# JHA Browser

A browser-based viewer for Job Hazard Analysis (JHA) workbooks, built in Rust.

## Overview

The application loads every sheet of a workbook, lets the user filter and search the
rows of one sheet, shows sheet-wide summary charts and exports the filtered rows as
CSV, XLSX or a PDF report.

## Architecture

### Data pipeline (library)
- **Workbook Loader** (`loader`, `cache`) - finds and reads the workbook once per path,
  trims headers and forward-fills the division column of each sheet
- **Column Classifier** (`classify`) - binds the division, risk, hazard and control
  columns by ordered, replaceable keyword rules
- **Filter Engine** (`filter`) - division, risk and free-text filters applied in order
- **Chart Builder** (`summary`, `graph`) - value counts, hazard × control cross-tab and
  PNG rendering of the charts
- **Export Builder** (`downloader`, `report`) - CSV, single-sheet XLSX and PDF report

### Web layer (feature `web`)
- **app** - axum routes serving the page and a JSON API; every interaction derives its
  own filtered view from the shared, read-only cached workbook

## REST API Endpoints

- `/api/sheets` - Workbook name and sheet names
- `/api/view` - Filtered rows, counts and selector options
- `/api/row` - Row detail for one filtered row
- `/api/dashboard` - Sheet-wide counts and cross-tab
- `/api/chart/{division|risk}` - Dashboard chart as PNG
- `/api/export/{csv|xlsx|pdf}` - Downloads of the filtered view
*/

#[cfg(feature = "web")]
pub mod app;
pub mod cache;
pub mod classify;
pub mod config;
pub mod downloader;
pub mod error;
pub mod filter;
pub mod graph;
pub mod loader;
pub mod report;
pub mod summary;
pub mod table;
pub mod view;

pub use error::{BrowserError, Result};
pub use table::{CellValue, Sheet, Table, Workbook};
