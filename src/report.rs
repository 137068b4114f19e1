//! PDF report of a filtered view
//!
//! A US-letter document with a title, one summary chart scaled to the page width and
//! a text dump of the first [`MAX_REPORT_ROWS`] rows. The text layout is computed by
//! [`layout_report`] and then drawn with printpdf, so the layout can be checked without
//! parsing PDF output.

use crate::error::{BrowserError, Result};
use crate::graph::{GraphOptions, render_png};
use crate::summary::ChartSpec;
use crate::table::Table;
use log::{info, warn};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Pt,
};

pub const PDF_FILE_NAME: &str = "jha_report.pdf";

/// Rows included in the text dump
pub const MAX_REPORT_ROWS: usize = 50;
/// Characters kept of each value
pub const MAX_VALUE_CHARS: usize = 80;
/// Characters per text line
pub const LINE_WIDTH: usize = 200;
pub const FIELD_SEPARATOR: &str = " | ";

// Page geometry in points
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 40.0;
const TITLE_SIZE: f32 = 16.0;
const TEXT_SIZE: f32 = 10.0;
const LINE_ADVANCE: f32 = 12.0;
const BOTTOM_LIMIT: f32 = 60.0;
const CHART_GAP: f32 = 20.0;

/// Title shown at the top of the report for `sheet`
pub fn report_title(sheet: &str) -> String {
    format!("JHA Report - {}", sheet)
}

/// One `column: value | column: value ...` string per row, first 50 rows only
pub fn report_rows(table: &Table) -> Vec<String> {
    table
        .rows()
        .iter()
        .take(MAX_REPORT_ROWS)
        .map(|row| {
            table
                .columns()
                .iter()
                .zip(row)
                .map(|(column, cell)| {
                    let value = cell.as_text().unwrap_or_default();
                    format!("{}: {}", column, truncate_chars(&value, MAX_VALUE_CHARS))
                })
                .collect::<Vec<_>>()
                .join(FIELD_SEPARATOR)
        })
        .collect()
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Splits `text` into chunks of at most `width` characters
fn wrap_chars(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// A text line placed on a page, `y` measured in points from the bottom edge
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub y: f32,
    pub text: String,
}

/// Where the chart goes on the first page
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartPlacement {
    pub x: f32,
    /// Bottom edge of the image
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

/// Position of every element of the report
#[derive(Clone, Debug, PartialEq)]
pub struct ReportLayout {
    pub title: String,
    pub chart: Option<ChartPlacement>,
    /// Text lines per page; the first page always exists
    pub pages: Vec<Vec<TextLine>>,
}

impl ReportLayout {
    pub fn text_lines(&self) -> impl Iterator<Item = &TextLine> {
        self.pages.iter().flatten()
    }
}

/// Lay out the report for a chart of `chart_size` pixels (if any) and the rows of `table`
pub fn layout_report(title: &str, chart_size: Option<(u32, u32)>, table: &Table) -> ReportLayout {
    let mut y = PAGE_HEIGHT - 70.0;

    let chart = chart_size.map(|(w, h)| {
        let scale = ((PAGE_WIDTH - 2.0 * MARGIN) / w as f32).min(1.0);
        let width = w as f32 * scale;
        let height = h as f32 * scale;
        let placement = ChartPlacement {
            x: MARGIN,
            y: y - height,
            width,
            height,
            scale,
        };
        y -= height + CHART_GAP;
        placement
    });

    let mut pages: Vec<Vec<TextLine>> = vec![Vec::new()];
    for row in report_rows(table) {
        for text in wrap_chars(&row, LINE_WIDTH) {
            if y < BOTTOM_LIMIT {
                pages.push(Vec::new());
                y = PAGE_HEIGHT - MARGIN;
            }
            if let Some(page) = pages.last_mut() {
                page.push(TextLine { y, text });
            }
            y -= LINE_ADVANCE;
        }
    }

    ReportLayout {
        title: title.to_string(),
        chart,
        pages,
    }
}

/// Build the PDF report for a filtered table
///
/// The chart is rendered first; if that fails the report is produced without it.
///
/// # Arguments
/// * `title` - Title line at the top of the first page
/// * `chart` - Chart to embed
/// * `table` - Filtered rows
///
/// # Returns
/// * `Result<Vec<u8>>` - PDF file content
pub fn build_pdf(title: &str, chart: &ChartSpec, table: &Table) -> Result<Vec<u8>> {
    let png = match render_png(chart, GraphOptions::report()) {
        Ok(png) => Some(png),
        Err(e) => {
            warn!("Omitting chart from PDF report: {}", e);
            None
        }
    };
    write_pdf(title, png.as_deref(), table)
}

/// Assemble the PDF from already rendered PNG bytes
///
/// A PNG that cannot be decoded is omitted the same way as a failed render.
pub fn write_pdf(title: &str, chart_png: Option<&[u8]>, table: &Table) -> Result<Vec<u8>> {
    let chart_image = chart_png.and_then(|bytes| match printpdf::image_crate::load_from_memory(bytes) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!("Omitting undecodable chart from PDF report: {}", e);
            None
        }
    });
    let chart_size = chart_image.as_ref().map(|img| (img.width(), img.height()));
    let layout = layout_report(title, chart_size, table);

    let (doc, page, layer) = PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;

    let mut current = doc.get_page(page).get_layer(layer);
    current.use_text(&layout.title, TITLE_SIZE, mm(MARGIN), mm(PAGE_HEIGHT - MARGIN), &bold);

    if let (Some(image), Some(placement)) = (chart_image, layout.chart) {
        Image::from_dynamic_image(&image).add_to_layer(
            current.clone(),
            ImageTransform {
                translate_x: Some(mm(placement.x)),
                translate_y: Some(mm(placement.y)),
                scale_x: Some(placement.scale),
                scale_y: Some(placement.scale),
                // one pixel per point before scaling
                dpi: Some(72.0),
                ..Default::default()
            },
        );
    }

    for (i, lines) in layout.pages.iter().enumerate() {
        if i > 0 {
            let (page, layer) = doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
            current = doc.get_page(page).get_layer(layer);
        }
        draw_lines(&current, lines, &regular);
    }

    let bytes = doc.save_to_bytes().map_err(pdf_error)?;
    info!(
        "PDF export: {} text line(s) on {} page(s), {} bytes",
        layout.text_lines().count(),
        layout.pages.len(),
        bytes.len()
    );
    Ok(bytes)
}

fn draw_lines(layer: &PdfLayerReference, lines: &[TextLine], font: &IndirectFontRef) {
    for line in lines {
        layer.use_text(line.text.as_str(), TEXT_SIZE, mm(MARGIN), mm(line.y), font);
    }
}

fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

fn pdf_error(e: printpdf::Error) -> BrowserError {
    BrowserError::Pdf(format!("{:?}", e))
}
