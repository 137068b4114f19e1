use crate::error::{BrowserError, Result};
use crate::summary::{ChartSpec, ValueCount};
use plotters::prelude::*;
use std::error::Error;
use std::io::Cursor;

/// Available chart shapes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphType {
    /// Horizontal bars, one per category, bar length = count
    HorizontalBar,

    /// Share of each category as a pie slice
    Pie,

    /// A single point at the origin, used when there is nothing to chart
    Placeholder,
}

/// Size of the rendered image
///
/// The chart title comes from the [`ChartSpec`].
#[derive(Clone, Copy, Debug)]
pub struct GraphOptions {
    /// Width of the graph in pixels
    pub width: u32,

    /// Height of the graph in pixels
    pub height: u32,
}

impl Default for GraphOptions {
    /// 800x400, the dashboard size
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
        }
    }
}

impl GraphOptions {
    /// 1600x800, the size embedded in the PDF report (800x400 at 2x)
    pub fn report() -> Self {
        Self {
            width: 1600,
            height: 800,
        }
    }

    fn font_scale(&self) -> f64 {
        (self.width as f64 / 800.0).max(0.5)
    }
}

const PALETTE: [RGBColor; 10] = [
    RGBColor(99, 110, 250),
    RGBColor(239, 85, 59),
    RGBColor(0, 204, 150),
    RGBColor(171, 99, 250),
    RGBColor(255, 161, 90),
    RGBColor(25, 211, 243),
    RGBColor(255, 102, 146),
    RGBColor(182, 232, 128),
    RGBColor(255, 151, 255),
    RGBColor(254, 203, 82),
];

/// Render a chart to PNG bytes
///
/// # Errors
/// * `BrowserError::Render` if drawing or encoding fails (e.g. no usable font)
///
/// # Examples
/// ```no_run
/// use jha_browser::graph::{render_png, GraphOptions};
/// use jha_browser::summary::ChartSpec;
///
/// match render_png(&ChartSpec::placeholder(), GraphOptions::default()) {
///     Ok(png) => println!("Chart rendered: {} bytes", png.len()),
///     Err(e) => eprintln!("{}", e),
/// }
/// ```
pub fn render_png(chart: &ChartSpec, options: GraphOptions) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; options.width as usize * options.height as usize * 3];

    let drawn = match chart.graph_type {
        GraphType::HorizontalBar => draw_horizontal_bars(&mut buffer, &chart.title, &chart.data, &options),
        GraphType::Pie => draw_pie(&mut buffer, &chart.title, &chart.data, &options),
        GraphType::Placeholder => draw_placeholder(&mut buffer, &chart.title, &options),
    };

    drawn
        .and_then(|_| encode_png(buffer, &options))
        .map_err(|e| BrowserError::Render(e.to_string()))
}

/// Draws one bar per category, first category at the top
fn draw_horizontal_bars(
    buffer: &mut [u8],
    title: &str,
    data: &[ValueCount],
    options: &GraphOptions,
) -> std::result::Result<(), Box<dyn Error>> {
    let scale = options.font_scale();
    let root = BitMapBackend::with_buffer(buffer, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    // plotters puts segment 0 at the bottom, so reverse to list the largest first
    let labels: Vec<String> = data.iter().rev().map(|vc| vc.value.clone()).collect();
    let n = labels.len().max(1) as u32;
    let max_count = data.iter().map(|vc| vc.count).max().unwrap_or(0) as u32;
    let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
    let label_area = (longest * 8.0 * scale).clamp(60.0 * scale, options.width as f64 / 3.0) as u32;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", (26.0 * scale) as u32).into_font())
        .margin((10.0 * scale) as u32)
        .x_label_area_size((40.0 * scale) as u32)
        .y_label_area_size(label_area)
        .build_cartesian_2d(0u32..max_count + 1, (0u32..n).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("count")
        .y_labels(labels.len().max(1))
        .label_style(("sans-serif", (14.0 * scale) as u32))
        .y_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(
        Histogram::horizontal(&chart)
            .style(PALETTE[0].filled())
            .margin((4.0 * scale) as u32)
            .data(
                data.iter()
                    .rev()
                    .enumerate()
                    .map(|(i, vc)| (i as u32, vc.count as u32)),
            ),
    )?;

    root.present()?;
    Ok(())
}

fn draw_pie(
    buffer: &mut [u8],
    title: &str,
    data: &[ValueCount],
    options: &GraphOptions,
) -> std::result::Result<(), Box<dyn Error>> {
    let scale = options.font_scale();
    let root = BitMapBackend::with_buffer(buffer, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(title, ("sans-serif", (26.0 * scale) as u32))?;

    let (w, h) = root.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = w.min(h) as f64 * 0.38;
    let sizes: Vec<f64> = data.iter().map(|vc| vc.count as f64).collect();
    let colors: Vec<RGBColor> = (0..data.len()).map(|i| PALETTE[i % PALETTE.len()]).collect();
    let labels: Vec<String> = data.iter().map(|vc| vc.value.clone()).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.label_style(("sans-serif", (14.0 * scale) as u32).into_font());
    pie.percentages(("sans-serif", (12.0 * scale) as u32).into_font().color(&WHITE));
    root.draw(&pie)?;

    root.present()?;
    Ok(())
}

fn draw_placeholder(
    buffer: &mut [u8],
    title: &str,
    options: &GraphOptions,
) -> std::result::Result<(), Box<dyn Error>> {
    let scale = options.font_scale();
    let root = BitMapBackend::with_buffer(buffer, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", (26.0 * scale) as u32).into_font())
        .margin((10.0 * scale) as u32)
        .x_label_area_size((30.0 * scale) as u32)
        .y_label_area_size((40.0 * scale) as u32)
        .build_cartesian_2d(-1f64..1f64, -1f64..1f64)?;

    chart.configure_mesh().draw()?;
    chart.draw_series(std::iter::once(Circle::new((0.0, 0.0), (5.0 * scale) as u32, PALETTE[0].filled())))?;

    root.present()?;
    Ok(())
}

fn encode_png(buffer: Vec<u8>, options: &GraphOptions) -> std::result::Result<Vec<u8>, Box<dyn Error>> {
    let image = image::RgbImage::from_raw(options.width, options.height, buffer)
        .ok_or("chart buffer does not match the image size")?;
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image).write_to(&mut out, image::ImageOutputFormat::Png)?;
    Ok(out.into_inner())
}
