//! Scatter chart rendering with plotters: inline SVG for the page and SVG files for export.

use color_eyre::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Serialize;
use std::path::Path;

use crate::config::ChartConfig;
use crate::dataset::BoundDataset;

/// Rendering options for the scatter chart.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub point_size: u32,
    pub point_color: (u8, u8, u8),
    pub x_label: String,
    pub y_label: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        (&ChartConfig::default()).into()
    }
}

impl From<&ChartConfig> for ChartOptions {
    fn from(config: &ChartConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            point_size: config.point_size,
            point_color: config.point_rgb(),
            x_label: config.x_label.clone(),
            y_label: config.y_label.clone(),
        }
    }
}

/// Value ranges of both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRanges {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Ranges used when a dataset has no plottable points (ratings out of 10 and 100).
const EMPTY_RANGES: AxisRanges = AxisRanges {
    x_min: 0.0,
    x_max: 10.0,
    y_min: 0.0,
    y_max: 100.0,
};

fn padded(min: f64, max: f64) -> (f64, f64) {
    let span = max - min;
    let pad = if span > 0.0 { span * 0.05 } else { 1.0 };
    (min - pad, max + pad)
}

impl AxisRanges {
    /// Padded bounds of every plottable point. Computed once from the full dataset so
    /// filtered redraws keep the same frame.
    pub fn from_dataset(dataset: &BoundDataset) -> Self {
        let points = dataset.points();
        if points.is_empty() {
            return EMPTY_RANGES;
        }
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for (x, y) in points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        let (x_min, x_max) = padded(x_min, x_max);
        let (y_min, y_max) = padded(y_min, y_max);
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }
}

/// Where the plotting area landed in pixels, plus the value ranges it maps.
/// The page script uses this to place points exactly where plotters would.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotFrame {
    pub ranges: AxisRanges,
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    pub point_size: u32,
}

/// Rendered SVG document and its plot frame.
#[derive(Debug, Clone)]
pub struct ScatterSvg {
    pub svg: String,
    pub frame: PlotFrame,
}

/// Format an axis tick: integers without decimals, everything else with one.
pub fn format_axis_label(v: f64) -> String {
    if v.fract().abs() < 1e-9 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}

fn draw_scatter<DB>(
    root: &DrawingArea<DB, Shift>,
    dataset: &BoundDataset,
    opts: &ChartOptions,
    ranges: AxisRanges,
) -> Result<PlotFrame>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(ranges.x_min..ranges.x_max, ranges.y_min..ranges.y_max)?;

    chart
        .configure_mesh()
        .x_desc(opts.x_label.as_str())
        .y_desc(opts.y_label.as_str())
        .x_label_formatter(&|v| format_axis_label(*v))
        .y_label_formatter(&|v| format_axis_label(*v))
        .draw()?;

    let (r, g, b) = opts.point_color;
    let color = RGBColor(r, g, b);
    let size = opts.point_size;
    chart.draw_series(
        dataset
            .points()
            .into_iter()
            .map(|p| Circle::new(p, size, color.filled())),
    )?;

    let (x_px, y_px) = chart.plotting_area().get_pixel_range();
    root.present()?;

    Ok(PlotFrame {
        ranges,
        left: x_px.start,
        right: x_px.end,
        top: y_px.start,
        bottom: y_px.end,
        point_size: size,
    })
}

/// Render the chart as an SVG document held in memory.
pub fn render_scatter_svg(
    dataset: &BoundDataset,
    opts: &ChartOptions,
    ranges: AxisRanges,
) -> Result<ScatterSvg> {
    let mut svg = String::new();
    let frame = {
        let root = SVGBackend::with_string(&mut svg, (opts.width, opts.height)).into_drawing_area();
        draw_scatter(&root, dataset, opts, ranges)?
    };
    Ok(ScatterSvg { svg, frame })
}

/// Write chart to an SVG file.
pub fn write_scatter_svg(
    path: &Path,
    dataset: &BoundDataset,
    opts: &ChartOptions,
    ranges: AxisRanges,
) -> Result<()> {
    let root = SVGBackend::new(path, (opts.width, opts.height)).into_drawing_area();
    draw_scatter(&root, dataset, opts, ranges)?;
    Ok(())
}

/// Export the chart to `path`. Errors when nothing would be plotted.
pub fn export_chart(
    path: &Path,
    dataset: &BoundDataset,
    opts: &ChartOptions,
    ranges: AxisRanges,
) -> Result<()> {
    if dataset.points().is_empty() {
        return Err(color_eyre::eyre::eyre!("No data to export"));
    }
    write_scatter_svg(path, dataset, opts, ranges)
}
