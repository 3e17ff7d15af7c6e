//! Chart functions - three-bar estimate comparison rendered to PNG
//!
//! Geometry is computed first ([`layout`]) and rasterised second
//! ([`rasterize`]) so bar order, heights and labels can be checked without
//! decoding pixels. Text uses the embedded 8x8 bitmap font, so rendering does
//! not depend on fonts installed on the host.

use crate::error::Result;
use crate::pipeline::parse::extract_plot_values;
use crate::pipeline::types::{ChartArtifact, EstimateKind, EstimateTable, PlotValues};
use crate::pipeline::utils::format_usd;
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{ImageFormat, Rgb, RgbImage};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

pub const WIDTH: u32 = 600;
pub const HEIGHT: u32 = 500;

pub const SKYBLUE: Rgb<u8> = Rgb([135, 206, 235]);
pub const LIGHTCORAL: Rgb<u8> = Rgb([240, 128, 128]);
pub const LIGHTGREEN: Rgb<u8> = Rgb([144, 238, 144]);

/// Bar colours in bar order [estimate, low, high]
pub const BAR_COLORS: [Rgb<u8>; 3] = [SKYBLUE, LIGHTCORAL, LIGHTGREEN];

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const GREY: Rgb<u8> = Rgb([90, 90, 90]);

/// y-axis top as a multiple of the tallest bar, leaves room for value labels
const HEADROOM: f64 = 1.15;
/// Bar width as a fraction of its category slot
const BAR_FILL: f64 = 0.8;
const GLYPH: u32 = 8;
const Y_TICKS: u32 = 4;
/// Vertical distance between wrapped title lines at scale 1
const LINE_STEP: u32 = 12;
const TITLE_TOP: u32 = 15;
/// Widest text line the canvas holds, in pixels
const TEXT_SPAN: u32 = WIDTH - 20;
/// Gap between a tick label and the y-axis
const TICK_GAP: u32 = 8;

/// Plot area in pixels; `bottom` is the x-axis row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotArea {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl PlotArea {
    /// Plot area leaving room for `title_lines` lines of title and tick
    /// labels up to `tick_label_width` pixels wide
    fn fitted(title_lines: u32, tick_label_width: u32) -> Self {
        PlotArea {
            left: (tick_label_width + TICK_GAP + 10).max(90),
            top: 60 + LINE_STEP * title_lines.saturating_sub(1),
            right: WIDTH - 20,
            bottom: HEIGHT - 50,
        }
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: &'static str,
    pub value: Option<f64>,
    /// Currency text drawn above the bar; `None` for gaps
    pub value_label: Option<String>,
    pub color: Rgb<u8>,
    pub x: u32,
    pub width: u32,
    /// Bar height in pixels, 0 for gaps
    pub height: u32,
}

impl Bar {
    pub fn center_x(&self) -> u32 {
        self.x + self.width / 2
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub title: String,
    /// Title as drawn: one line at `title_scale`, or word-wrapped at scale 1
    pub title_lines: Vec<String>,
    pub title_scale: u32,
    pub y_label: &'static str,
    pub y_max: f64,
    pub plot: PlotArea,
    pub bars: Vec<Bar>,
    /// (pixel row, label) per y-axis tick, bottom to top
    pub ticks: Vec<(u32, String)>,
}

/// Compute chart geometry for one set of plot values
pub fn layout(values: &PlotValues, kind: EstimateKind, label: &str) -> ChartLayout {
    let bar_values = values.in_bar_order();

    let tallest = bar_values
        .iter()
        .flatten()
        .copied()
        .fold(0.0_f64, f64::max);
    let y_max = if tallest > 0.0 { tallest * HEADROOM } else { 1.0 };

    let title = kind.chart_title(label);
    let (title_scale, title_lines) = if text_width(&title, 2) <= TEXT_SPAN {
        (2, vec![title.clone()])
    } else {
        (1, wrap_text(&title, (TEXT_SPAN / GLYPH) as usize))
    };

    let tick_amounts: Vec<f64> = (0..=Y_TICKS)
        .map(|k| y_max * k as f64 / Y_TICKS as f64)
        .collect();
    let tick_labels: Vec<String> = tick_amounts.iter().map(|a| format_usd(*a)).collect();
    let widest_tick = tick_labels
        .iter()
        .map(|t| text_width(t, 1))
        .max()
        .unwrap_or(0);

    let plot = PlotArea::fitted(title_lines.len() as u32, widest_tick);

    let slot = plot.width() / 3;
    let bar_width = (slot as f64 * BAR_FILL).round() as u32;

    let bars = kind
        .bar_labels()
        .into_iter()
        .zip(bar_values)
        .zip(BAR_COLORS)
        .enumerate()
        .map(|(i, ((bar_label, value), color))| {
            let height = value
                .map(|v| scale_to_pixels(v, y_max, plot.height()))
                .unwrap_or(0);

            Bar {
                label: bar_label,
                value,
                value_label: value.map(format_usd),
                color,
                x: plot.left + i as u32 * slot + (slot - bar_width) / 2,
                width: bar_width,
                height,
            }
        })
        .collect();

    let ticks = tick_amounts
        .into_iter()
        .zip(tick_labels)
        .map(|(amount, text)| {
            let row = plot.bottom - scale_to_pixels(amount, y_max, plot.height());
            (row, text)
        })
        .collect();

    ChartLayout {
        title,
        title_lines,
        title_scale,
        y_label: kind.y_axis_label(),
        y_max,
        plot,
        bars,
        ticks,
    }
}

fn scale_to_pixels(value: f64, y_max: f64, span: u32) -> u32 {
    let px = (value / y_max * span as f64).round();
    px.clamp(0.0, span as f64) as u32
}

/// Draw a layout onto a white canvas
pub fn rasterize(layout: &ChartLayout) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, WHITE);
    let plot = layout.plot;

    for (i, line) in layout.title_lines.iter().enumerate() {
        let y = TITLE_TOP + i as u32 * LINE_STEP;
        draw_text_centered(&mut img, line, WIDTH / 2, y as i64, layout.title_scale, BLACK);
    }

    draw_text(&mut img, layout.y_label, 10, plot.top as i64 - 20, 1, BLACK);

    for bar in &layout.bars {
        if bar.height > 0 {
            fill_rect(
                &mut img,
                bar.x,
                plot.bottom - bar.height,
                bar.width,
                bar.height,
                bar.color,
            );
        }

        if let Some(text) = &bar.value_label {
            let top = (plot.bottom - bar.height) as i64;
            draw_text_centered(&mut img, text, bar.center_x(), top - 12, 1, BLACK);
        }

        draw_text_centered(&mut img, bar.label, bar.center_x(), plot.bottom as i64 + 12, 1, BLACK);
    }

    for (row, text) in &layout.ticks {
        fill_rect(&mut img, plot.left - 5, *row, 5, 1, GREY);
        let x = plot.left as i64 - TICK_GAP as i64 - text_width(text, 1) as i64;
        draw_text(&mut img, text, x, *row as i64 - 4, 1, GREY);
    }

    // Axes last so bars never cover them
    fill_rect(&mut img, plot.left, plot.top, 1, plot.height() + 1, BLACK);
    fill_rect(&mut img, plot.left, plot.bottom, plot.width() + 1, 1, BLACK);

    img
}

/// Encode an image as PNG bytes
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Render the comparison chart for a table
///
/// Returns the empty artifact when the table is empty or has no point
/// estimate; that is a normal outcome, not an error.
pub fn render_chart(table: &EstimateTable, kind: EstimateKind, label: &str) -> Result<ChartArtifact> {
    let values = match extract_plot_values(table, kind) {
        Some(values) => values,
        None => {
            debug!("No '{}' field, skipping chart", kind.estimate_field());
            return Ok(ChartArtifact::none());
        }
    };

    let chart_layout = layout(&values, kind, label);
    let bytes = encode_png(&rasterize(&chart_layout))?;
    debug!("Rendered {} chart ({} bytes)", kind.noun(), bytes.len());

    Ok(ChartArtifact(bytes))
}

/// Write a chart to disk, replacing any existing file
pub fn write_chart(chart: &ChartArtifact, path: &Path) -> Result<()> {
    fs::write(path, chart.as_bytes())?;
    info!("Saved chart to {:?}", path);
    Ok(())
}

fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH * scale
}

/// Greedy word wrap to lines of at most `max_chars`; words longer than a
/// line are split
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > max_chars {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            lines.push(word.drain(..max_chars).collect());
        }

        let line_len = line.chars().count();
        if line_len > 0 && line_len + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.extend(word);
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }

    lines
}

/// 8x8 glyph for a character: ASCII, then Latin-1, then '?'
fn glyph(ch: char) -> Option<[u8; 8]> {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
}

fn draw_text_centered(img: &mut RgbImage, text: &str, center_x: u32, y: i64, scale: u32, color: Rgb<u8>) {
    let x = center_x as i64 - text_width(text, scale) as i64 / 2;
    draw_text(img, text, x, y, scale, color);
}

fn draw_text(img: &mut RgbImage, text: &str, x: i64, y: i64, scale: u32, color: Rgb<u8>) {
    let step = (GLYPH * scale) as i64;

    for (i, ch) in text.chars().enumerate() {
        let bitmap = match glyph(ch) {
            Some(bitmap) => bitmap,
            None => continue,
        };
        let origin_x = x + i as i64 * step;

        for (row, bits) in bitmap.iter().enumerate() {
            for col in 0..GLYPH {
                if bits & (1u8 << col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = origin_x + (col * scale + dx) as i64;
                        let py = y + (row as u32 * scale + dy) as i64;
                        put_pixel_clipped(img, px, py, color);
                    }
                }
            }
        }
    }
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    for py in y..y.saturating_add(height) {
        for px in x..x.saturating_add(width) {
            put_pixel_clipped(img, px as i64, py as i64, color);
        }
    }
}

fn put_pixel_clipped(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}
