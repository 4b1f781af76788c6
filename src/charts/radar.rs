//! Radar Chart Module
//! Renders one closed polar line-and-fill chart per record to a PNG image.

use std::f64::consts::TAU;
use std::path::{Path, PathBuf};

use image::RgbImage;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;
use tracing::{debug, warn};

use crate::color::{generate_colors, ChartColor};
use crate::data::{Record, ScoreTable, RADAR_AXES};
use crate::output::{self, OutputError};

/// Upper bound of the displayed radius; scores outside [0, RADAR_MAX] are
/// clamped for drawing, never rejected.
pub const RADAR_MAX: f64 = 5.0;

const IMAGE_SIZE: (u32, u32) = (800, 800);
// Half-extent of the drawing plane in unit-circle coordinates; leaves room
// for axis labels outside the outer grid ring.
const PLANE_EXTENT: f64 = 1.45;
const GRID_RINGS: u32 = 5;
const GRID_COLOR: RGBColor = RGBColor(180, 180, 180);

#[derive(Error, Debug)]
pub enum RadarError {
    #[error("failed to draw chart: {0}")]
    Draw(String),
    #[error("rendered buffer has unexpected size")]
    BufferSize,
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Angular positions for `axes` axes at uniform spacing starting at angle 0,
/// plus the closing point repeating the first angle.
pub fn closed_angles(axes: usize) -> Vec<f64> {
    let mut angles: Vec<f64> = (0..axes)
        .map(|i| i as f64 * TAU / axes as f64)
        .collect();
    if let Some(&first) = angles.first() {
        angles.push(first);
    }
    angles
}

/// Score sequence clamped to the displayable range and closed by repeating
/// the first value.
pub fn closed_values(values: &[f64]) -> Vec<f64> {
    let mut closed: Vec<f64> = values.iter().map(|v| v.clamp(0.0, RADAR_MAX)).collect();
    if let Some(&first) = closed.first() {
        closed.push(first);
    }
    closed
}

/// Render radar charts for every record in the table, one PNG each.
/// A failure for one record is logged and skipped; returns the number of
/// charts written.
pub fn render_charts(table: &ScoreTable, out_dir: &Path) -> usize {
    let colors = generate_colors(table.len(), 0.7, 0.9);

    let mut rendered = 0;
    for (record, color) in table.records().iter().zip(&colors) {
        match render_chart(record, color, out_dir) {
            Ok(path) => {
                debug!(label = %record.label, path = %path.display(), "radar chart written");
                rendered += 1;
            }
            Err(err) => {
                warn!(label = %record.label, error = %err, "skipping radar chart");
            }
        }
    }

    if rendered < table.len() {
        warn!(
            failed = table.len() - rendered,
            total = table.len(),
            "some radar charts were not rendered"
        );
    }
    rendered
}

/// Render a single record's radar chart and atomically write it as
/// `radar_<sanitized label>.png` under `out_dir`.
pub fn render_chart(
    record: &Record,
    color: &ChartColor,
    out_dir: &Path,
) -> Result<PathBuf, RadarError> {
    let filename = format!("radar_{}.png", output::sanitize_label(&record.label));
    let path = out_dir.join(filename);

    let mut buffer = vec![0u8; (IMAGE_SIZE.0 * IMAGE_SIZE.1 * 3) as usize];
    draw_chart(record, color, &mut buffer)?;

    let image =
        RgbImage::from_raw(IMAGE_SIZE.0, IMAGE_SIZE.1, buffer).ok_or(RadarError::BufferSize)?;
    output::write_png_atomic(&path, &image)?;
    Ok(path)
}

fn draw_chart(record: &Record, color: &ChartColor, buffer: &mut [u8]) -> Result<(), RadarError> {
    let root = BitMapBackend::with_buffer(buffer, IMAGE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Radar: {}", record.label), ("sans-serif", 30))
        .margin(20)
        .build_cartesian_2d(-PLANE_EXTENT..PLANE_EXTENT, -PLANE_EXTENT..PLANE_EXTENT)
        .map_err(draw_err)?;

    let angles = closed_angles(RADAR_AXES.len());
    let spokes = &angles[..RADAR_AXES.len()];

    // Concentric grid rings with their score labels.
    let tick_style = TextStyle::from(("sans-serif", 14)).color(&GRID_COLOR);
    for ring in 1..=GRID_RINGS {
        let radius = ring as f64 / GRID_RINGS as f64;
        chart
            .draw_series(std::iter::once(PathElement::new(
                ring_points(radius),
                GRID_COLOR,
            )))
            .map_err(draw_err)?;
        chart
            .draw_series(std::iter::once(Text::new(
                ring.to_string(),
                (0.03, radius + 0.02),
                tick_style.clone(),
            )))
            .map_err(draw_err)?;
    }

    // Radial spokes and axis labels.
    let label_style =
        TextStyle::from(("sans-serif", 18)).pos(Pos::new(HPos::Center, VPos::Center));
    for (&angle, axis) in spokes.iter().zip(RADAR_AXES.iter()) {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(0.0, 0.0), (angle.cos(), angle.sin())],
                GRID_COLOR,
            )))
            .map_err(draw_err)?;
        chart
            .draw_series(std::iter::once(Text::new(
                axis.to_string(),
                (1.22 * angle.cos(), 1.22 * angle.sin()),
                label_style.clone(),
            )))
            .map_err(draw_err)?;
    }

    // Closed score polygon: fill, outline, vertex markers.
    let values = closed_values(&record.radar);
    let points: Vec<(f64, f64)> = angles
        .iter()
        .zip(values.iter())
        .map(|(&angle, &value)| {
            let radius = value / RADAR_MAX;
            (radius * angle.cos(), radius * angle.sin())
        })
        .collect();

    let line_color = color.to_plotters();
    chart
        .draw_series(std::iter::once(Polygon::new(
            points.clone(),
            line_color.mix(0.25),
        )))
        .map_err(draw_err)?;
    chart
        .draw_series(std::iter::once(PathElement::new(
            points.clone(),
            line_color.stroke_width(2),
        )))
        .map_err(draw_err)?;
    chart
        .draw_series(
            points
                .iter()
                .take(points.len().saturating_sub(1))
                .map(|&p| Circle::new(p, 4, line_color.filled())),
        )
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}

fn ring_points(radius: f64) -> Vec<(f64, f64)> {
    const SEGMENTS: usize = 100;
    (0..=SEGMENTS)
        .map(|i| {
            let t = i as f64 * TAU / SEGMENTS as f64;
            (radius * t.cos(), radius * t.sin())
        })
        .collect()
}

fn draw_err<E: std::error::Error>(err: E) -> RadarError {
    RadarError::Draw(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_count_is_axis_count_plus_one() {
        let angles = closed_angles(5);
        assert_eq!(angles.len(), 6);
        assert_eq!(angles[0], angles[5]);

        let spacing = TAU / 5.0;
        for (i, window) in angles[..5].windows(2).enumerate() {
            let step = window[1] - window[0];
            assert!(
                (step - spacing).abs() < 1e-12,
                "uneven spacing at axis {i}: {step}"
            );
        }
    }

    #[test]
    fn test_zero_axes_yield_no_angles() {
        assert!(closed_angles(0).is_empty());
    }

    #[test]
    fn test_values_are_closed() {
        let closed = closed_values(&[3.0, 4.0, 2.0, 5.0, 1.0]);
        assert_eq!(closed.len(), 6);
        assert_eq!(closed.first(), closed.last());
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let closed = closed_values(&[7.5, -2.0, 4.0]);
        assert_eq!(closed[..3], [RADAR_MAX, 0.0, 4.0]);
    }
}
