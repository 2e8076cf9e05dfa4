//! training::plot — diagnostic plot of a training trajectory.
//!
//! Two stacked panels over the epoch axis, drawn with `plotters` on an
//! [`SVGBackend`]:
//! - top: `log10(loss)`;
//! - bottom: alpha, decay, rho and sw, each min-max rescaled to `[0, 1]`.
//!
//! An empty trajectory renders the axes with no data lines. Epochs with a
//! zero loss have no finite logarithm; they break the loss line and every
//! other epoch keeps its own x position.
use std::{fmt::Display, fs, path::Path};

use plotters::{coord::Shift, prelude::*};

use crate::training::{
    errors::{TrainError, TrainResult},
    metrics::TrainingMetrics,
};

const SIZE: (u32, u32) = (960, 640);
const LOSS_COLOR: RGBColor = BLUE;
const SERIES_COLORS: [RGBColor; 4] = [RED, GREEN, MAGENTA, CYAN];

/// Render `metrics` as an SVG document.
///
/// # Errors
/// [`TrainError::Plot`] if a value is not finite, a loss is negative, or the
/// backend fails.
pub fn render_svg(metrics: &TrainingMetrics) -> TrainResult<String> {
    if metrics.loss().iter().any(|l| !l.is_finite() || *l < 0.0) {
        return Err(TrainError::Plot {
            reason: "loss values must be finite and non-negative".to_string(),
        });
    }
    let series = [metrics.alpha(), metrics.decay(), metrics.rho(), metrics.sw()];
    if series.iter().any(|s| s.iter().any(|v| !v.is_finite())) {
        return Err(TrainError::Plot {
            reason: "hyperparameter values must be finite".to_string(),
        });
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;
        let (upper, lower) = root.split_vertically(SIZE.1 / 2);
        draw_loss(&upper, metrics)?;
        draw_hyperparameters(&lower, &series)?;
        root.present().map_err(plot_error)?;
    }
    Ok(svg)
}

/// Render `metrics` and write the SVG to `path`.
///
/// # Errors
/// Anything [`render_svg`] reports, or [`TrainError::Io`].
pub fn write_svg(metrics: &TrainingMetrics, path: &Path) -> TrainResult<()> {
    let svg = render_svg(metrics)?;
    fs::write(path, svg)
        .map_err(|e| TrainError::Io { path: path.display().to_string(), reason: e.to_string() })
}

/// `(epoch, log10 loss)` points, split into runs of finite values.
fn loss_segments(loss: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (epoch, value) in loss.iter().enumerate() {
        let log = value.log10();
        if log.is_finite() {
            current.push((epoch as f64, log));
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn draw_loss<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>, metrics: &TrainingMetrics,
) -> TrainResult<()> {
    let segments = loss_segments(metrics.loss());
    let (lo, hi) = padded_extent(segments.iter().flatten().map(|(_, y)| *y));

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption("log10 loss", ("sans-serif", 20))
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..epoch_span(metrics.len()), lo..hi)
        .map_err(plot_error)?;
    chart.configure_mesh().disable_mesh().y_desc("log10 loss").draw().map_err(plot_error)?;

    for segment in segments {
        chart
            .draw_series(LineSeries::new(segment, LOSS_COLOR.stroke_width(2)))
            .map_err(plot_error)?;
    }
    Ok(())
}

fn draw_hyperparameters<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>, series: &[&[f64]; 4],
) -> TrainResult<()> {
    let epochs = series[0].len();
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption("rescaled hyperparameters", ("sans-serif", 20))
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..epoch_span(epochs), -0.05..1.05)
        .map_err(plot_error)?;
    chart.configure_mesh().disable_mesh().x_desc("epoch").draw().map_err(plot_error)?;

    for ((values, name), color) in
        series.iter().zip(["alpha", "decay", "rho", "sw"]).zip(SERIES_COLORS)
    {
        if values.is_empty() {
            continue;
        }
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let points =
            values.iter().enumerate().map(|(epoch, v)| (epoch as f64, rescale(*v, lo, hi)));
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(plot_error)?
            .label(name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }
    if epochs > 0 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_error)?;
    }
    Ok(())
}

fn plot_error(err: impl Display) -> TrainError {
    TrainError::Plot { reason: err.to_string() }
}

fn epoch_span(epochs: usize) -> f64 {
    epochs.saturating_sub(1).max(1) as f64
}

/// Range of `values` with a margin; `(0, 1)` when there are none.
fn padded_extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { 0.05 * (hi - lo) } else { 0.5 };
    (lo - pad, hi + pad)
}

/// Position of `value` within `[lo, hi]`; a flat series sits at mid-height.
fn rescale(value: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo { (value - lo) / (hi - lo) } else { 0.5 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::metrics::EpochRecord;

    fn trajectory(losses: &[f64]) -> TrainingMetrics {
        let mut metrics = TrainingMetrics::new();
        for (k, loss) in losses.iter().enumerate() {
            let k = k as f64;
            metrics.push(EpochRecord {
                loss: *loss,
                alpha: 0.5 + 0.01 * k,
                decay: 0.01,
                rho: 1.0 - 0.02 * k,
                sw: 1.0 + 0.02 * k,
            });
        }
        metrics
    }

    #[test]
    // Purpose
    // -------
    // A short trajectory renders to an SVG document carrying both panel
    // captions and the legend, and is written to disk unchanged.
    //
    // Given
    // -----
    // - Three epochs of decreasing loss.
    //
    // Expect
    // ------
    // - An `<svg` document closed by `</svg>`; all names present; the file
    //   equals the rendered string.
    fn renders_and_writes_a_trajectory() {
        // Arrange
        let metrics = trajectory(&[0.1, 0.05, 0.01]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loss.svg");

        // Act
        let svg = render_svg(&metrics).unwrap();
        write_svg(&metrics, &path).unwrap();

        // Assert
        assert!(svg.contains("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        for name in ["log10 loss", "rescaled hyperparameters", "alpha", "decay", "rho", "sw"] {
            assert!(svg.contains(name), "missing {name}");
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), svg);
    }

    #[test]
    // Purpose
    // -------
    // Empty trajectories still produce a valid document; bad values do not.
    //
    // Given
    // -----
    // - No epochs; one epoch with a NaN loss; one with a negative loss.
    //
    // Expect
    // ------
    // - A closed SVG document; `Plot` errors for the bad inputs.
    fn empty_renders_and_bad_values_are_rejected() {
        // Arrange
        let nan = trajectory(&[f64::NAN]);
        let negative = trajectory(&[-0.1]);

        // Act
        let empty = render_svg(&TrainingMetrics::new()).unwrap();

        // Assert
        assert!(empty.contains("<svg"));
        assert!(empty.trim_end().ends_with("</svg>"));
        assert!(matches!(render_svg(&nan), Err(TrainError::Plot { .. })));
        assert!(matches!(render_svg(&negative), Err(TrainError::Plot { .. })));
    }

    #[test]
    // Purpose
    // -------
    // A zero loss has no finite logarithm. It must be left out of the loss
    // line without moving the later epochs onto earlier x positions.
    //
    // Given
    // -----
    // - Losses [0.0, 0.1, 0.01], and [0.1, 0.0, 0.01] with the zero inside.
    //
    // Expect
    // ------
    // - One segment [(1, -1), (2, -2)]; two segments [(0, -1)] and [(2, -2)];
    //   both trajectories render.
    fn zero_loss_keeps_epoch_positions() {
        // Act
        let leading = loss_segments(&[0.0, 0.1, 0.01]);
        let inner = loss_segments(&[0.1, 0.0, 0.01]);

        // Assert
        assert_eq!(leading.len(), 1);
        let xs: Vec<f64> = leading[0].iter().map(|(x, _)| *x).collect();
        assert_eq!(xs, vec![1.0, 2.0]);
        approx::assert_relative_eq!(leading[0][0].1, -1.0);
        approx::assert_relative_eq!(leading[0][1].1, -2.0);

        assert_eq!(inner.len(), 2);
        assert_eq!(inner[0].len(), 1);
        assert_eq!(inner[0][0].0, 0.0);
        assert_eq!(inner[1].len(), 1);
        assert_eq!(inner[1][0].0, 2.0);

        assert!(render_svg(&trajectory(&[0.0, 0.1, 0.01])).is_ok());
        assert!(render_svg(&trajectory(&[0.0, 0.0])).is_ok());
    }
}
