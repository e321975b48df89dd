//! Chart rendering
//!
//! Draws evaluation comparison charts and the overall performance summary to
//! PNG files. Presentation only; nothing downstream reads these images.

use std::path::Path;

use image::{DynamicImage, RgbImage};
use serde::Serialize;

use crate::forecast::OverallSummary;

/// Response for chart-producing tools
#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub file_path: String,
    pub message: String,
}

fn write_png(buffer: Vec<u8>, width: u32, height: u32, out_path: &str) -> Result<(), String> {
    let img = RgbImage::from_raw(width, height, buffer)
        .ok_or("Failed to create image from buffer")?;

    let path = Path::new(out_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    DynamicImage::ImageRgb8(img)
        .save(path)
        .map_err(|e| e.to_string())
}

/// Render train/actual/predicted series for one metric evaluation.
/// The accuracy box mirrors the direction-classification score when present.
pub fn generate_evaluation_chart(
    metric_name: &str,
    train: &[f64],
    actual: &[f64],
    predicted: &[f64],
    accuracy: Option<f64>,
    out_path: &str,
    width: u32,
    height: u32,
) -> Result<ChartResponse, String> {
    use plotters::prelude::*;

    if train.is_empty() || actual.is_empty() {
        return Err("No data to chart".to_string());
    }

    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let total_len = train.len() + actual.len();
        let y_min = train
            .iter()
            .chain(actual)
            .chain(predicted)
            .cloned()
            .fold(f64::INFINITY, f64::min);
        let y_max = train
            .iter()
            .chain(actual)
            .chain(predicted)
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let pad = ((y_max - y_min) * 0.1).max(1.0);

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(
                format!("Metric Prediction: {}", metric_name),
                ("sans-serif", 22),
            )
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0..(total_len as i32), (y_min - pad)..(y_max + pad))
            .map_err(|e| e.to_string())?;

        chart
            .configure_mesh()
            .x_desc("Day Index")
            .y_desc(metric_name)
            .draw()
            .map_err(|e| e.to_string())?;

        // Training series
        let train_points: Vec<(i32, f64)> = train
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as i32, v))
            .collect();
        chart
            .draw_series(LineSeries::new(train_points, BLUE.stroke_width(2)))
            .map_err(|e| e.to_string())?
            .label("Train")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

        // Actual held-out values
        let actual_points: Vec<(i32, f64)> = actual
            .iter()
            .enumerate()
            .map(|(i, &v)| ((train.len() + i) as i32, v))
            .collect();
        chart
            .draw_series(LineSeries::new(
                actual_points.clone(),
                RGBColor(0, 176, 80).stroke_width(2),
            ))
            .map_err(|e| e.to_string())?
            .label("Actual")
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], RGBColor(0, 176, 80).stroke_width(2))
            });
        chart
            .draw_series(
                actual_points
                    .iter()
                    .map(|(x, y)| Circle::new((*x, *y), 3, RGBColor(0, 176, 80).filled())),
            )
            .map_err(|e| e.to_string())?;

        // Predicted values over the same positions
        let predicted_points: Vec<(i32, f64)> = predicted
            .iter()
            .enumerate()
            .map(|(i, &v)| ((train.len() + i) as i32, v))
            .collect();
        chart
            .draw_series(LineSeries::new(predicted_points.clone(), RED.stroke_width(2)))
            .map_err(|e| e.to_string())?
            .label("Predicted")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
        chart
            .draw_series(
                predicted_points
                    .iter()
                    .map(|(x, y)| Circle::new((*x, *y), 3, RED.filled())),
            )
            .map_err(|e| e.to_string())?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| e.to_string())?;

        // Direction accuracy in the upper-right corner
        if let Some(acc) = accuracy {
            root.draw(&Text::new(
                format!("Accuracy: {:.4}", acc),
                ((width as i32) - 180, 30),
                ("sans-serif", 16).into_font().color(&BLACK),
            ))
            .map_err(|e| e.to_string())?;
        }

        root.present().map_err(|e| e.to_string())?;
    }

    write_png(buffer, width, height, out_path)?;

    Ok(ChartResponse {
        file_path: out_path.to_string(),
        message: format!("Evaluation chart for {} saved", metric_name),
    })
}

/// Render the aggregated performance summary as a two-panel bar chart:
/// regression errors on the left, classification percentages on the right.
pub fn generate_overall_chart(
    summary: &OverallSummary,
    out_path: &str,
    width: u32,
    height: u32,
) -> Result<ChartResponse, String> {
    use plotters::prelude::*;

    let mut reg_bars: Vec<(&str, f64)> = Vec::new();
    if let Some(ref reg) = summary.regression {
        if let Some(mae) = reg.avg_mae {
            reg_bars.push(("MAE", mae));
        }
        if let Some(rmse) = reg.avg_rmse {
            reg_bars.push(("RMSE", rmse));
        }
    }

    let mut cls_bars: Vec<(&str, f64)> = Vec::new();
    if let Some(ref cls) = summary.classification {
        if let Some(acc) = cls.avg_accuracy {
            cls_bars.push(("Accuracy", acc * 100.0));
        }
        if let Some(prec) = cls.avg_precision {
            cls_bars.push(("Precision", prec * 100.0));
        }
        if let Some(rec) = cls.avg_recall {
            cls_bars.push(("Recall", rec * 100.0));
        }
        if let Some(f1) = cls.avg_f1 {
            cls_bars.push(("F1", f1 * 100.0));
        }
    }

    if reg_bars.is_empty() && cls_bars.is_empty() {
        return Err("No data to chart".to_string());
    }

    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        root.titled(
            &format!(
                "Overall Model Performance (metrics evaluated: {})",
                summary.metrics_evaluated
            ),
            ("sans-serif", 22),
        )
        .map_err(|e| e.to_string())?;

        let panels = root
            .margin(40, 10, 10, 10)
            .split_evenly((1, 2));

        draw_bar_panel(
            &panels[0],
            "Average Regression Errors",
            "Error",
            &reg_bars,
            &[RGBColor(76, 114, 176), RGBColor(85, 168, 104)],
        )?;
        draw_bar_panel(
            &panels[1],
            "Average Classification Metrics (%)",
            "Percent",
            &cls_bars,
            &[
                RGBColor(196, 78, 82),
                RGBColor(129, 114, 178),
                RGBColor(204, 185, 116),
                RGBColor(100, 181, 205),
            ],
        )?;

        root.present().map_err(|e| e.to_string())?;
    }

    write_png(buffer, width, height, out_path)?;

    Ok(ChartResponse {
        file_path: out_path.to_string(),
        message: format!(
            "Overall performance chart saved ({} metrics evaluated)",
            summary.metrics_evaluated
        ),
    })
}

fn draw_bar_panel(
    area: &plotters::drawing::DrawingArea<
        plotters::backend::BitMapBackend<'_>,
        plotters::coord::Shift,
    >,
    title: &str,
    y_desc: &str,
    bars: &[(&str, f64)],
    colors: &[plotters::style::RGBColor],
) -> Result<(), String> {
    use plotters::prelude::*;

    if bars.is_empty() {
        area.draw(&Text::new(
            "No data",
            (40, 40),
            ("sans-serif", 16).into_font().color(&BLACK),
        ))
        .map_err(|e| e.to_string())?;
        return Ok(());
    }

    let y_max = bars.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max) * 1.15;

    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .caption(title, ("sans-serif", 18))
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0..(bars.len() as i32), 0f64..y_max.max(1.0))
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len())
        .x_label_formatter(&|x| {
            if *x >= 0 && (*x as usize) < bars.len() {
                bars[*x as usize].0.to_string()
            } else {
                String::new()
            }
        })
        .y_desc(y_desc)
        .draw()
        .map_err(|e| e.to_string())?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
            let color = colors[i % colors.len()];
            Rectangle::new([(i as i32, 0.0), (i as i32 + 1, *value)], color.filled())
        }))
        .map_err(|e| e.to_string())?;

    Ok(())
}
