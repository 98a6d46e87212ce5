//! 学習結果の描画。学習ロジックには関与せず、出力（損失の列や解の値）だけを受け取ります。

use crate::error::{Error, Result};
use ndarray::Array2;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::path::Path;

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for Error {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        Error::Plot(e.to_string())
    }
}

/// 折れ線1本分のデータ。
pub struct Series<'a> {
    pub label: &'a str,
    pub points: Vec<(f64, f64)>,
    pub color: RGBColor,
}

/// 学習過程の損失をグラフとしてPNGファイルに出力します。
pub fn plot_loss_history(path: &Path, loss_hist: &[f32]) -> Result<()> {
    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let logs = loss_hist
        .iter()
        .filter(|v| **v > 0.0)
        .map(|v| v.log10())
        .collect::<Vec<f32>>();
    let max_log_loss = logs.iter().copied().fold(f32::MIN, f32::max).max(0.0) + 0.5;
    let min_log_loss = logs.iter().copied().fold(f32::MAX, f32::min).min(max_log_loss) - 0.5;
    let mut chart = ChartBuilder::on(&root)
        .caption("Loss History", ("sans-serif", 40).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0..loss_hist.len().max(1), min_log_loss..max_log_loss)?;
    chart
        .configure_mesh()
        .y_desc("Loss (log10 scale)")
        .x_desc("Epochs")
        .draw()?;
    chart
        .draw_series(LineSeries::new(
            loss_hist
                .iter()
                .enumerate()
                .filter(|(_, val)| **val > 0.0)
                .map(|(i, &val)| (i, val.log10())),
            &RED,
        ))?
        .label("Physics Loss")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// 複数の解曲線を重ねて描画します。
pub fn plot_curves(
    path: &Path,
    caption: &str,
    series: &[Series<'_>],
) -> Result<()> {
    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let all = series.iter().flat_map(|s| s.points.iter());
    let (mut x_min, mut x_max, mut y_min, mut y_max) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for &(x, y) in all.filter(|(x, y)| x.is_finite() && y.is_finite()) {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if x_min >= x_max {
        (x_min, x_max) = (0.0, 1.0);
    }
    if y_min >= y_max {
        (y_min, y_max) = (y_min - 1.0, y_min + 1.0);
    }
    let pad = 0.05 * (y_max - y_min);

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 40).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, (y_min - pad)..(y_max + pad))?;
    chart.configure_mesh().x_desc("x").y_desc("y").draw()?;

    for s in series {
        let color = s.color;
        chart
            .draw_series(LineSeries::new(
                s.points
                    .iter()
                    .copied()
                    .filter(|(x, y)| x.is_finite() && y.is_finite()),
                &color,
            ))?
            .label(s.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// 単位正方形上の格子の値をヒートマップとして描画します（行番号が x、列番号が y）。
pub fn plot_heatmap(
    path: &Path,
    caption: &str,
    values: &Array2<f64>,
) -> Result<()> {
    let root = BitMapBackend::new(path, (700, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let (rows, cols) = values.dim();
    let lo = values.iter().copied().fold(f64::MAX, f64::min);
    let hi = values.iter().copied().fold(f64::MIN, f64::max);
    let span = if hi > lo { hi - lo } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)?;
    chart.configure_mesh().x_desc("x").y_desc("y").draw()?;

    let dx = 1.0 / rows as f64;
    let dy = 1.0 / cols as f64;
    chart.draw_series(values.indexed_iter().map(|((i, j), &v)| {
        let t = ((v - lo) / span).clamp(0.0, 1.0);
        let color = HSLColor(0.66 * (1.0 - t), 0.9, 0.5);
        let (x, y) = (i as f64 * dx, j as f64 * dy);
        Rectangle::new([(x, y), (x + dx, y + dy)], color.filled())
    }))?;
    root.present()?;
    Ok(())
}

/// 勾配ベクトル場を矢印（線分）として描画します。
pub fn plot_vector_field(
    path: &Path,
    caption: &str,
    points: &[(f64, f64)],
    vectors: &[(f64, f64)],
) -> Result<()> {
    let root = BitMapBackend::new(path, (700, 700)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.05..1.05, -0.05..1.05)?;
    chart.configure_mesh().x_desc("x").y_desc("y").draw()?;

    let longest = vectors
        .iter()
        .map(|(u, v)| (u * u + v * v).sqrt())
        .filter(|n| n.is_finite())
        .fold(0.0, f64::max);
    let spacing = 1.0 / (points.len() as f64).sqrt().max(1.0);
    let scale = if longest > 0.0 { 0.9 * spacing / longest } else { 0.0 };

    chart.draw_series(points.iter().zip(vectors).map(|(&(x, y), &(u, v))| {
        PathElement::new(vec![(x, y), (x + u * scale, y + v * scale)], BLUE)
    }))?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 2, BLUE.filled())),
    )?;
    root.present()?;
    Ok(())
}
