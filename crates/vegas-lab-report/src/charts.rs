//! Chart rendering over parsed result tables.
//!
//! Every function renders one PNG artifact and is otherwise pure over its
//! input group or table. Geometry mirrors the original analysis plots: a
//! clamped y-axis around the throughput extremes and a 4-decimal value
//! annotation above each bar.

use crate::summary::BestWorst;
use anyhow::Context;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use tracing::debug;
use vegas_lab_abstract::{AnalysisConfig, Record};
use vegas_lab_parser::{Group, ResultTable};

const BAR_DIMENSIONS: (u32, u32) = (1000, 600);
const BAR_FILL: RGBColor = RGBColor(135, 206, 235);
const BEST_FILL: RGBColor = RGBColor(46, 139, 87);
const WORST_FILL: RGBColor = RGBColor(205, 92, 92);

fn value_style() -> TextStyle<'static> {
    TextStyle::from(("sans-serif", 12).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom))
}

fn rotated_label_style() -> TextStyle<'static> {
    TextStyle::from(
        ("sans-serif", 12)
            .into_font()
            .transform(FontTransform::Rotate90),
    )
}

fn segment_label(segment: &SegmentValue<usize>, labels: &[String]) -> String {
    match segment {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            labels.get(*i).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

fn bounds(values: impl IntoIterator<Item = f64>, margin: f64) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for value in values {
        lo = lo.min(value);
        hi = hi.max(value);
    }
    (lo - margin, hi + margin)
}

/// Grouped bar chart of throughput per parameter combination for one file
/// size. The y-axis is clamped just around the extremes so small throughput
/// differences stay visible.
pub fn render_bar(group: &Group<'_>, config: &AnalysisConfig, path: &Path) -> anyhow::Result<()> {
    let labels: Vec<String> = group.records.iter().map(|r| r.params.label()).collect();
    let (y_lo, y_hi) = bounds(
        group.records.iter().map(|r| r.throughput_mbps),
        config.y_margin,
    );

    let root = BitMapBackend::new(path, BAR_DIMENSIONS).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!(
                "Average Throughput for File Size: {}MB",
                group.file_size_mb
            ),
            ("sans-serif", 22).into_font(),
        )
        .margin(10)
        .x_label_area_size(150)
        .y_label_area_size(70)
        .build_cartesian_2d((0..labels.len()).into_segmented(), y_lo..y_hi)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Alpha and Beta Combinations")
        .y_desc("Average Throughput (Mbps)")
        .x_labels(labels.len().max(1))
        .x_label_formatter(&|segment| segment_label(segment, &labels))
        .x_label_style(rotated_label_style())
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BAR_FILL.filled())
            .margin(8)
            .baseline(y_lo)
            .data(
                group
                    .records
                    .iter()
                    .enumerate()
                    .map(|(i, r)| (i, r.throughput_mbps)),
            ),
    )?;

    chart.draw_series(group.records.iter().enumerate().map(|(i, r)| {
        Text::new(
            format!("{:.4}", r.throughput_mbps),
            (
                SegmentValue::CenterOf(i),
                r.throughput_mbps + config.annotate_offset,
            ),
            value_style(),
        )
    }))?;

    root.present()
        .with_context(|| format!("Failed to write chart {}", path.display()))?;
    debug!(path = %path.display(), "rendered bar chart");
    Ok(())
}

fn distinct<T: Copy + PartialEq>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

/// Gaussian kernel density estimate of `values` at `t` with bandwidth `h`.
fn kde(values: &[f64], h: f64, t: f64) -> f64 {
    let norm = (values.len() as f64) * h * (2.0 * std::f64::consts::PI).sqrt();
    values
        .iter()
        .map(|v| (-0.5 * ((t - v) / h).powi(2)).exp())
        .sum::<f64>()
        / norm
}

/// Mirrored density outline for one violin body centered at `center`.
fn violin_outline(
    values: &[f64],
    center: f64,
    max_half_width: f64,
    y_lo: f64,
    y_hi: f64,
) -> Vec<(f64, f64)> {
    if values.len() == 1 {
        let v = values[0];
        let tick = (y_hi - y_lo) * 0.01;
        return vec![
            (center - max_half_width * 0.2, v),
            (center, v + tick),
            (center + max_half_width * 0.2, v),
            (center, v - tick),
        ];
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    // Silverman's rule; degenerate spreads fall back to a thin sliver
    let h = (1.06 * std_dev * n.powf(-0.2)).max((y_hi - y_lo) * 0.005);

    const STEPS: usize = 40;
    let densities: Vec<(f64, f64)> = (0..=STEPS)
        .map(|k| {
            let t = y_lo + (y_hi - y_lo) * (k as f64) / (STEPS as f64);
            (t, kde(values, h, t))
        })
        .collect();
    let d_max = densities.iter().fold(f64::MIN, |acc, (_, d)| acc.max(*d));

    let mut outline: Vec<(f64, f64)> = densities
        .iter()
        .map(|(t, d)| (center + max_half_width * d / d_max, *t))
        .collect();
    outline.extend(
        densities
            .iter()
            .rev()
            .map(|(t, d)| (center - max_half_width * d / d_max, *t)),
    );
    outline
}

fn draw_violin_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    group: &Group<'_>,
    alpha: u32,
) -> anyhow::Result<()> {
    let rows: Vec<&Record> = group
        .records
        .iter()
        .copied()
        .filter(|r| r.params.alpha == alpha)
        .collect();
    let betas = distinct(rows.iter().map(|r| r.params.beta));
    let cells: Vec<(u32, Vec<f64>)> = betas
        .iter()
        .map(|beta| {
            (
                *beta,
                rows.iter()
                    .filter(|r| r.params.beta == *beta)
                    .map(|r| r.throughput_mbps)
                    .collect(),
            )
        })
        .collect();

    let (data_lo, data_hi) = bounds(rows.iter().map(|r| r.throughput_mbps), 0.0);
    let pad = ((data_hi - data_lo) * 0.15).max(0.01);
    let (y_lo, y_hi) = (data_lo - pad, data_hi + pad);
    let beta_labels: Vec<String> = betas.iter().map(|b| b.to_string()).collect();

    let mut chart = ChartBuilder::on(area)
        .caption(format!("Alpha {alpha}"), ("sans-serif", 16).into_font())
        .margin(8)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(-0.5f64..cells.len() as f64 - 0.5, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Beta")
        .y_desc("Throughput (Mbps)")
        .x_labels(cells.len())
        .x_label_formatter(&|x| {
            let index = x.round();
            if (x - index).abs() < 1e-6 && index >= 0.0 && (index as usize) < beta_labels.len() {
                beta_labels[index as usize].clone()
            } else {
                String::new()
            }
        })
        .draw()?;

    for (i, (_, values)) in cells.iter().enumerate() {
        let outline = violin_outline(values, i as f64, 0.35, y_lo, y_hi);
        chart.draw_series(std::iter::once(Polygon::new(
            outline,
            BAR_FILL.mix(0.6).filled(),
        )))?;
    }
    Ok(())
}

/// Violin plot of the throughput distribution split by beta, one panel per
/// alpha value. Three-parameter runs only: the gamma sweep provides the
/// per-(alpha, beta) samples.
pub fn render_violin(group: &Group<'_>, path: &Path) -> anyhow::Result<()> {
    let alphas = distinct(group.records.iter().map(|r| r.params.alpha));

    let root =
        BitMapBackend::new(path, (380 * alphas.len().max(1) as u32, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let titled = root.titled(
        &format!(
            "Throughput distribution for File Size: {}MB",
            group.file_size_mb
        ),
        ("sans-serif", 22).into_font(),
    )?;
    let panels = titled.split_evenly((1, alphas.len().max(1)));
    for (panel, alpha) in panels.iter().zip(&alphas) {
        draw_violin_panel(panel, group, *alpha)?;
    }

    root.present()
        .with_context(|| format!("Failed to write chart {}", path.display()))?;
    debug!(path = %path.display(), "rendered violin chart");
    Ok(())
}

fn numeric_columns(table: &ResultTable) -> Vec<(&'static str, Vec<f64>)> {
    let records = table.records();
    let mut columns: Vec<(&'static str, Vec<f64>)> = vec![
        (
            "Alpha",
            records.iter().map(|r| r.params.alpha as f64).collect(),
        ),
        ("Beta", records.iter().map(|r| r.params.beta as f64).collect()),
    ];
    if table.format().has_gamma() {
        columns.push((
            "Gamma",
            records
                .iter()
                .map(|r| r.params.gamma.unwrap_or(0) as f64)
                .collect(),
        ));
    }
    columns.push((
        "FileSize",
        records.iter().map(|r| r.file_size_mb as f64).collect(),
    ));
    if table.format().has_flow_stats() {
        let flow = |f: fn(&vegas_lab_abstract::FlowStats) -> f64| -> Vec<f64> {
            records
                .iter()
                .map(|r| r.flow.as_ref().map(f).unwrap_or(0.0))
                .collect()
        };
        columns.push(("Flow_ID", flow(|s| s.flow_id as f64)));
        columns.push(("Tx_Packets", flow(|s| s.tx_packets as f64)));
        columns.push(("Rx_Packets", flow(|s| s.rx_packets as f64)));
        columns.push(("Duration", flow(|s| s.duration_s)));
        columns.push(("Throughput", records.iter().map(|r| r.throughput_mbps).collect()));
    } else {
        columns.push((
            "Average_Throughput",
            records.iter().map(|r| r.throughput_mbps).collect(),
        ));
    }
    columns
}

fn padded_bounds(values: &[f64]) -> (f64, f64) {
    let (lo, hi) = bounds(values.iter().copied(), 0.0);
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 0.5 };
    (lo - pad, hi + pad)
}

fn draw_scatter_cell(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    x: &(&'static str, Vec<f64>),
    y: &(&'static str, Vec<f64>),
    color_indices: &[usize],
) -> anyhow::Result<()> {
    let (x_lo, x_hi) = padded_bounds(&x.1);
    let (y_lo, y_hi) = padded_bounds(&y.1);
    let mut chart = ChartBuilder::on(area)
        .margin(6)
        .x_label_area_size(28)
        .y_label_area_size(45)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(x.0)
        .y_desc(y.0)
        .x_labels(4)
        .y_labels(4)
        .draw()?;
    chart.draw_series(
        x.1.iter()
            .zip(&y.1)
            .zip(color_indices)
            .map(|((px, py), idx)| {
                Circle::new((*px, *py), 2, Palette99::pick(*idx).mix(0.8).filled())
            }),
    )?;
    Ok(())
}

fn draw_histogram_cell(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    column: &(&'static str, Vec<f64>),
) -> anyhow::Result<()> {
    const BINS: usize = 10;
    let (lo, hi) = padded_bounds(&column.1);
    let width = (hi - lo) / BINS as f64;
    let mut counts = [0usize; BINS];
    for value in &column.1 {
        let bin = (((value - lo) / width) as usize).min(BINS - 1);
        counts[bin] += 1;
    }
    let count_max = counts.iter().copied().max().unwrap_or(1).max(1);

    let mut chart = ChartBuilder::on(area)
        .margin(6)
        .x_label_area_size(28)
        .y_label_area_size(45)
        .build_cartesian_2d(lo..hi, 0f64..count_max as f64 * 1.1)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(column.0)
        .x_labels(4)
        .y_labels(4)
        .draw()?;
    chart.draw_series(counts.iter().enumerate().map(|(bin, count)| {
        let x0 = lo + bin as f64 * width;
        Rectangle::new(
            [(x0, 0.0), (x0 + width, *count as f64)],
            BAR_FILL.filled(),
        )
    }))?;
    Ok(())
}

/// Pairwise relationship grid over all numeric columns of the table,
/// scatter off the diagonal and a histogram on it, points colored by beta.
pub fn render_pairplot(table: &ResultTable, path: &Path) -> anyhow::Result<()> {
    let columns = numeric_columns(table);
    let n = columns.len();
    let betas = distinct(table.records().iter().map(|r| r.params.beta));
    let color_indices: Vec<usize> = table
        .records()
        .iter()
        .map(|r| betas.iter().position(|b| *b == r.params.beta).unwrap_or(0))
        .collect();

    let root = BitMapBackend::new(path, (260 * n as u32, 260 * n as u32)).into_drawing_area();
    root.fill(&WHITE)?;
    let cells = root.split_evenly((n, n));
    for row in 0..n {
        for col in 0..n {
            let area = &cells[row * n + col];
            if row == col {
                draw_histogram_cell(area, &columns[row])?;
            } else {
                draw_scatter_cell(area, &columns[col], &columns[row], &color_indices)?;
            }
        }
    }

    root.present()
        .with_context(|| format!("Failed to write chart {}", path.display()))?;
    debug!(path = %path.display(), "rendered pairplot");
    Ok(())
}

/// One best/worst bar pair per file size, best and worst in distinct colors,
/// each bar labeled with its parameter combination and annotated value.
pub fn render_best_worst(
    entries: &[BestWorst],
    config: &AnalysisConfig,
    path: &Path,
) -> anyhow::Result<()> {
    let mut labels = Vec::with_capacity(entries.len() * 2);
    let mut values = Vec::with_capacity(entries.len() * 2);
    for entry in entries {
        labels.push(format!("{}MB: {}", entry.file_size_mb, entry.best.params.label()));
        values.push(entry.best.throughput_mbps);
        labels.push(format!(
            "{}MB: {}",
            entry.file_size_mb,
            entry.worst.params.label()
        ));
        values.push(entry.worst.throughput_mbps);
    }
    let (y_lo, y_hi) = bounds(values.iter().copied(), config.y_margin);

    let root = BitMapBackend::new(path, BAR_DIMENSIONS).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Best and Worst Throughput per File Size",
            ("sans-serif", 22).into_font(),
        )
        .margin(10)
        .x_label_area_size(170)
        .y_label_area_size(70)
        .build_cartesian_2d((0..values.len()).into_segmented(), y_lo..y_hi)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Parameter Combination")
        .y_desc("Throughput (Mbps)")
        .x_labels(values.len().max(1))
        .x_label_formatter(&|segment| segment_label(segment, &labels))
        .x_label_style(rotated_label_style())
        .draw()?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BEST_FILL.filled())
                .margin(12)
                .baseline(y_lo)
                .data(values.iter().enumerate().filter(|(i, _)| i % 2 == 0).map(|(i, v)| (i, *v))),
        )?
        .label("Best")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], BEST_FILL.filled()));
    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(WORST_FILL.filled())
                .margin(12)
                .baseline(y_lo)
                .data(values.iter().enumerate().filter(|(i, _)| i % 2 == 1).map(|(i, v)| (i, *v))),
        )?
        .label("Worst")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], WORST_FILL.filled()));

    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        Text::new(
            format!("{v:.4}"),
            (SegmentValue::CenterOf(i), v + config.annotate_offset),
            value_style(),
        )
    }))?;

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()
        .with_context(|| format!("Failed to write chart {}", path.display()))?;
    debug!(path = %path.display(), "rendered best/worst chart");
    Ok(())
}
