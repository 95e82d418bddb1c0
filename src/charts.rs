use plotters::coord::ranged1d::SegmentValue;
use plotters::element::Pie;
use plotters::prelude::*;

use std::error::Error as StdError;
use std::path::{Path, PathBuf};

use log::*;

use crate::report::Report;
use crate::senti::Sentiment;
use crate::Error;

pub const BAR_CHART_FILE: &str = "sentiment_bar.svg";
pub const PIE_CHART_FILE: &str = "sentiment_pie.svg";

const CHART_SIZE: (u32, u32) = (640, 480);

#[derive(Debug, Clone, PartialEq)]
pub struct ChartFiles {
    pub bar: PathBuf,
    pub pie: PathBuf,
}

fn colour(sentiment: Sentiment) -> RGBColor {
    match sentiment {
        Sentiment::Positive => RGBColor(46, 160, 67),
        Sentiment::Negative => RGBColor(218, 54, 51),
    }
}

/// Writes the bar and pie charts of `report` into `dir`, replacing any
/// earlier copies.
pub fn draw_charts(report: &Report, dir: &Path) -> Result<ChartFiles, Error> {
    std::fs::create_dir_all(dir)?;
    let files = ChartFiles {
        bar: dir.join(BAR_CHART_FILE),
        pie: dir.join(PIE_CHART_FILE),
    };
    draw_bar_chart(&report.counts, &files.bar).map_err(|e| Error::ChartError(e.to_string()))?;
    draw_pie_chart(&report.counts, &files.pie).map_err(|e| Error::ChartError(e.to_string()))?;
    debug!("Charts written to {}", dir.display());
    Ok(files)
}

fn draw_bar_chart(counts: &[(Sentiment, usize)], path: &Path) -> Result<(), Box<dyn StdError>> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let top = counts.iter().map(|(_, count)| *count).max().unwrap_or(0) as u32;
    let mut chart = ChartBuilder::on(&root)
        .caption("Sentiment Bar Chart", ("sans-serif", 28))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(48)
        .build_cartesian_2d((0usize..counts.len()).into_segmented(), 0u32..top + 1)?;

    let label_of = |value: &SegmentValue<usize>| match value {
        SegmentValue::Exact(idx) | SegmentValue::CenterOf(idx) => counts
            .get(*idx)
            .map(|(label, _)| label.to_string())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(counts.len())
        .x_label_formatter(&label_of)
        .y_desc("Count")
        .draw()?;

    for (idx, (label, count)) in counts.iter().enumerate() {
        chart.draw_series(
            Histogram::vertical(&chart)
                .style(colour(*label).filled())
                .margin(24)
                .data(std::iter::once((idx, *count as u32))),
        )?;
    }

    root.present()?;
    Ok(())
}

fn draw_pie_chart(counts: &[(Sentiment, usize)], path: &Path) -> Result<(), Box<dyn StdError>> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Sentiment Distribution", ("sans-serif", 28))?;

    let (width, height) = root.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) * 0.38;
    let sizes: Vec<f64> = counts.iter().map(|(_, count)| *count as f64).collect();
    let colours: Vec<RGBColor> = counts.iter().map(|(label, _)| colour(*label)).collect();
    let labels: Vec<String> = counts.iter().map(|(label, _)| label.to_string()).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colours, &labels);
    pie.start_angle(90.0);
    pie.label_style(("sans-serif", 20).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 18).into_font().color(&WHITE));
    root.draw(&pie)?;

    root.present()?;
    Ok(())
}
