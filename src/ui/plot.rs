use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points};

use crate::artifact::{ChartSpec, HistogramSpec, ScatterSpec};

use super::to_color32;

const PLOT_HEIGHT: f32 = 340.0;

/// Title line, then the chart itself.
pub fn chart(ui: &mut Ui, spec: &ChartSpec) {
    ui.label(spec.title());
    match spec {
        ChartSpec::Scatter(scatter) => scatter_plot(ui, scatter),
        ChartSpec::Histogram(histogram) => histogram_plot(ui, histogram),
    }
}

// ---------------------------------------------------------------------------
// Scatter plot
// ---------------------------------------------------------------------------

/// One `Points` item per series so the legend lists each class.
fn scatter_plot(ui: &mut Ui, spec: &ScatterSpec) {
    Plot::new("scatter_plot")
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label(spec.x_label.as_str())
        .y_axis_label(spec.y_label.as_str())
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &spec.series {
                let points = Points::new(PlotPoints::from(series.points.clone()))
                    .name(&series.name)
                    .color(to_color32(series.color, 1.0))
                    .radius(3.0);
                plot_ui.points(points);
            }
        });
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Bars centred on the shared bins; overlaid series rely on their opacity.
fn histogram_plot(ui: &mut Ui, spec: &HistogramSpec) {
    let bins = spec.bins;
    Plot::new("histogram_plot")
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label(spec.x_label.as_str())
        .y_axis_label(spec.y_label.as_str())
        .allow_scroll(false)
        .allow_drag(false)
        .show(ui, |plot_ui| {
            for series in &spec.series {
                let bars: Vec<Bar> = series
                    .counts
                    .iter()
                    .enumerate()
                    .map(|(i, &count)| Bar::new(bins.center(i), count as f64).width(bins.width))
                    .collect();
                let chart = BarChart::new(bars)
                    .name(&series.name)
                    .color(to_color32(series.color, series.opacity));
                plot_ui.bar_chart(chart);
            }
        });
}
