//! Chart widgets shared by the dashboard tabs.
//!
//! Each widget takes plain series from the view model. Empty input draws an
//! empty plot frame rather than failing.

use std::f32::consts::TAU;
use std::ops::RangeInclusive;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, Points,
};

use crate::color;

const CHART_HEIGHT: f32 = 280.0;

/// Category label under an integer axis position, blank elsewhere.
fn label_at(labels: &[String], value: f64) -> String {
    let i = value.round();
    if (value - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

fn static_plot(id: &str) -> Plot<'static> {
    Plot::new(id.to_owned())
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
}

// ---------------------------------------------------------------------------
// Line chart
// ---------------------------------------------------------------------------

/// A single series with markers, `x` treated as a year.
pub fn line_chart(ui: &mut Ui, id: &str, points: Vec<[f64; 2]>, colour: Color32, y_label: &str) {
    static_plot(id)
        .y_axis_label(y_label.to_owned())
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            if mark.value.fract() == 0.0 {
                format!("{}", mark.value)
            } else {
                String::new()
            }
        })
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .color(colour)
                    .width(2.5),
            );
            plot_ui.points(Points::new(points).radius(4.0).color(colour));
        });
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Horizontal bars, first item at the bottom.
pub fn horizontal_bars(
    ui: &mut Ui,
    id: &str,
    items: &[(String, f64)],
    colour: Color32,
    x_label: &str,
    x_range: Option<(f64, f64)>,
) {
    let labels: Vec<String> = items.iter().map(|(l, _)| l.clone()).collect();
    let bars: Vec<Bar> = items
        .iter()
        .enumerate()
        .map(|(i, (label, value))| Bar::new(i as f64, *value).name(label).width(0.7))
        .collect();

    let mut plot = static_plot(id)
        .x_axis_label(x_label.to_owned())
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            label_at(&labels, mark.value)
        })
        .include_x(0.0);
    if let Some((lo, hi)) = x_range {
        plot = plot.include_x(lo).include_x(hi);
    }

    plot.show(ui, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars).horizontal().color(colour));
    });
}

/// Vertical bars stacked per category, one segment per series.
///
/// `series` is `(segment label, colour, value per category)`.
pub fn stacked_bars(
    ui: &mut Ui,
    id: &str,
    categories: &[String],
    series: Vec<(String, Color32, Vec<f64>)>,
    y_label: &str,
) {
    let labels = categories.to_vec();
    let mut charts: Vec<BarChart> = Vec::new();
    for (name, colour, values) in series {
        let bars = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| Bar::new(i as f64, v).width(0.6))
            .collect();
        let mut chart = BarChart::new(bars).name(name).color(colour);
        let below: Vec<&BarChart> = charts.iter().collect();
        chart = chart.stack_on(&below);
        charts.push(chart);
    }

    static_plot(id)
        .legend(Legend::default())
        .y_axis_label(y_label.to_owned())
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            label_at(&labels, mark.value)
        })
        .include_y(0.0)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

/// One box of a grouped box plot.
pub struct BoxItem {
    /// Index of the category on the x axis.
    pub category: usize,
    pub series: String,
    pub colour: Color32,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Boxes grouped per category, side by side per series.
pub fn grouped_box_plot(ui: &mut Ui, id: &str, categories: &[String], items: Vec<BoxItem>, y_label: &str) {
    let labels = categories.to_vec();

    static_plot(id)
        .legend(Legend::default())
        .y_axis_label(y_label.to_owned())
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            label_at(&labels, mark.value)
        })
        .show(ui, |plot_ui| {
            for (category, group) in group_by_category(&items) {
                let width = 0.8 / group.len() as f64;
                for (j, item) in group.iter().enumerate() {
                    let x = category as f64 - 0.4 + width * (j as f64 + 0.5);
                    let spread = BoxSpread::new(
                        item.lower_whisker,
                        item.q1,
                        item.median,
                        item.q3,
                        item.upper_whisker,
                    );
                    let elem = BoxElem::new(x, spread)
                        .box_width(width * 0.8)
                        .whisker_width(width * 0.4)
                        .fill(item.colour.linear_multiply(0.4))
                        .stroke(Stroke::new(1.5, item.colour));
                    plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&item.series).color(item.colour));

                    if !item.outliers.is_empty() {
                        let pts: Vec<[f64; 2]> = item.outliers.iter().map(|&y| [x, y]).collect();
                        plot_ui.points(Points::new(pts).radius(2.5).color(item.colour));
                    }
                }
            }
        });
}

fn group_by_category(items: &[BoxItem]) -> Vec<(usize, Vec<&BoxItem>)> {
    let mut groups: Vec<(usize, Vec<&BoxItem>)> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|(c, _)| *c == item.category) {
            Some((_, g)) => g.push(item),
            None => groups.push((item.category, vec![item])),
        }
    }
    groups
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

/// Point clouds, one colour per series.
pub fn scatter(
    ui: &mut Ui,
    id: &str,
    series: Vec<(String, Color32, Vec<[f64; 2]>)>,
    x_label: &str,
    y_label: &str,
) {
    static_plot(id)
        .legend(Legend::default())
        .x_axis_label(x_label.to_owned())
        .y_axis_label(y_label.to_owned())
        .show(ui, |plot_ui| {
            for (name, colour, points) in series {
                plot_ui.points(
                    Points::new(points)
                        .radius(2.5)
                        .color(colour.linear_multiply(0.7))
                        .name(name),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Donut
// ---------------------------------------------------------------------------

/// A donut chart with percentage labels inside the slices.
///
/// `slices` is `(label, value, colour)`; nothing is drawn when all values are zero.
pub fn donut(ui: &mut Ui, slices: &[(String, f64, Color32)]) {
    let size = CHART_HEIGHT.min(ui.available_width());
    let (response, painter) = ui.allocate_painter(Vec2::splat(size), Sense::hover());
    let total: f64 = slices.iter().map(|(_, v, _)| *v).sum();
    if total <= 0.0 {
        return;
    }

    let center = response.rect.center();
    let outer = size * 0.48;
    let inner = outer * 0.4;
    // Start at 12 o'clock, go clockwise.
    let mut start = -TAU / 4.0;

    for (label, value, fill) in slices {
        let sweep = (*value / total) as f32 * TAU;
        let steps = ((sweep / TAU) * 96.0).ceil().max(1.0) as usize;
        let at = |angle: f32, r: f32| Pos2::new(center.x + r * angle.cos(), center.y + r * angle.sin());

        // Each step is a convex quad between the inner and outer radius.
        for s in 0..steps {
            let a0 = start + sweep * s as f32 / steps as f32;
            let a1 = start + sweep * (s + 1) as f32 / steps as f32;
            painter.add(Shape::convex_polygon(
                vec![at(a0, inner), at(a0, outer), at(a1, outer), at(a1, inner)],
                *fill,
                Stroke::NONE,
            ));
        }

        let mid = start + sweep / 2.0;
        let pct = value / total * 100.0;
        painter.text(
            at(mid, (inner + outer) / 2.0),
            Align2::CENTER_CENTER,
            format!("{label}\n{pct:.1}%"),
            FontId::proportional(12.0),
            color::text_on(*fill),
        );
        start += sweep;
    }
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

/// One coloured, annotated cell.
pub struct HeatCell {
    pub text: String,
    pub fill: Color32,
}

/// Labelled grid of coloured cells; `cell(row, column)` supplies each one.
pub fn heatmap(
    ui: &mut Ui,
    id: &str,
    rows: &[String],
    columns: &[String],
    cell: impl Fn(usize, usize) -> HeatCell,
) {
    let cell_size = Vec2::new(84.0, 26.0);
    egui::Grid::new(id)
        .spacing(Vec2::new(2.0, 2.0))
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for c in columns {
                ui.label(RichText::new(c).strong());
            }
            ui.end_row();

            for (i, r) in rows.iter().enumerate() {
                ui.label(RichText::new(r).strong());
                for j in 0..columns.len() {
                    let HeatCell { text, fill } = cell(i, j);
                    let (rect, _) = ui.allocate_exact_size(cell_size, Sense::hover());
                    ui.painter().rect_filled(rect, 2.0, fill);
                    ui.painter().text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        text,
                        FontId::proportional(12.0),
                        color::text_on(fill),
                    );
                }
                ui.end_row();
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_labels_only_on_integer_positions() {
        let labels = vec!["A".to_string(), "B".to_string()];
        assert_eq!(label_at(&labels, 0.0), "A");
        assert_eq!(label_at(&labels, 1.0), "B");
        assert_eq!(label_at(&labels, 0.5), "");
        assert_eq!(label_at(&labels, 2.0), "");
        assert_eq!(label_at(&labels, -1.0), "");
    }
}
