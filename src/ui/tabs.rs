use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::analytics::crosstab::CrossTab;
use crate::color::{self, ColorMap};
use crate::report::format;
use crate::state::AppState;

use super::charts::{self, BoxItem, HeatCell};

// ---------------------------------------------------------------------------
// Shared bits
// ---------------------------------------------------------------------------

fn metric_tile(ui: &mut Ui, title: &str, value: String) {
    ui.group(|ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(title).color(Color32::GRAY));
        ui.label(RichText::new(value).size(26.0).strong());
    });
}

/// A line where `**…**` spans are shown in bold.
fn rich_line(ui: &mut Ui, line: &str) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        ui.label("• ");
        for (i, part) in line.split("**").enumerate() {
            if part.is_empty() {
                continue;
            }
            if i % 2 == 1 {
                ui.label(RichText::new(part).strong());
            } else {
                ui.label(part);
            }
        }
    });
}

fn legend(ui: &mut Ui, colours: &ColorMap) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (label, c) in colours.legend_entries() {
            ui.label(RichText::new(label).color(c).strong());
            ui.add_space(8.0);
        }
    });
}

/// Counts heatmap for a cross-tab, colour scaled to the largest cell. Row
/// labels carry the row total.
fn crosstab_heatmap(ui: &mut Ui, id: &str, tab: &CrossTab) {
    if tab.is_empty() {
        ui.label(RichText::new("No sales for this selection.").italics());
        return;
    }
    let rows: Vec<String> = tab.row_labels().map(str::to_owned).collect();
    let row_titles: Vec<String> = rows
        .iter()
        .map(|r| format!("{r} ({})", format::thousands(tab.row_total(r))))
        .collect();
    let cols: Vec<String> = tab.column_labels().map(str::to_owned).collect();
    let max = tab.max_cell().max(1) as f32;
    charts::heatmap(ui, id, &row_titles, &cols, |i, j| {
        let n = tab.cell(&rows[i], &cols[j]);
        HeatCell {
            text: n.to_string(),
            fill: color::sequential(n as f32 / max),
        }
    });
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

pub fn overview(ui: &mut Ui, state: &AppState) {
    let view = &state.view;
    ui.heading("Market overview");

    ui.columns(3, |cols: &mut [Ui]| {
        metric_tile(&mut cols[0], "Total revenue", format::millions(view.kpis.total_revenue));
        metric_tile(
            &mut cols[1],
            "Total sales",
            format::thousands(view.kpis.sale_count as u64),
        );
        metric_tile(
            &mut cols[2],
            "Average satisfaction",
            format::satisfaction(view.kpis.average_satisfaction),
        );
    });
    ui.separator();

    let sales: Vec<[f64; 2]> = view
        .overview
        .annual
        .iter()
        .map(|p| [p.year as f64, p.sales as f64])
        .collect();
    let revenue: Vec<[f64; 2]> = view
        .overview
        .annual
        .iter()
        .map(|p| [p.year as f64, p.revenue / 1e6])
        .collect();

    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].strong("Sales per year");
        charts::line_chart(&mut cols[0], "annual_sales", sales, color::BLUE, "Sales");
        cols[1].strong("Revenue per year (M€)");
        charts::line_chart(&mut cols[1], "annual_revenue", revenue, color::RED, "Revenue (M€)");
    });
    ui.separator();

    // Most sold on top.
    let top_brands: Vec<(String, f64)> = view.overview.top_brands.iter().rev().cloned().collect();
    ui.strong("Top 10 brands");
    charts::horizontal_bars(
        ui,
        "top_brands",
        &top_brands,
        color::BLUE,
        "Sales",
        None,
    );
}

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

pub fn sales(ui: &mut Ui, state: &AppState) {
    let view = &state.view.sales;
    ui.heading("Sales analysis");

    let top_models: Vec<(String, f64)> = view
        .top_models
        .iter()
        .rev()
        .map(|(m, n)| (m.label(), *n))
        .collect();

    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].strong("Revenue per country");
        charts::horizontal_bars(
            &mut cols[0],
            "revenue_by_country",
            &view.revenue_by_country,
            color::GREEN,
            "Revenue (€)",
            None,
        );
        cols[1].strong("Top 10 models");
        charts::horizontal_bars(&mut cols[1], "top_models", &top_models, color::ORANGE, "Sales", None);
    });

    egui::CollapsingHeader::new("Top models table")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .column(Column::auto().at_least(40.0))
                .column(Column::auto().at_least(120.0))
                .column(Column::auto().at_least(120.0))
                .column(Column::remainder())
                .header(20.0, |mut header| {
                    for title in ["#", "Brand", "Model", "Sales"] {
                        header.col(|ui: &mut Ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|mut body| {
                    for (rank, (m, n)) in view.top_models.iter().enumerate() {
                        body.row(18.0, |mut row| {
                            row.col(|ui: &mut Ui| {
                                ui.label((rank + 1).to_string());
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(&m.brand);
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(&m.model);
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(format::thousands(*n as u64));
                            });
                        });
                    }
                });
        });

    egui::CollapsingHeader::new("Revenue per country table")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .id_salt("revenue_by_country_table")
                .striped(true)
                .column(Column::auto().at_least(140.0))
                .column(Column::remainder())
                .header(20.0, |mut header| {
                    for title in ["Country", "Revenue"] {
                        header.col(|ui: &mut Ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|mut body| {
                    // Largest first, unlike the chart which stacks from the bottom.
                    for (country, revenue) in view.revenue_by_country.iter().rev() {
                        body.row(18.0, |mut row| {
                            row.col(|ui: &mut Ui| {
                                ui.label(country);
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(format::euros(*revenue));
                            });
                        });
                    }
                });
        });
    ui.separator();

    ui.strong("Sales by brand and fuel type");
    crosstab_heatmap(ui, "brand_fuel", &view.brand_fuel);
    ui.separator();

    ui.strong("Price distribution by brand and fuel type (top 5 brands)");
    legend(ui, &state.fuel_colors);
    let items = view
        .price_boxes
        .iter()
        .filter_map(|b| {
            let category = view.price_brands.iter().position(|p| *p == b.brand)?;
            Some(BoxItem {
                category,
                series: b.fuel_type.clone(),
                colour: state.fuel_colors.color_for(&b.fuel_type),
                lower_whisker: b.stats.lower_whisker,
                q1: b.stats.q1,
                median: b.stats.median,
                q3: b.stats.q3,
                upper_whisker: b.stats.upper_whisker,
                outliers: b.stats.outliers.clone(),
            })
        })
        .collect();
    charts::grouped_box_plot(ui, "price_boxes", &view.price_brands, items, "Price (€)");
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

pub fn customers(ui: &mut Ui, state: &AppState) {
    let view = &state.view.customers;
    let clients = &state.client_colors;
    ui.heading("Customer analysis");

    let slices: Vec<(String, f64, Color32)> = view
        .client_types
        .iter()
        .map(|s| (s.label.clone(), s.count as f64, clients.color_for(&s.label)))
        .collect();

    let brands: Vec<String> = view.client_by_brand.row_labels().map(str::to_owned).collect();
    let stacks = view
        .client_by_brand
        .column_labels()
        .map(|client| {
            let counts = brands
                .iter()
                .map(|b| view.client_by_brand.cell(b, client) as f64)
                .collect();
            (client.to_owned(), clients.color_for(client), counts)
        })
        .collect();

    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].strong("Client types");
        charts::donut(&mut cols[0], &slices);
        cols[1].strong("Clients per brand");
        charts::stacked_bars(&mut cols[1], "client_by_brand", &brands, stacks, "Clients");
    });
    ui.separator();

    let scatter = view
        .price_vs_satisfaction
        .iter()
        .map(|g| {
            (
                g.client_type.clone(),
                clients.color_for(&g.client_type),
                g.points.clone(),
            )
        })
        .collect();

    ui.heading("Customer satisfaction");
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].strong("Average satisfaction per brand");
        charts::horizontal_bars(
            &mut cols[0],
            "satisfaction_by_brand",
            &view.satisfaction_by_brand,
            color::PURPLE,
            "Score (1-10)",
            Some((0.0, 10.0)),
        );
        cols[1].strong("Satisfaction vs price");
        charts::scatter(&mut cols[1], "price_vs_satisfaction", scatter, "Price (€)", "Satisfaction");
    });
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

pub fn insights(ui: &mut Ui, state: &AppState) {
    let view = &state.view;
    ui.heading("Insights and recommendations");

    ui.strong("Main observations (all sales)");
    for line in format::observation_lines(&view.insights) {
        rich_line(ui, &line);
    }
    ui.separator();

    ui.strong("Strategic recommendations");
    let rec = &view.insights.recommendations;
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].label(RichText::new("Sales optimisation").strong());
        for line in format::sales_recommendations(rec) {
            rich_line(&mut cols[0], &line);
        }
        cols[1].label(RichText::new("Customer strategy").strong());
        for line in format::customer_recommendations(rec) {
            rich_line(&mut cols[1], &line);
        }
    });
    ui.separator();

    ui.strong("Correlation matrix (selected sales)");
    let labels: Vec<String> = view
        .correlation
        .columns
        .iter()
        .map(|c| c.label().to_owned())
        .collect();
    charts::heatmap(ui, "correlation", &labels, &labels, |i, j| {
        match view.correlation.values[i][j] {
            Some(r) => HeatCell {
                text: format!("{r:.2}"),
                fill: color::diverging(r),
            },
            None => HeatCell {
                text: "n/a".to_owned(),
                fill: Color32::from_gray(60),
            },
        }
    });
}
