use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::report::format;
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Clone what we need so we can mutate state inside the loops.
    let all_years = state.dataset.years().clone();
    let all_brands = state.dataset.brands().clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .max_height((ui.available_height() - 150.0).max(120.0))
        .show(ui, |ui: &mut Ui| {
            // ---- Sale years ----
            let header = format!(
                "Sale years  ({}/{})",
                state.selection.years.len(),
                all_years.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("years")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_years();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_years();
                        }
                    });
                    for year in &all_years {
                        let mut checked = state.selection.years.contains(year);
                        if ui.checkbox(&mut checked, year.to_string()).changed() {
                            state.set_year(*year, checked);
                        }
                    }
                });

            // ---- Brands ----
            let header = format!(
                "Brands  ({}/{})",
                state.selection.brands.len(),
                all_brands.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("brands")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_brands();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_brands();
                        }
                    });
                    for brand in &all_brands {
                        let mut checked = state.selection.brands.contains(brand);
                        if ui.checkbox(&mut checked, brand.as_str()).changed() {
                            state.set_brand(brand, checked);
                        }
                    }
                });
        });

    // ---- Key metrics over the whole dataset ----
    ui.separator();
    let k = &state.view.sidebar_kpis;
    ui.strong("Key metrics");
    ui.label(format!("Total revenue: {}", format::millions(k.total_revenue)));
    ui.label(format!("Total sales: {}", format::thousands(k.sale_count as u64)));
    ui.label(format!(
        "Average satisfaction: {}",
        format::satisfaction(k.average_satisfaction)
    ));
    ui.separator();
    ui.small("Automobile sales analysis");
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title and the tab selector.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(4.0);
    ui.heading("Automobile Sales Dashboard");
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.active_tab, tab, tab.title());
        }

        ui.separator();

        ui.label(format!(
            "{} of {} sales selected",
            format::thousands(state.view.kpis.sale_count as u64),
            format::thousands(state.dataset.len() as u64)
        ));
    });
    ui.add_space(2.0);
}
