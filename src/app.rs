use std::sync::Arc;

use eframe::egui;
use polars::prelude::PolarsResult;

use crate::data::model::SalesDataset;
use crate::state::{AppState, Tab};
use crate::ui::{panels, tabs};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(dataset: Arc<SalesDataset>) -> PolarsResult<Self> {
        Ok(Self {
            state: AppState::new(dataset)?,
        })
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title + tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters + key metrics ----
        egui::SidePanel::left("filter_panel")
            .default_width(230.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active tab ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.state.active_tab {
                    Tab::Overview => tabs::overview(ui, &self.state),
                    Tab::Sales => tabs::sales(ui, &self.state),
                    Tab::Customers => tabs::customers(ui, &self.state),
                    Tab::Insights => tabs::insights(ui, &self.state),
                });
        });
    }
}
