mod analytics;
mod app;
mod color;
mod config;
mod data;
mod error;
mod report;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use app::DashboardApp;
use clap::Parser;
use eframe::egui;

use config::Args;
use data::filter::Selection;
use report::build_dashboard;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Loaded exactly once; every consumer shares this Arc.
    let dataset = match data::loader::load_file(&args.data) {
        Ok(ds) => Arc::new(ds),
        Err(e) => {
            log::error!("Failed to load sales data: {e}");
            return Err(e).with_context(|| format!("cannot start without '{}'", args.data.display()));
        }
    };

    if args.summary {
        let view = build_dashboard(&dataset, &Selection::all(&dataset)).context("building dashboard")?;
        let json = serde_json::to_string_pretty(&view).context("serializing dashboard")?;
        println!("{json}");
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    let app = DashboardApp::new(dataset).context("building dashboard")?;
    eframe::run_native(
        "Automobile Sales Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow!("window error: {e}"))
}
