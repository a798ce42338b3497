use std::path::PathBuf;

use clap::Parser;

/// Command-line options.
#[derive(Debug, Clone, Parser)]
#[command(name = "autosales-dashboard", version, about = "Automobile sales reporting dashboard")]
pub struct Args {
    /// Sales file to load (.xlsx, .xls, .ods, .csv, .json or .parquet).
    ///
    /// Loaded once at startup; restart to pick up changes.
    #[arg(value_name = "PATH", env = "AUTOSALES_DATA", default_value = "STAGE.xlsx")]
    pub data: PathBuf,

    /// Print the dashboard for the full selection as JSON and exit, without a window.
    #[arg(long)]
    pub summary: bool,

    /// Initial window width in points.
    #[arg(long, default_value_t = 1400.0)]
    pub width: f32,

    /// Initial window height in points.
    #[arg(long, default_value_t = 900.0)]
    pub height: f32,
}
