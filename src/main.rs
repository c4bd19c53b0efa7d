mod app;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use app::DashboardApp;
use banking_dashboard::config::DashboardConfig;
use banking_dashboard::state::AppState;
use clap::Parser;
use eframe::egui;

#[derive(Parser, Debug)]
#[command(name = "banking-dashboard")]
#[command(about = "Banking customer analytics dashboard")]
struct Args {
    /// Customer table to open at start-up (.csv, .json, .parquet, .xlsx)
    data_path: Option<PathBuf>,

    /// Dashboard settings as JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the home and explorer dashboards as JSON and exit
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if args.data_path.is_some() {
        config.data_path = args.data_path.clone();
    }

    // A start-up table that fails to load stops the program.
    let mut state = AppState::new(config);
    if let Some(path) = state.config.data_path.clone() {
        state.load_path(&path)?;
    }

    if args.json {
        return print_dashboards(&state);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Banking Analytics Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

/// Headless mode: both pages as JSON on stdout.
fn print_dashboards(state: &AppState) -> Result<()> {
    let (Some(home), Some(explorer)) = (state.home(), state.explorer()) else {
        anyhow::bail!("--json needs a data file");
    };

    let output = serde_json::json!({
        "home": home,
        "explorer": explorer,
        "selection": &state.selection,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
