use clap::Parser;
use eframe::egui;

use nuclide_explorer::app::NuclideExplorerApp;
use nuclide_explorer::config::Config;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    log::info!("data root: {}", config.data_root.display());
    let catalog = config.catalog()?;
    let reset = config.reset;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Nuclide Explorer",
        options,
        Box::new(move |cc| Ok(Box::new(NuclideExplorerApp::new(cc, catalog, reset)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the viewer: {e}"))
}
