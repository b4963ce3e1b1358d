mod app;
mod color;
mod data;
mod render;
mod state;
mod ui;

use app::PoamAnalyzerApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 1000.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "POAM Radio Telescope Data Analyzer",
        options,
        Box::new(|_cc| Ok(Box::new(PoamAnalyzerApp::default()))),
    )
}
