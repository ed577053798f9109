mod analysis;
mod app;
mod artifact;
mod preview;
mod workflow;

fn main() -> eframe::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([760.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Cattle Trait Analyzer",
        native_options,
        Box::new(|_cc| Ok(Box::new(app::CattleTraitApp::new()))),
    )
}
