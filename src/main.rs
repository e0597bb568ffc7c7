use eframe::egui;

use igdm_client::app::IgdmApp;
use igdm_client::config::WINDOW_TITLE;
use igdm_client::logging;

fn main() -> eframe::Result<()> {
    logging::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([500.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(|cc| Ok(Box::new(IgdmApp::new(cc)))),
    )
}
