use clap::Parser;
use eframe::egui;

use pixed::app::PixedApp;
use pixed::canvas::{Color, PixelBuffer};
use pixed::cli::CliArgs;
use pixed::session::SessionRegistry;
use pixed::{config, io, log_err, log_info, logger};

fn main() -> Result<(), eframe::Error> {
    let args = CliArgs::parse();
    logger::init(args.verbose);
    let cfg = config::load();

    let (buffer, path) = match &args.image {
        Some(path) => match io::load_image(path) {
            Ok(buffer) => (buffer, Some(path.clone())),
            Err(e) => {
                log_err!("{}", e);
                eprintln!("pixed: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            let w = args.width.unwrap_or(cfg.blank_width).max(1);
            let h = args.height.unwrap_or(cfg.blank_height).max(1);
            log_info!("starting on a blank {}x{} canvas", w, h);
            (PixelBuffer::new(w, h, Color::WHITE), None)
        }
    };

    let mut registry = SessionRegistry::new();
    let window = registry.open(buffer, path);
    if let Some(session) = registry.get_mut(window) {
        session.show_minimap = cfg.minimap_default;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("pixed"),
        ..Default::default()
    };
    eframe::run_native(
        "pixed",
        options,
        Box::new(move |_cc| Box::new(PixedApp::new(registry, window, cfg))),
    )
}
