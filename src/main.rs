mod animation;
mod audio;
mod config;
mod error;
mod fft;
mod gui;
mod level;
mod meter;

use clap::Parser;
use config::Args;
use gui::MeterApp;

fn main() -> Result<(), eframe::Error> {
    let args = Args::parse();

    //
    // Initialize logging from the verbosity flags.
    //
    config::init_logging(&args);

    log::info!("Starting microphone level meter...");

    let host = cpal::default_host();
    log::info!("Audio host: {:?}", host.id());

    //
    // List-only mode prints the inputs and exits before any capture.
    //
    if args.list_devices {
        match audio::list_input_devices(&host) {
            Ok(devices) => {
                for device in devices {
                    let marker = if device.is_default { " (default)" } else { "" };
                    println!("{}{}", device.label, marker);
                }
                return Ok(());
            }
            Err(err) => {
                log::error!("Failed to list input devices: {}", err);
                std::process::exit(1);
            }
        }
    }

    let analyzer_config = match args.analyzer_config() {
        Ok(config) => config,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(2);
        }
    };
    let selector = args.device_selector();

    //
    // Initialize GUI configuration.
    //
    log::info!("Initializing GUI...");
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([640.0, 220.0])
            .with_min_inner_size([420.0, 180.0])
            .with_title("micmeter"),
        ..Default::default()
    };

    //
    // The app opens the capture session and owns it until the window closes.
    //
    eframe::run_native(
        "micmeter",
        options,
        Box::new(move |cc| {
            gui::theme::setup_global_style(&cc.egui_ctx);
            Ok(Box::new(MeterApp::new(cc, host, analyzer_config, selector)))
        }),
    )
}
