//! Nametag Desktop Application
//!
//! Renames the FriendlyName Windows shows for a WCH CH343 USB serial
//! adapter, so it can present itself as a CH340 or any custom name, and
//! exports the change as a `.reg` file.
//!
//! Run with `--simulate` to drive a simulated host instead of the OS.

mod app;
mod diagnostics_layer;
mod settings;
mod shell;

use std::sync::mpsc;
use std::sync::Arc;

use app::NametagApp;
use diagnostics_layer::{DiagnosticEvent, DiagnosticLevelState};
use eframe::NativeOptions;
use nametag_sim::SimulatedHost;
use settings::Settings;
use shell::{Services, Shell};
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> eframe::Result<()> {
    // Channel for diagnostic events (before tracing init so we capture all logs)
    let (diag_tx, diag_rx) = mpsc::channel::<DiagnosticEvent>();
    let diagnostic_level_state = Arc::new(DiagnosticLevelState::new(Some(tracing::Level::INFO)));

    diagnostics_layer::build_subscriber(
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "nametag=info,nametag_detect=info,nametag_registry=info,nametag_sim=info".into()
        }),
        diag_tx,
        diagnostic_level_state.clone(),
    )
    .init();

    let mut settings = Settings::load();
    if std::env::args().skip(1).any(|arg| arg == "--simulate") {
        settings.simulate = true;
    }
    diagnostic_level_state.set_level(settings.diagnostic_level());

    let services = if settings.simulate {
        tracing::info!("Starting Nametag against a simulated host");
        Services::simulated(&SimulatedHost::with_ch343("COM7"))
    } else {
        tracing::info!("Starting Nametag");
        Services::system(settings.settle())
    };
    let shell = Shell::new(services, settings.export_path.clone());

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 460.0])
            .with_min_inner_size([540.0, 400.0])
            .with_title("Nametag - USB FriendlyName Editor"),
        ..Default::default()
    };

    eframe::run_native(
        "Nametag",
        options,
        Box::new(move |cc| {
            Ok(Box::new(NametagApp::new(
                cc,
                shell,
                &settings,
                diag_rx,
                diagnostic_level_state,
            )))
        }),
    )
}
