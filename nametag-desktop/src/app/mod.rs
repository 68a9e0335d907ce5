//! Main window
//!
//! Organized into submodules:
//! - `theme`: palette and fonts
//! - `ui_panels`: panel drawing methods
//!
//! The window owns a [`Shell`] and the current [`ShellState`]. Panels
//! report clicks as [`Action`]s, which are dispatched once per frame.

mod theme;
mod ui_panels;

use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use eframe::CreationContext;
use tracing::Level;

use crate::diagnostics_layer::{DiagnosticEvent, DiagnosticLevelState};
use crate::settings::Settings;
use crate::shell::{Action, Shell, ShellState};

/// Diagnostics entries kept for display
const DIAGNOSTIC_HISTORY: usize = 500;

/// Main application state
pub struct NametagApp {
    /// Action dispatcher
    pub(super) shell: Shell,
    /// State shown in the window
    pub(super) state: ShellState,
    /// Running against a simulated host
    pub(super) simulated: bool,
    /// Show diagnostics side panel
    pub(super) show_diagnostics: bool,
    /// Diagnostic event receiver (from tracing layer)
    pub(super) diag_rx: Receiver<DiagnosticEvent>,
    /// Most recent diagnostic events, oldest first
    pub(super) diagnostics: VecDeque<DiagnosticEvent>,
    /// Shared state for dynamic diagnostics level filtering
    pub(super) diagnostic_level_state: Arc<DiagnosticLevelState>,
    /// Level picked in the diagnostics panel
    pub(super) diagnostic_level: Option<Level>,
}

impl NametagApp {
    pub fn new(
        cc: &CreationContext<'_>,
        mut shell: Shell,
        settings: &Settings,
        diag_rx: Receiver<DiagnosticEvent>,
        diagnostic_level_state: Arc<DiagnosticLevelState>,
    ) -> Self {
        theme::apply(&cc.egui_ctx);

        let state = shell.start();

        Self {
            shell,
            state,
            simulated: settings.simulate,
            show_diagnostics: false,
            diag_rx,
            diagnostics: VecDeque::with_capacity(DIAGNOSTIC_HISTORY),
            diagnostic_level: diagnostic_level_state.get_level(),
            diagnostic_level_state,
        }
    }

    /// Run one action through the shell
    pub(super) fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = self.shell.dispatch(state, action);
    }

    /// Ask for a path, then export there
    pub(super) fn export_as(&mut self) {
        let file_name = self
            .shell
            .export_path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| nametag_registry::DEFAULT_EXPORT_FILE.to_string());

        let path = rfd::FileDialog::new()
            .set_file_name(&file_name)
            .add_filter("Registry files", &["reg"])
            .add_filter("All files", &["*"])
            .save_file();

        match path {
            Some(path) => self.dispatch(Action::ExportRegTo(path)),
            None => tracing::debug!("Export cancelled"),
        }
    }

    fn process_diagnostic_events(&mut self) {
        while let Ok(event) = self.diag_rx.try_recv() {
            if self.diagnostics.len() == DIAGNOSTIC_HISTORY {
                self.diagnostics.pop_front();
            }
            self.diagnostics.push_back(event);
        }
    }

    fn sync_diagnostic_level(&mut self) {
        if self.diagnostic_level_state.get_level() != self.diagnostic_level {
            self.diagnostic_level_state.set_level(self.diagnostic_level);
            tracing::info!(
                source = "Diagnostics",
                "Diagnostics level set to {}",
                crate::diagnostics_layer::level_name(self.diagnostic_level)
            );
        }
    }
}

impl eframe::App for NametagApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_diagnostic_events();
        self.sync_diagnostic_level();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.draw_status_bar(ui);
        });

        if self.show_diagnostics {
            egui::SidePanel::right("diagnostics")
                .default_width(320.0)
                .min_width(240.0)
                .show(ctx, |ui| {
                    self.draw_diagnostics_panel(ui);
                });
        }

        let mut action = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            action = self.draw_main_panel(ui);
        });

        match action {
            Some(PanelAction::Dispatch(action)) => self.dispatch(action),
            Some(PanelAction::ExportAs) => self.export_as(),
            None => {}
        }
    }
}

/// What a click in the main panel asks for
pub(super) enum PanelAction {
    Dispatch(Action),
    /// Needs the file dialog before it becomes an [`Action`]
    ExportAs,
}
