//! UI panel drawing methods

use egui::{RichText, Ui};
use nametag_detect::{chip_name, SPOOF_TARGET};
use nametag_registry::MAX_NAME_LENGTH;

use crate::diagnostics_layer::{level_name, LEVEL_CHOICES};
use crate::settings::Settings;
use crate::shell::{Action, DeviceStatus, LogLine};

use super::theme;
use super::{NametagApp, PanelAction};

impl NametagApp {
    /// Draw the toolbar
    pub(super) fn draw_toolbar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("USB FriendlyName Editor").strong());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if self.show_diagnostics {
                    "Hide Diagnostics"
                } else {
                    "Diagnostics"
                };
                if ui.button(label).clicked() {
                    self.show_diagnostics = !self.show_diagnostics;
                }

                ui.separator();

                if self.state.elevated {
                    ui.label(RichText::new("Administrator").color(theme::SUCCESS));
                } else {
                    ui.label(RichText::new("Not elevated").color(theme::WARNING));
                }

                if self.simulated {
                    ui.separator();
                    ui.label(RichText::new("Simulated").color(theme::ACCENT));
                }
            });
        });
    }

    /// Draw the status line and config location
    pub(super) fn draw_status_bar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            let color = match self.state.device {
                DeviceStatus::Found(_) => theme::SUCCESS,
                DeviceStatus::NotFound => theme::WARNING,
                DeviceStatus::NotChecked => theme::MUTED,
            };
            ui.label(RichText::new(&self.state.status).color(color));

            if let Some(path) = Settings::settings_path() {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        RichText::new(format!("Config: {}", path.display()))
                            .small()
                            .color(theme::MUTED),
                    );
                });
            }
        });
    }

    /// Draw devices, name field, buttons and output log
    pub(super) fn draw_main_panel(&mut self, ui: &mut Ui) -> Option<PanelAction> {
        let mut action = None;

        ui.label(RichText::new("Connected USB Devices:").strong());
        egui::ScrollArea::vertical()
            .id_salt("devices")
            .max_height(90.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                if self.state.devices.is_empty() {
                    ui.label(RichText::new("No serial devices").color(theme::MUTED));
                }
                let target_port = self.state.target().map(|d| d.port.clone());
                for device in &self.state.devices {
                    let mut text = RichText::new(device.list_label());
                    if target_port.as_deref() == Some(device.port.as_str()) {
                        text = text.color(theme::ACCENT);
                    }
                    ui.label(text);
                }
            });

        ui.add_space(8.0);
        ui.label(RichText::new("Custom Spoof Name:").strong());
        ui.add(
            egui::TextEdit::singleline(&mut self.state.custom_name)
                .hint_text("Enter custom spoof name")
                .char_limit(MAX_NAME_LENGTH)
                .desired_width(f32::INFINITY),
        );

        ui.add_space(8.0);
        ui.horizontal_wrapped(|ui| {
            let can_rename = self.state.elevated && self.state.target().is_some();
            let rename_hint = if self.state.elevated {
                "Connect a supported device first"
            } else {
                "Requires Administrator privileges"
            };

            // Buttons stay enabled; the shell logs unmet preconditions
            if ui
                .button("Restore")
                .on_hover_text(if can_rename {
                    "Write the driver's original name back"
                } else {
                    rename_hint
                })
                .clicked()
            {
                action = Some(PanelAction::Dispatch(Action::Restore));
            }
            let spoof_hint = match chip_name(Some(SPOOF_TARGET.vid), Some(SPOOF_TARGET.pid)) {
                Some(chip) => format!("Make the {} present itself as a CH340", chip),
                None => "Present the device as a CH340".to_string(),
            };
            if ui
                .button("Spoof Default")
                .on_hover_text(if can_rename { spoof_hint.as_str() } else { rename_hint })
                .clicked()
            {
                action = Some(PanelAction::Dispatch(Action::SpoofDefault));
            }
            if ui.button("Custom Name").clicked() {
                action = Some(PanelAction::Dispatch(Action::CustomName));
            }

            ui.separator();

            if ui
                .button("Export .reg")
                .on_hover_text(format!("Write {}", self.shell.export_path().display()))
                .clicked()
            {
                action = Some(PanelAction::Dispatch(Action::ExportReg));
            }
            if ui.button("Export As...").clicked() {
                action = Some(PanelAction::ExportAs);
            }

            ui.separator();

            if ui.button("Refresh").clicked() {
                action = Some(PanelAction::Dispatch(Action::Refresh));
            }
        });

        ui.add_space(8.0);
        ui.label(RichText::new("Output Log:").strong());
        egui::Frame::NONE
            .fill(theme::FIELD)
            .inner_margin(6.0)
            .show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("log")
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for line in &self.state.log {
                            draw_log_line(ui, line);
                        }
                    });
            });

        action
    }

    /// Draw the diagnostics side panel
    pub(super) fn draw_diagnostics_panel(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("Diagnostics");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Clear").clicked() {
                    self.diagnostics.clear();
                }

                ui.menu_button(
                    format!("Logs: {}", level_name(self.diagnostic_level)),
                    |ui| {
                        for level in LEVEL_CHOICES {
                            if ui
                                .selectable_label(self.diagnostic_level == *level, level_name(*level))
                                .clicked()
                            {
                                self.diagnostic_level = *level;
                                ui.close();
                            }
                        }
                    },
                );
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("diagnostics")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for event in &self.diagnostics {
                    ui.label(
                        RichText::new(format!("[{}] {}", event.source, event.message))
                            .small()
                            .color(theme::level_color(event.level)),
                    );
                }
            });

        // Events arrive from the tracing layer between frames
        ui.ctx()
            .request_repaint_after(std::time::Duration::from_millis(250));
    }
}

fn draw_log_line(ui: &mut Ui, line: &LogLine) {
    ui.label(RichText::new(&line.text).color(theme::log_color(line.level)));
}
