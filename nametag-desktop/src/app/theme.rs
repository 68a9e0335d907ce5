//! Dark palette and monospace text

use egui::{Color32, Stroke, TextStyle, Theme};

use crate::shell::LogLevel;

pub const BACKGROUND: Color32 = Color32::from_rgb(0x1a, 0x1b, 0x26);
pub const FOREGROUND: Color32 = Color32::from_rgb(0xc0, 0xca, 0xf5);
pub const FIELD: Color32 = Color32::from_rgb(0x2b, 0x2d, 0x3c);
pub const BUTTON: Color32 = Color32::from_rgb(0x3b, 0x3d, 0x5e);
pub const BUTTON_HOVER: Color32 = Color32::from_rgb(0x4a, 0x4d, 0x75);
pub const MUTED: Color32 = Color32::from_rgb(0x7a, 0x80, 0xa8);

pub const SUCCESS: Color32 = Color32::from_rgb(0x9e, 0xce, 0x6a);
pub const WARNING: Color32 = Color32::from_rgb(0xe0, 0xaf, 0x68);
pub const ERROR: Color32 = Color32::from_rgb(0xf7, 0x76, 0x8e);
pub const ACCENT: Color32 = Color32::from_rgb(0x7a, 0xa2, 0xf7);

/// Install the palette and make every text style monospace
pub fn apply(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.override_text_color = Some(FOREGROUND);
    visuals.panel_fill = BACKGROUND;
    visuals.window_fill = BACKGROUND;
    visuals.extreme_bg_color = FIELD;
    visuals.faint_bg_color = FIELD;
    visuals.selection.bg_fill = BUTTON_HOVER;

    visuals.widgets.inactive.bg_fill = BUTTON;
    visuals.widgets.inactive.weak_bg_fill = BUTTON;
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, BUTTON);
    visuals.widgets.hovered.bg_fill = BUTTON_HOVER;
    visuals.widgets.hovered.weak_bg_fill = BUTTON_HOVER;
    visuals.widgets.active.bg_fill = BUTTON_HOVER;
    visuals.widgets.active.weak_bg_fill = BUTTON_HOVER;

    ctx.set_theme(Theme::Dark);
    ctx.set_visuals_of(Theme::Dark, visuals);
    ctx.all_styles_mut(|style| {
        style.override_text_style = Some(TextStyle::Monospace);
    });
}

/// Text color for an output log line
pub fn log_color(level: LogLevel) -> Color32 {
    match level {
        LogLevel::Info => FOREGROUND,
        LogLevel::Success => SUCCESS,
        LogLevel::Warning => WARNING,
        LogLevel::Error => ERROR,
    }
}

/// Text color for a diagnostics entry
pub fn level_color(level: tracing::Level) -> Color32 {
    match level {
        tracing::Level::ERROR => ERROR,
        tracing::Level::WARN => WARNING,
        tracing::Level::INFO => FOREGROUND,
        _ => MUTED,
    }
}
