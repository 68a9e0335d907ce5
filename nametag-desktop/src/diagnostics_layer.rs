//! Tracing layer that feeds the diagnostics view

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::subscriber::Interest;
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Crates whose events reach the diagnostics view
const PROJECT_CRATES: &[&str] = &[
    "nametag",
    "nametag_detect",
    "nametag_registry",
    "nametag_sim",
];

/// Levels offered in the diagnostics view, most verbose last
pub const LEVEL_CHOICES: &[Option<Level>] = &[
    None,
    Some(Level::ERROR),
    Some(Level::WARN),
    Some(Level::INFO),
    Some(Level::DEBUG),
    Some(Level::TRACE),
];

/// Display name for a diagnostics level
pub fn level_name(level: Option<Level>) -> &'static str {
    match level {
        None => "Off",
        Some(Level::ERROR) => "Error",
        Some(Level::WARN) => "Warn",
        Some(Level::INFO) => "Info",
        Some(Level::DEBUG) => "Debug",
        Some(Level::TRACE) => "Trace",
    }
}

/// Diagnostics level shared between the UI and the filter
///
/// Encoding: 0=off, 1=error, 2=warn, 3=info, 4=debug, 5=trace
pub struct DiagnosticLevelState {
    level: AtomicU8,
}

impl DiagnosticLevelState {
    pub fn new(level: Option<Level>) -> Self {
        Self {
            level: AtomicU8::new(Self::level_to_u8(level)),
        }
    }

    pub fn set_level(&self, level: Option<Level>) {
        self.level
            .store(Self::level_to_u8(level), Ordering::Relaxed);
    }

    pub fn get_level(&self) -> Option<Level> {
        Self::u8_to_level(self.level.load(Ordering::Relaxed))
    }

    fn level_to_u8(level: Option<Level>) -> u8 {
        match level {
            None => 0,
            Some(Level::ERROR) => 1,
            Some(Level::WARN) => 2,
            Some(Level::INFO) => 3,
            Some(Level::DEBUG) => 4,
            Some(Level::TRACE) => 5,
        }
    }

    fn u8_to_level(value: u8) -> Option<Level> {
        match value {
            0 => None,
            1 => Some(Level::ERROR),
            2 => Some(Level::WARN),
            3 => Some(Level::INFO),
            4 => Some(Level::DEBUG),
            _ => Some(Level::TRACE),
        }
    }
}

fn is_project_target(target: &str) -> bool {
    PROJECT_CRATES.iter().any(|name| {
        target == *name
            || target
                .strip_prefix(name)
                .is_some_and(|rest| rest.starts_with("::"))
    })
}

/// Passes project-crate events at or above the current diagnostics level
pub struct ProjectCrateFilter {
    state: Arc<DiagnosticLevelState>,
}

impl ProjectCrateFilter {
    pub fn new(state: Arc<DiagnosticLevelState>) -> Self {
        Self { state }
    }
}

impl<S> tracing_subscriber::layer::Filter<S> for ProjectCrateFilter {
    fn enabled(&self, meta: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        if !is_project_target(meta.target()) {
            return false;
        }

        match self.state.get_level() {
            None => false,
            Some(filter_level) => *meta.level() <= filter_level,
        }
    }

    fn callsite_enabled(&self, meta: &'static Metadata<'static>) -> Interest {
        if is_project_target(meta.target()) {
            // Level can change at runtime
            Interest::sometimes()
        } else {
            Interest::never()
        }
    }
}

/// A diagnostic event captured from tracing
#[derive(Debug, Clone)]
pub struct DiagnosticEvent {
    /// `source` field if present, otherwise derived from the target
    pub source: String,
    pub level: Level,
    pub message: String,
}

/// Layer that forwards events over a channel
pub struct DiagnosticsLayer {
    tx: Sender<DiagnosticEvent>,
}

impl DiagnosticsLayer {
    pub fn new(tx: Sender<DiagnosticEvent>) -> Self {
        Self { tx }
    }
}

impl<S: Subscriber> Layer<S> for DiagnosticsLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let source = visitor
            .source
            .unwrap_or_else(|| simplify_target(event.metadata().target()));

        // Receiver gone means the window closed
        let _ = self.tx.send(DiagnosticEvent {
            source,
            level: *event.metadata().level(),
            message: visitor.message.unwrap_or_default(),
        });
    }
}

/// Console output filtered by `env_filter`, diagnostics view by `state`
///
/// Each filter applies to its own layer only, so lowering the diagnostics
/// level takes effect even when the console filter is stricter.
pub fn build_subscriber(
    env_filter: EnvFilter,
    tx: Sender<DiagnosticEvent>,
    state: Arc<DiagnosticLevelState>,
) -> impl Subscriber + Send + Sync {
    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(env_filter))
        .with(DiagnosticsLayer::new(tx).with_filter(ProjectCrateFilter::new(state)))
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    source: Option<String>,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            "source" => self.source = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => self.message = Some(format!("{:?}", value)),
            "source" => self.source = Some(format!("{:?}", value)),
            _ => {}
        }
    }
}

/// Last module path segment, capitalized: "nametag_registry::namer" -> "Namer"
fn simplify_target(target: &str) -> String {
    let last = target.rsplit("::").next().unwrap_or(target);
    let mut chars = last.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => target.to_string(),
    }
}
