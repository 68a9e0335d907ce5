//! Explicit application state handed through every action

use nametag_detect::DeviceRecord;

/// What the last device query found for the spoof target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeviceStatus {
    /// No query has run yet
    #[default]
    NotChecked,
    Found(DeviceRecord),
    NotFound,
}

/// Severity of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One line of the output log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub text: String,
}

/// Everything the window shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellState {
    /// Whether the process runs with administrative rights
    pub elevated: bool,
    pub device: DeviceStatus,
    /// Every attached serial device from the last query
    pub devices: Vec<DeviceRecord>,
    /// Contents of the custom name field
    pub custom_name: String,
    /// Single-line status text
    pub status: String,
    /// Output log, append-only
    pub log: Vec<LogLine>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            elevated: false,
            device: DeviceStatus::NotChecked,
            devices: Vec::new(),
            custom_name: String::new(),
            status: "Status: Ready".to_string(),
            log: Vec::new(),
        }
    }
}

impl ShellState {
    /// The target device, if the last query found it
    pub fn target(&self) -> Option<&DeviceRecord> {
        match &self.device {
            DeviceStatus::Found(record) => Some(record),
            _ => None,
        }
    }

    /// Append a line to the log and mirror it to tracing
    pub fn push_log(&mut self, level: LogLevel, text: impl Into<String>) {
        let text = text.into();
        match level {
            LogLevel::Info | LogLevel::Success => tracing::info!(source = "Shell", "{}", text),
            LogLevel::Warning => tracing::warn!(source = "Shell", "{}", text),
            LogLevel::Error => tracing::error!(source = "Shell", "{}", text),
        }
        self.log.push(LogLine { level, text });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push_log(LogLevel::Info, text);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push_log(LogLevel::Success, text);
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.push_log(LogLevel::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push_log(LogLevel::Error, text);
    }

    /// Number of log lines at `level`
    #[cfg(test)]
    pub fn count(&self, level: LogLevel) -> usize {
        self.log.iter().filter(|line| line.level == level).count()
    }
}
