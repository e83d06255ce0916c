use std::sync::Mutex;

use db_infra::OpsLogger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub severity: Severity,
    pub message: String,
}

/// [`OpsLogger`] that keeps every line for later assertions.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<LogLine>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().expect("recording logger poisoned").clone()
    }

    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.severity == severity)
            .map(|line| line.message)
            .collect()
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages(Severity::Info)
    }

    pub fn criticals(&self) -> Vec<String> {
        self.messages(Severity::Critical)
    }

    fn push(&self, severity: Severity, message: &str) {
        self.lines
            .lock()
            .expect("recording logger poisoned")
            .push(LogLine {
                severity,
                message: message.to_string(),
            });
    }
}

impl OpsLogger for RecordingLogger {
    fn info(&self, message: &str) {
        self.push(Severity::Info, message);
    }

    fn critical(&self, message: &str) {
        self.push(Severity::Critical, message);
    }
}
