use std::sync::Mutex;

/// Write-only diagnostic sink for tracing discovery decisions.
///
/// The discoverer only ever appends lines; nothing reads them back. The
/// host collaborator decides where the lines go (log, output channel,
/// nowhere).
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Discards every line.
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _line: &str) {}
}

/// Captures emitted lines for test assertions.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(line.to_string());
    }
}
