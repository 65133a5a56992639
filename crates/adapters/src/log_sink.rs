//! Log sink helpers for logger adapters.

use std::io::Write;
use std::sync::Mutex;

/// A sink that receives pre-formatted log lines.
pub trait LogSink: Send + Sync {
    /// Write a line to the sink.
    fn write_line(&self, line: &str);
}

/// Log sink that writes to stderr.
#[derive(Debug, Default)]
pub struct StderrLogSink;

impl LogSink for StderrLogSink {
    fn write_line(&self, line: &str) {
        let mut stderr = std::io::stderr();
        if let Err(error) = stderr.write_all(line.as_bytes()) {
            eprintln!("log sink write failed: {error}");
        }
    }
}

/// Log sink that keeps lines in memory, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct BufferLogSink {
    lines: Mutex<Vec<String>>,
}

impl BufferLogSink {
    /// Drain and return the captured lines.
    pub fn take(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default()
    }
}

impl LogSink for BufferLogSink {
    fn write_line(&self, line: &str) {
        if let Ok(mut guard) = self.lines.lock() {
            guard.push(line.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_sink_captures_and_drains() {
        let sink = BufferLogSink::default();
        sink.write_line("hello\n");
        sink.write_line("world\n");

        assert_eq!(sink.take(), vec!["hello\n".to_string(), "world\n".to_string()]);
        assert!(sink.take().is_empty());
    }
}
