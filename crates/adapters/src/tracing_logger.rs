//! Logger adapter that forwards events to `tracing`.
//!
//! Lets binaries install a `tracing-subscriber` once and have application
//! events flow through the same filter and formatter.

use form_service_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use form_service_shared::{REDACTED, is_secret_key};
use serde_json::Value;

/// `LoggerPort` implementation backed by the `tracing` macros.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    base_fields: LogFields,
}

impl TracingLogger {
    /// Create a logger with no base fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoggerPort for TracingLogger {
    fn log(&self, event: LogEvent) {
        let mut fields = self.base_fields.clone();
        if let Some(extra) = event.fields {
            fields.extend(extra);
        }
        let fields = render_fields(&fields);
        let error = event.error.map(|error| error.to_string()).unwrap_or_default();
        let name = &*event.event;
        let message = &*event.message;

        match event.level {
            LogLevel::Debug => {
                tracing::debug!(log_event = name, fields = %fields, error = %error, "{message}");
            },
            LogLevel::Info => {
                tracing::info!(log_event = name, fields = %fields, error = %error, "{message}");
            },
            LogLevel::Warn => {
                tracing::warn!(log_event = name, fields = %fields, error = %error, "{message}");
            },
            LogLevel::Error => {
                tracing::error!(log_event = name, fields = %fields, error = %error, "{message}");
            },
        }
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut merged = self.base_fields.clone();
        merged.extend(fields);
        Box::new(Self {
            base_fields: merged,
        })
    }
}

fn render_fields(fields: &LogFields) -> String {
    let map: serde_json::Map<String, Value> = fields
        .iter()
        .map(|(key, value)| {
            let value = if is_secret_key(key) {
                Value::String(REDACTED.to_string())
            } else {
                value.clone()
            };
            (key.to_string(), value)
        })
        .collect();
    Value::Object(map).to_string()
}
