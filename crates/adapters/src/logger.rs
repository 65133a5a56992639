//! Structured JSON logger adapter.

use crate::log_sink::LogSink;
use form_service_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use form_service_shared::{REDACTED, is_secret_key};
use serde_json::Value;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// JSON logger emitting one line per event.
#[derive(Clone)]
pub struct JsonLogger {
    sink: Arc<dyn LogSink>,
    base_fields: LogFields,
    min_level: LogLevel,
}

impl JsonLogger {
    /// Create a JSON logger backed by the provided sink.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            base_fields: LogFields::new(),
            min_level: LogLevel::Info,
        }
    }

    /// Set base fields applied to every event.
    #[must_use]
    pub fn with_base_fields(mut self, fields: LogFields) -> Self {
        self.base_fields = fields;
        self
    }

    /// Set the minimum log level.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    fn render(&self, event: LogEvent) -> String {
        let mut fields = self.base_fields.clone();
        if let Some(extra) = event.fields {
            fields.extend(extra);
        }
        redact_fields(&mut fields);

        let mut error = event.error;
        if let Some(ref mut value) = error {
            redact_value(value);
        }

        let mut payload = serde_json::Map::new();
        payload.insert("timestampMs".to_string(), Value::from(now_epoch_ms()));
        payload.insert("level".to_string(), Value::from(event.level.as_str()));
        payload.insert("event".to_string(), Value::String(event.event.into()));
        payload.insert("message".to_string(), Value::String(event.message.into()));
        if !fields.is_empty() {
            let map = fields
                .into_iter()
                .map(|(key, value)| (key.into_string(), value))
                .collect();
            payload.insert("fields".to_string(), Value::Object(map));
        }
        if let Some(error) = error {
            payload.insert("error".to_string(), error);
        }

        serde_json::to_string(&Value::Object(payload)).map_or_else(
            |_| {
                "{\"timestampMs\":0,\"level\":\"error\",\"event\":\"logger.serialize_failed\",\"message\":\"log serialization failed\"}\n"
                    .to_string()
            },
            |mut encoded| {
                encoded.push('\n');
                encoded
            },
        )
    }
}

impl LoggerPort for JsonLogger {
    fn log(&self, event: LogEvent) {
        if event.level < self.min_level {
            return;
        }
        let line = self.render(event);
        self.sink.write_line(&line);
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut merged = self.base_fields.clone();
        merged.extend(fields);
        Box::new(Self {
            sink: Arc::clone(&self.sink),
            base_fields: merged,
            min_level: self.min_level,
        })
    }
}

fn redact_fields(fields: &mut LogFields) {
    for (key, value) in fields.iter_mut() {
        if is_secret_key(key) {
            *value = Value::String(REDACTED.to_string());
        } else {
            redact_value(value);
        }
    }
}

fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map.iter_mut() {
                if is_secret_key(key) {
                    *nested = Value::String(REDACTED.to_string());
                } else {
                    redact_value(nested);
                }
            }
        },
        Value::Array(items) => {
            for item in items {
                redact_value(item);
            }
        },
        _ => {},
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| u64::try_from(duration.as_millis()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::BufferLogSink;
    use form_service_ports::log_fields;
    use serde_json::json;

    #[test]
    fn redacts_secret_fields_and_error_payloads() -> Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(BufferLogSink::default());
        let logger = JsonLogger::new(sink.clone()).with_min_level(LogLevel::Debug);

        logger.log(LogEvent {
            fields: Some(log_fields([
                ("password", json!("hunter2")), // pragma: allowlist secret
                ("fields", json!(["title", "password"])),
            ])),
            error: Some(json!({ "nested": { "authToken": "abc", "code": 7 } })),
            ..LogEvent::new(LogLevel::Warn, "forms.save.rejected", "submission rejected")
        });

        let lines = sink.take();
        assert_eq!(lines.len(), 1);
        let payload: Value = serde_json::from_str(lines[0].trim())?;
        assert_eq!(payload["level"], json!("warn"));
        assert_eq!(payload["event"], json!("forms.save.rejected"));
        assert_eq!(payload["fields"]["password"], json!(REDACTED));
        assert_eq!(payload["fields"]["fields"], json!(["title", "password"]));
        assert_eq!(payload["error"]["nested"]["authToken"], json!(REDACTED));
        assert_eq!(payload["error"]["nested"]["code"], json!(7));
        Ok(())
    }

    #[test]
    fn filters_below_min_level() {
        let sink = Arc::new(BufferLogSink::default());
        let logger = JsonLogger::new(sink.clone()).with_min_level(LogLevel::Warn);

        logger.info("forms.save.completed", "saved", None);
        logger.error("forms.save.failed", "failed", None);

        let lines = sink.take();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("forms.save.failed"));
    }

    #[test]
    fn child_logger_merges_fields() -> Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(BufferLogSink::default());
        let logger = JsonLogger::new(sink.clone())
            .with_base_fields(log_fields([("service", "forms")]));

        let child = logger.child(log_fields([("form", "article")]));
        child.info("forms.update.completed", "updated", None);

        let lines = sink.take();
        let payload: Value = serde_json::from_str(lines[0].trim())?;
        assert_eq!(payload["fields"]["service"], json!("forms"));
        assert_eq!(payload["fields"]["form"], json!("article"));
        Ok(())
    }
}
