use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;

/// A structured log line, for call sites that build one up field-by-field
/// instead of going through `tracing`'s macros directly.
#[derive(Debug, Clone)]
pub struct StructuredLog {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
    pub fields: HashMap<String, serde_json::Value>,
}

impl StructuredLog {
    pub fn new(level: &str, target: &str, message: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            level: level.to_string(),
            target: target.to_string(),
            message: message.to_string(),
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn to_json(&self) -> String {
        json!({
            "timestamp": self.timestamp,
            "level": self.level,
            "target": self.target,
            "message": self.message,
            "fields": self.fields,
        })
        .to_string()
    }
}

pub fn log_simulation_completed(simulation_id: &str, elapsed_hours: f64, beached: usize, remaining_pct: f64) {
    let log = StructuredLog::new("INFO", "oilspill_driver", "simulation completed")
        .with_field("simulation_id", simulation_id)
        .with_field("elapsed_hours", elapsed_hours)
        .with_field("beached", beached as u64)
        .with_field("remaining_pct", remaining_pct);

    println!("{}", log.to_json());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_log_serializes_fields() {
        let log = StructuredLog::new("INFO", "test", "hello").with_field("n", 42);
        let json = log.to_json();
        assert!(json.contains("\"n\":42"));
        assert!(json.contains("\"message\":\"hello\""));
    }
}
