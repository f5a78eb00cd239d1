use crate::domain::model::KeyValues;
use crate::domain::ports::RobotPublisher;
use crate::utils::error::Result;

/// Publishes robot key-values to the log. Stands in for the InOrbit cloud session.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingPublisher;

impl RobotPublisher for LoggingPublisher {
    fn publish_key_values(&self, robot_id: &str, values: &KeyValues) -> Result<()> {
        let payload = serde_json::to_string(values)?;
        tracing::info!(robot_id, "Publishing key-values: {}", payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_publisher_accepts_payload() {
        let mut values = KeyValues::new();
        values.insert("battery".to_string(), serde_json::json!(0.82));
        assert!(LoggingPublisher.publish_key_values("robot-alpha", &values).is_ok());
    }
}
