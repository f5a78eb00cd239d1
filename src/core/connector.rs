use crate::config::models::FlowcoreConnectorConfig;
use crate::core::fleet_client::FleetClient;
use crate::domain::model::{
    CommandResultCode, ConnectorOptions, KeyValues, MapConfig, RobotCommand,
};
use crate::domain::ports::{FleetConnector, RobotPublisher};
use crate::utils::error::Result;
use async_trait::async_trait;

pub const CONNECTOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Connector between FLOWCore and InOrbit.
pub struct FlowcoreConnector {
    config: FlowcoreConnectorConfig,
    client: Option<FleetClient>,
}

impl FlowcoreConnector {
    pub fn new(config: FlowcoreConnectorConfig) -> Self {
        tracing::info!("Initialized FLOWCore Connector");
        Self {
            config,
            client: None,
        }
    }

    pub fn config(&self) -> &FlowcoreConnectorConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// FLOWCore's id for an InOrbit robot.
    pub fn fleet_robot_id(&self, robot_id: &str) -> Option<i64> {
        self.config.robot(robot_id).map(|robot| robot.fleet_robot_id)
    }

    fn load_map(&self, robot_id: &str, frame_id: &str) -> Result<MapConfig> {
        // FLOWCore has no map endpoint wired up yet; serve an empty map for the frame.
        tracing::debug!(
            "Using empty map for frame '{}' (fleet robot {:?})",
            frame_id,
            self.fleet_robot_id(robot_id)
        );
        Ok(MapConfig::empty(frame_id))
    }
}

#[async_trait]
impl FleetConnector for FlowcoreConnector {
    fn robot_ids(&self) -> Vec<String> {
        self.config.robot_ids()
    }

    fn options(&self) -> ConnectorOptions {
        ConnectorOptions {
            register_user_scripts: true,
            create_user_scripts_dir: true,
            publish_connector_system_stats: true,
        }
    }

    async fn connect(&mut self) -> Result<()> {
        let client = FleetClient::new(&self.config.connector_config)?;
        let status = client.probe().await?;
        tracing::info!(
            "Connected to FLOWCore API at {} ({})",
            client.base_url(),
            status
        );
        for robot in &self.config.fleet {
            if !robot.cameras.is_empty() {
                tracing::info!(
                    "Robot '{}' has {} camera(s) configured",
                    robot.robot_id,
                    robot.cameras.len()
                );
            }
        }
        self.client = Some(client);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.client = None;
        tracing::info!("Disconnected from FLOWCore API");
        Ok(())
    }

    async fn execution_loop(&self, publisher: &dyn RobotPublisher) -> Result<()> {
        for robot_id in self.robot_ids() {
            let mut values = KeyValues::new();
            values.insert(
                "connector_version".to_string(),
                serde_json::Value::String(CONNECTOR_VERSION.to_string()),
            );
            publisher.publish_key_values(&robot_id, &values)?;
        }
        tracing::debug!("Executing main execution loop");
        Ok(())
    }

    async fn handle_command(
        &self,
        robot_id: &str,
        command: &RobotCommand,
    ) -> Result<CommandResultCode> {
        tracing::debug!(
            "Received command '{}' for robot '{}'\n  Args: {:?}\n  Options: {:?}",
            command.name,
            robot_id,
            command.args,
            command.options
        );
        Ok(CommandResultCode::Success)
    }

    async fn fetch_robot_map(&self, robot_id: &str, frame_id: &str) -> Option<MapConfig> {
        tracing::info!("Fetching map '{}' for robot '{}'", frame_id, robot_id);

        match self.load_map(robot_id, frame_id) {
            Ok(map) => Some(map),
            Err(e) => {
                tracing::error!(
                    "Failed to fetch map '{}' from FLOWCore API: {}",
                    frame_id,
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<(String, KeyValues)>>,
    }

    impl RobotPublisher for RecordingPublisher {
        fn publish_key_values(&self, robot_id: &str, values: &KeyValues) -> Result<()> {
            self.published
                .lock()
                .unwrap()
                .push((robot_id.to_string(), values.clone()));
            Ok(())
        }
    }

    fn connector() -> FlowcoreConnector {
        let yaml = r#"
connector_type: flowcore
connector_config:
  fleet_host: fleet.example.com
  fleet_username: user
  fleet_password: pass
fleet:
  - robot_id: robot-alpha
    fleet_robot_id: 101
  - robot_id: robot-beta
    fleet_robot_id: 102
"#;
        let config =
            FlowcoreConnectorConfig::from_yaml_str(yaml, &HashMap::<String, String>::new())
                .unwrap();
        FlowcoreConnector::new(config)
    }

    #[test]
    fn test_all_base_options_enabled() {
        let options = connector().options();
        assert!(options.register_user_scripts);
        assert!(options.create_user_scripts_dir);
        assert!(options.publish_connector_system_stats);
    }

    #[test]
    fn test_fleet_robot_id_lookup() {
        let connector = connector();
        assert_eq!(connector.fleet_robot_id("robot-beta"), Some(102));
        assert_eq!(connector.fleet_robot_id("robot-gamma"), None);
    }

    #[tokio::test]
    async fn test_execution_loop_publishes_version_per_robot() {
        let connector = connector();
        let publisher = RecordingPublisher::default();

        connector.execution_loop(&publisher).await.unwrap();

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].0, "robot-alpha");
        assert_eq!(
            published[1].1["connector_version"],
            serde_json::json!(CONNECTOR_VERSION)
        );
    }

    #[tokio::test]
    async fn test_commands_succeed() {
        let result = connector()
            .handle_command("robot-alpha", &RobotCommand::new("dock"))
            .await
            .unwrap();
        assert_eq!(result, CommandResultCode::Success);
    }

    #[tokio::test]
    async fn test_fetch_robot_map_uses_frame_as_map_id() {
        let map = connector()
            .fetch_robot_map("robot-alpha", "floor-2")
            .await
            .unwrap();
        assert_eq!(map.map_id, "floor-2");
        assert!(map.image.is_empty());
        assert_eq!(map.resolution, 0.0);
    }
}
