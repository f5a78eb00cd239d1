use crate::domain::model::{CommandResultCode, ConnectorOptions, KeyValues, MapConfig, RobotCommand};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Outbound side of the InOrbit session.
pub trait RobotPublisher: Send + Sync {
    fn publish_key_values(&self, robot_id: &str, values: &KeyValues) -> Result<()>;
}

/// Fleet-specific hooks driven by [`crate::core::runner::ConnectorRunner`].
#[async_trait]
pub trait FleetConnector: Send + Sync {
    fn robot_ids(&self) -> Vec<String>;

    fn options(&self) -> ConnectorOptions {
        ConnectorOptions::default()
    }

    async fn connect(&mut self) -> Result<()>;

    async fn disconnect(&mut self) -> Result<()>;

    async fn execution_loop(&self, publisher: &dyn RobotPublisher) -> Result<()>;

    async fn handle_command(
        &self,
        robot_id: &str,
        command: &RobotCommand,
    ) -> Result<CommandResultCode>;

    /// Called for frames without a pre-configured map. `None` means the map is unavailable.
    async fn fetch_robot_map(&self, robot_id: &str, frame_id: &str) -> Option<MapConfig>;
}
