pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use crate::core::{
    connector::FlowcoreConnector,
    runner::{ConnectorHandle, ConnectorRunner, RunnerSettings},
};
pub use adapters::publisher::LoggingPublisher;
pub use config::models::{
    FlowcoreConfig, FlowcoreConnectorConfig, FlowcoreRobotConfig, CONNECTOR_TYPE,
};
pub use utils::error::{ConnectorError, Result};
