pub mod connector;
pub mod fleet_client;
pub mod runner;
pub mod user_scripts;

pub use crate::domain::model::{CommandResultCode, KeyValues, MapConfig, RobotCommand};
pub use crate::domain::ports::{FleetConnector, RobotPublisher};
pub use crate::utils::error::Result;
