use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key-value payload published for a robot.
pub type KeyValues = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandResultCode {
    Success,
    Failure,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RobotCommand {
    pub name: String,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl RobotCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_args(mut self, args: Vec<serde_json::Value>) -> Self {
        self.args = args;
        self
    }
}

/// Map image plus the metadata needed to place it in a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(skip)]
    pub image: Vec<u8>,
    pub map_id: String,
    pub map_label: String,
    pub origin_x: f64,
    pub origin_y: f64,
    pub resolution: f64,
}

impl MapConfig {
    pub fn empty(map_id: impl Into<String>) -> Self {
        Self {
            image: Vec::new(),
            map_id: map_id.into(),
            map_label: String::new(),
            origin_x: 0.0,
            origin_y: 0.0,
            resolution: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectorOptions {
    pub register_user_scripts: bool,
    pub create_user_scripts_dir: bool,
    pub publish_connector_system_stats: bool,
}
