use crate::config::env::{
    load_env_file, setting, substitute_in_value, EnvSource, ProcessEnv, DEFAULT_ENV_FILE,
};
use crate::utils::error::{ConnectorError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_path, validate_range,
    validate_required_field, validate_unique, Validate,
};
use crate::config::lenient;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub const CONNECTOR_TYPE: &str = "flowcore";

pub const DEFAULT_FLEET_PORT: u16 = 80;

pub const DEFAULT_UPDATE_FREQ: f64 = 1.0;

/// Accepted execution loop frequencies, in Hz.
pub const MIN_UPDATE_FREQ: f64 = 0.01;
pub const MAX_UPDATE_FREQ: f64 = 100.0;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Fleet-wide settings shared by all robots.
///
/// Any field left out of the YAML file is read from `INORBIT_FLOWCORE_<FIELD>`
/// (e.g. `fleet_host` -> `INORBIT_FLOWCORE_FLEET_HOST`). Values in the file win.
#[derive(Clone, PartialEq, Serialize)]
pub struct FlowcoreConfig {
    pub fleet_host: String,
    pub fleet_port: u16,
    pub fleet_username: String,
    #[serde(skip_serializing)]
    pub fleet_password: String,
    /// Keys this connector does not know about, kept for custom extensions.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl fmt::Debug for FlowcoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowcoreConfig")
            .field("fleet_host", &self.fleet_host)
            .field("fleet_port", &self.fleet_port)
            .field("fleet_username", &self.fleet_username)
            .field("fleet_password", &"***")
            .field("extra", &self.extra)
            .finish()
    }
}

/// `connector_config` as written in the YAML file, before the environment fills the gaps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowcoreConfigOverrides {
    pub fleet_host: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_number")]
    pub fleet_port: Option<u16>,
    pub fleet_username: Option<String>,
    pub fleet_password: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl FlowcoreConfig {
    pub fn from_sources(overrides: FlowcoreConfigOverrides, env: &dyn EnvSource) -> Result<Self> {
        let fleet_host = validate_required_field(
            "connector_config.fleet_host",
            overrides
                .fleet_host
                .or_else(|| setting(env, "fleet_host")),
        )?;
        let fleet_username = validate_required_field(
            "connector_config.fleet_username",
            overrides
                .fleet_username
                .or_else(|| setting(env, "fleet_username")),
        )?;
        let fleet_password = validate_required_field(
            "connector_config.fleet_password",
            overrides
                .fleet_password
                .or_else(|| setting(env, "fleet_password")),
        )?;

        let fleet_port = match overrides.fleet_port {
            Some(port) => port,
            None => match setting(env, "fleet_port") {
                Some(raw) => {
                    raw.trim()
                        .parse()
                        .map_err(|_| ConnectorError::InvalidConfigValueError {
                            field: "connector_config.fleet_port".to_string(),
                            value: raw.clone(),
                            reason: "Port must be an integer between 0 and 65535".to_string(),
                        })?
                }
                None => DEFAULT_FLEET_PORT,
            },
        };

        Ok(Self {
            fleet_host,
            fleet_port,
            fleet_username,
            fleet_password,
            extra: overrides.extra,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub video_url: String,
    #[serde(default, deserialize_with = "lenient::option_number")]
    pub quality: Option<u8>,
    #[serde(default, deserialize_with = "lenient::option_number")]
    pub rate: Option<u32>,
    #[serde(default, deserialize_with = "lenient::option_number")]
    pub scaling: Option<f64>,
}

/// A robot in the fleet, identified both in InOrbit and in FLOWCore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowcoreRobotConfig {
    pub robot_id: String,
    #[serde(deserialize_with = "lenient::number")]
    pub fleet_robot_id: i64,
    #[serde(default)]
    pub cameras: Vec<CameraConfig>,
}

/// A map served from disk instead of being fetched from the fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFileConfig {
    pub file: PathBuf,
    pub map_id: String,
    #[serde(default)]
    pub map_label: String,
    #[serde(deserialize_with = "lenient::number")]
    pub origin_x: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub origin_y: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub resolution: f64,
}

#[derive(Debug, Deserialize)]
struct ConnectorConfigFile {
    connector_type: String,
    #[serde(default)]
    connector_config: FlowcoreConfigOverrides,
    fleet: Vec<FlowcoreRobotConfig>,
    #[serde(default = "default_update_freq", deserialize_with = "lenient::number")]
    update_freq: f64,
    #[serde(default)]
    log_level: Option<String>,
    #[serde(default)]
    user_scripts_dir: Option<PathBuf>,
    #[serde(default)]
    maps: BTreeMap<String, MapFileConfig>,
}

fn default_update_freq() -> f64 {
    DEFAULT_UPDATE_FREQ
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowcoreConnectorConfig {
    pub connector_type: String,
    pub connector_config: FlowcoreConfig,
    pub fleet: Vec<FlowcoreRobotConfig>,
    /// Execution loop frequency in Hz.
    pub update_freq: f64,
    pub log_level: Option<String>,
    pub user_scripts_dir: Option<PathBuf>,
    /// Pre-configured maps keyed by frame id.
    pub maps: BTreeMap<String, MapFileConfig>,
}

impl FlowcoreConnectorConfig {
    /// Loads a YAML config file, filling unset fleet settings from `config/.env`
    /// and the process environment.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConnectorError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        load_env_file(DEFAULT_ENV_FILE);

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content, &ProcessEnv)
    }

    /// Parses and validates YAML content against the given environment.
    ///
    /// `${VAR}` placeholders are resolved inside parsed scalar values, so secrets
    /// containing YAML syntax (`#`, `: `) are taken verbatim.
    pub fn from_yaml_str(content: &str, env: &dyn EnvSource) -> Result<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(content)?;
        let processed = substitute_in_value(raw, env)?;
        let file: ConnectorConfigFile = serde_yaml::from_value(processed)?;

        let config = Self {
            connector_type: file.connector_type,
            connector_config: FlowcoreConfig::from_sources(file.connector_config, env)?,
            fleet: file.fleet,
            update_freq: file.update_freq,
            log_level: file.log_level.map(|level| level.to_ascii_lowercase()),
            user_scripts_dir: file.user_scripts_dir,
            maps: file.maps,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn robot_ids(&self) -> Vec<String> {
        self.fleet.iter().map(|robot| robot.robot_id.clone()).collect()
    }

    pub fn robot(&self, robot_id: &str) -> Option<&FlowcoreRobotConfig> {
        self.fleet.iter().find(|robot| robot.robot_id == robot_id)
    }

    fn check_connector_type(&self) -> Result<()> {
        if self.connector_type != CONNECTOR_TYPE {
            return Err(ConnectorError::config(
                "connector_type",
                format!(
                    "Expected connector type '{}' not '{}'",
                    CONNECTOR_TYPE, self.connector_type
                ),
            ));
        }
        Ok(())
    }
}

impl Validate for FlowcoreConnectorConfig {
    fn validate(&self) -> Result<()> {
        self.check_connector_type()?;

        let fleet_config = &self.connector_config;
        validate_non_empty_string("connector_config.fleet_host", &fleet_config.fleet_host)?;
        validate_non_empty_string(
            "connector_config.fleet_username",
            &fleet_config.fleet_username,
        )?;
        validate_non_empty_string(
            "connector_config.fleet_password",
            &fleet_config.fleet_password,
        )?;

        for robot in &self.fleet {
            validate_non_empty_string("fleet.robot_id", &robot.robot_id)?;
            for camera in &robot.cameras {
                validate_non_empty_string("fleet.cameras.video_url", &camera.video_url)?;
            }
        }
        validate_unique("robot_id", self.fleet.iter().map(|robot| &robot.robot_id))?;
        validate_unique(
            "fleet_robot_id",
            self.fleet.iter().map(|robot| &robot.fleet_robot_id),
        )?;

        validate_range(
            "update_freq",
            self.update_freq,
            MIN_UPDATE_FREQ,
            MAX_UPDATE_FREQ,
        )?;

        if let Some(level) = &self.log_level {
            validate_one_of("log_level", level, &LOG_LEVELS)?;
        }

        if let Some(dir) = &self.user_scripts_dir {
            validate_path("user_scripts_dir", &dir.to_string_lossy())?;
        }

        for (frame_id, map) in &self.maps {
            validate_non_empty_string("maps.map_id", &map.map_id)?;
            validate_path(&format!("maps.{}.file", frame_id), &map.file.to_string_lossy())?;
        }

        Ok(())
    }
}
