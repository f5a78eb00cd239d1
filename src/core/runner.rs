use crate::config::models::{
    FlowcoreConnectorConfig, MapFileConfig, CONNECTOR_TYPE, MAX_UPDATE_FREQ, MIN_UPDATE_FREQ,
};
use crate::core::user_scripts::{self, UserScripts};
use crate::domain::model::{CommandResultCode, MapConfig, RobotCommand};
use crate::domain::ports::{FleetConnector, RobotPublisher};
use crate::utils::error::{ConnectorError, Result};
use crate::utils::monitor::SystemMonitor;
use crate::utils::validation::validate_range;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;

const EVENT_BUFFER: usize = 32;

#[derive(Debug, Clone)]
pub struct RunnerSettings {
    update_freq: f64,
    /// `None` disables user scripts.
    pub user_scripts_dir: Option<PathBuf>,
    pub maps: BTreeMap<String, MapFileConfig>,
}

impl RunnerSettings {
    /// Fails unless `update_freq` (Hz) is a finite value within the accepted range.
    pub fn new(update_freq: f64) -> Result<Self> {
        validate_range("update_freq", update_freq, MIN_UPDATE_FREQ, MAX_UPDATE_FREQ)?;
        Ok(Self {
            update_freq,
            user_scripts_dir: None,
            maps: BTreeMap::new(),
        })
    }

    pub fn from_config(config: &FlowcoreConnectorConfig) -> Result<Self> {
        let mut settings = Self::new(config.update_freq)?;
        settings.user_scripts_dir = config
            .user_scripts_dir
            .clone()
            .or_else(|| user_scripts::default_dir(CONNECTOR_TYPE));
        settings.maps = config.maps.clone();
        Ok(settings)
    }

    pub fn update_freq(&self) -> f64 {
        self.update_freq
    }

    fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.update_freq)
    }
}

enum ConnectorEvent {
    Command {
        robot_id: String,
        command: RobotCommand,
        reply: oneshot::Sender<Result<CommandResultCode>>,
    },
    MapRequest {
        robot_id: String,
        frame_id: String,
        reply: oneshot::Sender<Option<MapConfig>>,
    },
}

/// Cloneable entry point into a running connector.
#[derive(Clone)]
pub struct ConnectorHandle {
    events: mpsc::Sender<ConnectorEvent>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl ConnectorHandle {
    pub async fn send_command(
        &self,
        robot_id: &str,
        command: RobotCommand,
    ) -> Result<CommandResultCode> {
        let (reply, response) = oneshot::channel();
        self.events
            .send(ConnectorEvent::Command {
                robot_id: robot_id.to_string(),
                command,
                reply,
            })
            .await
            .map_err(|_| ConnectorError::ChannelClosed)?;
        response.await.map_err(|_| ConnectorError::ChannelClosed)?
    }

    pub async fn request_map(&self, robot_id: &str, frame_id: &str) -> Result<Option<MapConfig>> {
        let (reply, response) = oneshot::channel();
        self.events
            .send(ConnectorEvent::MapRequest {
                robot_id: robot_id.to_string(),
                frame_id: frame_id.to_string(),
                reply,
            })
            .await
            .map_err(|_| ConnectorError::ChannelClosed)?;
        response.await.map_err(|_| ConnectorError::ChannelClosed)
    }

    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }
}

/// Drives a [`FleetConnector`] through connect, the periodic execution loop,
/// incoming commands and map requests, and disconnect.
pub struct ConnectorRunner<C: FleetConnector> {
    connector: C,
    publisher: Arc<dyn RobotPublisher>,
    settings: RunnerSettings,
    events: mpsc::Receiver<ConnectorEvent>,
    shutdown: watch::Receiver<bool>,
    map_cache: HashMap<String, MapConfig>,
    scripts: Option<UserScripts>,
    monitor: SystemMonitor,
}

impl<C: FleetConnector> ConnectorRunner<C> {
    pub fn new(
        connector: C,
        publisher: Arc<dyn RobotPublisher>,
        settings: RunnerSettings,
    ) -> (Self, ConnectorHandle) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let monitor = SystemMonitor::new(connector.options().publish_connector_system_stats);

        let runner = Self {
            connector,
            publisher,
            settings,
            events: events_rx,
            shutdown: shutdown_rx,
            map_cache: HashMap::new(),
            scripts: None,
            monitor,
        };
        let handle = ConnectorHandle {
            events: events_tx,
            shutdown: Arc::new(shutdown_tx),
        };
        (runner, handle)
    }

    /// Runs until [`ConnectorHandle::stop`] is called or every handle is dropped.
    /// Returns the connector once it has been disconnected.
    pub async fn run(mut self) -> Result<C> {
        self.connector.connect().await?;
        self.prepare_user_scripts();

        let mut ticker = tokio::time::interval(self.settings.period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !*self.shutdown.borrow() {
            tokio::select! {
                // Err means every handle is gone
                _ = self.shutdown.changed() => {}
                Some(event) = self.events.recv() => self.handle_event(event).await,
                _ = ticker.tick() => self.tick().await,
            }
            if self.shutdown.has_changed().is_err() {
                break;
            }
        }

        tracing::info!("Stopping connector");
        if let Err(e) = self.connector.disconnect().await {
            tracing::error!("Failed to disconnect cleanly: {}", e);
        }
        Ok(self.connector)
    }

    fn prepare_user_scripts(&mut self) {
        let options = self.connector.options();
        if !options.register_user_scripts && !options.create_user_scripts_dir {
            return;
        }
        let Some(dir) = self.settings.user_scripts_dir.clone() else {
            tracing::warn!("No user scripts directory available; user scripts disabled");
            return;
        };

        match UserScripts::prepare(dir, options.create_user_scripts_dir) {
            Ok(mut scripts) => {
                if options.register_user_scripts {
                    if let Err(e) = scripts.discover() {
                        tracing::warn!("Failed to register user scripts: {}", e);
                    }
                    self.scripts = Some(scripts);
                }
            }
            Err(e) => tracing::warn!("Failed to prepare user scripts directory: {}", e),
        }
    }

    async fn tick(&mut self) {
        if let Err(e) = self.connector.execution_loop(self.publisher.as_ref()).await {
            tracing::error!("Error in execution loop: {}", e);
        }
        self.publish_system_stats();
    }

    fn publish_system_stats(&self) {
        let Some(stats) = self.monitor.get_stats() else {
            return;
        };
        let values = stats.to_key_values();
        for robot_id in self.connector.robot_ids() {
            if let Err(e) = self.publisher.publish_key_values(&robot_id, &values) {
                tracing::warn!("Failed to publish system stats for '{}': {}", robot_id, e);
            }
        }
    }

    async fn handle_event(&mut self, event: ConnectorEvent) {
        match event {
            ConnectorEvent::Command {
                robot_id,
                command,
                reply,
            } => {
                let result = self.dispatch_command(&robot_id, &command).await;
                let _ = reply.send(result);
            }
            ConnectorEvent::MapRequest {
                robot_id,
                frame_id,
                reply,
            } => {
                let map = self.resolve_map(&robot_id, &frame_id).await;
                let _ = reply.send(map);
            }
        }
    }

    async fn dispatch_command(
        &self,
        robot_id: &str,
        command: &RobotCommand,
    ) -> Result<CommandResultCode> {
        if !self.connector.robot_ids().iter().any(|id| id == robot_id) {
            return Err(ConnectorError::UnknownRobot {
                robot_id: robot_id.to_string(),
            });
        }

        if let Some(scripts) = self.scripts.as_ref().filter(|s| s.contains(&command.name)) {
            return scripts.run(robot_id, &command.name, &command.args).await;
        }

        match self.connector.handle_command(robot_id, command).await {
            Ok(code) => Ok(code),
            Err(e) => {
                tracing::error!(
                    "Command '{}' failed for robot '{}': {}",
                    command.name,
                    robot_id,
                    e
                );
                Ok(CommandResultCode::Failure)
            }
        }
    }

    async fn resolve_map(&mut self, robot_id: &str, frame_id: &str) -> Option<MapConfig> {
        if let Some(map) = self.map_cache.get(frame_id) {
            return Some(map.clone());
        }

        let map = match self.settings.maps.get(frame_id) {
            Some(file) => match load_map_file(file).await {
                Ok(map) => Some(map),
                Err(e) => {
                    tracing::error!(
                        "Failed to read map file {} for frame '{}': {}",
                        file.file.display(),
                        frame_id,
                        e
                    );
                    None
                }
            },
            None => None,
        };

        let map = match map {
            Some(map) => map,
            None => self.connector.fetch_robot_map(robot_id, frame_id).await?,
        };
        self.map_cache.insert(frame_id.to_string(), map.clone());
        Some(map)
    }
}

async fn load_map_file(file: &MapFileConfig) -> Result<MapConfig> {
    let image = tokio::fs::read(&file.file).await?;
    Ok(MapConfig {
        image,
        map_id: file.map_id.clone(),
        map_label: file.map_label.clone(),
        origin_x: file.origin_x,
        origin_y: file.origin_y,
        resolution: file.resolution,
    })
}
