use crate::domain::model::CommandResultCode;
use crate::utils::error::{ConnectorError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const SCRIPT_EXTENSION: &str = "sh";

/// `~/.inorbit_connectors/connector-<type>/local`
pub fn default_dir(connector_type: &str) -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(".inorbit_connectors")
            .join(format!("connector-{}", connector_type))
            .join("local")
    })
}

/// Shell scripts exposed as robot commands, keyed by file name.
#[derive(Debug, Clone)]
pub struct UserScripts {
    dir: PathBuf,
    scripts: BTreeMap<String, PathBuf>,
}

impl UserScripts {
    pub fn prepare(dir: impl Into<PathBuf>, create: bool) -> Result<Self> {
        let dir = dir.into();
        if create && !dir.exists() {
            std::fs::create_dir_all(&dir)?;
            tracing::info!("Created user scripts directory {}", dir.display());
        }
        Ok(Self {
            dir,
            scripts: BTreeMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Registers every `*.sh` file in the directory. A missing directory registers nothing.
    pub fn discover(&mut self) -> Result<usize> {
        self.scripts.clear();
        if !self.dir.is_dir() {
            tracing::warn!(
                "User scripts directory {} does not exist",
                self.dir.display()
            );
            return Ok(0);
        }

        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_script = path.is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(SCRIPT_EXTENSION);
            if !is_script {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                self.scripts.insert(name.to_string(), path.clone());
            }
        }

        tracing::info!(
            "Registered {} user script(s) from {}",
            self.scripts.len(),
            self.dir.display()
        );
        Ok(self.scripts.len())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.scripts.keys().map(String::as_str).collect()
    }

    /// Runs a registered script through `sh`; string args are passed verbatim, others as JSON.
    pub async fn run(
        &self,
        robot_id: &str,
        name: &str,
        args: &[serde_json::Value],
    ) -> Result<CommandResultCode> {
        let path = self
            .scripts
            .get(name)
            .ok_or_else(|| ConnectorError::CommandError {
                robot_id: robot_id.to_string(),
                command: name.to_string(),
                message: "script is not registered".to_string(),
            })?;

        let args: Vec<String> = args
            .iter()
            .map(|arg| match arg {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();

        tracing::info!("Running user script '{}' for robot '{}'", name, robot_id);
        let output = Command::new("sh")
            .arg(path)
            .args(&args)
            .env("INORBIT_ROBOT_ID", robot_id)
            .current_dir(&self.dir)
            .output()
            .await?;

        if output.status.success() {
            tracing::debug!(
                "Script '{}' output: {}",
                name,
                String::from_utf8_lossy(&output.stdout).trim()
            );
            Ok(CommandResultCode::Success)
        } else {
            tracing::error!(
                "Script '{}' exited with {}: {}",
                name,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            Ok(CommandResultCode::Failure)
        }
    }
}
