use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("Configuration file '{path}' not found")]
    ConfigNotFound { path: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Fleet API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field '{field}'")]
    MissingConfigError { field: String },

    #[error("Failed to connect to fleet: {message}")]
    ConnectionError { message: String },

    #[error("Fleet API rejected credentials: {message}")]
    AuthenticationError { message: String },

    #[error("Robot '{robot_id}' is not part of this fleet")]
    UnknownRobot { robot_id: String },

    #[error("Command '{command}' failed for robot '{robot_id}': {message}")]
    CommandError {
        robot_id: String,
        command: String,
        message: String,
    },

    #[error("Connector is no longer running")]
    ChannelClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Io,
    Data,
    Command,
    Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ConnectorError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigNotFound { .. }
            | Self::YamlError(_)
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::ApiError(_) | Self::ConnectionError { .. } | Self::AuthenticationError { .. } => {
                ErrorCategory::Network
            }
            Self::IoError(_) => ErrorCategory::Io,
            Self::SerializationError(_) => ErrorCategory::Data,
            Self::UnknownRobot { .. } | Self::CommandError { .. } => ErrorCategory::Command,
            Self::ChannelClosed => ErrorCategory::Runtime,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Command => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Io | ErrorCategory::Runtime => ErrorSeverity::Critical,
        }
    }

    pub fn is_config_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "Check the path passed to --config",
            Self::YamlError(_) => "Make sure the configuration file is valid YAML",
            Self::MissingConfigError { .. } => {
                "Set the field in the YAML file or export the matching INORBIT_FLOWCORE_ variable"
            }
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the reported field in the configuration file"
            }
            Self::ApiError(_) | Self::ConnectionError { .. } => {
                "Verify fleet_host and fleet_port and that the fleet manager is reachable"
            }
            Self::AuthenticationError { .. } => "Verify fleet_username and fleet_password",
            Self::UnknownRobot { .. } => "Add the robot to the fleet section of the configuration",
            Self::CommandError { .. } => "Inspect the connector logs for the command output",
            Self::IoError(_) => "Check file permissions and available disk space",
            Self::SerializationError(_) => "Report the payload that failed to serialize",
            Self::ChannelClosed => "Restart the connector",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not talk to the FLOWCore fleet: {}", self),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConnectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = ConnectorError::MissingConfigError {
            field: "fleet_host".to_string(),
        };
        assert!(err.is_config_error());
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().starts_with("Configuration problem"));
    }

    #[test]
    fn test_not_found_message() {
        let err = ConnectorError::ConfigNotFound {
            path: "missing.yaml".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration file 'missing.yaml' not found");
    }

    #[test]
    fn test_command_errors_are_low_severity() {
        let err = ConnectorError::UnknownRobot {
            robot_id: "ghost".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Command);
        assert_eq!(err.severity(), ErrorSeverity::Low);
    }
}
