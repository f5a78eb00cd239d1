use crate::config::models::FlowcoreConfig;
use crate::utils::error::{ConnectorError, Result};
use crate::utils::validation::validate_url;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP access to the FLOWCore fleet manager.
#[derive(Debug, Clone)]
pub struct FleetClient {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
}

impl FleetClient {
    pub fn new(config: &FlowcoreConfig) -> Result<Self> {
        let base_url = Self::base_url_for(&config.fleet_host, config.fleet_port)?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url,
            username: config.fleet_username.clone(),
            password: config.fleet_password.clone(),
        })
    }

    /// `fleet_host` is normally a bare IP or hostname; a full URL keeps its scheme and path.
    fn base_url_for(host: &str, port: u16) -> Result<Url> {
        let raw = if host.contains("://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };
        validate_url("connector_config.fleet_host", &raw)?;

        let mut url = Url::parse(&raw).map_err(|e| ConnectorError::InvalidConfigValueError {
            field: "connector_config.fleet_host".to_string(),
            value: host.to_string(),
            reason: e.to_string(),
        })?;
        url.set_port(Some(port))
            .map_err(|_| ConnectorError::InvalidConfigValueError {
                field: "connector_config.fleet_port".to_string(),
                value: port.to_string(),
                reason: "Port cannot be set on this host".to_string(),
            })?;
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Any HTTP answer counts as reachable; rejected credentials do not.
    pub async fn probe(&self) -> Result<StatusCode> {
        tracing::debug!("Probing fleet API at {}", self.base_url);

        let response = self
            .client
            .get(self.base_url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| ConnectorError::ConnectionError {
                message: format!("{}: {}", self.base_url, e),
            })?;

        let status = response.status();
        tracing::debug!("Fleet API response status: {}", status);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(ConnectorError::AuthenticationError {
                    message: format!("{} answered {}", self.base_url, status),
                })
            }
            _ => Ok(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn config(host: &str, port: u16) -> FlowcoreConfig {
        FlowcoreConfig {
            fleet_host: host.to_string(),
            fleet_port: port,
            fleet_username: "user".to_string(),
            fleet_password: "pass".to_string(),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_bare_host_gets_http_scheme() {
        let client = FleetClient::new(&config("10.0.0.12", 8080)).unwrap();
        assert_eq!(client.base_url().as_str(), "http://10.0.0.12:8080/");
    }

    #[test]
    fn test_default_port_is_elided() {
        let client = FleetClient::new(&config("fleet.example.com", 80)).unwrap();
        assert_eq!(client.base_url().as_str(), "http://fleet.example.com/");
    }

    #[test]
    fn test_explicit_scheme_is_kept() {
        let client = FleetClient::new(&config("https://fleet.example.com/api", 8443)).unwrap();
        assert_eq!(client.base_url().as_str(), "https://fleet.example.com:8443/api");
    }

    #[test]
    fn test_unsupported_scheme_is_rejected() {
        assert!(FleetClient::new(&config("ftp://fleet.example.com", 21)).is_err());
    }
}
