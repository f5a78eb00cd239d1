use flowcore_connector::FlowcoreConnectorConfig;
use std::collections::HashMap;

const README: &str = include_str!("../README.md");
const EXAMPLE_CONFIG: &str = include_str!("../config/example.yaml");

#[test]
fn test_readme_points_to_cookiecutter_template() {
    assert!(README.contains("gh:inorbit-ai/inorbit-connector-cookiecutter"));
    assert!(README.contains("https://github.com/inorbit-ai/inorbit-connector-cookiecutter"));
}

#[test]
fn test_example_config_loads_with_env_credentials() {
    let env: HashMap<String, String> = [
        ("INORBIT_FLOWCORE_FLEET_USERNAME", "admin"),
        ("INORBIT_FLOWCORE_FLEET_PASSWORD", "changeme"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let config = FlowcoreConnectorConfig::from_yaml_str(EXAMPLE_CONFIG, &env).unwrap();

    assert_eq!(config.connector_config.fleet_port, 8080);
    assert_eq!(config.connector_config.fleet_username, "admin");
    assert_eq!(config.fleet.len(), 2);
    assert_eq!(config.fleet[1].cameras.len(), 1);
    assert!(config.maps.contains_key("warehouse"));
}

#[test]
fn test_example_config_requires_credentials() {
    let no_env = HashMap::<String, String>::new();
    let err = FlowcoreConnectorConfig::from_yaml_str(EXAMPLE_CONFIG, &no_env).unwrap_err();
    assert!(err.is_config_error());
}
