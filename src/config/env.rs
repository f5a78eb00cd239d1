use crate::utils::error::{ConnectorError, Result};
use regex::{Captures, Regex};
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::Path;

/// Prefix for connector settings read from the environment.
pub const ENV_PREFIX: &str = "INORBIT_FLOWCORE_";

/// Default environment file, relative to the directory the connector is executed from.
pub const DEFAULT_ENV_FILE: &str = "config/.env";

/// Somewhere environment variables can be read from.
pub trait EnvSource {
    fn entries(&self) -> Vec<(String, String)>;

    /// Exact name match first, then a case-insensitive one.
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries();
        entries
            .iter()
            .find(|(name, _)| name == key)
            .or_else(|| entries.iter().find(|(name, _)| name.eq_ignore_ascii_case(key)))
            .map(|(_, value)| value.clone())
    }
}

/// The current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn entries(&self) -> Vec<(String, String)> {
        // non-UTF-8 entries cannot hold connector settings
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }
}

impl EnvSource for HashMap<String, String> {
    fn entries(&self) -> Vec<(String, String)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

/// Reads `INORBIT_FLOWCORE_<FIELD>`. Empty values count as unset.
pub fn setting(env: &dyn EnvSource, field: &str) -> Option<String> {
    let key = format!("{}{}", ENV_PREFIX, field.to_ascii_uppercase());
    env.get(&key).filter(|value| !value.is_empty())
}

fn placeholder_regex() -> Result<Regex> {
    Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| ConnectorError::config("env_substitution", e.to_string()))
}

fn replace_placeholders(re: &Regex, content: &str, env: &dyn EnvSource) -> String {
    re.replace_all(content, |caps: &Captures| {
        let var_name = &caps[1];
        env.get(var_name)
            .unwrap_or_else(|| format!("${{{}}}", var_name))
    })
    .into_owned()
}

/// Replaces `${VAR}` placeholders inside the string values of a parsed YAML document.
/// Unknown variables are left untouched. Substituted values always stay strings;
/// mapping keys are not touched.
pub fn substitute_in_value(value: Value, env: &dyn EnvSource) -> Result<Value> {
    let re = placeholder_regex()?;
    Ok(substitute_value(&re, value, env))
}

fn substitute_value(re: &Regex, value: Value, env: &dyn EnvSource) -> Value {
    match value {
        Value::String(text) => Value::String(replace_placeholders(re, &text, env)),
        Value::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(|item| substitute_value(re, item, env))
                .collect(),
        ),
        Value::Mapping(entries) => Value::Mapping(
            entries
                .into_iter()
                .map(|(key, item)| (key, substitute_value(re, item, env)))
                .collect(),
        ),
        Value::Tagged(mut tagged) => {
            tagged.value = substitute_value(re, tagged.value, env);
            Value::Tagged(tagged)
        }
        other => other,
    }
}

/// Loads a dotenv file into the process environment without overriding existing variables.
/// Returns whether the file was found.
pub fn load_env_file<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    if !path.exists() {
        return false;
    }
    match dotenv::from_path(path) {
        Ok(()) => {
            tracing::debug!("Loaded environment from {}", path.display());
            true
        }
        Err(e) => {
            tracing::warn!("Ignoring environment file {}: {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_setting_is_case_insensitive() {
        let env = env(&[("inorbit_flowcore_fleet_host", "fleet.local")]);
        assert_eq!(setting(&env, "fleet_host").as_deref(), Some("fleet.local"));
    }

    #[test]
    fn test_setting_ignores_empty_values() {
        let env = env(&[("INORBIT_FLOWCORE_FLEET_HOST", "")]);
        assert_eq!(setting(&env, "fleet_host"), None);
    }

    #[test]
    fn test_substitution_keeps_unknown_placeholders() {
        let env = env(&[("FLEET_PASS", "s3cret")]);
        let doc = Value::String("user:${FLEET_PASS}@${NOPE}".to_string());
        let out = substitute_in_value(doc, &env).unwrap();
        assert_eq!(out.as_str(), Some("user:s3cret@${NOPE}"));
    }

    #[test]
    fn test_tree_substitution_keeps_yaml_syntax_in_values() {
        let env = env(&[("FLEET_PASS", "abc #123"), ("FLEET_PORT", "8080")]);
        let doc: Value =
            serde_yaml::from_str("password: ${FLEET_PASS}\nport: ${FLEET_PORT}\nlist:\n  - ${NOPE}")
                .unwrap();

        let out = substitute_in_value(doc, &env).unwrap();

        assert_eq!(out["password"].as_str(), Some("abc #123"));
        assert_eq!(out["port"].as_str(), Some("8080"));
        assert_eq!(out["list"][0].as_str(), Some("${NOPE}"));
    }

    #[test]
    fn test_missing_env_file_is_not_loaded() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(!load_env_file(dir.path().join(".env")));
    }
}
