use crate::utils::error::{ConnectorError, Result};
use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ConnectorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ConnectorError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ConnectorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ConnectorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ConnectorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_field<T>(field_name: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| ConnectorError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConnectorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN compares false both ways
    if !(value >= min && value <= max) {
        return Err(ConnectorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Fails with `"<field_name> values must be unique"` on the first repeated value.
pub fn validate_unique<'a, T, I>(field_name: &str, values: I) -> Result<()>
where
    T: Eq + Hash + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(ConnectorError::config(
                field_name,
                format!("{} values must be unique", field_name),
            ));
        }
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ConnectorError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: format!("Valid values: {}", allowed.join(", ")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("fleet_url", "https://example.com").is_ok());
        assert!(validate_url("fleet_url", "http://10.0.0.4:8080/").is_ok());
        assert!(validate_url("fleet_url", "").is_err());
        assert!(validate_url("fleet_url", "invalid-url").is_err());
        assert!(validate_url("fleet_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_unique() {
        assert!(validate_unique("fleet_robot_id", &[1, 2, 3]).is_ok());

        let err = validate_unique("fleet_robot_id", &[7, 8, 7]).unwrap_err();
        assert!(err.to_string().contains("fleet_robot_id values must be unique"));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("update_freq", 1.0, 0.01, 100.0).is_ok());
        assert!(validate_range("update_freq", 0.0, 0.01, 100.0).is_err());
        assert!(validate_range("update_freq", 250.0, 0.01, 100.0).is_err());
        assert!(validate_range("update_freq", f64::NAN, 0.01, 100.0).is_err());
        assert!(validate_range("update_freq", f64::INFINITY, 0.01, 100.0).is_err());
    }

    #[test]
    fn test_validate_required_and_non_empty() {
        assert_eq!(validate_required_field("fleet_host", Some("h")).unwrap(), "h");
        assert!(validate_required_field::<String>("fleet_host", None).is_err());
        assert!(validate_non_empty_string("fleet_host", "   ").is_err());
        assert!(validate_path("user_scripts_dir", "").is_err());
    }
}
