pub mod builtin;
pub mod schema;

use crate::error::TagMatchError;
use crate::tags::TagRule;
use schema::ValidationConfig;
use std::path::Path;

/// Load a config file layered over the built-in defaults.
pub fn load_config(path: &Path) -> Result<ValidationConfig, TagMatchError> {
    let content = std::fs::read_to_string(path).map_err(|e| TagMatchError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_config(&content, path)
}

/// Parse a config from a JSON string; `source` is only used in errors.
pub fn parse_config(json: &str, source: &Path) -> Result<ValidationConfig, TagMatchError> {
    let config = overlay_defaults(json).map_err(|e| TagMatchError::ConfigLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a config from a JSON string (no file path context).
pub fn parse_config_str(json: &str) -> Result<ValidationConfig, TagMatchError> {
    let config = overlay_defaults(json)?;
    validate_config(&config)?;
    Ok(config)
}

/// Fields present in `json` replace the built-in ones.
fn overlay_defaults(json: &str) -> Result<ValidationConfig, TagMatchError> {
    let mut merged: serde_json::Value = serde_json::from_str(builtin::DEFAULT_SETTINGS_JSON)?;
    let overrides: serde_json::Value = serde_json::from_str(json)?;

    let (Some(base), serde_json::Value::Object(overrides)) = (merged.as_object_mut(), overrides)
    else {
        return Err(TagMatchError::ConfigInvalid(
            "config must be a JSON object".into(),
        ));
    };
    base.extend(overrides);

    Ok(serde_json::from_value(merged)?)
}

/// Validate that a config is usable.
pub fn validate_config(config: &ValidationConfig) -> Result<(), TagMatchError> {
    TagRule::new(&config.source_pattern)?;
    TagRule::new(&config.target_pattern)?;

    if !config.tolerance.is_finite() || config.tolerance < 0.0 {
        return Err(TagMatchError::ConfigInvalid(format!(
            "tolerance must be a non-negative number, got {}",
            config.tolerance
        )));
    }

    if !config.padding.is_finite() || config.padding < 0.0 {
        return Err(TagMatchError::ConfigInvalid(format!(
            "padding must be a non-negative number, got {}",
            config.padding
        )));
    }

    if !(0.0..=1.0).contains(&config.opacity) {
        return Err(TagMatchError::ConfigInvalid(format!(
            "opacity must be between 0 and 1, got {}",
            config.opacity
        )));
    }

    Ok(())
}
