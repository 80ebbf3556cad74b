use crate::config::schema::ValidationConfig;
use crate::error::TagMatchError;

pub const DEFAULT_SETTINGS_JSON: &str = include_str!("../../../../config/settings.json");

/// The built-in settings every user config is layered on.
pub fn default_config() -> Result<ValidationConfig, TagMatchError> {
    let config: ValidationConfig = serde_json::from_str(DEFAULT_SETTINGS_JSON)?;
    Ok(config)
}
