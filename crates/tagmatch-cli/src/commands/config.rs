use std::path::Path;
use tagmatch_core::error::TagMatchError;

use crate::commands::load_effective_config;

pub fn show(config_file: Option<&Path>) -> Result<(), TagMatchError> {
    let config = load_effective_config(config_file)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
