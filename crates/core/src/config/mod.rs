mod loader;
mod resolved;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_env, load_config_from_str, ENV_PREFIX};
pub use resolved::ResolvedConfig;
pub use types::*;
pub use validate::validate_config;

use std::path::PathBuf;
use thiserror::Error;

use crate::role::Role;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Template for role '{role}' is not readable: {path}")]
    TemplateUnreadable {
        role: Role,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
