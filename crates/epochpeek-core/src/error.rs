// crates/epochpeek-core/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings could not be decoded: {0}")]
    SettingsDecode(#[from] toml::de::Error),

    #[error("Settings could not be encoded: {0}")]
    SettingsEncode(#[from] toml::ser::Error),

    #[error("Environment variable {var} has invalid value '{value}'")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Clipboard write failed: {0}")]
    Clipboard(String),
}

pub type Result<T> = std::result::Result<T, HostError>;
