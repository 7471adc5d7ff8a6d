use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid face region: {width}x{height}")]
    InvalidRegion { width: u32, height: u32 },

    #[error("invalid bucket configuration: {0}")]
    Configuration(String),

    #[error("failed to read configuration file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// True for every failure that happens while building or loading a configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_) | Error::ConfigFile { .. } | Error::ConfigParse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
