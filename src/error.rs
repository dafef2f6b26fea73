//! Error types for flashback-display
//!
//! Only backend construction failures propagate to callers; everything
//! the watch tasks run into is downgraded to a warning and a neutral
//! fallback state.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Permanent capability absence, not a transient fault. Callers must
    /// not retry the operation on the same monitor manager.
    #[error("{0} is not implemented by this monitor manager")]
    NotImplemented(&'static str),

    #[error("failed to read settings from {path}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings from {path}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("D-Bus error")]
    DBus(#[from] zbus::Error),

    #[error("underlying I/O error")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
