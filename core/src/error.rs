use std::io;

use thiserror::Error;

use crate::host::SessionId;

pub type Result<T> = std::result::Result<T, AutoThemeErr>;

#[derive(Error, Debug)]
pub enum AutoThemeErr {
    /// The host answered but reported no application object.
    #[error("terminal application is unavailable")]
    AppUnavailable,

    /// One or both of the configured presets are not in the host catalog.
    #[error("expected color presets not present: missing {missing:?}, available {available:?}")]
    MissingPresets {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("unknown color preset: {0}")]
    UnknownPreset(String),

    /// The session was closed between enumeration and use.
    #[error("session {0} is no longer available")]
    StaleSession(SessionId),

    #[error("host error {code}: {message}")]
    Host { code: i64, message: String },

    #[error("connection to the terminal host was closed")]
    Disconnected,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AutoThemeErr {
    /// True when the connection to the host is gone and no later call can
    /// succeed.
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, AutoThemeErr::Disconnected)
    }
}
