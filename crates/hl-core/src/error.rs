use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("'{0}' is not found in registrar")]
    ToolNotFound(String),

    #[error("Cannot open project: '{0}'")]
    ProjectNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Plugin '{0}' not loaded: {1}")]
    PluginNotLoaded(String, String),

    #[error("Ultimate distribution is not supported by the inspection runner")]
    UltimateUnsupported,

    #[error("Cannot allocate system directory (all slots locked)")]
    SystemDirectoryExhausted,

    #[error("Headless application already exists with other home: {0} and {1}")]
    ApplicationMismatch(String, String),

    #[error("Read stream is closed")]
    StreamClosed,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Runner did not shut down within {0} seconds")]
    FinalizeTimeout(u64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
