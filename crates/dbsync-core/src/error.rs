use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dump of '{environment}' failed -- {source}")]
    Dump {
        environment: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Rewrite of {} failed -- {source}", path.display())]
    Rewrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Import into '{environment}' failed -- {source}")]
    Import {
        environment: String,
        #[source]
        source: anyhow::Error,
    },
}

impl SyncError {
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
