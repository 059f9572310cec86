use std::path::PathBuf;

use crate::modules::view::TabId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preferences parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not create view for tab {tab}: {reason}")]
    View { tab: TabId, reason: String },

    #[error("no data directory available")]
    NoDataDir,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
