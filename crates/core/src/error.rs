use crate::model::LeafId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A record that cannot be turned into a weighted node.
    #[error("malformed dataset at `{path}`: {reason}")]
    MalformedDataset { path: String, reason: String },

    #[error("invalid viewport {width}x{height}: both dimensions must be positive")]
    InvalidViewport { width: f64, height: f64 },

    /// A layout setting outside its usable range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A pointer event referenced a leaf that is not part of the current layout.
    #[error("unknown leaf id {0}")]
    UnknownLeafId(LeafId),

    #[error("no section `{0}` in manifest")]
    UnknownSection(String),

    #[error("i/o error on `{path}`: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(path: &str, reason: impl Into<String>) -> Self {
        Error::MalformedDataset {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
