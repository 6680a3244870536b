use std::path::PathBuf;

/// Failure to load or validate one half of a disease's prediction pair.
///
/// These never escape a screening submission: the registry records them and the affected
/// disease runs in a degraded state.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("failed to read artifact {path}: {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse artifact {path}: {source}", path = path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid artifact {path}: {reason}", path = path.display())]
    Invalid { path: PathBuf, reason: String },
    #[error(
        "feature names in {path} do not match the disease profile (expected {expected:?}, found {found:?})",
        path = path.display()
    )]
    FeatureMismatch {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ScreeningError {
    #[error("disease not supported: {0}")]
    UnknownDisease(String),
    #[error("invalid numeric value for: {}", fields.join(", "))]
    MalformedInput { fields: Vec<String> },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read profiles file {path}: {source}", path = path.display())]
    ProfilesRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse profiles file: {0}")]
    ProfilesParse(serde_yaml::Error),
    #[error(transparent)]
    ArtifactLoad(#[from] ArtifactLoadError),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to append screening record: {0}")]
    StorageWrite(std::io::Error),
    #[error("failed to serialize screening record: {0}")]
    Serialization(serde_json::Error),
}

pub type ScreeningResult<T> = std::result::Result<T, ScreeningError>;
