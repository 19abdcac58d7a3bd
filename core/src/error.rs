use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid region coordinates")]
    InvalidRegion,
    #[error("Region is not part of the live set")]
    UnknownRegion,
    #[error("Persisted value for {0} is missing or malformed")]
    MalformedRecord(&'static str),
    #[error("Storage write failed: {0}")]
    Storage(String),
    #[error("Surface operation failed: {0}")]
    Surface(String),
    #[error("Could not decode image: {0}")]
    ImageDecode(String),
    #[error("Could not encode snapshot: {0}")]
    SnapshotEncode(String),
    #[error("Puzzle payload is malformed: {0}")]
    Payload(String),
    #[error("Guess submission failed with status {0}")]
    GuessFailed(u16),
    #[error("Puzzle image has not been loaded yet")]
    NotReady,
    #[error("Image already loaded for this session")]
    AlreadyLoaded,
}

pub type Result<T> = core::result::Result<T, GameError>;
