use thiserror::Error;

/// Conditions the engine surfaces to the learner. Never returned across the
/// action boundary; carried as a notice in the snapshot instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No chords match the current settings")]
    ExhaustedPool,
}

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio output unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to play {notes}: {message}")]
    Playback { notes: String, message: String },
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Chord data file not found: {0}")]
    MissingFile(String),

    #[error("Unable to parse chord data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid chord {id}: {message}")]
    Invalid { id: String, message: String },
}
