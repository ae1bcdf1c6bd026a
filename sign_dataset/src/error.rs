use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LandmarkError {
    #[error("expected {expected} landmarks, got {got}")]
    WrongCount { expected: usize, got: usize },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write dataset {}: {source}", .path.display())]
    Write {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read dataset {}: {source}", .path.display())]
    Read {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset row at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// An earlier flush failed; the recorder refuses further writes.
    #[error("recorder disabled after a failed flush ({unsaved} samples not saved)")]
    Poisoned { unsaved: usize },
}
