//! Error types for the patch crate.

use thiserror::Error;

/// Errors that can occur while replacing a byte range in a file.
#[derive(Error, Debug)]
pub enum PatchError {
    /// The region to replace does not lie inside the file.
    #[error("Region {offset}+{length} exceeds file size {file_size}")]
    RegionOutOfBounds {
        offset: u64,
        length: u64,
        file_size: u64,
    },

    /// The temporary copy could not be renamed over the original.
    #[error("Failed to replace original file: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// Installing the interrupt handler failed.
    #[error("Failed to install interrupt handler: {0}")]
    SignalSetup(std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PatchError>;
