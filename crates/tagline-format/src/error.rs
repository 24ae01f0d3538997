//! Error types for the tag codec.

use thiserror::Error;

use crate::tag::Version;

/// Malformed or unencodable frame data.
///
/// These errors are recovered locally while a tag is parsed: the frame that
/// raised one is kept as an error frame holding its raw bytes, and the
/// remaining frames are decoded as usual.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Invalid sync-safe integer")]
    InvalidSyncsafe,

    #[error("Value {value} does not fit in {width} bytes")]
    ValueTooLarge { value: u64, width: usize },

    #[error("Unexpected end of frame data")]
    UnexpectedEndOfData,

    #[error("Truncated record list: no complete record found")]
    TruncatedRecord,

    #[error("Invalid text encoding: {0}")]
    InvalidEncoding(u8),

    #[error("Encrypted frames are not supported")]
    UnsupportedEncryption,

    #[error("Unknown frame flags: 0x{0:04X}")]
    UnknownFlags(u16),

    #[error("Decompression failed: {0}")]
    Decompression(String),

    #[error("Invalid text data")]
    InvalidText,

    /// The text cannot be represented in the requested encoding.
    #[error("Text cannot be represented in the selected encoding")]
    UnencodableText,

    #[error("Invalid field value: {0}")]
    InvalidValue(String),
}

/// Errors that can occur when reading, editing, or writing tags.
#[derive(Error, Debug)]
pub enum Error {
    /// No tag signature at the expected location.
    #[error("No tag found: {0}")]
    NoTag(&'static str),

    /// Malformed tag-level structure. Fatal to the read.
    #[error("Malformed tag: {0}")]
    Tag(String),

    #[error(transparent)]
    Frame(#[from] FrameError),

    /// A field assignment was rejected.
    #[error("Invalid value for field '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// None of the candidate encodings can represent the frame's text.
    #[error("{frameid}: text cannot be represented in any allowed encoding")]
    UnrepresentableText { frameid: String },

    /// The frame has no equivalent in the target version.
    #[error("{frameid}: frame cannot be converted to {version}")]
    IncompatibleFrame { frameid: String, version: Version },

    /// The id is well formed but not a registered frame type.
    #[error("Unknown frame id: {0}")]
    UnknownFrame(String),

    #[error("Invalid frame id: {0:?}")]
    InvalidFrameId(String),

    #[error("Unknown friendly name: {0}")]
    UnknownFriendlyName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File patch failed: {0}")]
    Patch(#[from] tagline_patch::PatchError),
}

impl Error {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
