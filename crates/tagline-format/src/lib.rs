//! # tagline-format
//!
//! Read, edit and write ID3 tags: ID3v2.2, ID3v2.3 and ID3v2.4 tags at the
//! start of a file, and the ID3v1 trailer at its end.
//!
//! ## Format Overview
//!
//! An ID3v2 tag consists of:
//! - **Header** (10 bytes): `ID3`, major and minor version, flags and a
//!   sync-safe tag size
//! - **Extended header** (optional, v2.3 and v2.4)
//! - **Frames**: typed records such as `TIT2` (title) or `APIC`
//!   (picture), each with its own header
//! - **Padding** (zero bytes) or, in v2.4 only, a 10-byte `3DI` footer
//!
//! ## Example
//! ```rust,no_run
//! use tagline_format::{read_tag, Tag, Version};
//!
//! // Reading
//! let tag = read_tag("song.mp3").unwrap();
//! println!("{}", tag.friendly("title").unwrap());
//!
//! // Writing
//! let mut tag = Tag::new(Version::V2_4);
//! tag.set_friendly("artist", "Someone / Someone Else").unwrap();
//! tag.write("song.mp3").unwrap();
//! ```

pub mod bytes;
pub mod dates;
pub mod encoding;
pub mod error;
pub mod field;
pub mod frame;
pub mod framing;
pub mod friendly;
pub mod order;
pub mod registry;
pub mod tag;
pub mod v1;

pub use dates::Timestamp;
pub use encoding::TextEncoding;
pub use error::{Error, FrameError, Result};
pub use field::{FieldKind, FieldSpec, Value, PICTURE_TYPES};
pub use frame::{ErrorData, Frame, FrameFlags};
pub use friendly::{is_friendly_name, FRIENDLY_NAMES};
pub use order::FrameOrder;
pub use registry::{FrameClass, FrameDescriptor};
pub use tag::{
    delete_tag, delete_tag_with, detect_tag, read_tag, read_tag_with, ExtendedHeader, ItunesWorkaround, Padding,
    ReadOptions, Tag, TagFlags, TagInfo, Version,
};
pub use tagline_patch::{PatchOptions, Strategy};
pub use v1::{Tag1, GENRES};
