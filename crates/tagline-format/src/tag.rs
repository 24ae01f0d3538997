//! ID3v2 tag container.
//!
//! A [`Tag`] holds the frames of one ID3v2.2, v2.3 or v2.4 tag keyed by
//! frame id. Reading parses the header, the optional extended header and
//! the frame stream; a malformed frame becomes an error frame instead of
//! failing the read. Encoding merges duplicates, converts every frame to
//! the tag's version, orders the frames and pads the result.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use serde::Serialize;
use tagline_patch::PatchOptions;

use crate::bytes::{unsync_encode, UnsyncReader};
use crate::dates;
use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use crate::field::Value;
use crate::frame::{ErrorData, Frame, FrameFlags};
use crate::framing::{self, Header, RawFrame, HEADER_SIZE};
use crate::order;

/// Major version of an ID3v2 tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Version {
    V2_2,
    V2_3,
    V2_4,
}

impl Version {
    pub fn from_major(major: u8) -> Option<Self> {
        match major {
            2 => Some(Version::V2_2),
            3 => Some(Version::V2_3),
            4 => Some(Version::V2_4),
            _ => None,
        }
    }

    pub fn major(self) -> u8 {
        match self {
            Version::V2_2 => 2,
            Version::V2_3 => 3,
            Version::V2_4 => 4,
        }
    }

    /// Length of frame ids: 3 in ID3v2.2, 4 afterwards.
    pub fn frame_id_len(self) -> usize {
        match self {
            Version::V2_2 => 3,
            Version::V2_3 | Version::V2_4 => 4,
        }
    }

    /// Text encodings tried, in order, for frames without an explicit one.
    pub fn encodings(self) -> &'static [TextEncoding] {
        match self {
            Version::V2_2 | Version::V2_3 => &[TextEncoding::Latin1, TextEncoding::Utf16],
            Version::V2_4 => &[TextEncoding::Latin1, TextEncoding::Utf8],
        }
    }

    /// UTF-16BE and UTF-8 were introduced in ID3v2.4.
    pub fn allows_encoding(self, encoding: TextEncoding) -> bool {
        match encoding {
            TextEncoding::Latin1 | TextEncoding::Utf16 => true,
            TextEncoding::Utf16Be | TextEncoding::Utf8 => self == Version::V2_4,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID3v2.{}", self.major())
    }
}

/// Tag header flags stored as the raw flag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TagFlags(pub u8);

impl TagFlags {
    /// The frame data is unsynchronised
    pub const UNSYNCHRONISED: u8 = 0x80;
    /// An extended header follows the header (v2.3, v2.4)
    pub const EXTENDED_HEADER: u8 = 0x40;
    /// The tag is in an experimental stage (v2.3, v2.4)
    pub const EXPERIMENTAL: u8 = 0x20;
    /// A footer follows the tag (v2.4)
    pub const FOOTER: u8 = 0x10;

    pub fn new() -> Self {
        Self(0)
    }

    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    pub fn has(&self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    pub fn names(&self) -> Vec<&'static str> {
        [
            (Self::UNSYNCHRONISED, "unsynchronised"),
            (Self::EXTENDED_HEADER, "extended_header"),
            (Self::EXPERIMENTAL, "experimental"),
            (Self::FOOTER, "footer"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.has(*flag))
        .map(|(_, name)| name)
        .collect()
    }
}

/// Contents of an extended header. Kept for inspection only; extended
/// headers are not written back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtendedHeader {
    /// Padding size declared by an ID3v2.3 extended header.
    pub padding_size: Option<u32>,
    pub crc32: Option<u32>,
    /// The tag is an update of an earlier tag (v2.4).
    pub update: bool,
    /// Raw tag restrictions byte (v2.4).
    pub restrictions: Option<u8>,
}

/// Handling of ID3v2.4 frame sizes written as plain 8-bit integers.
///
/// Older iTunes releases wrote v2.4 frame sizes without the sync-safe
/// encoding. `Detect` re-reads the whole frame stream with 8-bit sizes
/// once a size that is not sync-safe is found. Tags whose 8-bit sizes all
/// happen to be valid sync-safe values are not detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItunesWorkaround {
    #[default]
    Detect,
    Always,
    Never,
}

/// Options for reading tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadOptions {
    pub itunes_workaround: ItunesWorkaround,
}

/// Padding policy applied when a tag is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    /// Padding added when the tag cannot fill the space of the old one.
    pub default: usize,
    /// Largest amount of padding ever written; `None` for no limit.
    pub max: Option<usize>,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            default: 128,
            max: Some(1024),
        }
    }
}

impl Padding {
    /// Final tag size for `actual` bytes of header and frames.
    ///
    /// The tag grows to `hint` (the size of the tag it replaces) when that
    /// needs no more than `max` bytes of padding, so the audio data does
    /// not have to move. Otherwise the default padding is added.
    pub fn size_for(&self, hint: Option<usize>, actual: usize) -> usize {
        if let Some(hint) = hint {
            if hint >= actual && self.max.is_none_or(|max| hint - actual <= max) {
                return hint;
            }
        }
        actual + self.max.map_or(self.default, |max| self.default.min(max))
    }
}

/// Location of a tag inside a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TagInfo {
    pub version: Version,
    pub offset: u64,
    /// Bytes occupied by the tag, header and footer included.
    pub length: u64,
}

/// An ID3v2 tag.
#[derive(Debug, Clone)]
pub struct Tag {
    version: Version,
    pub flags: TagFlags,
    pub padding: Padding,
    size: usize,
    extended_header: Option<ExtendedHeader>,
    frames: BTreeMap<String, Vec<Frame>>,
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.flags == other.flags && self.frames == other.frames
    }
}

impl Tag {
    /// An empty tag.
    pub fn new(version: Version) -> Self {
        Self {
            version,
            flags: TagFlags::new(),
            padding: Padding::default(),
            size: 0,
            extended_header: None,
            frames: BTreeMap::new(),
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Declared size of the tag this was read from, excluding the header.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn extended_header(&self) -> Option<&ExtendedHeader> {
        self.extended_header.as_ref()
    }

    // ----- Reading -----

    /// Decode a tag from the start of `data`.
    pub fn decode(data: &[u8]) -> Result<Self> {
        Self::decode_with(data, &ReadOptions::default())
    }

    pub fn decode_with(data: &[u8], options: &ReadOptions) -> Result<Self> {
        Self::read_from(&mut io::Cursor::new(data), options)
    }

    /// Read a tag from `reader`, which must be positioned at the header.
    ///
    /// # Errors
    ///
    /// [`Error::NoTag`] if no ID3v2 header is present, [`Error::Tag`] if
    /// the tag structure is malformed.
    pub fn read_from<R: Read>(reader: &mut R, options: &ReadOptions) -> Result<Self> {
        let mut raw_header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut raw_header).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => Error::NoTag("File too short"),
            _ => Error::Io(e),
        })?;
        let header = framing::parse_header(&raw_header)?;

        let mut body = Vec::with_capacity(header.size.min(1 << 24));
        reader.take(header.size as u64).read_to_end(&mut body)?;
        if body.len() < header.size {
            tracing::warn!(declared = header.size, actual = body.len(), "Tag is truncated");
        }
        Self::parse(header, &body, options)
    }

    fn parse(header: Header, body: &[u8], options: &ReadOptions) -> Result<Self> {
        let version = header.version;
        let mut tag = Tag::new(version);
        tag.flags = header.flags;
        tag.size = header.size;
        tracing::debug!(%version, size = header.size, flags = ?header.flags.names(), "Parsed tag header");

        // Before v2.4 unsynchronisation covers the extended header too.
        let unsynchronised = header.flags.has(TagFlags::UNSYNCHRONISED);
        let mut resynced = Vec::new();
        let mut rest = body;
        if unsynchronised && version != Version::V2_4 {
            UnsyncReader::new(body).read_to_end(&mut resynced)?;
            rest = &resynced;
        }

        if header.flags.has(TagFlags::EXTENDED_HEADER) {
            tag.extended_header = Some(match version {
                Version::V2_2 => return Err(Error::Tag("ID3v2.2 tags have no extended header".into())),
                Version::V2_3 => framing::parse_extended_v23(&mut rest)?,
                Version::V2_4 => framing::parse_extended_v24(&mut rest)?,
            });
        }

        let raw_frames = framing::split_frames(version, rest, options.itunes_workaround)?;
        let mut position = 0;
        for raw in raw_frames {
            if raw.data.is_empty() {
                tracing::warn!(frameid = raw.frameid.as_str(), "Ignoring empty frame");
                continue;
            }
            if let Some(frame) = decode_frame(version, &raw, unsynchronised, position) {
                tag.insert(frame);
                position += 1;
            }
        }
        tracing::debug!(frames = tag.len(), "Decoded frames");
        Ok(tag)
    }

    // ----- Frame access -----

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, frameid: &str) -> bool {
        self.frames.get(frameid).is_some_and(|fs| !fs.is_empty())
    }

    /// Ids of the frames present, sorted.
    pub fn frame_ids(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().filter(|(_, fs)| !fs.is_empty()).map(|(id, _)| id.as_str())
    }

    /// All frames with `frameid`, in file order.
    pub fn get_all(&self, frameid: &str) -> &[Frame] {
        self.frames.get(frameid).map_or(&[], Vec::as_slice)
    }

    pub fn get_all_mut(&mut self, frameid: &str) -> Option<&mut Vec<Frame>> {
        self.frames.get_mut(frameid)
    }

    /// The frame with `frameid`, merging duplicates of frame types that
    /// do not allow them. For duplicate-tolerant types this is the first
    /// frame.
    pub fn get_merged(&self, frameid: &str) -> Option<Frame> {
        let frames = self.get_all(frameid);
        Frame::merge(frames.to_vec()).into_iter().next()
    }

    /// Every frame in canonical encoding order.
    pub fn frames(&self) -> Vec<&Frame> {
        let order = order::default_order();
        let mut frames: Vec<&Frame> = self.frames.values().flatten().collect();
        frames.sort_by_key(|f| order.key(f));
        frames
    }

    /// Every frame in the order it was read; new frames last.
    pub fn frames_in_file_order(&self) -> Vec<&Frame> {
        let mut frames: Vec<&Frame> = self.frames.values().flatten().collect();
        frames.sort_by_key(|f| f.position().map_or((1, 0), |p| (0, p)));
        frames
    }

    /// Add a frame after any existing frames with the same id.
    pub fn insert(&mut self, frame: Frame) {
        self.frames.entry(frame.frameid().to_string()).or_default().push(frame);
    }

    /// Replace all frames with the frame's id by `frame`.
    pub fn set(&mut self, frame: Frame) {
        self.frames.insert(frame.frameid().to_string(), vec![frame]);
    }

    /// Replace all frames with `frameid`. An empty list removes them.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if a frame's id differs from `frameid`.
    pub fn set_all(&mut self, frameid: &str, frames: Vec<Frame>) -> Result<()> {
        if let Some(other) = frames.iter().find(|f| f.frameid() != frameid) {
            return Err(Error::validation(
                "frameid",
                format!("{} frame stored under {frameid}", other.frameid()),
            ));
        }
        if frames.is_empty() {
            self.frames.remove(frameid);
        } else {
            self.frames.insert(frameid.to_string(), frames);
        }
        Ok(())
    }

    /// Replace the frames with `frameid` by one text frame.
    pub fn set_text<I, S>(&mut self, frameid: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let frame = Frame::text(frameid, values)?;
        self.set(frame);
        Ok(())
    }

    /// Remove and return all frames with `frameid`.
    pub fn remove(&mut self, frameid: &str) -> Vec<Frame> {
        self.frames.remove(frameid).unwrap_or_default()
    }

    /// A copy of this tag with every frame converted to `version`.
    /// Frames without an equivalent are dropped with a warning.
    pub fn to_version(&self, version: Version) -> Tag {
        let mut tag = Tag::new(version);
        tag.flags = TagFlags(self.flags.0 & TagFlags::UNSYNCHRONISED);
        tag.padding = self.padding;
        for frame in self.converted_frames(version) {
            tag.insert(frame);
        }
        tag
    }

    fn converted_frames(&self, version: Version) -> Vec<Frame> {
        let mut frames = self.frames.clone();
        dates::convert(&mut frames, version);
        frames
            .into_values()
            .flatten()
            .filter_map(|frame| match frame.to_version(version) {
                Ok(frame) => Some(frame),
                Err(error) => {
                    tracing::warn!(frameid = frame.frameid(), %error, "Ignoring incompatible frame");
                    None
                }
            })
            .collect()
    }

    /// Frames ready for encoding: converted, merged and ordered.
    fn prepare_frames(&self) -> Vec<Frame> {
        let mut grouped: BTreeMap<String, Vec<Frame>> = BTreeMap::new();
        for frame in self.converted_frames(self.version) {
            grouped.entry(frame.frameid().to_string()).or_default().push(frame);
        }

        let mut frames = Vec::with_capacity(self.len());
        for (_, group) in grouped {
            for mut frame in Frame::merge(group) {
                if frame.encoding().is_some_and(|e| !self.version.allows_encoding(e)) {
                    frame.set_encoding(None);
                }
                if self.version == Version::V2_2 {
                    join_text_values(&mut frame);
                }
                frames.push(frame);
            }
        }
        order::default_order().sort(&mut frames);
        frames
    }

    // ----- Writing -----

    /// Serialize the tag.
    ///
    /// `size_hint` is the size of the tag being replaced; see
    /// [`Padding::size_for`]. A tag without frames encodes to no bytes.
    ///
    /// # Errors
    ///
    /// Fails if a frame cannot be encoded, e.g. with
    /// [`Error::UnrepresentableText`].
    pub fn encode(&self, size_hint: Option<usize>) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let unsynchronised = self.flags.has(TagFlags::UNSYNCHRONISED);
        let mut body = Vec::new();
        for frame in self.prepare_frames() {
            body.extend(framing::encode_frame(&frame, self.version, unsynchronised)?);
        }
        if unsynchronised && self.version != Version::V2_4 {
            body = unsync_encode(&body);
        }

        let footer = self.version == Version::V2_4 && self.flags.has(TagFlags::FOOTER);
        let actual = HEADER_SIZE + body.len();
        let size = if footer { actual } else { self.padding.size_for(size_hint, actual) };

        let mut flags = TagFlags(self.flags.0 & (TagFlags::UNSYNCHRONISED | TagFlags::EXPERIMENTAL));
        if self.version == Version::V2_2 {
            flags.clear(TagFlags::EXPERIMENTAL);
        }
        if footer {
            flags.set(TagFlags::FOOTER);
        }

        let mut out = framing::header_bytes(b"ID3", self.version, flags, size - HEADER_SIZE)?;
        out.extend(body);
        out.resize(size, 0);
        if footer {
            out.extend(framing::header_bytes(b"3DI", self.version, flags, size - HEADER_SIZE)?);
        }
        Ok(out)
    }

    /// Write the tag to the start of the file at `path`, replacing any
    /// existing ID3v2 tag.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        self.write_with(path, &PatchOptions::default())
    }

    pub fn write_with(&self, path: impl AsRef<Path>, options: &PatchOptions) -> Result<()> {
        let path = path.as_ref();
        let (offset, length) = detect_tag(path)?.map_or((0, 0), |info| (info.offset, info.length));
        let data = self.encode(Some(length as usize))?;
        tagline_patch::replace_region(path, offset, length, &data, options)?;
        tracing::info!(
            path = %path.display(),
            version = %self.version,
            old_size = length,
            new_size = data.len(),
            "Wrote tag"
        );
        Ok(())
    }
}

fn decode_frame(version: Version, raw: &RawFrame<'_>, tag_unsynchronised: bool, position: usize) -> Option<Frame> {
    let frameid = raw.frameid.as_str();
    let interpreted = match version {
        Version::V2_2 => Ok((FrameFlags::default(), std::borrow::Cow::Borrowed(raw.data))),
        Version::V2_3 => framing::interpret_v23(frameid, raw.flags, raw.data),
        Version::V2_4 => framing::interpret_v24(frameid, raw.flags, raw.data, tag_unsynchronised),
    };
    let decoded = interpreted.and_then(|(flags, data)| Frame::decode(frameid, &data, flags, Some(position)));
    match decoded {
        Ok(frame) => frame,
        Err(error) => {
            tracing::warn!(frameid, position, %error, "Invalid frame");
            let data = ErrorData {
                data: raw.data.to_vec(),
                error,
                raw_flags: raw.flags,
                version,
            };
            Some(Frame::error(frameid, data, Some(position)))
        }
    }
}

/// ID3v2.2 text frames hold a single string.
fn join_text_values(frame: &mut Frame) {
    let Some(values) = frame.text_values() else {
        return;
    };
    if values.len() > 1 {
        let joined = values.join(" / ");
        tracing::warn!(frameid = frame.frameid(), "Merged multiple text strings into one value");
        if let Err(error) = frame.set("text", Value::text_list([joined])) {
            tracing::warn!(frameid = frame.frameid(), %error, "Cannot merge text strings");
        }
    }
}

// ----- File operations -----

/// Locate the ID3v2 tag at the start of the file at `path`.
///
/// # Errors
///
/// [`Error::Tag`] if an `ID3` signature is present with an unsupported
/// version.
pub fn detect_tag(path: impl AsRef<Path>) -> Result<Option<TagInfo>> {
    let mut file = File::open(path.as_ref())?;
    let mut raw_header = [0u8; HEADER_SIZE];
    match file.read_exact(&mut raw_header) {
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        result => result?,
    }
    match framing::parse_header(&raw_header) {
        Ok(header) => Ok(Some(TagInfo {
            version: header.version,
            offset: 0,
            length: header.total_size() as u64,
        })),
        Err(Error::NoTag(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Read the ID3v2 tag at the start of the file at `path`.
pub fn read_tag(path: impl AsRef<Path>) -> Result<Tag> {
    read_tag_with(path, &ReadOptions::default())
}

pub fn read_tag_with(path: impl AsRef<Path>, options: &ReadOptions) -> Result<Tag> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "Reading tag");
    let mut reader = BufReader::new(File::open(path)?);
    Tag::read_from(&mut reader, options)
}

/// Remove the ID3v2 tag from the file at `path`. Returns whether a tag
/// was present.
pub fn delete_tag(path: impl AsRef<Path>) -> Result<bool> {
    delete_tag_with(path, &PatchOptions::default())
}

pub fn delete_tag_with(path: impl AsRef<Path>, options: &PatchOptions) -> Result<bool> {
    let path = path.as_ref();
    let Some(info) = detect_tag(path)? else {
        return Ok(false);
    };
    tagline_patch::replace_region(path, info.offset, info.length, &[], options)?;
    tracing::info!(path = %path.display(), removed = info.length, "Deleted tag");
    Ok(true)
}
