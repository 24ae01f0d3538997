//! Version-specific framing: tag headers, extended headers, frame headers
//! and frame flag transforms.
//!
//! | Version | Frame header                              | Size      |
//! |---------|-------------------------------------------|-----------|
//! | v2.2    | id(3) size(3)                             | raw       |
//! | v2.3    | id(4) size(4) flags(2)                    | raw       |
//! | v2.4    | id(4) size(4) flags(2)                    | sync-safe |

use std::borrow::Cow;
use std::io::{Read, Write};

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::bytes::{int8_encode, syncsafe_decode, syncsafe_encode, unsync_decode, unsync_encode};
use crate::error::{Error, FrameError, Result};
use crate::frame::{is_valid_frame_id, Frame, FrameFlags};
use crate::tag::{ExtendedHeader, ItunesWorkaround, TagFlags, Version};

/// Size of the tag header and of the v2.4 footer.
pub const HEADER_SIZE: usize = 10;

// ID3v2.3 frame flags
const V23_DISCARD_ON_TAG_ALTER: u16 = 0x8000;
const V23_DISCARD_ON_FILE_ALTER: u16 = 0x4000;
const V23_READ_ONLY: u16 = 0x2000;
const V23_STATUS_UNKNOWN: u16 = 0x1F00;
const V23_COMPRESSED: u16 = 0x0080;
const V23_ENCRYPTED: u16 = 0x0040;
const V23_GROUP: u16 = 0x0020;
const V23_FORMAT_UNKNOWN: u16 = 0x001F;

// ID3v2.4 frame flags
const V24_DISCARD_ON_TAG_ALTER: u16 = 0x4000;
const V24_DISCARD_ON_FILE_ALTER: u16 = 0x2000;
const V24_READ_ONLY: u16 = 0x1000;
const V24_STATUS_UNKNOWN: u16 = 0x8F00;
const V24_GROUP: u16 = 0x0040;
const V24_COMPRESSED: u16 = 0x0008;
const V24_ENCRYPTED: u16 = 0x0004;
const V24_UNSYNCHRONISED: u16 = 0x0002;
const V24_DATA_LENGTH_INDICATOR: u16 = 0x0001;
const V24_FORMAT_UNKNOWN: u16 = 0x00B0;

/// Parsed fixed tag header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: Version,
    pub flags: TagFlags,
    /// Tag size excluding the header and any footer.
    pub size: usize,
}

impl Header {
    /// Bytes the tag occupies in the file, header and footer included.
    pub fn total_size(&self) -> usize {
        let footer = if self.flags.has(TagFlags::FOOTER) { HEADER_SIZE } else { 0 };
        HEADER_SIZE + self.size + footer
    }
}

/// Parse the 10-byte tag header.
///
/// # Errors
///
/// [`Error::NoTag`] without an `ID3` signature, [`Error::Tag`] for an
/// unsupported version or a tag-level feature that cannot be read.
pub fn parse_header(data: &[u8; HEADER_SIZE]) -> Result<Header> {
    if &data[0..3] != b"ID3" {
        return Err(Error::NoTag("ID3v2 tag not found"));
    }
    let version = match (Version::from_major(data[3]), data[4]) {
        (Some(version), 0) => version,
        _ => return Err(Error::Tag(format!("Unknown ID3 version: 2.{}.{}", data[3], data[4]))),
    };

    let raw = data[5];
    let known = match version {
        Version::V2_2 => {
            if raw & 0x40 != 0 {
                return Err(Error::Tag("ID3v2.2 tag compression is not supported".to_string()));
            }
            TagFlags::UNSYNCHRONISED
        }
        Version::V2_3 => TagFlags::UNSYNCHRONISED | TagFlags::EXTENDED_HEADER | TagFlags::EXPERIMENTAL,
        Version::V2_4 => {
            TagFlags::UNSYNCHRONISED | TagFlags::EXTENDED_HEADER | TagFlags::EXPERIMENTAL | TagFlags::FOOTER
        }
    };
    if raw & !known != 0 {
        tracing::warn!(%version, flags = format!("0x{raw:02X}"), "Unknown tag flags");
    }

    let size = syncsafe_decode(&data[6..10]).map_err(|_| Error::Tag("Invalid sync-safe tag size".to_string()))?;
    Ok(Header {
        version,
        flags: TagFlags(raw & known),
        size: size as usize,
    })
}

/// Serialize a tag header (`magic` = `ID3`) or v2.4 footer (`3DI`).
pub fn header_bytes(magic: &[u8; 3], version: Version, flags: TagFlags, size: usize) -> Result<Vec<u8>> {
    let size = u32::try_from(size).map_err(|_| Error::Tag(format!("Tag too large: {size} bytes")))?;
    let size = syncsafe_encode(size, 4).map_err(|_| Error::Tag(format!("Tag too large: {size} bytes")))?;
    let mut out = Vec::with_capacity(HEADER_SIZE);
    out.extend_from_slice(magic);
    out.extend_from_slice(&[version.major(), 0, flags.0]);
    out.extend(size);
    Ok(out)
}

// ----- Extended headers -----

fn truncated_ext(_: std::io::Error) -> Error {
    Error::Tag("Extended header is truncated".to_string())
}

/// Parse an ID3v2.3 extended header from the front of `data`, advancing it.
pub fn parse_extended_v23(data: &mut &[u8]) -> Result<ExtendedHeader> {
    let start = data.len();
    let size = data.read_u32::<BigEndian>().map_err(truncated_ext)? as usize;
    let flags = data.read_u16::<BigEndian>().map_err(truncated_ext)?;
    let padding_size = data.read_u32::<BigEndian>().map_err(truncated_ext)?;
    if size != 6 && size != 10 {
        tracing::warn!(size, "Unexpected size of ID3v2.3 extended header");
    }

    let mut header = ExtendedHeader {
        padding_size: Some(padding_size),
        ..Default::default()
    };
    if flags & 0x8000 != 0 {
        if size < 10 {
            tracing::warn!(size, "Extended header is too short for a CRC field");
        } else {
            header.crc32 = Some(data.read_u32::<BigEndian>().map_err(truncated_ext)?);
        }
    }

    let consumed = start - data.len();
    let remaining = (4 + size).saturating_sub(consumed);
    if remaining > data.len() {
        return Err(Error::Tag("Extended header is larger than the tag".to_string()));
    }
    *data = &data[remaining..];
    Ok(header)
}

/// Parse an ID3v2.4 extended header from the front of `data`, advancing it.
pub fn parse_extended_v24(data: &mut &[u8]) -> Result<ExtendedHeader> {
    if data.len() < 4 {
        return Err(Error::Tag("Extended header is truncated".to_string()));
    }
    let size = syncsafe_decode(&data[..4]).map_err(|_| Error::Tag("Invalid extended header size".to_string()))? as usize;
    if size < 6 || size > data.len() {
        return Err(Error::Tag(format!("Invalid extended header size: {size}")));
    }
    let mut body = &data[4..size];
    *data = &data[size..];

    let numflags = usize::from(body[0]);
    if numflags != 1 {
        tracing::warn!(numflags, "Unexpected number of ID3v2.4 extended flag bytes");
    }
    let flags = body[1];
    body = body.get(1 + numflags..).unwrap_or_default();

    let mut header = ExtendedHeader::default();
    if flags & 0x40 != 0 {
        header.update = true;
        flag_data(&mut body)?;
    }
    if flags & 0x20 != 0 {
        let crc = flag_data(&mut body)?;
        header.crc32 = Some(syncsafe_decode(crc).map_err(|_| Error::Tag("Invalid extended header CRC".to_string()))?);
    }
    if flags & 0x10 != 0 {
        header.restrictions = flag_data(&mut body)?.first().copied();
    }
    Ok(header)
}

/// One length-prefixed extended header flag data item.
fn flag_data<'a>(data: &mut &'a [u8]) -> Result<&'a [u8]> {
    let invalid = || Error::Tag("Invalid size of extended header field".to_string());
    let (&len, rest) = data.split_first().ok_or_else(invalid)?;
    let len = usize::from(len);
    if len & 0x80 != 0 || len > rest.len() {
        return Err(invalid());
    }
    let (item, rest) = rest.split_at(len);
    *data = rest;
    Ok(item)
}

// ----- Frame headers -----

/// A frame as found in the frame stream, before flag processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame<'a> {
    pub frameid: String,
    pub flags: u16,
    pub data: &'a [u8],
}

/// Split a frame stream into raw frames, stopping at the first header
/// without a valid frame id (padding) or at the end of the data.
///
/// # Errors
///
/// [`Error::Tag`] if a v2.4 frame size is not sync-safe and the iTunes
/// workaround is disabled.
pub fn split_frames(version: Version, data: &[u8], itunes: ItunesWorkaround) -> Result<Vec<RawFrame<'_>>> {
    match version {
        Version::V2_2 => Ok(scan_frames(data, 3, 3, |b| Ok(BigEndian::read_uint(b, 3) as usize))?),
        Version::V2_3 => Ok(scan_frames(data, 4, 4, |b| Ok(BigEndian::read_u32(b) as usize))?),
        Version::V2_4 => {
            let eight_bit = |b: &[u8]| Ok(BigEndian::read_u32(b) as usize);
            let syncsafe = |b: &[u8]| syncsafe_decode(b).map(|v| v as usize);
            match itunes {
                ItunesWorkaround::Always => Ok(scan_frames(data, 4, 4, eight_bit)?),
                ItunesWorkaround::Never => scan_frames(data, 4, 4, syncsafe)
                    .map_err(|e| Error::Tag(format!("Invalid ID3v2.4 frame size: {e}"))),
                ItunesWorkaround::Detect => match scan_frames(data, 4, 4, syncsafe) {
                    Ok(frames) => Ok(frames),
                    Err(_) => {
                        // Older iTunes releases wrote plain 8-bit frame sizes.
                        tracing::warn!("Invalid sync-safe frame size; switching to 8-bit mode");
                        Ok(scan_frames(data, 4, 4, eight_bit)?)
                    }
                },
            }
        }
    }
}

fn scan_frames<F>(data: &[u8], id_len: usize, size_len: usize, size_of: F) -> std::result::Result<Vec<RawFrame<'_>>, FrameError>
where
    F: Fn(&[u8]) -> std::result::Result<usize, FrameError>,
{
    let has_flags = id_len == 4;
    let header_len = id_len + size_len + if has_flags { 2 } else { 0 };
    let mut frames = Vec::new();
    let mut rest = data;
    while rest.len() >= header_len {
        let Ok(frameid) = std::str::from_utf8(&rest[..id_len]) else {
            break;
        };
        if !is_valid_frame_id(frameid) {
            break;
        }
        let size = size_of(&rest[id_len..id_len + size_len])?;
        let flags = if has_flags {
            BigEndian::read_u16(&rest[id_len + size_len..header_len])
        } else {
            0
        };
        let body = &rest[header_len..];
        if size > body.len() {
            tracing::warn!(frameid, size, available = body.len(), "Frame extends past the end of the tag");
            frames.push(RawFrame {
                frameid: frameid.to_string(),
                flags,
                data: body,
            });
            break;
        }
        frames.push(RawFrame {
            frameid: frameid.to_string(),
            flags,
            data: &body[..size],
        });
        rest = &body[size..];
    }
    Ok(frames)
}

// ----- Frame flags -----

fn take<'a>(data: &mut &'a [u8], n: usize) -> std::result::Result<&'a [u8], FrameError> {
    if data.len() < n {
        return Err(FrameError::UnexpectedEndOfData);
    }
    let (head, tail) = data.split_at(n);
    *data = tail;
    Ok(head)
}

fn inflate(frameid: &str, data: &[u8], expected: Option<usize>) -> std::result::Result<Vec<u8>, FrameError> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::with_capacity(expected.unwrap_or(data.len()).min(1 << 24));
    decoder
        .read_to_end(&mut out)
        .map_err(|e| FrameError::Decompression(e.to_string()))?;
    if let Some(expected) = expected {
        if expected != out.len() {
            tracing::warn!(frameid, expected, actual = out.len(), "Decompressed size mismatch");
        }
    }
    Ok(out)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Undo the frame-level transforms of an ID3v2.3 frame.
pub fn interpret_v23<'a>(
    frameid: &str,
    raw: u16,
    data: &'a [u8],
) -> std::result::Result<(FrameFlags, Cow<'a, [u8]>), FrameError> {
    if raw & V23_FORMAT_UNKNOWN != 0 {
        return Err(FrameError::UnknownFlags(raw));
    }
    let mut flags = status_flags(frameid, raw, [V23_DISCARD_ON_TAG_ALTER, V23_DISCARD_ON_FILE_ALTER, V23_READ_ONLY], V23_STATUS_UNKNOWN);
    let mut rest = data;

    let expanded = if raw & V23_COMPRESSED != 0 {
        flags.compressed = true;
        Some(BigEndian::read_u32(take(&mut rest, 4)?) as usize)
    } else {
        None
    };
    if raw & V23_ENCRYPTED != 0 {
        return Err(FrameError::UnsupportedEncryption);
    }
    if raw & V23_GROUP != 0 {
        flags.group = Some(take(&mut rest, 1)?[0]);
    }

    let data = match expanded {
        Some(expected) => Cow::Owned(inflate(frameid, rest, Some(expected))?),
        None => Cow::Borrowed(rest),
    };
    Ok((flags, data))
}

/// Undo the frame-level transforms of an ID3v2.4 frame.
///
/// With tag-wide unsynchronisation every frame is unsynchronised, so the
/// per-frame flag is not recorded in that case.
pub fn interpret_v24<'a>(
    frameid: &str,
    raw: u16,
    data: &'a [u8],
    tag_unsynchronised: bool,
) -> std::result::Result<(FrameFlags, Cow<'a, [u8]>), FrameError> {
    if raw & V24_FORMAT_UNKNOWN != 0 {
        return Err(FrameError::UnknownFlags(raw));
    }
    let mut flags = status_flags(frameid, raw, [V24_DISCARD_ON_TAG_ALTER, V24_DISCARD_ON_FILE_ALTER, V24_READ_ONLY], V24_STATUS_UNKNOWN);
    let mut rest = data;

    if raw & V24_GROUP != 0 {
        flags.group = Some(take(&mut rest, 1)?[0]);
    }
    if raw & V24_ENCRYPTED != 0 {
        return Err(FrameError::UnsupportedEncryption);
    }
    let compressed = raw & V24_COMPRESSED != 0;
    let unsynchronised = raw & V24_UNSYNCHRONISED != 0;
    flags.compressed = compressed;
    flags.unsynchronised = unsynchronised && !tag_unsynchronised;

    let expanded = if raw & V24_DATA_LENGTH_INDICATOR != 0 {
        // Implied by compression and unsynchronisation on write.
        flags.data_length_indicator = !compressed && !unsynchronised;
        Some(syncsafe_decode(take(&mut rest, 4)?)? as usize)
    } else {
        None
    };

    let mut data = Cow::Borrowed(rest);
    if unsynchronised || tag_unsynchronised {
        data = Cow::Owned(unsync_decode(&data));
    }
    if compressed {
        data = Cow::Owned(inflate(frameid, &data, expanded)?);
    }
    Ok((flags, data))
}

fn status_flags(frameid: &str, raw: u16, [tag_alter, file_alter, read_only]: [u16; 3], unknown: u16) -> FrameFlags {
    if raw & unknown != 0 {
        tracing::warn!(frameid, flags = format!("0x{raw:04X}"), "Unexpected frame status flags");
    }
    FrameFlags {
        discard_on_tag_alter: raw & tag_alter != 0,
        discard_on_file_alter: raw & file_alter != 0,
        read_only: raw & read_only != 0,
        ..Default::default()
    }
}

// ----- Frame encoding -----

/// Serialize one frame, header included, for a tag of `version`.
///
/// The frame must already be converted to `version`. Error frames are
/// written back with their original flags and raw data.
pub fn encode_frame(frame: &Frame, version: Version, tag_unsynchronised: bool) -> Result<Vec<u8>> {
    let frameid = frame.frameid();
    if frameid.len() != version.frame_id_len() || !is_valid_frame_id(frameid) {
        return Err(Error::InvalidFrameId(frameid.to_string()));
    }

    let (flags, info, data) = match frame.error_data() {
        Some(error) => (error.raw_flags, Vec::new(), error.data.clone()),
        None => {
            let data = frame.encode(version.encodings())?;
            match version {
                Version::V2_2 => (0, Vec::new(), data),
                Version::V2_3 => v23_transforms(&frame.flags, data)?,
                Version::V2_4 => v24_transforms(&frame.flags, data, tag_unsynchronised)?,
            }
        }
    };

    let size = info.len() + data.len();
    let mut out = Vec::with_capacity(HEADER_SIZE + size);
    out.extend_from_slice(frameid.as_bytes());
    match version {
        Version::V2_2 => out.extend(int8_encode(size as u64, 3)?),
        Version::V2_3 => out.extend(int8_encode(size as u64, 4)?),
        Version::V2_4 => {
            let size = u32::try_from(size).map_err(|_| FrameError::ValueTooLarge { value: size as u64, width: 4 })?;
            out.extend(syncsafe_encode(size, 4)?);
        }
    }
    if version != Version::V2_2 {
        out.extend_from_slice(&flags.to_be_bytes());
    }
    out.extend(info);
    out.extend(data);
    Ok(out)
}

type Transformed = (u16, Vec<u8>, Vec<u8>);

fn v23_transforms(frame_flags: &FrameFlags, data: Vec<u8>) -> Result<Transformed> {
    let mut flags = 0;
    let mut info = Vec::new();
    let mut data = data;
    if frame_flags.compressed {
        info.extend(int8_encode(data.len() as u64, 4)?);
        data = deflate(&data)?;
        flags |= V23_COMPRESSED;
    }
    if let Some(group) = frame_flags.group {
        info.push(group);
        flags |= V23_GROUP;
    }
    flags |= status_bits(frame_flags, [V23_DISCARD_ON_TAG_ALTER, V23_DISCARD_ON_FILE_ALTER, V23_READ_ONLY]);
    Ok((flags, info, data))
}

fn v24_transforms(frame_flags: &FrameFlags, data: Vec<u8>, tag_unsynchronised: bool) -> Result<Transformed> {
    let mut flags = 0;
    let mut info = Vec::new();
    let original_len = data.len();
    let mut data = data;
    if let Some(group) = frame_flags.group {
        info.push(group);
        flags |= V24_GROUP;
    }
    if frame_flags.compressed {
        data = deflate(&data)?;
        flags |= V24_COMPRESSED;
    }
    if frame_flags.unsynchronised || tag_unsynchronised {
        data = unsync_encode(&data);
        flags |= V24_UNSYNCHRONISED;
    }
    if flags & (V24_COMPRESSED | V24_UNSYNCHRONISED) != 0 || frame_flags.data_length_indicator {
        let len = u32::try_from(original_len).map_err(|_| FrameError::ValueTooLarge {
            value: original_len as u64,
            width: 4,
        })?;
        info.extend(syncsafe_encode(len, 4)?);
        flags |= V24_DATA_LENGTH_INDICATOR;
    }
    flags |= status_bits(frame_flags, [V24_DISCARD_ON_TAG_ALTER, V24_DISCARD_ON_FILE_ALTER, V24_READ_ONLY]);
    Ok((flags, info, data))
}

fn status_bits(flags: &FrameFlags, [tag_alter, file_alter, read_only]: [u16; 3]) -> u16 {
    let mut bits = 0;
    if flags.discard_on_tag_alter {
        bits |= tag_alter;
    }
    if flags.discard_on_file_alter {
        bits |= file_alter;
    }
    if flags.read_only {
        bits |= read_only;
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        let header = parse_header(b"ID3\x03\x00\x80\x00\x00\x02\x01").unwrap();
        assert_eq!(header.version, Version::V2_3);
        assert!(header.flags.has(TagFlags::UNSYNCHRONISED));
        assert_eq!(header.size, 257);
        assert_eq!(header.total_size(), 267);
    }

    #[test]
    fn test_parse_header_rejects_bad_input() {
        assert!(matches!(parse_header(b"TAG\x03\x00\x00\x00\x00\x00\x00"), Err(Error::NoTag(_))));
        assert!(matches!(parse_header(b"ID3\x05\x00\x00\x00\x00\x00\x00"), Err(Error::Tag(_))));
        assert!(matches!(parse_header(b"ID3\x02\x00\x40\x00\x00\x00\x00"), Err(Error::Tag(_))));
        assert!(matches!(parse_header(b"ID3\x03\x00\x00\x00\x80\x00\x00"), Err(Error::Tag(_))));
    }

    #[test]
    fn test_footer_counts_towards_total_size() {
        let header = parse_header(b"ID3\x04\x00\x10\x00\x00\x00\x14").unwrap();
        assert_eq!(header.total_size(), 40);
    }

    #[test]
    fn test_split_frames_stops_at_padding() {
        let mut data = b"TIT2\x00\x00\x00\x05\x00\x00\x00Song".to_vec();
        data.extend_from_slice(&[0; 20]);
        let frames = split_frames(Version::V2_3, &data, ItunesWorkaround::Detect).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].frameid, "TIT2");
        assert_eq!(frames[0].data, b"\x00Song");
    }

    #[test]
    fn test_itunes_eight_bit_sizes() {
        let mut data = b"TXXX\x00\x00\x00\x82\x00\x00".to_vec();
        data.extend(std::iter::repeat(b'a').take(0x82));
        data.extend_from_slice(b"TIT2\x00\x00\x00\x02\x00\x00\x00X");

        let frames = split_frames(Version::V2_4, &data, ItunesWorkaround::Detect).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].data.len(), 0x82);
        assert_eq!(frames[1].frameid, "TIT2");

        assert!(matches!(
            split_frames(Version::V2_4, &data, ItunesWorkaround::Never),
            Err(Error::Tag(_))
        ));
        assert_eq!(split_frames(Version::V2_4, &data, ItunesWorkaround::Always).unwrap(), frames);
    }

    #[test]
    fn test_v23_extended_header_with_crc() {
        let mut data: &[u8] = b"\x00\x00\x00\x0A\x80\x00\x00\x00\x01\x00\xDE\xAD\xBE\xEFrest";
        let header = parse_extended_v23(&mut data).unwrap();
        assert_eq!(header.padding_size, Some(256));
        assert_eq!(header.crc32, Some(0xDEAD_BEEF));
        assert_eq!(data, b"rest");
    }

    #[test]
    fn test_v24_extended_header_flags() {
        let mut data: &[u8] = b"\x00\x00\x00\x09\x01\x50\x00\x01\x1Frest";
        let header = parse_extended_v24(&mut data).unwrap();
        assert!(header.update);
        assert_eq!(header.restrictions, Some(0x1F));
        assert_eq!(header.crc32, None);
        assert_eq!(data, b"rest");
    }

    #[test]
    fn test_encrypted_frames_are_rejected() {
        let result = interpret_v23("TIT2", V23_ENCRYPTED, b"\x01\x00Song");
        assert_eq!(result, Err(FrameError::UnsupportedEncryption));
        let result = interpret_v24("TIT2", V24_ENCRYPTED, b"\x01\x00Song", false);
        assert_eq!(result, Err(FrameError::UnsupportedEncryption));
    }

    #[test]
    fn test_unknown_format_flags_are_frame_errors() {
        assert_eq!(interpret_v23("TIT2", 0x0001, b"x"), Err(FrameError::UnknownFlags(0x0001)));
        assert_eq!(interpret_v24("TIT2", 0x0010, b"x", false), Err(FrameError::UnknownFlags(0x0010)));
    }

    #[test]
    fn test_v23_compressed_grouped_frame() {
        let mut frame = Frame::text("TIT2", ["Song"]).unwrap();
        frame.flags.compressed = true;
        frame.flags.group = Some(7);
        let encoded = encode_frame(&frame, Version::V2_3, false).unwrap();
        let raw = BigEndian::read_u16(&encoded[8..10]);
        assert_eq!(raw, V23_COMPRESSED | V23_GROUP);
        // Decompressed size, then the group byte.
        assert_eq!(&encoded[10..14], &[0, 0, 0, 6]);
        assert_eq!(encoded[14], 7);

        let (flags, data) = interpret_v23("TIT2", raw, &encoded[10..]).unwrap();
        assert_eq!(flags, frame.flags);
        assert_eq!(&data[..], b"\x00Song\x00");
    }

    #[test]
    fn test_v24_unsynchronised_frame() {
        let mut frame = Frame::new("PRIV").unwrap();
        frame.set("data", crate::Value::Binary(vec![0xFF, 0xE0, 0x01])).unwrap();
        frame.flags.unsynchronised = true;
        let encoded = encode_frame(&frame, Version::V2_4, false).unwrap();
        let raw = BigEndian::read_u16(&encoded[8..10]);
        assert_eq!(raw, V24_UNSYNCHRONISED | V24_DATA_LENGTH_INDICATOR);

        let (flags, data) = interpret_v24("PRIV", raw, &encoded[10..], false).unwrap();
        assert_eq!(flags, frame.flags);
        assert_eq!(&data[..], b"\x00\xFF\xE0\x01");
    }

    #[test]
    fn test_v22_frame_header() {
        let frame = Frame::text("TT2", ["Hi"]).unwrap();
        let encoded = encode_frame(&frame, Version::V2_2, false).unwrap();
        assert_eq!(encoded, b"TT2\x00\x00\x04\x00Hi\x00".to_vec());
        assert!(matches!(
            encode_frame(&frame, Version::V2_3, false),
            Err(Error::InvalidFrameId(_))
        ));
    }
}
