//! Frames: typed records inside an ID3v2 tag.
//!
//! A [`Frame`] is either a decoded record whose values follow the field
//! layout of its [`FrameDescriptor`], or an error frame that keeps the raw
//! bytes of a record that could not be decoded together with the reason.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::encoding::TextEncoding;
use crate::error::{Error, FrameError, Result};
use crate::field::{FieldContext, FieldKind, Value};
use crate::registry::{self, FrameDescriptor, V23_V24_RENAMES};
use crate::tag::Version;

static FRAME_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Z0-9]{2}[A-Z0-9 ]?$").unwrap_or_else(|e| panic!("frame id pattern: {e}"))
});

/// Whether `id` is syntactically a frame id. Anything else found where a
/// frame header is expected marks the start of padding.
pub fn is_valid_frame_id(id: &str) -> bool {
    FRAME_ID.is_match(id)
}

/// Per-frame flags, decoded from the version-specific flag word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FrameFlags {
    pub compressed: bool,
    pub encrypted: bool,
    pub unsynchronised: bool,
    pub data_length_indicator: bool,
    pub read_only: bool,
    pub discard_on_tag_alter: bool,
    pub discard_on_file_alter: bool,
    /// The frame id is not in the frame table.
    pub unknown: bool,
    /// Grouping identity, if the frame belongs to a group.
    pub group: Option<u8>,
}

impl FrameFlags {
    /// Names of the flags that are set, for display.
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        let named = [
            (self.compressed, "compressed"),
            (self.encrypted, "encrypted"),
            (self.unsynchronised, "unsynchronised"),
            (self.data_length_indicator, "data_length_indicator"),
            (self.read_only, "read_only"),
            (self.discard_on_tag_alter, "discard_on_tag_alter"),
            (self.discard_on_file_alter, "discard_on_file_alter"),
            (self.unknown, "unknown"),
        ];
        names.extend(named.iter().filter(|(set, _)| *set).map(|(_, name)| name.to_string()));
        if let Some(group) = self.group {
            names.push(format!("group={group}"));
        }
        names
    }
}

/// Raw contents of a frame that failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorData {
    /// Frame payload as stored in the tag, before flag processing.
    pub data: Vec<u8>,
    pub error: FrameError,
    /// The frame's flag word as stored in the tag.
    pub raw_flags: u16,
    /// Version of the tag the frame was read from.
    pub version: Version,
}

#[derive(Debug, Clone, PartialEq)]
enum Body {
    Fields {
        descriptor: &'static FrameDescriptor,
        values: Vec<Option<Value>>,
    },
    Error(ErrorData),
}

/// One frame of an ID3v2 tag.
///
/// Equality compares the id, flags and field values; the original
/// position in the tag is not part of a frame's identity.
#[derive(Debug, Clone)]
pub struct Frame {
    frameid: String,
    pub flags: FrameFlags,
    position: Option<usize>,
    body: Body,
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.frameid == other.frameid && self.flags == other.flags && self.body == other.body
    }
}

impl Frame {
    /// Create an empty frame of a registered type.
    ///
    /// Fields start at their defaults; the text encoding is left unset and
    /// chosen when the frame is encoded.
    pub fn new(frameid: &str) -> Result<Self> {
        if !is_valid_frame_id(frameid) {
            return Err(Error::InvalidFrameId(frameid.to_string()));
        }
        let descriptor = registry::lookup(frameid).ok_or_else(|| Error::UnknownFrame(frameid.to_string()))?;
        Ok(Self::from_descriptor(frameid, descriptor))
    }

    /// Create an empty frame with an id that is not in the frame table.
    pub fn unknown(frameid: &str) -> Result<Self> {
        if !is_valid_frame_id(frameid) {
            return Err(Error::InvalidFrameId(frameid.to_string()));
        }
        let mut frame = Self::from_descriptor(frameid, registry::unknown_descriptor(frameid));
        frame.flags.unknown = true;
        Ok(frame)
    }

    /// Create a text frame holding `values`.
    pub fn text<I, S>(frameid: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut frame = Self::new(frameid)?;
        frame.set("text", Value::text_list(values))?;
        Ok(frame)
    }

    /// Create a URL frame.
    pub fn url(frameid: &str, url: &str) -> Result<Self> {
        let mut frame = Self::new(frameid)?;
        frame.set("url", Value::Text(url.to_string()))?;
        Ok(frame)
    }

    /// Wrap the payload of a frame that could not be decoded.
    pub fn error(frameid: &str, error: ErrorData, position: Option<usize>) -> Self {
        Self {
            frameid: frameid.to_string(),
            flags: FrameFlags::default(),
            position,
            body: Body::Error(error),
        }
    }

    fn from_descriptor(frameid: &str, descriptor: &'static FrameDescriptor) -> Self {
        Self {
            frameid: frameid.to_string(),
            flags: FrameFlags::default(),
            position: None,
            body: Body::Fields {
                descriptor,
                values: descriptor.specs.iter().map(|s| s.default_value()).collect(),
            },
        }
    }

    pub fn frameid(&self) -> &str {
        &self.frameid
    }

    /// Ordinal position in the tag the frame was read from.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Option<usize>) {
        self.position = position;
    }

    /// Frame type descriptor; `None` for error frames.
    pub fn descriptor(&self) -> Option<&'static FrameDescriptor> {
        match &self.body {
            Body::Fields { descriptor, .. } => Some(descriptor),
            Body::Error(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.body, Body::Error(_))
    }

    /// The decode failure of an error frame.
    pub fn error_data(&self) -> Option<&ErrorData> {
        match &self.body {
            Body::Error(e) => Some(e),
            Body::Fields { .. } => None,
        }
    }

    pub fn is_text(&self) -> bool {
        self.descriptor().is_some_and(FrameDescriptor::is_text)
    }

    /// Field names and values in layout order.
    pub fn fields(&self) -> Vec<(&'static str, Option<&Value>)> {
        match &self.body {
            Body::Fields { descriptor, values } => descriptor
                .specs
                .iter()
                .zip(values)
                .map(|(spec, value)| (spec.name, value.as_ref()))
                .collect(),
            Body::Error(_) => Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        match &self.body {
            Body::Fields { descriptor, values } => {
                let index = descriptor.specs.iter().position(|s| s.name == name)?;
                values[index].as_ref()
            }
            Body::Error(_) => None,
        }
    }

    /// Assign a field value after validating it.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if the frame has no such field or the value
    /// does not fit it.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let Body::Fields { descriptor, values } = &mut self.body else {
            return Err(Error::validation(name, "error frames have no fields"));
        };
        let specs = descriptor.specs;
        let index = specs
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| Error::validation(name, format!("{} has no such field", self.frameid)))?;
        let spec = &specs[index];
        spec.validate(&FieldContext::new(specs, values), &value)?;

        if let (FieldKind::SignMagnitude { sign_bit, .. }, Value::Signed(v)) = (spec.kind, &value) {
            if let Some(signs_index) = specs.iter().position(|s| s.name == "signs") {
                let signs = values[signs_index].as_ref().and_then(Value::as_int).unwrap_or(0);
                let signs = if *v < 0 { signs & !(1 << sign_bit) } else { signs | (1 << sign_bit) };
                values[signs_index] = Some(Value::Int(signs));
            }
        }
        values[index] = Some(value);
        Ok(())
    }

    /// Builder form of [`Frame::set`].
    pub fn with(mut self, name: &str, value: Value) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Unset an optional field; later optional fields are dropped too.
    pub fn clear(&mut self, name: &str) -> Result<()> {
        let Body::Fields { descriptor, values } = &mut self.body else {
            return Ok(());
        };
        let index = descriptor
            .specs
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| Error::validation(name, "no such field"))?;
        if !descriptor.specs[index].optional {
            return Err(Error::validation(name, "field is not optional"));
        }
        for value in &mut values[index..] {
            *value = None;
        }
        Ok(())
    }

    /// The explicitly selected text encoding, if any.
    pub fn encoding(&self) -> Option<TextEncoding> {
        let byte = self.get("encoding")?.as_int()?;
        TextEncoding::try_from(u8::try_from(byte).ok()?).ok()
    }

    /// Select a text encoding, or `None` to let the encoder choose.
    pub fn set_encoding(&mut self, encoding: Option<TextEncoding>) {
        if let Body::Fields { descriptor, values } = &mut self.body {
            if let Some(index) = descriptor.specs.iter().position(|s| s.kind == FieldKind::Encoding) {
                values[index] = encoding.map(|e| Value::Int(e as u64));
            }
        }
    }

    /// The strings of a text frame.
    pub fn text_values(&self) -> Option<Vec<&str>> {
        self.get("text")?.as_text_list()
    }

    // ----- Decoding -----

    /// Decode a frame payload whose flags have already been interpreted.
    ///
    /// Returns `Ok(None)` for text frames without any text, which are
    /// dropped. Errors are meant to be wrapped into an error frame by the
    /// caller.
    pub fn decode(
        frameid: &str,
        data: &[u8],
        flags: FrameFlags,
        position: Option<usize>,
    ) -> std::result::Result<Option<Frame>, FrameError> {
        let mut flags = flags;
        let descriptor = match registry::lookup(frameid) {
            Some(descriptor) => descriptor,
            None => {
                tracing::warn!(frameid, "Unknown frame");
                flags.unknown = true;
                registry::unknown_descriptor(frameid)
            }
        };

        let specs = descriptor.specs;
        let mut values: Vec<Option<Value>> = vec![None; specs.len()];
        let mut rest = data;
        for (index, spec) in specs.iter().enumerate() {
            if spec.optional && rest.is_empty() {
                break;
            }
            let read = spec.read(&FieldContext::new(specs, &values), rest);
            match read {
                Ok((value, tail)) => {
                    values[index] = Some(value);
                    rest = tail;
                }
                Err(FrameError::UnexpectedEndOfData) if spec.optional => break,
                Err(e) => return Err(e),
            }
        }
        if !rest.is_empty() {
            tracing::warn!(frameid, junk_bytes = rest.len(), "Ignoring junk at end of frame");
        }

        if descriptor.is_text() {
            if let Some(Some(Value::List(items))) = values.last_mut() {
                let before = items.len();
                while items.last().is_some_and(|v| v.as_str() == Some("")) {
                    items.pop();
                }
                if items.is_empty() {
                    tracing::warn!(frameid, "Ignoring empty text frame");
                    return Ok(None);
                }
                if items.len() != before {
                    tracing::warn!(frameid, "Dropped trailing empty strings from text frame");
                }
            }
        }

        Ok(Some(Frame {
            frameid: frameid.to_string(),
            flags,
            position,
            body: Body::Fields { descriptor, values },
        }))
    }

    // ----- Encoding -----

    /// Serialize the frame payload.
    ///
    /// Frames with text are encoded in their own encoding if one is set,
    /// otherwise in the first of `encodings` that can represent every
    /// string. Error frames return their raw bytes.
    ///
    /// # Errors
    ///
    /// [`Error::UnrepresentableText`] if no candidate encoding works.
    pub fn encode(&self, encodings: &[TextEncoding]) -> Result<Vec<u8>> {
        let (descriptor, values) = match &self.body {
            Body::Error(e) => return Ok(e.data.clone()),
            Body::Fields { descriptor, values } => (descriptor, values),
        };
        if !descriptor.has_encoding() {
            return Ok(encode_fields(&self.frameid, descriptor, values, None)?);
        }

        let mut candidates: Vec<TextEncoding> = self.encoding().into_iter().collect();
        for &encoding in encodings {
            if !candidates.contains(&encoding) {
                candidates.push(encoding);
            }
        }
        if candidates.is_empty() {
            candidates = vec![TextEncoding::Latin1, TextEncoding::Utf16];
        }

        for encoding in candidates {
            match encode_fields(&self.frameid, descriptor, values, Some(encoding)) {
                Ok(data) => return Ok(data),
                Err(FrameError::UnencodableText) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::UnrepresentableText {
            frameid: self.frameid.clone(),
        })
    }

    // ----- Merging and conversion -----

    /// Collapse frames sharing one id.
    ///
    /// Duplicate-tolerant types are returned unchanged. Text frames are
    /// combined into one frame holding all their strings. For other types
    /// only the first frame is kept.
    pub fn merge(frames: Vec<Frame>) -> Vec<Frame> {
        if frames.len() <= 1 {
            return frames;
        }
        let Some(descriptor) = frames.iter().find_map(Frame::descriptor) else {
            return frames;
        };
        if descriptor.allow_duplicates {
            return frames;
        }

        // Undecodable frames are kept as they are, after the merged one.
        let (errors, decoded): (Vec<Frame>, Vec<Frame>) = frames.into_iter().partition(Frame::is_error);
        let mut decoded = decoded.into_iter();
        let Some(mut first) = decoded.next() else {
            return errors;
        };

        if descriptor.is_text() {
            let mut encoding = first.encoding();
            let mut text: Vec<String> = first.owned_text();
            for frame in decoded {
                if frame.encoding() != encoding {
                    encoding = None;
                }
                text.extend(frame.owned_text());
            }
            if let Body::Fields { values, .. } = &mut first.body {
                if let Some(last) = values.last_mut() {
                    *last = Some(Value::text_list(text));
                }
            }
            first.set_encoding(encoding);
        } else {
            let dropped = decoded.count();
            if dropped > 0 {
                tracing::warn!(
                    frameid = first.frameid.as_str(),
                    dropped,
                    "Duplicate frame; only the first instance is kept"
                );
            }
        }
        let mut merged = vec![first];
        merged.extend(errors);
        merged
    }

    fn owned_text(&self) -> Vec<String> {
        self.text_values()
            .map(|items| items.into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Convert the frame to its equivalent in `version`.
    ///
    /// # Errors
    ///
    /// [`Error::IncompatibleFrame`] if `version` has no frame type that can
    /// hold this frame's data.
    pub fn to_version(&self, version: Version) -> Result<Frame> {
        let incompatible = || Error::IncompatibleFrame {
            frameid: self.frameid.clone(),
            version,
        };
        let (descriptor, values) = match &self.body {
            Body::Error(e) if e.version == version => return Ok(self.clone()),
            Body::Error(_) => return Err(incompatible()),
            Body::Fields { descriptor, values } => (*descriptor, values),
        };

        if self.flags.unknown {
            return if self.frameid.len() == version.frame_id_len() {
                Ok(self.clone())
            } else {
                Err(incompatible())
            };
        }
        if descriptor.versions.contains(version) {
            return Ok(self.clone());
        }

        match (self.frameid.as_str(), version) {
            ("APIC", Version::V2_2) => return self.apic_to_pic().ok_or_else(incompatible),
            ("PIC", Version::V2_3 | Version::V2_4) => return self.pic_to_apic().ok_or_else(incompatible),
            _ => {}
        }

        let target = equivalent_ids(&self.frameid)
            .into_iter()
            .filter_map(registry::lookup)
            .find(|d| d.versions.contains(version) && d.specs == descriptor.specs)
            .ok_or_else(incompatible)?;
        tracing::debug!(from = self.frameid.as_str(), to = target.id, "Converted frame");
        Ok(Frame {
            frameid: target.id.to_string(),
            flags: self.flags,
            position: self.position,
            body: Body::Fields {
                descriptor: target,
                values: values.clone(),
            },
        })
    }

    fn apic_to_pic(&self) -> Option<Frame> {
        let mime = self.get("mime")?.as_str()?.to_ascii_lowercase();
        let format = match mime.as_str() {
            "image/jpeg" | "image/jpg" => "JPG",
            "image/png" => "PNG",
            _ => return None,
        };
        self.convert_picture("PIC", "format", format)
    }

    fn pic_to_apic(&self) -> Option<Frame> {
        let format = self.get("format")?.as_str()?.to_ascii_uppercase();
        let mime = match format.as_str() {
            "PNG" => "image/png",
            "JPG" => "image/jpeg",
            _ => sniff_image_mime(self.get("data")?.as_bytes()?)?,
        };
        self.convert_picture("APIC", "mime", mime)
    }

    fn convert_picture(&self, target: &str, kind_field: &str, kind: &str) -> Option<Frame> {
        let mut frame = Frame::new(target).ok()?;
        frame.flags = self.flags;
        frame.position = self.position;
        frame.set(kind_field, Value::Text(kind.to_string())).ok()?;
        for name in ["type", "desc", "data"] {
            frame.set(name, self.get(name)?.clone()).ok()?;
        }
        frame.set_encoding(self.encoding());
        Some(frame)
    }
}

/// Ids that may hold the same data as `id` in another version.
fn equivalent_ids(id: &str) -> Vec<&str> {
    let rename = |id: &str| {
        V23_V24_RENAMES
            .iter()
            .find_map(|&(v23, v24)| match id {
                _ if id == v23 => Some(v24),
                _ if id == v24 => Some(v23),
                _ => None,
            })
    };
    let mut ids = vec![id];
    if let Some(parent) = registry::v22_parent(id) {
        ids.push(parent);
        ids.extend(rename(parent));
    }
    if let Some(renamed) = rename(id) {
        ids.push(renamed);
        ids.extend(registry::v22_child(renamed));
    }
    ids.extend(registry::v22_child(id));
    ids
}

/// MIME type of JPEG or PNG image data.
pub fn sniff_image_mime(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else {
        None
    }
}

fn encode_fields(
    frameid: &str,
    descriptor: &FrameDescriptor,
    values: &[Option<Value>],
    encoding: Option<TextEncoding>,
) -> std::result::Result<Vec<u8>, FrameError> {
    let specs = descriptor.specs;
    let mut ctx = FieldContext::new(specs, values);
    if let Some(encoding) = encoding {
        ctx = ctx.with_encoding(encoding);
    }

    let mut out = Vec::new();
    for (spec, value) in specs.iter().zip(values) {
        match (spec.kind, value) {
            (FieldKind::Encoding, _) => {
                let encoding = ctx.encoding()?;
                out.push(encoding as u8);
            }
            (_, Some(value)) => out.extend(spec.write(&ctx, value)?),
            (_, None) if spec.optional => break,
            (_, None) => {
                return Err(FrameError::InvalidValue(format!(
                    "{frameid}: field '{}' is not set",
                    spec.name
                )))
            }
        }
    }
    Ok(out)
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.frameid)?;
        match &self.body {
            Body::Error(e) => write!(f, "ERROR: {}, {} bytes", e.error, e.data.len())?,
            Body::Fields { descriptor, values } => {
                let mut first = true;
                for (spec, value) in descriptor.specs.iter().zip(values) {
                    let Some(value) = value else { continue };
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    match (spec.kind, value) {
                        (FieldKind::PictureType, Value::Int(t)) => {
                            let name = crate::field::PICTURE_TYPES.get(*t as usize).unwrap_or(&"unknown");
                            write!(f, "{}={name}({t})", spec.name)?
                        }
                        _ => write!(f, "{}={value}", spec.name)?,
                    }
                }
            }
        }
        let flags = self.flags.names();
        if !flags.is_empty() {
            write!(f, " +{}", flags.join(" +"))?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_id_syntax() {
        assert!(is_valid_frame_id("TIT2"));
        assert!(is_valid_frame_id("TT2"));
        assert!(is_valid_frame_id("TXX "));
        assert!(!is_valid_frame_id("tit2"));
        assert!(!is_valid_frame_id("1IT2"));
        assert!(!is_valid_frame_id("\0\0\0\0"));
        assert!(!is_valid_frame_id("TI"));
    }

    #[test]
    fn test_decode_text_frame() {
        let frame = Frame::decode("TIT2", b"\x00Song", FrameFlags::default(), Some(0))
            .unwrap()
            .unwrap();
        assert_eq!(frame.text_values().unwrap(), vec!["Song"]);
        assert_eq!(frame.encoding(), Some(TextEncoding::Latin1));
        assert_eq!(frame.position(), Some(0));
    }

    #[test]
    fn test_decode_strips_trailing_empty_strings() {
        let frame = Frame::decode("TPE1", b"\x00A\x00B\x00\x00", FrameFlags::default(), None)
            .unwrap()
            .unwrap();
        assert_eq!(frame.text_values().unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_decode_empty_text_frame_is_dropped() {
        let result = Frame::decode("TALB", b"\x00\x00", FrameFlags::default(), None).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_decode_invalid_encoding_is_frame_error() {
        let result = Frame::decode("TIT2", b"\x07abc", FrameFlags::default(), None);
        assert_eq!(result, Err(FrameError::InvalidEncoding(7)));
    }

    #[test]
    fn test_decode_unknown_frame_is_flagged() {
        let frame = Frame::decode("ZZZZ", b"\x01\x02", FrameFlags::default(), None)
            .unwrap()
            .unwrap();
        assert!(frame.flags.unknown);
        assert_eq!(frame.get("data"), Some(&Value::Binary(vec![1, 2])));
    }

    #[test]
    fn test_decode_optional_fields_absent() {
        let frame = Frame::decode("POPM", b"me@x\0\x80", FrameFlags::default(), None)
            .unwrap()
            .unwrap();
        assert_eq!(frame.get("rating"), Some(&Value::Int(0x80)));
        assert_eq!(frame.get("count"), None);
        assert_eq!(frame.encode(&[]).unwrap(), b"me@x\0\x80".to_vec());
    }

    #[test]
    fn test_encode_prefers_first_representable_encoding() {
        let latin = Frame::text("TIT2", ["Café"]).unwrap();
        let prefs = [TextEncoding::Latin1, TextEncoding::Utf16];
        assert_eq!(latin.encode(&prefs).unwrap(), b"\x00Caf\xe9\x00".to_vec());

        let wide = Frame::text("TIT2", ["日本"]).unwrap();
        let data = wide.encode(&prefs).unwrap();
        assert_eq!(data[0], TextEncoding::Utf16 as u8);
        assert_eq!(&data[1..3], &[0xFF, 0xFE]);
    }

    #[test]
    fn test_encode_unrepresentable_text() {
        let frame = Frame::text("TIT2", ["日本"]).unwrap();
        let result = frame.encode(&[TextEncoding::Latin1]);
        assert!(matches!(result, Err(Error::UnrepresentableText { frameid }) if frameid == "TIT2"));
    }

    #[test]
    fn test_explicit_encoding_wins() {
        let mut frame = Frame::text("TIT2", ["abc"]).unwrap();
        frame.set_encoding(Some(TextEncoding::Utf8));
        let data = frame.encode(&[TextEncoding::Latin1]).unwrap();
        assert_eq!(data, b"\x03abc\x00".to_vec());
    }

    #[test]
    fn test_merge_text_frames() {
        let a = Frame::text("TPE1", ["A"]).unwrap();
        let b = Frame::text("TPE1", ["B"]).unwrap();
        let merged = Frame::merge(vec![a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text_values().unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_merge_keeps_first_non_text_frame() {
        let a = Frame::new("PCNT").unwrap().with("count", Value::Int(1)).unwrap();
        let b = Frame::new("PCNT").unwrap().with("count", Value::Int(2)).unwrap();
        let merged = Frame::merge(vec![a.clone(), b]);
        assert_eq!(merged, vec![a]);
    }

    #[test]
    fn test_merge_keeps_error_frames() {
        let valid = Frame::text("TIT2", ["Title"]).unwrap();
        let broken = Frame::error(
            "TIT2",
            ErrorData {
                data: b"\x80\x01secret".to_vec(),
                error: FrameError::UnsupportedEncryption,
                raw_flags: 0x0040,
                version: Version::V2_3,
            },
            Some(1),
        );
        let merged = Frame::merge(vec![broken.clone(), valid.clone()]);
        assert_eq!(merged, vec![valid, broken.clone()]);
        assert_eq!(Frame::merge(vec![broken.clone(), broken.clone()]).len(), 2);
    }

    #[test]
    fn test_encoded_strings_reject_nul() {
        let mut txxx = Frame::new("TXXX").unwrap();
        let result = txxx.set("description", Value::Text("key\0evil".into()));
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(txxx.set("description", Value::Text("key".into())).is_ok());

        assert!(matches!(Frame::text("TPE1", ["A", "B\0C"]), Err(Error::Validation { .. })));
        assert!(Frame::text("TPE1", ["A", "B"]).is_ok());
    }

    #[test]
    fn test_merge_leaves_duplicate_tolerant_frames() {
        let a = Frame::new("COMM").unwrap().with("text", Value::Text("x".into())).unwrap();
        let b = Frame::new("COMM").unwrap().with("text", Value::Text("y".into())).unwrap();
        assert_eq!(Frame::merge(vec![a, b]).len(), 2);
    }

    #[test]
    fn test_to_version_v22_mapping() {
        let frame = Frame::text("TIT2", ["Song"]).unwrap();
        let v22 = frame.to_version(Version::V2_2).unwrap();
        assert_eq!(v22.frameid(), "TT2");
        assert_eq!(v22.to_version(Version::V2_4).unwrap(), frame);
    }

    #[test]
    fn test_to_version_renamed_frames() {
        let tory = Frame::text("TORY", ["1999"]).unwrap();
        let tdor = tory.to_version(Version::V2_4).unwrap();
        assert_eq!(tdor.frameid(), "TDOR");
        assert_eq!(tdor.to_version(Version::V2_2).unwrap().frameid(), "TOR");
    }

    #[test]
    fn test_to_version_incompatible() {
        let frame = Frame::text("TMOO", ["calm"]).unwrap();
        let result = frame.to_version(Version::V2_3);
        assert!(matches!(result, Err(Error::IncompatibleFrame { .. })));
    }

    #[test]
    fn test_apic_to_pic_and_back() {
        let apic = Frame::new("APIC")
            .unwrap()
            .with("mime", Value::Text("image/png".into()))
            .unwrap()
            .with("type", Value::Int(3))
            .unwrap()
            .with("data", Value::Binary(b"\x89PNG\r\n\x1a\nrest".to_vec()))
            .unwrap();
        let pic = apic.to_version(Version::V2_2).unwrap();
        assert_eq!(pic.frameid(), "PIC");
        assert_eq!(pic.get("format"), Some(&Value::Text("PNG".into())));
        assert_eq!(pic.to_version(Version::V2_3).unwrap(), apic);

        let gif = apic.clone().with("mime", Value::Text("image/gif".into())).unwrap();
        assert!(gif.to_version(Version::V2_2).is_err());
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut frame = Frame::new("APIC").unwrap();
        assert!(matches!(frame.set("type", Value::Int(42)), Err(Error::Validation { .. })));
        assert!(matches!(frame.set("nope", Value::Int(1)), Err(Error::Validation { .. })));
        assert!(Frame::new("tit2").is_err());
        assert!(matches!(Frame::new("ZZZZ"), Err(Error::UnknownFrame(_))));
    }

    #[test]
    fn test_set_sign_magnitude_updates_signs() {
        let mut frame = Frame::new("RVAD").unwrap();
        frame.set("bits", Value::Int(16)).unwrap();
        frame.set("vol_right", Value::Signed(5)).unwrap();
        frame.set("vol_left", Value::Signed(-7)).unwrap();
        assert_eq!(frame.get("signs"), Some(&Value::Int(0b01)));

        let data = frame.encode(&[]).unwrap();
        assert_eq!(data, vec![0b01, 16, 0, 5, 0, 7, 0, 0, 0, 0]);
        let decoded = Frame::decode("RVAD", &data, FrameFlags::default(), None)
            .unwrap()
            .unwrap();
        assert_eq!(decoded.get("vol_left"), Some(&Value::Signed(-7)));
    }

    #[test]
    fn test_display() {
        let frame = Frame::text("TIT2", ["Song"]).unwrap();
        assert_eq!(frame.to_string(), "TIT2(text=[\"Song\"])");
    }
}
