//! Typed field descriptors driving generic frame encoding and decoding.
//!
//! A frame type is an ordered tuple of [`FieldSpec`]s. Each spec reads its
//! value from the front of the remaining frame data, writes it back, and
//! validates assigned values. Several specs depend on fields decoded before
//! them (text encoding, integer widths, sign bits, element counts); they
//! look those up through a [`FieldContext`].

use std::fmt;

use serde::Serialize;

use crate::bytes::{int8_decode, int8_encode};
use crate::encoding::{latin1_decode, latin1_encode, TextEncoding};
use crate::error::{Error, FrameError};

/// Names of the 21 picture types, indexed by type byte.
pub const PICTURE_TYPES: [&str; 21] = [
    "Other",
    "32x32 icon",
    "Other icon",
    "Front Cover",
    "Back Cover",
    "Leaflet",
    "Media",
    "Lead artist",
    "Artist",
    "Conductor",
    "Band/Orchestra",
    "Composer",
    "Lyricist/text writer",
    "Recording Location",
    "Recording",
    "Performance",
    "Screen capture",
    "A bright coloured fish",
    "Illustration",
    "Band/artist",
    "Publisher/Studio",
];

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(u64),
    Signed(i64),
    Text(String),
    Binary(Vec<u8>),
    List(Vec<Value>),
    Records(Vec<Vec<Value>>),
}

impl Value {
    /// Build a list of text values.
    pub fn text_list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(values.into_iter().map(|s| Value::Text(s.into())).collect())
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// The strings of a text list, or `None` if this is not one.
    pub fn as_text_list(&self) -> Option<Vec<&str>> {
        match self {
            Value::List(items) => items.iter().map(Value::as_str).collect(),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Signed(_) => "signed integer",
            Value::Text(_) => "string",
            Value::Binary(_) => "binary data",
            Value::List(_) => "list",
            Value::Records(_) => "record list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Signed(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Binary(b) => write!(f, "{} bytes of binary data", b.len()),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Records(records) => write!(f, "{} records", records.len()),
        }
    }
}

/// Bit width of an integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// A fixed number of bits.
    Bits(u32),
    /// The number of bits is stored in another field of the frame.
    Field(&'static str),
}

/// Wire shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Byte,
    /// Text encoding byte; must precede any encoded string.
    Encoding,
    /// Byte indexing [`PICTURE_TYPES`].
    PictureType,
    /// Big-endian unsigned integer, width rounded up to whole bytes.
    Integer(Width),
    /// Two's complement signed integer.
    Signed(Width),
    /// Magnitude with its sign in bit `sign_bit` of the frame's `signs`
    /// field. A cleared bit means negative.
    SignMagnitude { width: Width, sign_bit: u8 },
    /// One byte giving the width in bits, then the value.
    VarInt,
    /// Everything that remains.
    Binary,
    /// Fixed-length latin-1 string.
    FixedString(usize),
    /// Three-letter ISO-639-2 language code.
    Language,
    /// NUL-terminated latin-1 string.
    NullTerminated,
    /// NUL-terminated latin-1 URL. One stray leading NUL is skipped.
    Url,
    /// String in the frame's encoding, terminated by one or two NULs.
    Encoded,
    /// Values of one kind repeated until the data runs out.
    Sequence(&'static FieldKind),
    /// Fixed-shape records repeated until the data runs out.
    Multi(&'static [FieldSpec]),
    /// `N` index points of `b` bits each (ASPI).
    AspiIndex,
}

/// A named field of a frame type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Optional trailing fields may be missing from the frame data.
    pub optional: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            optional: false,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            optional: true,
        }
    }

    /// Read this field from the front of `data`.
    pub fn read<'d>(&self, ctx: &FieldContext<'_>, data: &'d [u8]) -> Result<(Value, &'d [u8]), FrameError> {
        read_kind(&self.kind, ctx, data)
    }

    /// Serialize `value`.
    pub fn write(&self, ctx: &FieldContext<'_>, value: &Value) -> Result<Vec<u8>, FrameError> {
        write_kind(&self.kind, ctx, value)
    }

    /// Check that `value` is acceptable for this field.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] naming this field on a type or range mismatch.
    pub fn validate(&self, ctx: &FieldContext<'_>, value: &Value) -> Result<(), Error> {
        validate_kind(&self.kind, ctx, value).map_err(|reason| Error::validation(self.name, reason))
    }

    /// Value given to this field in a newly constructed frame. `None`
    /// leaves the field unset (the encoding byte, optional fields).
    pub fn default_value(&self) -> Option<Value> {
        if self.optional {
            return None;
        }
        Some(match self.kind {
            FieldKind::Encoding => return None,
            FieldKind::Byte
            | FieldKind::PictureType
            | FieldKind::Integer(_)
            | FieldKind::VarInt => Value::Int(0),
            FieldKind::Signed(_) | FieldKind::SignMagnitude { .. } => Value::Signed(0),
            FieldKind::Binary => Value::Binary(Vec::new()),
            FieldKind::FixedString(n) => Value::Text(" ".repeat(n)),
            FieldKind::Language => Value::Text("eng".to_string()),
            FieldKind::NullTerminated | FieldKind::Url | FieldKind::Encoded => Value::Text(String::new()),
            FieldKind::Sequence(_) | FieldKind::AspiIndex => Value::List(Vec::new()),
            FieldKind::Multi(_) => Value::Records(Vec::new()),
        })
    }
}

/// Sibling field values visible to a spec while it reads or writes.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    specs: &'static [FieldSpec],
    values: &'a [Option<Value>],
    encoding: Option<TextEncoding>,
}

impl<'a> FieldContext<'a> {
    pub fn new(specs: &'static [FieldSpec], values: &'a [Option<Value>]) -> Self {
        Self {
            specs,
            values,
            encoding: None,
        }
    }

    /// Use `encoding` for encoded strings instead of the frame's own
    /// encoding field.
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn value(&self, name: &str) -> Option<&'a Value> {
        let index = self.specs.iter().position(|s| s.name == name)?;
        self.values.get(index)?.as_ref()
    }

    pub fn int(&self, name: &str) -> Option<u64> {
        self.value(name)?.as_int()
    }

    /// The text encoding in effect for encoded strings.
    pub fn encoding(&self) -> Result<TextEncoding, FrameError> {
        if let Some(encoding) = self.encoding {
            return Ok(encoding);
        }
        let byte = self
            .int("encoding")
            .ok_or_else(|| FrameError::InvalidValue("text encoding not set".to_string()))?;
        TextEncoding::try_from(u8::try_from(byte).map_err(|_| FrameError::InvalidEncoding(0xFF))?)
    }

    fn width_bytes(&self, width: Width) -> Result<usize, FrameError> {
        let bits = match width {
            Width::Bits(bits) => u64::from(bits),
            Width::Field(name) => self
                .int(name)
                .ok_or_else(|| FrameError::InvalidValue(format!("width field '{name}' not set")))?,
        };
        Ok(bits.div_ceil(8) as usize)
    }

    fn aspi_width(&self) -> usize {
        // b is the bit count per index point: 8 or 16.
        if self.int("b") == Some(8) {
            1
        } else {
            2
        }
    }
}

// ----- Reading -----

fn take(data: &[u8], n: usize) -> Result<(&[u8], &[u8]), FrameError> {
    if data.len() < n {
        return Err(FrameError::UnexpectedEndOfData);
    }
    Ok(data.split_at(n))
}

/// Split at the first NUL; without one the whole input is the string.
fn split_nul(data: &[u8]) -> (&[u8], &[u8]) {
    match data.iter().position(|&b| b == 0) {
        Some(i) => (&data[..i], &data[i + 1..]),
        None => (data, &[]),
    }
}

fn read_kind<'d>(kind: &FieldKind, ctx: &FieldContext<'_>, data: &'d [u8]) -> Result<(Value, &'d [u8]), FrameError> {
    match *kind {
        FieldKind::Byte | FieldKind::PictureType => {
            let (b, rest) = take(data, 1)?;
            Ok((Value::Int(u64::from(b[0])), rest))
        }
        FieldKind::Encoding => {
            let (b, rest) = take(data, 1)?;
            if b[0] & 0xFC != 0 {
                return Err(FrameError::InvalidEncoding(b[0]));
            }
            Ok((Value::Int(u64::from(b[0])), rest))
        }
        FieldKind::Integer(width) => {
            let (raw, rest) = take(data, ctx.width_bytes(width)?)?;
            Ok((Value::Int(int8_decode(raw)?), rest))
        }
        FieldKind::Signed(width) => {
            let n = ctx.width_bytes(width)?;
            let (raw, rest) = take(data, n)?;
            let value = int8_decode(raw)?;
            let signed = if n > 0 && n < 8 && value >> (8 * n - 1) != 0 {
                value as i64 - (1i64 << (8 * n))
            } else {
                value as i64
            };
            Ok((Value::Signed(signed), rest))
        }
        FieldKind::SignMagnitude { width, sign_bit } => {
            let (raw, rest) = take(data, ctx.width_bytes(width)?)?;
            let magnitude = i64::try_from(int8_decode(raw)?)
                .map_err(|_| FrameError::InvalidValue("volume adjustment too large".to_string()))?;
            let signs = ctx.int("signs").unwrap_or(0);
            let value = if signs & (1 << sign_bit) == 0 { -magnitude } else { magnitude };
            Ok((Value::Signed(value), rest))
        }
        FieldKind::VarInt => {
            let (bits, rest) = take(data, 1)?;
            let (raw, rest) = take(rest, usize::from(bits[0]).div_ceil(8))?;
            Ok((Value::Int(int8_decode(raw)?), rest))
        }
        FieldKind::Binary => Ok((Value::Binary(data.to_vec()), &[])),
        FieldKind::FixedString(n) => {
            let (raw, rest) = take(data, n)?;
            Ok((Value::Text(latin1_decode(raw)), rest))
        }
        FieldKind::Language => read_kind(&FieldKind::FixedString(3), ctx, data),
        FieldKind::NullTerminated => {
            let (raw, rest) = split_nul(data);
            Ok((Value::Text(latin1_decode(raw)), rest))
        }
        FieldKind::Url => {
            let (mut raw, mut rest) = split_nul(data);
            if raw.is_empty() && !rest.is_empty() {
                // iTunes writes WFED with a leading encoding byte.
                (raw, rest) = split_nul(rest);
            }
            Ok((Value::Text(latin1_decode(raw)), rest))
        }
        FieldKind::Encoded => {
            let encoding = ctx.encoding()?;
            let (raw, rest) = if encoding.is_wide() {
                match data.chunks_exact(2).position(|c| c == [0, 0]) {
                    Some(i) => (&data[..2 * i], &data[2 * i + 2..]),
                    None if data.len() % 2 == 0 => (data, &[][..]),
                    None => return Err(FrameError::UnexpectedEndOfData),
                }
            } else {
                split_nul(data)
            };
            Ok((Value::Text(encoding.decode(raw)?), rest))
        }
        FieldKind::Sequence(element) => {
            let mut items = Vec::new();
            let mut rest = data;
            while !rest.is_empty() {
                let (item, tail) = read_kind(element, ctx, rest)?;
                items.push(item);
                rest = tail;
            }
            Ok((Value::List(items), rest))
        }
        FieldKind::Multi(specs) => read_multi(specs, ctx, data),
        FieldKind::AspiIndex => {
            let count = ctx.int("N").unwrap_or(0) as usize;
            let width = ctx.aspi_width();
            let (raw, rest) = take(data, count * width)?;
            let points = raw
                .chunks_exact(width)
                .map(|c| int8_decode(c).map(Value::Int))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((Value::List(points), rest))
        }
    }
}

fn read_multi<'d>(
    specs: &'static [FieldSpec],
    ctx: &FieldContext<'_>,
    data: &'d [u8],
) -> Result<(Value, &'d [u8]), FrameError> {
    let mut records = Vec::new();
    let mut rest = data;
    while !rest.is_empty() {
        let start = rest;
        let mut record = Vec::with_capacity(specs.len());
        let mut failed = false;
        for spec in specs {
            match spec.read(ctx, rest) {
                Ok((value, tail)) => {
                    record.push(value);
                    rest = tail;
                }
                Err(_) => {
                    failed = true;
                    break;
                }
            }
        }
        if failed {
            if records.is_empty() {
                return Err(FrameError::TruncatedRecord);
            }
            tracing::warn!(
                junk_bytes = start.len(),
                records = records.len(),
                "Ignoring incomplete trailing record"
            );
            return Ok((Value::Records(records), &[]));
        }
        records.push(record);
    }
    Ok((Value::Records(records), rest))
}

// ----- Writing -----

fn type_mismatch(expected: &str, value: &Value) -> FrameError {
    FrameError::InvalidValue(format!("expected {expected}, found {}", value.type_name()))
}

fn write_kind(kind: &FieldKind, ctx: &FieldContext<'_>, value: &Value) -> Result<Vec<u8>, FrameError> {
    match (*kind, value) {
        (FieldKind::Byte | FieldKind::PictureType | FieldKind::Encoding, Value::Int(v)) => int8_encode(*v, 1),
        (FieldKind::Integer(width), Value::Int(v)) => int8_encode(*v, ctx.width_bytes(width)?),
        (FieldKind::Signed(width), Value::Signed(v)) => {
            let n = ctx.width_bytes(width)?;
            if !signed_fits(*v, n) {
                return Err(FrameError::ValueTooLarge {
                    value: v.unsigned_abs(),
                    width: n,
                });
            }
            let mask = if n >= 8 { u64::MAX } else { (1u64 << (8 * n)) - 1 };
            int8_encode(*v as u64 & mask, n)
        }
        (FieldKind::SignMagnitude { width, .. }, Value::Signed(v)) => {
            int8_encode(v.unsigned_abs(), ctx.width_bytes(width)?)
        }
        (FieldKind::VarInt, Value::Int(v)) => {
            // Whole 32-bit words, as most writers do.
            let mut width = 4;
            while width < 8 && v >> (8 * width) != 0 {
                width += 4;
            }
            let mut out = vec![(width * 8) as u8];
            out.extend(int8_encode(*v, width)?);
            Ok(out)
        }
        (FieldKind::Binary, Value::Binary(b)) => Ok(b.clone()),
        (FieldKind::FixedString(n), Value::Text(s)) => {
            let raw = latin1_encode(s)?;
            if raw.len() != n {
                return Err(FrameError::InvalidValue(format!("expected {n} characters")));
            }
            Ok(raw)
        }
        (FieldKind::Language, Value::Text(_)) => write_kind(&FieldKind::FixedString(3), ctx, value),
        (FieldKind::NullTerminated | FieldKind::Url, Value::Text(s)) => {
            let mut raw = latin1_encode(s)?;
            raw.push(0);
            Ok(raw)
        }
        (FieldKind::Encoded, Value::Text(s)) => {
            let encoding = ctx.encoding()?;
            let mut raw = encoding.encode(s)?;
            raw.extend_from_slice(encoding.terminator());
            Ok(raw)
        }
        (FieldKind::Sequence(element), Value::List(items)) => {
            let mut out = Vec::new();
            for item in items {
                out.extend(write_kind(element, ctx, item)?);
            }
            Ok(out)
        }
        (FieldKind::Multi(specs), Value::Records(records)) => {
            let mut out = Vec::new();
            for record in records {
                if record.len() != specs.len() {
                    return Err(FrameError::InvalidValue("record length mismatch".to_string()));
                }
                for (spec, item) in specs.iter().zip(record) {
                    out.extend(spec.write(ctx, item)?);
                }
            }
            Ok(out)
        }
        (FieldKind::AspiIndex, Value::List(points)) => {
            let width = ctx.aspi_width();
            let mut out = Vec::with_capacity(points.len() * width);
            for point in points {
                let v = point.as_int().ok_or_else(|| type_mismatch("integer", point))?;
                out.extend(int8_encode(v, width)?);
            }
            Ok(out)
        }
        (kind, value) => Err(type_mismatch(expected_type(&kind), value)),
    }
}

fn signed_fits(value: i64, bytes: usize) -> bool {
    if bytes >= 8 {
        return true;
    }
    if bytes == 0 {
        return value == 0;
    }
    let bound = 1i64 << (8 * bytes - 1);
    (-bound..bound).contains(&value)
}

fn expected_type(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Byte
        | FieldKind::Encoding
        | FieldKind::PictureType
        | FieldKind::Integer(_)
        | FieldKind::VarInt => "integer",
        FieldKind::Signed(_) | FieldKind::SignMagnitude { .. } => "signed integer",
        FieldKind::Binary => "binary data",
        FieldKind::FixedString(_)
        | FieldKind::Language
        | FieldKind::NullTerminated
        | FieldKind::Url
        | FieldKind::Encoded => "string",
        FieldKind::Sequence(_) | FieldKind::AspiIndex => "list",
        FieldKind::Multi(_) => "record list",
    }
}

// ----- Validation -----

fn validate_kind(kind: &FieldKind, ctx: &FieldContext<'_>, value: &Value) -> Result<(), String> {
    match (*kind, value) {
        (FieldKind::Encoding, Value::Int(v)) if *v > 3 => Err(format!("invalid text encoding {v}")),
        (FieldKind::PictureType, Value::Int(v)) if *v as usize >= PICTURE_TYPES.len() => {
            Err(format!("unknown picture type {v}"))
        }
        (FieldKind::Byte | FieldKind::Encoding | FieldKind::PictureType, Value::Int(v)) if *v > 0xFF => {
            Err(format!("{v} does not fit in a byte"))
        }
        (FieldKind::Integer(_) | FieldKind::Signed(_) | FieldKind::SignMagnitude { .. }, _) => {
            write_kind(kind, ctx, value).map(drop).map_err(|e| e.to_string())
        }
        (FieldKind::Encoded, Value::Text(s)) if s.contains('\0') => Err("string contains NUL".to_string()),
        (FieldKind::Encoded, Value::Text(_)) => Ok(()),
        (FieldKind::Sequence(element), Value::List(items)) => {
            items.iter().try_for_each(|item| validate_kind(element, ctx, item))
        }
        (FieldKind::Multi(specs), Value::Records(records)) => {
            for record in records {
                if record.len() != specs.len() {
                    return Err(format!("records must have {} fields", specs.len()));
                }
                for (spec, item) in specs.iter().zip(record) {
                    validate_kind(&spec.kind, ctx, item)?;
                }
            }
            Ok(())
        }
        (FieldKind::AspiIndex, Value::List(points)) => {
            let expected = ctx.int("N").unwrap_or(0) as usize;
            if points.len() != expected {
                return Err(format!("expected {expected} index points"));
            }
            write_kind(kind, ctx, value).map(drop).map_err(|e| e.to_string())
        }
        (FieldKind::NullTerminated | FieldKind::Url, Value::Text(s)) if s.contains('\0') => {
            Err("string contains NUL".to_string())
        }
        _ => write_kind(kind, ctx, value).map(drop).map_err(|e| e.to_string()),
    }
}
