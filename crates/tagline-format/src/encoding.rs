//! The four text encodings an ID3v2 encoding byte can select.

use serde::Serialize;

use crate::error::FrameError;

/// Text encoding selected by a frame's encoding byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum TextEncoding {
    /// ISO-8859-1.
    Latin1 = 0,
    /// UTF-16 with a byte order mark.
    Utf16 = 1,
    /// UTF-16 big-endian without BOM (v2.4 only).
    Utf16Be = 2,
    /// UTF-8 (v2.4 only).
    Utf8 = 3,
}

impl TryFrom<u8> for TextEncoding {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self, FrameError> {
        match value {
            0 => Ok(Self::Latin1),
            1 => Ok(Self::Utf16),
            2 => Ok(Self::Utf16Be),
            3 => Ok(Self::Utf8),
            other => Err(FrameError::InvalidEncoding(other)),
        }
    }
}

impl TextEncoding {
    pub fn name(self) -> &'static str {
        match self {
            Self::Latin1 => "latin-1",
            Self::Utf16 => "utf-16",
            Self::Utf16Be => "utf-16be",
            Self::Utf8 => "utf-8",
        }
    }

    /// Whether strings are terminated by a two-byte NUL.
    pub fn is_wide(self) -> bool {
        matches!(self, Self::Utf16 | Self::Utf16Be)
    }

    /// The string terminator in this encoding.
    pub fn terminator(self) -> &'static [u8] {
        if self.is_wide() {
            &[0, 0]
        } else {
            &[0]
        }
    }

    /// Encode `text`, or fail with [`FrameError::UnencodableText`] if a
    /// character has no representation.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, FrameError> {
        match self {
            Self::Latin1 => latin1_encode(text),
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Utf16 => {
                let mut out = vec![0xFF, 0xFE];
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
                Ok(out)
            }
            Self::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
        }
    }

    /// Decode a complete (unterminated) string.
    pub fn decode(self, data: &[u8]) -> Result<String, FrameError> {
        match self {
            Self::Latin1 => Ok(latin1_decode(data)),
            Self::Utf8 => String::from_utf8(data.to_vec()).map_err(|_| FrameError::InvalidText),
            Self::Utf16 => match data {
                [0xFF, 0xFE, rest @ ..] => utf16_decode(rest, u16::from_le_bytes),
                [0xFE, 0xFF, rest @ ..] => utf16_decode(rest, u16::from_be_bytes),
                _ => utf16_decode(data, u16::from_le_bytes),
            },
            Self::Utf16Be => utf16_decode(data, u16::from_be_bytes),
        }
    }
}

pub(crate) fn latin1_encode(text: &str) -> Result<Vec<u8>, FrameError> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).map_err(|_| FrameError::UnencodableText))
        .collect()
}

pub(crate) fn latin1_decode(data: &[u8]) -> String {
    data.iter().map(|&b| char::from(b)).collect()
}

fn utf16_decode(data: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, FrameError> {
    if data.len() % 2 != 0 {
        return Err(FrameError::InvalidText);
    }
    let units: Vec<u16> = data.chunks_exact(2).map(|c| unit([c[0], c[1]])).collect();
    String::from_utf16(&units).map_err(|_| FrameError::InvalidText)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_byte() {
        assert_eq!(TextEncoding::try_from(3).unwrap(), TextEncoding::Utf8);
        assert_eq!(TextEncoding::try_from(4), Err(FrameError::InvalidEncoding(4)));
    }

    #[test]
    fn test_latin1_rejects_wide_chars() {
        assert_eq!(TextEncoding::Latin1.encode("café").unwrap(), b"caf\xe9");
        assert_eq!(
            TextEncoding::Latin1.encode("日本"),
            Err(FrameError::UnencodableText)
        );
    }

    #[test]
    fn test_utf16_bom_handling() {
        let encoded = TextEncoding::Utf16.encode("Hé").unwrap();
        assert_eq!(encoded, vec![0xFF, 0xFE, b'H', 0, 0xE9, 0]);
        assert_eq!(TextEncoding::Utf16.decode(&encoded).unwrap(), "Hé");

        let big_endian = [0xFE, 0xFF, 0, b'A'];
        assert_eq!(TextEncoding::Utf16.decode(&big_endian).unwrap(), "A");
    }

    #[test]
    fn test_utf16be_round_trip() {
        let encoded = TextEncoding::Utf16Be.encode("日本").unwrap();
        assert_eq!(encoded, vec![0x65, 0xE5, 0x67, 0x2C]);
        assert_eq!(TextEncoding::Utf16Be.decode(&encoded).unwrap(), "日本");
    }

    #[test]
    fn test_odd_utf16_is_invalid() {
        assert_eq!(TextEncoding::Utf16Be.decode(&[0, 65, 0]), Err(FrameError::InvalidText));
    }
}
