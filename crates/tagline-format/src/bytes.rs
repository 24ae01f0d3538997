//! Integer and unsynchronisation codecs shared by every tag version.
//!
//! - Plain big-endian integers of any width up to 8 bytes.
//! - Sync-safe integers: 7 significant bits per byte, high bit always clear.
//! - Unsynchronisation: a `0x00` is stuffed after `0xFF` bytes that could
//!   otherwise be mistaken for an MPEG frame sync.
//!
//! The unsynchronisation codecs are iterator adapters ([`UnsyncEncoder`],
//! [`UnsyncDecoder`]) and a [`Read`] adapter ([`UnsyncReader`]), so large
//! payloads can be processed incrementally. [`unsync_encode`] and
//! [`unsync_decode`] collect the result for in-memory callers.

use std::io::{self, Read};

use crate::error::FrameError;

/// Decode a big-endian unsigned integer of up to 8 bytes.
pub fn int8_decode(data: &[u8]) -> Result<u64, FrameError> {
    if data.len() > 8 {
        return Err(FrameError::InvalidValue(format!(
            "{}-byte integer is too wide",
            data.len()
        )));
    }
    Ok(data.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

/// Encode `value` as a big-endian integer exactly `width` bytes wide.
pub fn int8_encode(value: u64, width: usize) -> Result<Vec<u8>, FrameError> {
    if width < 8 && value >> (8 * width) != 0 {
        return Err(FrameError::ValueTooLarge { value, width });
    }
    let bytes = value.to_be_bytes();
    let mut out = vec![0u8; width.saturating_sub(8)];
    out.extend_from_slice(&bytes[8usize.saturating_sub(width)..]);
    Ok(out)
}

/// Decode a sync-safe integer.
///
/// # Errors
///
/// [`FrameError::InvalidSyncsafe`] if any byte has its high bit set. This is
/// the signature of encoders that write plain 8-bit lengths where sync-safe
/// ones are required.
pub fn syncsafe_decode(data: &[u8]) -> Result<u32, FrameError> {
    if data.len() > 5 {
        return Err(FrameError::InvalidSyncsafe);
    }
    let mut value: u64 = 0;
    for &b in data {
        if b & 0x80 != 0 {
            return Err(FrameError::InvalidSyncsafe);
        }
        value = (value << 7) | u64::from(b);
    }
    u32::try_from(value).map_err(|_| FrameError::InvalidSyncsafe)
}

/// Encode `value` as a sync-safe integer `width` bytes wide.
///
/// # Errors
///
/// [`FrameError::ValueTooLarge`] if `value` needs more than `width` 7-bit
/// digits.
pub fn syncsafe_encode(value: u32, width: usize) -> Result<Vec<u8>, FrameError> {
    let mut rest = u64::from(value);
    let mut out = vec![0u8; width];
    for byte in out.iter_mut().rev() {
        *byte = (rest & 0x7F) as u8;
        rest >>= 7;
    }
    if rest != 0 {
        return Err(FrameError::ValueTooLarge {
            value: u64::from(value),
            width,
        });
    }
    Ok(out)
}

// ----- Unsynchronisation -----

/// Iterator adapter applying the unsynchronisation scheme.
pub struct UnsyncEncoder<I: Iterator<Item = u8>> {
    inner: std::iter::Peekable<I>,
    /// A stuffing byte owed after the last `0xFF` yielded.
    stuff: bool,
}

impl<I: Iterator<Item = u8>> UnsyncEncoder<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner: inner.peekable(),
            stuff: false,
        }
    }
}

impl<I: Iterator<Item = u8>> Iterator for UnsyncEncoder<I> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.stuff {
            self.stuff = false;
            return Some(0x00);
        }
        let b = self.inner.next()?;
        if b == 0xFF {
            self.stuff = match self.inner.peek() {
                None => true,
                Some(&next) => next == 0x00 || next & 0xE0 != 0,
            };
        }
        Some(b)
    }
}

/// Decoder state shared by [`UnsyncDecoder`] and [`UnsyncReader`].
#[derive(Debug, Default)]
struct UnsyncState {
    after_ff: bool,
}

impl UnsyncState {
    /// Feed one stuffed byte; returns the byte to emit, if any.
    fn feed(&mut self, b: u8) -> Option<u8> {
        if std::mem::take(&mut self.after_ff) {
            if b == 0x00 {
                return None;
            }
            if b & 0xE0 != 0 {
                tracing::warn!(
                    byte = format!("0x{b:02X}"),
                    "Unsynchronised data contains a false sync pattern"
                );
            }
        }
        self.after_ff = b == 0xFF;
        Some(b)
    }
}

/// Iterator adapter undoing the unsynchronisation scheme.
pub struct UnsyncDecoder<I: Iterator<Item = u8>> {
    inner: I,
    state: UnsyncState,
}

impl<I: Iterator<Item = u8>> UnsyncDecoder<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            state: UnsyncState::default(),
        }
    }
}

impl<I: Iterator<Item = u8>> Iterator for UnsyncDecoder<I> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        loop {
            let b = self.inner.next()?;
            if let Some(out) = self.state.feed(b) {
                return Some(out);
            }
        }
    }
}

/// [`Read`] adapter undoing unsynchronisation on the fly.
pub struct UnsyncReader<R: Read> {
    inner: io::Bytes<R>,
    state: UnsyncState,
}

impl<R: Read> UnsyncReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: inner.bytes(),
            state: UnsyncState::default(),
        }
    }
}

impl<R: Read> Read for UnsyncReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            let Some(b) = self.inner.next().transpose()? else {
                break;
            };
            if let Some(out) = self.state.feed(b) {
                buf[n] = out;
                n += 1;
            }
        }
        Ok(n)
    }
}

/// Apply unsynchronisation to an in-memory buffer.
pub fn unsync_encode(data: &[u8]) -> Vec<u8> {
    UnsyncEncoder::new(data.iter().copied()).collect()
}

/// Undo unsynchronisation of an in-memory buffer.
pub fn unsync_decode(data: &[u8]) -> Vec<u8> {
    UnsyncDecoder::new(data.iter().copied()).collect()
}
