//! Canonical frame ordering used when a tag is encoded.

use std::sync::LazyLock;

use regex::Regex;

use crate::frame::{is_valid_frame_id, Frame};
use crate::registry;

/// Sort key: `(bucket, (0, position))` for frames read from a file,
/// `(bucket, (1, 0))` for new ones.
pub type OrderKey = (usize, (u8, usize));

#[derive(Debug, Clone)]
enum Pattern {
    Id(String),
    Regex(Regex),
}

/// Ranked list of frame patterns.
///
/// A pattern is either a frame id, matched exactly (ID3v2.2 frames also
/// match the id of their four-letter parent), or a regular expression
/// matched at the start of the id. Exact ids take precedence over regular
/// expressions regardless of rank. Frames matching nothing sort last.
#[derive(Debug, Clone)]
pub struct FrameOrder {
    patterns: Vec<Pattern>,
}

static DEFAULT_ORDER: LazyLock<FrameOrder> = LazyLock::new(|| {
    FrameOrder::new([
        "TIT2", "TPE1", "TALB", "TRCK", "TPOS", "TCOM", "TDRC", "TYER", "TRDA", "TDAT", "TIME", "T.*",
        "COMM", "W.*", "TXXX", "WXXX", "UFID", "PCNT", "POPM", "APIC", "PIC", "GEOB", "PRIV", ".*",
    ])
    .unwrap_or_else(|e| panic!("default frame order: {e}"))
});

impl FrameOrder {
    /// Build an order from patterns, highest priority first. Strings that
    /// are valid frame ids are exact patterns; anything else is compiled
    /// as a regular expression.
    pub fn new<'a, I>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                if is_valid_frame_id(p) {
                    Ok(Pattern::Id(p.to_string()))
                } else {
                    Regex::new(&format!("^(?:{p})")).map(Pattern::Regex)
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// Rank of the first pattern matching `frameid`.
    fn bucket(&self, frameid: &str) -> usize {
        let exact = |id: &str| {
            self.patterns
                .iter()
                .position(|p| matches!(p, Pattern::Id(x) if x == id))
        };
        exact(frameid)
            .or_else(|| registry::v22_parent(frameid).and_then(exact))
            .or_else(|| {
                self.patterns
                    .iter()
                    .position(|p| matches!(p, Pattern::Regex(re) if re.is_match(frameid)))
            })
            .unwrap_or(self.patterns.len())
    }

    pub fn key(&self, frame: &Frame) -> OrderKey {
        let bucket = self.bucket(frame.frameid());
        match frame.position() {
            Some(position) => (bucket, (0, position)),
            None => (bucket, (1, 0)),
        }
    }

    /// Stable sort by [`FrameOrder::key`].
    pub fn sort(&self, frames: &mut [Frame]) {
        frames.sort_by_key(|f| self.key(f));
    }
}

impl Default for FrameOrder {
    fn default() -> Self {
        DEFAULT_ORDER.clone()
    }
}

/// The order applied by [`crate::Tag::encode`].
pub(crate) fn default_order() -> &'static FrameOrder {
    &DEFAULT_ORDER
}
