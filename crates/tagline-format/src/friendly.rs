//! Friendly names: version-independent accessors for common frames.
//!
//! Every name maps to the frame that holds it in the tag's version, e.g.
//! `title` is `TT2` in ID3v2.2 and `TIT2` afterwards. Values are plain
//! strings; an empty string removes the value.

use std::path::Path;

use crate::dates::{Timestamp, SPLIT_IDS};
use crate::error::{Error, Result};
use crate::field::{Value, PICTURE_TYPES};
use crate::frame::{sniff_image_mime, Frame};
use crate::tag::{Tag, Version};

/// Separator between the values of a multi-valued text frame.
pub const VALUE_SEPARATOR: &str = " / ";

/// Every friendly name, in display order.
pub const FRIENDLY_NAMES: [&str; 19] = [
    "title",
    "artist",
    "date",
    "album-artist",
    "album",
    "track",
    "track-total",
    "disc",
    "disc-total",
    "grouping",
    "composer",
    "genre",
    "comment",
    "picture",
    "sort-title",
    "sort-artist",
    "sort-album-artist",
    "sort-album",
    "sort-composer",
];

/// Picture type written by [`Tag::set_picture`].
const FRONT_COVER: u64 = 3;

#[derive(Debug, Clone, Copy)]
enum Slot {
    Text(&'static str),
    Number(&'static str),
    Total(&'static str),
    Date,
    Comment(&'static str),
    Picture(&'static str),
}

fn slot(name: &str, version: Version) -> Option<Slot> {
    let id = |v22: &'static str, v34: &'static str| if version == Version::V2_2 { v22 } else { v34 };
    Some(match name {
        "title" => Slot::Text(id("TT2", "TIT2")),
        "artist" => Slot::Text(id("TP1", "TPE1")),
        "album-artist" => Slot::Text(id("TP2", "TPE2")),
        "album" => Slot::Text(id("TAL", "TALB")),
        "track" => Slot::Number(id("TRK", "TRCK")),
        "track-total" => Slot::Total(id("TRK", "TRCK")),
        "disc" => Slot::Number(id("TPA", "TPOS")),
        "disc-total" => Slot::Total(id("TPA", "TPOS")),
        "grouping" => Slot::Text(id("TT1", "TIT1")),
        "composer" => Slot::Text(id("TCM", "TCOM")),
        "genre" => Slot::Text(id("TCO", "TCON")),
        "comment" => Slot::Comment(id("COM", "COMM")),
        "picture" => Slot::Picture(id("PIC", "APIC")),
        "sort-title" => Slot::Text(id("TST", "TSOT")),
        "sort-artist" => Slot::Text(id("TSP", "TSOP")),
        "sort-album-artist" => Slot::Text(id("TS2", "TSO2")),
        "sort-album" => Slot::Text(id("TSA", "TSOA")),
        "sort-composer" => Slot::Text(id("TSC", "TSOC")),
        "date" => Slot::Date,
        _ => return None,
    })
}

pub fn is_friendly_name(name: &str) -> bool {
    FRIENDLY_NAMES.contains(&name)
}

impl Tag {
    /// The value behind a friendly name, or an empty string.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownFriendlyName`] for names not in [`FRIENDLY_NAMES`].
    pub fn friendly(&self, name: &str) -> Result<String> {
        let slot = slot(name, self.version()).ok_or_else(|| Error::UnknownFriendlyName(name.to_string()))?;
        Ok(match slot {
            Slot::Text(id) => self.text_of(id).join(VALUE_SEPARATOR),
            Slot::Number(id) => nonzero(self.number_pair(id).0),
            Slot::Total(id) => nonzero(self.number_pair(id).1),
            Slot::Date => self.date().map(|ts| ts.to_display()).unwrap_or_default(),
            Slot::Comment(id) => plain_comment_index(self.get_all(id))
                .and_then(|i| self.get_all(id)[i].get("text")?.as_str().map(str::to_string))
                .unwrap_or_default(),
            Slot::Picture(id) => self.get_all(id).iter().map(describe_picture).collect::<Vec<_>>().join(", "),
        })
    }

    /// Assign the value behind a friendly name. An empty value removes it.
    ///
    /// Text values are split on `" / "`. Track and disc numbers take
    /// integers and keep the current total (and vice versa). Dates take
    /// `YYYY[-MM-DD[ HH:MM[:SS]]]`. A picture value is the path of a JPEG
    /// or PNG file.
    pub fn set_friendly(&mut self, name: &str, value: &str) -> Result<()> {
        let slot = slot(name, self.version()).ok_or_else(|| Error::UnknownFriendlyName(name.to_string()))?;
        match slot {
            Slot::Text(id) if value.is_empty() => {
                self.remove(id);
            }
            Slot::Text(id) => self.set_text(id, value.split(VALUE_SEPARATOR))?,
            Slot::Number(id) => {
                let (_, total) = self.number_pair(id);
                self.set_number_pair(id, parse_number(name, value)?, total)?;
            }
            Slot::Total(id) => {
                let (number, _) = self.number_pair(id);
                self.set_number_pair(id, number, parse_number(name, value)?)?;
            }
            Slot::Date => self.set_date(value)?,
            Slot::Comment(id) => self.set_comment(id, value)?,
            Slot::Picture(id) if value.is_empty() => {
                self.remove(id);
            }
            Slot::Picture(_) => self.set_picture(value)?,
        }
        Ok(())
    }

    /// Remove the value behind a friendly name.
    pub fn remove_friendly(&mut self, name: &str) -> Result<()> {
        self.set_friendly(name, "")
    }

    /// Replace all pictures by a front cover loaded from `path`.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if the file is neither JPEG nor PNG.
    pub fn set_picture(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let mime = sniff_image_mime(&data)
            .ok_or_else(|| Error::validation("picture", format!("{} is not a JPEG or PNG image", path.display())))?;
        let frame = match self.version() {
            Version::V2_2 => {
                let format = if mime == "image/png" { "PNG" } else { "JPG" };
                Frame::new("PIC")?.with("format", Value::Text(format.to_string()))?
            }
            Version::V2_3 | Version::V2_4 => Frame::new("APIC")?.with("mime", Value::Text(mime.to_string()))?,
        };
        let frame = frame
            .with("type", Value::Int(FRONT_COVER))?
            .with("desc", Value::Text(String::new()))?
            .with("data", Value::Binary(data))?;
        tracing::debug!(path = %path.display(), mime, "Loaded picture");
        self.set(frame);
        Ok(())
    }

    fn text_of(&self, id: &str) -> Vec<String> {
        self.get_merged(id)
            .and_then(|f| f.text_values().map(|v| v.into_iter().map(str::to_string).collect()))
            .unwrap_or_default()
    }

    fn number_pair(&self, id: &str) -> (u32, u32) {
        let Some(first) = self.text_of(id).into_iter().next() else {
            return (0, 0);
        };
        let (number, total) = first.split_once('/').unwrap_or((first.as_str(), ""));
        (number.trim().parse().unwrap_or(0), total.trim().parse().unwrap_or(0))
    }

    fn set_number_pair(&mut self, id: &str, number: u32, total: u32) -> Result<()> {
        if total > 0 {
            self.set_text(id, [format!("{number}/{total}")])
        } else if number > 0 {
            self.set_text(id, [number.to_string()])
        } else {
            self.remove(id);
            Ok(())
        }
    }

    fn date(&self) -> Option<Timestamp> {
        match self.version() {
            Version::V2_4 => Timestamp::parse(self.text_of("TDRC").first()?),
            Version::V2_2 | Version::V2_3 => {
                let [year, date, time] = split_ids(self.version());
                let first = |id| self.text_of(id).into_iter().next();
                Timestamp::from_parts(&first(year)?, first(date).as_deref(), first(time).as_deref())
            }
        }
    }

    fn set_date(&mut self, value: &str) -> Result<()> {
        let ts = if value.trim().is_empty() {
            None
        } else {
            Some(Timestamp::parse(value).ok_or_else(|| {
                Error::validation("date", format!("{value:?} is not in YYYY-MM-DD HH:MM:SS format"))
            })?)
        };
        if self.version() == Version::V2_4 {
            match ts {
                Some(ts) => self.set_text("TDRC", [ts.to_id3()])?,
                None => {
                    self.remove("TDRC");
                }
            }
            return Ok(());
        }

        let ids = split_ids(self.version());
        for id in ids {
            self.remove(id);
        }
        if let Some(ts) = ts {
            let (year, date, time) = ts.to_parts();
            for (id, text) in ids.into_iter().zip([Some(year), date, time]) {
                if let Some(text) = text {
                    self.set_text(id, [text])?;
                }
            }
        }
        Ok(())
    }

    fn set_comment(&mut self, id: &str, value: &str) -> Result<()> {
        let mut frames = self.remove(id);
        if let Some(index) = plain_comment_index(&frames) {
            frames.remove(index);
        }
        if !value.is_empty() {
            frames.push(
                Frame::new(id)?
                    .with("lang", Value::Text("eng".to_string()))?
                    .with("desc", Value::Text(String::new()))?
                    .with("text", Value::Text(value.to_string()))?,
            );
        }
        self.set_all(id, frames)
    }
}

/// The comment shown by the `comment` name: the first one with an empty
/// description in English, else the first with an empty description.
fn plain_comment_index(frames: &[Frame]) -> Option<usize> {
    let is_plain = |f: &Frame| f.get("desc").and_then(Value::as_str).is_none_or(str::is_empty);
    frames
        .iter()
        .position(|f| is_plain(f) && f.get("lang").and_then(Value::as_str) == Some("eng"))
        .or_else(|| frames.iter().position(is_plain))
}

fn split_ids(version: Version) -> [&'static str; 3] {
    match version {
        Version::V2_2 => SPLIT_IDS[1],
        Version::V2_3 | Version::V2_4 => SPLIT_IDS[0],
    }
}

fn nonzero(n: u32) -> String {
    if n == 0 {
        String::new()
    } else {
        n.to_string()
    }
}

fn parse_number(name: &str, value: &str) -> Result<u32> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse()
        .map_err(|_| Error::validation(name, format!("{value:?} is not a number")))
}

fn describe_picture(frame: &Frame) -> String {
    let kind = frame
        .get("type")
        .and_then(Value::as_int)
        .and_then(|t| PICTURE_TYPES.get(t as usize))
        .copied()
        .unwrap_or("Other");
    let desc = frame.get("desc").and_then(Value::as_str).unwrap_or("");
    let data = frame.get("data").and_then(Value::as_bytes).unwrap_or(&[]);
    let format = match sniff_image_mime(data) {
        Some("image/png") => "png",
        Some(_) => "jpeg",
        None => "unknown",
    };
    format!("{kind}:{desc}:<{} bytes of {format} data>", data.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_names_follow_version() {
        let mut v22 = Tag::new(Version::V2_2);
        v22.set_friendly("title", "Song").unwrap();
        assert!(v22.contains("TT2"));
        let mut v24 = Tag::new(Version::V2_4);
        v24.set_friendly("title", "Song").unwrap();
        assert!(v24.contains("TIT2"));
        assert_eq!(v24.friendly("title").unwrap(), "Song");
    }

    #[test]
    fn test_multiple_values_split_and_join() {
        let mut tag = Tag::new(Version::V2_4);
        tag.set_friendly("artist", "A / B").unwrap();
        assert_eq!(tag.get_merged("TPE1").unwrap().text_values().unwrap(), vec!["A", "B"]);
        assert_eq!(tag.friendly("artist").unwrap(), "A / B");
        tag.set_friendly("artist", "").unwrap();
        assert!(!tag.contains("TPE1"));
    }

    #[test]
    fn test_track_and_total() {
        let mut tag = Tag::new(Version::V2_3);
        tag.set_friendly("track", "3").unwrap();
        assert_eq!(tag.get_merged("TRCK").unwrap().text_values().unwrap(), vec!["3"]);
        tag.set_friendly("track-total", "12").unwrap();
        assert_eq!(tag.get_merged("TRCK").unwrap().text_values().unwrap(), vec!["3/12"]);
        tag.set_friendly("track", "4").unwrap();
        assert_eq!(tag.friendly("track").unwrap(), "4");
        assert_eq!(tag.friendly("track-total").unwrap(), "12");
        assert_eq!(tag.friendly("disc").unwrap(), "");
        assert!(tag.set_friendly("disc", "two").is_err());
    }

    #[test]
    fn test_date_v24() {
        let mut tag = Tag::new(Version::V2_4);
        tag.set_friendly("date", "2001-03-15 10:30").unwrap();
        assert_eq!(tag.get_merged("TDRC").unwrap().text_values().unwrap(), vec!["2001-03-15T10:30"]);
        assert_eq!(tag.friendly("date").unwrap(), "2001-03-15 10:30");
        assert!(tag.set_friendly("date", "March 2001").is_err());
    }

    #[test]
    fn test_date_v23_split_frames() {
        let mut tag = Tag::new(Version::V2_3);
        tag.set_friendly("date", "2001-03-15 10:30").unwrap();
        assert_eq!(tag.get_merged("TYER").unwrap().text_values().unwrap(), vec!["2001"]);
        assert_eq!(tag.get_merged("TDAT").unwrap().text_values().unwrap(), vec!["1503"]);
        assert_eq!(tag.get_merged("TIME").unwrap().text_values().unwrap(), vec!["1030"]);
        assert_eq!(tag.friendly("date").unwrap(), "2001-03-15 10:30");

        tag.set_friendly("date", "1999").unwrap();
        assert!(tag.contains("TYER"));
        assert!(!tag.contains("TDAT"));
        assert!(!tag.contains("TIME"));
    }

    #[test]
    fn test_comment_prefers_english_plain() {
        let mut tag = Tag::new(Version::V2_4);
        let described = Frame::new("COMM")
            .unwrap()
            .with("lang", Value::Text("eng".into()))
            .unwrap()
            .with("desc", Value::Text("iTunNORM".into()))
            .unwrap()
            .with("text", Value::Text("x".into()))
            .unwrap();
        tag.insert(described);
        assert_eq!(tag.friendly("comment").unwrap(), "");

        tag.set_friendly("comment", "Nice").unwrap();
        assert_eq!(tag.friendly("comment").unwrap(), "Nice");
        tag.set_friendly("comment", "Nicer").unwrap();
        assert_eq!(tag.get_all("COMM").len(), 2);
        assert_eq!(tag.friendly("comment").unwrap(), "Nicer");
        tag.remove_friendly("comment").unwrap();
        assert_eq!(tag.get_all("COMM").len(), 1);
    }

    #[test]
    fn test_picture_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");
        let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
        png.extend_from_slice(&[0u8; 24]);
        std::fs::write(&path, &png).unwrap();

        let mut tag = Tag::new(Version::V2_3);
        tag.set_friendly("picture", path.to_str().unwrap()).unwrap();
        let apic = tag.get_merged("APIC").unwrap();
        assert_eq!(apic.get("mime").and_then(Value::as_str), Some("image/png"));
        assert_eq!(tag.friendly("picture").unwrap(), "Front Cover::<32 bytes of png data>");

        let mut v22 = Tag::new(Version::V2_2);
        v22.set_picture(&path).unwrap();
        assert_eq!(v22.get_merged("PIC").unwrap().get("format").and_then(Value::as_str), Some("PNG"));

        let text = dir.path().join("notes.txt");
        std::fs::write(&text, b"hello").unwrap();
        assert!(tag.set_picture(&text).is_err());
    }

    #[test]
    fn test_unknown_name() {
        let tag = Tag::new(Version::V2_4);
        assert!(matches!(tag.friendly("mood"), Err(Error::UnknownFriendlyName(_))));
        assert!(is_friendly_name("sort-album"));
        assert!(!is_friendly_name("TIT2"));
    }
}
