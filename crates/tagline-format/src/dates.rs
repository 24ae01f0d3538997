//! Recording dates across tag versions.
//!
//! ID3v2.4 stores the recording time in one `TDRC` timestamp
//! (`yyyy-MM-ddTHH:mm:ss`, any prefix). Earlier versions split it over a
//! year frame (`TYER`/`TYE`), a `DDMM` date frame (`TDAT`/`TDA`) and an
//! `HHMM` time frame (`TIME`/`TIM`).

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::frame::Frame;
use crate::tag::Version;

static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?<year>[0-9]{4})(?:-(?<month>[01][0-9])(?:-(?<day>[0-3][0-9]))?)?(?:[ T](?<hour>[0-2][0-9])(?::(?<minute>[0-5][0-9])(?::(?<second>[0-5][0-9]))?)?)?\s*$",
    )
    .unwrap_or_else(|e| panic!("timestamp pattern: {e}"))
});

static DDMM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?<day>[0-3][0-9])\s*-?\s*(?<month>[01][0-9])\s*$").unwrap_or_else(|e| panic!("date pattern: {e}"))
});

static HHMM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?<hour>[0-2][0-9])\s*:?\s*(?<minute>[0-5][0-9])\s*:?\s*(?<second>[0-5][0-9])?\s*$")
        .unwrap_or_else(|e| panic!("time pattern: {e}"))
});

/// A possibly partial point in time. A field is only present if all
/// coarser fields are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamp {
    pub year: u16,
    pub month: Option<u8>,
    pub day: Option<u8>,
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    pub second: Option<u8>,
}

fn group<T: std::str::FromStr>(caps: &regex::Captures<'_>, name: &str) -> Option<T> {
    caps.name(name)?.as_str().parse().ok()
}

impl Timestamp {
    /// Parse `YYYY[-MM[-DD]][( |T)HH[:MM[:SS]]]`.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = TIMESTAMP.captures(text)?;
        let mut ts = Timestamp {
            year: group(&caps, "year")?,
            month: group(&caps, "month"),
            day: group(&caps, "day"),
            hour: group(&caps, "hour"),
            minute: group(&caps, "minute"),
            second: group(&caps, "second"),
        };
        ts.truncate();
        Some(ts)
    }

    /// Assemble a timestamp from ID3v2.3-style year, `DDMM` and `HHMM`
    /// values. Unparsable date or time values are ignored.
    pub fn from_parts(year: &str, date: Option<&str>, time: Option<&str>) -> Option<Self> {
        let year = year.trim();
        if year.len() != 4 {
            return None;
        }
        let mut ts = Timestamp {
            year: year.parse().ok()?,
            ..Default::default()
        };
        if let Some(caps) = date.and_then(|d| DDMM.captures(d)) {
            ts.day = group(&caps, "day");
            ts.month = group(&caps, "month");
        }
        if let Some(caps) = time.and_then(|t| HHMM.captures(t)) {
            ts.hour = group(&caps, "hour");
            ts.minute = group(&caps, "minute");
            ts.second = group(&caps, "second");
        }
        ts.truncate();
        Some(ts)
    }

    /// Drop fields whose coarser fields are missing.
    fn truncate(&mut self) {
        if self.month.is_none() {
            self.day = None;
        }
        if self.day.is_none() {
            self.hour = None;
        }
        if self.hour.is_none() || self.minute.is_none() {
            self.hour = None;
            self.minute = None;
        }
        if self.minute.is_none() {
            self.second = None;
        }
    }

    fn format(&self, time_separator: char) -> String {
        let mut out = format!("{:04}", self.year);
        let Some(month) = self.month else {
            return out;
        };
        let _ = write!(out, "-{month:02}");
        let Some(day) = self.day else {
            return out;
        };
        let _ = write!(out, "-{day:02}");
        if let (Some(hour), Some(minute)) = (self.hour, self.minute) {
            let _ = write!(out, "{time_separator}{hour:02}:{minute:02}");
            if let Some(second) = self.second {
                let _ = write!(out, ":{second:02}");
            }
        }
        out
    }

    /// ID3v2.4 timestamp, e.g. `2001-03-15T10:30`.
    pub fn to_id3(&self) -> String {
        self.format('T')
    }

    /// Display form, e.g. `2001-03-15 10:30`.
    pub fn to_display(&self) -> String {
        self.format(' ')
    }

    /// Year, `DDMM` and `HHMM` values for the split date frames.
    pub fn to_parts(&self) -> (String, Option<String>, Option<String>) {
        let date = self.month.zip(self.day).map(|(m, d)| format!("{d:02}{m:02}"));
        let time = self.hour.zip(self.minute).map(|(h, m)| format!("{h:02}{m:02}"));
        (format!("{:04}", self.year), date, time)
    }
}

/// Year, date and time frame ids of ID3v2.3 and ID3v2.2.
pub(crate) const SPLIT_IDS: [[&str; 3]; 2] = [["TYER", "TDAT", "TIME"], ["TYE", "TDA", "TIM"]];

fn first_text(frames: &BTreeMap<String, Vec<Frame>>, id: &str) -> Option<String> {
    frames
        .get(id)?
        .iter()
        .find_map(|f| f.text_values()?.first().map(|s| s.to_string()))
}

/// Rewrite the recording date frames of a frame map for `version`.
///
/// Frames are left alone when the target already has its own date frames
/// or the source value cannot be parsed; they are then dropped later as
/// incompatible.
pub(crate) fn convert(frames: &mut BTreeMap<String, Vec<Frame>>, version: Version) {
    match version {
        Version::V2_4 => split_to_tdrc(frames),
        Version::V2_2 | Version::V2_3 => tdrc_to_split(frames),
    }
}

fn split_to_tdrc(frames: &mut BTreeMap<String, Vec<Frame>>) {
    if frames.contains_key("TDRC") {
        return;
    }
    for [year_id, date_id, time_id] in SPLIT_IDS {
        let Some(year) = first_text(frames, year_id) else {
            continue;
        };
        let date = first_text(frames, date_id);
        let time = first_text(frames, time_id);
        let Some(ts) = Timestamp::from_parts(&year, date.as_deref(), time.as_deref()) else {
            tracing::warn!(frameid = year_id, year = year.as_str(), "Cannot convert year to TDRC");
            return;
        };
        let position = frames.get(year_id).and_then(|fs| fs.first()).and_then(Frame::position);
        let Ok(mut tdrc) = Frame::text("TDRC", [ts.to_id3()]) else {
            return;
        };
        tdrc.set_position(position);
        for id in [year_id, date_id, time_id] {
            frames.remove(id);
        }
        tracing::debug!(timestamp = ts.to_id3().as_str(), "Merged split date frames into TDRC");
        frames.insert("TDRC".to_string(), vec![tdrc]);
        return;
    }
}

fn tdrc_to_split(frames: &mut BTreeMap<String, Vec<Frame>>) {
    if SPLIT_IDS.iter().flatten().any(|id| frames.contains_key(*id)) {
        return;
    }
    let Some(text) = first_text(frames, "TDRC") else {
        return;
    };
    let Some(ts) = Timestamp::parse(&text) else {
        tracing::warn!(frameid = "TDRC", timestamp = text.as_str(), "Cannot split unparsable timestamp");
        return;
    };
    let position = frames.get("TDRC").and_then(|fs| fs.first()).and_then(Frame::position);
    let (year, date, time) = ts.to_parts();
    let mut split = Vec::new();
    for (id, value) in [("TYER", Some(year)), ("TDAT", date), ("TIME", time)] {
        let Some(value) = value else { continue };
        let Ok(mut frame) = Frame::text(id, [value]) else {
            return;
        };
        frame.set_position(position);
        split.push((id, frame));
    }
    frames.remove("TDRC");
    for (id, frame) in split {
        frames.insert(id.to_string(), vec![frame]);
    }
    tracing::debug!(timestamp = text.as_str(), "Split TDRC into year, date and time frames");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(frames: Vec<Frame>) -> BTreeMap<String, Vec<Frame>> {
        let mut out: BTreeMap<String, Vec<Frame>> = BTreeMap::new();
        for frame in frames {
            out.entry(frame.frameid().to_string()).or_default().push(frame);
        }
        out
    }

    fn text(frames: &BTreeMap<String, Vec<Frame>>, id: &str) -> Option<String> {
        first_text(frames, id)
    }

    #[test]
    fn test_parse_timestamp_prefixes() {
        let ts = Timestamp::parse("2001-03-15T10:30").unwrap();
        assert_eq!(ts.to_id3(), "2001-03-15T10:30");
        assert_eq!(ts.to_display(), "2001-03-15 10:30");
        assert_eq!(Timestamp::parse("1999").unwrap().to_id3(), "1999");
        assert_eq!(Timestamp::parse("1999-07").unwrap().to_id3(), "1999-07");
        assert_eq!(Timestamp::parse("1999-07 10:30").unwrap().to_id3(), "1999-07");
        assert_eq!(Timestamp::parse("1999-07").unwrap().to_parts(), ("1999".to_string(), None, None));
        assert!(Timestamp::parse("99").is_none());
        assert!(Timestamp::parse("next tuesday").is_none());
    }

    #[test]
    fn test_from_parts_uses_ddmm() {
        let ts = Timestamp::from_parts("2001", Some("1503"), None).unwrap();
        assert_eq!(ts.month, Some(3));
        assert_eq!(ts.day, Some(15));
        assert_eq!(ts.to_parts(), ("2001".to_string(), Some("1503".to_string()), None));
    }

    #[test]
    fn test_tyer_tdat_to_tdrc_and_back() {
        let mut frames = map(vec![
            Frame::text("TYER", ["2001"]).unwrap(),
            Frame::text("TDAT", ["1503"]).unwrap(),
        ]);
        convert(&mut frames, Version::V2_4);
        assert_eq!(text(&frames, "TDRC").as_deref(), Some("2001-03-15"));
        assert!(!frames.contains_key("TYER"));
        assert!(!frames.contains_key("TDAT"));

        convert(&mut frames, Version::V2_3);
        assert_eq!(text(&frames, "TYER").as_deref(), Some("2001"));
        assert_eq!(text(&frames, "TDAT").as_deref(), Some("1503"));
        assert!(!frames.contains_key("TIME"));
        assert!(!frames.contains_key("TDRC"));
    }

    #[test]
    fn test_time_requires_date() {
        let mut frames = map(vec![
            Frame::text("TYE", ["1987"]).unwrap(),
            Frame::text("TIM", ["2315"]).unwrap(),
        ]);
        convert(&mut frames, Version::V2_4);
        assert_eq!(text(&frames, "TDRC").as_deref(), Some("1987"));
        assert!(!frames.contains_key("TIM"));
    }

    #[test]
    fn test_existing_target_frames_win() {
        let mut frames = map(vec![
            Frame::text("TYER", ["2001"]).unwrap(),
            Frame::text("TDRC", ["1999"]).unwrap(),
        ]);
        convert(&mut frames, Version::V2_4);
        assert_eq!(text(&frames, "TDRC").as_deref(), Some("1999"));
        assert!(frames.contains_key("TYER"));
    }
}
