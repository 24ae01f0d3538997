//! ID3v1 tag, the fixed 128-byte trailer at the end of a file.

use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use serde::Serialize;
use tagline_patch::PatchOptions;

use crate::encoding::{latin1_decode, latin1_encode};
use crate::error::{Error, Result};

/// Signature at the start of an ID3v1 tag
pub const TAG1_MAGIC: [u8; 3] = *b"TAG";

/// Size of an ID3v1 tag in bytes
pub const TAG1_SIZE: usize = 128;

/// Genre index meaning "no genre".
pub const GENRE_UNKNOWN: u8 = 255;

/// ID3v1 genre names by index: the original 80, then the Winamp
/// extensions.
pub static GENRES: [&str; 192] = [
    "Blues", "Classic Rock", "Country", "Dance", "Disco", "Funk", "Grunge", "Hip-Hop", "Jazz", "Metal",
    "New Age", "Oldies", "Other", "Pop", "R&B", "Rap", "Reggae", "Rock", "Techno", "Industrial",
    "Alternative", "Ska", "Death Metal", "Pranks", "Soundtrack", "Euro-Techno", "Ambient", "Trip-Hop", "Vocal",
    "Jazz+Funk", "Fusion", "Trance", "Classical", "Instrumental", "Acid", "House", "Game", "Sound Clip",
    "Gospel", "Noise", "AlternRock", "Bass", "Soul", "Punk", "Space", "Meditative", "Instrumental Pop",
    "Instrumental Rock", "Ethnic", "Gothic", "Darkwave", "Techno-Industrial", "Electronic", "Pop-Folk",
    "Eurodance", "Dream", "Southern Rock", "Comedy", "Cult", "Gangsta", "Top 40", "Christian Rap", "Pop/Funk",
    "Jungle", "Native American", "Cabaret", "New Wave", "Psychadelic", "Rave", "Showtunes", "Trailer", "Lo-Fi",
    "Tribal", "Acid Punk", "Acid Jazz", "Polka", "Retro", "Musical", "Rock & Roll", "Hard Rock",
    // 80..
    "Folk", "Folk-Rock", "National Folk", "Swing", "Fast Fusion", "Bebob", "Latin", "Revival", "Celtic",
    "Bluegrass", "Avantgarde", "Gothic Rock", "Progressive Rock", "Psychedelic Rock", "Symphonic Rock",
    "Slow Rock", "Big Band", "Chorus", "Easy Listening", "Acoustic", "Humour", "Speech", "Chanson", "Opera",
    "Chamber Music", "Sonata", "Symphony", "Booty Bass", "Primus", "Porn Groove", "Satire", "Slow Jam", "Club",
    "Tango", "Samba", "Folklore", "Ballad", "Power Ballad", "Rhythmic Soul", "Freestyle", "Duet", "Punk Rock",
    "Drum Solo", "A capella", "Euro-House", "Dance Hall",
    // 126..
    "Goa", "Drum & Bass", "Club-House", "Hardcore", "Terror", "Indie", "BritPop", "Negerpunk", "Polsk Punk",
    "Beat", "Christian Gangsta Rap", "Heavy Metal", "Black Metal", "Crossover", "Contemporary Christian",
    "Christian Rock", "Merengue", "Salsa", "Thrash Metal", "Anime", "JPop", "Synthpop",
    // 148..
    "Abstract", "Art Rock", "Baroque", "Bhangra", "Big Beat", "Breakbeat", "Chillout", "Downtempo", "Dub", "EBM",
    "Eclectic", "Electro", "Electroclash", "Emo", "Experimental", "Garage", "Global", "IDM", "Illbient",
    "Industro-Goth", "Jam Band", "Krautrock", "Leftfield", "Lounge", "Math Rock", "New Romantic", "Nu-Breakz",
    "Post-Punk", "Post-Rock", "Psytrance", "Shoegaze", "Space Rock", "Trop Rock", "World Music", "Neoclassical",
    "Audiobook", "Audio Theatre", "Neue Deutsche Welle", "Podcast", "Indie Rock", "G-Funk", "Dubstep",
    "Garage Rock", "Psybient",
];

/// An ID3v1 tag.
///
/// Layout (128 bytes, ISO-8859-1 text padded with NULs):
/// - `[0..3]`     magic: `TAG`
/// - `[3..33]`    title
/// - `[33..63]`   artist
/// - `[63..93]`   album
/// - `[93..97]`   year
/// - `[97..127]`  comment, or with ID3v1.1 a 28-byte comment, a zero
///   byte and the track number
/// - `[127]`      genre index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tag1 {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub comment: String,
    /// Track number; 0 when absent.
    pub track: u8,
    /// Index into [`GENRES`].
    pub genre: u8,
}

impl Tag1 {
    pub fn new() -> Self {
        Self {
            genre: GENRE_UNKNOWN,
            ..Default::default()
        }
    }

    /// Decode a tag from exactly the 128 bytes of the trailer.
    ///
    /// # Errors
    ///
    /// [`Error::NoTag`] if `data` is short or lacks the `TAG` signature.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < TAG1_SIZE || data[..3] != TAG1_MAGIC {
            return Err(Error::NoTag("ID3v1 tag not found"));
        }
        let (comment, track) = if data[125] == 0 {
            (text_field(&data[97..125]), data[126])
        } else {
            (text_field(&data[97..127]), 0)
        };
        Ok(Self {
            title: text_field(&data[3..33]),
            artist: text_field(&data[33..63]),
            album: text_field(&data[63..93]),
            year: text_field(&data[93..97]),
            comment,
            track,
            genre: data[127],
        })
    }

    /// Serialize the tag. Values longer than their field are truncated.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if a value has characters outside
    /// ISO-8859-1.
    pub fn encode(&self) -> Result<[u8; TAG1_SIZE]> {
        let mut out = [0u8; TAG1_SIZE];
        out[..3].copy_from_slice(&TAG1_MAGIC);
        put_field(&mut out[3..33], "title", &self.title)?;
        put_field(&mut out[33..63], "artist", &self.artist)?;
        put_field(&mut out[63..93], "album", &self.album)?;
        put_field(&mut out[93..97], "year", &self.year)?;
        if self.track != 0 {
            put_field(&mut out[97..125], "comment", &self.comment)?;
            out[126] = self.track;
        } else {
            put_field(&mut out[97..127], "comment", &self.comment)?;
        }
        out[127] = self.genre;
        Ok(out)
    }

    /// Genre as `"N (Name)"`, or `"N (unknown)"` for indices past the
    /// table.
    pub fn genre_name(&self) -> String {
        match GENRES.get(usize::from(self.genre)) {
            Some(name) => format!("{} ({name})", self.genre),
            None => format!("{} (unknown)", self.genre),
        }
    }

    /// Set the genre from an index (`"17"`), a rendered genre
    /// (`"17 (Rock)"`), a name matched case-insensitively, or
    /// `"unknown"`.
    pub fn set_genre(&mut self, value: &str) -> Result<()> {
        let value = value.trim();
        let number = value.split_once(" (").map_or(value, |(n, _)| n);
        if let Ok(index) = number.parse::<u8>() {
            self.genre = index;
            return Ok(());
        }
        if value.eq_ignore_ascii_case("unknown") {
            self.genre = GENRE_UNKNOWN;
            return Ok(());
        }
        let index = GENRES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(value))
            .ok_or_else(|| Error::validation("genre", format!("unknown genre {value:?}")))?;
        self.genre = index as u8;
        Ok(())
    }

    // ----- File operations -----

    /// Read the ID3v1 tag at the end of the file at `path`.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = File::open(path.as_ref())?;
        match trailer(&mut file)? {
            Some((_, data)) => Self::decode(&data),
            None => Err(Error::NoTag("ID3v1 tag not found")),
        }
    }

    /// Write the tag to the file at `path`, replacing an existing ID3v1
    /// tag or appending a new one.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        self.write_with(path, &PatchOptions::default())
    }

    pub fn write_with(&self, path: impl AsRef<Path>, options: &PatchOptions) -> Result<()> {
        let path = path.as_ref();
        let data = self.encode()?;
        let mut file = File::open(path)?;
        let (offset, length) = match trailer(&mut file)? {
            Some((offset, data)) if data[..3] == TAG1_MAGIC => (offset, TAG1_SIZE as u64),
            _ => (file.seek(SeekFrom::End(0))?, 0),
        };
        drop(file);
        tagline_patch::replace_region(path, offset, length, &data, options)?;
        tracing::info!(path = %path.display(), replaced = length != 0, "Wrote ID3v1 tag");
        Ok(())
    }

    /// Remove the ID3v1 tag from the file at `path`. Returns whether a
    /// tag was present.
    pub fn delete(path: impl AsRef<Path>) -> Result<bool> {
        Self::delete_with(path, &PatchOptions::default())
    }

    pub fn delete_with(path: impl AsRef<Path>, options: &PatchOptions) -> Result<bool> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let offset = match trailer(&mut file)? {
            Some((offset, data)) if data[..3] == TAG1_MAGIC => offset,
            _ => return Ok(false),
        };
        drop(file);
        tagline_patch::replace_region(path, offset, TAG1_SIZE as u64, &[], options)?;
        tracing::info!(path = %path.display(), "Deleted ID3v1 tag");
        Ok(true)
    }
}

impl fmt::Display for Tag1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "title={:?}", self.title)?;
        writeln!(f, "artist={:?}", self.artist)?;
        writeln!(f, "album={:?}", self.album)?;
        writeln!(f, "year={:?}", self.year)?;
        writeln!(f, "comment={:?}", self.comment)?;
        if self.track != 0 {
            writeln!(f, "track={}", self.track)?;
        }
        write!(f, "genre={}", self.genre_name())
    }
}

/// Offset and contents of the last 128 bytes of `file`, if it is that
/// long.
fn trailer(file: &mut File) -> Result<Option<(u64, [u8; TAG1_SIZE])>> {
    let len = file.seek(SeekFrom::End(0))?;
    if len < TAG1_SIZE as u64 {
        return Ok(None);
    }
    let offset = len - TAG1_SIZE as u64;
    file.seek(SeekFrom::Start(offset))?;
    let mut data = [0u8; TAG1_SIZE];
    file.read_exact(&mut data)?;
    Ok(Some((offset, data)))
}

fn text_field(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    latin1_decode(&data[..end]).trim().to_string()
}

fn put_field(out: &mut [u8], name: &str, value: &str) -> Result<()> {
    let raw = latin1_encode(value)
        .map_err(|_| Error::validation(name, "not representable in ISO-8859-1"))?;
    let n = raw.len().min(out.len());
    out[..n].copy_from_slice(&raw[..n]);
    Ok(())
}
