//! Static table of known frame types.
//!
//! Every ID3v2.3/2.4 frame is described once, with the versions it exists
//! in. ID3v2.2 three-letter frames are derived from their four-letter
//! parents through [`V22_PARENTS`], so both share one field layout.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

use crate::field::{FieldKind as K, FieldSpec as F, Width};
use crate::tag::Version;

/// Set of tag versions a frame type is defined in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Versions(u8);

impl Versions {
    pub const V22: Versions = Versions(1 << 0);
    pub const V23: Versions = Versions(1 << 1);
    pub const V24: Versions = Versions(1 << 2);
    pub const V34: Versions = Versions(Self::V23.0 | Self::V24.0);
    pub const ALL: Versions = Versions(Self::V22.0 | Self::V34.0);

    pub fn contains(self, version: Version) -> bool {
        let bit = match version {
            Version::V2_2 => Self::V22,
            Version::V2_3 => Self::V23,
            Version::V2_4 => Self::V24,
        };
        self.0 & bit.0 != 0
    }
}

/// Behavioural class of a frame type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrameClass {
    /// Encoding byte plus a list of strings. Duplicates merge by
    /// concatenating their text.
    Text,
    /// A single latin-1 URL.
    Url,
    Other,
}

/// Everything the codec needs to know about one frame type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor {
    pub id: &'static str,
    pub description: &'static str,
    pub versions: Versions,
    pub specs: &'static [F],
    pub class: FrameClass,
    pub allow_duplicates: bool,
    /// Not part of any ID3 standard but written by common software.
    pub nonstandard: bool,
}

impl FrameDescriptor {
    const fn new(id: &'static str, description: &'static str, versions: Versions, specs: &'static [F]) -> Self {
        Self {
            id,
            description,
            versions,
            specs,
            class: FrameClass::Other,
            allow_duplicates: false,
            nonstandard: false,
        }
    }

    const fn text(id: &'static str, description: &'static str, versions: Versions) -> Self {
        let mut d = Self::new(id, description, versions, TEXT);
        d.class = FrameClass::Text;
        d
    }

    const fn url(id: &'static str, description: &'static str) -> Self {
        let mut d = Self::new(id, description, Versions::V34, URL);
        d.class = FrameClass::Url;
        d
    }

    const fn dups(mut self) -> Self {
        self.allow_duplicates = true;
        self
    }

    const fn nonstandard(mut self) -> Self {
        self.nonstandard = true;
        self
    }

    pub fn is_text(&self) -> bool {
        self.class == FrameClass::Text
    }

    /// Whether the frame has an encoding byte selecting its text encoding.
    pub fn has_encoding(&self) -> bool {
        self.specs.iter().any(|s| s.kind == K::Encoding)
    }
}

// ----- Field layouts -----

const ENCODING: F = F::new("encoding", K::Encoding);

pub(crate) const TEXT: &[F] = &[ENCODING, F::new("text", K::Sequence(&K::Encoded))];
pub(crate) const URL: &[F] = &[F::new("url", K::Url)];
pub(crate) const BINARY: &[F] = &[F::new("data", K::Binary)];

const CREDIT_ENTRY: &[F] = &[F::new("involvement", K::Encoded), F::new("person", K::Encoded)];
const CREDITS: &[F] = &[ENCODING, F::new("people", K::Multi(CREDIT_ENTRY))];
const UFID: &[F] = &[F::new("owner", K::NullTerminated), F::new("data", K::Binary)];
const TXXX: &[F] = &[ENCODING, F::new("description", K::Encoded), F::new("value", K::Encoded)];
const WXXX: &[F] = &[ENCODING, F::new("description", K::Encoded), F::new("url", K::Url)];
const MCDI: &[F] = &[F::new("cd_toc", K::Binary)];
const ETCO_EVENT: &[F] = &[F::new("type", K::Byte), F::new("timestamp", K::Integer(Width::Bits(32)))];
const ETCO: &[F] = &[F::new("format", K::Byte), F::new("events", K::Multi(ETCO_EVENT))];
const MLLT: &[F] = &[
    F::new("frames", K::Integer(Width::Bits(16))),
    F::new("bytes", K::Integer(Width::Bits(24))),
    F::new("milliseconds", K::Integer(Width::Bits(24))),
    F::new("bits_for_bytes", K::Byte),
    F::new("bits_for_milliseconds", K::Byte),
    F::new("data", K::Binary),
];
const SYTC: &[F] = &[F::new("format", K::Byte), F::new("data", K::Binary)];
const USLT: &[F] = &[
    ENCODING,
    F::new("lang", K::Language),
    F::new("desc", K::Encoded),
    F::new("text", K::Encoded),
];
const SYLT_ENTRY: &[F] = &[F::new("text", K::Encoded), F::new("timestamp", K::Integer(Width::Bits(32)))];
const SYLT: &[F] = &[
    ENCODING,
    F::new("lang", K::Language),
    F::new("format", K::Byte),
    F::new("type", K::Byte),
    F::new("desc", K::Encoded),
    F::new("data", K::Multi(SYLT_ENTRY)),
];
const RVA2_CHANNEL: &[F] = &[
    F::new("channel", K::Byte),
    F::new("gain", K::Integer(Width::Bits(16))),
    F::new("peak", K::VarInt),
];
const RVA2: &[F] = &[F::new("desc", K::NullTerminated), F::new("adjustment", K::Multi(RVA2_CHANNEL))];
const EQU2_POINT: &[F] = &[
    F::new("frequency", K::Integer(Width::Bits(16))),
    F::new("adjustment", K::Signed(Width::Bits(16))),
];
const EQU2: &[F] = &[
    F::new("method", K::Byte),
    F::new("desc", K::NullTerminated),
    F::new("adjustments", K::Multi(EQU2_POINT)),
];
const RVRB: &[F] = &[
    F::new("left", K::Integer(Width::Bits(16))),
    F::new("right", K::Integer(Width::Bits(16))),
    F::new("bounce_left", K::Byte),
    F::new("bounce_right", K::Byte),
    F::new("feedback_ltl", K::Byte),
    F::new("feedback_ltr", K::Byte),
    F::new("feedback_rtr", K::Byte),
    F::new("feedback_rtl", K::Byte),
    F::new("premix_ltr", K::Byte),
    F::new("premix_rtl", K::Byte),
];
pub(crate) const APIC: &[F] = &[
    ENCODING,
    F::new("mime", K::NullTerminated),
    F::new("type", K::PictureType),
    F::new("desc", K::Encoded),
    F::new("data", K::Binary),
];
pub(crate) const PIC: &[F] = &[
    ENCODING,
    F::new("format", K::FixedString(3)),
    F::new("type", K::PictureType),
    F::new("desc", K::Encoded),
    F::new("data", K::Binary),
];
const GEOB: &[F] = &[
    ENCODING,
    F::new("mime", K::NullTerminated),
    F::new("filename", K::Encoded),
    F::new("desc", K::Encoded),
    F::new("data", K::Binary),
];
const PCNT: &[F] = &[F::new("count", K::Integer(Width::Bits(32)))];
const POPM: &[F] = &[
    F::new("email", K::NullTerminated),
    F::new("rating", K::Byte),
    F::optional("count", K::Integer(Width::Bits(32))),
];
const RBUF: &[F] = &[
    F::new("size", K::Integer(Width::Bits(32))),
    F::optional("info", K::Byte),
    F::optional("offset", K::Integer(Width::Bits(32))),
];
const AENC: &[F] = &[
    F::new("owner", K::NullTerminated),
    F::new("preview_start", K::Integer(Width::Bits(16))),
    F::new("preview_length", K::Integer(Width::Bits(16))),
    F::new("data", K::Binary),
];
const LINK: &[F] = &[
    F::new("linked_frameid", K::FixedString(4)),
    F::new("url", K::NullTerminated),
    F::optional("data", K::Binary),
];
const LNK: &[F] = &[
    F::new("linked_frame", K::FixedString(3)),
    F::new("url", K::NullTerminated),
    F::new("data", K::Binary),
];
const POSS: &[F] = &[F::new("format", K::Byte), F::new("position", K::Integer(Width::Bits(32)))];
const USER: &[F] = &[ENCODING, F::new("lang", K::Language), F::new("text", K::Encoded)];
const OWNE: &[F] = &[
    ENCODING,
    F::new("price", K::NullTerminated),
    F::new("date", K::FixedString(8)),
    F::new("seller", K::NullTerminated),
];
const COMR: &[F] = &[
    ENCODING,
    F::new("price", K::NullTerminated),
    F::new("valid", K::NullTerminated),
    F::new("contact", K::NullTerminated),
    F::new("format", K::Byte),
    F::new("seller", K::Encoded),
    F::new("desc", K::Encoded),
    F::new("mime", K::NullTerminated),
    F::new("logo", K::Binary),
];
const REGISTRATION: &[F] = &[
    F::new("owner", K::NullTerminated),
    F::new("symbol", K::Byte),
    F::new("data", K::Binary),
];
const PRIV: &[F] = &[F::new("owner", K::NullTerminated), F::new("data", K::Binary)];
const SIGN: &[F] = &[F::new("group", K::Byte), F::new("data", K::Binary)];
const SEEK: &[F] = &[F::new("offset", K::Integer(Width::Bits(32)))];
const ASPI: &[F] = &[
    F::new("S", K::Integer(Width::Bits(32))),
    F::new("L", K::Integer(Width::Bits(32))),
    F::new("N", K::Integer(Width::Bits(16))),
    F::new("b", K::Byte),
    F::new("Fi", K::AspiIndex),
];
const EQUA: &[F] = &[F::new("bits", K::Byte), F::new("data", K::Binary)];

const fn rvad_volume(name: &'static str, sign_bit: u8, optional: bool) -> F {
    let kind = K::SignMagnitude {
        width: Width::Field("bits"),
        sign_bit,
    };
    if optional {
        F::optional(name, kind)
    } else {
        F::new(name, kind)
    }
}

const fn rvad_peak(name: &'static str, optional: bool) -> F {
    let kind = K::Integer(Width::Field("bits"));
    if optional {
        F::optional(name, kind)
    } else {
        F::new(name, kind)
    }
}

const RVAD: &[F] = &[
    F::new("signs", K::Byte),
    F::new("bits", K::Byte),
    rvad_volume("vol_right", 0, false),
    rvad_volume("vol_left", 1, false),
    rvad_peak("peak_right", false),
    rvad_peak("peak_left", false),
    rvad_volume("vol_right_back", 2, true),
    rvad_volume("vol_left_back", 3, true),
    rvad_peak("peak_right_back", true),
    rvad_peak("peak_left_back", true),
    rvad_volume("vol_center", 4, true),
    rvad_peak("peak_center", true),
    rvad_volume("vol_bass", 5, true),
    rvad_peak("peak_bass", true),
];
const CRM: &[F] = &[
    F::new("owner", K::NullTerminated),
    F::new("content", K::NullTerminated),
    F::new("data", K::Binary),
];
const PCST: &[F] = &[F::new("value", K::Integer(Width::Bits(32)))];
const RGAD: &[F] = &[
    F::new("peak", K::Integer(Width::Bits(32))),
    F::new("radio", K::Integer(Width::Bits(16))),
    F::new("audiophile", K::Integer(Width::Bits(16))),
];

// ----- Frame table -----

type D = FrameDescriptor;
const V34: Versions = Versions::V34;
const V3: Versions = Versions::V23;
const V4: Versions = Versions::V24;

static FRAMES: &[FrameDescriptor] = &[
    // Identification
    D::new("UFID", "Unique file identifier", V34, UFID).dups(),
    D::text("TIT1", "Content group description", V34),
    D::text("TIT2", "Title/songname/content description", V34),
    D::text("TIT3", "Subtitle/Description refinement", V34),
    D::text("TALB", "Album/Movie/Show title", V34),
    D::text("TOAL", "Original album/movie/show title", V34),
    D::text("TRCK", "Track number/Position in set", V34),
    D::text("TPOS", "Part of a set", V34),
    D::text("TSST", "Set subtitle", V4),
    D::text("TSRC", "ISRC (international standard recording code)", V34),
    // Involved persons
    D::text("TPE1", "Lead performer(s)/Soloist(s)", V34),
    D::text("TPE2", "Band/orchestra/accompaniment", V34),
    D::text("TPE3", "Conductor/performer refinement", V34),
    D::text("TPE4", "Interpreted, remixed, or otherwise modified by", V34),
    D::text("TOPE", "Original artist(s)/performer(s)", V34),
    D::text("TEXT", "Lyricist/Text writer", V34),
    D::text("TOLY", "Original lyricist(s)/text writer(s)", V34),
    D::text("TCOM", "Composer", V34),
    D::new("TMCL", "Musician credits list", V4, CREDITS),
    D::new("TIPL", "Involved people list", V4, CREDITS),
    D::text("TENC", "Encoded by", V34),
    // Derived and subjective properties
    D::text("TBPM", "BPM (beats per minute)", V34),
    D::text("TLEN", "Length", V34),
    D::text("TKEY", "Initial key", V34),
    D::text("TLAN", "Language(s)", V34),
    D::text("TCON", "Content type", V34),
    D::text("TFLT", "File type", V34),
    D::text("TMED", "Media type", V34),
    D::text("TMOO", "Mood", V4),
    // Rights and license
    D::text("TCOP", "Copyright message", V34),
    D::text("TPRO", "Produced notice", V4),
    D::text("TPUB", "Publisher", V34),
    D::text("TOWN", "File owner/licensee", V34),
    D::text("TRSN", "Internet radio station name", V34),
    D::text("TRSO", "Internet radio station owner", V34),
    // Other text frames
    D::text("TOFN", "Original filename", V34),
    D::text("TDLY", "Playlist delay", V34),
    D::text("TDEN", "Encoding time", V4),
    D::text("TDOR", "Original release time", V4),
    D::text("TDRC", "Recording time", V4),
    D::text("TDRL", "Release time", V4),
    D::text("TDTG", "Tagging time", V4),
    D::text("TSSE", "Software/Hardware and settings used for encoding", V34),
    D::text("TSOA", "Album sort order", V34),
    D::text("TSOP", "Performer sort order", V34),
    D::text("TSOT", "Title sort order", V34),
    D::new("TXXX", "User defined text information frame", V34, TXXX).dups(),
    // URL links
    D::url("WCOM", "Commercial information").dups(),
    D::url("WCOP", "Copyright/Legal information"),
    D::url("WOAF", "Official audio file webpage"),
    D::url("WOAR", "Official artist/performer webpage").dups(),
    D::url("WOAS", "Official audio source webpage"),
    D::url("WORS", "Official Internet radio station homepage"),
    D::url("WPAY", "Payment"),
    D::url("WPUB", "Publishers official webpage"),
    D::new("WXXX", "User defined URL link frame", V34, WXXX).dups(),
    // Binary frames
    D::new("MCDI", "Music CD identifier", V34, MCDI),
    D::new("ETCO", "Event timing codes", V34, ETCO),
    D::new("MLLT", "MPEG location lookup table", V34, MLLT),
    D::new("SYTC", "Synchronised tempo codes", V34, SYTC),
    D::new("USLT", "Unsynchronised lyric/text transcription", V34, USLT).dups(),
    D::new("SYLT", "Synchronised lyric/text", V34, SYLT).dups(),
    D::new("COMM", "Comments", V34, USLT).dups(),
    D::new("RVA2", "Relative volume adjustment (2)", V34, RVA2).dups(),
    D::new("EQU2", "Equalisation (2)", V34, EQU2).dups(),
    D::new("RVRB", "Reverb", V34, RVRB),
    D::new("APIC", "Attached picture", V34, APIC).dups(),
    D::new("GEOB", "General encapsulated object", V34, GEOB).dups(),
    D::new("PCNT", "Play counter", V34, PCNT),
    D::new("POPM", "Popularimeter", V34, POPM).dups(),
    D::new("RBUF", "Recommended buffer size", V34, RBUF),
    D::new("AENC", "Audio encryption", V34, AENC).dups(),
    D::new("LINK", "Linked information", V34, LINK).dups(),
    D::new("POSS", "Position synchronisation frame", V34, POSS),
    D::new("USER", "Terms of use", V34, USER).dups(),
    D::new("OWNE", "Ownership frame", V34, OWNE),
    D::new("COMR", "Commercial frame", V34, COMR).dups(),
    D::new("ENCR", "Encryption method registration", V34, REGISTRATION).dups(),
    D::new("GRID", "Group identification registration", V34, REGISTRATION).dups(),
    D::new("PRIV", "Private frame", V34, PRIV).dups(),
    D::new("SIGN", "Signature frame", V4, SIGN).dups(),
    D::new("SEEK", "Seek frame", V4, SEEK),
    D::new("ASPI", "Audio seek point index", V4, ASPI),
    // Replaced in ID3v2.4
    D::text("TYER", "Year", V3),
    D::text("TDAT", "Date (DDMM)", V3),
    D::text("TIME", "Time (HHMM)", V3),
    D::text("TORY", "Original release year", V3),
    D::text("TRDA", "Recording dates", V3),
    D::text("TSIZ", "Size", V3),
    D::new("IPLS", "Involved people list", V3, CREDITS),
    D::new("EQUA", "Equalisation", V3, EQUA),
    D::new("RVAD", "Relative volume adjustment", V3, RVAD),
    D::text("XSOP", "MusicBrainz Artist Sortname", V3).nonstandard(),
    // ID3v2.2 frames without a four-letter counterpart
    D::new("PIC", "Attached picture", Versions::V22, PIC).dups(),
    D::new("CRM", "Encrypted meta frame", Versions::V22, CRM),
    D::new("LNK", "Linked information", Versions::V22, LNK).dups(),
    // Common extensions
    D::text("TCMP", "iTunes: Part of a compilation", V34).nonstandard(),
    D::text("TDES", "iTunes: Podcast description", V34).nonstandard(),
    D::text("TGID", "iTunes: Podcast identifier", V34).nonstandard(),
    D::url("WFED", "iTunes: Podcast feed URL").nonstandard(),
    D::text("TCAT", "iTunes: Podcast category", V34).nonstandard(),
    D::text("TKWD", "iTunes: Podcast keywords", V34).nonstandard(),
    D::new("PCST", "iTunes: Podcast flag", V34, PCST).nonstandard(),
    D::text("TSO2", "iTunes: Album Artist sort order", V34).nonstandard(),
    D::text("TSOC", "iTunes: Sort Composer", V34).nonstandard(),
    D::new("NCON", "MusicMatch data", V34, BINARY).nonstandard(),
    D::new("RGAD", "Replay Gain Adjustment", V34, RGAD).nonstandard(),
    D::text("TTSE", "Lame encoder command line", V34).nonstandard(),
];

/// ID3v2.2 frame ids and the four-letter frame they correspond to.
pub static V22_PARENTS: &[(&str, &str)] = &[
    ("UFI", "UFID"),
    ("TT1", "TIT1"),
    ("TT2", "TIT2"),
    ("TT3", "TIT3"),
    ("TP1", "TPE1"),
    ("TP2", "TPE2"),
    ("TP3", "TPE3"),
    ("TP4", "TPE4"),
    ("TCM", "TCOM"),
    ("TXT", "TEXT"),
    ("TLA", "TLAN"),
    ("TCO", "TCON"),
    ("TAL", "TALB"),
    ("TPA", "TPOS"),
    ("TRK", "TRCK"),
    ("TRC", "TSRC"),
    ("TYE", "TYER"),
    ("TDA", "TDAT"),
    ("TIM", "TIME"),
    ("TRD", "TRDA"),
    ("TMT", "TMED"),
    ("TFT", "TFLT"),
    ("TBP", "TBPM"),
    ("TCR", "TCOP"),
    ("TPB", "TPUB"),
    ("TEN", "TENC"),
    ("TSS", "TSSE"),
    ("TOF", "TOFN"),
    ("TLE", "TLEN"),
    ("TSI", "TSIZ"),
    ("TDY", "TDLY"),
    ("TKE", "TKEY"),
    ("TOT", "TOAL"),
    ("TOA", "TOPE"),
    ("TOL", "TOLY"),
    ("TOR", "TORY"),
    ("TXX", "TXXX"),
    ("WAF", "WOAF"),
    ("WAR", "WOAR"),
    ("WAS", "WOAS"),
    ("WCM", "WCOM"),
    ("WCP", "WCOP"),
    ("WPB", "WPUB"),
    ("WXX", "WXXX"),
    ("IPL", "IPLS"),
    ("MCI", "MCDI"),
    ("ETC", "ETCO"),
    ("MLL", "MLLT"),
    ("STC", "SYTC"),
    ("ULT", "USLT"),
    ("SLT", "SYLT"),
    ("COM", "COMM"),
    ("RVA", "RVAD"),
    ("EQU", "EQUA"),
    ("REV", "RVRB"),
    ("GEO", "GEOB"),
    ("CNT", "PCNT"),
    ("POP", "POPM"),
    ("BUF", "RBUF"),
    ("CRA", "AENC"),
    // Common extensions
    ("TCP", "TCMP"),
    ("TDS", "TDES"),
    ("TID", "TGID"),
    ("TDR", "TDRL"),
    ("WFD", "WFED"),
    ("TCT", "TCAT"),
    ("TKW", "TKWD"),
    ("PCS", "PCST"),
    ("TST", "TSOT"),
    ("TSA", "TSOA"),
    ("TSP", "TSOP"),
    ("TS2", "TSO2"),
    ("TSC", "TSOC"),
];

/// Frames that were renamed between ID3v2.3 and ID3v2.4 without changing
/// their layout: (v2.3 id, v2.4 id).
pub static V23_V24_RENAMES: &[(&str, &str)] = &[("IPLS", "TIPL"), ("TORY", "TDOR")];

/// Descriptors for frames whose id is well formed but not in the table.
pub static UNKNOWN_TEXT: FrameDescriptor = FrameDescriptor {
    id: "",
    description: "Unknown text frame",
    versions: Versions::ALL,
    specs: TEXT,
    class: FrameClass::Text,
    allow_duplicates: false,
    nonstandard: true,
};

pub static UNKNOWN_URL: FrameDescriptor = FrameDescriptor {
    id: "",
    description: "Unknown URL frame",
    versions: Versions::ALL,
    specs: URL,
    class: FrameClass::Url,
    allow_duplicates: false,
    nonstandard: true,
};

pub static UNKNOWN_BINARY: FrameDescriptor = FrameDescriptor {
    id: "",
    description: "Unknown frame",
    versions: Versions::ALL,
    specs: BINARY,
    class: FrameClass::Other,
    allow_duplicates: true,
    nonstandard: true,
};

struct Registry {
    by_id: HashMap<&'static str, FrameDescriptor>,
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let mut by_id: HashMap<&'static str, FrameDescriptor> = FRAMES.iter().map(|d| (d.id, *d)).collect();
    for &(v22, parent) in V22_PARENTS {
        if let Some(base) = by_id.get(parent).copied() {
            by_id.insert(
                v22,
                FrameDescriptor {
                    id: v22,
                    versions: Versions::V22,
                    ..base
                },
            );
        }
    }
    Registry { by_id }
});

/// Look up a registered frame type.
pub fn lookup(id: &str) -> Option<&'static FrameDescriptor> {
    REGISTRY.by_id.get(id)
}

/// Descriptor used to decode a frame with an unregistered id.
pub fn unknown_descriptor(id: &str) -> &'static FrameDescriptor {
    match id.as_bytes().first() {
        Some(b'T') => &UNKNOWN_TEXT,
        Some(b'W') => &UNKNOWN_URL,
        _ => &UNKNOWN_BINARY,
    }
}

/// The four-letter frame a v2.2 id stands for.
pub fn v22_parent(id: &str) -> Option<&'static str> {
    V22_PARENTS.iter().find(|(v22, _)| *v22 == id).map(|&(_, parent)| parent)
}

/// The v2.2 id standing for a four-letter frame.
pub fn v22_child(id: &str) -> Option<&'static str> {
    V22_PARENTS.iter().find(|(_, parent)| *parent == id).map(|&(v22, _)| v22)
}

/// All frame types defined in `version`, sorted by id.
pub fn frames_in(version: Version) -> Vec<&'static FrameDescriptor> {
    let mut frames: Vec<_> = REGISTRY
        .by_id
        .values()
        .filter(|d| d.versions.contains(version))
        .collect();
    frames.sort_by_key(|d| d.id);
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_and_derived() {
        let tit2 = lookup("TIT2").unwrap();
        assert!(tit2.is_text());
        assert!(tit2.versions.contains(Version::V2_3));
        assert!(!tit2.versions.contains(Version::V2_2));

        let tt2 = lookup("TT2").unwrap();
        assert_eq!(tt2.specs, tit2.specs);
        assert!(tt2.versions.contains(Version::V2_2));
        assert!(!tt2.versions.contains(Version::V2_4));
    }

    #[test]
    fn test_version_restricted_frames() {
        assert!(!lookup("TDRC").unwrap().versions.contains(Version::V2_3));
        assert!(!lookup("TYER").unwrap().versions.contains(Version::V2_4));
        assert!(lookup("APIC").unwrap().allow_duplicates);
        assert!(!lookup("TALB").unwrap().allow_duplicates);
    }

    #[test]
    fn test_v22_mapping_is_bidirectional() {
        assert_eq!(v22_parent("COM"), Some("COMM"));
        assert_eq!(v22_child("COMM"), Some("COM"));
        assert_eq!(v22_child("TDRC"), None);
    }

    #[test]
    fn test_every_v22_parent_is_registered() {
        for (v22, parent) in V22_PARENTS {
            assert!(lookup(parent).is_some(), "{v22} -> {parent}");
            assert_eq!(lookup(v22).unwrap().id, *v22);
        }
    }

    #[test]
    fn test_unknown_descriptor_by_prefix() {
        assert!(unknown_descriptor("TFOO").is_text());
        assert_eq!(unknown_descriptor("WFOO").class, FrameClass::Url);
        assert_eq!(unknown_descriptor("ZZZZ").specs, BINARY);
    }

    #[test]
    fn test_frames_in_version() {
        let v22 = frames_in(Version::V2_2);
        assert!(v22.iter().all(|d| d.id.len() == 3));
        let v24 = frames_in(Version::V2_4);
        assert!(v24.iter().any(|d| d.id == "TDRC"));
        assert!(v24.iter().all(|d| d.id.len() == 4));
    }
}
