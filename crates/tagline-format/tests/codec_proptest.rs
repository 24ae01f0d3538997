//! Property-based tests for the byte codecs and tag round trips.

use std::io::Read;

use proptest::prelude::*;
use tagline_format::bytes::{syncsafe_decode, syncsafe_encode, unsync_decode, unsync_encode, UnsyncReader};
use tagline_format::{Tag, Tag1, Version};

fn version() -> impl Strategy<Value = Version> {
    prop_oneof![Just(Version::V2_2), Just(Version::V2_3), Just(Version::V2_4)]
}

proptest! {
    /// Sync-safe integers survive a round trip at every width that can hold them.
    #[test]
    fn syncsafe_round_trip(value in 0u32..(1 << 28)) {
        let encoded = syncsafe_encode(value, 4).unwrap();
        prop_assert!(encoded.iter().all(|b| b & 0x80 == 0));
        prop_assert_eq!(syncsafe_decode(&encoded).unwrap(), value);
        prop_assert_eq!(syncsafe_decode(&syncsafe_encode(value, 5).unwrap()).unwrap(), value);
    }

    /// Values needing more than four 7-bit digits are rejected.
    #[test]
    fn syncsafe_overflow(value in (1u32 << 28)..=u32::MAX) {
        prop_assert!(syncsafe_encode(value, 4).is_err());
    }

    /// Unsynchronisation round trips for any bytes, with 0xFF weighted in.
    #[test]
    fn unsync_round_trip(data in prop::collection::vec(prop_oneof![Just(0xFFu8), Just(0x00), any::<u8>()], 0..512)) {
        let encoded = unsync_encode(&data);
        prop_assert_eq!(unsync_decode(&encoded), data);
    }

    /// Encoded data never contains a false sync pattern and never ends in 0xFF.
    #[test]
    fn unsync_removes_sync_patterns(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let encoded = unsync_encode(&data);
        prop_assert!(!encoded.windows(2).any(|w| w[0] == 0xFF && w[1] & 0xE0 == 0xE0));
        prop_assert_ne!(encoded.last(), Some(&0xFF));
    }

    /// The streaming reader agrees with the in-memory decoder.
    #[test]
    fn unsync_reader_matches_decoder(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let encoded = unsync_encode(&data);
        let mut streamed = Vec::new();
        UnsyncReader::new(encoded.as_slice()).read_to_end(&mut streamed).unwrap();
        prop_assert_eq!(streamed, data);
    }

    /// Tags built from valid text values decode to themselves.
    #[test]
    fn tag_text_round_trip(
        version in version(),
        title in "[A-Za-z0-9 éü]{1,40}",
        artists in prop::collection::vec("[A-Za-z0-9]{1,12}", 1..4),
        unsynchronised in any::<bool>(),
    ) {
        let (title_id, artist_id) = match version {
            Version::V2_2 => ("TT2", "TP1"),
            _ => ("TIT2", "TPE1"),
        };
        let mut tag = Tag::new(version);
        if unsynchronised {
            tag.flags.set(tagline_format::TagFlags::UNSYNCHRONISED);
        }
        tag.set_text(title_id, [title.clone()]).unwrap();
        // ID3v2.2 holds a single string per text frame.
        if version == Version::V2_2 {
            tag.set_text(artist_id, [artists.join(" / ")]).unwrap();
        } else {
            tag.set_text(artist_id, artists.clone()).unwrap();
        }

        let decoded = Tag::decode(&tag.encode(None).unwrap()).unwrap();
        prop_assert_eq!(decoded.friendly("title").unwrap(), title);
        prop_assert_eq!(decoded.friendly("artist").unwrap(), artists.join(" / "));
    }

    /// ID3v1 fields within their widths survive a round trip.
    #[test]
    fn tag1_round_trip(
        title in "[A-Za-z0-9]{0,30}",
        comment in "[A-Za-z0-9]{0,28}",
        track in any::<u8>(),
        genre in any::<u8>(),
    ) {
        let tag = Tag1 { title, comment, track, genre, ..Tag1::default() };
        prop_assert_eq!(Tag1::decode(&tag.encode().unwrap()).unwrap(), tag);
    }
}
