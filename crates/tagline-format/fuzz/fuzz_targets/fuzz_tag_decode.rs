//! Fuzz target for the ID3v2 tag parser.
//!
//! Feeds arbitrary bytes to `Tag::decode` with every iTunes workaround
//! mode. Whatever decodes must also re-encode without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tagline_format::{ItunesWorkaround, ReadOptions, Tag};

fuzz_target!(|data: &[u8]| {
    for itunes_workaround in [ItunesWorkaround::Detect, ItunesWorkaround::Always, ItunesWorkaround::Never] {
        let options = ReadOptions { itunes_workaround };
        let Ok(tag) = Tag::decode_with(data, &options) else {
            continue;
        };
        for frame in tag.frames() {
            let _ = frame.to_string();
        }
        if let Ok(encoded) = tag.encode(None) {
            // Our own output must always parse.
            if !encoded.is_empty() {
                assert!(Tag::decode(&encoded).is_ok());
            }
        }
    }
});
