//! Fuzz target for the ID3v1 codec.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tagline_format::Tag1;

fuzz_target!(|data: &[u8]| {
    if let Ok(tag) = Tag1::decode(data) {
        let _ = tag.genre_name();
        // Decoded text is latin-1, so it always encodes again.
        let encoded = tag.encode().unwrap_or_else(|e| panic!("re-encoding decoded tag: {e}"));
        assert_eq!(Tag1::decode(&encoded).ok().map(|t| t.genre), Some(tag.genre));
    }
});
