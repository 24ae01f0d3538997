//! Fuzz target for unsynchronisation.
//!
//! Decoding must accept any input, and encoding must round trip.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tagline_format::bytes::{unsync_decode, unsync_encode};

fuzz_target!(|data: &[u8]| {
    let _ = unsync_decode(data);
    assert_eq!(unsync_decode(&unsync_encode(data)), data);
});
