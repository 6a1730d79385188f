//! Fuzz target: `decode_frame`
//!
//! Any 5-byte DHT22 frame either fails cleanly or decodes to a
//! physically plausible reading.
//!
//! cargo fuzz run fuzz_dht_frame

#![no_main]

use libfuzzer_sys::fuzz_target;
use medibox::sensors::climate::decode_frame;

fuzz_target!(|frame: [u8; 5]| {
    if let Ok(r) = decode_frame(frame) {
        assert!((0.0..=100.0).contains(&r.humidity_pct));
        assert!((-40.0..=80.0).contains(&r.temperature_c));
    }
});
