//! Fuzz target: inbound MQTT tuning messages
//!
//! Splits the input into a topic and payload, runs it through the
//! inbound queue bounds and the tuning parser, and asserts that any
//! accepted update leaves the parameters in range.
//!
//! cargo fuzz run fuzz_tuning_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use medibox::messaging::InboundMessage;
use medibox::tuning::{TuningParameters, parse_message};

const DEVICE: &str = "medibox_220146A";

fuzz_target!(|data: &[u8]| {
    let (selector, payload) = match data.split_first() {
        Some((s, rest)) => (*s, rest),
        None => return,
    };
    let suffix = ["/Sampling", "/Sending", "/offset", "/control", "/temp", "/other"][usize::from(selector) % 6];
    let topic = format!("{DEVICE}{suffix}");

    let Some(msg) = InboundMessage::new(&topic, payload) else {
        return;
    };
    if let Ok(update) = parse_message(DEVICE, &msg.topic, &msg.payload) {
        let mut params = TuningParameters::default();
        params.apply(update);
        assert!(params.validate().is_ok(), "accepted {update:?} but parameters are out of range");
    }
});
