//! Fuzz target for the scan loop.
//!
//! The first input byte picks a link type and the rest is the captured
//! frame. Besides not panicking, every scan must leave a state whose
//! records are ordered, inside the capture, and consistent with the
//! reported outcome.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pktscan_core::protocol::dlt;
use pktscan_core::{default_registry, FrameMeta, PacketState, ScanOutcome, Scanner};

const LINK_TYPES: [u32; 6] = [
    dlt::LINKTYPE_ETHERNET,
    dlt::LINKTYPE_LINUX_SLL,
    dlt::LINKTYPE_RAW,
    dlt::LINKTYPE_NULL,
    dlt::LINKTYPE_PPP,
    dlt::LINKTYPE_IEEE802,
];

fuzz_target!(|data: &[u8]| {
    let Some((&selector, frame)) = data.split_first() else {
        return;
    };
    let link_type = LINK_TYPES[usize::from(selector) % LINK_TYPES.len()];

    let registry = default_registry();
    let scanner = Scanner::new(&registry);
    let mut state = PacketState::new();
    let meta = FrameMeta::new(frame.len(), frame.len());
    let outcome = scanner
        .scan_link(&mut state, frame, meta, link_type)
        .expect("built-in link types always resolve");

    let mut last_offset = 0;
    for (i, record) in state.iter().enumerate() {
        assert!(record.offset >= last_offset, "record {i} goes backwards");
        assert!(record.offset <= frame.len(), "record {i} starts past the capture");
        if !record.is_truncated() {
            assert!(record.end() <= frame.len(), "record {i} ends past the capture");
        }
        last_offset = record.offset;
    }

    match outcome {
        ScanOutcome::Truncated => assert!(state.iter().last().is_some_and(|r| r.is_truncated())),
        ScanOutcome::Payload => assert!(state.iter().last().is_some_and(|r| r.is_payload())),
        ScanOutcome::MaxDepth | ScanOutcome::End => {}
    }
    assert!(state.cursor() <= frame.len());
    for view in state.views(frame) {
        let _ = (view.header(), view.gap(), view.payload());
    }
});
