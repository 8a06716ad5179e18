//! Fuzz target for IPv4 and TCP option indexing.
//!
//! Fuzz data becomes the options area of an IPv4 header (even first byte)
//! or a TCP header (odd first byte). Every indexed option must lie inside
//! the header it was found in.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pktscan_core::protocol::builtin::{IPV4, TCP};
use pktscan_core::{default_registry, HeaderRecord, SubHeaderContainer};

fuzz_target!(|data: &[u8]| {
    let Some((&selector, options)) = data.split_first() else {
        return;
    };
    let options = &options[..options.len().min(40)];
    let padded = (options.len() + 3) & !3;

    let mut header = vec![0u8; 20 + padded];
    let id = if selector % 2 == 0 {
        header[0] = 0x40 | ((header.len() / 4) as u8);
        IPV4
    } else {
        header[12] = ((header.len() / 4) as u8) << 4;
        TCP
    };
    header[20..20 + options.len()].copy_from_slice(options);

    let registry = default_registry();
    let record = HeaderRecord::new(id, 0, header.len());
    let mut container = SubHeaderContainer::new(id);
    let count = registry
        .dissect_sub_headers(&header, &record, &mut container)
        .expect("built-in protocol");

    assert_eq!(count, container.count());
    assert_eq!(count, container.bitmap().count_ones() as usize);
    for (_, offset, length) in container.iter() {
        assert!(offset >= 20);
        assert!(offset + length <= header.len());
    }
});
