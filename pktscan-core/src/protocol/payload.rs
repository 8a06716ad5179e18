//! Catch-all descriptor for bytes no binding claims.

use super::builtin::PAYLOAD;
use super::descriptor::{HeaderDescriptor, HeaderLength};
use crate::packet::HeaderFlags;

/// Everything up to the effective end of the capture.
fn remaining_length(data: &[u8], offset: usize) -> Option<usize> {
    Some(data.len().saturating_sub(offset))
}

fn classify(_header: &[u8]) -> HeaderFlags {
    HeaderFlags::PAYLOAD
}

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(PAYLOAD, "payload", HeaderLength::Computed(remaining_length))
        .display_name("Payload")
        .classify(classify)
}
