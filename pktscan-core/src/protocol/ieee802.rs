//! IEEE 802.3 framing, 802.2 LLC and SNAP.
//!
//! An Ethernet frame whose type field is a length (at most 1500) carries an
//! LLC header next; LLC with DSAP/SSAP `0xAA` is followed by SNAP, which ends
//! with an ordinary ethertype.

use super::binding::{BindContext, BindingRule, Predicate};
use super::builtin::{ETHERNET, IEEE_802DOT1Q, IEEE_802DOT2, IEEE_802DOT3, IEEE_SNAP};
use super::descriptor::{HeaderDescriptor, HeaderLength};
use super::ethernet::{trailer_length, ETHERNET_HEADER_LEN, MAX_8023_LENGTH};

/// DSAP/SSAP value announcing a SNAP header.
pub const SAP_SNAP: u8 = 0xAA;

/// SNAP header: 3-byte OUI and an ethertype.
pub const SNAP_HEADER_LEN: usize = 5;

/// Unnumbered-format LLC control fields are one byte; I and S formats two.
fn llc_length(data: &[u8], offset: usize) -> Option<usize> {
    let control = *data.get(offset + 2)?;
    Some(if control & 0x03 == 0x03 { 3 } else { 4 })
}

/// Parent's last two bytes hold an 802.3 length, not an ethertype.
fn follows_length_field(ctx: &BindContext<'_>) -> bool {
    let header = ctx.parent_header();
    header.len() >= 2
        && ctx
            .parent_u16(header.len() - 2)
            .is_some_and(|value| value <= MAX_8023_LENGTH)
}

const LLC_BINDINGS: &[BindingRule] = &[
    BindingRule::new(IEEE_802DOT3, Predicate::Always),
    BindingRule::new(ETHERNET, Predicate::Fn(follows_length_field)),
    BindingRule::new(IEEE_802DOT1Q, Predicate::Fn(follows_length_field)),
];

const SNAP_BINDINGS: &[BindingRule] = &[BindingRule::new(
    IEEE_802DOT2,
    Predicate::parent_u16(0, u16::from_be_bytes([SAP_SNAP, SAP_SNAP])),
)];

/// 802.3 frame header, as the first header of an IEEE 802 capture.
pub fn dot3_descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(
        IEEE_802DOT3,
        "ieee802dot3",
        HeaderLength::Fixed(ETHERNET_HEADER_LEN),
    )
    .display_name("IEEE 802.3")
    .postfix(trailer_length)
}

pub fn llc_descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(IEEE_802DOT2, "llc", HeaderLength::Computed(llc_length))
        .display_name("IEEE 802.2 LLC")
        .bindings(LLC_BINDINGS)
}

pub fn snap_descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(IEEE_SNAP, "snap", HeaderLength::Fixed(SNAP_HEADER_LEN))
        .display_name("SNAP")
        .bindings(SNAP_BINDINGS)
}
