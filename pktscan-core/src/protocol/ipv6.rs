//! IPv6 header descriptor.
//!
//! Only the fixed 40-byte header is recognized. Extension headers are not
//! walked, so a next-header value without a binding leaves the rest as
//! payload.

use super::binding::{BindContext, BindingRule, Predicate};
use super::builtin::{ETHERNET, IEEE_802DOT1Q, IEEE_SNAP, IPV4, IPV6, NULL_HEADER, PPP, SLL};
use super::descriptor::{HeaderDescriptor, HeaderLength};
use super::ethernet::ethertype;
use super::ipv4::{self, ip_proto};
use super::{null, ppp};

/// Fixed IPv6 header.
pub const IPV6_HEADER_LEN: usize = 40;

fn six_in_four(ctx: &BindContext<'_>) -> bool {
    ipv4::carries(ctx, ip_proto::IPV6)
}

const BINDINGS: &[BindingRule] = &[
    BindingRule::new(ETHERNET, Predicate::ethertype(ethertype::IPV6)),
    BindingRule::new(IEEE_802DOT1Q, Predicate::ethertype(ethertype::IPV6)),
    BindingRule::new(IEEE_SNAP, Predicate::ethertype(ethertype::IPV6)),
    BindingRule::new(SLL, Predicate::ethertype(ethertype::IPV6)),
    BindingRule::new(PPP, Predicate::ethertype(ppp::PPP_IPV6)),
    BindingRule::new(NULL_HEADER, Predicate::Fn(null::carries_ipv6)),
    BindingRule::new(IPV4, Predicate::Fn(six_in_four)),
    BindingRule::new(IPV6, Predicate::parent_u8(6, ip_proto::IPV6)),
];

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(IPV6, "ipv6", HeaderLength::Fixed(IPV6_HEADER_LEN))
        .display_name("IPv6")
        .bindings(BINDINGS)
}
