//! ICMP header descriptor.

use super::binding::{BindContext, BindingRule, Predicate};
use super::builtin::{ICMP, IPV4};
use super::descriptor::{HeaderDescriptor, HeaderLength};
use super::ipv4::{self, ip_proto};

/// Type, code, checksum and the 4-byte rest-of-header.
pub const ICMP_HEADER_LEN: usize = 8;

fn over_ipv4(ctx: &BindContext<'_>) -> bool {
    ipv4::carries(ctx, ip_proto::ICMP)
}

const BINDINGS: &[BindingRule] = &[BindingRule::new(IPV4, Predicate::Fn(over_ipv4))];

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(ICMP, "icmp", HeaderLength::Fixed(ICMP_HEADER_LEN))
        .display_name("ICMP")
        .bindings(BINDINGS)
}
