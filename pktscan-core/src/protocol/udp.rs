//! UDP header descriptor.

use super::binding::{BindContext, BindingRule, Predicate};
use super::builtin::{IPV4, IPV6, UDP};
use super::descriptor::{HeaderDescriptor, HeaderLength};
use super::ipv4::{self, ip_proto};

/// UDP header is always 8 bytes.
pub const UDP_HEADER_LEN: usize = 8;

fn over_ipv4(ctx: &BindContext<'_>) -> bool {
    ipv4::carries(ctx, ip_proto::UDP)
}

const BINDINGS: &[BindingRule] = &[
    BindingRule::new(IPV4, Predicate::Fn(over_ipv4)),
    BindingRule::new(IPV6, Predicate::parent_u8(6, ip_proto::UDP)),
];

/// True if the transport parent's source or destination port is `port`.
///
/// Shared by the TCP and UDP children, whose ports sit at the same offsets.
pub fn uses_port(ctx: &BindContext<'_>, port: u16) -> bool {
    ctx.parent_u16(0) == Some(port) || ctx.parent_u16(2) == Some(port)
}

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(UDP, "udp", HeaderLength::Fixed(UDP_HEADER_LEN))
        .display_name("UDP")
        .bindings(BINDINGS)
}
