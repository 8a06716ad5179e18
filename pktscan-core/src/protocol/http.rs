//! HTTP/1.x message header descriptor.
//!
//! The header spans the start line and header fields up to and including the
//! blank line. If the blank line is not in the captured bytes the header's
//! length cannot be decided and the record is marked truncated.

use super::binding::{BindContext, BindingRule, Predicate};
use super::builtin::{HTTP, TCP};
use super::descriptor::{HeaderDescriptor, HeaderLength};
use super::udp::uses_port;

/// Ports on which HTTP is bound without a heuristic.
pub const HTTP_PORTS: &[u16] = &[80, 8080, 8081];

const REQUEST_PREFIXES: &[&[u8]] = &[
    b"GET ",
    b"POST ",
    b"HEAD ",
    b"PUT ",
    b"DELETE ",
    b"OPTIONS ",
    b"PATCH ",
    b"CONNECT ",
    b"TRACE ",
];

const RESPONSE_PREFIX: &[u8] = b"HTTP/1.";

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Starts with a request method or a status line.
pub fn looks_like_http(data: &[u8]) -> bool {
    data.starts_with(RESPONSE_PREFIX) || REQUEST_PREFIXES.iter().any(|p| data.starts_with(p))
}

fn header_length(data: &[u8], offset: usize) -> Option<usize> {
    let message = data.get(offset..)?;
    message
        .windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
        .map(|pos| pos + HEADER_TERMINATOR.len())
}

fn on_http_port(ctx: &BindContext<'_>) -> bool {
    HTTP_PORTS.iter().any(|&port| uses_port(ctx, port)) && looks_like_http(ctx.remaining())
}

fn anywhere_over_tcp(ctx: &BindContext<'_>) -> bool {
    looks_like_http(ctx.remaining())
}

const BINDINGS: &[BindingRule] = &[BindingRule::new(TCP, Predicate::Fn(on_http_port))];

const HEURISTICS: &[BindingRule] = &[BindingRule::new(TCP, Predicate::Fn(anywhere_over_tcp))];

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(HTTP, "http", HeaderLength::Computed(header_length))
        .display_name("HTTP")
        .bindings(BINDINGS)
        .heuristics(HEURISTICS)
}
