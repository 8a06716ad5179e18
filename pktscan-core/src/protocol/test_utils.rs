//! Test utilities for dissection tests.
//!
//! Frame builders for IPv4, TCP and UDP plus helpers for checking scan
//! results.

use super::ProtocolId;
use crate::packet::PacketState;

/// Ethernet II frame (broadcast destination) carrying `payload`.
pub fn ethernet_frame(ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0xff; 6];
    frame.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
    frame.extend_from_slice(&ethertype.to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Builder for constructing IPv4 headers.
#[derive(Debug, Clone)]
pub struct Ipv4Builder {
    flags_fragment: u16,
    ttl: u8,
    protocol: u8,
    src_ip: [u8; 4],
    dst_ip: [u8; 4],
    options: Vec<u8>,
    payload: Vec<u8>,
}

impl Default for Ipv4Builder {
    fn default() -> Self {
        Self {
            flags_fragment: 0x4000, // DF
            ttl: 64,
            protocol: 6, // TCP
            src_ip: [192, 168, 1, 1],
            dst_ip: [192, 168, 1, 2],
            options: Vec::new(),
            payload: Vec::new(),
        }
    }
}

impl Ipv4Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protocol(mut self, protocol: u8) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn tcp(self) -> Self {
        self.protocol(6)
    }

    pub fn udp(self) -> Self {
        self.protocol(17)
    }

    pub fn flags_fragment(mut self, flags_fragment: u16) -> Self {
        self.flags_fragment = flags_fragment;
        self
    }

    /// Raw option bytes; must be a multiple of 4 long.
    pub fn options(mut self, options: Vec<u8>) -> Self {
        assert_eq!(options.len() % 4, 0, "IPv4 options must fill whole words");
        self.options = options;
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let header_len = 20 + self.options.len();
        let total_length = (header_len + self.payload.len()) as u16;
        let mut header = Vec::with_capacity(header_len + self.payload.len());

        header.push(0x40 | (header_len / 4) as u8); // Version 4, IHL
        header.push(0x00); // DSCP/ECN
        header.extend_from_slice(&total_length.to_be_bytes());
        header.extend_from_slice(&[0x00, 0x01]); // Identification
        header.extend_from_slice(&self.flags_fragment.to_be_bytes());
        header.push(self.ttl);
        header.push(self.protocol);
        header.extend_from_slice(&[0x00, 0x00]); // Checksum (not calculated)
        header.extend_from_slice(&self.src_ip);
        header.extend_from_slice(&self.dst_ip);
        header.extend_from_slice(&self.options);
        header.extend_from_slice(&self.payload);

        header
    }
}

/// Builder for constructing TCP headers.
#[derive(Debug, Clone)]
pub struct TcpBuilder {
    src_port: u16,
    dst_port: u16,
    seq: u32,
    flags: u8,
    options: Vec<u8>,
    payload: Vec<u8>,
}

impl Default for TcpBuilder {
    fn default() -> Self {
        Self {
            src_port: 12345,
            dst_port: 80,
            seq: 1,
            flags: 0x02, // SYN
            options: Vec::new(),
            payload: Vec::new(),
        }
    }
}

impl TcpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src_port(mut self, port: u16) -> Self {
        self.src_port = port;
        self
    }

    pub fn dst_port(mut self, port: u16) -> Self {
        self.dst_port = port;
        self
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn syn(self) -> Self {
        self.flags(0x02)
    }

    pub fn psh_ack(self) -> Self {
        self.flags(0x18)
    }

    /// Raw option bytes; must be a multiple of 4 long.
    pub fn options(mut self, options: Vec<u8>) -> Self {
        assert_eq!(options.len() % 4, 0, "TCP options must fill whole words");
        self.options = options;
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let header_len = 20 + self.options.len();
        let mut header = Vec::with_capacity(header_len + self.payload.len());

        header.extend_from_slice(&self.src_port.to_be_bytes());
        header.extend_from_slice(&self.dst_port.to_be_bytes());
        header.extend_from_slice(&self.seq.to_be_bytes());
        header.extend_from_slice(&0u32.to_be_bytes()); // Ack
        header.push(((header_len / 4) as u8) << 4); // Data offset + reserved
        header.push(self.flags);
        header.extend_from_slice(&65535u16.to_be_bytes()); // Window
        header.extend_from_slice(&[0x00, 0x00]); // Checksum
        header.extend_from_slice(&[0x00, 0x00]); // Urgent pointer
        header.extend_from_slice(&self.options);
        header.extend_from_slice(&self.payload);

        header
    }
}

/// Builder for constructing UDP headers.
#[derive(Debug, Clone)]
pub struct UdpBuilder {
    src_port: u16,
    dst_port: u16,
    payload: Vec<u8>,
}

impl Default for UdpBuilder {
    fn default() -> Self {
        Self {
            src_port: 12345,
            dst_port: 53,
            payload: Vec::new(),
        }
    }
}

impl UdpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src_port(mut self, port: u16) -> Self {
        self.src_port = port;
        self
    }

    pub fn dst_port(mut self, port: u16) -> Self {
        self.dst_port = port;
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let length = 8 + self.payload.len() as u16;
        let mut header = Vec::with_capacity(8 + self.payload.len());

        header.extend_from_slice(&self.src_port.to_be_bytes());
        header.extend_from_slice(&self.dst_port.to_be_bytes());
        header.extend_from_slice(&length.to_be_bytes());
        header.extend_from_slice(&[0x00, 0x00]); // Checksum
        header.extend_from_slice(&self.payload);

        header
    }
}

/// Ethernet + IPv4 + UDP (port 53) frame around `payload`.
pub fn eth_ipv4_udp(payload: &[u8]) -> Vec<u8> {
    let udp = UdpBuilder::new().payload(payload.to_vec()).build();
    let ip = Ipv4Builder::new().udp().payload(udp).build();
    ethernet_frame(0x0800, &ip)
}

/// Assert the `(id, offset, length)` of every record, in order.
pub fn assert_layout(state: &PacketState, expected: &[(ProtocolId, usize, usize)]) {
    let actual: Vec<_> = state.iter().map(|r| (r.id, r.offset, r.length)).collect();
    assert_eq!(actual, expected, "header layout mismatch");
}
