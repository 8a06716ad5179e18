//! Criterion benchmarks for the scan hot path:
//! - `Scanner::scan_into` over common stacks, reusing one `PacketState`
//! - `ProtocolRegistry::dissect_sub_headers` on TCP options

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pktscan_core::protocol::builtin::{ETHERNET, TCP};
use pktscan_core::protocol::dlt::LINKTYPE_ETHERNET;
use pktscan_core::{default_registry, FrameMeta, PacketState, Scanner, SubHeaderContainer};

/// Ethernet + IPv4 + TCP with `options` and `payload_len` zero bytes of payload.
fn make_tcp_packet(dst_port: u16, options: &[u8], payload_len: usize) -> Vec<u8> {
    let tcp_len = 20 + options.len();
    let mut pkt = vec![0u8; 14 + 20 + tcp_len + payload_len];

    // Ethernet header
    pkt[0..6].copy_from_slice(&[0xff; 6]);
    pkt[6..12].copy_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    pkt[12..14].copy_from_slice(&0x0800u16.to_be_bytes());

    // IPv4 header
    let total_len = (20 + tcp_len + payload_len) as u16;
    let ip = &mut pkt[14..34];
    ip[0] = 0x45;
    ip[2..4].copy_from_slice(&total_len.to_be_bytes());
    ip[6] = 0x40; // DF
    ip[8] = 64;
    ip[9] = 6;
    ip[12..16].copy_from_slice(&[10, 0, 0, 1]);
    ip[16..20].copy_from_slice(&[10, 0, 0, 2]);

    // TCP header
    let tcp = &mut pkt[34..34 + tcp_len];
    tcp[0..2].copy_from_slice(&40000u16.to_be_bytes());
    tcp[2..4].copy_from_slice(&dst_port.to_be_bytes());
    tcp[12] = ((tcp_len / 4) as u8) << 4;
    tcp[13] = 0x18; // PSH/ACK
    tcp[20..].copy_from_slice(options);

    pkt
}

/// Ethernet + IPv4 + UDP, payload not matching any binding.
fn make_udp_packet(payload_len: usize) -> Vec<u8> {
    let mut pkt = vec![0u8; 14 + 20 + 8 + payload_len];
    pkt[0..6].copy_from_slice(&[0xff; 6]);
    pkt[12..14].copy_from_slice(&0x0800u16.to_be_bytes());

    let total_len = (28 + payload_len) as u16;
    pkt[14] = 0x45;
    pkt[16..18].copy_from_slice(&total_len.to_be_bytes());
    pkt[22] = 64;
    pkt[23] = 17;

    pkt[34..36].copy_from_slice(&40000u16.to_be_bytes());
    pkt[36..38].copy_from_slice(&53u16.to_be_bytes());
    pkt[38..40].copy_from_slice(&((8 + payload_len) as u16).to_be_bytes());
    pkt
}

const SYN_OPTIONS: [u8; 20] = [
    0x02, 0x04, 0x05, 0xB4, // MSS 1460
    0x04, 0x02, // SACK permitted
    0x08, 0x0A, 0, 0, 0, 1, 0, 0, 0, 0, // Timestamp
    0x01, // NOP
    0x03, 0x03, 0x07, // Window scale 7
];

fn bench_scan(c: &mut Criterion) {
    let registry = default_registry();
    let scanner = Scanner::new(&registry);
    let mut state = PacketState::new();

    let mut http = make_tcp_packet(80, &[], 0);
    http.extend_from_slice(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n");
    let total = (http.len() - 14) as u16;
    http[16..18].copy_from_slice(&total.to_be_bytes());

    let packets = [
        ("udp_64", make_udp_packet(22)),
        ("udp_1500", make_udp_packet(1458)),
        ("tcp_syn_options", make_tcp_packet(443, &SYN_OPTIONS, 0)),
        ("http_request", http),
    ];

    let mut group = c.benchmark_group("scan");
    for (name, packet) in &packets {
        group.throughput(Throughput::Bytes(packet.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), packet, |b, packet| {
            let meta = FrameMeta::new(packet.len(), packet.len());
            b.iter(|| {
                scanner
                    .scan_link(&mut state, black_box(packet), meta, LINKTYPE_ETHERNET)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_sub_headers(c: &mut Criterion) {
    let registry = default_registry();
    let packet = make_tcp_packet(443, &SYN_OPTIONS, 0);
    let state = Scanner::new(&registry)
        .scan(&packet, packet.len(), ETHERNET)
        .unwrap();
    let record = state
        .find(TCP)
        .and_then(|i| state.record(i).ok())
        .copied()
        .unwrap();
    let mut container = SubHeaderContainer::new(TCP);

    c.bench_function("tcp_options", |b| {
        b.iter(|| {
            registry
                .dissect_sub_headers(black_box(&packet), &record, &mut container)
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_scan, bench_sub_headers);
criterion_main!(benches);
