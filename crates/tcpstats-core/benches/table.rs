//! Criterion benchmarks for tcpstats-core
//!
//! Run with: cargo bench -p tcpstats-core

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tcpstats_core::{decode_address_port, NopSink, TcpStats};

const HEADER: &str = "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode\n";

/// Busy server: a few listeners, many accepted connections, some closing.
fn synthetic_table(rows: u32) -> String {
    let mut text = String::from(HEADER);
    for sl in 0..rows {
        let port = [0x0050, 0x01BB, 0x1F90, 0x1F45][(sl % 4) as usize];
        let state = match sl % 16 {
            0 => "0A",
            1..=11 => "01",
            12 | 13 => "06",
            _ => "08",
        };
        text.push_str(&format!(
            "{sl:5}: 0100007F:{port:04X} {remote:08X}:{rport:04X} {state} {tx:08X}:{rx:08X} 00:00000000 00000000  1000        0 {inode} 1 0000000000000000 20 4 30 10 -1\n",
            remote = 0x0A00_0000u32 + sl,
            rport = 30000 + (sl % 30000),
            tx = sl % 7,
            rx = sl % 13,
            inode = 100_000 + sl,
        ));
    }
    text
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(1));

    group.bench_function("address_port", |b| {
        b.iter(|| decode_address_port(black_box("0100007F:1F90")));
    });

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for rows in [100u32, 10_000] {
        let text = synthetic_table(rows);
        group.throughput(Throughput::Elements(u64::from(rows)));

        let all = TcpStats::new("bench", "", NopSink);
        group.bench_function(format!("unfiltered_{rows}"), |b| {
            b.iter(|| all.read_from(black_box(text.as_bytes())));
        });

        let filtered = TcpStats::new("bench", "443", NopSink);
        group.bench_function(format!("filtered_{rows}"), |b| {
            b.iter(|| filtered.read_from(black_box(text.as_bytes())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_aggregate);
criterion_main!(benches);
