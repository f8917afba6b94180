// SPDX-License-Identifier: MIT

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wol_core::decoder::{build_magic_payload, decode_magic_payload};
use wol_core::mac::MacAddress;

fn bench_decode(c: &mut Criterion) {
    let mac = MacAddress::parse_lenient("52:54:00:12:34:56").unwrap();
    let payload = build_magic_payload(&mac);

    c.bench_function("decode_magic_payload/well_formed", |b| {
        b.iter(|| decode_magic_payload(black_box(&payload)))
    });

    let mut garbage = payload.clone();
    garbage[0] = 0x00;
    c.bench_function("decode_magic_payload/rejected_on_header", |b| {
        b.iter(|| decode_magic_payload(black_box(&garbage)))
    });
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
