use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gifparse::Decoder;
use std::io::Cursor;

#[rustfmt::skip]
const SAMPLE: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x0A, 0x00,
    0x0A, 0x00, 0x91, 0x00, 0x00, 0xFF, 0xFF, 0xFF,
    0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00,
    0x00, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x2C, 0x00, 0x00, 0x00, 0x00, 0x0A, 0x00,
    0x0A, 0x00, 0x00, 0x02, 0x16, 0x8C, 0x2D, 0x99,
    0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02, 0x75,
    0xEC, 0x95, 0xFA, 0xA8, 0xDE, 0x60, 0x8C, 0x04,
    0x91, 0x4C, 0x01, 0x00, 0x3B,
];

fn parse_sample(crit: &mut Criterion) {
    crit.bench_function("parse", |b| {
        b.iter(|| {
            let gif = Decoder::new(Cursor::new(black_box(SAMPLE))).parse();
            black_box(gif.unwrap());
        })
    });
}

fn render_sample(crit: &mut Criterion) {
    let gif = Decoder::new(Cursor::new(SAMPLE)).parse().unwrap();
    crit.bench_function("render_frame", |b| {
        b.iter(|| black_box(gif.render_frame(black_box(0)).unwrap()))
    });
    crit.bench_function("render_resized", |b| {
        b.iter(|| black_box(gif.render_resized(0, black_box(4)).unwrap()))
    });
}

criterion_group!(benches, parse_sample, render_sample);
criterion_main!(benches);
