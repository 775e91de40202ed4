use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pixfrag::transfer_syntax::{JPEG_BASELINE_1, RLE_LOSSLESS};
use pixfrag::{encapsulate_frames, ItemParser, ParseOptions, SegmentMapper};
use std::io::{Cursor, Read};

fn jpeg_frames(frames: usize, fragments: usize, size: usize) -> Vec<Vec<Vec<u8>>> {
    (0..frames)
        .map(|f| {
            (0..fragments)
                .map(|i| {
                    let mut v = vec![f as u8; size];
                    if i == 0 {
                        v[0] = 0xFF;
                        v[1] = 0xD8;
                    }
                    v
                })
                .collect()
        })
        .collect()
}

fn bench_discovery(c: &mut Criterion) {
    let sniffed = encapsulate_frames(&jpeg_frames(500, 4, 256), false);
    let tabled  = encapsulate_frames(&jpeg_frames(500, 1, 1024), true);

    c.bench_function("discover_500_frames_sniffed", |b| {
        b.iter(|| {
            let opts = ParseOptions::new(500, JPEG_BASELINE_1);
            let mut p = ItemParser::new(Cursor::new(black_box(&sniffed[..])), &opts).unwrap();
            p.first_fragment_of(499).unwrap()
        })
    });

    c.bench_function("open_500_frames_with_table", |b| {
        b.iter(|| {
            let opts = ParseOptions::new(500, RLE_LOSSLESS);
            ItemParser::new(Cursor::new(black_box(&tabled[..])), &opts).unwrap()
        })
    });
}

fn bench_resolve(c: &mut Criterion) {
    let frames = vec![(0..2000).map(|i| vec![i as u8; 512]).collect::<Vec<_>>()];
    let bytes = encapsulate_frames(&frames, false);
    let mut parser = ItemParser::new(Cursor::new(bytes), &ParseOptions::default()).unwrap();
    parser.discover_all().unwrap();

    c.bench_function("resolve_2000_fragments", |b| {
        let mut pos = 0u64;
        b.iter(|| {
            pos = (pos + 7919) % (2000 * 512);
            parser.stream_segment(black_box(pos), 4096).unwrap()
        })
    });

    c.bench_function("segmented_read_1mb", |b| {
        let mut buf = vec![0u8; 64 * 1024];
        b.iter(|| {
            let mut cursor = parser.segmented();
            let mut total = 0;
            loop {
                let n = cursor.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                total += n;
            }
            total
        })
    });
}

criterion_group!(benches, bench_discovery, bench_resolve);
criterion_main!(benches);
