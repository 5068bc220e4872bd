use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use yolo_decode::lowlevel::{nms, BBox};
use yolo_decode::{ClassTargets, DecodeConfig, Decoder, TensorFormat};

/// Deterministic pseudo-random tensor in `[0, 1)`.
fn make_tensor(predictions: usize, vpp: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(predictions * vpp);
    for p in 0..predictions {
        for a in 0..vpp {
            let value = ((p * 131 + a * 17) ^ (p * a)) % 1000;
            data.push(value as f32 / 1000.0);
        }
    }
    data
}

fn make_boxes(count: usize) -> (Vec<BBox>, Vec<f32>) {
    let mut boxes = Vec::with_capacity(count);
    let mut scores = Vec::with_capacity(count);
    for i in 0..count {
        let x = (i % 16) as f32 * 30.0;
        let y = (i / 16) as f32 * 30.0;
        boxes.push(BBox::new(x, y, x + 50.0, y + 60.0));
        scores.push(1.0 - (i as f32 * 0.37) % 1.0);
    }
    (boxes, scores)
}

fn bench_decode(c: &mut Criterion) {
    let person = make_tensor(8400, 85);
    let decoder = Decoder::new(DecodeConfig::default()).unwrap();
    c.bench_function("decode_8400_person", |b| {
        b.iter(|| black_box(decoder.decode(&person, 1920, 1080).unwrap()));
    });

    let anchor_free = make_tensor(8400, 84);
    let all_classes = Decoder::new(DecodeConfig {
        format: TensorFormat::anchor_free(80),
        targets: ClassTargets::All,
        ..DecodeConfig::default()
    })
    .unwrap();
    c.bench_function("decode_8400_all_classes_attribute_major", |b| {
        b.iter(|| black_box(all_classes.decode(&anchor_free, 1920, 1080).unwrap()));
    });

    let (boxes, scores) = make_boxes(300);
    c.bench_function("nms_300", |b| {
        b.iter(|| black_box(nms(&boxes, &scores, 0.45).unwrap()));
    });
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
