use yolo_decode::{
    decode_detections, BBox, ClassTargets, DecodeConfig, Decoder, Detection, Layout, ResizeMode,
    TensorFormat,
};

const NUM_CLASSES: usize = 80;
const MODEL_SIZE: f32 = 640.0;

/// Appends one prediction-major record with a single non-zero class score.
fn push_prediction(
    tensor: &mut Vec<f32>,
    corners: [f32; 4],
    objectness: f32,
    class_id: usize,
    score: f32,
) {
    let [x1, y1, x2, y2] = corners;
    tensor.push((x1 + x2) / 2.0 / MODEL_SIZE);
    tensor.push((y1 + y2) / 2.0 / MODEL_SIZE);
    tensor.push((x2 - x1) / MODEL_SIZE);
    tensor.push((y2 - y1) / MODEL_SIZE);
    tensor.push(objectness);
    for c in 0..NUM_CLASSES {
        tensor.push(if c == class_id { score } else { 0.0 });
    }
}

fn assert_bbox_near(det: &Detection, expected: [f32; 4]) {
    for (a, e) in det.bbox.iter().zip(expected.iter()) {
        assert!(
            (a - e).abs() < 1e-3,
            "expected {expected:?}, got {:?}",
            det.bbox
        );
    }
}

#[test]
fn all_zero_objectness_yields_no_detections() {
    let mut tensor = Vec::new();
    for i in 0..50 {
        let offset = i as f32 * 10.0;
        push_prediction(&mut tensor, [offset, 0.0, offset + 40.0, 80.0], 0.0, 0, 0.99);
    }
    let detections = decode_detections(&tensor, 640, 640, &DecodeConfig::default()).unwrap();
    assert!(detections.is_empty());
}

#[test]
fn overlapping_pair_keeps_only_the_stronger_box() {
    let mut tensor = Vec::new();
    push_prediction(&mut tensor, [5.0, 5.0, 95.0, 95.0], 1.0, 0, 0.6);
    push_prediction(&mut tensor, [0.0, 0.0, 100.0, 100.0], 1.0, 0, 0.9);

    let detections = decode_detections(&tensor, 640, 640, &DecodeConfig::default()).unwrap();
    assert_eq!(detections.len(), 1);
    assert!((detections[0].confidence - 0.9).abs() < 1e-6);
    assert_bbox_near(&detections[0], [0.0, 0.0, 100.0, 100.0]);
}

#[test]
fn disjoint_pair_keeps_both_in_confidence_order() {
    let mut tensor = Vec::new();
    push_prediction(&mut tensor, [0.0, 0.0, 50.0, 50.0], 1.0, 0, 0.5);
    push_prediction(&mut tensor, [200.0, 200.0, 250.0, 250.0], 1.0, 0, 0.8);

    let detections = decode_detections(&tensor, 640, 640, &DecodeConfig::default()).unwrap();
    assert_eq!(detections.len(), 2);
    assert_bbox_near(&detections[0], [200.0, 200.0, 250.0, 250.0]);
    assert_bbox_near(&detections[1], [0.0, 0.0, 50.0, 50.0]);
    assert!(detections[0].confidence >= detections[1].confidence);
}

#[test]
fn coordinates_scale_per_axis_to_source() {
    let mut tensor = vec![0.5, 0.5, 0.2, 0.2, 0.9, 0.8];
    tensor.extend(std::iter::repeat(0.0).take(NUM_CLASSES - 1));

    let detections = decode_detections(&tensor, 1280, 960, &DecodeConfig::default()).unwrap();
    assert_eq!(detections.len(), 1);
    assert_bbox_near(&detections[0], [512.0, 384.0, 768.0, 576.0]);
    assert!((detections[0].confidence - 0.72).abs() < 1e-6);
    assert_eq!(detections[0].class_id, 0);
}

#[test]
fn non_person_classes_are_ignored_by_default() {
    let mut tensor = Vec::new();
    push_prediction(&mut tensor, [0.0, 0.0, 100.0, 100.0], 0.9, 2, 0.9);
    push_prediction(&mut tensor, [300.0, 300.0, 400.0, 400.0], 0.9, 0, 0.9);

    let detections = decode_detections(&tensor, 640, 640, &DecodeConfig::default()).unwrap();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].label(), Some("person"));
}

#[test]
fn multi_class_targets_suppress_within_each_class() {
    let mut tensor = Vec::new();
    push_prediction(&mut tensor, [0.0, 0.0, 100.0, 100.0], 1.0, 0, 0.9);
    push_prediction(&mut tensor, [2.0, 2.0, 100.0, 100.0], 1.0, 2, 0.8);
    push_prediction(&mut tensor, [4.0, 4.0, 100.0, 100.0], 1.0, 0, 0.7);

    let cfg = DecodeConfig {
        targets: ClassTargets::Labels(vec!["person".into(), "car".into()]),
        ..DecodeConfig::default()
    };
    let detections = decode_detections(&tensor, 640, 640, &cfg).unwrap();
    let labels: Vec<_> = detections.iter().map(|d| d.label().unwrap()).collect();
    assert_eq!(labels, vec!["person", "car"]);

    let agnostic = DecodeConfig {
        class_agnostic: true,
        ..cfg
    };
    let detections = decode_detections(&tensor, 640, 640, &agnostic).unwrap();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].class_id, 0);
}

#[test]
fn max_detections_truncates_lowest_confidence() {
    let mut tensor = Vec::new();
    for (i, score) in [0.5f32, 0.9, 0.7].iter().enumerate() {
        let x = i as f32 * 200.0;
        push_prediction(&mut tensor, [x, 0.0, x + 100.0, 100.0], 1.0, 0, *score);
    }
    let cfg = DecodeConfig {
        max_detections: Some(2),
        ..DecodeConfig::default()
    };
    let detections = decode_detections(&tensor, 640, 640, &cfg).unwrap();
    let confidences: Vec<f32> = detections.iter().map(|d| d.confidence).collect();
    assert_eq!(confidences, vec![0.9, 0.7]);
}

#[test]
fn degenerate_boxes_are_dropped() {
    let mut tensor = Vec::new();
    push_prediction(&mut tensor, [100.0, 100.0, 100.0, 200.0], 1.0, 0, 0.9);
    push_prediction(&mut tensor, [100.0, 200.0, 150.0, 100.0], 1.0, 0, 0.9);
    let detections = decode_detections(&tensor, 640, 640, &DecodeConfig::default()).unwrap();
    assert!(detections.is_empty());
}

#[test]
fn anchor_free_attribute_major_tensor_decodes() {
    // Same two boxes as the disjoint case, laid out as [84, N] without objectness.
    let boxes = [([0.0f32, 0.0, 50.0, 50.0], 0.5f32), ([200.0, 200.0, 250.0, 250.0], 0.8)];
    let n = boxes.len();
    let vpp = 4 + NUM_CLASSES;
    let mut tensor = vec![0.0f32; vpp * n];
    for (p, ([x1, y1, x2, y2], score)) in boxes.iter().enumerate() {
        tensor[p] = (x1 + x2) / 2.0 / MODEL_SIZE;
        tensor[n + p] = (y1 + y2) / 2.0 / MODEL_SIZE;
        tensor[2 * n + p] = (x2 - x1) / MODEL_SIZE;
        tensor[3 * n + p] = (y2 - y1) / MODEL_SIZE;
        tensor[4 * n + p] = *score;
    }

    let cfg = DecodeConfig {
        format: TensorFormat::anchor_free(NUM_CLASSES),
        ..DecodeConfig::default()
    };
    assert_eq!(cfg.format.layout, Layout::AttributeMajor);
    let detections = decode_detections(&tensor, 640, 640, &cfg).unwrap();
    assert_eq!(detections.len(), 2);
    assert_bbox_near(&detections[0], [200.0, 200.0, 250.0, 250.0]);
    assert!((detections[0].confidence - 0.8).abs() < 1e-6);
}

#[test]
fn letterbox_and_clip_map_into_source_frame() {
    // 1280x640 letterboxed into 640x640: gain 0.5, 160 px bars top and bottom.
    let mut tensor = Vec::new();
    push_prediction(&mut tensor, [100.0, 160.0, 200.0, 260.0], 1.0, 0, 0.9);
    push_prediction(&mut tensor, [400.0, 440.0, 500.0, 520.0], 1.0, 0, 0.8);

    let cfg = DecodeConfig {
        resize: ResizeMode::Letterbox,
        clip_to_source: true,
        ..DecodeConfig::default()
    };
    let detections = decode_detections(&tensor, 1280, 640, &cfg).unwrap();
    assert_eq!(detections.len(), 2);
    assert_bbox_near(&detections[0], [200.0, 0.0, 400.0, 200.0]);
    // Bottom edge reaches into the padding and is clamped.
    assert_bbox_near(&detections[1], [800.0, 560.0, 1000.0, 640.0]);
}

#[test]
fn decoder_is_reusable_across_frames() {
    let decoder = Decoder::new(DecodeConfig::default()).unwrap();
    let mut frame_a = Vec::new();
    push_prediction(&mut frame_a, [0.0, 0.0, 100.0, 100.0], 1.0, 0, 0.9);
    let mut frame_b = Vec::new();
    push_prediction(&mut frame_b, [300.0, 300.0, 400.0, 400.0], 1.0, 0, 0.6);

    let a = decoder.decode(&frame_a, 640, 640).unwrap();
    let b = decoder.decode(&frame_b, 640, 640).unwrap();
    let a_again = decoder.decode(&frame_a, 640, 640).unwrap();
    assert_eq!(a, a_again);
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].to_bbox(), BBox::new(300.0, 300.0, 400.0, 400.0));
}

#[test]
fn decoder_is_shareable_between_threads() {
    let decoder = Decoder::new(DecodeConfig::default()).unwrap();
    let mut tensor = Vec::new();
    push_prediction(&mut tensor, [0.0, 0.0, 100.0, 100.0], 1.0, 0, 0.9);
    let expected = decoder.decode(&tensor, 640, 640).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| decoder.decode(&tensor, 640, 640).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
