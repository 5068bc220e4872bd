//! Greedy non-maximum suppression over axis-aligned boxes.

use crate::geometry::{iou_with_areas, BBox};
use crate::util::{DecodeError, DecodeResult};

/// Indices of `scores` sorted by descending score.
///
/// The sort is stable, so equal scores keep their input order.
pub(crate) fn order_desc(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}

/// Applies greedy NMS and returns the kept indices, highest score first.
///
/// A box is suppressed when its IOU with an already kept box is strictly
/// greater than `iou_threshold`.
pub fn nms(boxes: &[BBox], scores: &[f32], iou_threshold: f32) -> DecodeResult<Vec<usize>> {
    check_lengths(boxes, scores)?;
    Ok(suppress(boxes, scores, iou_threshold, |_, _| true))
}

/// Per-class NMS: boxes only suppress boxes of the same class.
///
/// Output order is the global descending score order.
pub fn nms_by_class(
    boxes: &[BBox],
    scores: &[f32],
    class_ids: &[usize],
    iou_threshold: f32,
) -> DecodeResult<Vec<usize>> {
    check_lengths(boxes, scores)?;
    if class_ids.len() != boxes.len() {
        return Err(DecodeError::LengthMismatch {
            boxes: boxes.len(),
            scores: class_ids.len(),
        });
    }
    Ok(suppress(boxes, scores, iou_threshold, |i, j| {
        class_ids[i] == class_ids[j]
    }))
}

fn check_lengths(boxes: &[BBox], scores: &[f32]) -> DecodeResult<()> {
    if boxes.len() != scores.len() {
        return Err(DecodeError::LengthMismatch {
            boxes: boxes.len(),
            scores: scores.len(),
        });
    }
    Ok(())
}

fn suppress<F>(boxes: &[BBox], scores: &[f32], iou_threshold: f32, competes: F) -> Vec<usize>
where
    F: Fn(usize, usize) -> bool,
{
    let areas: Vec<f32> = boxes.iter().map(BBox::area).collect();
    let order = order_desc(scores);
    let mut suppressed = vec![false; boxes.len()];
    let mut keep = Vec::new();

    for (rank, &i) in order.iter().enumerate() {
        if suppressed[i] {
            continue;
        }
        keep.push(i);
        for &j in &order[rank + 1..] {
            if suppressed[j] || !competes(i, j) {
                continue;
            }
            if iou_with_areas(&boxes[i], areas[i], &boxes[j], areas[j]) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    keep
}
