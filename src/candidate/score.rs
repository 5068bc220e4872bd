//! Candidate scoring and filtering.
//!
//! Every prediction gets a combined confidence `objectness * best class
//! score`. Candidates at or below the threshold, or of a class outside the
//! target set, are dropped here so the geometry and NMS stages only see a
//! handful of survivors.

use crate::labels::COCO_LABELS;
use crate::tensor::{ClassScores, OutputTensor, PredictionRecord};
use crate::util::math::clamp_unit;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Class ids a candidate may belong to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassSet {
    /// Every class with a label.
    Any,
    /// Only the listed class ids.
    Only(Vec<usize>),
}

impl ClassSet {
    /// Returns true if `class_id` is in the set and has a label.
    pub fn contains(&self, class_id: usize) -> bool {
        if class_id >= COCO_LABELS.len() {
            return false;
        }
        match self {
            ClassSet::Any => true,
            ClassSet::Only(ids) => ids.contains(&class_id),
        }
    }
}

/// Threshold and class filter applied to each prediction.
#[derive(Clone, Debug)]
pub struct CandidateFilter {
    /// Candidates must score strictly above this value.
    pub confidence_threshold: f32,
    pub classes: ClassSet,
}

/// A prediction that passed the filter, box still normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredCandidate {
    /// Position of the prediction in the tensor.
    pub index: usize,
    pub x_center: f32,
    pub y_center: f32,
    pub w: f32,
    pub h: f32,
    /// Combined confidence in `[0, 1]`.
    pub confidence: f32,
    pub class_id: usize,
}

/// Returns the index and value of the largest score.
///
/// Ties resolve to the lowest index. NaN entries never win against a number,
/// and an empty slice yields `None`.
pub fn argmax_first(scores: impl IntoIterator<Item = f32>) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, score) in scores.into_iter().enumerate() {
        match best {
            Some((_, best_score)) if !(score > best_score || best_score.is_nan()) => {}
            _ => best = Some((idx, score)),
        }
    }
    best
}

fn best_class(scores: &ClassScores<'_>) -> Option<(usize, f32)> {
    argmax_first(scores.iter())
}

/// Scores one record; returns `None` if it is filtered out.
pub fn score_record(
    record: &PredictionRecord<'_>,
    index: usize,
    filter: &CandidateFilter,
) -> Option<ScoredCandidate> {
    let (class_id, class_score) = best_class(&record.class_scores)?;
    if !filter.classes.contains(class_id) {
        return None;
    }
    // Both factors are clamped to [0, 1]; NaN becomes 0 and is dropped.
    let confidence = clamp_unit(record.objectness) * clamp_unit(class_score);
    if !(confidence > filter.confidence_threshold) {
        return None;
    }
    Some(ScoredCandidate {
        index,
        x_center: record.x_center,
        y_center: record.y_center,
        w: record.w,
        h: record.h,
        confidence,
        class_id,
    })
}

/// Scores all predictions, keeping tensor order.
pub fn score_candidates(tensor: &OutputTensor<'_>, filter: &CandidateFilter) -> Vec<ScoredCandidate> {
    tensor
        .records()
        .enumerate()
        .filter_map(|(idx, record)| score_record(&record, idx, filter))
        .collect()
}

/// Parallel variant of [`score_candidates`]; output order is identical.
#[cfg(feature = "rayon")]
pub fn score_candidates_par(
    tensor: &OutputTensor<'_>,
    filter: &CandidateFilter,
) -> Vec<ScoredCandidate> {
    (0..tensor.num_predictions())
        .into_par_iter()
        .filter_map(|idx| {
            let record = tensor.record(idx)?;
            score_record(&record, idx, filter)
        })
        .collect()
}
