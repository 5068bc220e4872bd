//! Low-level building blocks for custom post-processing pipelines.
//!
//! These expose the individual stages behind `decode_detections`: record
//! slicing, scoring, coordinate mapping and suppression. Most users should
//! prefer the top-level `Decoder` and `decode_detections`.

#[cfg(feature = "rayon")]
pub use crate::candidate::score_candidates_par;
pub use crate::candidate::{
    argmax_first, nms, nms_by_class, score_candidates, score_record, CandidateFilter, ClassSet,
    ScoredCandidate,
};
pub use crate::geometry::BBox;
pub use crate::mapping::{CoordinateMapper, ResizeMode};
pub use crate::tensor::{decode_records, ClassScores, OutputTensor, PredictionRecord};
