//! Candidate selection and pruning.
//!
//! Includes per-prediction scoring/filtering and greedy non-maximum
//! suppression.

pub mod nms;
pub mod score;

pub use nms::{nms, nms_by_class};
#[cfg(feature = "rayon")]
pub use score::score_candidates_par;
pub use score::{
    argmax_first, score_candidates, score_record, CandidateFilter, ClassSet, ScoredCandidate,
};
