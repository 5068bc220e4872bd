//! Error types for yolo-decode.

use thiserror::Error;

/// Result alias for decoding operations.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Errors that can occur while decoding a detection tensor.
///
/// Candidates dropped by the confidence, class or geometry filters are not
/// errors; they simply do not appear in the output.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DecodeError {
    /// The tensor length is not a whole number of predictions.
    #[error("malformed tensor: length {len} is not a multiple of {values_per_prediction}")]
    MalformedTensor {
        len: usize,
        values_per_prediction: usize,
    },
    /// Each prediction needs four box values, objectness and one class score.
    #[error("malformed tensor: {values_per_prediction} values per prediction, need at least {min}")]
    PredictionTooShort {
        values_per_prediction: usize,
        min: usize,
    },
    /// Thresholds, sizes or class targets are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    /// Target class name missing from the label table.
    #[error("invalid configuration: unknown class label {0:?}")]
    UnknownLabel(String),
    /// Parallel box and score slices differ in length.
    #[error("length mismatch: {boxes} boxes vs {scores} scores")]
    LengthMismatch { boxes: usize, scores: usize },
    /// Image decoding failed (feature `image-io`).
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}

impl DecodeError {
    /// Returns true for the tensor-shape failures.
    pub fn is_malformed_tensor(&self) -> bool {
        matches!(
            self,
            DecodeError::MalformedTensor { .. } | DecodeError::PredictionTooShort { .. }
        )
    }

    /// Returns true for configuration failures raised before tensor work.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(
            self,
            DecodeError::InvalidConfiguration(_) | DecodeError::UnknownLabel(_)
        )
    }
}
