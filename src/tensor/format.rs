//! Tensor layout descriptors.

use crate::util::{DecodeError, DecodeResult};

/// Number of box parameters at the start of every prediction.
pub const BOX_VALUES: usize = 4;

/// Smallest usable prediction: four box values, objectness and one class.
pub const MIN_VALUES_PER_PREDICTION: usize = BOX_VALUES + 2;

/// Memory order of the prediction matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Layout {
    /// `[num_predictions, values_per_prediction]`: each prediction is a
    /// contiguous run of values.
    #[default]
    PredictionMajor,
    /// `[values_per_prediction, num_predictions]`: each attribute is a
    /// contiguous row, as emitted by transposed detection heads.
    AttributeMajor,
}

/// Shape of one prediction record in the output tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TensorFormat {
    /// Number of class scores per prediction.
    pub num_classes: usize,
    /// Whether an objectness value follows the box parameters. Heads without
    /// one are scored with an implicit objectness of 1.
    pub has_objectness: bool,
    /// Memory order of the buffer.
    pub layout: Layout,
}

impl Default for TensorFormat {
    fn default() -> Self {
        Self::with_objectness(80)
    }
}

impl TensorFormat {
    /// Prediction-major records `[x, y, w, h, objectness, classes...]`.
    pub fn with_objectness(num_classes: usize) -> Self {
        Self {
            num_classes,
            has_objectness: true,
            layout: Layout::PredictionMajor,
        }
    }

    /// Attribute-major records `[x, y, w, h, classes...]` with no objectness.
    pub fn anchor_free(num_classes: usize) -> Self {
        Self {
            num_classes,
            has_objectness: false,
            layout: Layout::AttributeMajor,
        }
    }

    /// YOLOv8-style head: 80 COCO classes, no objectness, `[84, N]`.
    pub fn yolov8() -> Self {
        Self::anchor_free(80)
    }

    /// Prediction-major format with objectness, inferred from the record
    /// width.
    pub fn from_values_per_prediction(values_per_prediction: usize) -> DecodeResult<Self> {
        if values_per_prediction < MIN_VALUES_PER_PREDICTION {
            return Err(DecodeError::PredictionTooShort {
                values_per_prediction,
                min: MIN_VALUES_PER_PREDICTION,
            });
        }
        Ok(Self::with_objectness(
            values_per_prediction - BOX_VALUES - 1,
        ))
    }

    /// Returns a copy with a different layout.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Offset of the first class score within a record.
    pub fn class_offset(&self) -> usize {
        BOX_VALUES + usize::from(self.has_objectness)
    }

    /// Values per prediction record.
    pub fn values_per_prediction(&self) -> usize {
        self.class_offset() + self.num_classes
    }

    /// Checks that a record can hold at least one class score.
    pub fn validate(&self) -> DecodeResult<()> {
        if self.num_classes == 0 {
            return Err(DecodeError::PredictionTooShort {
                values_per_prediction: self.values_per_prediction(),
                min: self.class_offset() + 1,
            });
        }
        Ok(())
    }
}
