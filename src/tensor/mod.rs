//! Borrowed views over raw detector output.
//!
//! `OutputTensor` wraps the flat `f32` buffer returned by the inference
//! engine and slices it into fixed-stride prediction records. Nothing is
//! copied: records borrow the buffer and class scores are exposed through a
//! strided view so both prediction-major and attribute-major layouts decode
//! the same way.

mod format;

pub use format::{Layout, TensorFormat, BOX_VALUES, MIN_VALUES_PER_PREDICTION};

use crate::util::{DecodeError, DecodeResult};

/// Borrowed, immutable view of a detection output tensor.
#[derive(Clone, Copy, Debug)]
pub struct OutputTensor<'a> {
    data: &'a [f32],
    format: TensorFormat,
    num_predictions: usize,
}

impl<'a> OutputTensor<'a> {
    /// Creates a view over `data` interpreted with `format`.
    pub fn new(data: &'a [f32], format: TensorFormat) -> DecodeResult<Self> {
        format.validate()?;
        let values_per_prediction = format.values_per_prediction();
        if data.len() % values_per_prediction != 0 {
            return Err(DecodeError::MalformedTensor {
                len: data.len(),
                values_per_prediction,
            });
        }
        Ok(Self {
            data,
            format,
            num_predictions: data.len() / values_per_prediction,
        })
    }

    /// Creates a prediction-major view with objectness, where each record
    /// holds `values_per_prediction` values.
    pub fn with_values_per_prediction(
        data: &'a [f32],
        values_per_prediction: usize,
    ) -> DecodeResult<Self> {
        let format = TensorFormat::from_values_per_prediction(values_per_prediction)?;
        Self::new(data, format)
    }

    /// Returns the number of prediction records.
    pub fn num_predictions(&self) -> usize {
        self.num_predictions
    }

    /// Returns the width of one prediction record.
    pub fn values_per_prediction(&self) -> usize {
        self.format.values_per_prediction()
    }

    /// Returns the format the buffer is read with.
    pub fn format(&self) -> TensorFormat {
        self.format
    }

    /// Returns the backing slice.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns true if the tensor holds no predictions.
    pub fn is_empty(&self) -> bool {
        self.num_predictions == 0
    }

    /// Returns prediction `index`, if it exists.
    pub fn record(&self, index: usize) -> Option<PredictionRecord<'a>> {
        if index >= self.num_predictions {
            return None;
        }
        let (base, step) = match self.format.layout {
            Layout::PredictionMajor => (index * self.values_per_prediction(), 1),
            Layout::AttributeMajor => (index, self.num_predictions),
        };
        let at = |attr: usize| self.data[base + attr * step];
        let objectness = if self.format.has_objectness {
            at(BOX_VALUES)
        } else {
            1.0
        };
        Some(PredictionRecord {
            x_center: at(0),
            y_center: at(1),
            w: at(2),
            h: at(3),
            objectness,
            class_scores: ClassScores {
                data: self.data,
                start: base + self.format.class_offset() * step,
                step,
                len: self.format.num_classes,
            },
        })
    }

    /// Iterates over all prediction records in tensor order.
    pub fn records(&self) -> impl Iterator<Item = PredictionRecord<'a>> + 'a {
        let tensor = *self;
        (0..tensor.num_predictions).filter_map(move |idx| tensor.record(idx))
    }
}

/// One candidate prediction, normalized to the network input size.
#[derive(Clone, Copy, Debug)]
pub struct PredictionRecord<'a> {
    pub x_center: f32,
    pub y_center: f32,
    pub w: f32,
    pub h: f32,
    /// Probability that the region holds any object; 1 for heads without an
    /// objectness output.
    pub objectness: f32,
    pub class_scores: ClassScores<'a>,
}

/// Strided view of the class scores of one prediction.
#[derive(Clone, Copy, Debug)]
pub struct ClassScores<'a> {
    data: &'a [f32],
    start: usize,
    step: usize,
    len: usize,
}

impl<'a> ClassScores<'a> {
    /// Number of class scores.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if there are no class scores.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the score for `class_id`, if it exists.
    pub fn get(&self, class_id: usize) -> Option<f32> {
        if class_id >= self.len {
            return None;
        }
        self.data.get(self.start + class_id * self.step).copied()
    }

    /// Iterates over the scores in class order.
    pub fn iter(&self) -> impl Iterator<Item = f32> + 'a {
        let ClassScores {
            data,
            start,
            step,
            len,
        } = *self;
        (0..len).map(move |c| data[start + c * step])
    }
}

/// Slices a prediction-major buffer with objectness into records.
pub fn decode_records(
    data: &[f32],
    values_per_prediction: usize,
) -> DecodeResult<Vec<PredictionRecord<'_>>> {
    let tensor = OutputTensor::with_values_per_prediction(data, values_per_prediction)?;
    Ok(tensor.records().collect())
}
