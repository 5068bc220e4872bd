//! End-to-end decoding: tensor to deduplicated source-space detections.
//!
//! `decode_detections` runs the four stages in order: record slicing,
//! scoring/filtering, coordinate mapping and NMS. `Decoder` validates a
//! configuration once and can then be reused for every frame of a stream,
//! from any number of threads.

#[cfg(feature = "rayon")]
use crate::candidate::score_candidates_par;
use crate::candidate::{
    nms, nms_by_class, score_candidates, CandidateFilter, ClassSet, ScoredCandidate,
};
use crate::geometry::BBox;
use crate::labels::{class_id_of, label_name, COCO_LABELS};
use crate::mapping::{CoordinateMapper, ResizeMode};
use crate::tensor::{OutputTensor, TensorFormat};
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::math::is_unit_interval;
use crate::util::{DecodeError, DecodeResult};

/// A detected object in source-image pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Corners `[x1, y1, x2, y2]` with `x1 < x2` and `y1 < y2`.
    pub bbox: [f32; 4],
    /// Combined confidence in `[0, 1]`.
    pub confidence: f32,
    /// Index into [`COCO_LABELS`].
    pub class_id: usize,
}

impl Detection {
    /// Returns the class label.
    pub fn label(&self) -> Option<&'static str> {
        label_name(self.class_id)
    }

    /// Returns the corners as a [`BBox`].
    pub fn to_bbox(&self) -> BBox {
        BBox::from_array(self.bbox)
    }
}

/// Which classes survive the filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassTargets {
    /// Every labeled class.
    All,
    /// Classes named in the label table.
    Labels(Vec<String>),
    /// Raw class ids.
    Ids(Vec<usize>),
}

impl Default for ClassTargets {
    fn default() -> Self {
        ClassTargets::Labels(vec!["person".to_string()])
    }
}

/// Decoding parameters.
#[derive(Clone, Debug)]
pub struct DecodeConfig {
    /// Candidates must score strictly above this combined confidence.
    pub confidence_threshold: f32,
    /// Boxes overlapping a kept box by more than this IOU are dropped.
    pub iou_threshold: f32,
    /// Side of the square network input, in pixels. Must match the model.
    pub model_input_size: u32,
    pub targets: ClassTargets,
    pub format: TensorFormat,
    pub resize: ResizeMode,
    /// Clamp boxes to the source image bounds.
    pub clip_to_source: bool,
    /// Suppress across classes instead of within each class.
    pub class_agnostic: bool,
    /// Keep at most this many detections, highest confidence first.
    pub max_detections: Option<usize>,
    /// Score predictions on the rayon pool (feature `rayon`).
    pub parallel: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            model_input_size: 640,
            targets: ClassTargets::default(),
            format: TensorFormat::default(),
            resize: ResizeMode::Stretch,
            clip_to_source: false,
            class_agnostic: false,
            max_detections: None,
            parallel: false,
        }
    }
}

impl DecodeConfig {
    /// Checks thresholds, sizes, format and class targets.
    pub fn validate(&self) -> DecodeResult<()> {
        self.class_set().map(|_| ())
    }

    /// Validates the configuration and resolves the targets to class ids.
    pub fn class_set(&self) -> DecodeResult<ClassSet> {
        if !is_unit_interval(self.confidence_threshold) {
            return Err(DecodeError::InvalidConfiguration(
                "confidence_threshold must be in [0, 1]",
            ));
        }
        if !is_unit_interval(self.iou_threshold) {
            return Err(DecodeError::InvalidConfiguration(
                "iou_threshold must be in [0, 1]",
            ));
        }
        if self.model_input_size == 0 {
            return Err(DecodeError::InvalidConfiguration(
                "model_input_size must be positive",
            ));
        }
        self.format.validate()?;
        if self.format.num_classes > COCO_LABELS.len() {
            return Err(DecodeError::InvalidConfiguration(
                "num_classes exceeds the label table",
            ));
        }

        let ids = match &self.targets {
            ClassTargets::All => return Ok(ClassSet::Any),
            ClassTargets::Labels(names) => names
                .iter()
                .map(|name| {
                    class_id_of(name).ok_or_else(|| DecodeError::UnknownLabel(name.clone()))
                })
                .collect::<DecodeResult<Vec<_>>>()?,
            ClassTargets::Ids(ids) => ids.clone(),
        };
        if ids.is_empty() {
            return Err(DecodeError::InvalidConfiguration(
                "class targets must not be empty",
            ));
        }
        if ids.iter().any(|&id| id >= self.format.num_classes) {
            return Err(DecodeError::InvalidConfiguration(
                "target class id is outside the tensor's classes",
            ));
        }
        Ok(ClassSet::Only(ids))
    }
}

/// Reusable decoder holding a validated configuration.
#[derive(Clone, Debug)]
pub struct Decoder {
    cfg: DecodeConfig,
    filter: CandidateFilter,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DecodeConfig::default()).expect("default decode configuration is valid")
    }
}

impl Decoder {
    /// Validates `cfg` and builds a decoder.
    pub fn new(cfg: DecodeConfig) -> DecodeResult<Self> {
        let classes = cfg.class_set()?;
        let filter = CandidateFilter {
            confidence_threshold: cfg.confidence_threshold,
            classes,
        };
        Ok(Self { cfg, filter })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DecodeConfig {
        &self.cfg
    }

    /// Decodes one output tensor for a source of the given size.
    pub fn decode(
        &self,
        data: &[f32],
        original_width: u32,
        original_height: u32,
    ) -> DecodeResult<Vec<Detection>> {
        run(&self.cfg, &self.filter, data, original_width, original_height)
    }
}

/// Decodes `data` into detections using `cfg`.
///
/// Configuration errors are reported before the tensor is inspected.
pub fn decode_detections(
    data: &[f32],
    original_width: u32,
    original_height: u32,
    cfg: &DecodeConfig,
) -> DecodeResult<Vec<Detection>> {
    let filter = CandidateFilter {
        confidence_threshold: cfg.confidence_threshold,
        classes: cfg.class_set()?,
    };
    run(cfg, &filter, data, original_width, original_height)
}

fn run(
    cfg: &DecodeConfig,
    filter: &CandidateFilter,
    data: &[f32],
    original_width: u32,
    original_height: u32,
) -> DecodeResult<Vec<Detection>> {
    let _span = trace_span!("decode_detections", len = data.len()).entered();

    let mapper = CoordinateMapper::new(cfg.model_input_size, original_width, original_height)?
        .with_resize(cfg.resize)
        .with_clip(cfg.clip_to_source);
    let tensor = match OutputTensor::new(data, cfg.format) {
        Ok(tensor) => tensor,
        Err(err) => {
            trace_warn!(error = %err, "rejecting output tensor");
            return Err(err);
        }
    };

    let scored = score(cfg, &tensor, filter);
    trace_event!(
        "candidates_scored",
        predictions = tensor.num_predictions(),
        kept = scored.len()
    );

    let mapped: Vec<Detection> = scored.iter().filter_map(|c| mapper.map(c)).collect();
    let boxes: Vec<BBox> = mapped.iter().map(Detection::to_bbox).collect();
    let scores: Vec<f32> = mapped.iter().map(|d| d.confidence).collect();
    let keep = if cfg.class_agnostic {
        nms(&boxes, &scores, cfg.iou_threshold)?
    } else {
        let class_ids: Vec<usize> = mapped.iter().map(|d| d.class_id).collect();
        nms_by_class(&boxes, &scores, &class_ids, cfg.iou_threshold)?
    };

    let mut detections: Vec<Detection> = keep.into_iter().map(|idx| mapped[idx]).collect();
    if let Some(max) = cfg.max_detections {
        detections.truncate(max);
    }
    trace_event!(
        "detections_kept",
        mapped = mapped.len(),
        kept = detections.len()
    );
    Ok(detections)
}

fn score(
    cfg: &DecodeConfig,
    tensor: &OutputTensor<'_>,
    filter: &CandidateFilter,
) -> Vec<ScoredCandidate> {
    #[cfg(feature = "rayon")]
    if cfg.parallel {
        return score_candidates_par(tensor, filter);
    }
    #[cfg(not(feature = "rayon"))]
    let _ = cfg.parallel;
    score_candidates(tensor, filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_person() {
        let cfg = DecodeConfig::default();
        assert_eq!(cfg.class_set().unwrap(), ClassSet::Only(vec![0]));
        assert_eq!(cfg.format.values_per_prediction(), 85);
    }

    #[test]
    fn validate_rejects_out_of_range_thresholds() {
        let cfg = DecodeConfig {
            confidence_threshold: 1.5,
            ..DecodeConfig::default()
        };
        assert!(cfg.validate().unwrap_err().is_invalid_configuration());

        let cfg = DecodeConfig {
            iou_threshold: f32::NAN,
            ..DecodeConfig::default()
        };
        assert!(cfg.validate().unwrap_err().is_invalid_configuration());
    }

    #[test]
    fn validate_rejects_unknown_and_empty_targets() {
        let cfg = DecodeConfig {
            targets: ClassTargets::Labels(vec!["dragon".to_string()]),
            ..DecodeConfig::default()
        };
        assert_eq!(
            cfg.validate().unwrap_err(),
            DecodeError::UnknownLabel("dragon".to_string())
        );

        let cfg = DecodeConfig {
            targets: ClassTargets::Ids(Vec::new()),
            ..DecodeConfig::default()
        };
        assert!(cfg.validate().unwrap_err().is_invalid_configuration());
    }

    #[test]
    fn validate_rejects_targets_beyond_tensor_classes() {
        let cfg = DecodeConfig {
            targets: ClassTargets::Labels(vec!["car".to_string()]),
            format: TensorFormat::with_objectness(1),
            ..DecodeConfig::default()
        };
        assert!(cfg.validate().unwrap_err().is_invalid_configuration());
    }

    #[test]
    fn default_decoder_matches_default_config() {
        let data = [0.5f32, 0.5, 0.2, 0.2, 0.9]
            .into_iter()
            .chain(std::iter::once(0.9))
            .chain(std::iter::repeat(0.0).take(79))
            .collect::<Vec<_>>();
        let a = Decoder::default().decode(&data, 640, 640).unwrap();
        let b = decode_detections(&data, 640, 640, &DecodeConfig::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].label(), Some("person"));
    }

    #[test]
    fn default_decoder_resolves_default_targets() {
        let decoder = Decoder::default();
        let cfg = DecodeConfig::default();
        assert_eq!(decoder.filter.classes, cfg.class_set().unwrap());
        assert_eq!(decoder.filter.classes, ClassSet::Only(vec![crate::PERSON_CLASS_ID]));
        assert_eq!(
            decoder.filter.confidence_threshold,
            cfg.confidence_threshold
        );
    }
}
