//! Python bindings for the yolo-decode post-processing library.
//!
//! This module exposes the decoder and its configuration to Python via PyO3.
//! Tensors are accepted as contiguous `float32` numpy arrays of any shape.

use numpy::PyReadonlyArrayDyn;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use yolo_decode::{
    ClassTargets, DecodeConfig as RustDecodeConfig, DecodeError, Decoder as RustDecoder,
    Detection as RustDetection, Layout, ResizeMode, TensorFormat, COCO_LABELS,
};

/// Convert a DecodeError to a Python exception.
fn to_py_err(err: DecodeError) -> PyErr {
    if err.is_invalid_configuration() || err.is_malformed_tensor() {
        PyValueError::new_err(err.to_string())
    } else {
        PyRuntimeError::new_err(err.to_string())
    }
}

/// Detection in source-image pixels.
#[pyclass]
#[derive(Clone)]
pub struct Detection {
    #[pyo3(get)]
    pub x1: f32,
    #[pyo3(get)]
    pub y1: f32,
    #[pyo3(get)]
    pub x2: f32,
    #[pyo3(get)]
    pub y2: f32,
    /// Combined confidence in [0, 1].
    #[pyo3(get)]
    pub confidence: f32,
    /// Index into COCO_LABELS.
    #[pyo3(get)]
    pub class_id: usize,
}

#[pymethods]
impl Detection {
    /// Corners as (x1, y1, x2, y2).
    #[getter]
    fn bbox(&self) -> (f32, f32, f32, f32) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    #[getter]
    fn label(&self) -> &'static str {
        COCO_LABELS.get(self.class_id).copied().unwrap_or("unknown")
    }

    fn __repr__(&self) -> String {
        format!(
            "Detection(label='{}', confidence={:.4}, bbox=({:.1}, {:.1}, {:.1}, {:.1}))",
            self.label(),
            self.confidence,
            self.x1,
            self.y1,
            self.x2,
            self.y2
        )
    }
}

impl From<RustDetection> for Detection {
    fn from(d: RustDetection) -> Self {
        let [x1, y1, x2, y2] = d.bbox;
        Self {
            x1,
            y1,
            x2,
            y2,
            confidence: d.confidence,
            class_id: d.class_id,
        }
    }
}

/// Decoding parameters.
#[pyclass]
#[derive(Clone)]
pub struct DecodeConfig {
    inner: RustDecodeConfig,
}

#[pymethods]
impl DecodeConfig {
    /// Create a new DecodeConfig.
    ///
    /// Args:
    ///     confidence_threshold: Minimum combined confidence, exclusive (default: 0.25)
    ///     iou_threshold: NMS overlap threshold (default: 0.45)
    ///     model_input_size: Side of the square network input (default: 640)
    ///     targets: Class labels to keep, None for every class (default: ["person"])
    ///     num_classes: Class scores per prediction (default: 80)
    ///     objectness: Whether predictions carry an objectness value (default: True)
    ///     layout: 'prediction_major' or 'attribute_major'
    ///     resize: 'stretch' or 'letterbox'
    ///     clip_to_source: Clamp boxes to the image (default: False)
    ///     class_agnostic: Suppress across classes (default: False)
    ///     max_detections: Cap on returned detections (default: None)
    ///     parallel: Score predictions in parallel (default: False)
    #[new]
    #[pyo3(signature = (
        confidence_threshold = 0.25,
        iou_threshold = 0.45,
        model_input_size = 640,
        targets = Some(vec!["person".to_string()]),
        num_classes = 80,
        objectness = true,
        layout = "prediction_major",
        resize = "stretch",
        clip_to_source = false,
        class_agnostic = false,
        max_detections = None,
        parallel = false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        confidence_threshold: f32,
        iou_threshold: f32,
        model_input_size: u32,
        targets: Option<Vec<String>>,
        num_classes: usize,
        objectness: bool,
        layout: &str,
        resize: &str,
        clip_to_source: bool,
        class_agnostic: bool,
        max_detections: Option<usize>,
        parallel: bool,
    ) -> PyResult<Self> {
        let layout = match layout.to_lowercase().as_str() {
            "prediction_major" => Layout::PredictionMajor,
            "attribute_major" => Layout::AttributeMajor,
            _ => {
                return Err(PyValueError::new_err(
                    "layout must be 'prediction_major' or 'attribute_major'",
                ))
            }
        };
        let resize = match resize.to_lowercase().as_str() {
            "stretch" => ResizeMode::Stretch,
            "letterbox" => ResizeMode::Letterbox,
            _ => {
                return Err(PyValueError::new_err(
                    "resize must be 'stretch' or 'letterbox'",
                ))
            }
        };
        let inner = RustDecodeConfig {
            confidence_threshold,
            iou_threshold,
            model_input_size,
            targets: targets.map_or(ClassTargets::All, ClassTargets::Labels),
            format: TensorFormat {
                num_classes,
                has_objectness: objectness,
                layout,
            },
            resize,
            clip_to_source,
            class_agnostic,
            max_detections,
            parallel,
        };
        inner.validate().map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Defaults for YOLOv8 exports: `[84, N]`, no objectness.
    #[staticmethod]
    fn yolov8() -> Self {
        Self {
            inner: RustDecodeConfig {
                format: TensorFormat::yolov8(),
                ..RustDecodeConfig::default()
            },
        }
    }

    fn validate(&self) -> PyResult<()> {
        self.inner.validate().map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        format!(
            "DecodeConfig(confidence_threshold={}, iou_threshold={}, model_input_size={}, num_classes={})",
            self.inner.confidence_threshold,
            self.inner.iou_threshold,
            self.inner.model_input_size,
            self.inner.format.num_classes
        )
    }
}

/// Reusable decoder; validate once, decode every frame.
#[pyclass]
pub struct Decoder {
    inner: RustDecoder,
}

#[pymethods]
impl Decoder {
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<DecodeConfig>) -> PyResult<Self> {
        let cfg = config.map(|c| c.inner).unwrap_or_default();
        let inner = RustDecoder::new(cfg).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    fn decode(
        &self,
        tensor: PyReadonlyArrayDyn<'_, f32>,
        original_width: u32,
        original_height: u32,
    ) -> PyResult<Vec<Detection>> {
        let data = tensor.as_slice()?;
        let detections = self
            .inner
            .decode(data, original_width, original_height)
            .map_err(to_py_err)?;
        Ok(detections.into_iter().map(Detection::from).collect())
    }

    fn __repr__(&self) -> String {
        format!(
            "Decoder(model_input_size={})",
            self.inner.config().model_input_size
        )
    }
}

#[pyfunction]
#[pyo3(signature = (
    tensor,
    original_width,
    original_height,
    confidence_threshold = 0.25,
    iou_threshold = 0.45,
    model_input_size = 640,
    class_of_interest = "person"
))]
fn decode_detections(
    tensor: PyReadonlyArrayDyn<'_, f32>,
    original_width: u32,
    original_height: u32,
    confidence_threshold: f32,
    iou_threshold: f32,
    model_input_size: u32,
    class_of_interest: &str,
) -> PyResult<Vec<Detection>> {
    let cfg = RustDecodeConfig {
        confidence_threshold,
        iou_threshold,
        model_input_size,
        targets: ClassTargets::Labels(vec![class_of_interest.to_string()]),
        ..RustDecodeConfig::default()
    };
    let data = tensor.as_slice()?;
    let detections = yolo_decode::decode_detections(data, original_width, original_height, &cfg)
        .map_err(to_py_err)?;
    Ok(detections.into_iter().map(Detection::from).collect())
}

#[pymodule]
fn _yolo_decode(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Detection>()?;
    m.add_class::<DecodeConfig>()?;
    m.add_class::<Decoder>()?;
    m.add_function(wrap_pyfunction!(decode_detections, m)?)?;
    m.add("COCO_LABELS", COCO_LABELS.to_vec())?;

    // Add version
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
