//! yolo-decode turns the raw output tensor of a YOLO-family detector into
//! deduplicated bounding boxes in source-image pixels.
//!
//! The pipeline is a pure function of its inputs: records are sliced from the
//! flat buffer, scored and filtered by class and confidence, mapped from the
//! network input square back to the source frame, and finally deduplicated
//! with greedy non-maximum suppression. Optional parallel scoring is
//! available via the `rayon` feature.
//!
//! ```
//! use yolo_decode::{decode_detections, DecodeConfig};
//!
//! // One prediction: centered box, objectness 0.9, "person" score 0.8.
//! let mut tensor = vec![0.5, 0.5, 0.2, 0.2, 0.9, 0.8];
//! tensor.extend(std::iter::repeat(0.0).take(79));
//!
//! let detections = decode_detections(&tensor, 1280, 960, &DecodeConfig::default()).unwrap();
//! assert_eq!(detections.len(), 1);
//! assert_eq!(detections[0].label(), Some("person"));
//! ```
//!
//! The default format expects an objectness value per prediction. YOLOv8
//! exports emit `[84, N]` without one; select that layout explicitly:
//!
//! ```
//! use yolo_decode::{decode_detections, DecodeConfig, TensorFormat};
//!
//! let cfg = DecodeConfig {
//!     format: TensorFormat::yolov8(),
//!     ..DecodeConfig::default()
//! };
//! // A single prediction, so attribute-major and prediction-major coincide.
//! let mut tensor = vec![0.5, 0.5, 0.2, 0.2, 0.8];
//! tensor.extend(std::iter::repeat(0.0).take(79));
//!
//! let detections = decode_detections(&tensor, 640, 640, &cfg).unwrap();
//! assert_eq!(detections.len(), 1);
//! assert!((detections[0].confidence - 0.8).abs() < 1e-6);
//! ```

pub mod candidate;
pub mod geometry;
#[cfg(feature = "image-io")]
pub mod io;
pub mod labels;
pub mod lowlevel;
pub mod mapping;
pub mod pipeline;
pub mod tensor;
mod trace;
pub mod util;

pub use geometry::BBox;
pub use labels::{class_id_of, label_name, COCO_LABELS, PERSON_CLASS_ID};
pub use mapping::{CoordinateMapper, ResizeMode};
pub use pipeline::{decode_detections, ClassTargets, DecodeConfig, Decoder, Detection};
pub use tensor::{Layout, OutputTensor, PredictionRecord, TensorFormat};
pub use util::{DecodeError, DecodeResult};
