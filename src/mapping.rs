//! Mapping from normalized network boxes to source-image pixels.
//!
//! Raw box parameters are center/size values normalized to the square network
//! input. They are first denormalized into network-input pixels and turned
//! into corners, then mapped back onto the source image according to how the
//! frame was resized before inference.

use crate::candidate::ScoredCandidate;
use crate::geometry::BBox;
use crate::pipeline::Detection;
use crate::util::{DecodeError, DecodeResult};

/// How the source frame was fitted into the square network input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResizeMode {
    /// Independent x/y scaling to the full input square.
    #[default]
    Stretch,
    /// Uniform scaling with the short side padded symmetrically.
    Letterbox,
}

/// Converts candidate boxes into source-image coordinates.
#[derive(Clone, Debug)]
pub struct CoordinateMapper {
    model_input_size: f32,
    original_width: f32,
    original_height: f32,
    resize: ResizeMode,
    clip: bool,
}

impl CoordinateMapper {
    /// Creates a stretch mapper for a `model_input_size` square network and a
    /// source of `original_width` x `original_height` pixels.
    pub fn new(
        model_input_size: u32,
        original_width: u32,
        original_height: u32,
    ) -> DecodeResult<Self> {
        if model_input_size == 0 {
            return Err(DecodeError::InvalidConfiguration(
                "model_input_size must be positive",
            ));
        }
        if original_width == 0 || original_height == 0 {
            return Err(DecodeError::InvalidConfiguration(
                "source width and height must be positive",
            ));
        }
        Ok(Self {
            model_input_size: model_input_size as f32,
            original_width: original_width as f32,
            original_height: original_height as f32,
            resize: ResizeMode::Stretch,
            clip: false,
        })
    }

    /// Sets the resize mode used before inference.
    pub fn with_resize(mut self, resize: ResizeMode) -> Self {
        self.resize = resize;
        self
    }

    /// Clamps mapped boxes to the source image bounds when enabled.
    pub fn with_clip(mut self, clip: bool) -> Self {
        self.clip = clip;
        self
    }

    /// Denormalizes a center/size box into network-input corners.
    ///
    /// Returns `None` for non-positive width or height and for non-finite
    /// values.
    pub fn to_model_space(&self, x_center: f32, y_center: f32, w: f32, h: f32) -> Option<BBox> {
        let size = self.model_input_size;
        let (w_px, h_px) = (w * size, h * size);
        if !(w_px > 0.0 && h_px > 0.0) {
            return None;
        }
        let bbox = BBox::from_center(x_center * size, y_center * size, w_px, h_px);
        bbox.is_valid().then_some(bbox)
    }

    /// Maps a network-input box onto the source image.
    ///
    /// Returns `None` if the mapped box has no area, for example after
    /// clipping a box that lies entirely in the letterbox padding.
    pub fn to_source_space(&self, bbox: BBox) -> Option<BBox> {
        let mapped = match self.resize {
            ResizeMode::Stretch => bbox.scale(
                self.original_width / self.model_input_size,
                self.original_height / self.model_input_size,
            ),
            ResizeMode::Letterbox => {
                let (gain, pad_x, pad_y) = self.letterbox_params();
                BBox::new(
                    (bbox.x1 - pad_x) / gain,
                    (bbox.y1 - pad_y) / gain,
                    (bbox.x2 - pad_x) / gain,
                    (bbox.y2 - pad_y) / gain,
                )
            }
        };
        let mapped = if self.clip {
            mapped.clamp_to(self.original_width, self.original_height)
        } else {
            mapped
        };
        mapped.is_valid().then_some(mapped)
    }

    /// Maps a scored candidate to a detection, carrying confidence and class.
    pub fn map(&self, candidate: &ScoredCandidate) -> Option<Detection> {
        let model_box = self.to_model_space(
            candidate.x_center,
            candidate.y_center,
            candidate.w,
            candidate.h,
        )?;
        let source_box = self.to_source_space(model_box)?;
        Some(Detection {
            bbox: source_box.to_array(),
            confidence: candidate.confidence,
            class_id: candidate.class_id,
        })
    }

    /// Gain and x/y padding of the letterbox transform.
    fn letterbox_params(&self) -> (f32, f32, f32) {
        let size = self.model_input_size;
        let gain = (size / self.original_width).min(size / self.original_height);
        let pad_x = (size - self.original_width * gain) / 2.0;
        let pad_y = (size - self.original_height * gain) / 2.0;
        (gain, pad_x, pad_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_box_eq(actual: BBox, expected: [f32; 4]) {
        for (a, e) in actual.to_array().iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-3, "expected {expected:?}, got {actual:?}");
        }
    }

    #[test]
    fn stretch_scales_each_axis() {
        let mapper = CoordinateMapper::new(640, 1280, 960).unwrap();
        let model = mapper.to_model_space(0.5, 0.5, 0.2, 0.2).unwrap();
        assert_box_eq(model, [256.0, 256.0, 384.0, 384.0]);
        let source = mapper.to_source_space(model).unwrap();
        assert_box_eq(source, [512.0, 384.0, 768.0, 576.0]);
    }

    #[test]
    fn bottom_edge_uses_height_not_width() {
        let mapper = CoordinateMapper::new(640, 640, 640).unwrap();
        let model = mapper.to_model_space(0.5, 0.5, 0.5, 0.1).unwrap();
        assert_box_eq(model, [160.0, 288.0, 480.0, 352.0]);
    }

    #[test]
    fn degenerate_sizes_are_dropped() {
        let mapper = CoordinateMapper::new(640, 640, 480).unwrap();
        assert!(mapper.to_model_space(0.5, 0.5, 0.0, 0.2).is_none());
        assert!(mapper.to_model_space(0.5, 0.5, 0.2, -0.1).is_none());
        assert!(mapper.to_model_space(0.5, 0.5, f32::NAN, 0.2).is_none());
        assert!(mapper.to_model_space(f32::INFINITY, 0.5, 0.2, 0.2).is_none());
    }

    #[test]
    fn letterbox_removes_padding() {
        // 1280x640 fits as 640x320 with 160 px bars on top and bottom.
        let mapper = CoordinateMapper::new(640, 1280, 640)
            .unwrap()
            .with_resize(ResizeMode::Letterbox);
        let model = BBox::new(100.0, 160.0, 200.0, 260.0);
        let source = mapper.to_source_space(model).unwrap();
        assert_box_eq(source, [200.0, 0.0, 400.0, 200.0]);
    }

    #[test]
    fn clip_keeps_boxes_inside_source() {
        let mapper = CoordinateMapper::new(640, 640, 640).unwrap().with_clip(true);
        let source = mapper
            .to_source_space(BBox::new(-20.0, 600.0, 40.0, 700.0))
            .unwrap();
        assert_box_eq(source, [0.0, 600.0, 40.0, 640.0]);

        let outside = BBox::new(700.0, 700.0, 800.0, 800.0);
        assert!(mapper.to_source_space(outside).is_none());
    }

    #[test]
    fn rejects_zero_sizes() {
        assert!(CoordinateMapper::new(0, 640, 480)
            .unwrap_err()
            .is_invalid_configuration());
        assert!(CoordinateMapper::new(640, 0, 480)
            .unwrap_err()
            .is_invalid_configuration());
    }
}
