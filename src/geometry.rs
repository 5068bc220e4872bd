//! Axis-aligned box geometry and intersection-over-union.

/// Axis-aligned rectangle given by its corners, in pixel units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    /// Left edge.
    pub x1: f32,
    /// Top edge.
    pub y1: f32,
    /// Right edge.
    pub x2: f32,
    /// Bottom edge.
    pub y2: f32,
}

impl BBox {
    /// Creates a box from its corners.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Creates a box from a center point and full width/height.
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        let half_w = w / 2.0;
        let half_h = h / 2.0;
        Self {
            x1: cx - half_w,
            y1: cy - half_h,
            x2: cx + half_w,
            y2: cy + half_h,
        }
    }

    /// Creates a box from a `[x1, y1, x2, y2]` array.
    pub fn from_array(corners: [f32; 4]) -> Self {
        Self::new(corners[0], corners[1], corners[2], corners[3])
    }

    /// Returns the corners as `[x1, y1, x2, y2]`.
    pub fn to_array(self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Horizontal extent; negative for inverted boxes.
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Vertical extent; negative for inverted boxes.
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Area, or 0 for inverted boxes.
    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Returns true if all corners are finite and the area is positive.
    pub fn is_valid(&self) -> bool {
        self.x1.is_finite()
            && self.y1.is_finite()
            && self.x2.is_finite()
            && self.y2.is_finite()
            && self.x2 > self.x1
            && self.y2 > self.y1
    }

    /// Area of the overlap with `other`.
    pub fn intersection(&self, other: &BBox) -> f32 {
        let w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        w * h
    }

    /// Intersection over union with `other`, in `[0, 1]`.
    ///
    /// Two zero-area boxes have an IOU of 0.
    pub fn iou(&self, other: &BBox) -> f32 {
        iou_with_areas(self, self.area(), other, other.area())
    }

    /// Scales x coordinates by `sx` and y coordinates by `sy`.
    pub fn scale(self, sx: f32, sy: f32) -> Self {
        Self {
            x1: self.x1 * sx,
            y1: self.y1 * sy,
            x2: self.x2 * sx,
            y2: self.y2 * sy,
        }
    }

    /// Clamps all corners into `[0, width] x [0, height]`.
    pub fn clamp_to(self, width: f32, height: f32) -> Self {
        Self {
            x1: self.x1.clamp(0.0, width),
            y1: self.y1.clamp(0.0, height),
            x2: self.x2.clamp(0.0, width),
            y2: self.y2.clamp(0.0, height),
        }
    }
}

/// IOU with precomputed areas, used by the NMS inner loop.
pub(crate) fn iou_with_areas(a: &BBox, area_a: f32, b: &BBox, area_b: f32) -> f32 {
    let inter = a.intersection(b);
    let union = area_a + area_b - inter;
    if union <= 0.0 {
        return 0.0;
    }
    inter / union
}

#[cfg(test)]
mod tests {
    use super::BBox;

    #[test]
    fn from_center_uses_matching_half_extents() {
        let b = BBox::from_center(100.0, 50.0, 40.0, 20.0);
        assert_eq!(b.to_array(), [80.0, 40.0, 120.0, 60.0]);
        assert_eq!(b.width(), 40.0);
        assert_eq!(b.height(), 20.0);
    }

    #[test]
    fn iou_of_nested_boxes() {
        let a = BBox::new(0.0, 0.0, 100.0, 100.0);
        let b = BBox::new(5.0, 5.0, 95.0, 95.0);
        assert!((a.iou(&b) - 0.81).abs() < 1e-6);
    }

    #[test]
    fn iou_of_disjoint_and_touching_boxes_is_zero() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(10.0, 0.0, 20.0, 10.0);
        let c = BBox::new(30.0, 30.0, 40.0, 40.0);
        assert_eq!(a.iou(&b), 0.0);
        assert_eq!(a.iou(&c), 0.0);
    }

    #[test]
    fn iou_of_zero_area_boxes_is_zero() {
        let p = BBox::new(3.0, 3.0, 3.0, 3.0);
        assert_eq!(p.area(), 0.0);
        assert_eq!(p.iou(&p), 0.0);
    }

    #[test]
    fn validity_rejects_degenerate_and_nan() {
        assert!(BBox::new(0.0, 0.0, 1.0, 1.0).is_valid());
        assert!(!BBox::new(0.0, 0.0, 0.0, 1.0).is_valid());
        assert!(!BBox::new(0.0, 2.0, 1.0, 1.0).is_valid());
        assert!(!BBox::new(f32::NAN, 0.0, 1.0, 1.0).is_valid());
    }

    #[test]
    fn clamp_to_limits_corners() {
        let b = BBox::new(-5.0, -1.0, 105.0, 40.0).clamp_to(100.0, 50.0);
        assert_eq!(b.to_array(), [0.0, 0.0, 100.0, 40.0]);
    }
}
