//! Numeric helpers shared by scoring and validation.

/// Returns true if `value` lies in `[0, 1]`; NaN is rejected.
pub(crate) fn is_unit_interval(value: f32) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Clamps `value` to `[0, 1]`. NaN maps to 0.
pub(crate) fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
