//! Integer linear re-mapping between ranges.
//!
//! Arithmetic is integer with truncation toward zero, so positions stay
//! bit-exact with the motion controller that consumes them.

/// Re-map `value` from `[in_min, in_max]` to `[out_min, out_max]`
///
/// Values outside the input range extrapolate linearly. Returns `None` when
/// the input range is empty.
#[must_use]
pub fn remap(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> Option<i32> {
    let span = i64::from(in_max) - i64::from(in_min);
    if span == 0 {
        return None;
    }
    let scaled = (i64::from(value) - i64::from(in_min)) * (i64::from(out_max) - i64::from(out_min)) / span;
    i32::try_from(scaled + i64::from(out_min)).ok()
}

/// Inverse of [`remap`] for the same pair of ranges
#[must_use]
pub fn remap_inverse(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> Option<i32> {
    remap(value, out_min, out_max, in_min, in_max)
}
