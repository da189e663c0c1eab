//! Float comparisons shared by the intersection and shading code.

/// Machine epsilon for `f32`; the tolerance used by every geometric comparison.
pub const EPS: f32 = f32::EPSILON;

/// Returns true if `a >= b`, treating values within [`EPS`] of each other as equal.
///
/// Used instead of a bare `>=` so points lying exactly on an edge or plane
/// do not flicker between hit and miss.
#[inline]
pub fn is_greater_equal(a: f32, b: f32) -> bool {
    (a - b).abs() < EPS || a > b
}
