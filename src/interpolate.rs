//! Linear interpolation over sorted point sequences.
//!
//! Every derived value in the pipeline rests on this function: species
//! concentrations, the biomass density at the evaluation time, and the
//! interpolated end of a flux bracket. Callers bound the query time with
//! the already-computed [`TimeDomain`](crate::domain::TimeDomain) before
//! calling, so an out-of-range query is a usage error, not a data error.

use thiserror::Error;

use crate::series::Point;

/// Errors raised by [`interpolate_at`].
#[derive(Debug, Error, PartialEq)]
pub enum InterpolateError {
    /// The point sequence was empty.
    #[error("cannot interpolate an empty point sequence")]
    Empty,

    /// The query time lies outside the covered range.
    #[error("time {time} is outside the covered range [{first}, {last}]")]
    OutOfRange { time: f64, first: f64, last: f64 },
}

/// Linearly interpolates the value of a sorted point sequence at time `t`.
///
/// # Arguments
///
/// * `points` - Samples sorted ascending by `x`; duplicate `x` values are
///   permitted
/// * `t` - The query time, which must lie within `[first.x, last.x]`
///
/// # Returns
///
/// The sample's own `y` when `t` exactly equals a sample time (the last of
/// any duplicates, chosen consistently), otherwise the linear interpolation
/// between the two bracketing samples.
pub fn interpolate_at(points: &[Point], t: f64) -> Result<f64, InterpolateError> {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(InterpolateError::Empty),
    };
    if t < first.x || t > last.x {
        return Err(InterpolateError::OutOfRange {
            time: t,
            first: first.x,
            last: last.x,
        });
    }

    // Smallest index with x > t; everything before it has x <= t.
    let next = points.partition_point(|p| p.x <= t);
    if next > 0 && points[next - 1].x == t {
        return Ok(points[next - 1].y);
    }

    let (p0, p1) = (&points[next - 1], &points[next]);
    Ok(p0.y + (p1.y - p0.y) * (t - p0.x) / (p1.x - p0.x))
}
