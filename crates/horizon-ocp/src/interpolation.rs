//! Linear interpolation over a sorted time stamp array.

use crate::Vector;

/// Linearly interpolate `values` at query time `t`.
///
/// Times must be sorted ascending. Queries outside the span clamp to the
/// first/last value; an interval of zero length returns its left sample.
///
/// # Panics
/// Panics if `values` is empty or shorter than `times`.
pub fn interpolate(t: f64, times: &[f64], values: &[Vector]) -> Vector {
    assert!(!values.is_empty(), "cannot interpolate empty trajectory");

    if times.is_empty() || t <= times[0] {
        return values[0].clone();
    }
    let last = times.len() - 1;
    if t >= times[last] {
        return values[last.min(values.len() - 1)].clone();
    }

    // index of the first stamp strictly greater than t; the query lies in
    // [times[hi - 1], times[hi])
    let hi = times.partition_point(|&stamp| stamp <= t);
    let lo = hi - 1;

    let span = times[hi] - times[lo];
    if span < f64::EPSILON {
        return values[lo].clone();
    }
    let alpha = (t - times[lo]) / span;
    (1.0 - alpha) * &values[lo] + alpha * &values[hi]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn v(x: f64) -> Vector {
        Vector::from_vec(vec![x])
    }

    #[test]
    fn interpolates_midpoint() {
        let times = [0.0, 1.0, 2.0];
        let values = [v(0.0), v(10.0), v(20.0)];
        assert_relative_eq!(interpolate(0.5, &times, &values)[0], 5.0);
        assert_relative_eq!(interpolate(1.5, &times, &values)[0], 15.0);
    }

    #[test]
    fn clamps_outside_span() {
        let times = [1.0, 2.0];
        let values = [v(3.0), v(7.0)];
        assert_relative_eq!(interpolate(0.0, &times, &values)[0], 3.0);
        assert_relative_eq!(interpolate(5.0, &times, &values)[0], 7.0);
    }

    #[test]
    fn exact_stamp_returns_sample() {
        let times = [0.0, 0.5, 1.0];
        let values = [v(1.0), v(2.0), v(3.0)];
        assert_relative_eq!(interpolate(0.5, &times, &values)[0], 2.0);
    }
}
