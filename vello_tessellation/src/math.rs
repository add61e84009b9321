// Copyright 2026 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small geometry helpers shared by the tessellator and the geometry synthesizers.

use crate::kurbo::{Point, Rect, Vec2};

/// Lengths and squared lengths below this are treated as zero.
pub const EPSILON: f64 = 1e-9;

/// Returns `v` rotated by a quarter turn counter-clockwise (in a y-up coordinate system).
#[inline]
pub fn left_normal(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Returns `v` scaled to unit length, or `None` if `v` is (nearly) zero.
#[inline]
pub fn unit(v: Vec2) -> Option<Vec2> {
    let len = v.hypot();
    if len > EPSILON && len.is_finite() {
        Some(v / len)
    } else {
        None
    }
}

/// Rotates `v` by `angle` radians, counter-clockwise for positive angles.
#[inline]
pub fn rotate(v: Vec2, angle: f64) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(c * v.x - s * v.y, s * v.x + c * v.y)
}

/// Unsigned curvature density `|x'y'' - y'x''| / |p'|^2` of a parametric curve.
///
/// Integrating this over the parameter gives the total turning of the tangent in radians.
/// Points where the first derivative vanishes contribute nothing.
#[inline]
pub fn curvature_density(d1: Vec2, d2: Vec2) -> f64 {
    let speed_sq = d1.hypot2();
    if speed_sq <= EPSILON {
        return 0.0;
    }
    d1.cross(d2).abs() / speed_sq
}

/// Simpson's rule estimate of the curvature integral over `[t0, t1]`, given the curvature
/// density at both ends and at the parameter midpoint.
#[inline]
pub fn simpson_curvature(t0: f64, t1: f64, k0: f64, k_mid: f64, k1: f64) -> f64 {
    (t1 - t0) / 6.0 * (k0 + 4.0 * k_mid + k1)
}

/// Distance from `p` to the line through `a` and `b`, or to `a` if the chord is degenerate.
#[inline]
pub fn distance_to_chord(p: Point, a: Point, b: Point) -> f64 {
    let chord = b - a;
    let len = chord.hypot();
    if len <= EPSILON {
        return p.distance(a);
    }
    chord.cross(p - a).abs() / len
}

/// Smallest axis aligned rectangle containing all `points`, or `None` if there are none.
pub fn bounding_box(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    Some(iter.fold(Rect::from_points(first, first), |bbox, p| {
        bbox.union_pt(p)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn rotate_quarter_turn_matches_normal() {
        let v = Vec2::new(3.0, 1.0);
        let r = rotate(v, FRAC_PI_2);
        let n = left_normal(v);
        assert!((r - n).hypot() < 1e-12);
    }

    #[test]
    fn circle_curvature_density_is_sweep() {
        // Unit circle parametrized over [0, 1] with total sweep of 2 radians.
        let sweep = 2.0;
        let d1 = Vec2::new(0.0, sweep);
        let d2 = Vec2::new(-sweep * sweep, 0.0);
        let k = curvature_density(d1, d2);
        assert!((simpson_curvature(0.0, 1.0, k, k, k) - sweep).abs() < 1e-12);
    }

    #[test]
    fn degenerate_chord_falls_back_to_point_distance() {
        let a = Point::new(1.0, 1.0);
        assert_eq!(distance_to_chord(Point::new(4.0, 5.0), a, a), 5.0);
        let b = Point::new(5.0, 1.0);
        assert_eq!(distance_to_chord(Point::new(3.0, 3.0), a, b), 2.0);
    }

    #[test]
    fn bounding_box_of_points() {
        assert!(bounding_box([]).is_none());
        let bbox = bounding_box([
            Point::new(1.0, -2.0),
            Point::new(-3.0, 4.0),
            Point::new(0.5, 0.5),
        ])
        .unwrap();
        assert_eq!(bbox, Rect::new(-3.0, -2.0, 1.0, 4.0));
    }
}
