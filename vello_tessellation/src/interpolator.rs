// Copyright 2026 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;
use std::sync::Arc;

use log::warn;
use smallvec::SmallVec;

use crate::kurbo::{Point, Vec2};
use crate::math::{distance_to_chord, left_normal, unit, EPSILON};
use crate::tessellate::{tessellate_parametric, EdgeStats, TessellationParams, ThresholdMode};
use crate::Error;

/// Index of an interpolator within its contour.
///
/// Interpolator `i` of a contour runs from point `i` to point `i + 1`, the last one
/// closing the contour back to point `0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterpolatorId(pub usize);

/// Position and the first two derivatives of a curve at some parameter value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveDerivatives {
    pub position: Point,
    pub first: Vec2,
    pub second: Vec2,
}

/// A single tessellation sample: a position on the curve and the curve's derivative there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveSample {
    pub position: Point,
    pub derivative: Vec2,
}

impl From<CurveDerivatives> for CurveSample {
    fn from(d: CurveDerivatives) -> Self {
        Self {
            position: d.position,
            derivative: d.first,
        }
    }
}

/// A curve parametrized over `[0, 1]` with analytic first and second derivatives.
///
/// Implementors can be tessellated with [`tessellate_parametric`], which refines the
/// parameter range until the quality target of the [`TessellationParams`] is met.
pub trait ParametricCurve {
    /// Evaluates the curve at `t` in `[0, 1]`.
    fn compute(&self, t: f64) -> CurveDerivatives;

    /// Number of equal parameter intervals refinement starts from.
    ///
    /// A single midpoint test can miss an inflection that is symmetric about the midpoint,
    /// so curves that can wiggle should start from more than one interval.
    fn initial_subdivisions(&self) -> u32 {
        1
    }
}

/// A caller supplied curve shape.
pub trait CustomCurve: fmt::Debug + Send + Sync {
    /// Samples the curve from `start` to `end`, both included, appending to `out`.
    ///
    /// Implementations should honor `params.segment_cap()`; excess samples are
    /// decimated by the tessellator. Distance fields are computed by the tessellator from
    /// the emitted positions. The achieved curvature and chord distance are estimated from
    /// the sample derivatives and from any samples dropped by decimation.
    fn tessellate(
        &self,
        start: Point,
        end: Point,
        params: &TessellationParams,
        out: &mut Vec<CurveSample>,
    );
}

/// A Bezier curve of any degree.
#[derive(Clone, Debug, PartialEq)]
pub struct Bezier {
    /// Start point, control points and end point, in order.
    points: SmallVec<[Point; 4]>,
}

impl Bezier {
    /// Creates a Bezier curve through `controls` from `start` to `end`.
    pub fn new(start: Point, controls: &[Point], end: Point) -> Self {
        let mut points = SmallVec::with_capacity(controls.len() + 2);
        points.push(start);
        points.extend_from_slice(controls);
        points.push(end);
        Self { points }
    }

    /// Degree of the curve, one less than the number of defining points.
    pub fn degree(&self) -> usize {
        self.points.len() - 1
    }

    /// All defining points, start and end included.
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

impl ParametricCurve for Bezier {
    fn compute(&self, t: f64) -> CurveDerivatives {
        let n = self.degree() as f64;
        let mut pts: SmallVec<[Vec2; 4]> = self.points.iter().map(|p| p.to_vec2()).collect();
        let mut first = Vec2::ZERO;
        let mut second = Vec2::ZERO;
        // De Casteljau; the derivatives fall out of the last two reduction levels.
        let mut level = pts.len();
        while level > 1 {
            if level == 3 {
                second = (pts[2] - pts[1] * 2.0 + pts[0]) * (n * (n - 1.0));
            }
            if level == 2 {
                first = (pts[1] - pts[0]) * n;
            }
            for i in 0..level - 1 {
                pts[i] = pts[i].lerp(pts[i + 1], t);
            }
            level -= 1;
        }
        CurveDerivatives {
            position: pts[0].to_point(),
            first,
            second,
        }
    }

    fn initial_subdivisions(&self) -> u32 {
        self.degree() as u32
    }
}

/// An arc of a circle, swept counter-clockwise (y-up) for positive angles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcCurve {
    center: Point,
    radius: f64,
    start_angle: f64,
    sweep: f64,
}

impl ArcCurve {
    /// Creates the arc from `start` to `end` sweeping `sweep` radians.
    ///
    /// Fails if the sweep is a multiple of a full turn (zero included), or if the end points
    /// coincide, since neither has a defined center.
    pub fn new(start: Point, sweep: f64, end: Point) -> Result<Self, Error> {
        let chord = end - start;
        let len = chord.hypot();
        let half = 0.5 * sweep;
        let sin_half = half.sin();
        if !sweep.is_finite() || sin_half.abs() < 1e-6 || len <= EPSILON {
            return Err(Error::DegenerateArc { angle: sweep });
        }
        let radius = len / (2.0 * sin_half.abs());
        let offset = 0.5 * len / half.tan();
        let center = start.midpoint(end) + left_normal(chord / len) * offset;
        let v = start - center;
        Ok(Self {
            center,
            radius,
            start_angle: v.y.atan2(v.x),
            sweep,
        })
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn sweep(&self) -> f64 {
        self.sweep
    }

    /// Number of equal angular steps needed to meet the quality target of `params`.
    fn segment_count(&self, params: &TessellationParams) -> u32 {
        let sweep = self.sweep.abs();
        let step = match params.mode {
            ThresholdMode::Curvature => params.threshold,
            ThresholdMode::CurveDistance => {
                // Sagitta of a step of angle `a` is `r (1 - cos(a / 2))`.
                2.0 * (1.0 - params.threshold / self.radius).max(-1.0).acos()
            }
        };
        let wanted = if step > 0.0 {
            (sweep / step).ceil() as u32
        } else {
            u32::MAX
        };
        wanted.clamp(1, params.segment_cap())
    }

    /// Samples the arc at fixed angular spacing.
    pub fn tessellate(&self, params: &TessellationParams, out: &mut Vec<CurveSample>) -> EdgeStats {
        let n = self.segment_count(params);
        for i in 0..=n {
            let angle = self.start_angle + self.sweep * (f64::from(i) / f64::from(n));
            let (s, c) = angle.sin_cos();
            out.push(CurveSample {
                position: self.center + Vec2::new(c, s) * self.radius,
                derivative: Vec2::new(-s, c) * (self.sweep * self.radius),
            });
        }
        let step = self.sweep.abs() / f64::from(n);
        EdgeStats {
            curvature: step,
            distance: self.radius * (1.0 - (0.5 * step).cos()),
            segments: n,
        }
    }
}

/// A caller supplied interpolator, built against the contour's current last interpolator.
#[derive(Clone, Debug)]
pub struct CustomInterpolator {
    pub(crate) prev: Option<InterpolatorId>,
    pub(crate) end: Point,
    pub(crate) curve: Arc<dyn CustomCurve>,
}

impl CustomInterpolator {
    /// Creates a custom interpolator ending at `end`.
    ///
    /// `prev` must be the value of `prev_interpolator()` of the contour it will be added to.
    pub fn new(prev: Option<InterpolatorId>, end: Point, curve: Arc<dyn CustomCurve>) -> Self {
        Self { prev, end, curve }
    }

    pub fn prev_interpolator(&self) -> Option<InterpolatorId> {
        self.prev
    }

    pub fn end_pt(&self) -> Point {
        self.end
    }
}

/// The shape of an edge.
#[derive(Clone, Debug)]
pub enum InterpolatorKind {
    /// A straight line.
    Flat,
    Bezier(Bezier),
    Arc(ArcCurve),
    Custom(Arc<dyn CustomCurve>),
}

/// A single edge of a contour, interpolating from its start point to its end point.
#[derive(Clone, Debug)]
pub struct Interpolator {
    start: Point,
    end: Point,
    prev: Option<InterpolatorId>,
    kind: InterpolatorKind,
}

impl Interpolator {
    pub(crate) fn new(
        start: Point,
        end: Point,
        prev: Option<InterpolatorId>,
        kind: InterpolatorKind,
    ) -> Self {
        Self {
            start,
            end,
            prev,
            kind,
        }
    }

    pub fn start_pt(&self) -> Point {
        self.start
    }

    pub fn end_pt(&self) -> Point {
        self.end
    }

    /// The interpolator ending where this one starts, `None` for the first edge of a contour.
    pub fn prev_interpolator(&self) -> Option<InterpolatorId> {
        self.prev
    }

    pub fn kind(&self) -> &InterpolatorKind {
        &self.kind
    }

    /// Samples this edge into `out`, which is cleared first.
    ///
    /// The first and last samples are exactly the start and end points, and at most
    /// `params.segment_cap() + 1` samples are produced.
    pub fn tessellate(&self, params: &TessellationParams, out: &mut Vec<CurveSample>) -> EdgeStats {
        out.clear();
        let mut stats = match &self.kind {
            InterpolatorKind::Flat => {
                let derivative = self.end - self.start;
                out.push(CurveSample {
                    position: self.start,
                    derivative,
                });
                out.push(CurveSample {
                    position: self.end,
                    derivative,
                });
                EdgeStats {
                    segments: 1,
                    ..EdgeStats::default()
                }
            }
            InterpolatorKind::Bezier(bezier) => tessellate_parametric(bezier, params, out),
            InterpolatorKind::Arc(arc) => arc.tessellate(params, out),
            InterpolatorKind::Custom(curve) => {
                curve.tessellate(self.start, self.end, params, out);
                self.sanitize_custom(params, out)
            }
        };
        if let Some(first) = out.first_mut() {
            first.position = self.start;
        }
        if let Some(last) = out.last_mut() {
            last.position = self.end;
        }
        stats.segments = (out.len() - 1) as u32;
        stats
    }

    /// Brings the output of a custom curve within the tessellation contract.
    fn sanitize_custom(&self, params: &TessellationParams, out: &mut Vec<CurveSample>) -> EdgeStats {
        if out.len() < 2 {
            warn!(
                "Custom interpolator produced {} sample(s), replacing with a line",
                out.len()
            );
            let derivative = self.end - self.start;
            out.clear();
            out.push(CurveSample {
                position: self.start,
                derivative,
            });
            out.push(CurveSample {
                position: self.end,
                derivative,
            });
        }
        let max_points = params.segment_cap() as usize + 1;
        let mut stats = EdgeStats::default();
        if out.len() > max_points {
            warn!(
                "Custom interpolator produced {} samples, decimating to {max_points}",
                out.len()
            );
            let last = out.len() - 1;
            let segments = max_points - 1;
            let kept: Vec<usize> = (0..max_points).map(|i| i * last / segments).collect();
            // Dropped samples are still on the curve, so they bound the deviation of the
            // chords replacing them.
            for pair in kept.windows(2) {
                let (a, b) = (out[pair[0]].position, out[pair[1]].position);
                for dropped in &out[pair[0] + 1..pair[1]] {
                    stats.distance = stats.distance.max(distance_to_chord(dropped.position, a, b));
                }
            }
            let decimated: Vec<CurveSample> = kept.iter().map(|&i| out[i]).collect();
            *out = decimated;
        }
        for pair in out.windows(2) {
            let turn = match (unit(pair[0].derivative), unit(pair[1].derivative)) {
                (Some(a), Some(b)) => a.cross(b).atan2(a.dot(b)).abs(),
                _ => 0.0,
            };
            stats.curvature = stats.curvature.max(turn);
            stats.distance = stats.distance.max(tangent_chord_distance(&pair[0], &pair[1]));
        }
        stats
    }
}

/// Chord distance at the midpoint of the cubic leaving `a` and entering `b` along their
/// derivatives, with control points a third of the chord length away.
///
/// This matches the sagitta of a circular arc to second order.
fn tangent_chord_distance(a: &CurveSample, b: &CurveSample) -> f64 {
    let chord = b.position - a.position;
    let Some(dir) = unit(chord) else {
        return 0.0;
    };
    let side = |d: Vec2| unit(d).map_or(0.0, |t| dir.cross(t));
    chord.hypot() / 8.0 * (side(a.derivative) - side(b.derivative)).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn bezier_endpoints_and_derivatives() {
        let cubic = Bezier::new(
            Point::new(0.0, 0.0),
            &[Point::new(1.0, 2.0), Point::new(3.0, 2.0)],
            Point::new(4.0, 0.0),
        );
        assert_eq!(cubic.degree(), 3);
        let d0 = cubic.compute(0.0);
        assert!(close(d0.position, Point::new(0.0, 0.0)));
        // B'(0) = 3 (P1 - P0), B''(0) = 6 (P2 - 2 P1 + P0)
        assert!((d0.first - Vec2::new(3.0, 6.0)).hypot() < 1e-9);
        assert!((d0.second - Vec2::new(6.0, -12.0)).hypot() < 1e-9);
        let d1 = cubic.compute(1.0);
        assert!(close(d1.position, Point::new(4.0, 0.0)));
        assert!((d1.first - Vec2::new(3.0, -6.0)).hypot() < 1e-9);
        let mid = cubic.compute(0.5);
        assert!(close(mid.position, Point::new(2.0, 1.5)));
    }

    #[test]
    fn quadratic_second_derivative_is_constant() {
        let quad = Bezier::new(
            Point::new(0.0, 0.0),
            &[Point::new(1.0, 1.0)],
            Point::new(2.0, 0.0),
        );
        for t in [0.0, 0.3, 0.9] {
            let d = quad.compute(t);
            assert!((d.second - Vec2::new(0.0, -4.0)).hypot() < 1e-9);
        }
    }

    #[test]
    fn arc_center_for_both_orientations() {
        let ccw = ArcCurve::new(Point::new(1.0, 0.0), FRAC_PI_2, Point::new(0.0, 1.0)).unwrap();
        assert!(close(ccw.center(), Point::ZERO));
        assert!((ccw.radius() - 1.0).abs() < 1e-9);

        let cw = ArcCurve::new(Point::new(1.0, 0.0), -FRAC_PI_2, Point::new(0.0, 1.0)).unwrap();
        assert!(close(cw.center(), Point::new(1.0, 1.0)));

        let major = ArcCurve::new(Point::new(1.0, 0.0), 1.5 * PI, Point::new(0.0, -1.0)).unwrap();
        assert!(close(major.center(), Point::ZERO));
    }

    #[test]
    fn full_turn_and_zero_arcs_are_rejected() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        assert_eq!(
            ArcCurve::new(a, TAU, b),
            Err(Error::DegenerateArc { angle: TAU })
        );
        assert!(ArcCurve::new(a, -2.0 * TAU, b).is_err());
        assert!(ArcCurve::new(a, 0.0, b).is_err());
        assert!(ArcCurve::new(a, PI, a).is_err());
    }

    #[test]
    fn arc_samples_lie_on_circle() {
        let arc = ArcCurve::new(Point::new(1.0, 0.0), PI, Point::new(-1.0, 0.0)).unwrap();
        let mut out = Vec::new();
        let params = TessellationParams::default().curvature_tessellate(PI / 8.0);
        let stats = arc.tessellate(&params, &mut out);
        assert_eq!(stats.segments, 8);
        assert_eq!(out.len(), 9);
        for s in &out {
            assert!((s.position.distance(Point::ZERO) - 1.0).abs() < 1e-9);
        }
        assert!(close(out[4].position, Point::new(0.0, 1.0)));
    }

    #[derive(Debug)]
    struct Zigzag(usize);

    impl CustomCurve for Zigzag {
        fn tessellate(
            &self,
            start: Point,
            end: Point,
            _params: &TessellationParams,
            out: &mut Vec<CurveSample>,
        ) {
            for i in 0..=self.0 {
                let t = i as f64 / self.0 as f64;
                let bump = if i % 2 == 0 { 0.0 } else { 1.0 };
                out.push(CurveSample {
                    position: start.lerp(end, t) + Vec2::new(0.0, bump),
                    derivative: end - start,
                });
            }
        }
    }

    #[test]
    fn custom_output_is_capped() {
        let interp = Interpolator::new(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            None,
            InterpolatorKind::Custom(Arc::new(Zigzag(100))),
        );
        let params = TessellationParams::default().with_max_segments(10);
        let mut out = Vec::new();
        let stats = interp.tessellate(&params, &mut out);
        assert_eq!(out.len(), 11);
        assert_eq!(stats.segments, 10);
        assert_eq!(out[0].position, Point::new(0.0, 0.0));
        assert_eq!(out[10].position, Point::new(10.0, 0.0));
        // Every kept sample is on the baseline; the dropped ones stood a unit above it.
        assert!((stats.distance - 1.0).abs() < 1e-9);
    }

    #[derive(Debug)]
    struct QuarterCircle;

    impl CustomCurve for QuarterCircle {
        fn tessellate(
            &self,
            start: Point,
            end: Point,
            _params: &TessellationParams,
            out: &mut Vec<CurveSample>,
        ) {
            out.push(CurveSample {
                position: start,
                derivative: Vec2::new(0.0, 1.0),
            });
            out.push(CurveSample {
                position: end,
                derivative: Vec2::new(-1.0, 0.0),
            });
        }
    }

    #[test]
    fn custom_chord_distance_follows_derivatives() {
        let interp = Interpolator::new(
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            None,
            InterpolatorKind::Custom(Arc::new(QuarterCircle)),
        );
        let mut out = Vec::new();
        let stats = interp.tessellate(&TessellationParams::default(), &mut out);
        assert_eq!(out.len(), 2);
        // The sagitta of a unit quarter circle is 1 - cos(pi / 4), about 0.29.
        assert!((stats.distance - 0.25).abs() < 1e-9);
        assert!((stats.curvature - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn flat_is_always_two_points() {
        let interp = Interpolator::new(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            None,
            InterpolatorKind::Flat,
        );
        for params in [
            TessellationParams::default(),
            TessellationParams::default().curve_distance_tessellate(1e-6),
            TessellationParams::default().with_max_segments(1),
        ] {
            let mut out = Vec::new();
            interp.tessellate(&params, &mut out);
            assert_eq!(out.len(), 2);
        }
    }
}
