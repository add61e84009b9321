// Copyright 2026 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fill geometry, one triangle list per fill rule over a shared vertex list.

use log::debug;

use crate::kurbo::Point;
use crate::math::EPSILON;
use crate::peniko::Fill;
use crate::TessellatedPath;

/// Which winding numbers are inside a fill.
///
/// The complement rules cover the bounding box of the path minus what the plain rule covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FillRule {
    OddEven,
    NonZero,
    ComplementOddEven,
    ComplementNonZero,
}

impl FillRule {
    pub const ALL: [Self; 4] = [
        Self::OddEven,
        Self::NonZero,
        Self::ComplementOddEven,
        Self::ComplementNonZero,
    ];

    /// Return whether an area with the given winding number should be filled.
    pub fn contains(self, winding: i32) -> bool {
        match self {
            Self::OddEven => winding % 2 != 0,
            Self::NonZero => winding != 0,
            Self::ComplementOddEven => winding % 2 == 0,
            Self::ComplementNonZero => winding == 0,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl From<Fill> for FillRule {
    fn from(fill: Fill) -> Self {
        match fill {
            Fill::NonZero => Self::NonZero,
            Fill::EvenOdd => Self::OddEven,
        }
    }
}

/// Triangles covering the inside of a path for each [`FillRule`].
#[derive(Clone, Debug, Default)]
pub struct FilledPath {
    points: Vec<Point>,
    indices: [Vec<u32>; 4],
}

static_assertions::assert_impl_all!(FilledPath: Send, Sync);

impl FilledPath {
    /// Vertices shared by the triangle lists of all fill rules.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Triangle list into [`points`](Self::points) for `rule`.
    pub fn indices(&self, rule: FillRule) -> &[u32] {
        &self.indices[rule.slot()]
    }

    /// Appends a convex polygon, filled under every rule that accepts `winding`.
    pub fn push_polygon(&mut self, polygon: &[Point], winding: i32) {
        if polygon.len() < 3 {
            return;
        }
        let base = self.points.len() as u32;
        self.points.extend_from_slice(polygon);
        for rule in FillRule::ALL {
            if rule.contains(winding) {
                let list = &mut self.indices[rule.slot()];
                for i in 1..polygon.len() as u32 - 1 {
                    list.extend_from_slice(&[base, base + i, base + i + 1]);
                }
            }
        }
    }
}

/// Produces fill geometry from a tessellated path.
pub trait FillSynthesizer {
    fn synthesize(&self, path: &TessellatedPath) -> FilledPath;
}

/// Decomposes the bounding box of a path into trapezoids of constant winding number.
///
/// The box is cut into horizontal slabs at every vertex and every crossing of two segments,
/// so no two segments cross inside a slab. Inside each slab the segments are ordered by x
/// and the winding number is accumulated from left to right.
///
/// This is quadratic in the number of segments; it is meant for modest paths.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrapezoidFill;

#[derive(Clone, Copy, Debug)]
struct Segment {
    p0: Point,
    p1: Point,
    dir: i32,
}

impl Segment {
    fn new(a: Point, b: Point) -> Option<Self> {
        if (b.y - a.y).abs() <= EPSILON {
            return None;
        }
        let (p0, p1, dir) = if a.y < b.y { (a, b, 1) } else { (b, a, -1) };
        Some(Self { p0, p1, dir })
    }

    fn x_at(&self, y: f64) -> f64 {
        let t = ((y - self.p0.y) / (self.p1.y - self.p0.y)).clamp(0.0, 1.0);
        self.p0.x + t * (self.p1.x - self.p0.x)
    }

    /// The y coordinate where the two segments cross, if they do.
    fn crossing_y(&self, other: &Self) -> Option<f64> {
        let r = self.p1 - self.p0;
        let s = other.p1 - other.p0;
        let denom = r.cross(s);
        if denom.abs() <= EPSILON {
            return None;
        }
        let d = other.p0 - self.p0;
        let t = d.cross(s) / denom;
        let u = d.cross(r) / denom;
        ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)).then(|| self.p0.y + t * r.y)
    }
}

impl FillSynthesizer for TrapezoidFill {
    fn synthesize(&self, path: &TessellatedPath) -> FilledPath {
        let mut filled = FilledPath::default();
        let segments: Vec<Segment> = (0..path.number_contours())
            .flat_map(|c| path.contour_point_data(c).windows(2))
            .filter_map(|w| Segment::new(w[0].position, w[1].position))
            .collect();
        if segments.is_empty() {
            return filled;
        }

        let mut ys: Vec<f64> = segments.iter().flat_map(|s| [s.p0.y, s.p1.y]).collect();
        for (i, a) in segments.iter().enumerate() {
            for b in &segments[i + 1..] {
                ys.extend(a.crossing_y(b));
            }
        }
        ys.sort_by(f64::total_cmp);
        ys.dedup_by(|next, kept| *next - *kept <= EPSILON);

        let bbox = path.bounding_box();
        let mut crossings: Vec<(f64, &Segment)> = Vec::new();
        for slab in ys.windows(2) {
            let (y0, y1) = (slab[0], slab[1]);
            let ym = 0.5 * (y0 + y1);
            crossings.clear();
            crossings.extend(
                segments
                    .iter()
                    .filter(|s| s.p0.y < ym && ym < s.p1.y)
                    .map(|s| (s.x_at(ym), s)),
            );
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = (bbox.x0, bbox.x0);
            let mut winding = 0;
            for (_, s) in &crossings {
                let right = (s.x_at(y0), s.x_at(y1));
                push_trapezoid(&mut filled, y0, y1, left, right, winding);
                winding += s.dir;
                left = right;
            }
            push_trapezoid(&mut filled, y0, y1, left, (bbox.x1, bbox.x1), winding);
        }
        debug!(
            "Filled {} segment(s) into {} slab(s), {} vertices",
            segments.len(),
            ys.len().saturating_sub(1),
            filled.points.len()
        );
        filled
    }
}

/// Adds the trapezoid between x ranges `left` and `right`, given at `y0` and `y1`.
fn push_trapezoid(
    filled: &mut FilledPath,
    y0: f64,
    y1: f64,
    left: (f64, f64),
    right: (f64, f64),
    winding: i32,
) {
    if right.0 - left.0 <= EPSILON && right.1 - left.1 <= EPSILON {
        return;
    }
    filled.push_polygon(
        &[
            Point::new(left.0, y0),
            Point::new(right.0, y0),
            Point::new(right.1, y1),
            Point::new(left.1, y1),
        ],
        winding,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Path, TessellationParams};

    fn area(filled: &FilledPath, rule: FillRule) -> f64 {
        let pts = filled.points();
        filled
            .indices(rule)
            .chunks(3)
            .map(|t| {
                let (a, b, c) = (pts[t[0] as usize], pts[t[1] as usize], pts[t[2] as usize]);
                0.5 * (b - a).cross(c - a).abs()
            })
            .sum()
    }

    fn fill(path: &Path) -> FilledPath {
        TrapezoidFill.synthesize(&path.tessellation())
    }

    #[test]
    fn rule_membership() {
        assert!(FillRule::OddEven.contains(-1));
        assert!(!FillRule::OddEven.contains(2));
        assert!(FillRule::NonZero.contains(2));
        assert!(FillRule::ComplementNonZero.contains(0));
        assert!(FillRule::ComplementOddEven.contains(2));
        assert_eq!(FillRule::from(Fill::EvenOdd), FillRule::OddEven);
    }

    #[test]
    fn triangle_area() {
        let mut path = Path::default();
        path.move_to(Point::new(0.0, 0.0))
            .unwrap()
            .line_to(Point::new(4.0, 0.0))
            .unwrap()
            .line_to(Point::new(0.0, 3.0))
            .unwrap()
            .end()
            .unwrap();
        let filled = fill(&path);
        assert!((area(&filled, FillRule::NonZero) - 6.0).abs() < 1e-9);
        assert!((area(&filled, FillRule::OddEven) - 6.0).abs() < 1e-9);
        assert!((area(&filled, FillRule::ComplementNonZero) - 6.0).abs() < 1e-9);
        for ix in filled.indices(FillRule::NonZero) {
            assert!((*ix as usize) < filled.points().len());
        }
    }

    #[test]
    fn nested_squares_differ_by_rule() {
        let mut path = Path::default();
        // Both squares wind the same way, so the inner one has winding two.
        for (lo, hi) in [(0.0, 10.0), (2.0, 8.0)] {
            path.move_to(Point::new(lo, lo))
                .unwrap()
                .line_to(Point::new(hi, lo))
                .unwrap()
                .line_to(Point::new(hi, hi))
                .unwrap()
                .line_to(Point::new(lo, hi))
                .unwrap()
                .end()
                .unwrap();
        }
        let filled = fill(&path);
        assert!((area(&filled, FillRule::NonZero) - 100.0).abs() < 1e-9);
        assert!((area(&filled, FillRule::OddEven) - 64.0).abs() < 1e-9);
        assert!((area(&filled, FillRule::ComplementOddEven) - 36.0).abs() < 1e-9);
        assert!(area(&filled, FillRule::ComplementNonZero).abs() < 1e-9);
    }

    #[test]
    fn self_intersecting_bowtie() {
        let mut path = Path::default();
        path.move_to(Point::new(0.0, 0.0))
            .unwrap()
            .line_to(Point::new(2.0, 2.0))
            .unwrap()
            .line_to(Point::new(2.0, 0.0))
            .unwrap()
            .line_to(Point::new(0.0, 2.0))
            .unwrap()
            .end()
            .unwrap();
        let filled = fill(&path);
        // Two triangles of area 1 meeting at (1, 1).
        assert!((area(&filled, FillRule::NonZero) - 2.0).abs() < 1e-9);
        assert!((area(&filled, FillRule::ComplementNonZero) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn curved_fill_is_close_to_circle() {
        let mut path = Path::new(TessellationParams::default().with_max_segments(64));
        path.move_to(Point::new(1.0, 0.0))
            .unwrap()
            .arc_to(std::f64::consts::PI, Point::new(-1.0, 0.0))
            .unwrap()
            .arc_end(std::f64::consts::PI)
            .unwrap();
        let filled = fill(&path);
        let a = area(&filled, FillRule::NonZero);
        assert!((a - std::f64::consts::PI).abs() < 0.05, "area {a}");
    }
}
