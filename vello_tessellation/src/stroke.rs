// Copyright 2026 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Expansion of a tessellated centerline into stroke triangles.
//!
//! Geometry does not depend on the stroke width: each vertex carries a centerline position
//! and a `pre_offset` in units of half the stroke width, which the vertex stage scales.

use std::f64::consts::{PI, TAU};

use log::{debug, trace};

use crate::kurbo::{Cap, Join, Point, Vec2};
use crate::math::{left_normal, rotate, unit, EPSILON};
use crate::{TessellatedPath, TessellatedPoint, TessellationParams};

/// Below this, `1 + cos` of a join's turning angle is treated as a full reversal and the
/// miter tip collapses onto the incoming side.
const MITER_EPSILON: f64 = 1e-6;

/// A vertex of stroke geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokePoint {
    /// Point on the centerline.
    pub position: Point,
    /// Offset from [`position`](Self::position) in units of half the stroke width.
    pub pre_offset: Vec2,
    pub distance_from_edge_start: f64,
    pub distance_from_contour_start: f64,
    /// For miter joins, the length of `pre_offset` at the miter tip, `1.0` on the sides and
    /// `0.0` at the center. Zero for everything else.
    pub miter_distance: f64,
    /// `true` on the stroke boundary, `false` on the centerline.
    pub on_boundary: bool,
    /// Draw order of the primitive this vertex belongs to.
    pub depth: u32,
}

/// Triangles of one stroking style.
#[derive(Clone, Debug, Default)]
pub struct StrokeGeometry {
    pub points: Vec<StrokePoint>,
    /// Triangle list into [`points`](Self::points).
    pub indices: Vec<u32>,
    /// Number of distinct depth values used, one per primitive.
    pub depth_count: u32,
}

static EMPTY: StrokeGeometry = StrokeGeometry {
    points: Vec::new(),
    indices: Vec::new(),
    depth_count: 0,
};

impl StrokeGeometry {
    fn next_depth(&mut self) -> u32 {
        let depth = self.depth_count;
        self.depth_count += 1;
        depth
    }

    fn push(&mut self, at: &TessellatedPoint, pre_offset: Vec2, miter: f64, depth: u32) -> u32 {
        let ix = self.points.len() as u32;
        self.points.push(StrokePoint {
            position: at.position,
            pre_offset,
            distance_from_edge_start: at.distance_from_edge_start,
            distance_from_contour_start: at.distance_from_contour_start,
            miter_distance: miter,
            on_boundary: pre_offset != Vec2::ZERO,
            depth,
        });
        ix
    }

    fn fan(&mut self, center: u32, rim: &[u32]) {
        for pair in rim.windows(2) {
            self.indices.extend_from_slice(&[center, pair[0], pair[1]]);
        }
    }

    /// Adds the rectangle of every non-degenerate segment of the points.
    fn add_segments(&mut self, points: &[TessellatedPoint]) {
        for pair in points.windows(2) {
            let Some(dir) = unit(pair[1].position - pair[0].position) else {
                trace!("Skipping zero length segment at {:?}", pair[0].position);
                continue;
            };
            let n = left_normal(dir);
            let depth = self.next_depth();
            let mut ix = [0_u32; 6];
            for (k, p) in pair.iter().enumerate() {
                ix[3 * k] = self.push(p, Vec2::ZERO, 0.0, depth);
                ix[3 * k + 1] = self.push(p, n, 0.0, depth);
                ix[3 * k + 2] = self.push(p, -n, 0.0, depth);
            }
            let [a0, a1, a2, b0, b1, b2] = ix;
            self.indices
                .extend_from_slice(&[a0, a1, b1, a0, b1, b0, a0, b0, b2, a0, b2, a2]);
        }
    }

    /// Adds a join at `at` between unit tangents `t0` (incoming) and `t1` (outgoing).
    fn add_join(
        &mut self,
        style: Join,
        params: &TessellationParams,
        at: &TessellatedPoint,
        t0: Vec2,
        t1: Vec2,
    ) {
        let cross = t0.cross(t1);
        let dot = t0.dot(t1);
        if cross.abs() <= EPSILON && dot > 0.0 {
            return;
        }
        // The join fills the outside of the turn.
        let side = if cross > 0.0 { -1.0 } else { 1.0 };
        let n0 = left_normal(t0) * side;
        let n1 = left_normal(t1) * side;
        let depth = self.next_depth();
        let c = self.push(at, Vec2::ZERO, 0.0, depth);
        match style {
            Join::Bevel => {
                let a = self.push(at, n0, 0.0, depth);
                let b = self.push(at, n1, 0.0, depth);
                self.indices.extend_from_slice(&[c, a, b]);
            }
            Join::Miter => {
                let denom = 1.0 + n0.dot(n1);
                let tip = if denom > MITER_EPSILON {
                    (n0 + n1) / denom
                } else {
                    n0
                };
                let a = self.push(at, n0, 1.0, depth);
                let t = self.push(at, tip, tip.hypot(), depth);
                let b = self.push(at, n1, 1.0, depth);
                self.indices.extend_from_slice(&[c, a, t, c, t, b]);
            }
            Join::Round => {
                let angle = cross.abs().atan2(dot);
                let steps = params.arc_segments(angle);
                let rim: Vec<u32> = (0..=steps)
                    .map(|j| {
                        let v = if j == steps {
                            n1
                        } else {
                            rotate(n0, -side * angle * f64::from(j) / f64::from(steps))
                        };
                        self.push(at, v, 0.0, depth)
                    })
                    .collect();
                self.fan(c, &rim);
            }
        }
    }

    /// Adds a cap at `at` pointing along the unit vector `v`.
    fn add_cap(&mut self, style: Cap, params: &TessellationParams, at: &TessellatedPoint, v: Vec2) {
        let n = left_normal(v);
        let offsets: Vec<Vec2> = match style {
            Cap::Butt => return,
            Cap::Square => vec![n, n + v, v - n, -n],
            Cap::Round => {
                let steps = params.arc_segments(PI);
                (0..=steps)
                    .map(|j| {
                        if j == steps {
                            -n
                        } else {
                            rotate(n, -PI * f64::from(j) / f64::from(steps))
                        }
                    })
                    .collect()
            }
        };
        self.add_fan_at(at, &offsets);
    }

    /// Adds a cap for a contour without any direction, a disc or a square around `at`.
    fn add_dot(&mut self, style: Cap, params: &TessellationParams, at: &TessellatedPoint) {
        let offsets: Vec<Vec2> = match style {
            Cap::Butt => return,
            Cap::Square => vec![
                Vec2::new(1.0, 1.0),
                Vec2::new(-1.0, 1.0),
                Vec2::new(-1.0, -1.0),
                Vec2::new(1.0, -1.0),
                Vec2::new(1.0, 1.0),
            ],
            Cap::Round => {
                let steps = params.arc_segments(TAU).max(3);
                (0..=steps)
                    .map(|j| {
                        if j == steps {
                            Vec2::new(1.0, 0.0)
                        } else {
                            rotate(Vec2::new(1.0, 0.0), TAU * f64::from(j) / f64::from(steps))
                        }
                    })
                    .collect()
            }
        };
        self.add_fan_at(at, &offsets);
    }

    fn add_fan_at(&mut self, at: &TessellatedPoint, offsets: &[Vec2]) {
        let depth = self.next_depth();
        let c = self.push(at, Vec2::ZERO, 0.0, depth);
        let rim: Vec<u32> = offsets
            .iter()
            .map(|v| self.push(at, *v, 0.0, depth))
            .collect();
        self.fan(c, &rim);
    }
}

/// Direction leaving the last non-degenerate segment of an edge.
fn exit_tangent(points: &[TessellatedPoint]) -> Option<Vec2> {
    points
        .windows(2)
        .rev()
        .find_map(|w| unit(w[1].position - w[0].position))
        .or_else(|| points.last().and_then(|p| unit(p.derivative)))
}

/// Direction entering the first non-degenerate segment of an edge.
fn entry_tangent(points: &[TessellatedPoint]) -> Option<Vec2> {
    points
        .windows(2)
        .find_map(|w| unit(w[1].position - w[0].position))
        .or_else(|| points.first().and_then(|p| unit(p.derivative)))
}

const JOINS: [Join; 3] = [Join::Round, Join::Bevel, Join::Miter];
const CAPS: [Cap; 2] = [Cap::Round, Cap::Square];

fn join_slot(style: Join) -> usize {
    match style {
        Join::Round => 0,
        Join::Bevel => 1,
        Join::Miter => 2,
    }
}

fn closing_slot(closing_edge: bool) -> usize {
    usize::from(!closing_edge)
}

/// Stroke geometry of a [`TessellatedPath`] for every join and cap style.
///
/// Edges and joins come in two variants: with the closing edge of each contour, for
/// closed strokes, and without it, for open strokes. Caps only exist for open strokes.
/// Joins are only placed where two edges meet, skipping over edges of zero length; points
/// inside an edge are joined by the overlap of consecutive segment rectangles.
#[derive(Debug, Default)]
pub struct StrokedPath {
    edges: [StrokeGeometry; 2],
    joins: [[StrokeGeometry; 3]; 2],
    caps: [StrokeGeometry; 2],
}

static_assertions::assert_impl_all!(StrokedPath: Send, Sync);

impl StrokedPath {
    /// Builds the stroke geometry of `path`.
    pub fn new(path: &TessellatedPath) -> Self {
        let params = path.tessellation_params();
        let mut stroked = Self::default();
        for contour in 0..path.number_contours() {
            let n = path.number_edges(contour);
            for closing_edge in [true, false] {
                let slot = closing_slot(closing_edge);
                let edge_count = if closing_edge { n } else { n.saturating_sub(1) };
                for e in 0..edge_count {
                    stroked.edges[slot].add_segments(path.edge_point_data(contour, e));
                }

                // Zero length edges have no direction; join across them to the next edge
                // that has one.
                let directed: Vec<(usize, Vec2, Vec2)> = (0..edge_count)
                    .filter_map(|e| {
                        let points = path.edge_point_data(contour, e);
                        Some((e, entry_tangent(points)?, exit_tangent(points)?))
                    })
                    .collect();
                let m = directed.len();
                let seams = if closing_edge { m } else { m.saturating_sub(1) };
                for k in 0..seams {
                    let (e, _, t0) = directed[k];
                    let (_, t1, _) = directed[(k + 1) % m];
                    let Some(at) = path.edge_point_data(contour, e).last() else {
                        continue;
                    };
                    for style in JOINS {
                        stroked.joins[slot][join_slot(style)].add_join(style, params, at, t0, t1);
                    }
                }
            }
            stroked.add_caps(path, contour);
        }
        debug!(
            "Stroked {} contour(s): {} edge vertices, {} round join vertices, {} round cap vertices",
            path.number_contours(),
            stroked.edges[0].points.len(),
            stroked.joins[0][0].points.len(),
            stroked.caps[0].points.len()
        );
        stroked
    }

    fn add_caps(&mut self, path: &TessellatedPath, contour: usize) {
        let params = path.tessellation_params();
        let open_edges = path.number_edges(contour).saturating_sub(1);
        let start = (0..open_edges)
            .find_map(|e| entry_tangent(path.edge_point_data(contour, e)).map(|t| (e, t)));
        let end = (0..open_edges)
            .rev()
            .find_map(|e| exit_tangent(path.edge_point_data(contour, e)).map(|t| (e, t)));
        match (start, end) {
            (Some((_, t0)), Some((last, t1))) => {
                let (Some(head), Some(tail)) = (
                    path.contour_point_data(contour).first(),
                    path.edge_point_data(contour, last).last(),
                ) else {
                    return;
                };
                for (slot, style) in CAPS.into_iter().enumerate() {
                    self.caps[slot].add_cap(style, params, head, -t0);
                    self.caps[slot].add_cap(style, params, tail, t1);
                }
            }
            _ => {
                let Some(at) = path.contour_point_data(contour).first() else {
                    return;
                };
                for (slot, style) in CAPS.into_iter().enumerate() {
                    self.caps[slot].add_dot(style, params, at);
                }
            }
        }
    }

    /// Segment rectangles of all edges, with or without each contour's closing edge.
    pub fn edges(&self, closing_edge: bool) -> &StrokeGeometry {
        &self.edges[closing_slot(closing_edge)]
    }

    /// Joins of the given style, with or without those touching each contour's closing edge.
    pub fn joins(&self, style: Join, closing_edge: bool) -> &StrokeGeometry {
        &self.joins[closing_slot(closing_edge)][join_slot(style)]
    }

    /// Caps at both ends of every open contour. [`Cap::Butt`] has no geometry.
    pub fn caps(&self, style: Cap) -> &StrokeGeometry {
        match style {
            Cap::Butt => &EMPTY,
            Cap::Round => &self.caps[0],
            Cap::Square => &self.caps[1],
        }
    }
}
