// Copyright 2026 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adaptive sampling of paths into line strips.

use std::ops::Range;
use std::sync::{Arc, OnceLock};

use log::{debug, warn};

use crate::interpolator::{CurveDerivatives, CurveSample, ParametricCurve};
use crate::kurbo::{Point, Rect, Vec2};
use crate::math::{bounding_box, curvature_density, distance_to_chord, simpson_curvature};
use crate::{FilledPath, FillSynthesizer, Path, StrokedPath, TrapezoidFill};

/// Curvature threshold used when none is otherwise specified, tessellating a circle into 60 points.
pub(crate) const DEFAULT_CURVATURE_THRESHOLD: f64 = std::f64::consts::PI / 30.0;

/// What [`TessellationParams::threshold`] measures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThresholdMode {
    /// Estimated curvature, in radians, between successive samples.
    Curvature,
    /// Maximum distance, in path units, between the chord of successive samples and the
    /// curve between them.
    CurveDistance,
}

/// How finely to tessellate the edges of a path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TessellationParams {
    pub mode: ThresholdMode,
    /// Quality goal, in the units of [`mode`](Self::mode).
    pub threshold: f64,
    /// Maximum number of segments per edge.
    ///
    /// This is a hard cap: when reached, refinement stops even if the quality goal
    /// has not been met.
    pub max_segments: u32,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            mode: ThresholdMode::Curvature,
            threshold: DEFAULT_CURVATURE_THRESHOLD,
            max_segments: 32,
        }
    }
}

impl TessellationParams {
    /// Tessellate so that at most `radians` of curvature lies between successive points.
    pub fn curvature_tessellate(mut self, radians: f64) -> Self {
        self.mode = ThresholdMode::Curvature;
        self.threshold = radians;
        self
    }

    /// Curvature tessellation targeting `n` points for a full circle.
    pub fn curvature_tessellate_num_points_in_circle(self, n: u32) -> Self {
        self.curvature_tessellate(std::f64::consts::TAU / f64::from(n.max(1)))
    }

    /// Tessellate so that chords stay within `distance` of the curve.
    pub fn curve_distance_tessellate(mut self, distance: f64) -> Self {
        self.mode = ThresholdMode::CurveDistance;
        self.threshold = distance;
        self
    }

    /// Builder method for setting the per-edge segment cap.
    pub fn with_max_segments(mut self, max_segments: u32) -> Self {
        self.max_segments = max_segments;
        self
    }

    /// The segment cap actually applied; an edge always has at least one segment.
    pub fn segment_cap(&self) -> u32 {
        self.max_segments.max(1)
    }

    /// Angular step for round joins and caps.
    ///
    /// In curve distance mode the stroke width needed to turn the distance into an angle is
    /// unknown, so the default curvature threshold is used instead.
    pub fn angular_threshold(&self) -> f64 {
        match self.mode {
            ThresholdMode::Curvature => self.threshold,
            ThresholdMode::CurveDistance => DEFAULT_CURVATURE_THRESHOLD,
        }
    }

    /// Number of segments for a circular arc of `angle` radians at the angular threshold.
    pub(crate) fn arc_segments(&self, angle: f64) -> u32 {
        let step = self.angular_threshold();
        let wanted = if step > 0.0 {
            (angle.abs() / step).ceil() as u32
        } else {
            u32::MAX
        };
        wanted.clamp(1, self.segment_cap())
    }
}

/// Worst case quality achieved while tessellating one or more edges.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeStats {
    /// Largest estimated curvature between successive samples, in radians.
    pub curvature: f64,
    /// Largest distance between a chord and the curve it approximates.
    pub distance: f64,
    /// Number of segments (the most used by any edge, when combined).
    pub segments: u32,
}

impl EdgeStats {
    fn combine(self, other: Self) -> Self {
        Self {
            curvature: self.curvature.max(other.curvature),
            distance: self.distance.max(other.distance),
            segments: self.segments.max(other.segments),
        }
    }
}

/// A parameter interval of a curve under refinement.
#[derive(Clone, Copy, Debug)]
struct Piece {
    t0: f64,
    t1: f64,
    start: CurveDerivatives,
    mid: CurveDerivatives,
    end: CurveDerivatives,
    curvature: f64,
    distance: f64,
}

impl Piece {
    fn new(
        curve: &(impl ParametricCurve + ?Sized),
        t0: f64,
        start: CurveDerivatives,
        t1: f64,
        end: CurveDerivatives,
    ) -> Self {
        let mid = curve.compute(0.5 * (t0 + t1));
        let curvature = simpson_curvature(
            t0,
            t1,
            curvature_density(start.first, start.second),
            curvature_density(mid.first, mid.second),
            curvature_density(end.first, end.second),
        );
        let distance = distance_to_chord(mid.position, start.position, end.position);
        Self {
            t0,
            t1,
            start,
            mid,
            end,
            curvature,
            distance,
        }
    }

    fn error(&self, mode: ThresholdMode) -> f64 {
        match mode {
            ThresholdMode::Curvature => self.curvature,
            ThresholdMode::CurveDistance => self.distance,
        }
    }
}

/// Tessellates a parametric curve by binary subdivision, appending samples to `out`.
///
/// Starting from [`ParametricCurve::initial_subdivisions`] equal intervals, the interval
/// with the largest error (curvature or chord distance at its parameter midpoint) is split
/// in half until every interval meets the threshold, or until the segment cap is reached.
/// Splitting the worst interval first spends a capped budget where it matters most.
pub fn tessellate_parametric(
    curve: &(impl ParametricCurve + ?Sized),
    params: &TessellationParams,
    out: &mut Vec<CurveSample>,
) -> EdgeStats {
    let cap = params.segment_cap();
    let seed = curve.initial_subdivisions().clamp(1, cap);
    let mut pieces: Vec<Piece> = Vec::with_capacity(cap as usize);
    let mut t0 = 0.0;
    let mut start = curve.compute(0.0);
    for i in 1..=seed {
        let t1 = f64::from(i) / f64::from(seed);
        let end = curve.compute(t1);
        pieces.push(Piece::new(curve, t0, start, t1, end));
        t0 = t1;
        start = end;
    }

    while pieces.len() < cap as usize {
        let worst = pieces
            .iter()
            .enumerate()
            .filter(|(_, piece)| !(piece.error(params.mode) <= params.threshold))
            .max_by(|(_, a), (_, b)| a.error(params.mode).total_cmp(&b.error(params.mode)));
        let Some((ix, _)) = worst else {
            break;
        };
        let piece = pieces[ix];
        let tm = 0.5 * (piece.t0 + piece.t1);
        pieces[ix] = Piece::new(curve, piece.t0, piece.start, tm, piece.mid);
        pieces.insert(ix + 1, Piece::new(curve, tm, piece.mid, piece.t1, piece.end));
    }

    out.push(pieces[0].start.into());
    let mut stats = EdgeStats::default();
    for piece in &pieces {
        out.push(piece.end.into());
        stats.curvature = stats.curvature.max(piece.curvature);
        stats.distance = stats.distance.max(piece.distance);
    }
    stats.segments = pieces.len() as u32;
    stats
}

/// A point of a [`TessellatedPath`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TessellatedPoint {
    pub position: Point,
    /// Derivative of the edge's curve at this point.
    pub derivative: Vec2,
    /// Arc length from the start of the edge.
    pub distance_from_edge_start: f64,
    /// Arc length from the start of the contour.
    pub distance_from_contour_start: f64,
    /// Length of the edge; the same for all points of an edge.
    pub edge_length: f64,
    /// Length of the contour without its closing edge; the same for all points of a contour.
    pub open_contour_length: f64,
    /// Length of the contour with its closing edge; the same for all points of a contour.
    pub closed_contour_length: f64,
}

#[derive(Clone, Debug, Default)]
struct ContourRanges {
    /// All points, closing edge included.
    points: Range<usize>,
    /// Point range of each edge; the last edge is the closing edge.
    edges: Vec<Range<usize>>,
}

/// The tessellation of a [`Path`].
///
/// Contours and edges keep the order of the source path, so the closing edge of each
/// contour is its last edge. Points shared by consecutive edges are duplicated, as their
/// derivative and distance values differ.
#[derive(Debug)]
pub struct TessellatedPath {
    params: TessellationParams,
    points: Vec<TessellatedPoint>,
    contours: Vec<ContourRanges>,
    stats: EdgeStats,
    bbox: Rect,
    stroked: OnceLock<Arc<StrokedPath>>,
    filled: OnceLock<Arc<FilledPath>>,
}

static_assertions::assert_impl_all!(TessellatedPath: Send, Sync);

impl TessellatedPath {
    /// Tessellates `path` with `params`.
    ///
    /// Contours that were never ended are skipped.
    pub fn new(path: &Path, params: TessellationParams) -> Self {
        if params.max_segments == 0 {
            warn!("Tessellating with a segment cap of 0, using 1 instead");
        }
        let mut points = Vec::new();
        let mut contours = Vec::with_capacity(path.number_contours());
        let mut stats = EdgeStats::default();
        let mut samples = Vec::new();

        for contour in path.contours() {
            if !contour.is_ended() {
                debug!("Skipping unended contour with {} points", contour.number_points());
                continue;
            }
            let contour_start = points.len();
            let mut edges = Vec::with_capacity(contour.number_points());
            let mut running = 0.0;
            let mut open_length = 0.0;
            let edge_count = contour.number_points();
            for (e, interp) in contour.interpolators().iter().enumerate() {
                let edge_stats = interp.tessellate(&params, &mut samples);
                stats = stats.combine(edge_stats);
                let edge_start = points.len();
                let mut along = 0.0;
                let mut prev = samples[0].position;
                for sample in &samples {
                    along += sample.position.distance(prev);
                    prev = sample.position;
                    points.push(TessellatedPoint {
                        position: sample.position,
                        derivative: sample.derivative,
                        distance_from_edge_start: along,
                        distance_from_contour_start: running + along,
                        edge_length: 0.0,
                        open_contour_length: 0.0,
                        closed_contour_length: 0.0,
                    });
                }
                for p in &mut points[edge_start..] {
                    p.edge_length = along;
                }
                running += along;
                if e + 1 < edge_count {
                    open_length = running;
                }
                edges.push(edge_start..points.len());
            }
            for p in &mut points[contour_start..] {
                p.open_contour_length = open_length;
                p.closed_contour_length = running;
            }
            contours.push(ContourRanges {
                points: contour_start..points.len(),
                edges,
            });
        }

        let bbox = bounding_box(points.iter().map(|p| p.position)).unwrap_or(Rect::ZERO);
        debug!(
            "Tessellated {} contour(s) into {} points, curvature {:.4}, distance {:.4}, max segments {}",
            contours.len(),
            points.len(),
            stats.curvature,
            stats.distance,
            stats.segments
        );
        Self {
            params,
            points,
            contours,
            stats,
            bbox,
            stroked: OnceLock::new(),
            filled: OnceLock::new(),
        }
    }

    pub fn tessellation_params(&self) -> &TessellationParams {
        &self.params
    }

    /// Largest curvature between successive points achieved by any edge.
    pub fn effective_curvature_threshold(&self) -> f64 {
        self.stats.curvature
    }

    /// Largest distance between a chord and its curve achieved by any edge.
    pub fn effective_curve_distance_threshold(&self) -> f64 {
        self.stats.distance
    }

    /// Largest number of segments used by any edge.
    pub fn max_segments(&self) -> u32 {
        self.stats.segments
    }

    /// All points of all contours.
    pub fn point_data(&self) -> &[TessellatedPoint] {
        &self.points
    }

    pub fn number_contours(&self) -> usize {
        self.contours.len()
    }

    /// Range into [`point_data`](Self::point_data) of a contour, closing edge included.
    ///
    /// # Panics
    ///
    /// Panics if `contour` is out of bounds.
    pub fn contour_range(&self, contour: usize) -> Range<usize> {
        self.contours[contour].points.clone()
    }

    /// Range into [`point_data`](Self::point_data) of a contour without its closing edge.
    ///
    /// # Panics
    ///
    /// Panics if `contour` is out of bounds.
    pub fn unclosed_contour_range(&self, contour: usize) -> Range<usize> {
        let c = &self.contours[contour];
        let end = c.edges.last().map_or(c.points.start, |closing| closing.start);
        c.points.start..end
    }

    pub fn contour_point_data(&self, contour: usize) -> &[TessellatedPoint] {
        &self.points[self.contour_range(contour)]
    }

    pub fn unclosed_contour_point_data(&self, contour: usize) -> &[TessellatedPoint] {
        &self.points[self.unclosed_contour_range(contour)]
    }

    /// Number of edges of a contour, closing edge included.
    pub fn number_edges(&self, contour: usize) -> usize {
        self.contours[contour].edges.len()
    }

    /// Range into [`point_data`](Self::point_data) of an edge, both end points included.
    pub fn edge_range(&self, contour: usize, edge: usize) -> Range<usize> {
        self.contours[contour].edges[edge].clone()
    }

    pub fn edge_point_data(&self, contour: usize, edge: usize) -> &[TessellatedPoint] {
        &self.points[self.edge_range(contour, edge)]
    }

    /// Bounding box of all points, [`Rect::ZERO`] for an empty tessellation.
    pub fn bounding_box(&self) -> Rect {
        self.bbox
    }

    pub fn bounding_box_min(&self) -> Point {
        self.bbox.origin()
    }

    pub fn bounding_box_max(&self) -> Point {
        Point::new(self.bbox.x1, self.bbox.y1)
    }

    pub fn bounding_box_size(&self) -> Vec2 {
        self.bbox.size().to_vec2()
    }

    /// The stroke geometry of this tessellation, built on first access.
    pub fn stroked(&self) -> &Arc<StrokedPath> {
        self.stroked
            .get_or_init(|| Arc::new(StrokedPath::new(self)))
    }

    /// The fill geometry of this tessellation, built on first access with [`TrapezoidFill`].
    pub fn filled(&self) -> &Arc<FilledPath> {
        self.filled
            .get_or_init(|| Arc::new(TrapezoidFill.synthesize(self)))
    }
}
