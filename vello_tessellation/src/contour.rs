// Copyright 2026 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use smallvec::SmallVec;

use crate::interpolator::{
    ArcCurve, Bezier, CustomInterpolator, Interpolator, InterpolatorId, InterpolatorKind,
};
use crate::kurbo::Point;
use crate::Error;

/// A single closed outline: an ordered loop of points and the interpolators joining them.
///
/// A contour is built by [`start`](Self::start), followed by any number of edges, and
/// frozen by one of the `end` methods, which add the closing edge back to the start point.
///
/// # Invariants
///
/// * Interpolator `i` starts at point `i`; each interpolator starts where the previous
///   one ends.
/// * Once ended, the number of interpolators equals the number of points and the last
///   interpolator ends at point `0`.
#[derive(Clone, Debug, Default)]
pub struct Contour {
    points: Vec<Point>,
    interpolators: Vec<Interpolator>,
    controls: SmallVec<[Point; 2]>,
    ended: bool,
}

impl Contour {
    /// Creates an empty contour.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the start point. May only be called once, before anything else.
    pub fn start(&mut self, pt: Point) -> Result<(), Error> {
        if self.ended {
            return Err(Error::Ended);
        }
        if !self.points.is_empty() {
            return Err(Error::AlreadyStarted);
        }
        self.points.push(pt);
        Ok(())
    }

    /// Adds an edge to `pt`: a line, or a Bezier curve through the pending control points.
    pub fn edge_to(&mut self, pt: Point) -> Result<(), Error> {
        let start = self.check_open()?;
        let kind = self.take_controls(start, pt);
        self.push_edge(start, pt, kind);
        Ok(())
    }

    /// Adds a control point for the next Bezier edge.
    pub fn add_control_point(&mut self, pt: Point) -> Result<(), Error> {
        self.check_open()?;
        self.controls.push(pt);
        Ok(())
    }

    /// Adds an arc of `angle` radians to `pt`.
    pub fn arc_to(&mut self, angle: f64, pt: Point) -> Result<(), Error> {
        let start = self.check_no_controls()?;
        let arc = ArcCurve::new(start, angle, pt)?;
        self.push_edge(start, pt, InterpolatorKind::Arc(arc));
        Ok(())
    }

    /// Adds a caller supplied edge.
    ///
    /// The interpolator must have been created with [`prev_interpolator`](Self::prev_interpolator)
    /// of this contour.
    pub fn custom_to(&mut self, custom: CustomInterpolator) -> Result<(), Error> {
        let start = self.check_no_controls()?;
        self.check_predecessor(&custom)?;
        self.push_edge(start, custom.end, InterpolatorKind::Custom(custom.curve));
        Ok(())
    }

    /// Ends the contour with a line, or a Bezier through the pending control points.
    pub fn end(&mut self) -> Result<(), Error> {
        let start = self.check_open()?;
        let kind = self.take_controls(start, self.points[0]);
        self.push_closing(start, kind);
        Ok(())
    }

    /// Ends the contour with an arc of `angle` radians.
    pub fn end_arc(&mut self, angle: f64) -> Result<(), Error> {
        let start = self.check_no_controls()?;
        let arc = ArcCurve::new(start, angle, self.points[0])?;
        self.push_closing(start, InterpolatorKind::Arc(arc));
        Ok(())
    }

    /// Ends the contour with a caller supplied edge, which must end at the start point.
    pub fn end_custom(&mut self, custom: CustomInterpolator) -> Result<(), Error> {
        let start = self.check_no_controls()?;
        self.check_predecessor(&custom)?;
        if custom.end != self.points[0] {
            return Err(Error::ClosingMismatch);
        }
        self.push_closing(start, InterpolatorKind::Custom(custom.curve));
        Ok(())
    }

    /// The last interpolator added, which custom interpolators must be built against.
    pub fn prev_interpolator(&self) -> Option<InterpolatorId> {
        self.interpolators.len().checked_sub(1).map(InterpolatorId)
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Whether [`start`](Self::start) has been called.
    pub fn is_started(&self) -> bool {
        !self.points.is_empty()
    }

    /// Returns point `i`; point `0` is the start point.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.number_points()`.
    pub fn point(&self, i: usize) -> Point {
        self.points[i]
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn number_points(&self) -> usize {
        self.points.len()
    }

    /// Returns the interpolator from point `i` to point `i + 1`.
    ///
    /// For an ended contour, `interpolator(number_points() - 1)` is the closing edge.
    ///
    /// # Panics
    ///
    /// Panics if there is no such interpolator.
    pub fn interpolator(&self, i: usize) -> &Interpolator {
        &self.interpolators[i]
    }

    pub fn interpolators(&self) -> &[Interpolator] {
        &self.interpolators
    }

    /// Returns the point the next edge starts from, if the contour accepts edges.
    fn check_open(&self) -> Result<Point, Error> {
        if self.ended {
            return Err(Error::Ended);
        }
        self.points.last().copied().ok_or(Error::NotStarted)
    }

    fn check_no_controls(&self) -> Result<Point, Error> {
        let start = self.check_open()?;
        if self.controls.is_empty() {
            Ok(start)
        } else {
            Err(Error::PendingControlPoints(self.controls.len()))
        }
    }

    fn check_predecessor(&self, custom: &CustomInterpolator) -> Result<(), Error> {
        let actual = self.prev_interpolator();
        if custom.prev == actual {
            Ok(())
        } else {
            Err(Error::PredecessorMismatch {
                declared: custom.prev,
                actual,
            })
        }
    }

    fn take_controls(&mut self, start: Point, end: Point) -> InterpolatorKind {
        if self.controls.is_empty() {
            InterpolatorKind::Flat
        } else {
            let bezier = Bezier::new(start, &self.controls, end);
            self.controls.clear();
            InterpolatorKind::Bezier(bezier)
        }
    }

    fn push_edge(&mut self, start: Point, end: Point, kind: InterpolatorKind) {
        let interp = Interpolator::new(start, end, self.prev_interpolator(), kind);
        self.interpolators.push(interp);
        self.points.push(end);
    }

    fn push_closing(&mut self, start: Point, kind: InterpolatorKind) {
        let interp = Interpolator::new(start, self.points[0], self.prev_interpolator(), kind);
        self.interpolators.push(interp);
        self.ended = true;
    }
}
