// Copyright 2026 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::{Arc, OnceLock};

use crate::interpolator::{CustomInterpolator, InterpolatorId};
use crate::kurbo::Point;
use crate::{Contour, Error, TessellatedPath, TessellationParams};

/// A collection of contours, the authoring model of vector geometry.
///
/// Authoring methods append to the current (last) contour and return `&mut Self`
/// so calls can be chained with `?`. A failed call leaves the path unchanged.
///
/// The path's [`TessellatedPath`] is built lazily by [`tessellation`](Self::tessellation)
/// and dropped by any mutation. Tessellations already handed out are never modified.
#[derive(Clone, Debug, Default)]
pub struct Path {
    contours: Vec<Contour>,
    params: TessellationParams,
    tessellation: OnceLock<Arc<TessellatedPath>>,
}

static_assertions::assert_impl_all!(Path: Send, Sync);

impl Path {
    /// Creates an empty path tessellated with `params`.
    pub fn new(params: TessellationParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Creates a path with the geometry of `other`, tessellated with `params`.
    pub fn with_params(other: &Self, params: TessellationParams) -> Self {
        Self {
            contours: other.contours.clone(),
            params,
            tessellation: OnceLock::new(),
        }
    }

    /// Begins a new contour at `pt`, ending the current one with a line if it is still open.
    pub fn move_to(&mut self, pt: Point) -> Result<&mut Self, Error> {
        if let Some(current) = self.contours.last_mut() {
            if current.is_started() && !current.is_ended() {
                current.end()?;
            }
        }
        let mut contour = Contour::new();
        contour.start(pt)?;
        self.contours.push(contour);
        Ok(self.invalidate())
    }

    /// Adds a line to `pt`, or a Bezier curve if control points are pending.
    pub fn line_to(&mut self, pt: Point) -> Result<&mut Self, Error> {
        self.current()?.edge_to(pt)?;
        Ok(self.invalidate())
    }

    /// Adds a control point for the next edge of the current contour.
    pub fn control_point(&mut self, pt: Point) -> Result<&mut Self, Error> {
        self.current()?.add_control_point(pt)?;
        Ok(self.invalidate())
    }

    pub fn quadratic_to(&mut self, ct: Point, pt: Point) -> Result<&mut Self, Error> {
        self.curve_to(&[ct], pt)
    }

    pub fn cubic_to(&mut self, ct1: Point, ct2: Point, pt: Point) -> Result<&mut Self, Error> {
        self.curve_to(&[ct1, ct2], pt)
    }

    /// Adds a Bezier curve with any number of control points.
    pub fn curve_to(&mut self, controls: &[Point], pt: Point) -> Result<&mut Self, Error> {
        let contour = self.current()?;
        for ct in controls {
            contour.add_control_point(*ct)?;
        }
        contour.edge_to(pt)?;
        Ok(self.invalidate())
    }

    /// Adds an arc of `angle` radians, counter-clockwise (y-up) when positive.
    pub fn arc_to(&mut self, angle: f64, pt: Point) -> Result<&mut Self, Error> {
        self.current()?.arc_to(angle, pt)?;
        Ok(self.invalidate())
    }

    /// Like [`arc_to`](Self::arc_to), with the angle in degrees.
    pub fn arc_degrees_to(&mut self, degrees: f64, pt: Point) -> Result<&mut Self, Error> {
        self.arc_to(degrees.to_radians(), pt)
    }

    /// Adds a custom edge, built against [`prev_interpolator`](Self::prev_interpolator).
    pub fn custom_to(&mut self, custom: CustomInterpolator) -> Result<&mut Self, Error> {
        self.current()?.custom_to(custom)?;
        Ok(self.invalidate())
    }

    /// The last interpolator of the current contour.
    pub fn prev_interpolator(&self) -> Option<InterpolatorId> {
        self.contours.last().and_then(Contour::prev_interpolator)
    }

    /// Ends the current contour with a line, or a Bezier if control points are pending.
    pub fn end(&mut self) -> Result<&mut Self, Error> {
        self.current()?.end()?;
        Ok(self.invalidate())
    }

    pub fn arc_end(&mut self, angle: f64) -> Result<&mut Self, Error> {
        self.current()?.end_arc(angle)?;
        Ok(self.invalidate())
    }

    pub fn quadratic_end(&mut self, ct: Point) -> Result<&mut Self, Error> {
        self.curve_end(&[ct])
    }

    pub fn cubic_end(&mut self, ct1: Point, ct2: Point) -> Result<&mut Self, Error> {
        self.curve_end(&[ct1, ct2])
    }

    /// Ends the current contour with a Bezier curve through `controls`.
    pub fn curve_end(&mut self, controls: &[Point]) -> Result<&mut Self, Error> {
        let contour = self.current()?;
        for ct in controls {
            contour.add_control_point(*ct)?;
        }
        contour.end()?;
        Ok(self.invalidate())
    }

    pub fn custom_end(&mut self, custom: CustomInterpolator) -> Result<&mut Self, Error> {
        self.current()?.end_custom(custom)?;
        Ok(self.invalidate())
    }

    /// Ends the current contour with an arc and begins a new one at `pt`.
    pub fn arc_move(&mut self, angle: f64, pt: Point) -> Result<&mut Self, Error> {
        self.arc_end(angle)?.move_to(pt)
    }

    pub fn quadratic_move(&mut self, ct: Point, pt: Point) -> Result<&mut Self, Error> {
        self.quadratic_end(ct)?.move_to(pt)
    }

    pub fn cubic_move(&mut self, ct1: Point, ct2: Point, pt: Point) -> Result<&mut Self, Error> {
        self.cubic_end(ct1, ct2)?.move_to(pt)
    }

    pub fn custom_move(
        &mut self,
        custom: CustomInterpolator,
        pt: Point,
    ) -> Result<&mut Self, Error> {
        self.custom_end(custom)?.move_to(pt)
    }

    pub fn number_contours(&self) -> usize {
        self.contours.len()
    }

    pub fn contour(&self, i: usize) -> Option<&Contour> {
        self.contours.get(i)
    }

    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Total number of points over all contours.
    pub fn number_points(&self) -> usize {
        self.contours.iter().map(Contour::number_points).sum()
    }

    pub fn tessellation_params(&self) -> &TessellationParams {
        &self.params
    }

    /// Changes the tessellation parameters, dropping the cached tessellation if they differ.
    pub fn set_tessellation_params(&mut self, params: TessellationParams) {
        if params != self.params {
            self.params = params;
            self.invalidate();
        }
    }

    /// The tessellation of this path, built on first access after a change.
    ///
    /// Concurrent callers wait for a single build and share its result.
    pub fn tessellation(&self) -> Arc<TessellatedPath> {
        Arc::clone(
            self.tessellation
                .get_or_init(|| Arc::new(TessellatedPath::new(self, self.params))),
        )
    }

    fn current(&mut self) -> Result<&mut Contour, Error> {
        self.contours.last_mut().ok_or(Error::NotStarted)
    }

    fn invalidate(&mut self) -> &mut Self {
        self.tessellation.take();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, TAU};

    fn triangle() -> Path {
        let mut path = Path::default();
        path.move_to(Point::new(0.0, 0.0))
            .unwrap()
            .line_to(Point::new(4.0, 0.0))
            .unwrap()
            .line_to(Point::new(0.0, 3.0))
            .unwrap()
            .end()
            .unwrap();
        path
    }

    #[test]
    fn edges_need_a_contour() {
        let mut path = Path::default();
        assert_eq!(path.line_to(Point::ZERO).unwrap_err(), Error::NotStarted);
        assert_eq!(path.end().unwrap_err(), Error::NotStarted);
    }

    #[test]
    fn move_to_ends_open_contour() {
        let mut path = Path::default();
        path.move_to(Point::new(0.0, 0.0))
            .unwrap()
            .line_to(Point::new(1.0, 0.0))
            .unwrap()
            .move_to(Point::new(5.0, 5.0))
            .unwrap()
            .line_to(Point::new(6.0, 5.0))
            .unwrap()
            .arc_move(FRAC_PI_2, Point::new(9.0, 9.0))
            .unwrap();
        assert_eq!(path.number_contours(), 3);
        assert!(path.contour(0).unwrap().is_ended());
        assert!(path.contour(1).unwrap().is_ended());
        assert!(!path.contour(2).unwrap().is_ended());
        assert_eq!(path.number_points(), 5);
        // The unended contour is not tessellated.
        assert_eq!(path.tessellation().number_contours(), 2);
    }

    #[test]
    fn appending_after_end_fails() {
        let mut path = triangle();
        assert_eq!(path.line_to(Point::ZERO).unwrap_err(), Error::Ended);
        assert_eq!(
            path.arc_to(TAU, Point::new(1.0, 1.0)).unwrap_err(),
            Error::Ended
        );
    }

    #[test]
    fn mutation_replaces_cached_tessellation() {
        let mut path = triangle();
        let first = path.tessellation();
        assert!(Arc::ptr_eq(&first, &path.tessellation()));
        let points = first.point_data().len();

        path.move_to(Point::new(10.0, 10.0))
            .unwrap()
            .line_to(Point::new(11.0, 10.0))
            .unwrap()
            .end()
            .unwrap();
        let second = path.tessellation();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.point_data().len(), points);
        assert_eq!(second.number_contours(), 2);

        path.set_tessellation_params(*path.tessellation_params());
        assert!(Arc::ptr_eq(&second, &path.tessellation()));
        path.set_tessellation_params(TessellationParams::default().with_max_segments(4));
        assert!(!Arc::ptr_eq(&second, &path.tessellation()));
    }

    #[test]
    fn concurrent_readers_share_one_tessellation() {
        let mut path = Path::default();
        path.move_to(Point::new(0.0, 0.0))
            .unwrap()
            .cubic_to(
                Point::new(0.0, 50.0),
                Point::new(50.0, 50.0),
                Point::new(50.0, 0.0),
            )
            .unwrap()
            .end()
            .unwrap();
        let results: Vec<Arc<TessellatedPath>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| path.tessellation())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for r in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], r));
        }
    }

    #[test]
    fn copy_with_new_params() {
        let path = triangle();
        let params = TessellationParams::default().curve_distance_tessellate(0.5);
        let copy = Path::with_params(&path, params);
        assert_eq!(copy.number_contours(), 1);
        assert_eq!(copy.tessellation().tessellation_params(), &params);
    }
}
