// Copyright 2026 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

use crate::InterpolatorId;

/// Errors that can occur while authoring path geometry.
///
/// Authoring errors leave the contour exactly as it was before the failing call.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// An edge was appended to, or an end requested for, a contour that was never started.
    #[error("Contour has not been started")]
    NotStarted,
    /// `start` was called on a contour that already has a start point.
    #[error("Contour has already been started")]
    AlreadyStarted,
    /// The contour was already ended and can no longer be modified.
    #[error("Contour has already ended")]
    Ended,
    /// Arcs and custom edges can't consume pending Bezier control points.
    #[error("{0} control point(s) pending; finish the Bezier edge first")]
    PendingControlPoints(usize),
    /// A custom interpolator was built against a different previous interpolator.
    #[error("Custom interpolator declares predecessor {declared:?}, but the contour's last interpolator is {actual:?}")]
    PredecessorMismatch {
        /// The predecessor recorded in the custom interpolator.
        declared: Option<InterpolatorId>,
        /// The actual last interpolator of the contour.
        actual: Option<InterpolatorId>,
    },
    /// A custom interpolator used to close a contour doesn't end at the contour start.
    #[error("Closing interpolator must end at the contour start point")]
    ClosingMismatch,
    /// The arc has no well defined center or orientation.
    #[error("Degenerate arc with sweep angle {angle} rad")]
    DegenerateArc {
        /// The requested sweep angle, in radians.
        angle: f64,
    },
}
