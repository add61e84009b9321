// Copyright 2026 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolution independent path geometry and its conversion into renderable geometry.
//!
//! The pipeline runs strictly downwards:
//!
//! - A [`Path`] is a collection of closed [`Contour`]s, each a loop of [`Interpolator`]s
//!   (flat lines, Bezier curves of any degree, circular arcs or caller supplied curves).
//! - [`TessellatedPath`] samples every edge of a path into a line strip under the quality
//!   budget described by [`TessellationParams`].
//! - [`StrokedPath`] expands the tessellated centerline into edge, join and cap triangles
//!   that are independent of the stroke width.
//! - [`FilledPath`] decomposes the interior into triangles classified by winding number.
//!
//! A path caches its tessellation, and a tessellation caches its stroke and fill geometry.
//! All caches are built at most once, on first access, and are shared through [`Arc`]s so
//! that handed out geometry is never altered by later edits to the path.
//!
//! [`Arc`]: std::sync::Arc

// LINEBENDER LINT SET - lib.rs - v2
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]

mod contour;
mod error;
mod fill;
mod interpolator;
pub mod math;
mod path;
mod stroke;
mod tessellate;

pub use contour::Contour;
pub use error::Error;
pub use fill::{FillRule, FillSynthesizer, FilledPath, TrapezoidFill};
pub use interpolator::{
    ArcCurve, Bezier, CurveDerivatives, CurveSample, CustomCurve, CustomInterpolator, Interpolator,
    InterpolatorId, InterpolatorKind, ParametricCurve,
};
pub use path::Path;
pub use stroke::{StrokeGeometry, StrokePoint, StrokedPath};
pub use tessellate::{
    tessellate_parametric, EdgeStats, TessellatedPath, TessellatedPoint, TessellationParams,
    ThresholdMode,
};

pub use peniko;
pub use peniko::kurbo;
