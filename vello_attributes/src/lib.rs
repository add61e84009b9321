// Copyright 2026 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packing of synthesized geometry into independently drawable chunks.
//!
//! A [`ChunkTable`] holds parallel attribute chunks, index chunks and depth increments.
//! Each stroke style, fill rule and glyph type occupies a fixed slot, so a renderer can
//! draw "miter joins without closing edge" or "nonzero fill" by index alone:
//!
//! - [`ChunkTable::set_stroke_data`] fills the [`StrokeChunk`] slots from a
//!   [`StrokedPath`](vello_tessellation::StrokedPath).
//! - [`ChunkTable::set_fill_data`] fills one slot per
//!   [`FillRule`](vello_tessellation::FillRule), see [`fill_chunk`].
//! - [`ChunkTable::set_glyph_data`] fills one slot per glyph type, resolving glyphs
//!   through a caller supplied [`GlyphCache`].
//!
//! Vertices are [`Attribute`] records that can be uploaded as bytes with [`bytemuck`].

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

mod attribute;
mod chunk;
mod error;
mod glyph;

pub use attribute::{Attribute, Index};
pub use chunk::{fill_chunk, ChunkTable, StrokeChunk};
pub use error::Error;
pub use glyph::{
    AtlasLocation, GlyphCache, GlyphLayout, GlyphOrientation, GlyphPackOutcome, ResolvedGlyph,
    UploadError, MAX_GLYPH_TYPES,
};

pub use vello_tessellation;
