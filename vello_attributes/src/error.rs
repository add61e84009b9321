// Copyright 2026 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors that can occur when packing chunks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Glyph positions and glyphs differ in number.
    #[error("{positions} glyph positions given for {glyphs} glyphs")]
    GlyphCountMismatch { positions: usize, glyphs: usize },
    /// Scale factors are neither empty nor one per glyph.
    #[error("{scale_factors} scale factors given for {glyphs} glyphs")]
    ScaleFactorMismatch { scale_factors: usize, glyphs: usize },
}
