// Copyright 2026 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packing of positioned glyphs into one quad chunk per glyph type.

use log::{debug, trace, warn};
use peniko::kurbo::{Point, Vec2};
use thiserror::Error;

use crate::{Attribute, ChunkTable, Error, Index};

/// Which way y grows in the coordinate system glyphs are placed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GlyphOrientation {
    /// Glyph origins are flipped so the glyph is upright when y grows downwards.
    #[default]
    YIncreasesDownwards,
    YIncreasesUpwards,
}

/// Metrics of a glyph as rendered into the atlas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphLayout {
    /// Size of the glyph quad at [`pixel_size`](Self::pixel_size).
    pub size: Vec2,
    /// Offset of the glyph quad from the pen position at [`pixel_size`](Self::pixel_size).
    pub origin: Vec2,
    /// Size of the glyph in atlas texels.
    pub texel_size: [u32; 2],
    /// Pixel size the glyph was rendered at.
    pub pixel_size: f64,
}

/// Where glyph data lives in an atlas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AtlasLocation {
    pub texel: [u32; 2],
    pub layer: u32,
}

/// Glyph types at or above this are skipped by glyph packing.
pub const MAX_GLYPH_TYPES: usize = 256;

/// A glyph that is resident in the atlas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedGlyph {
    /// Rendering type of the glyph. Glyphs of each type go to their own chunk.
    ///
    /// Must be below [`MAX_GLYPH_TYPES`].
    pub glyph_type: usize,
    pub layout: GlyphLayout,
    pub atlas: AtlasLocation,
    pub secondary_atlas: Option<AtlasLocation>,
    /// Offset of the glyph's geometry data in the glyph geometry store.
    pub geometry_offset: u32,
}

/// A glyph could not be uploaded to the atlas.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("glyph could not be uploaded to the atlas")]
pub struct UploadError;

/// Access to the glyph atlas, owned by the caller.
pub trait GlyphCache {
    type Glyph;

    /// Makes `glyph` resident in the atlas.
    ///
    /// Returns `Ok(None)` for a glyph that has nothing to draw; such glyphs are skipped.
    fn resolve(&mut self, glyph: &Self::Glyph) -> Result<Option<ResolvedGlyph>, UploadError>;
}

/// How far glyph packing got.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphPackOutcome {
    /// All glyphs were packed.
    Complete,
    /// Glyph `failed_index` could not be uploaded; only the glyphs before it were packed.
    Stopped { failed_index: usize },
}

impl ChunkTable {
    /// Replaces the table with quads for `glyphs` placed at `positions`.
    ///
    /// `scale_factors` is either empty, scaling every glyph by `1.0`, or holds one factor
    /// per glyph. Packing stops at the first glyph the cache fails to upload.
    pub fn set_glyph_data<C: GlyphCache>(
        &mut self,
        positions: &[Point],
        glyphs: &[C::Glyph],
        scale_factors: &[f64],
        orientation: GlyphOrientation,
        cache: &mut C,
    ) -> Result<GlyphPackOutcome, Error> {
        check_counts(positions, glyphs)?;
        if !scale_factors.is_empty() && scale_factors.len() != glyphs.len() {
            return Err(Error::ScaleFactorMismatch {
                scale_factors: scale_factors.len(),
                glyphs: glyphs.len(),
            });
        }
        Ok(self.pack_glyphs(positions, glyphs, orientation, cache, |g, _| {
            scale_factors.get(g).copied().unwrap_or(1.0)
        }))
    }

    /// Like [`set_glyph_data`](Self::set_glyph_data), scaling each glyph from the pixel size
    /// it was rendered at to `render_pixel_size`.
    pub fn set_glyph_data_at_pixel_size<C: GlyphCache>(
        &mut self,
        positions: &[Point],
        glyphs: &[C::Glyph],
        render_pixel_size: f64,
        orientation: GlyphOrientation,
        cache: &mut C,
    ) -> Result<GlyphPackOutcome, Error> {
        check_counts(positions, glyphs)?;
        Ok(self.pack_glyphs(positions, glyphs, orientation, cache, |_, glyph| {
            render_pixel_size / glyph.layout.pixel_size
        }))
    }

    fn pack_glyphs<C: GlyphCache>(
        &mut self,
        positions: &[Point],
        glyphs: &[C::Glyph],
        orientation: GlyphOrientation,
        cache: &mut C,
        scale: impl Fn(usize, &ResolvedGlyph) -> f64,
    ) -> GlyphPackOutcome {
        let mut outcome = GlyphPackOutcome::Complete;
        let mut resolved = Vec::with_capacity(glyphs.len());
        for (g, glyph) in glyphs.iter().enumerate() {
            match cache.resolve(glyph) {
                Ok(Some(r)) if r.glyph_type >= MAX_GLYPH_TYPES => {
                    warn!("Skipping glyph {g} of unsupported type {}", r.glyph_type);
                }
                Ok(Some(r)) => resolved.push((g, r)),
                Ok(None) => trace!("Skipping glyph {g} with nothing to draw"),
                Err(err) => {
                    warn!("Stopped packing at glyph {g} of {}: {err}", glyphs.len());
                    outcome = GlyphPackOutcome::Stopped { failed_index: g };
                    break;
                }
            }
        }

        let types = resolved
            .iter()
            .map(|(_, r)| r.glyph_type + 1)
            .max()
            .unwrap_or(0);
        self.reset(types);
        for (g, glyph) in &resolved {
            let t = glyph.glyph_type;
            let base = self.attribute_chunks[t].len() as Index;
            self.attribute_chunks[t].extend(glyph_quad(
                orientation,
                positions[*g],
                glyph,
                scale(*g, glyph),
            ));
            self.index_chunks[t].extend_from_slice(&[
                base,
                base + 1,
                base + 2,
                base,
                base + 2,
                base + 3,
            ]);
        }
        self.finish();
        debug!(
            "Packed {} of {} glyph(s) into {} glyph type chunk(s)",
            resolved.len(),
            glyphs.len(),
            types
        );
        outcome
    }
}

fn check_counts<G>(positions: &[Point], glyphs: &[G]) -> Result<(), Error> {
    if positions.len() != glyphs.len() {
        return Err(Error::GlyphCountMismatch {
            positions: positions.len(),
            glyphs: glyphs.len(),
        });
    }
    Ok(())
}

/// The four corners of a glyph quad: bottom left, bottom right, top right, top left.
fn glyph_quad(
    orientation: GlyphOrientation,
    p: Point,
    glyph: &ResolvedGlyph,
    scale: f64,
) -> [Attribute; 4] {
    let layout = &glyph.layout;
    let size = layout.size * scale;
    let origin = layout.origin * scale;
    let (bl, tr) = match orientation {
        GlyphOrientation::YIncreasesDownwards => {
            let bl = Point::new(p.x + origin.x, p.y - origin.y);
            (bl, Point::new(bl.x + size.x, bl.y - size.y))
        }
        GlyphOrientation::YIncreasesUpwards => {
            let bl = p + origin;
            (bl, bl + size)
        }
    };

    let texels = |loc: [u32; 2]| {
        let lo = [loc[0] as f32, loc[1] as f32];
        let hi = [
            lo[0] + layout.texel_size[0] as f32,
            lo[1] + layout.texel_size[1] as f32,
        ];
        (lo, hi)
    };
    let (t_bl, t_tr) = texels(glyph.atlas.texel);
    let (t2_bl, t2_tr) = texels(glyph.secondary_atlas.map_or([0, 0], |a| a.texel));
    let uint = [
        0,
        glyph.geometry_offset,
        glyph.atlas.layer,
        glyph.secondary_atlas.map_or(!0, |a| a.layer),
    ];

    let corner = |x: f64, y: f64, tx: usize, ty: usize| {
        let pick = |bl: [f32; 2], tr: [f32; 2]| {
            [
                if tx == 0 { bl[0] } else { tr[0] },
                if ty == 0 { bl[1] } else { tr[1] },
            ]
        };
        let t = pick(t_bl, t_tr);
        let t2 = pick(t2_bl, t2_tr);
        Attribute {
            primary: [t[0], t[1], t2[0], t2[1]],
            secondary: [x as f32, y as f32, 0.0, 0.0],
            uint,
        }
    };
    [
        corner(bl.x, bl.y, 0, 0),
        corner(tr.x, bl.y, 1, 0),
        corner(tr.x, tr.y, 1, 1),
        corner(bl.x, tr.y, 0, 1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(glyph_type: usize) -> ResolvedGlyph {
        ResolvedGlyph {
            glyph_type,
            layout: GlyphLayout {
                size: Vec2::new(8.0, 10.0),
                origin: Vec2::new(1.0, 2.0),
                texel_size: [8, 10],
                pixel_size: 16.0,
            },
            atlas: AtlasLocation {
                texel: [32, 64],
                layer: 3,
            },
            secondary_atlas: None,
            geometry_offset: 17,
        }
    }

    #[test]
    fn quad_upwards() {
        let q = glyph_quad(
            GlyphOrientation::YIncreasesUpwards,
            Point::new(100.0, 50.0),
            &glyph(0),
            2.0,
        );
        assert_eq!(q[0].secondary, [102.0, 54.0, 0.0, 0.0]);
        assert_eq!(q[2].secondary, [118.0, 74.0, 0.0, 0.0]);
        assert_eq!(q[0].primary[..2], [32.0, 64.0]);
        assert_eq!(q[2].primary[..2], [40.0, 74.0]);
        assert_eq!(q[1].primary[..2], [40.0, 64.0]);
        assert_eq!(q[0].uint, [0, 17, 3, !0]);
    }

    #[test]
    fn quad_downwards_flips_y() {
        let q = glyph_quad(
            GlyphOrientation::YIncreasesDownwards,
            Point::new(100.0, 50.0),
            &glyph(0),
            1.0,
        );
        assert_eq!(q[0].secondary[..2], [101.0, 48.0]);
        assert_eq!(q[2].secondary[..2], [109.0, 38.0]);
    }

    struct Fixed(Vec<Option<ResolvedGlyph>>);

    impl GlyphCache for Fixed {
        type Glyph = usize;

        fn resolve(&mut self, glyph: &usize) -> Result<Option<ResolvedGlyph>, UploadError> {
            Ok(self.0[*glyph])
        }
    }

    #[test]
    fn chunks_by_type_and_skipped_glyphs() {
        let mut cache = Fixed(vec![Some(glyph(1)), None, Some(glyph(1)), Some(glyph(0))]);
        let positions = [Point::ZERO; 4];
        let mut table = ChunkTable::new();
        let outcome = table
            .set_glyph_data_at_pixel_size(
                &positions,
                &[0, 1, 2, 3],
                32.0,
                GlyphOrientation::YIncreasesUpwards,
                &mut cache,
            )
            .unwrap();
        assert_eq!(outcome, GlyphPackOutcome::Complete);
        assert_eq!(table.attribute_chunks().len(), 2);
        assert_eq!(table.attribute_chunk(0).len(), 4);
        assert_eq!(table.attribute_chunk(1).len(), 8);
        assert_eq!(table.index_chunk(1), &[0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        // Rendered at 16 px, drawn at 32 px.
        assert_eq!(table.attribute_chunk(0)[2].secondary[..2], [18.0, 24.0]);
    }

    #[test]
    fn texels_near_the_u32_limit() {
        let mut g = glyph(0);
        g.atlas.texel = [u32::MAX, u32::MAX - 4];
        let q = glyph_quad(GlyphOrientation::YIncreasesUpwards, Point::ZERO, &g, 1.0);
        assert_eq!(q[2].primary[0], u32::MAX as f32 + 8.0);
        assert_eq!(q[2].primary[1], (u32::MAX - 4) as f32 + 10.0);
    }

    #[test]
    fn unsupported_glyph_types_are_skipped() {
        let mut cache = Fixed(vec![Some(glyph(usize::MAX)), Some(glyph(2))]);
        let mut table = ChunkTable::new();
        let outcome = table
            .set_glyph_data(
                &[Point::ZERO, Point::ZERO],
                &[0, 1],
                &[],
                GlyphOrientation::default(),
                &mut cache,
            )
            .unwrap();
        assert_eq!(outcome, GlyphPackOutcome::Complete);
        assert_eq!(table.attribute_chunks().len(), 3);
        assert_eq!(table.attribute_chunk(2).len(), 4);
        assert_eq!(table.non_empty_chunks(), &[2]);
    }

    #[test]
    fn mismatched_inputs_are_rejected() {
        let mut cache = Fixed(vec![Some(glyph(0))]);
        let mut table = ChunkTable::new();
        let err = table
            .set_glyph_data(
                &[Point::ZERO, Point::ZERO],
                &[0],
                &[],
                GlyphOrientation::default(),
                &mut cache,
            )
            .unwrap_err();
        assert_eq!(
            err,
            Error::GlyphCountMismatch {
                positions: 2,
                glyphs: 1
            }
        );
        let err = table
            .set_glyph_data(
                &[Point::ZERO],
                &[0],
                &[1.0, 2.0],
                GlyphOrientation::default(),
                &mut cache,
            )
            .unwrap_err();
        assert!(matches!(err, Error::ScaleFactorMismatch { .. }));
    }
}
