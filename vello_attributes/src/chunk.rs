// Copyright 2026 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use log::debug;
use peniko::kurbo::{Cap, Join};
use vello_tessellation::{FillRule, FilledPath, StrokeGeometry, StrokedPath};

use crate::{Attribute, Index};

/// Chunk slots of stroke data set with [`ChunkTable::set_stroke_data`].
///
/// The slots without closing edge mirror the slots with closing edge, at an offset of
/// [`NUMBER_WITH_CLOSING_EDGE`](Self::NUMBER_WITH_CLOSING_EDGE).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrokeChunk {
    RoundJoinsClosingEdge,
    BevelJoinsClosingEdge,
    MiterJoinsClosingEdge,
    EdgeClosingEdge,
    RoundJoinsNoClosingEdge,
    BevelJoinsNoClosingEdge,
    MiterJoinsNoClosingEdge,
    EdgeNoClosingEdge,
    RoundCap,
    SquareCap,
}

impl StrokeChunk {
    /// Number of slots that include the closing edge.
    pub const NUMBER_WITH_CLOSING_EDGE: usize = 4;
    pub const COUNT: usize = 10;

    pub const ALL: [Self; Self::COUNT] = [
        Self::RoundJoinsClosingEdge,
        Self::BevelJoinsClosingEdge,
        Self::MiterJoinsClosingEdge,
        Self::EdgeClosingEdge,
        Self::RoundJoinsNoClosingEdge,
        Self::BevelJoinsNoClosingEdge,
        Self::MiterJoinsNoClosingEdge,
        Self::EdgeNoClosingEdge,
        Self::RoundCap,
        Self::SquareCap,
    ];

    /// Index of this slot in a [`ChunkTable`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The same style without the closing edge. Slots without closing edge and caps map
    /// to themselves.
    pub fn without_closing_edge(self) -> Self {
        match self.index() {
            i if i < Self::NUMBER_WITH_CLOSING_EDGE => {
                Self::ALL[i + Self::NUMBER_WITH_CLOSING_EDGE]
            }
            _ => self,
        }
    }

    /// The join slot for `style`.
    pub fn joins(style: Join, closing_edge: bool) -> Self {
        let chunk = match style {
            Join::Round => Self::RoundJoinsClosingEdge,
            Join::Bevel => Self::BevelJoinsClosingEdge,
            Join::Miter => Self::MiterJoinsClosingEdge,
        };
        chunk.with_closing_edge(closing_edge)
    }

    pub fn edges(closing_edge: bool) -> Self {
        Self::EdgeClosingEdge.with_closing_edge(closing_edge)
    }

    /// The cap slot for `style`, `None` for [`Cap::Butt`].
    pub fn caps(style: Cap) -> Option<Self> {
        match style {
            Cap::Butt => None,
            Cap::Round => Some(Self::RoundCap),
            Cap::Square => Some(Self::SquareCap),
        }
    }

    fn with_closing_edge(self, closing_edge: bool) -> Self {
        if closing_edge {
            self
        } else {
            self.without_closing_edge()
        }
    }
}

/// Index of the chunk holding `rule` after [`ChunkTable::set_fill_data`].
pub fn fill_chunk(rule: FillRule) -> usize {
    rule as usize
}

/// Attribute and index data split into independently drawable chunks.
///
/// Index chunk `i` indexes into attribute chunk `i` only. Every `set_*` method replaces the
/// whole table. All accessors are total: out of range chunks are empty with a zero depth
/// increment.
#[derive(Clone, Debug, Default)]
pub struct ChunkTable {
    pub(crate) attribute_chunks: Vec<Vec<Attribute>>,
    pub(crate) index_chunks: Vec<Vec<Index>>,
    pub(crate) increment_z: Vec<u32>,
    non_empty: Vec<usize>,
}

impl ChunkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the table with the stroke geometry of `path`, one chunk per [`StrokeChunk`].
    pub fn set_stroke_data(&mut self, path: &StrokedPath) {
        self.reset(StrokeChunk::COUNT);
        for chunk in StrokeChunk::ALL {
            let geometry = stroke_geometry(path, chunk);
            let i = chunk.index();
            self.attribute_chunks[i] = geometry.points.iter().map(Attribute::from).collect();
            self.index_chunks[i].clone_from(&geometry.indices);
            self.increment_z[i] = geometry.depth_count;
        }
        self.finish();
        debug!(
            "Packed stroke data into {} non-empty chunk(s)",
            self.non_empty.len()
        );
    }

    /// Replaces the table with the fill geometry of `path`, one chunk per [`FillRule`].
    ///
    /// All fill chunks share the same attributes.
    pub fn set_fill_data(&mut self, path: &FilledPath) {
        self.reset(FillRule::ALL.len());
        let attributes: Vec<Attribute> = path.points().iter().copied().map(Attribute::from).collect();
        for rule in FillRule::ALL {
            let i = fill_chunk(rule);
            self.attribute_chunks[i].clone_from(&attributes);
            self.index_chunks[i] = path.indices(rule).to_vec();
        }
        self.finish();
        debug!(
            "Packed fill data of {} vertices into {} non-empty chunk(s)",
            attributes.len(),
            self.non_empty.len()
        );
    }

    /// Clears the table to `count` empty chunks.
    pub(crate) fn reset(&mut self, count: usize) {
        self.attribute_chunks.clear();
        self.attribute_chunks.resize_with(count, Vec::new);
        self.index_chunks.clear();
        self.index_chunks.resize_with(count, Vec::new);
        self.increment_z.clear();
        self.increment_z.resize(count, 0);
        self.non_empty.clear();
    }

    /// Records which chunks have indices.
    pub(crate) fn finish(&mut self) {
        self.non_empty = self
            .index_chunks
            .iter()
            .enumerate()
            .filter(|(_, indices)| !indices.is_empty())
            .map(|(i, _)| i)
            .collect();
    }

    pub fn attribute_chunks(&self) -> &[Vec<Attribute>] {
        &self.attribute_chunks
    }

    pub fn attribute_chunk(&self, i: usize) -> &[Attribute] {
        self.attribute_chunks.get(i).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn index_chunks(&self) -> &[Vec<Index>] {
        &self.index_chunks
    }

    pub fn index_chunk(&self, i: usize) -> &[Index] {
        self.index_chunks.get(i).map(Vec::as_slice).unwrap_or_default()
    }

    /// Chunks whose index chunk is not empty, in increasing order.
    pub fn non_empty_chunks(&self) -> &[usize] {
        &self.non_empty
    }

    pub fn increment_z_values(&self) -> &[u32] {
        &self.increment_z
    }

    /// Number of depth values used by chunk `i`.
    pub fn increment_z(&self, i: usize) -> u32 {
        self.increment_z.get(i).copied().unwrap_or(0)
    }
}

fn stroke_geometry(path: &StrokedPath, chunk: StrokeChunk) -> &StrokeGeometry {
    use StrokeChunk::*;
    match chunk {
        RoundJoinsClosingEdge => path.joins(Join::Round, true),
        BevelJoinsClosingEdge => path.joins(Join::Bevel, true),
        MiterJoinsClosingEdge => path.joins(Join::Miter, true),
        EdgeClosingEdge => path.edges(true),
        RoundJoinsNoClosingEdge => path.joins(Join::Round, false),
        BevelJoinsNoClosingEdge => path.joins(Join::Bevel, false),
        MiterJoinsNoClosingEdge => path.joins(Join::Miter, false),
        EdgeNoClosingEdge => path.edges(false),
        RoundCap => path.caps(Cap::Round),
        SquareCap => path.caps(Cap::Square),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_edge_offset() {
        for chunk in &StrokeChunk::ALL[..StrokeChunk::NUMBER_WITH_CLOSING_EDGE] {
            let without = chunk.without_closing_edge();
            assert_eq!(
                without.index(),
                chunk.index() + StrokeChunk::NUMBER_WITH_CLOSING_EDGE
            );
        }
        assert_eq!(
            StrokeChunk::MiterJoinsClosingEdge.without_closing_edge(),
            StrokeChunk::MiterJoinsNoClosingEdge
        );
        assert_eq!(
            StrokeChunk::RoundCap.without_closing_edge(),
            StrokeChunk::RoundCap
        );
        assert_eq!(
            StrokeChunk::joins(Join::Bevel, false),
            StrokeChunk::BevelJoinsNoClosingEdge
        );
        assert_eq!(StrokeChunk::edges(true), StrokeChunk::EdgeClosingEdge);
        assert_eq!(StrokeChunk::caps(Cap::Butt), None);
        for (i, chunk) in StrokeChunk::ALL.into_iter().enumerate() {
            assert_eq!(chunk.index(), i);
        }
    }

    #[test]
    fn empty_table_queries() {
        let table = ChunkTable::new();
        assert!(table.attribute_chunk(3).is_empty());
        assert!(table.index_chunk(0).is_empty());
        assert_eq!(table.increment_z(42), 0);
        assert!(table.non_empty_chunks().is_empty());
    }

    #[test]
    fn fill_chunks_share_attributes() {
        let mut filled = FilledPath::default();
        filled.push_polygon(
            &[
                peniko::kurbo::Point::new(0.0, 0.0),
                peniko::kurbo::Point::new(1.0, 0.0),
                peniko::kurbo::Point::new(1.0, 1.0),
            ],
            1,
        );
        let mut table = ChunkTable::new();
        table.set_fill_data(&filled);
        assert_eq!(table.attribute_chunks().len(), 4);
        assert_eq!(
            table.non_empty_chunks(),
            &[
                fill_chunk(FillRule::OddEven),
                fill_chunk(FillRule::NonZero)
            ]
        );
        for rule in FillRule::ALL {
            assert_eq!(table.attribute_chunk(fill_chunk(rule)).len(), 3);
            assert_eq!(table.increment_z(fill_chunk(rule)), 0);
        }
        assert_eq!(table.index_chunk(fill_chunk(FillRule::NonZero)), &[0, 1, 2]);
    }
}
