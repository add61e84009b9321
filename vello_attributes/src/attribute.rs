// Copyright 2026 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The vertex record shared by all chunks, and its per-style field assignment.

use bytemuck::{Pod, Zeroable};
use peniko::kurbo::Point;
use vello_tessellation::StrokePoint;

/// Index into an attribute chunk.
pub type Index = u32;

/// A vertex as consumed by the shading stage.
///
/// The meaning of each field depends on the chunk the vertex belongs to:
///
/// | Style  | `primary`                          | `secondary`                                                        | `uint`                                    |
/// |--------|------------------------------------|--------------------------------------------------------------------|-------------------------------------------|
/// | stroke | position, pre-offset               | distance from edge start, distance from contour start, miter distance, boundary flag | depth, 0, 0, 0              |
/// | fill   | position, 0, 0                     | 0, 0, 0, 0                                                         | 0, 0, 0, 0                                |
/// | glyph  | atlas texel, secondary atlas texel | position, 0, 0                                                     | 0, geometry offset, layer, secondary layer |
// Keep in sync with the attribute unpacking of the vertex shaders.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Zeroable, Pod)]
pub struct Attribute {
    pub primary: [f32; 4],
    pub secondary: [f32; 4],
    pub uint: [u32; 4],
}

static_assertions::const_assert_eq!(std::mem::size_of::<Attribute>(), 48);

impl From<&StrokePoint> for Attribute {
    fn from(p: &StrokePoint) -> Self {
        Self {
            primary: [
                p.position.x as f32,
                p.position.y as f32,
                p.pre_offset.x as f32,
                p.pre_offset.y as f32,
            ],
            secondary: [
                p.distance_from_edge_start as f32,
                p.distance_from_contour_start as f32,
                p.miter_distance as f32,
                if p.on_boundary { 1.0 } else { 0.0 },
            ],
            uint: [p.depth, 0, 0, 0],
        }
    }
}

impl From<Point> for Attribute {
    fn from(p: Point) -> Self {
        Self {
            primary: [p.x as f32, p.y as f32, 0.0, 0.0],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::kurbo::Vec2;

    #[test]
    fn stroke_layout() {
        let p = StrokePoint {
            position: Point::new(1.0, 2.0),
            pre_offset: Vec2::new(0.0, -1.0),
            distance_from_edge_start: 3.0,
            distance_from_contour_start: 4.0,
            miter_distance: 1.5,
            on_boundary: true,
            depth: 7,
        };
        let a = Attribute::from(&p);
        assert_eq!(a.primary, [1.0, 2.0, 0.0, -1.0]);
        assert_eq!(a.secondary, [3.0, 4.0, 1.5, 1.0]);
        assert_eq!(a.uint, [7, 0, 0, 0]);
    }

    #[test]
    fn byte_layout() {
        let a = Attribute::from(Point::new(0.5, 0.25));
        let bytes = bytemuck::bytes_of(&a);
        assert_eq!(bytes.len(), 48);
        assert_eq!(&bytes[0..4], &0.5_f32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &0.25_f32.to_ne_bytes());
        assert!(bytes[8..].iter().all(|b| *b == 0));
    }
}
