// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `sdf-text`.
//
// `sdf-text` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `sdf-text` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `sdf-text`. If not, see <https://www.gnu.org/licenses/> or
// <https://www.mozilla.org/en-US/MPL/2.0/>.

//! Turns a run of text into screen-space glyph quads with atlas UVs.

use super::font::SdfFont;
use super::gpu_backend::GpuContext;

use unicode_segmentation::{Graphemes, UnicodeSegmentation};

/// An axis-aligned rectangle in either screen or UV space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

/// One glyph quad: a screen rectangle and the atlas rectangle it samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    /// The screen-space rectangle of the glyph.
    pub pos: Bounds,

    /// The normalized atlas rectangle of the glyph.
    pub uv: Bounds,
}

impl Quad {
    /// The four `(position, uv)` corners in emission order: top-left,
    /// bottom-left, top-right, bottom-right. Consumed downstream as the two
    /// triangles `(0, 1, 2)` and `(2, 1, 3)`.
    pub fn corners(&self) -> [([f32; 2], [f32; 2]); 4] {
        [
            ([self.pos.x0, self.pos.y0], [self.uv.x0, self.uv.y0]),
            ([self.pos.x0, self.pos.y1], [self.uv.x0, self.uv.y1]),
            ([self.pos.x1, self.pos.y0], [self.uv.x1, self.uv.y0]),
            ([self.pos.x1, self.pos.y1], [self.uv.x1, self.uv.y1]),
        ]
    }
}

/// A lazy sequence of glyph quads for a single line of text.
///
/// Grapheme clusters outside the font's alphabet yield no quad and no pen
/// movement; an alphabet is user-configured and need not cover every input
/// character. The emitter does no wrapping; line splitting is a concern of
/// the caller, which can issue one emitter per line.
pub struct QuadEmitter<'a, C: GpuContext + ?Sized> {
    font: &'a SdfFont<C>,
    graphemes: Graphemes<'a>,
    pen: [f32; 2],
    scale: f32,
    baseline: f32,
    inv_dimension: f32,
}

impl<'a, C: GpuContext + ?Sized> QuadEmitter<'a, C> {
    /// Emit quads for `text` starting at `pen`, rendered at `size` pixels.
    pub fn new(font: &'a SdfFont<C>, text: &'a str, pen: [f32; 2], size: f32) -> Self {
        Self {
            font,
            graphemes: text.graphemes(true),
            pen,
            scale: size / font.size() as f32,
            // Centering the em square plus the SDF padding keeps the visible
            // glyph position independent of the buffer size.
            baseline: font.size() as f32 / 2.0 + font.buffer_px() as f32,
            inv_dimension: 1.0 / font.dimension() as f32,
        }
    }

    /// The current pen position; the final position once iteration ends.
    pub fn pen(&self) -> [f32; 2] {
        self.pen
    }
}

impl<C: GpuContext + ?Sized> Iterator for QuadEmitter<'_, C> {
    type Item = Quad;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let cluster = self.graphemes.next()?;

            let (glyph, location) = match (self.font.glyph(cluster), self.font.location(cluster))
            {
                (Some(glyph), Some(location)) => (glyph, location),
                _ => {
                    tracing::trace!(cluster, "glyph not in font alphabet, skipping");
                    continue;
                }
            };

            let x0 = self.pen[0] + glyph.left() as f32 * self.scale;
            let y0 = self.pen[1] + (self.baseline - glyph.top() as f32) * self.scale;
            let pos = Bounds {
                x0,
                y0,
                x1: x0 + glyph.width() as f32 * self.scale,
                y1: y0 + glyph.height() as f32 * self.scale,
            };
            let uv = Bounds {
                x0: location.x as f32 * self.inv_dimension,
                y0: location.y as f32 * self.inv_dimension,
                x1: (location.x + glyph.width()) as f32 * self.inv_dimension,
                y1: (location.y + glyph.height()) as f32 * self.inv_dimension,
            };

            self.pen[0] += glyph.advance() * self.scale;
            return Some(Quad { pos, uv });
        }
    }
}
