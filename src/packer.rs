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

//! Shelf placement of glyph bitmaps into a fixed-size atlas image.
//!
//! Glyphs are placed in input order along the current shelf; when a glyph no
//! longer fits horizontally the cursor drops down by the tallest bitmap seen
//! on the shelf and a new shelf starts. The packer trades density for O(n)
//! placement since atlas construction happens once, off the hot path.
//!
//! The horizontal cursor advances by the *current* glyph's bitmap width.
//! Shelves that mix widths therefore pack exactly as their input dictates;
//! with cell-sized SDF bitmaps and the caller's `ceil(sqrt(n)) * cell`
//! dimension heuristic the placement is exact.

/// Cursor state for shelf placement inside one square atlas image.
pub(crate) struct ShelfPacker {
    /// The side length of the square atlas image.
    dimension: u32,

    /// Horizontal cursor within the current shelf.
    x: u32,

    /// Top of the current shelf.
    y: u32,

    /// The tallest bitmap placed on the current shelf so far.
    shelf_height: u32,
}

impl ShelfPacker {
    pub(crate) fn new(dimension: u32) -> Self {
        Self {
            dimension,
            x: 0,
            y: 0,
            shelf_height: 0,
        }
    }

    /// Place a `width` x `height` bitmap, returning its atlas origin.
    ///
    /// Returns `None` once the image cannot hold the bitmap; the caller
    /// reports that as an atlas overflow rather than packing a partial
    /// alphabet.
    pub(crate) fn place(&mut self, width: u32, height: u32) -> Option<(u32, u32)> {
        if width > self.dimension || height > self.dimension {
            return None;
        }

        if self.x + width > self.dimension {
            // Shelf exhausted; drop to the next one.
            self.y += self.shelf_height;
            self.x = 0;
            self.shelf_height = 0;
        }

        if self.y + height > self.dimension {
            return None;
        }

        let origin = (self.x, self.y);
        self.x += width;
        self.shelf_height = self.shelf_height.max(height);
        Some(origin)
    }
}
