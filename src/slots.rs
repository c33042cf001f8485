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

//! Maps atlas textures to shader texture units for the current batch.

use super::gpu_backend::GpuContext;
use super::resources::Texture;

use arrayvec::ArrayVec;

use std::rc::Rc;

/// Compile-time bound on the texture-slot pool.
///
/// Hardware limits above this gain nothing for text batching, and the bound
/// lets the pool live inline without allocation.
pub(crate) const MAX_TEXTURE_SLOTS: usize = 32;

/// A bijection between atlas textures and slot indices `[0, limit)`.
///
/// Texture identity is pointer identity of the shared atlas allocation; two
/// fonts share a slot only if they share one texture.
pub(crate) struct SlotAllocator<C: GpuContext + ?Sized> {
    images: ArrayVec<Rc<Texture<C>>, MAX_TEXTURE_SLOTS>,
    limit: usize,
}

impl<C: GpuContext + ?Sized> SlotAllocator<C> {
    pub(crate) fn new(limit: u32) -> Self {
        Self {
            images: ArrayVec::new(),
            limit: (limit as usize).clamp(1, MAX_TEXTURE_SLOTS),
        }
    }

    /// The slot assigned to `image`, assigning the next free one on first use.
    ///
    /// Returns `None` when every slot is taken by another image; the batch
    /// must flush before the image can be accepted.
    pub(crate) fn assign(&mut self, image: &Rc<Texture<C>>) -> Option<u32> {
        if let Some(slot) = self.images.iter().position(|held| Rc::ptr_eq(held, image)) {
            return Some(slot as u32);
        }
        if self.images.len() == self.limit {
            return None;
        }
        self.images.push(image.clone());
        Some((self.images.len() - 1) as u32)
    }

    /// The images currently assigned, indexed by slot.
    pub(crate) fn images(&self) -> &[Rc<Texture<C>>] {
        &self.images
    }

    /// Drop every assignment. Called once per flush, after the draw call.
    pub(crate) fn reset(&mut self) {
        self.images.clear();
    }
}
