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

//! Batched GPU rendering of signed-distance-field text.
//!
//! This crate bakes an alphabet's worth of glyph shapes into an SDF atlas
//! texture once per font configuration, then composites those atlases through
//! a batched draw path: every [`TextRenderer::draw`] call appends glyph quads
//! to a shared vertex/index buffer, and geometry reaches the GPU in as few
//! indexed draws as the hardware's texture-unit and shader-branching limits
//! allow.
//!
//! To use, first implement the [`GpuContext`] trait on a type of your choice
//! that represents an active graphics context, and a [`GlyphRasterizer`] over
//! the host's font machinery. Build [`SdfFont`]s eagerly at startup, create
//! one [`TextRenderer`], and call [`draw`](TextRenderer::draw) freely during
//! the frame; call [`flush`](TextRenderer::flush) at the end of the frame to
//! submit whatever is still pending.
//!
//! Note that this crate generally uses thread-unsafe primitives. This is
//! because rendering is usually pinned to one thread anyways, and the batch
//! accumulator assumes exclusive access from that thread for the frame.

#![forbid(unsafe_code, rust_2018_idioms)]

mod emitter;
mod error;
mod font;
mod gpu_backend;
mod packer;
mod resources;
mod shader;
mod slots;

#[cfg(test)]
pub(crate) mod testing;

pub use emitter::{Bounds, Quad, QuadEmitter};
pub use error::Error;
pub use font::{
    AtlasLocation, FontConfig, FontStyle, FontWeight, Glyph, GlyphRasterizer, RasterRequest,
    RasterizedGlyph, SdfFont,
};
pub use gpu_backend::{GpuContext, Vertex};

use error::ResultExt;
use font::ShadingParams;
use resources::{Program, VertexBuffer};
use slots::{SlotAllocator, MAX_TEXTURE_SLOTS};

/// The identifier under which the host material system registers this renderer.
pub const RENDERER_ID: &str = "sdf-text";

/// The largest quad count whose index range fits a 16-bit index buffer.
pub const MAX_QUADS: usize = u16::MAX as usize / 6;

/// The per-frame accumulator that packs glyph quads into one shared buffer.
///
/// Capacity exhaustion, texture-slot exhaustion and shading-parameter changes
/// are not errors; they schedule automatic flushes. The only user-visible
/// failures happen at construction time (shader compilation) and at font
/// construction time.
pub struct TextRenderer<C: GpuContext + ?Sized> {
    program: Program<C>,
    vbo: VertexBuffer<C>,
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
    quads: usize,
    max_quads: usize,
    slots: SlotAllocator<C>,
    shading: Option<ShadingParams>,
    max_textures: u32,
}

impl<C: GpuContext + ?Sized> TextRenderer<C> {
    /// Create a renderer sized to the context's limits.
    ///
    /// Queries the hardware texture-unit count, discovers how deep a dispatch
    /// chain the shader compiler tolerates, and compiles the text program
    /// specialized to `min` of the two. An incompatible context is rejected
    /// here, never per frame.
    pub fn new(context: &mut C) -> Result<Self, Error> {
        Self::with_quad_capacity(context, MAX_QUADS)
    }

    /// Like [`new`](Self::new), with a smaller quad capacity per flush.
    ///
    /// Useful for memory-constrained targets; `capacity` is clamped to
    /// `[1, MAX_QUADS]`.
    pub fn with_quad_capacity(context: &mut C, capacity: usize) -> Result<Self, Error> {
        let max_quads = capacity.clamp(1, MAX_QUADS);

        let hardware_limit = context.max_texture_units();
        let max_textures = shader::max_compilable_branches(context, hardware_limit)
            .min(hardware_limit.max(1))
            .min(MAX_TEXTURE_SLOTS as u32);

        let fragment = shader::fragment_source(max_textures);
        let program = Program::compile(context, shader::VERTEX_SOURCE, &fragment)
            .map_err(|e| Error::ShaderCompileFailed(Box::new(e)))?;
        let vbo = VertexBuffer::new(context).backend_err()?;

        // Unit-to-sampler wiring never changes after this point.
        let units: Vec<i32> = (0..max_textures as i32).collect();
        context.set_int_array_uniform(program.resource(), "textures", &units);

        tracing::debug!(max_textures, max_quads, "initialized text renderer");

        Ok(Self {
            program,
            vbo,
            vertices: Vec::with_capacity(max_quads * 4),
            indices: Vec::with_capacity(max_quads * 6),
            quads: 0,
            max_quads,
            slots: SlotAllocator::new(max_textures),
            shading: None,
            max_textures,
        })
    }

    /// The texture units one batch may reference,
    /// `min(hardware, compiler, pool)` bound.
    pub fn max_textures(&self) -> u32 {
        self.max_textures
    }

    /// Quads buffered since the last flush.
    pub fn quad_count(&self) -> usize {
        self.quads
    }

    /// Append `text` to the batch, returning the final pen position.
    ///
    /// Flushes first when the requested font's shading constants differ from
    /// the batch's, and mid-string whenever the quad capacity or the
    /// texture-slot pool runs out; callers never observe those boundaries.
    pub fn draw(
        &mut self,
        context: &mut C,
        font: &SdfFont<C>,
        text: &str,
        pos: [f32; 2],
        size: f32,
        color: [u8; 4],
    ) -> Result<[f32; 2], Error> {
        let shading = font.shading();
        if self.shading != Some(shading) {
            self.flush(context)?;
        }
        self.shading = Some(shading);

        let mut slot = self.assign_slot(context, font, shading)?;

        let mut quads = QuadEmitter::new(font, text, pos, size);
        while let Some(quad) = quads.next() {
            if self.quads == self.max_quads {
                self.flush(context)?;
                self.shading = Some(shading);
                slot = self.assign_slot(context, font, shading)?;
            }
            self.push_quad(quad, slot, color);
        }

        Ok(quads.pen())
    }

    /// Submit every buffered quad as one indexed draw, then reset.
    ///
    /// While the batch is empty no GPU submission happens; slot assignments
    /// and shading held over from quad-less draws are dropped.
    pub fn flush(&mut self, context: &mut C) -> Result<(), Error> {
        if self.quads == 0 {
            // No submission happens, but slot assignments and shading left
            // behind by quad-less draws must not leak into the next batch.
            self.slots.reset();
            self.shading = None;
            return Ok(());
        }

        // Sampler arrays must be fully populated for the draw to be valid,
        // so trailing unassigned units repeat slot 0's image.
        let images = self.slots.images();
        let first = images[0].clone();
        for unit in 0..self.max_textures {
            let image = images.get(unit as usize).unwrap_or(&first);
            image.bind(context, unit);
        }

        let shading = self.shading.expect("non-empty batch without shading");
        let matrix = context.projection_matrix();
        context.set_matrix_uniform(self.program.resource(), "matrix", &matrix);
        context.set_float_uniform(self.program.resource(), "gamma", shading.gamma);
        context.set_float_uniform(self.program.resource(), "halo", shading.halo);

        self.vbo.upload(context, &self.vertices, &self.indices);
        context.draw_indexed(
            self.program.resource(),
            self.vbo.resource(),
            (self.quads * 6) as u32,
        );

        self.vertices.clear();
        self.indices.clear();
        self.quads = 0;
        self.shading = None;
        self.slots.reset();
        Ok(())
    }

    /// The slot for the font's atlas, flushing when the pool is exhausted.
    fn assign_slot(
        &mut self,
        context: &mut C,
        font: &SdfFont<C>,
        shading: ShadingParams,
    ) -> Result<f32, Error> {
        if let Some(slot) = self.slots.assign(font.texture()) {
            return Ok(slot as f32);
        }
        self.flush(context)?;
        self.shading = Some(shading);
        // The pool is empty after a flush.
        let slot = self.slots.assign(font.texture()).unwrap();
        Ok(slot as f32)
    }

    fn push_quad(&mut self, quad: Quad, slot: f32, color: [u8; 4]) {
        debug_assert!(self.quads < self.max_quads);

        let base = (self.quads * 4) as u16;
        for (pos, uv) in quad.corners() {
            self.vertices.push(Vertex {
                pos,
                uv,
                texture_index: slot,
                color,
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
        self.quads += 1;
    }
}
