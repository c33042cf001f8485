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

//! GPU-free doubles for the context and rasterizer traits.

use super::font::{GlyphRasterizer, RasterRequest, RasterizedGlyph};
use super::gpu_backend::{GpuContext, Vertex};

use std::fmt;

#[derive(Debug)]
pub(crate) struct TestError(pub(crate) &'static str);

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for TestError {}

/// One indexed draw call as observed by the [`RecordingContext`].
pub(crate) struct DrawRecord {
    pub(crate) index_count: u32,
    /// Texture ids bound at submission time, by unit.
    pub(crate) bound: Vec<usize>,
    pub(crate) gamma: f32,
    pub(crate) halo: f32,
}

/// A `GpuContext` that records submissions instead of talking to a GPU.
///
/// `branch_limit` models a shader compiler that rejects fragment programs
/// whose texture dispatch chain grows past a fixed depth; it counts the
/// `texture2D` sites in the source.
pub(crate) struct RecordingContext {
    max_units: u32,
    branch_limit: u32,
    next_texture: usize,
    bound: Vec<Option<usize>>,
    gamma: f32,
    halo: f32,
    pub(crate) draws: Vec<DrawRecord>,
    pub(crate) programs_compiled: usize,
    pub(crate) last_upload: Option<(usize, usize)>,
    pub(crate) int_arrays: Vec<(String, Vec<i32>)>,
}

impl RecordingContext {
    pub(crate) fn new(max_units: u32) -> Self {
        Self {
            max_units,
            branch_limit: u32::MAX,
            next_texture: 0,
            bound: Vec::new(),
            gamma: 0.0,
            halo: 0.0,
            draws: Vec::new(),
            programs_compiled: 0,
            last_upload: None,
            int_arrays: Vec::new(),
        }
    }

    pub(crate) fn with_branch_limit(mut self, branch_limit: u32) -> Self {
        self.branch_limit = branch_limit;
        self
    }
}

impl GpuContext for RecordingContext {
    type Program = usize;
    type Texture = usize;
    type VertexBuffer = usize;
    type Error = TestError;

    fn max_texture_units(&mut self) -> u32 {
        self.max_units
    }

    fn compile_program(
        &mut self,
        _vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self::Program, Self::Error> {
        let branches = fragment_source.matches("texture2D(").count() as u32;
        if branches > self.branch_limit {
            return Err(TestError("branch chain too deep"));
        }
        self.programs_compiled += 1;
        Ok(self.programs_compiled)
    }

    fn set_matrix_uniform(&mut self, _program: &usize, _name: &str, _value: &[f32; 16]) {}

    fn set_float_uniform(&mut self, _program: &usize, name: &str, value: f32) {
        match name {
            "gamma" => self.gamma = value,
            "halo" => self.halo = value,
            _ => {}
        }
    }

    fn set_int_array_uniform(&mut self, _program: &usize, name: &str, value: &[i32]) {
        self.int_arrays.push((name.to_owned(), value.to_vec()));
    }

    fn create_texture(&mut self, size: (u32, u32), data: &[u8]) -> Result<usize, TestError> {
        if data.len() != size.0 as usize * size.1 as usize * 4 {
            return Err(TestError("pixel data does not match texture size"));
        }
        self.next_texture += 1;
        Ok(self.next_texture)
    }

    fn bind_texture(&mut self, texture: &usize, unit: u32) {
        let unit = unit as usize;
        if self.bound.len() <= unit {
            self.bound.resize(unit + 1, None);
        }
        self.bound[unit] = Some(*texture);
    }

    fn create_vertex_buffer(&mut self) -> Result<usize, TestError> {
        Ok(0)
    }

    fn write_vertices(&mut self, _buffer: &usize, vertices: &[Vertex], indices: &[u16]) {
        self.last_upload = Some((vertices.len(), indices.len()));
    }

    fn projection_matrix(&mut self) -> [f32; 16] {
        let mut matrix = [0.0; 16];
        matrix[0] = 1.0;
        matrix[5] = 1.0;
        matrix[10] = 1.0;
        matrix[15] = 1.0;
        matrix
    }

    fn draw_indexed(&mut self, _program: &usize, _buffer: &usize, index_count: u32) {
        self.draws.push(DrawRecord {
            index_count,
            bound: self.bound.iter().flatten().copied().collect(),
            gamma: self.gamma,
            halo: self.halo,
        });
    }
}

/// Rasterizes every glyph as a full SDF cell with a per-cluster fill byte.
pub(crate) struct CellRasterizer;

impl GlyphRasterizer for CellRasterizer {
    type Error = TestError;

    fn rasterize(&mut self, request: &RasterRequest<'_>) -> Result<RasterizedGlyph, Self::Error> {
        let side = request.font_size + 2 * request.buffer;
        let fill = request
            .codepoint
            .bytes()
            .fold(0u8, |acc, byte| acc.wrapping_add(byte))
            | 1;

        Ok(RasterizedGlyph {
            bitmap: vec![fill; side as usize * side as usize],
            width: side,
            height: side,
            glyph_width: request.font_size,
            glyph_height: request.font_size,
            top: request.font_size as i32,
            left: 0,
            advance: request.font_size as f32 * 0.6,
        })
    }
}
