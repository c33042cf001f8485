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

//! Defines the GPU backend for the text renderer.

use std::error::Error;

/// The graphics context the renderer draws through.
///
/// This is the complete set of operations the batcher needs: shader program
/// compilation, uniform setters, texture creation and binding, vertex/index
/// upload and an indexed draw. A context that cannot satisfy this surface is
/// rejected when [`TextRenderer::new`] fails to compile the text program;
/// nothing is re-checked per frame.
///
/// [`TextRenderer::new`]: crate::TextRenderer::new
pub trait GpuContext {
    /// A compiled and linked shader program.
    type Program;

    /// The type associated with a GPU texture.
    type Texture;

    /// The type associated with a GPU vertex buffer.
    ///
    /// Contains vertices, indices and any layout data.
    type VertexBuffer;

    /// The error type associated with this GPU context.
    type Error: Error + 'static;

    /// The number of texture units a fragment shader can sample in one draw.
    fn max_texture_units(&mut self) -> u32;

    /// Compile and link a shader program from vertex and fragment sources.
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self::Program, Self::Error>;

    /// Set a `mat4` uniform on a program.
    fn set_matrix_uniform(&mut self, program: &Self::Program, name: &str, value: &[f32; 16]);

    /// Set a `float` uniform on a program.
    fn set_float_uniform(&mut self, program: &Self::Program, name: &str, value: f32);

    /// Set an `int` array uniform on a program.
    fn set_int_array_uniform(&mut self, program: &Self::Program, name: &str, value: &[i32]);

    /// Create a new texture from RGBA pixels.
    fn create_texture(
        &mut self,
        size: (u32, u32),
        data: &[u8],
    ) -> Result<Self::Texture, Self::Error>;

    /// Bind a texture to the given texture unit.
    fn bind_texture(&mut self, texture: &Self::Texture, unit: u32);

    /// Create a new vertex buffer.
    fn create_vertex_buffer(&mut self) -> Result<Self::VertexBuffer, Self::Error>;

    /// Write vertices and indices to a vertex buffer.
    ///
    /// The indices must be valid for the vertices set; however, it is up to the GPU
    /// implementation to actually check this.
    fn write_vertices(
        &mut self,
        buffer: &Self::VertexBuffer,
        vertices: &[Vertex],
        indices: &[u16],
    );

    /// The orthographic projection for the current frame.
    fn projection_matrix(&mut self) -> [f32; 16];

    /// Issue one indexed draw over the first `index_count` indices of the buffer.
    ///
    /// Submission is fire-and-forget from the caller's perspective.
    fn draw_indexed(&mut self, program: &Self::Program, buffer: &Self::VertexBuffer, index_count: u32);
}

impl<C: GpuContext + ?Sized> GpuContext for &mut C {
    type Program = C::Program;
    type Texture = C::Texture;
    type VertexBuffer = C::VertexBuffer;
    type Error = C::Error;

    fn max_texture_units(&mut self) -> u32 {
        (**self).max_texture_units()
    }

    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self::Program, Self::Error> {
        (**self).compile_program(vertex_source, fragment_source)
    }

    fn set_matrix_uniform(&mut self, program: &Self::Program, name: &str, value: &[f32; 16]) {
        (**self).set_matrix_uniform(program, name, value)
    }

    fn set_float_uniform(&mut self, program: &Self::Program, name: &str, value: f32) {
        (**self).set_float_uniform(program, name, value)
    }

    fn set_int_array_uniform(&mut self, program: &Self::Program, name: &str, value: &[i32]) {
        (**self).set_int_array_uniform(program, name, value)
    }

    fn create_texture(
        &mut self,
        size: (u32, u32),
        data: &[u8],
    ) -> Result<Self::Texture, Self::Error> {
        (**self).create_texture(size, data)
    }

    fn bind_texture(&mut self, texture: &Self::Texture, unit: u32) {
        (**self).bind_texture(texture, unit)
    }

    fn create_vertex_buffer(&mut self) -> Result<Self::VertexBuffer, Self::Error> {
        (**self).create_vertex_buffer()
    }

    fn write_vertices(
        &mut self,
        buffer: &Self::VertexBuffer,
        vertices: &[Vertex],
        indices: &[u16],
    ) {
        (**self).write_vertices(buffer, vertices, indices)
    }

    fn projection_matrix(&mut self) -> [f32; 16] {
        (**self).projection_matrix()
    }

    fn draw_indexed(&mut self, program: &Self::Program, buffer: &Self::VertexBuffer, index_count: u32) {
        (**self).draw_indexed(program, buffer, index_count)
    }
}

/// The vertex type used by the text renderer.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Vertex {
    /// The position of the vertex in screen space.
    pub pos: [f32; 2],

    /// The coordinate of the vertex in the atlas texture.
    pub uv: [f32; 2],

    /// The texture unit the fragment stage should sample.
    ///
    /// A float because the attribute feeds the generated branch chain in the
    /// fragment shader; see [`crate::shader`].
    pub texture_index: f32,

    /// The color of the vertex, in four SRGB channels.
    pub color: [u8; 4],
}
