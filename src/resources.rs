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

//! Defines useful resource wrappers.

use super::gpu_backend::{GpuContext, Vertex};

macro_rules! define_resource_wrappers {
    ($($name:ident($res:ident)),* $(,)?) => {
        $(
            pub(crate) struct $name<C: GpuContext + ?Sized> {
                resource: C::$res,
            }

            impl<C: GpuContext + ?Sized> $name<C> {
                pub(crate) fn from_raw(resource: C::$res) -> Self {
                    Self { resource }
                }

                pub(crate) fn resource(&self) -> &C::$res {
                    &self.resource
                }
            }
        )*
    };
}

define_resource_wrappers! {
    Program(Program),
    Texture(Texture),
    VertexBuffer(VertexBuffer),
}

impl<C: GpuContext + ?Sized> Program<C> {
    pub(crate) fn compile(
        context: &mut C,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, C::Error> {
        let resource = context.compile_program(vertex_source, fragment_source)?;
        Ok(Self::from_raw(resource))
    }
}

impl<C: GpuContext + ?Sized> Texture<C> {
    pub(crate) fn new(
        context: &mut C,
        size: (u32, u32),
        data: &[u8],
    ) -> Result<Self, C::Error> {
        let resource = context.create_texture(size, data)?;
        Ok(Self::from_raw(resource))
    }

    pub(crate) fn bind(&self, context: &mut C, unit: u32) {
        context.bind_texture(self.resource(), unit);
    }
}

impl<C: GpuContext + ?Sized> VertexBuffer<C> {
    pub(crate) fn new(context: &mut C) -> Result<Self, C::Error> {
        let resource = context.create_vertex_buffer()?;
        Ok(Self::from_raw(resource))
    }

    pub(crate) fn upload(&self, context: &mut C, vertices: &[Vertex], indices: &[u16]) {
        context.write_vertices(self.resource(), vertices, indices)
    }
}
