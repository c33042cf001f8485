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

use std::error::Error as StdError;

/// Errors surfaced by font construction and renderer initialization.
///
/// Batch capacity and texture-slot exhaustion are never errors; they trigger
/// automatic flushes inside [`TextRenderer::draw`](crate::TextRenderer::draw).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The backing surface for an atlas image could not be created.
    #[error("could not create the backing surface for the glyph atlas")]
    CanvasUnavailable(#[source] Box<dyn StdError>),

    /// The rasterizer could not produce a glyph for a required codepoint.
    ///
    /// A font with holes in its alphabet is rejected at construction; missing
    /// glyphs encountered at draw time are skipped instead.
    #[error("failed to rasterize {codepoint:?}")]
    RasterizationFailed {
        codepoint: String,
        #[source]
        source: Box<dyn StdError>,
    },

    /// The packer could not fit every glyph into the sized atlas image.
    ///
    /// Signals a sizing-heuristic bug or an oversized alphabet; the atlas is
    /// never silently truncated.
    #[error("glyph atlas of {dimension}x{dimension} cannot fit the requested alphabet")]
    AtlasOverflow { dimension: u32 },

    /// The text shading program failed to compile.
    #[error("the text shading program failed to compile")]
    ShaderCompileFailed(#[source] Box<dyn StdError>),

    /// Any other error reported by the graphics context.
    #[error("graphics context error")]
    Backend(#[source] Box<dyn StdError>),
}

pub(crate) trait ResultExt<T, E: StdError + 'static> {
    fn backend_err(self) -> Result<T, Error>;
    fn canvas_err(self) -> Result<T, Error>;
}

impl<T, E: StdError + 'static> ResultExt<T, E> for Result<T, E> {
    fn backend_err(self) -> Result<T, Error> {
        self.map_err(|e| Error::Backend(Box::new(e)))
    }

    fn canvas_err(self) -> Result<T, Error> {
        self.map_err(|e| Error::CanvasUnavailable(Box::new(e)))
    }
}
