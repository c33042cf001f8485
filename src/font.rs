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

//! Font atlases, combining one alphabet's worth of SDF glyphs into a single texture.

use super::error::{Error, ResultExt};
use super::gpu_backend::GpuContext;
use super::packer::ShelfPacker;
use super::resources::Texture;

use ahash::RandomState;
use hashbrown::HashMap;
use unicode_segmentation::UnicodeSegmentation;

use std::error::Error as StdError;
use std::fmt;
use std::rc::Rc;

/// The default SDF edge threshold.
const DEFAULT_HALO: f32 = 0.75;

/// Produces distance-field bitmaps for single glyphs.
///
/// This is the boundary to the host's font machinery: given one extended
/// grapheme cluster and font parameters, return a single-channel distance
/// bitmap plus the metrics needed for layout. Shaping across glyphs (kerning,
/// ligatures, bidi) is explicitly not part of this contract.
pub trait GlyphRasterizer {
    /// The error type associated with this rasterizer.
    type Error: StdError + 'static;

    /// Rasterize one grapheme cluster into a distance bitmap.
    fn rasterize(&mut self, request: &RasterRequest<'_>) -> Result<RasterizedGlyph, Self::Error>;
}

/// The parameters for rasterizing a single glyph.
#[derive(Debug, Clone, Copy)]
pub struct RasterRequest<'a> {
    /// The grapheme cluster to rasterize.
    ///
    /// May span multiple code units (emoji, accented composites).
    pub codepoint: &'a str,

    /// The nominal font size in pixels.
    pub font_size: u32,

    /// The font weight.
    pub weight: FontWeight,

    /// The font style.
    pub style: FontStyle,

    /// Distance-field padding around the glyph, in pixels.
    pub buffer: u32,

    /// Distance-field falloff radius, in pixels.
    pub radius: u32,
}

/// A rasterized glyph as returned by a [`GlyphRasterizer`].
#[derive(Debug, Clone)]
pub struct RasterizedGlyph {
    /// Single-channel distance bytes, row-major, `width * height` long.
    pub bitmap: Vec<u8>,

    /// Width of the bitmap in pixels, including the SDF padding.
    pub width: u32,

    /// Height of the bitmap in pixels, including the SDF padding.
    pub height: u32,

    /// Logical width of the glyph, without padding.
    pub glyph_width: u32,

    /// Logical height of the glyph, without padding.
    pub glyph_height: u32,

    /// Vertical bearing: distance from the baseline up to the glyph's top.
    pub top: i32,

    /// Horizontal bearing: offset from the pen to the glyph's left edge.
    pub left: i32,

    /// Horizontal pen advance, in pixels at the nominal size.
    pub advance: f32,
}

/// The weight of a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// The style of a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// The parameters for building an [`SdfFont`].
#[derive(Debug, Clone)]
pub struct FontConfig<'a> {
    /// The nominal font size in pixels.
    pub size: u32,

    /// The font weight.
    pub weight: FontWeight,

    /// The font style.
    pub style: FontStyle,

    /// Every grapheme cluster the font should cover, in atlas order.
    ///
    /// Duplicates are rasterized once. Characters outside the alphabet are
    /// skipped at draw time rather than rendered.
    pub alphabet: &'a str,

    /// Overrides the derived edge-softness shading constant.
    pub gamma: Option<f32>,

    /// Overrides the default edge-threshold shading constant.
    pub halo: Option<f32>,
}

impl<'a> FontConfig<'a> {
    /// A config with default weight, style and shading constants.
    pub fn new(size: u32, alphabet: &'a str) -> Self {
        Self {
            size,
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            alphabet,
            gamma: None,
            halo: None,
        }
    }
}

/// One glyph's bitmap and metrics, as stored in a font.
///
/// Created during atlas construction and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Glyph {
    bitmap: Box<[u8]>,
    width: u32,
    height: u32,
    glyph_width: u32,
    glyph_height: u32,
    top: i32,
    left: i32,
    advance: f32,
}

impl Glyph {
    /// The distance bitmap, row-major, one byte per pixel.
    pub fn bitmap(&self) -> &[u8] {
        &self.bitmap
    }

    /// Bitmap width in pixels, including SDF padding.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Bitmap height in pixels, including SDF padding.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Logical glyph width, without padding.
    pub fn glyph_width(&self) -> u32 {
        self.glyph_width
    }

    /// Logical glyph height, without padding.
    pub fn glyph_height(&self) -> u32 {
        self.glyph_height
    }

    /// Vertical bearing from the baseline to the glyph's top.
    pub fn top(&self) -> i32 {
        self.top
    }

    /// Horizontal bearing from the pen to the glyph's left edge.
    pub fn left(&self) -> i32 {
        self.left
    }

    /// Horizontal pen advance at the nominal font size.
    pub fn advance(&self) -> f32 {
        self.advance
    }
}

/// A glyph's origin within the atlas image.
///
/// The rectangle `[x, x + width) x [y, y + height)` of the owning glyph is
/// disjoint from every other glyph's rectangle and contained in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasLocation {
    pub x: u32,
    pub y: u32,
}

/// The shading constants a batch applies uniformly to every quad it holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ShadingParams {
    pub(crate) gamma: f32,
    pub(crate) halo: f32,
}

/// An alphabet's worth of SDF glyphs packed into one atlas texture.
///
/// Construction is synchronous and eager: every glyph is rasterized, packed
/// and uploaded before `new` returns. The font is read-only afterwards; its
/// GPU texture lives as long as the font (or any renderer batch holding a
/// reference to it).
pub struct SdfFont<C: GpuContext + ?Sized> {
    size: u32,
    weight: FontWeight,
    style: FontStyle,
    buffer: u32,
    radius: u32,
    cell_size: u32,
    dimension: u32,
    gamma: f32,
    halo: f32,
    glyphs: HashMap<String, Glyph, RandomState>,
    locations: HashMap<String, AtlasLocation, RandomState>,
    pixels: Box<[u8]>,
    texture: Rc<Texture<C>>,
}

impl<C: GpuContext + ?Sized> SdfFont<C> {
    /// Build a font by rasterizing and packing its whole alphabet.
    ///
    /// Fails with [`Error::RasterizationFailed`] if the rasterizer cannot
    /// produce a required glyph, [`Error::AtlasOverflow`] if the heuristic
    /// atlas dimension cannot hold the packed bitmaps, and
    /// [`Error::CanvasUnavailable`] if the atlas texture cannot be created.
    pub fn new<R: GlyphRasterizer>(
        context: &mut C,
        rasterizer: &mut R,
        config: &FontConfig<'_>,
    ) -> Result<Self, Error> {
        let size = config.size.max(1);
        let buffer = (size + 7) / 8;
        let radius = (size + 2) / 3;
        let cell_size = size + 2 * buffer;

        let cluster_count = config.alphabet.graphemes(true).count().max(1);
        // Upper-bound heuristic, not a guarantee; packing is still validated
        // against it below.
        let dimension = (cluster_count as f64).sqrt().ceil() as u32 * cell_size;

        let mut glyphs = HashMap::with_hasher(RandomState::new());
        let mut locations = HashMap::with_hasher(RandomState::new());
        let mut packer = ShelfPacker::new(dimension);
        let mut pixels = vec![0u8; dimension as usize * dimension as usize * 4];

        for cluster in config.alphabet.graphemes(true) {
            if glyphs.contains_key(cluster) {
                continue;
            }

            let request = RasterRequest {
                codepoint: cluster,
                font_size: size,
                weight: config.weight,
                style: config.style,
                buffer,
                radius,
            };
            let raster = rasterizer
                .rasterize(&request)
                .map_err(|e| Error::RasterizationFailed {
                    codepoint: cluster.to_owned(),
                    source: Box::new(e),
                })?;
            debug_assert_eq!(
                raster.bitmap.len(),
                raster.width as usize * raster.height as usize
            );

            let (x, y) = packer
                .place(raster.width, raster.height)
                .ok_or(Error::AtlasOverflow { dimension })?;
            blit(&mut pixels, dimension, (x, y), &raster);

            locations.insert(cluster.to_owned(), AtlasLocation { x, y });
            glyphs.insert(
                cluster.to_owned(),
                Glyph {
                    bitmap: raster.bitmap.into_boxed_slice(),
                    width: raster.width,
                    height: raster.height,
                    glyph_width: raster.glyph_width,
                    glyph_height: raster.glyph_height,
                    top: raster.top,
                    left: raster.left,
                    advance: raster.advance,
                },
            );
        }

        let texture = Texture::new(context, (dimension, dimension), &pixels).canvas_err()?;

        tracing::debug!(
            size,
            glyphs = glyphs.len(),
            dimension,
            "built SDF font atlas"
        );

        Ok(Self {
            size,
            weight: config.weight,
            style: config.style,
            buffer,
            radius,
            cell_size,
            dimension,
            gamma: config
                .gamma
                .unwrap_or(2.0 * std::f32::consts::SQRT_2 / size as f32),
            halo: config.halo.unwrap_or(DEFAULT_HALO),
            glyphs,
            locations,
            pixels: pixels.into_boxed_slice(),
            texture: Rc::new(texture),
        })
    }

    /// The nominal font size in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// The font weight.
    pub fn weight(&self) -> FontWeight {
        self.weight
    }

    /// The font style.
    pub fn style(&self) -> FontStyle {
        self.style
    }

    /// The SDF padding around each glyph, `ceil(size / 8)`.
    pub fn buffer_px(&self) -> u32 {
        self.buffer
    }

    /// The SDF falloff radius, `ceil(size / 3)`.
    pub fn radius_px(&self) -> u32 {
        self.radius
    }

    /// The nominal atlas cell side, `size + 2 * buffer`.
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// The side length of the square atlas image.
    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    /// The edge-softness shading constant, `2 * sqrt(2) / size` by default.
    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    /// The edge-threshold shading constant.
    pub fn halo(&self) -> f32 {
        self.halo
    }

    /// Look up a glyph by grapheme cluster.
    ///
    /// Callers that need strict coverage can pre-check their input here
    /// before drawing; missing glyphs are skipped during emission.
    pub fn glyph(&self, cluster: &str) -> Option<&Glyph> {
        self.glyphs.get(cluster)
    }

    /// Look up a glyph's atlas origin by grapheme cluster.
    pub fn location(&self, cluster: &str) -> Option<AtlasLocation> {
        self.locations.get(cluster).copied()
    }

    /// The number of distinct glyphs in the atlas.
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// The CPU-side copy of the atlas image, RGBA, row-major.
    ///
    /// Each distance byte is stored as an opaque grayscale pixel; alpha is
    /// intentionally 255 everywhere since the distance value travels as
    /// color and is decoded in the shading stage.
    pub fn atlas_pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The atlas texture shared with renderer batches.
    pub(crate) fn texture(&self) -> &Rc<Texture<C>> {
        &self.texture
    }

    pub(crate) fn shading(&self) -> ShadingParams {
        ShadingParams {
            gamma: self.gamma,
            halo: self.halo,
        }
    }
}

impl<C: GpuContext + ?Sized> fmt::Debug for SdfFont<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdfFont")
            .field("size", &self.size)
            .field("weight", &self.weight)
            .field("style", &self.style)
            .field("dimension", &self.dimension)
            .field("glyphs", &self.glyphs.len())
            .finish_non_exhaustive()
    }
}

/// Write a glyph's distance bytes into the RGBA atlas image.
fn blit(pixels: &mut [u8], dimension: u32, origin: (u32, u32), raster: &RasterizedGlyph) {
    for row in 0..raster.height {
        for col in 0..raster.width {
            let dist = raster.bitmap[(row * raster.width + col) as usize];
            let offset =
                ((origin.1 + row) * dimension + origin.0 + col) as usize * 4;
            pixels[offset] = dist;
            pixels[offset + 1] = dist;
            pixels[offset + 2] = dist;
            pixels[offset + 3] = 255;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CellRasterizer, RecordingContext, TestError};

    #[test]
    fn derived_parameters_match_font_size() {
        let mut context = RecordingContext::new(8);
        let font = SdfFont::new(
            &mut context,
            &mut CellRasterizer,
            &FontConfig::new(16, "AB"),
        )
        .unwrap();

        assert_eq!(font.buffer_px(), 2);
        assert_eq!(font.radius_px(), 6);
        assert_eq!(font.cell_size(), 20);
        assert_eq!(font.dimension(), 40);
        assert!((font.gamma() - 0.17678).abs() < 1e-4);
        assert_eq!(font.halo(), 0.75);
    }

    #[test]
    fn two_cell_glyphs_share_the_first_shelf() {
        let mut context = RecordingContext::new(8);
        let font = SdfFont::new(
            &mut context,
            &mut CellRasterizer,
            &FontConfig::new(16, "AB"),
        )
        .unwrap();

        let a = font.location("A").unwrap();
        let b = font.location("B").unwrap();
        assert_eq!(a, AtlasLocation { x: 0, y: 0 });
        assert_eq!(b.y, 0);
        assert_eq!(b.x, font.glyph("A").unwrap().width());
    }

    #[test]
    fn every_alphabet_entry_is_in_both_tables() {
        let mut context = RecordingContext::new(8);
        let font = SdfFont::new(
            &mut context,
            &mut CellRasterizer,
            &FontConfig::new(12, "abc123"),
        )
        .unwrap();

        for cluster in ["a", "b", "c", "1", "2", "3"] {
            assert!(font.glyph(cluster).is_some());
            assert!(font.location(cluster).is_some());
        }
        assert_eq!(font.glyph_count(), 6);
    }

    #[test]
    fn atlas_pixels_round_trip_the_rasterized_bitmap() {
        let mut context = RecordingContext::new(8);
        let font = SdfFont::new(
            &mut context,
            &mut CellRasterizer,
            &FontConfig::new(16, "AB"),
        )
        .unwrap();

        for cluster in ["A", "B"] {
            let glyph = font.glyph(cluster).unwrap();
            let loc = font.location(cluster).unwrap();
            let pixels = font.atlas_pixels();
            let dim = font.dimension();

            for row in 0..glyph.height() {
                for col in 0..glyph.width() {
                    let expected = glyph.bitmap()[(row * glyph.width() + col) as usize];
                    let offset = ((loc.y + row) * dim + loc.x + col) as usize * 4;
                    assert_eq!(pixels[offset], expected);
                    assert_eq!(pixels[offset + 1], expected);
                    assert_eq!(pixels[offset + 2], expected);
                    assert_eq!(pixels[offset + 3], 255);
                }
            }
        }
    }

    #[test]
    fn multi_code_unit_graphemes_round_trip_as_one_key() {
        let mut context = RecordingContext::new(8);
        let font = SdfFont::new(
            &mut context,
            &mut CellRasterizer,
            &FontConfig::new(16, "a👍é"),
        )
        .unwrap();

        assert_eq!(font.glyph_count(), 3);
        assert!(font.glyph("👍").is_some());
        assert!(font.location("👍").is_some());
    }

    #[test]
    fn duplicate_alphabet_entries_pack_once() {
        let mut context = RecordingContext::new(8);
        let font = SdfFont::new(
            &mut context,
            &mut CellRasterizer,
            &FontConfig::new(16, "AAB"),
        )
        .unwrap();

        assert_eq!(font.glyph_count(), 2);
    }

    #[test]
    fn shading_overrides_replace_derived_constants() {
        let mut context = RecordingContext::new(8);
        let config = FontConfig {
            gamma: Some(0.5),
            halo: Some(0.6),
            ..FontConfig::new(16, "A")
        };
        let font = SdfFont::new(&mut context, &mut CellRasterizer, &config).unwrap();

        assert_eq!(font.gamma(), 0.5);
        assert_eq!(font.halo(), 0.6);
    }

    #[test]
    fn rasterizer_failure_is_fatal_at_construction() {
        struct Failing;

        impl GlyphRasterizer for Failing {
            type Error = TestError;

            fn rasterize(
                &mut self,
                _request: &RasterRequest<'_>,
            ) -> Result<RasterizedGlyph, Self::Error> {
                Err(TestError("no outline"))
            }
        }

        let mut context = RecordingContext::new(8);
        let err = SdfFont::new(&mut context, &mut Failing, &FontConfig::new(16, "A"))
            .unwrap_err();
        assert!(matches!(err, Error::RasterizationFailed { .. }));
    }

    #[test]
    fn oversized_bitmaps_overflow_the_atlas() {
        struct Oversize;

        impl GlyphRasterizer for Oversize {
            type Error = TestError;

            fn rasterize(
                &mut self,
                request: &RasterRequest<'_>,
            ) -> Result<RasterizedGlyph, Self::Error> {
                let side = (request.font_size + 2 * request.buffer) * 3;
                Ok(RasterizedGlyph {
                    bitmap: vec![0xff; side as usize * side as usize],
                    width: side,
                    height: side,
                    glyph_width: request.font_size,
                    glyph_height: request.font_size,
                    top: request.font_size as i32,
                    left: 0,
                    advance: request.font_size as f32,
                })
            }
        }

        let mut context = RecordingContext::new(8);
        let err = SdfFont::new(&mut context, &mut Oversize, &FontConfig::new(16, "A"))
            .unwrap_err();
        assert!(matches!(err, Error::AtlasOverflow { dimension: 20 }));
    }
}
