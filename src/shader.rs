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

//! Builds the text shading program.
//!
//! The fragment template carries two placeholders substituted exactly once,
//! at renderer initialization: `%%count%%` (the sampler array size) and
//! `%%texture_picker%%` (the generated per-unit dispatch).

use super::gpu_backend::GpuContext;

use std::fmt::Write;

pub(crate) const VERTEX_SOURCE: &str = include_str!("./shaders/text.v.glsl");
const FRAGMENT_TEMPLATE: &str = include_str!("./shaders/text.f.glsl");

/// The fragment source specialized to `count` texture units.
pub(crate) fn fragment_source(count: u32) -> String {
    FRAGMENT_TEMPLATE
        .replace("%%count%%", &count.to_string())
        .replace("%%texture_picker%%", &texture_picker(count))
}

/// Generate the if/else-if chain that picks the bound texture per fragment.
///
/// GLSL ES forbids indexing a sampler array with a runtime expression, so
/// the dispatch is spelled out over constant indices instead.
fn texture_picker(count: u32) -> String {
    let mut picker = String::new();
    for index in 0..count {
        if index == 0 {
            picker.push_str("    if (v_textureIndex < 0.5) {\n");
        } else {
            let _ = write!(picker, " else if (v_textureIndex < {}.5) {{\n", index);
        }
        let _ = write!(
            picker,
            "        dist = texture2D(textures[{}], v_uv).r;\n    }}",
            index
        );
    }
    picker
}

/// The largest branch count the context's shader compiler accepts, found by
/// binary-search compiling specialized programs up to `hardware_limit`.
///
/// The trial programs are discarded; only the count survives. If even a one-branch
/// program fails to compile this returns 1 and the real compilation in
/// [`TextRenderer::new`](crate::TextRenderer::new) reports the failure.
pub(crate) fn max_compilable_branches<C: GpuContext + ?Sized>(
    context: &mut C,
    hardware_limit: u32,
) -> u32 {
    let mut lo = 1u32;
    let mut hi = hardware_limit.max(1);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if context
            .compile_program(VERTEX_SOURCE, &fragment_source(mid))
            .is_ok()
        {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingContext;

    #[test]
    fn count_placeholder_sizes_the_sampler_array() {
        let source = fragment_source(3);
        assert!(source.contains("uniform sampler2D textures[3];"));
        assert!(!source.contains("%%"));
    }

    #[test]
    fn picker_covers_every_unit_with_constant_indices() {
        let source = fragment_source(3);
        assert!(source.contains("textures[0]"));
        assert!(source.contains("textures[1]"));
        assert!(source.contains("textures[2]"));
        assert_eq!(source.matches("else if").count(), 2);
        assert!(source.contains("v_textureIndex < 2.5"));
    }

    #[test]
    fn single_unit_picker_has_no_else() {
        let picker = texture_picker(1);
        assert!(picker.starts_with("    if (v_textureIndex < 0.5)"));
        assert!(!picker.contains("else"));
    }

    #[test]
    fn discovery_finds_the_compiler_limit() {
        let mut context = RecordingContext::new(16).with_branch_limit(5);
        assert_eq!(max_compilable_branches(&mut context, 16), 5);
    }

    #[test]
    fn discovery_is_capped_by_the_hardware_limit() {
        let mut context = RecordingContext::new(8);
        assert_eq!(max_compilable_branches(&mut context, 8), 8);
    }

    #[test]
    fn discovery_bottoms_out_at_one_branch() {
        let mut context = RecordingContext::new(8).with_branch_limit(0);
        assert_eq!(max_compilable_branches(&mut context, 8), 1);
    }
}
