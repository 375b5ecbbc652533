/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::{collections::btree_map::BTreeMap, string::String};

use rabbitizer::Vram;

use crate::config::GlobalConfig;

use super::Segment;

/// Owns every [`Segment`] in a run and the [`GlobalConfig`] threaded into
/// every analyzer call. There is always a `global` segment for the
/// non-overlay address space; overlay categories are additional, named
/// segments that may share vram ranges with each other and with `global`
/// (spec.md §3.2: "Vram ranges of overlapping segments are disambiguated
/// via `overlayCategory`").
#[derive(Debug, Clone)]
pub struct Context {
    global_config: GlobalConfig,
    global_segment: Segment,
    overlay_segments: BTreeMap<String, Segment>,
}

impl Context {
    #[must_use]
    pub fn new(global_config: GlobalConfig, global_segment: Segment) -> Self {
        Self {
            global_config,
            global_segment,
            overlay_segments: BTreeMap::new(),
        }
    }

    pub const fn global_config(&self) -> &GlobalConfig {
        &self.global_config
    }
    pub fn global_config_mut(&mut self) -> &mut GlobalConfig {
        &mut self.global_config
    }

    pub const fn global_segment(&self) -> &Segment {
        &self.global_segment
    }
    pub fn global_segment_mut(&mut self) -> &mut Segment {
        &mut self.global_segment
    }

    pub fn add_overlay_segment(&mut self, category: impl Into<String>, segment: Segment) {
        self.overlay_segments.insert(category.into(), segment);
    }

    pub fn overlay_segment(&self, category: &str) -> Option<&Segment> {
        self.overlay_segments.get(category)
    }
    pub fn overlay_segment_mut(&mut self, category: &str) -> Option<&mut Segment> {
        self.overlay_segments.get_mut(category)
    }

    pub fn overlay_segments(&self) -> impl Iterator<Item = (&String, &Segment)> {
        self.overlay_segments.iter()
    }

    /// Returns the segment (overlay-scoped if `category` is given, else the
    /// global one) whose `[vram_start, vram_end)` contains `vram`, or the
    /// chosen segment regardless of range when no segment actually claims
    /// it (used by `ALLOW_UNKSEGMENT`-gated callers).
    pub fn find_owning_segment(&self, vram: Vram, category: Option<&str>) -> Option<&Segment> {
        if let Some(category) = category {
            let seg = self.overlay_segments.get(category)?;
            return if seg.is_vram_in_range(vram) {
                Some(seg)
            } else {
                None
            };
        }
        if self.global_segment.is_vram_in_range(vram) {
            return Some(&self.global_segment);
        }
        self.overlay_segments
            .values()
            .find(|seg| seg.is_vram_in_range(vram))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Compiler, Endian};

    #[test]
    fn find_owning_segment_prefers_global_then_overlays() {
        let global = Segment::new(Vram::new(0x8000_0000), Vram::new(0x8001_0000), None);
        let mut ctx = Context::new(GlobalConfig::new(Compiler::IDO, Endian::Big), global);

        let overlay = Segment::new(
            Vram::new(0x8001_0000),
            Vram::new(0x8002_0000),
            Some(String::from("ovl_foo")),
        );
        ctx.add_overlay_segment("ovl_foo", overlay);

        assert!(ctx
            .find_owning_segment(Vram::new(0x8000_1234), None)
            .is_some());
        assert!(ctx
            .find_owning_segment(Vram::new(0x8001_1234), Some("ovl_foo"))
            .is_some());
        assert!(ctx
            .find_owning_segment(Vram::new(0x8003_0000), None)
            .is_none());
    }
}
