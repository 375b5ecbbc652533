/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::{collections::btree_map::BTreeMap, vec::Vec};

use rabbitizer::Vram;

use crate::addresses::Size;
use crate::analysis::AnalysisWarning;
use crate::context::Segment;
use crate::metadata::SectionType;

/// BSS has no bytes of its own: only a start vram and a total size. Its
/// analysis is entirely about the symbol table (spec.md §4.5).
#[derive(Debug, Clone)]
pub struct BssSection {
    vram_start: Vram,
    total_size: Size,
    warnings: Vec<AnalysisWarning>,
}

impl BssSection {
    pub fn analyze(segment: &mut Segment, vram_start: Vram, total_size: Size) -> Self {
        let vram_end = vram_start + total_size;
        let mut warnings = Vec::new();

        // Step 1: ensure a symbol exists at the very start.
        segment.add_symbol(vram_start, SectionType::Bss, true);

        // Step 2: drain pending pointer candidates in range into new BSS
        // symbols, collapsed into one map keyed by offset so re-draining the
        // same address twice is idempotent rather than a duplicate entry
        // (resolves spec.md §9's Open Question on duplicate-key semantics).
        // A candidate already covered by an existing sized user symbol is
        // skipped rather than split into a spurious overlapping symbol.
        let mut offsets: BTreeMap<u32, Vram> = BTreeMap::new();
        for addr in segment.pop_pointer_in_data_references_range(vram_start, vram_end) {
            let offset = addr.inner() - vram_start.inner();
            offsets.insert(offset, addr);
        }
        for &addr in offsets.values() {
            let overlapped_by_sized_user_symbol = segment
                .get_symbol(addr, true, true)
                .is_some_and(|existing| existing.is_user_declared() && existing.user_declared_size().is_some());
            if overlapped_by_sized_user_symbol {
                continue;
            }
            segment.add_symbol(addr, SectionType::Bss, true);
        }

        // Step 3: mark every existing in-range symbol as defined + Bss.
        let in_range: Vec<Vram> = segment
            .get_symbols_range(vram_start, vram_end)
            .map(|sym| sym.address())
            .collect();
        for addr in &in_range {
            if let Some(sym) = segment.get_symbol_exact_mut(*addr) {
                sym.set_defined();
                sym.force_section_type(SectionType::Bss);
            }
        }

        // Step 4: compute spans from consecutive offsets, falling back to
        // bssTotalSize for the final symbol, honoring user-declared sizes.
        for (i, &addr) in in_range.iter().enumerate() {
            let this_offset = addr.inner() - vram_start.inner();
            let next_offset = in_range
                .get(i + 1)
                .map_or(total_size.inner(), |next| next.inner() - vram_start.inner());
            let computed_span = next_offset.saturating_sub(this_offset);

            let sym = segment.get_symbol_exact_mut(addr).expect("just collected");
            if let Some(user_size) = sym.user_declared_size() {
                if user_size.inner() != computed_span {
                    warnings.push(AnalysisWarning::BssSizeConflict {
                        address: addr,
                        user_size: user_size.inner(),
                        computed_span,
                    });
                }
            } else {
                sym.set_autodetected_size(Size::new(computed_span));
            }
        }

        Self {
            vram_start,
            total_size,
            warnings,
        }
    }

    pub const fn vram_start(&self) -> Vram {
        self.vram_start
    }
    pub const fn total_size(&self) -> Size {
        self.total_size
    }
    pub fn warnings(&self) -> &[AnalysisWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment() -> Segment {
        Segment::new(Vram::new(0x8001_0000), Vram::new(0x8002_0000), None)
    }

    #[test]
    fn ensures_symbol_at_start() {
        let mut seg = segment();
        BssSection::analyze(&mut seg, Vram::new(0x8001_0000), Size::new(0x100));
        assert!(seg.get_symbol_exact(Vram::new(0x8001_0000)).is_some());
    }

    #[test]
    fn drains_pending_pointers_into_new_symbols() {
        let mut seg = segment();
        seg.add_pointer_in_data_reference(Vram::new(0x8001_0010));
        BssSection::analyze(&mut seg, Vram::new(0x8001_0000), Size::new(0x100));
        let sym = seg.get_symbol_exact(Vram::new(0x8001_0010)).unwrap();
        assert!(sym.is_defined());
        assert_eq!(sym.section_type(), SectionType::Bss);
    }

    #[test]
    fn last_symbol_span_uses_total_size() {
        let mut seg = segment();
        seg.add_symbol(Vram::new(0x8001_0000), SectionType::Bss, true);
        seg.add_symbol(Vram::new(0x8001_0010), SectionType::Bss, true);
        let section = BssSection::analyze(&mut seg, Vram::new(0x8001_0000), Size::new(0x100));
        assert!(section.warnings().is_empty());
        let last = seg.get_symbol_exact(Vram::new(0x8001_0010)).unwrap();
        assert_eq!(last.size().inner(), 0x100 - 0x10);
    }

    #[test]
    fn drained_pointer_overlapped_by_sized_user_symbol_is_skipped() {
        let mut seg = segment();
        let owner = seg.add_symbol(Vram::new(0x8001_0000), SectionType::Bss, false);
        owner.set_user_declared_size(Size::new(0x20));

        seg.add_pointer_in_data_reference(Vram::new(0x8001_0008));
        BssSection::analyze(&mut seg, Vram::new(0x8001_0000), Size::new(0x100));

        assert!(seg.get_symbol_exact(Vram::new(0x8001_0008)).is_none());
    }

    #[test]
    fn user_size_conflict_is_warned_and_kept() {
        let mut seg = segment();
        let first = seg.add_symbol(Vram::new(0x8001_0000), SectionType::Bss, true);
        first.set_user_declared_size(Size::new(4));
        seg.add_symbol(Vram::new(0x8001_0010), SectionType::Bss, true);

        let section = BssSection::analyze(&mut seg, Vram::new(0x8001_0000), Size::new(0x100));
        assert_eq!(section.warnings().len(), 1);
        let first = seg.get_symbol_exact(Vram::new(0x8001_0000)).unwrap();
        assert_eq!(first.size().inner(), 4);
    }
}
