/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::{
    collections::{btree_map::BTreeMap, btree_set::BTreeSet},
    string::String,
    vec::Vec,
};

use rabbitizer::Vram;

use crate::collections::OrderedAddressSet;
use crate::metadata::{ContextSymbol, SectionType, SymbolType};

/// A half-open virtual address window `[vram_start, vram_end)` and the
/// symbols discovered (or user-declared) within it. Overlapping segments
/// at runtime are disambiguated by `overlay_category` (spec.md §3.2).
#[derive(Debug, Clone)]
pub struct Segment {
    vram_start: Vram,
    vram_end: Vram,
    overlay_category: Option<String>,

    symbols: BTreeMap<Vram, ContextSymbol>,
    constants: BTreeMap<i64, ContextSymbol>,

    new_pointers_in_data: OrderedAddressSet,
    lo_patches: BTreeMap<Vram, Vram>,

    data_symbols_with_references_with_addends: BTreeSet<Vram>,
    data_referencing_constants: BTreeSet<Vram>,
}

impl Segment {
    #[must_use]
    pub fn new(vram_start: Vram, vram_end: Vram, overlay_category: Option<String>) -> Self {
        assert!(
            vram_start < vram_end,
            "Segment requires vram_start < vram_end"
        );
        Self {
            vram_start,
            vram_end,
            overlay_category,
            symbols: BTreeMap::new(),
            constants: BTreeMap::new(),
            new_pointers_in_data: OrderedAddressSet::new(),
            lo_patches: BTreeMap::new(),
            data_symbols_with_references_with_addends: BTreeSet::new(),
            data_referencing_constants: BTreeSet::new(),
        }
    }

    pub const fn vram_start(&self) -> Vram {
        self.vram_start
    }
    pub const fn vram_end(&self) -> Vram {
        self.vram_end
    }
    pub fn overlay_category(&self) -> Option<&str> {
        self.overlay_category.as_deref()
    }

    pub fn is_vram_in_range(&self, vram: Vram) -> bool {
        vram >= self.vram_start && vram < self.vram_end
    }

    /// Idempotent: returns the existing symbol on a second call at the same
    /// address. Upgrades `sectionType` only when the stored value is
    /// `Unknown` (spec.md §4.1).
    pub fn add_symbol(
        &mut self,
        addr: Vram,
        section: SectionType,
        is_autogenerated: bool,
    ) -> &mut ContextSymbol {
        let category = self.overlay_category.clone();
        let entry = self.symbols.entry(addr).or_insert_with(|| {
            let mut sym = ContextSymbol::new(addr, section, is_autogenerated);
            if let Some(category) = category {
                sym.set_overlay_category(category);
            }
            sym
        });
        entry.upgrade_section_type(section);
        entry
    }

    /// Precedence lattice: `function > jumptablelabel > branchlabel`.
    /// Refuses to downgrade an existing `function`/`jumptablelabel` symbol
    /// down to a `branchlabel`.
    pub fn add_branch_label(&mut self, addr: Vram) -> &mut ContextSymbol {
        let sym = self.add_symbol(addr, SectionType::Text, true);
        let should_set = !matches!(
            sym.sym_type(),
            Some(SymbolType::Function) | Some(SymbolType::JumpTableLabel)
        );
        if should_set {
            sym.set_autodetected_type(SymbolType::BranchLabel);
        }
        self.symbols.get_mut(&addr).unwrap()
    }

    /// `function > jumptable`.
    pub fn add_jump_table(&mut self, addr: Vram) -> &mut ContextSymbol {
        let sym = self.add_symbol(addr, SectionType::Rodata, true);
        if !matches!(sym.sym_type(), Some(SymbolType::Function)) {
            sym.set_autodetected_type(SymbolType::JumpTable);
        }
        self.symbols.get_mut(&addr).unwrap()
    }

    pub fn add_jump_table_label(&mut self, addr: Vram) -> &mut ContextSymbol {
        let sym = self.add_symbol(addr, SectionType::Text, true);
        if !matches!(sym.sym_type(), Some(SymbolType::Function)) {
            sym.set_autodetected_type(SymbolType::JumpTableLabel);
        }
        self.symbols.get_mut(&addr).unwrap()
    }

    pub fn add_function(&mut self, addr: Vram) -> &mut ContextSymbol {
        let sym = self.add_symbol(addr, SectionType::Text, true);
        sym.set_autodetected_type(SymbolType::Function);
        self.symbols.get_mut(&addr).unwrap()
    }

    pub fn get_symbol_exact(&self, addr: Vram) -> Option<&ContextSymbol> {
        self.symbols.get(&addr)
    }
    pub fn get_symbol_exact_mut(&mut self, addr: Vram) -> Option<&mut ContextSymbol> {
        self.symbols.get_mut(&addr)
    }

    /// Exact lookup first; then, if `try_plus_offset`, the greatest symbol
    /// at or before `addr` is returned provided `addr` still falls within
    /// its size (spec.md §4.1). `check_upper_limit = false` lets a caller
    /// that explicitly wants an LHS reference suppress that bound.
    pub fn get_symbol(
        &self,
        addr: Vram,
        try_plus_offset: bool,
        check_upper_limit: bool,
    ) -> Option<&ContextSymbol> {
        if let Some(sym) = self.symbols.get(&addr) {
            return Some(sym);
        }
        if !try_plus_offset {
            return None;
        }

        let (_, candidate) = self.symbols.range(..addr).next_back()?;
        if !check_upper_limit || addr < candidate.address() + candidate.size() {
            Some(candidate)
        } else {
            None
        }
    }

    /// Half-open range scan over the sorted symbol map.
    pub fn get_symbols_range(&self, lo: Vram, hi: Vram) -> impl Iterator<Item = &ContextSymbol> {
        self.symbols.range(lo..hi).map(|(_, sym)| sym)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &ContextSymbol> {
        self.symbols.values()
    }
    pub fn symbols_mut(&mut self) -> impl Iterator<Item = &mut ContextSymbol> {
        self.symbols.values_mut()
    }

    pub fn add_constant(&mut self, value: i64, name: impl Into<String>) {
        let sym = self
            .constants
            .entry(value)
            .or_insert_with(|| ContextSymbol::new(Vram::new(0), SectionType::Unknown, true));
        sym.set_autodetected_type(SymbolType::Constant);
        sym.set_name_if_unset(name);
    }
    pub fn get_constant(&self, value: i64) -> Option<&ContextSymbol> {
        self.constants.get(&value)
    }

    pub fn add_pointer_in_data_reference(&mut self, addr: Vram) -> bool {
        self.new_pointers_in_data.insert(addr)
    }
    pub fn pop_pointer_in_data_reference(&mut self, addr: Vram) -> bool {
        self.new_pointers_in_data.remove(addr)
    }
    /// Destructively consumes every pending candidate pointer in
    /// `[lo, hi)`, so a later section analyzer never re-promotes an
    /// already-handled pointee.
    pub fn pop_pointer_in_data_references_range(&mut self, lo: Vram, hi: Vram) -> Vec<Vram> {
        self.new_pointers_in_data.pop_range(lo, hi)
    }
    pub fn pending_pointers_in_data(&self) -> impl Iterator<Item = &Vram> {
        self.new_pointers_in_data.iter()
    }

    pub fn add_lo_patch(&mut self, lo_instr_addr: Vram, target: Vram) {
        self.lo_patches.insert(lo_instr_addr, target);
    }
    pub fn lo_patch(&self, lo_instr_addr: Vram) -> Option<Vram> {
        self.lo_patches.get(&lo_instr_addr).copied()
    }

    pub fn allow_reference_with_addend(&mut self, addr: Vram) {
        self.data_symbols_with_references_with_addends.insert(addr);
    }
    pub fn reference_with_addend_allowed(&self, addr: Vram) -> bool {
        self.data_symbols_with_references_with_addends.contains(&addr)
    }

    pub fn allow_reference_constant(&mut self, addr: Vram) {
        self.data_referencing_constants.insert(addr);
    }
    pub fn reference_constant_allowed(&self, addr: Vram) -> bool {
        self.data_referencing_constants.contains(&addr)
    }
}
