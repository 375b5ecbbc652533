/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::{
    collections::{btree_map::BTreeMap, btree_set::BTreeSet},
    string::String,
};
use core::hash::{Hash, Hasher};

use rabbitizer::{access_type::AccessType, Vram};

use crate::addresses::{Rom, Size};

use super::{SectionType, SymbolType};

/// Central record of the symbol table. Equality and hashing use only
/// `(address, vrom_address)`, per spec.md §3.2's hash contract, so two
/// `ContextSymbol`s at the same vram but different overlays (or vice versa)
/// never collide in a `HashSet`/`HashMap`.
#[derive(Debug, Clone)]
pub struct ContextSymbol {
    address: Vram,
    vrom_address: Option<Rom>,
    section_type: SectionType,

    name: Option<String>,

    user_declared_type: Option<SymbolType>,
    autodetected_type: Option<SymbolType>,

    access_type: Option<AccessType>,
    unsigned_access_type: bool,

    user_declared_size: Option<Size>,
    autodetected_size: Option<Size>,

    is_defined: bool,
    is_user_declared: bool,
    is_autogenerated: bool,
    is_maybe_string: bool,
    failed_string_decoding: bool,
    is_maybe_pascal_string: bool,
    is_auto_created_pad: bool,
    is_elf_notype: bool,
    is_got: bool,
    is_got_global: bool,
    is_got_local: bool,
    accessed_as_gp_rel: bool,
    is_mips1_double: bool,
    is_autocreated_sym_from_other_sized_sym: bool,

    reference_counter: u32,
    reference_functions: BTreeSet<Vram>,
    reference_symbols: BTreeSet<Vram>,

    parent_function: Option<Vram>,
    /// Address-ordered children; only populated for function symbols.
    branch_labels: BTreeMap<Vram, ()>,
    jump_tables: BTreeMap<Vram, ()>,

    overlay_category: Option<String>,

    force_migration: bool,
    force_not_migration: bool,
    allowed_to_reference_addends: bool,

    visibility: Option<String>,
}

impl ContextSymbol {
    #[must_use]
    pub fn new(address: Vram, section_type: SectionType, is_autogenerated: bool) -> Self {
        Self {
            address,
            vrom_address: None,
            section_type,
            name: None,
            user_declared_type: None,
            autodetected_type: None,
            access_type: None,
            unsigned_access_type: false,
            user_declared_size: None,
            autodetected_size: None,
            is_defined: false,
            is_user_declared: !is_autogenerated,
            is_autogenerated,
            is_maybe_string: false,
            failed_string_decoding: false,
            is_maybe_pascal_string: false,
            is_auto_created_pad: false,
            is_elf_notype: false,
            is_got: false,
            is_got_global: false,
            is_got_local: false,
            accessed_as_gp_rel: false,
            is_mips1_double: false,
            is_autocreated_sym_from_other_sized_sym: false,
            reference_counter: 0,
            reference_functions: BTreeSet::new(),
            reference_symbols: BTreeSet::new(),
            parent_function: None,
            branch_labels: BTreeMap::new(),
            jump_tables: BTreeMap::new(),
            overlay_category: None,
            force_migration: false,
            force_not_migration: false,
            allowed_to_reference_addends: true,
            visibility: None,
        }
    }

    pub const fn address(&self) -> Vram {
        self.address
    }

    pub const fn vrom_address(&self) -> Option<Rom> {
        self.vrom_address
    }
    pub fn set_vrom_address(&mut self, rom: Rom) {
        self.vrom_address = Some(rom);
    }

    pub const fn section_type(&self) -> SectionType {
        self.section_type
    }
    /// Upgrades `sectionType` only when the stored value is `Unknown`,
    /// per spec.md §4.1's `addSymbol` contract.
    pub(crate) fn upgrade_section_type(&mut self, section_type: SectionType) {
        if matches!(self.section_type, SectionType::Unknown) {
            self.section_type = section_type;
        }
    }
    pub(crate) fn force_section_type(&mut self, section_type: SectionType) {
        self.section_type = section_type;
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    /// Sets the name, but only the first time (spec.md's `setNameIfUnset`
    /// contract — later revisions of the original source fixed a bug where
    /// this accidentally assigned to the *type* field instead; here it is
    /// unconditionally "name only").
    pub fn set_name_if_unset(&mut self, name: impl Into<String>) {
        if self.name.is_none() {
            self.name = Some(name.into());
        }
    }
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn user_declared_type(&self) -> Option<&SymbolType> {
        self.user_declared_type.as_ref()
    }
    /// The user slot is written at most once, per spec.md §3.3.
    pub fn set_user_declared_type(&mut self, ty: SymbolType) {
        if self.user_declared_type.is_none() {
            self.user_declared_type = Some(ty);
        }
    }

    pub fn autodetected_type(&self) -> Option<&SymbolType> {
        self.autodetected_type.as_ref()
    }
    pub fn set_autodetected_type(&mut self, ty: SymbolType) {
        self.autodetected_type = Some(ty);
    }

    /// Effective type: user wins.
    pub fn sym_type(&self) -> Option<&SymbolType> {
        self.user_declared_type.as_ref().or(self.autodetected_type.as_ref())
    }

    pub const fn access_type(&self) -> Option<(AccessType, bool)> {
        match self.access_type {
            Some(access) => Some((access, self.unsigned_access_type)),
            None => None,
        }
    }
    pub fn set_access_type_if_unset(&mut self, access_type: AccessType, unsigned: bool) {
        if self.access_type.is_none() {
            self.access_type = Some(access_type);
            self.unsigned_access_type = unsigned;
            if self.autodetected_type.is_none() {
                if let Some(ty) = super::symbol_type_from_access(access_type) {
                    self.autodetected_type = Some(ty);
                }
            }
        }
    }

    pub const fn user_declared_size(&self) -> Option<Size> {
        self.user_declared_size
    }
    /// Set at most once. Per spec.md §3.2, once a user size is set the
    /// engine must never autogenerate conflicting size data; the
    /// autodetected slot may still be populated for diagnostics (so we
    /// don't gate `set_autodetected_size` on this).
    pub fn set_user_declared_size(&mut self, size: Size) {
        if self.user_declared_size.is_none() {
            self.user_declared_size = Some(size);
        }
    }

    pub const fn autodetected_size(&self) -> Option<Size> {
        self.autodetected_size
    }
    pub fn set_autodetected_size(&mut self, size: Size) {
        self.autodetected_size = Some(size);
    }

    pub const fn is_defined(&self) -> bool {
        self.is_defined
    }
    pub fn set_defined(&mut self) {
        self.is_defined = true;
    }

    pub const fn is_user_declared(&self) -> bool {
        self.is_user_declared
    }
    pub const fn is_autogenerated(&self) -> bool {
        self.is_autogenerated
    }

    pub const fn is_maybe_string(&self) -> bool {
        self.is_maybe_string
    }
    pub fn set_maybe_string(&mut self, value: bool) {
        self.is_maybe_string = value;
    }
    pub const fn failed_string_decoding(&self) -> bool {
        self.failed_string_decoding
    }
    pub fn set_failed_string_decoding(&mut self, value: bool) {
        self.failed_string_decoding = value;
    }
    pub const fn is_maybe_pascal_string(&self) -> bool {
        self.is_maybe_pascal_string
    }
    pub fn set_maybe_pascal_string(&mut self, value: bool) {
        self.is_maybe_pascal_string = value;
    }

    pub const fn is_auto_created_pad(&self) -> bool {
        self.is_auto_created_pad
    }
    pub fn set_auto_created_pad(&mut self, value: bool) {
        self.is_auto_created_pad = value;
    }

    pub const fn is_elf_notype(&self) -> bool {
        self.is_elf_notype
    }
    pub const fn is_got(&self) -> bool {
        self.is_got
    }
    pub const fn is_got_global(&self) -> bool {
        self.is_got_global
    }
    pub const fn is_got_local(&self) -> bool {
        self.is_got_local
    }
    pub const fn accessed_as_gp_rel(&self) -> bool {
        self.accessed_as_gp_rel
    }
    pub fn set_accessed_as_gp_rel(&mut self, value: bool) {
        self.accessed_as_gp_rel = value;
    }
    pub const fn is_mips1_double(&self) -> bool {
        self.is_mips1_double
    }
    pub const fn is_autocreated_sym_from_other_sized_sym(&self) -> bool {
        self.is_autocreated_sym_from_other_sized_sym
    }
    pub fn set_autocreated_sym_from_other_sized_sym(&mut self, value: bool) {
        self.is_autocreated_sym_from_other_sized_sym = value;
    }

    pub const fn reference_counter(&self) -> u32 {
        self.reference_counter
    }
    pub fn add_reference_function(&mut self, func_vram: Vram) {
        self.reference_counter += 1;
        self.reference_functions.insert(func_vram);
    }
    pub fn add_reference_symbol(&mut self, sym_vram: Vram) {
        self.reference_counter += 1;
        self.reference_symbols.insert(sym_vram);
    }
    pub fn reference_functions(&self) -> impl Iterator<Item = &Vram> {
        self.reference_functions.iter()
    }
    pub fn reference_symbols(&self) -> impl Iterator<Item = &Vram> {
        self.reference_symbols.iter()
    }

    pub const fn parent_function(&self) -> Option<Vram> {
        self.parent_function
    }
    pub(crate) fn set_parent_function(&mut self, parent: Vram) {
        self.parent_function = Some(parent);
    }

    pub(crate) fn register_branch_label(&mut self, addr: Vram) {
        self.branch_labels.insert(addr, ());
    }
    pub(crate) fn register_jump_table(&mut self, addr: Vram) {
        self.jump_tables.insert(addr, ());
    }
    pub fn branch_labels(&self) -> impl Iterator<Item = &Vram> {
        self.branch_labels.keys()
    }
    pub fn jump_tables(&self) -> impl Iterator<Item = &Vram> {
        self.jump_tables.keys()
    }
    /// 0-based position of `addr` within this (function) symbol's ordered
    /// branch labels, used by sequential label naming.
    pub fn branch_label_index(&self, addr: Vram) -> Option<usize> {
        self.branch_labels.keys().position(|&a| a == addr)
    }
    pub fn jump_table_index(&self, addr: Vram) -> Option<usize> {
        self.jump_tables.keys().position(|&a| a == addr)
    }

    pub fn overlay_category(&self) -> Option<&str> {
        self.overlay_category.as_deref()
    }
    pub(crate) fn set_overlay_category(&mut self, category: impl Into<String>) {
        self.overlay_category = Some(category.into());
    }

    pub const fn force_migration(&self) -> bool {
        self.force_migration
    }
    pub const fn force_not_migration(&self) -> bool {
        self.force_not_migration
    }
    pub const fn allowed_to_reference_addends(&self) -> bool {
        self.allowed_to_reference_addends
    }

    pub fn visibility(&self) -> Option<&str> {
        self.visibility.as_deref()
    }
    pub fn set_visibility(&mut self, visibility: impl Into<String>) {
        self.visibility = Some(visibility.into());
    }

    /// `getSize()` precedence from spec.md §4.2: user-declared size ->
    /// autodetected size -> size implied by `userDeclaredType` -> size
    /// implied by `accessType` -> alignment-based fallback.
    pub fn size(&self) -> Size {
        if let Some(size) = self.user_declared_size {
            return size;
        }
        if let Some(size) = self.autodetected_size {
            return size;
        }
        if let Some(ty) = &self.user_declared_type {
            if let Some(size) = ty.implied_size() {
                return size;
            }
        }
        if let Some((access, _)) = self.access_type {
            if let Some(ty) = super::symbol_type_from_access(access) {
                if let Some(size) = ty.implied_size() {
                    return size;
                }
            }
        }
        let vram = self.address.inner();
        if vram % 4 == 0 {
            Size::new(4)
        } else if vram % 2 == 0 {
            Size::new(2)
        } else {
            Size::new(1)
        }
    }

    /// Whether a retroactive function-boundary backwards-branch is allowed
    /// to trust this symbol as a genuine function start rather than delete
    /// it, per spec.md §4.3.1: autogenerated-of-type-function gated by
    /// `trust_jal_functions`, or user-declared-and-non-branchlabel gated by
    /// `trust_user_functions`.
    pub fn is_trustable_function(
        &self,
        trust_user_functions: bool,
        trust_jal_functions: bool,
    ) -> bool {
        if !matches!(self.sym_type(), Some(SymbolType::Function)) {
            return false;
        }
        if self.is_autogenerated && trust_jal_functions {
            return true;
        }
        if self.is_user_declared
            && !matches!(self.user_declared_type, Some(SymbolType::BranchLabel))
            && trust_user_functions
        {
            return true;
        }
        false
    }

    pub fn is_float(&self) -> bool {
        self.address.inner() % 4 == 0 && self.sym_type().is_some_and(SymbolType::is_float)
    }
    pub fn is_double(&self) -> bool {
        self.address.inner() % 8 == 0 && self.sym_type().is_some_and(SymbolType::is_double)
    }
    pub fn is_string(&self) -> bool {
        self.sym_type().is_some_and(SymbolType::is_string)
    }
    pub fn is_pascal_string(&self) -> bool {
        self.sym_type().is_some_and(SymbolType::is_pascal_string)
    }
    pub fn is_byte(&self) -> bool {
        self.sym_type().is_some_and(SymbolType::is_byte)
    }
    pub fn is_short(&self) -> bool {
        self.sym_type().is_some_and(SymbolType::is_short)
    }

    /// CSV header matching the field order of [`Self::to_csv_row`].
    pub fn csv_header() -> &'static str {
        "address,vrom,section_type,name,type,size,is_defined,is_user_declared,is_autogenerated,reference_counter"
    }

    /// One CSV row for this symbol (spec.md §6.3's persisted state). The
    /// name used here is whatever `name` is currently set to; callers that
    /// need the synthesized default name should call the naming module's
    /// `default_name` first and `set_name_if_unset` the result.
    pub fn to_csv_row(&self) -> String {
        use core::fmt::Write;

        let mut row = String::new();
        let _ = write!(row, "0x{:08X},", self.address.inner());
        match self.vrom_address {
            Some(rom) => {
                let _ = write!(row, "0x{:06X},", rom.inner());
            }
            None => row.push(','),
        }
        let _ = write!(row, "{:?},", self.section_type);
        let _ = write!(row, "{},", self.name.as_deref().unwrap_or(""));
        match self.sym_type() {
            Some(SymbolType::Named(n)) => {
                let _ = write!(row, "{n},");
            }
            Some(other) => {
                let _ = write!(row, "{other:?},");
            }
            None => row.push(','),
        }
        let _ = write!(row, "{},", self.size().inner());
        let _ = write!(
            row,
            "{},{},{},{}",
            self.is_defined, self.is_user_declared, self.is_autogenerated, self.reference_counter
        );
        row
    }
}

impl PartialEq for ContextSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.vrom_address == other.vrom_address
    }
}
impl Eq for ContextSymbol {}

impl Hash for ContextSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
        self.vrom_address.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rabbitizer::Vram;

    #[test]
    fn user_size_wins_over_everything() {
        let mut sym = ContextSymbol::new(Vram::new(0x8000_0000), SectionType::Data, true);
        sym.set_autodetected_size(Size::new(8));
        sym.set_user_declared_size(Size::new(16));
        assert_eq!(sym.size().inner(), 16);
    }

    #[test]
    fn user_declared_size_is_sticky() {
        let mut sym = ContextSymbol::new(Vram::new(0x8000_0000), SectionType::Data, true);
        sym.set_user_declared_size(Size::new(16));
        sym.set_user_declared_size(Size::new(4));
        assert_eq!(sym.user_declared_size().unwrap().inner(), 16);
    }

    #[test]
    fn alignment_fallback_size() {
        let sym = ContextSymbol::new(Vram::new(0x8000_0001), SectionType::Data, true);
        assert_eq!(sym.size().inner(), 1);
        let sym = ContextSymbol::new(Vram::new(0x8000_0002), SectionType::Data, true);
        assert_eq!(sym.size().inner(), 2);
        let sym = ContextSymbol::new(Vram::new(0x8000_0004), SectionType::Data, true);
        assert_eq!(sym.size().inner(), 4);
    }

    #[test]
    fn equality_uses_address_and_vrom_only() {
        let mut a = ContextSymbol::new(Vram::new(0x8000_0000), SectionType::Data, true);
        let mut b = ContextSymbol::new(Vram::new(0x8000_0000), SectionType::Data, false);
        a.set_name("a");
        b.set_name("b");
        assert_eq!(a, b);
    }

    #[test]
    fn name_is_set_only_once() {
        let mut sym = ContextSymbol::new(Vram::new(0x8000_0000), SectionType::Data, true);
        sym.set_name_if_unset("first");
        sym.set_name_if_unset("second");
        assert_eq!(sym.name(), Some("first"));
    }
}
