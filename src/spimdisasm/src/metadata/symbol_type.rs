/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use rabbitizer::access_type::AccessType;

use crate::addresses::Size;

/// The type lattice: either one of a small closed set of "special" tags the
/// disassembler itself assigns meaning to, or a free-form user type name
/// (`u32`, `f32`, `char*`, `Vec3f`, ...).
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum SymbolType {
    Function,
    BranchLabel,
    JumpTable,
    JumpTableLabel,
    HardwareReg,
    Constant,
    GccExceptTable,
    GccExceptTableLabel,

    Named(alloc::string::String),
}

impl SymbolType {
    pub fn is_special(&self) -> bool {
        !matches!(self, SymbolType::Named(_))
    }

    /// `parentFunction != nil` iff the symbol's special type is one of
    /// these three (spec.md §3.2).
    pub fn requires_parent_function(&self) -> bool {
        matches!(
            self,
            SymbolType::BranchLabel | SymbolType::JumpTableLabel | SymbolType::JumpTable
        )
    }

    pub fn named(name: impl Into<alloc::string::String>) -> Self {
        SymbolType::Named(name.into())
    }

    /// Size implied by a *named* type through the small closed access-kind
    /// table in spec.md §4.2. Special tags have no implied size here (the
    /// function/label/jumptable symbols get their size from their own
    /// logic elsewhere).
    pub fn implied_size(&self) -> Option<Size> {
        let name = match self {
            SymbolType::Named(name) => name.as_str(),
            _ => return None,
        };
        let bytes = match name {
            "s8" | "u8" | "byte" => 1,
            "s16" | "u16" | "short" => 2,
            "u32" | "s32" | "word" => 4,
            "s64" | "u64" | "dword" => 8,
            "f32" | "Vec3f" => 4,
            "f64" => 8,
            _ => return None,
        };
        Some(Size::new(bytes))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, SymbolType::Named(n) if n == "f32" || n == "Vec3f")
    }

    pub fn is_double(&self) -> bool {
        matches!(self, SymbolType::Named(n) if n == "f64")
    }

    pub fn is_string(&self) -> bool {
        matches!(self, SymbolType::Named(n) if n == "char*")
    }

    pub fn is_pascal_string(&self) -> bool {
        matches!(self, SymbolType::Named(n) if n == "PascalStr")
    }

    pub fn is_byte(&self) -> bool {
        matches!(self, SymbolType::Named(n) if n == "s8" || n == "u8" || n == "byte")
    }

    pub fn is_short(&self) -> bool {
        matches!(self, SymbolType::Named(n) if n == "s16" || n == "u16" || n == "short")
    }
}

/// Translates a memory-access width/kind (from the widest instruction that
/// referenced a symbol) into the [`SymbolType`] it suggests, per spec.md
/// §4.2's access-kind table.
pub fn symbol_type_from_access(access: AccessType) -> Option<SymbolType> {
    match access {
        AccessType::NONE => None,
        AccessType::BYTE => Some(SymbolType::named("u8")),
        AccessType::SHORT => Some(SymbolType::named("u16")),
        AccessType::WORD => Some(SymbolType::named("u32")),
        AccessType::DOUBLEWORD | AccessType::QUADWORD => Some(SymbolType::named("u64")),
        AccessType::FLOAT => Some(SymbolType::named("f32")),
        AccessType::DOUBLEFLOAT => Some(SymbolType::named("f64")),
        // Unaligned left/right access pairs don't pin down a clean type on
        // their own; leave the slot untouched the way the source project does.
        AccessType::WORD_LEFT
        | AccessType::WORD_RIGHT
        | AccessType::DOUBLEWORD_LEFT
        | AccessType::DOUBLEWORD_RIGHT
        | AccessType::UNALIGNED_WORD_LEFT
        | AccessType::UNALIGNED_WORD_RIGHT
        | AccessType::UNALIGNED_DOUBLEWORD_LEFT
        | AccessType::UNALIGNED_DOUBLEWORD_RIGHT => None,
        _ => None,
    }
}
