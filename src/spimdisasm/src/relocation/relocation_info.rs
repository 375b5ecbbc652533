/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::string::String;

use super::RelocationType;

/// A single decoded relocation entry for one 32-bit word. The emitter uses
/// this, when present, to override the rendered operand of a `.word`/
/// instruction with the relocation's symbolic form instead of resolving the
/// raw value through the context.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct RelocationInfo {
    reloc_type: RelocationType,
    referenced_sym_name: String,
    addend: i32,
}

impl RelocationInfo {
    #[must_use]
    pub fn new(reloc_type: RelocationType, referenced_sym_name: String, addend: i32) -> Self {
        Self {
            reloc_type,
            referenced_sym_name,
            addend,
        }
    }

    pub const fn reloc_type(&self) -> RelocationType {
        self.reloc_type
    }

    pub fn referenced_sym_name(&self) -> &str {
        &self.referenced_sym_name
    }

    pub const fn addend(&self) -> i32 {
        self.addend
    }

    /// Renders the operand this relocation should produce, e.g.
    /// `%lo(NAME)` or `NAME + 0x4`.
    pub fn display_operand(&self) -> String {
        use core::fmt::Write;

        let mut out = String::new();
        match self.reloc_type {
            RelocationType::R_MIPS_HI16 => {
                let _ = write!(out, "%hi({})", self.referenced_sym_name);
            }
            RelocationType::R_MIPS_LO16 => {
                let _ = write!(out, "%lo({})", self.referenced_sym_name);
            }
            RelocationType::R_MIPS_GOT16 => {
                let _ = write!(out, "%got({})", self.referenced_sym_name);
            }
            _ => {
                let _ = write!(out, "{}", self.referenced_sym_name);
                if self.addend != 0 {
                    let _ = write!(out, " + 0x{:X}", self.addend);
                }
            }
        }
        out
    }
}
