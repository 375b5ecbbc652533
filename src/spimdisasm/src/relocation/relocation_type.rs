/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

/// MIPS ELF relocation kinds the emitter knows how to render symbolically.
/// Decoding the relocation *table* formats (ELF `.rel`, Zelda-style overlay
/// relocs) is explicitly out of scope for this crate; callers hand in an
/// already-decoded `RelocationInfo` per word.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
#[allow(non_camel_case_types)]
pub enum RelocationType {
    R_MIPS_NONE,
    R_MIPS_16,
    R_MIPS_32,
    R_MIPS_26,
    R_MIPS_HI16,
    R_MIPS_LO16,
    R_MIPS_GPREL16,
    R_MIPS_GOT16,
    R_MIPS_PC16,
}

impl RelocationType {
    /// Relocations that only make sense paired with a previously-seen
    /// `R_MIPS_HI16`.
    pub const fn is_lo(&self) -> bool {
        matches!(self, RelocationType::R_MIPS_LO16)
    }

    pub const fn is_hi(&self) -> bool {
        matches!(self, RelocationType::R_MIPS_HI16)
    }
}
