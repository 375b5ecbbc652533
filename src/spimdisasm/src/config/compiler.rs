/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

/// Toolchain that produced the binary under analysis. Gates late-rodata
/// handling, redundant function-end detection and a handful of alignment
/// quirks.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Compiler {
    IDO,
    GCC,
    SN64,
    PSYQ,
    EGCS,
    MWCC,
    EEGCC,
}

impl Compiler {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "IDO" => Some(Compiler::IDO),
            "GCC" => Some(Compiler::GCC),
            "SN64" => Some(Compiler::SN64),
            "PSYQ" => Some(Compiler::PSYQ),
            "EGCS" => Some(Compiler::EGCS),
            "MWCC" => Some(Compiler::MWCC),
            "EEGCC" => Some(Compiler::EEGCC),
            _ => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Compiler::IDO => "IDO",
            Compiler::GCC => "GCC",
            Compiler::SN64 => "SN64",
            Compiler::PSYQ => "PSYQ",
            Compiler::EGCS => "EGCS",
            Compiler::MWCC => "MWCC",
            Compiler::EEGCC => "EEGCC",
        }
    }

    /// Whether this compiler places late-rodata (floats, doubles, jump
    /// tables) in a subsection emitted after the rest of `.rodata`.
    pub(crate) const fn has_late_rodata(&self) -> bool {
        matches!(self, Compiler::IDO)
    }

    /// Only IDO is known to emit the `jr $ra; nop; jr $ra; nop` idiom that
    /// `DETECT_REDUNDANT_FUNCTION_END` merges back together.
    pub(crate) const fn supports_redundant_function_end(&self) -> bool {
        matches!(self, Compiler::IDO)
    }

    /// Whether several `%lo` references may share one preceding `%hi`
    /// without the pairing being cleared after the first use. IDO pairs
    /// exactly one `%lo` per `%hi`; other compilers commonly reuse the
    /// upper half across several loads/stores off the same base register.
    pub const fn pair_multiple_hi_to_same_low(&self) -> bool {
        !matches!(self, Compiler::IDO)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Compiler::IDO
    }
}
