/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::string::String;

use rabbitizer::Vram;

/// Something an analyzer noticed that doesn't stop analysis but is worth
/// surfacing to a caller (spec.md §7: "the core never aborts on data-type
/// mismatch — it degrades emission. All warnings are emitted to a verbose
/// channel."). Collected into a `Vec` rather than printed, since the crate
/// has no logging dependency and must stay usable from `no_std` hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnalysisWarning {
    /// A user-declared symbol's address fell outside its section's vram
    /// range and `panic_range_check` was not set, so it was kept anyway.
    SymbolOutOfSectionRange { address: Vram, section_start: Vram, section_end: Vram },
    /// A BSS symbol's span, derived from the gap to the next symbol, would
    /// have shrunk a user-declared size; the user size was kept instead.
    BssSizeConflict { address: Vram, user_size: u32, computed_span: u32 },
    /// A candidate pointer could not be resolved to any known segment and
    /// `allow_unksegment` was set, so it was dropped without creating a
    /// symbol.
    UnresolvedPointerDroppedUnderUnksegment { address: Vram },
    /// String/Pascal-string decoding failed partway through; emission fell
    /// back to raw `.word`s for this symbol.
    StringDecodingFailed { address: Vram },
    /// A free-form message for anything not worth its own variant; kept
    /// non-exhaustive above so new specific variants can be added later
    /// without a breaking change.
    Other(String),
}

impl core::fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AnalysisWarning::SymbolOutOfSectionRange {
                address,
                section_start,
                section_end,
            } => write!(
                f,
                "symbol at {address:?} lies outside its section's range [{section_start:?}, {section_end:?})"
            ),
            AnalysisWarning::BssSizeConflict {
                address,
                user_size,
                computed_span,
            } => write!(
                f,
                "bss symbol at {address:?} has user size {user_size:#X} but computed span {computed_span:#X}; keeping user size"
            ),
            AnalysisWarning::UnresolvedPointerDroppedUnderUnksegment { address } => {
                write!(f, "pointer candidate at {address:?} has no owning segment")
            }
            AnalysisWarning::StringDecodingFailed { address } => {
                write!(f, "string decoding failed for symbol at {address:?}")
            }
            AnalysisWarning::Other(msg) => write!(f, "{msg}"),
        }
    }
}
