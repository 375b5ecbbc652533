/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

/// How aggressively a data/rodata word run is guessed to be a string.
///
/// - `Off`: completely disable the guessing feature.
/// - `UniqueNonEmpty`: only guess when the candidate is referenced exactly
///   once and the decoded string is non-empty.
/// - `AllowDuplicates`: no longer require a single reference.
/// - `AllowEmpty`: additionally allow empty strings.
/// - `OverrideAutodetected`: a successful guess overrides any autodetected
///   (non-user) type already on the symbol.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum StringGuesserLevel {
    Off,
    UniqueNonEmpty,
    AllowDuplicates,
    AllowEmpty,
    OverrideAutodetected,
}

impl StringGuesserLevel {
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(StringGuesserLevel::Off),
            1 => Some(StringGuesserLevel::UniqueNonEmpty),
            2 => Some(StringGuesserLevel::AllowDuplicates),
            3 => Some(StringGuesserLevel::AllowEmpty),
            4 => Some(StringGuesserLevel::OverrideAutodetected),
            _ => None,
        }
    }
}

impl Default for StringGuesserLevel {
    fn default() -> Self {
        StringGuesserLevel::AllowDuplicates
    }
}
