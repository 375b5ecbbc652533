/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

//! Cross-cutting analysis helpers shared by the section analyzers in
//! [`crate::sections`]: HI/LO pointer reconstruction, string guessing, and
//! the non-fatal warning channel (spec.md §7).

mod register_tracker;
mod string_guesser;
mod warnings;

pub use register_tracker::{RegisterTracker, ResolvedPointer};
pub use string_guesser::{accepts as string_guess_accepted, decode_ascii, decode_pascal, DecodedString};
pub use warnings::AnalysisWarning;
