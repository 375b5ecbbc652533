/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

//! Section analyzers (spec.md §4.3-§4.5). Each owns a slice of a
//! [`crate::context::Segment`]'s address range and mutates the shared
//! [`crate::context::Segment`] as it discovers symbols; invocation order is
//! `text -> rodata -> data -> bss` (spec.md §5).

mod bss;
mod data;
mod text;

pub use bss::BssSection;
pub use data::DataSection;
pub use text::TextSection;
