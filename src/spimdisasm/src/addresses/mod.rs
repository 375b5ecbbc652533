/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

//! Address and size newtypes used throughout the crate.
//!
//! `Vram` (virtual memory address) and `VramOffset` are re-exported directly
//! from `rabbitizer`, since the instruction decoder already speaks in terms
//! of them. `Rom` (position within the original ROM image) and `Size` have
//! no equivalent in the decoder crate and are defined here.

pub use rabbitizer::{vram::VramOffset, Vram};

mod address_range;
mod rom;
mod rom_vram_range;
mod size;

pub use address_range::AddressRange;
pub use rom::Rom;
pub use rom_vram_range::RomVramRange;
pub use size::Size;
