/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use rabbitizer::Vram;

use super::{AddressRange, Rom};

/// Pairs a section's rom range with its vram range; they always share the
/// same `Size`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct RomVramRange {
    rom: AddressRange<Rom>,
    vram: AddressRange<Vram>,
}

impl RomVramRange {
    #[must_use]
    pub const fn new(rom: AddressRange<Rom>, vram: AddressRange<Vram>) -> Self {
        Self { rom, vram }
    }

    pub const fn rom(&self) -> &AddressRange<Rom> {
        &self.rom
    }

    pub const fn vram(&self) -> &AddressRange<Vram> {
        &self.vram
    }
}
