/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use core::{fmt, ops};

use rabbitizer::Vram;

use super::Rom;

/// A byte count. Always non-negative.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Size {
    inner: u32,
}

impl Size {
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self { inner: value }
    }

    pub const fn inner(&self) -> u32 {
        self.inner
    }

    pub(crate) const fn add_rom(&self, rom: &Rom) -> Rom {
        Rom::new(rom.inner() + self.inner)
    }
}

impl ops::Add<Size> for Size {
    type Output = Size;
    fn add(self, rhs: Size) -> Self::Output {
        Size::new(self.inner + rhs.inner)
    }
}

impl ops::Add<Size> for Vram {
    type Output = Vram;
    fn add(self, rhs: Size) -> Self::Output {
        self + rabbitizer::vram::VramOffset::new(rhs.inner as i32)
    }
}

impl fmt::Debug for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Size {{ 0x{:X} }}", self.inner)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.inner)
    }
}
