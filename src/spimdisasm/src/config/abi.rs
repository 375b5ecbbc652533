/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

/// Calling-convention ABI. Mostly affects register-name rendering in the
/// emitter.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Abi {
    O32,
    N32,
    O64,
    N64,
    Eabi32,
    Eabi64,
}

impl Abi {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "o32" => Some(Abi::O32),
            "n32" => Some(Abi::N32),
            "o64" => Some(Abi::O64),
            "n64" => Some(Abi::N64),
            "eabi32" => Some(Abi::Eabi32),
            "eabi64" => Some(Abi::Eabi64),
            _ => None,
        }
    }
}

impl Default for Abi {
    fn default() -> Self {
        Abi::O32
    }
}
