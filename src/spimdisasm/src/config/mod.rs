/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

mod abi;
mod arch_level;
mod compiler;
mod endian;
mod global_config;
mod string_guesser_level;

pub use abi::Abi;
pub use arch_level::ArchLevel;
pub use compiler::Compiler;
pub use endian::Endian;
pub use global_config::GlobalConfig;
pub use string_guesser_level::StringGuesserLevel;

#[cfg(feature = "std")]
mod env;
#[cfg(feature = "std")]
pub use env::apply_env_overrides;
