/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use rabbitizer::{InstructionFlags, IsaVersion};

use super::{Abi, ArchLevel, Compiler, Endian, StringGuesserLevel};

/// Naming policy knobs, grouped out of [`GlobalConfig`] because they're
/// frequently overridden together by callers that want legacy-compatible
/// symbol names.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct NamingConfig {
    pub autogenerated_names_based_on_section_type: bool,
    pub autogenerated_names_based_on_data_type: bool,
    pub sequential_label_names: bool,
    pub legacy_sym_addr_zero_padding: bool,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            autogenerated_names_based_on_section_type: true,
            autogenerated_names_based_on_data_type: false,
            sequential_label_names: false,
            legacy_sym_addr_zero_padding: true,
        }
    }
}

/// Process-wide configuration threaded by reference into every analyzer and
/// emitter call. Construction is explicit (`GlobalConfig::new`); there is no
/// global/static instance — callers own one value and pass it around, as
/// opposed to a singleton, so multiple contexts with different settings can
/// coexist in the same process.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct GlobalConfig {
    pub compiler: Compiler,
    pub endian: Endian,
    pub arch_level: ArchLevel,
    pub abi: Abi,

    pub pic: bool,
    pub gp_value: Option<u32>,
    pub emit_cpload: bool,

    pub rodata_string_guesser_level: StringGuesserLevel,
    pub data_string_guesser_level: StringGuesserLevel,
    pub pascal_rodata_string_guesser_level: StringGuesserLevel,
    pub pascal_data_string_guesser_level: StringGuesserLevel,

    pub trust_user_functions: bool,
    pub trust_jal_functions: bool,
    pub detect_redundant_function_end: bool,

    pub symbol_finder_filter_low_addresses: bool,
    pub symbol_finder_filter_low_addresses_threshold: u32,
    pub symbol_finder_filter_high_addresses: bool,
    pub symbol_finder_filter_high_addresses_threshold: u32,

    pub naming: NamingConfig,

    pub use_dot_byte: bool,
    pub use_dot_short: bool,

    pub remove_pointers: bool,
    pub ignore_branches: bool,

    pub panic_range_check: bool,
    pub allow_unksegment: bool,

    pub emit_size_directive: bool,

    /// Whether a bare `j target` should be treated as an unconditional
    /// branch rather than a potential tail-call when deciding function
    /// boundaries (spec.md §8 scenario 5,
    /// `toolchainTweaks_treatJAsUnconditionalBranch`).
    pub treat_j_as_unconditional_branch: bool,
}

impl GlobalConfig {
    #[must_use]
    pub fn new(compiler: Compiler, endian: Endian) -> Self {
        Self {
            compiler,
            endian,
            arch_level: ArchLevel::default(),
            abi: Abi::default(),
            pic: false,
            gp_value: None,
            emit_cpload: false,
            rodata_string_guesser_level: StringGuesserLevel::default(),
            data_string_guesser_level: StringGuesserLevel::Off,
            pascal_rodata_string_guesser_level: StringGuesserLevel::Off,
            pascal_data_string_guesser_level: StringGuesserLevel::Off,
            trust_user_functions: true,
            trust_jal_functions: true,
            detect_redundant_function_end: false,
            symbol_finder_filter_low_addresses: true,
            symbol_finder_filter_low_addresses_threshold: 0x4000_0000,
            symbol_finder_filter_high_addresses: false,
            symbol_finder_filter_high_addresses_threshold: 0xC000_0000,
            naming: NamingConfig::default(),
            use_dot_byte: true,
            use_dot_short: true,
            remove_pointers: false,
            ignore_branches: false,
            panic_range_check: false,
            allow_unksegment: true,
            emit_size_directive: true,
            treat_j_as_unconditional_branch: false,
        }
    }

    /// The `rabbitizer` decoder flags implied by this config, mirroring how
    /// the teacher builds `InstructionFlags` from CLI args in `bin.rs`.
    pub fn instruction_flags(&self) -> InstructionFlags {
        let isa_version = match self.arch_level {
            ArchLevel::Mips1 => IsaVersion::MIPS_I,
            ArchLevel::Mips2 => IsaVersion::MIPS_II,
            ArchLevel::Mips3 => IsaVersion::MIPS_III,
            ArchLevel::Mips4 => IsaVersion::MIPS_IV,
            ArchLevel::Mips32 | ArchLevel::Mips32R2 => IsaVersion::MIPS_III,
            ArchLevel::Mips64 | ArchLevel::Mips64R2 => IsaVersion::MIPS_IV,
        };
        InstructionFlags::new(isa_version).with_j_as_branch(self.treat_j_as_unconditional_branch)
    }

    /// Whether `compiler` places float/double/jump-table rodata in a later
    /// subsection ("late rodata").
    pub fn has_late_rodata(&self) -> bool {
        self.compiler.has_late_rodata()
    }

    /// Whether a 16-bit address plausibly lies in an address range this
    /// config considers a valid pointer target, per the low/high filtering
    /// knobs.
    pub fn address_passes_filter(&self, vram: u32) -> bool {
        if self.symbol_finder_filter_low_addresses
            && vram < self.symbol_finder_filter_low_addresses_threshold
        {
            return false;
        }
        if self.symbol_finder_filter_high_addresses
            && vram >= self.symbol_finder_filter_high_addresses_threshold
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_filter_respects_thresholds() {
        let mut cfg = GlobalConfig::new(Compiler::IDO, Endian::Big);
        cfg.symbol_finder_filter_low_addresses = true;
        cfg.symbol_finder_filter_low_addresses_threshold = 0x8000_0000;
        assert!(!cfg.address_passes_filter(0x1000));
        assert!(cfg.address_passes_filter(0x8000_1000));
    }
}
