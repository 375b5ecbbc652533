/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::{format, string::String};

use crate::config::GlobalConfig;

use super::{ContextSymbol, SectionType, SymbolType};

/// `getName()`'s quoting rule: a name containing any of `@ < \ - +` gets
/// wrapped in double quotes so it survives an assembler lexer unscathed.
pub fn needs_quoting(name: &str) -> bool {
    name.chars().any(|c| "@<\\-+".contains(c))
}

/// Renders `name`, quoting it if [`needs_quoting`] says so.
pub fn display_name(name: &str) -> String {
    if needs_quoting(name) {
        format!("\"{name}\"")
    } else {
        String::from(name)
    }
}

fn section_prefix(sym: &ContextSymbol, cfg: &GlobalConfig) -> &'static str {
    match sym.sym_type() {
        Some(SymbolType::Function)
        | Some(SymbolType::BranchLabel)
        | Some(SymbolType::JumpTable)
        | Some(SymbolType::JumpTableLabel)
        | Some(SymbolType::GccExceptTable)
        | Some(SymbolType::GccExceptTableLabel) => "",
        _ => {
            if cfg.naming.autogenerated_names_based_on_section_type {
                sym.section_type().default_prefix()
            } else {
                "D_"
            }
        }
    }
}

fn type_prefix(sym: &ContextSymbol, cfg: &GlobalConfig) -> &'static str {
    match sym.sym_type() {
        Some(SymbolType::Function) => "func_",
        Some(SymbolType::BranchLabel) => ".L",
        Some(SymbolType::JumpTable) => "jtbl_",
        Some(SymbolType::JumpTableLabel) => ".L",
        Some(SymbolType::GccExceptTable) => "ehtbl_",
        Some(SymbolType::GccExceptTableLabel) => "$LEH_",
        _ => {
            if cfg.naming.autogenerated_names_based_on_data_type {
                if sym.is_float() {
                    "FLT_"
                } else if sym.is_double() {
                    "DBL_"
                } else if sym.is_pascal_string() {
                    "PSTR_"
                } else if sym.is_string() {
                    "STR_"
                } else {
                    ""
                }
            } else {
                ""
            }
        }
    }
}

fn address_suffix(sym: &ContextSymbol, cfg: &GlobalConfig, custom_suffix: Option<&str>) -> String {
    let mut suffix = String::new();
    if let Some(category) = sym.overlay_category() {
        suffix.push('_');
        suffix.push_str(category);
    }
    if !cfg.naming.legacy_sym_addr_zero_padding {
        if let Some(rom) = sym.vrom_address() {
            suffix.push_str(&format!("_{:06X}", rom.inner()));
        }
    }
    if let Some(custom) = custom_suffix {
        suffix.push_str(custom);
    }
    suffix
}

/// Unique-identifier component of the default name, per spec.md §4.2.
fn unique_identifier(
    sym: &ContextSymbol,
    parent: Option<&ContextSymbol>,
    cfg: &GlobalConfig,
    custom_suffix: Option<&str>,
) -> String {
    if cfg.naming.sequential_label_names {
        if let (Some(parent), Some(parent_name)) = (parent, parent.and_then(ContextSymbol::name)) {
            let index = parent
                .branch_label_index(sym.address())
                .or_else(|| parent.jump_table_index(sym.address()));
            if let Some(index) = index {
                return format!("{parent_name}_{}", index + 1);
            }
        }
    }

    format!(
        "{:08X}{}",
        sym.address().inner(),
        address_suffix(sym, cfg, custom_suffix)
    )
}

/// `getDefaultName()`: `<sectionPrefix><typePrefix><uniqueIdentifier>`.
pub fn default_name(
    sym: &ContextSymbol,
    parent: Option<&ContextSymbol>,
    cfg: &GlobalConfig,
    custom_suffix: Option<&str>,
) -> String {
    format!(
        "{}{}{}",
        section_prefix(sym, cfg),
        type_prefix(sym, cfg),
        unique_identifier(sym, parent, cfg, custom_suffix)
    )
}

/// `getName()`: the user/default name, quoted if needed.
pub fn get_name(
    sym: &ContextSymbol,
    parent: Option<&ContextSymbol>,
    cfg: &GlobalConfig,
    custom_suffix: Option<&str>,
) -> String {
    let raw = match sym.name() {
        Some(name) => String::from(name),
        None => default_name(sym, parent, cfg, custom_suffix),
    };
    display_name(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Compiler, Endian};
    use rabbitizer::Vram;

    #[test]
    fn quoting_triggers_on_special_chars() {
        assert!(needs_quoting("foo@bar"));
        assert!(needs_quoting("foo-bar"));
        assert!(!needs_quoting("foo_bar"));
    }

    #[test]
    fn default_name_for_plain_data_symbol() {
        let cfg = GlobalConfig::new(Compiler::IDO, Endian::Big);
        let sym = ContextSymbol::new(Vram::new(0x8001_2340), SectionType::Data, true);
        assert_eq!(default_name(&sym, None, &cfg, None), "D_80012340");
    }

    #[test]
    fn sequential_label_names_use_parent_index() {
        let mut cfg = GlobalConfig::new(Compiler::IDO, Endian::Big);
        cfg.naming.sequential_label_names = true;

        let mut parent = ContextSymbol::new(Vram::new(0x8000_0100), SectionType::Text, true);
        parent.set_name("func_80000100");
        parent.set_user_declared_type(SymbolType::Function);
        parent.register_branch_label(Vram::new(0x8000_0110));
        parent.register_branch_label(Vram::new(0x8000_0120));

        let mut label_a = ContextSymbol::new(Vram::new(0x8000_0110), SectionType::Text, true);
        label_a.set_user_declared_type(SymbolType::BranchLabel);
        let mut label_b = ContextSymbol::new(Vram::new(0x8000_0120), SectionType::Text, true);
        label_b.set_user_declared_type(SymbolType::BranchLabel);

        assert_eq!(
            default_name(&label_a, Some(&parent), &cfg, None),
            ".Lfunc_80000100_1"
        );
        assert_eq!(
            default_name(&label_b, Some(&parent), &cfg, None),
            ".Lfunc_80000100_2"
        );
    }
}
