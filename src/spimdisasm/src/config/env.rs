/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

//! Pure function applying `SPIMDISASM_<NAME>` environment-variable overrides
//! on top of a set of defaults, mirroring `GlobalConfig.readEnvVars` from
//! the original Python implementation. Kept behind `feature = "std"` since
//! it needs `std::env`.

use super::{Compiler, Endian, GlobalConfig};

const PREFIX: &str = "SPIMDISASM_";

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_uppercase().as_str() {
        "TRUE" | "1" => Some(true),
        "FALSE" | "0" => Some(false),
        _ => None,
    }
}

/// Applies any `SPIMDISASM_<NAME>` environment variables on top of
/// `defaults`, returning the resulting config. `lookup` is injected so the
/// function stays pure and testable (production callers pass
/// `std::env::var`).
pub fn apply_env_overrides<F>(defaults: GlobalConfig, lookup: F) -> GlobalConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = defaults;

    if let Some(value) = lookup(&format!("{PREFIX}COMPILER")) {
        if let Some(compiler) = Compiler::from_name(&value) {
            cfg.compiler = compiler;
        }
    }
    if let Some(value) = lookup(&format!("{PREFIX}ENDIAN")) {
        if let Some(endian) = Endian::from_name(&value) {
            cfg.endian = endian;
        }
    }
    if let Some(value) = lookup(&format!("{PREFIX}TRUST_USER_FUNCTIONS")) {
        if let Some(b) = parse_bool(&value) {
            cfg.trust_user_functions = b;
        }
    }
    if let Some(value) = lookup(&format!("{PREFIX}TRUST_JAL_FUNCTIONS")) {
        if let Some(b) = parse_bool(&value) {
            cfg.trust_jal_functions = b;
        }
    }
    if let Some(value) = lookup(&format!("{PREFIX}DETECT_REDUNDANT_FUNCTION_END")) {
        if let Some(b) = parse_bool(&value) {
            cfg.detect_redundant_function_end = b;
        }
    }
    if let Some(value) = lookup(&format!("{PREFIX}PANIC_RANGE_CHECK")) {
        if let Some(b) = parse_bool(&value) {
            cfg.panic_range_check = b;
        }
    }
    if let Some(value) = lookup(&format!("{PREFIX}ALLOW_UNKSEGMENT")) {
        if let Some(b) = parse_bool(&value) {
            cfg.allow_unksegment = b;
        }
    }

    cfg
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn overrides_only_named_fields() {
        let mut env = HashMap::new();
        env.insert("SPIMDISASM_COMPILER".to_string(), "GCC".to_string());
        env.insert(
            "SPIMDISASM_TRUST_USER_FUNCTIONS".to_string(),
            "FALSE".to_string(),
        );

        let defaults = GlobalConfig::new(Compiler::IDO, Endian::Big);
        let cfg = apply_env_overrides(defaults, |key| env.get(key).cloned());

        assert_eq!(cfg.compiler, Compiler::GCC);
        assert!(!cfg.trust_user_functions);
        assert_eq!(cfg.endian, Endian::Big);
    }

    #[test]
    fn unknown_value_is_ignored() {
        let defaults = GlobalConfig::new(Compiler::IDO, Endian::Big);
        let cfg = apply_env_overrides(defaults, |key| {
            if key == "SPIMDISASM_COMPILER" {
                Some("NOT_A_COMPILER".to_string())
            } else {
                None
            }
        });
        assert_eq!(cfg.compiler, Compiler::IDO);
    }
}
