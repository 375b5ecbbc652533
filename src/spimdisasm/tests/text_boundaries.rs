/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use rabbitizer::Vram;

use spimdisasm::config::{Compiler, Endian, GlobalConfig};
use spimdisasm::context::Segment;
use spimdisasm::sections::TextSection;

const NOP: u32 = 0x0000_0000;
const JR_RA: u32 = 0x03E0_0008;

fn addiu_v0_zero(imm: u16) -> u32 {
    0x2402_0000 | imm as u32
}

/// `j 0x80000100`: opcode 2, 26-bit instruction index `(0x80000100 >> 2) &
/// 0x03FFFFFF`.
const J_TO_0X100: u32 = 0x0800_0040;

fn segment() -> Segment {
    Segment::new(Vram::new(0x8000_0000), Vram::new(0x8010_0000), None)
}

/// Scenario 1: two functions sharing a `jr $ra; nop` epilogue are kept
/// separate when redundant-end detection is off, and merged when it's on.
#[test]
fn shared_return_epilogue_split_unless_merge_enabled() {
    let words = [JR_RA, NOP, JR_RA, NOP];

    let mut seg_off = segment();
    let cfg_off = GlobalConfig::new(Compiler::IDO, Endian::Big);
    let section = TextSection::analyze(&mut seg_off, &cfg_off, Vram::new(0x8000_0000), &words);
    assert_eq!(section.functions().len(), 2);
    assert_eq!(section.functions()[1].byte_size(), 8);

    let mut seg_on = segment();
    let mut cfg_on = GlobalConfig::new(Compiler::IDO, Endian::Big);
    cfg_on.detect_redundant_function_end = true;
    let section = TextSection::analyze(&mut seg_on, &cfg_on, Vram::new(0x8000_0000), &words);
    assert_eq!(section.functions().len(), 1);
    assert_eq!(section.functions()[0].byte_size(), 16);
}

/// Scenario 5: a tail-call `j target` ends the current function as soon as
/// `target` resolves to a trustable function symbol, regardless of whether
/// `treat_j_as_unconditional_branch` is set.
#[test]
fn jumptable_tail_call_to_trustable_target_ends_function() {
    let words = [
        addiu_v0_zero(1),
        J_TO_0X100,
        NOP,
        addiu_v0_zero(2),
        JR_RA,
        NOP,
    ];

    for treat_j_as_unconditional_branch in [false, true] {
        let mut seg = segment();
        seg.add_function(Vram::new(0x8000_0100));
        let mut cfg = GlobalConfig::new(Compiler::GCC, Endian::Big);
        cfg.treat_j_as_unconditional_branch = treat_j_as_unconditional_branch;

        let section = TextSection::analyze(&mut seg, &cfg, Vram::new(0x8000_0000), &words);
        assert_eq!(section.functions().len(), 2, "treat_j_as_unconditional_branch={treat_j_as_unconditional_branch}");
        assert_eq!(section.functions()[0].byte_size(), 12);
        assert_eq!(section.functions()[1].start(), Vram::new(0x8000_000C));
    }
}
