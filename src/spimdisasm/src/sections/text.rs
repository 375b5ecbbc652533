/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::collections::btree_set::BTreeSet;
use alloc::vec::Vec;

use rabbitizer::{vram::VramOffset, Instruction, Vram};

use crate::addresses::Size;
use crate::analysis::RegisterTracker;
use crate::config::GlobalConfig;
use crate::context::Segment;
use crate::symbols::FunctionSymbol;

/// Walks an instruction stream and splits it into [`FunctionSymbol`]s,
/// recording branch labels, jump tables and HI/LO pointer candidates into
/// the owning [`Segment`] along the way (spec.md §4.3).
#[derive(Debug, Clone)]
pub struct TextSection {
    vram_start: Vram,
    functions: Vec<FunctionSymbol>,
}

impl TextSection {
    /// `words` are the section's raw 32-bit words, already byte-order
    /// decoded by the caller (spec.md's `Section` carries "the decoded
    /// 32-bit `words` (byte-order-aware)").
    pub fn analyze(segment: &mut Segment, config: &GlobalConfig, vram_start: Vram, words: &[u32]) -> Self {
        let flags = config.instruction_flags();
        let mut vram = vram_start;
        let mut instrs = Vec::with_capacity(words.len());
        for &word in words {
            instrs.push(Instruction::new(word, vram, flags));
            vram += VramOffset::new(4);
        }

        let (starts, autocreated_from_sized) = find_function_starts(segment, config, vram_start, &instrs);

        let mut functions = Vec::with_capacity(starts.len());
        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(instrs.len());
            let func_vram = vram_start + Size::new(start as u32 * 4);

            let func_sym = segment.add_function(func_vram);
            if autocreated_from_sized.contains(&start) {
                func_sym.set_autocreated_sym_from_other_sized_sym(true);
            }
            let mut func =
                FunctionSymbol::new(func_vram, instrs[start..end].to_vec(), words[start..end].to_vec());
            func.set_likely_handwritten(func.instructions().iter().any(Instruction::is_likely_handwritten));

            reconstruct_pointers(segment, config, &mut func);
            find_branch_labels_and_jumptables(segment, config, &mut func);

            functions.push(func);
        }

        Self { vram_start, functions }
    }

    pub const fn vram_start(&self) -> Vram {
        self.vram_start
    }

    pub fn functions(&self) -> &[FunctionSymbol] {
        &self.functions
    }
}

/// RSP (microcode) segments are always trusted, on top of the usual
/// autogenerated/user-declared trust rules (spec.md §4.3.1: "or the
/// category is RSP").
fn is_rsp_segment(segment: &Segment) -> bool {
    segment.overlay_category().is_some_and(|category| category.eq_ignore_ascii_case("RSP"))
}

fn is_trustable(segment: &Segment, config: &GlobalConfig, vram: Vram) -> bool {
    if is_rsp_segment(segment) {
        return true;
    }
    segment
        .get_symbol_exact(vram)
        .is_some_and(|sym| sym.is_trustable_function(config.trust_user_functions, config.trust_jal_functions))
}

fn skip_nops(segment: &Segment, vram_start: Vram, instrs: &[Instruction], mut index: usize) -> usize {
    while index < instrs.len() {
        let vram = vram_start + Size::new(index as u32 * 4);
        if segment.get_symbol_exact(vram).is_some() || !instrs[index].is_nop() {
            break;
        }
        index += 1;
    }
    index
}

/// Implements spec.md §4.3.1's function-boundary discovery. Returns the
/// sorted, deduplicated list of instruction-index function starts, plus the
/// subset of those starts that were force-created immediately after a
/// function that ended via its own `userDeclaredSize`
/// (`isAutocreatedSymFromOtherSizedSym`).
fn find_function_starts(
    segment: &mut Segment,
    config: &GlobalConfig,
    vram_start: Vram,
    instrs: &[Instruction],
) -> (Vec<usize>, BTreeSet<usize>) {
    if instrs.is_empty() {
        return (alloc::vec![0], BTreeSet::new());
    }

    let mut starts: Vec<usize> = Vec::new();
    let mut autocreated_from_sized: BTreeSet<usize> = BTreeSet::new();
    let mut index = 0usize;

    if instrs[0].is_nop() {
        let skipped_to = skip_nops(segment, vram_start, instrs, index);
        if skipped_to != index {
            starts.push(0);
        }
        index = skipped_to;
    }

    let mut current_function_start = index;
    // -1 sentinel: no branch currently reaches forward of our position.
    let mut farthest_branch_target: i64 = -1;
    let mut is_likely_handwritten = false;
    let mut regs = RegisterTracker::new();

    while index < instrs.len() {
        let instr = &instrs[index];
        let local_offset = index as u32 * 4;
        let current_vram = vram_start + Size::new(local_offset);

        if !is_likely_handwritten {
            is_likely_handwritten = instr.is_likely_handwritten();
        }

        if let Some(resolved) = regs.process(
            instr,
            local_offset as usize,
            config.compiler.pair_multiple_hi_to_same_low(),
        ) {
            if config.address_passes_filter(resolved.address) {
                segment.add_pointer_in_data_reference(Vram::new(resolved.address));
            }
        }

        let mut halt = false;
        if instr.opcode().is_branch() || instr.is_unconditional_branch() || instr.is_jumptable_jump() {
            if let Some(branch_offset) = instr.get_branch_offset_generic() {
                let offset_bytes = branch_offset.inner() as i64;
                let target_local = local_offset as i64 + offset_bytes;
                if target_local > farthest_branch_target {
                    farthest_branch_target = target_local;
                }

                if offset_bytes < 0 {
                    if target_local < 0 && (!instr.opcode().is_jump() || config.treat_j_as_unconditional_branch) {
                        halt = true;
                    } else if !is_likely_handwritten {
                        while let Some(&last_start) = starts.last() {
                            let last_start_offset = last_start as i64 * 4;
                            if target_local >= last_start_offset {
                                break;
                            }
                            let last_start_vram = vram_start + Size::new(last_start as u32 * 4);
                            if is_trustable(segment, config, last_start_vram) {
                                break;
                            }
                            starts.pop();
                        }
                    }
                }
            }
        }

        if halt {
            break;
        }

        let (ended, ended_via_user_size) = function_ends(
            segment,
            config,
            instrs,
            index,
            local_offset,
            current_vram,
            current_function_start,
            farthest_branch_target,
            vram_start,
        );

        if ended {
            starts.push(current_function_start);

            let end_index = (index + 2).min(instrs.len());
            let next_index = skip_nops(segment, vram_start, instrs, end_index);

            if ended_via_user_size {
                autocreated_from_sized.insert(next_index);
            }

            current_function_start = next_index;
            farthest_branch_target = -1;
            is_likely_handwritten = false;
            regs.clear();
            index = next_index;
            continue;
        }

        index += 1;
    }

    if current_function_start < instrs.len() && starts.last().copied() != Some(current_function_start) {
        starts.push(current_function_start);
    }
    starts.sort_unstable();
    starts.dedup();
    (starts, autocreated_from_sized)
}

/// Checks whether the function currently being scanned ends at `index`, per
/// spec.md §4.3.1's four ordered rules. Returns `(ended, ended_via_user_size)`
/// — the second flag is set only when Rule 1 fired, so the caller can mark
/// the next function's symbol `isAutocreatedSymFromOtherSizedSym`.
#[allow(clippy::too_many_arguments)]
fn function_ends(
    segment: &Segment,
    config: &GlobalConfig,
    instrs: &[Instruction],
    index: usize,
    local_offset: u32,
    current_vram: Vram,
    current_function_start: usize,
    farthest_branch_target: i64,
    vram_start: Vram,
) -> (bool, bool) {
    let instr = &instrs[index];
    let func_start_vram = vram_start + Size::new(current_function_start as u32 * 4);

    // Rule 1: a user-declared size overrides every heuristic.
    if let Some(sym) = segment.get_symbol_exact(func_start_vram) {
        if let Some(size) = sym.user_declared_size() {
            let ended = local_offset + 8 == current_function_start as u32 * 4 + size.inner();
            return (ended, ended);
        }
    }

    // Rule 2: another trustable function starts right after our delay slot.
    if is_trustable(segment, config, current_vram + Size::new(8)) {
        return (true, false);
    }

    // A branch seen earlier still reaches past our current position: we're
    // still inside the same function no matter what this instruction is.
    if farthest_branch_target > local_offset as i64 {
        return (false, false);
    }

    // Rule 3: return / tail-call jumps.
    if instr.is_return() {
        if config.detect_redundant_function_end
            && config.compiler.supports_redundant_function_end()
            && index + 3 < instrs.len()
            && instrs[index + 1].is_nop()
            && instrs[index + 2].is_return()
            && instrs[index + 3].is_nop()
        {
            let mid_vram = vram_start + Size::new((index as u32 + 2) * 4);
            if segment.get_symbol_exact(mid_vram).is_none() {
                // Redundant `jr $ra; nop` pair ahead with no symbol splitting
                // them: merge, don't end here.
                return (false, false);
            }
        }
        return (true, false);
    }

    if instr.is_jumptable_jump() {
        return (false, false);
    }

    if instr.opcode().does_link() {
        return (false, false);
    }

    if instr.opcode().is_jump() {
        if let Some(target) = instr.get_instr_index_as_vram() {
            if is_trustable(segment, config, target) {
                return (true, false);
            }
        }
        return (instr.is_likely_handwritten() || is_rsp_segment(segment), false);
    }

    (false, false)
}

/// HI/LO reconstruction for the whole function, recording resolved offsets
/// onto the [`FunctionSymbol`] (spec.md §3.1 `pointersOffsets`).
fn reconstruct_pointers(segment: &mut Segment, config: &GlobalConfig, func: &mut FunctionSymbol) {
    let mut regs = RegisterTracker::new();
    let mut resolved_offsets = Vec::new();
    let mut resolved_addrs = Vec::new();

    for (i, instr) in func.instructions().iter().enumerate() {
        let local_offset = i as u32 * 4;
        if let Some(resolved) =
            regs.process(instr, local_offset as usize, config.compiler.pair_multiple_hi_to_same_low())
        {
            if config.address_passes_filter(resolved.address) {
                resolved_offsets.push(resolved.lo_offset as u32);
                resolved_addrs.push(Vram::new(resolved.address));
            }
        }
    }

    for offset in resolved_offsets {
        func.record_pointer_offset(offset);
    }
    for addr in resolved_addrs {
        segment.add_pointer_in_data_reference(addr);
    }
}

/// Creates branch-label and jump-table-label symbols for every branch target
/// and jumptable-jump target inside `func`'s own range (spec.md §4.3.1's
/// boundary detection implicitly assumes labels exist for the emitter; this
/// is the pass that actually materializes them).
fn find_branch_labels_and_jumptables(segment: &mut Segment, _config: &GlobalConfig, func: &FunctionSymbol) {
    let start = func.start();
    let end = func.end();

    for instr in func.instructions() {
        if instr.opcode().is_branch() || instr.is_unconditional_branch() {
            if let Some(target) = instr.get_branch_vram_generic() {
                if target >= start && target < end {
                    segment.add_branch_label(target);
                    link_label_to_parent(segment, start, target);
                }
            }
        } else if instr.is_jumptable_jump() {
            if let Some(table_vram) = instr.get_instr_index_as_vram() {
                segment.add_jump_table(table_vram);
            }
        }
    }
}

/// Records the label's `parentFunction` and the function's ordered label
/// list, so sequential label naming (spec.md §6.2 `SEQUENTIAL_LABEL_NAMES`)
/// can number labels by their position within their owning function.
fn link_label_to_parent(segment: &mut Segment, func_start: Vram, label: Vram) {
    if let Some(label_sym) = segment.get_symbol_exact_mut(label) {
        label_sym.set_parent_function(func_start);
    }
    if let Some(func_sym) = segment.get_symbol_exact_mut(func_start) {
        func_sym.register_branch_label(label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Compiler, Endian};
    use crate::metadata::{SectionType, SymbolType};

    const NOP: u32 = 0x0000_0000;
    const JR_RA: u32 = 0x03E0_0008;

    fn addiu_v0_zero(imm: u16) -> u32 {
        0x2402_0000 | imm as u32
    }

    fn segment() -> Segment {
        Segment::new(Vram::new(0x8000_0000), Vram::new(0x8010_0000), None)
    }

    /// Two adjacent functions sharing the `jr $ra; nop` epilogue idiom are
    /// split into two functions when redundant-end detection is on.
    #[test]
    fn two_adjacent_functions_split_on_return() {
        let mut seg = segment();
        let cfg = GlobalConfig::new(Compiler::GCC, Endian::Big);
        let words = [addiu_v0_zero(1), JR_RA, NOP, addiu_v0_zero(2), JR_RA, NOP];

        let section = TextSection::analyze(&mut seg, &cfg, Vram::new(0x8000_0000), &words);
        assert_eq!(section.functions().len(), 2);
        assert_eq!(section.functions()[0].start(), Vram::new(0x8000_0000));
        assert_eq!(section.functions()[1].start(), Vram::new(0x8000_000C));
    }

    /// A leading run of `nop`s before the first real instruction is skipped
    /// rather than folded into the first function.
    #[test]
    fn leading_nops_are_skipped() {
        let mut seg = segment();
        let cfg = GlobalConfig::new(Compiler::GCC, Endian::Big);
        let words = [NOP, NOP, addiu_v0_zero(1), JR_RA, NOP];

        let section = TextSection::analyze(&mut seg, &cfg, Vram::new(0x8000_0000), &words);
        assert_eq!(section.functions().len(), 2);
        assert_eq!(section.functions()[0].instructions().len(), 2);
        assert_eq!(section.functions()[1].start(), Vram::new(0x8000_0008));
    }

    /// IDO's redundant `jr $ra; nop; jr $ra; nop` idiom is merged into a
    /// single function when `detect_redundant_function_end` is enabled.
    #[test]
    fn redundant_return_is_merged_for_ido() {
        let mut seg = segment();
        let mut cfg = GlobalConfig::new(Compiler::IDO, Endian::Big);
        cfg.detect_redundant_function_end = true;
        let words = [addiu_v0_zero(1), JR_RA, NOP, JR_RA, NOP];

        let section = TextSection::analyze(&mut seg, &cfg, Vram::new(0x8000_0000), &words);
        assert_eq!(section.functions().len(), 1);
        assert_eq!(section.functions()[0].instructions().len(), 5);
    }

    /// A symbol within an RSP overlay category is always trusted, on top of
    /// the usual autogenerated/user-declared rules (spec.md §4.3.1).
    #[test]
    fn rsp_segment_is_always_trustable() {
        let seg = Segment::new(
            Vram::new(0x8000_0000),
            Vram::new(0x8010_0000),
            Some(alloc::string::String::from("RSP")),
        );
        let cfg = GlobalConfig::new(Compiler::GCC, Endian::Big);
        assert!(is_trustable(&seg, &cfg, Vram::new(0x8000_5000)));
    }

    /// When a function ends because its symbol carries a `userDeclaredSize`,
    /// the function force-created right after it is flagged
    /// `isAutocreatedSymFromOtherSizedSym` (spec.md §4.3.1).
    #[test]
    fn function_after_user_sized_function_is_marked_autocreated() {
        let mut seg = segment();
        let cfg = GlobalConfig::new(Compiler::GCC, Endian::Big);
        seg.add_symbol(Vram::new(0x8000_0000), SectionType::Text, false)
            .set_user_declared_size(crate::addresses::Size::new(8));

        let words = [addiu_v0_zero(1), NOP, addiu_v0_zero(2), JR_RA, NOP];
        TextSection::analyze(&mut seg, &cfg, Vram::new(0x8000_0000), &words);

        let next = seg.get_symbol_exact(Vram::new(0x8000_0008)).unwrap();
        assert!(next.is_autocreated_sym_from_other_sized_sym());
    }

    #[test]
    fn registers_function_symbol_type_for_each_start() {
        let mut seg = segment();
        let cfg = GlobalConfig::new(Compiler::GCC, Endian::Big);
        let words = [addiu_v0_zero(1), JR_RA, NOP];

        TextSection::analyze(&mut seg, &cfg, Vram::new(0x8000_0000), &words);
        assert_eq!(
            seg.get_symbol_exact(Vram::new(0x8000_0000)).unwrap().sym_type(),
            Some(&SymbolType::Function)
        );
    }
}
