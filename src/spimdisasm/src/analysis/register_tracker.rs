/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use rabbitizer::{registers::Gpr, traits::Register, Instruction};

/// What a single GPR is currently known to hold, as far as HI/LO pair
/// reconstruction cares.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct HiState {
    /// The 32-bit value implied by the `lui`'s immediate, shifted into the
    /// upper half.
    hi_value: u32,
    /// Local instruction offset (relative to the function start) of the
    /// `lui` that produced this state, used to report `pointersOffsets`.
    hi_offset: usize,
}

/// Tracks, per GPR, the last `lui` seen so a later load/store/`addiu` that
/// reads the same base register can be paired into a full 32-bit address
/// (spec.md §2 item 2 and §4.3's HI/LO pair reconstruction).
///
/// Cleared wholesale whenever control flow leaves the function unconditionally
/// (a tail-call `j`/`jr`), since the register state downstream is garbage —
/// mirrors `instruction_analyzer.rs`'s `regs_tracker.clear()` on out-of-range
/// jump targets.
#[derive(Debug, Clone)]
pub struct RegisterTracker {
    hi_states: alloc::vec::Vec<Option<HiState>>,
}

/// One resolved HI/LO pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPointer {
    pub address: u32,
    pub hi_offset: usize,
    pub lo_offset: usize,
}

impl RegisterTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            hi_states: alloc::vec![None; Gpr::count()],
        }
    }

    pub fn clear(&mut self) {
        for state in self.hi_states.iter_mut() {
            *state = None;
        }
    }

    /// Feeds one instruction at `local_offset` (bytes from function start).
    /// Returns a resolved address if this instruction pairs a `%lo` with a
    /// previously recorded `%hi` in the same base register.
    ///
    /// `pair_multiple_hi_to_same_low`: when true (non-IDO compilers, per
    /// `Compiler::pair_multiple_hi_to_same_low`), the `%hi` state is kept
    /// around after being consumed so several `%lo`s can share one `lui`;
    /// IDO instead expects exactly one `%lo` per `%hi` and the state is
    /// cleared once used.
    pub fn process(
        &mut self,
        instr: &Instruction,
        local_offset: usize,
        pair_multiple_hi_to_same_low: bool,
    ) -> Option<ResolvedPointer> {
        let opcode = instr.opcode();

        if opcode.can_be_hi() {
            if let Some(reg) = instr.get_destination_gpr() {
                if let Some(imm) = instr.get_processed_immediate() {
                    self.hi_states[reg.as_index()] = Some(HiState {
                        hi_value: (imm as u32) << 16,
                        hi_offset: local_offset,
                    });
                }
            }
            return None;
        }

        if opcode.can_be_lo() {
            let base = instr.field_rs()?;
            let state = self.hi_states[base.as_index()]?;
            let imm = instr.get_processed_immediate()? as i32;
            let address = state.hi_value.wrapping_add(imm as u32);

            if !pair_multiple_hi_to_same_low {
                self.hi_states[base.as_index()] = None;
            }

            return Some(ResolvedPointer {
                address,
                hi_offset: state.hi_offset,
                lo_offset: local_offset,
            });
        }

        None
    }
}

impl Default for RegisterTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tracker_clears_to_no_state() {
        let mut tracker = RegisterTracker::new();
        tracker.clear();
        assert!(tracker.hi_states.iter().all(Option::is_none));
    }
}
