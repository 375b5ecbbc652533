/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::{collections::btree_set::BTreeSet, vec::Vec};

use rabbitizer::{Instruction, Vram};

/// Specializes the generic data symbol with its decoded instruction list
/// (spec.md §3.1's `SymbolFunction`). Looked up in the owning [`Segment`](crate::context::Segment)
/// by its start address; the metadata (name, type, size, references) lives
/// on the [`ContextSymbol`](crate::metadata::ContextSymbol) at that address,
/// this struct only carries what a function specifically needs beyond that.
#[derive(Debug, Clone)]
pub struct FunctionSymbol {
    start: Vram,
    instructions: Vec<Instruction>,
    /// Raw 32-bit words the instructions were decoded from, kept alongside
    /// for the emitter's per-word comment (spec.md §6.1).
    raw_words: Vec<u32>,
    /// Offsets (in bytes from `start`) of instructions whose HI/LO pair
    /// resolved to a pointer value, per spec.md §3.1's `pointersOffsets`.
    pointer_offsets: BTreeSet<u32>,
    has_unimplemented_instrs: bool,
    is_likely_handwritten: bool,
}

impl FunctionSymbol {
    #[must_use]
    pub fn new(start: Vram, instructions: Vec<Instruction>, raw_words: Vec<u32>) -> Self {
        let has_unimplemented_instrs = instructions.iter().any(|instr| !instr.is_valid());
        Self {
            start,
            instructions,
            raw_words,
            pointer_offsets: BTreeSet::new(),
            has_unimplemented_instrs,
            is_likely_handwritten: false,
        }
    }

    pub const fn start(&self) -> Vram {
        self.start
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn raw_words(&self) -> &[u32] {
        &self.raw_words
    }

    /// Byte size of the function, i.e. `instruction_count * 4`.
    pub fn byte_size(&self) -> u32 {
        self.instructions.len() as u32 * 4
    }

    pub fn end(&self) -> Vram {
        self.start + crate::addresses::Size::new(self.byte_size())
    }

    pub fn record_pointer_offset(&mut self, offset: u32) {
        self.pointer_offsets.insert(offset);
    }

    pub fn pointer_offsets(&self) -> impl Iterator<Item = &u32> {
        self.pointer_offsets.iter()
    }

    pub const fn has_unimplemented_instrs(&self) -> bool {
        self.has_unimplemented_instrs
    }

    pub const fn is_likely_handwritten(&self) -> bool {
        self.is_likely_handwritten
    }
    pub fn set_likely_handwritten(&mut self, value: bool) {
        self.is_likely_handwritten = value;
    }
}
