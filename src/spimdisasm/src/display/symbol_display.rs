/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use core::fmt;

use alloc::collections::btree_map::BTreeMap;

use rabbitizer::{DisplayFlags, Instruction, Vram};

use crate::config::GlobalConfig;
use crate::context::Segment;
use crate::metadata::{ContextSymbol, SymbolType};
use crate::relocation::RelocationInfo;

/// What a symbol's body is made of, driving how each "word" of it is
/// rendered (spec.md §4.6 / §6.1).
pub enum SymbolBody<'a> {
    /// Text: one MIPS instruction per word, alongside the raw word it was
    /// decoded from (for the per-word comment).
    Instructions(&'a [Instruction], &'a [u32]),
    Words(&'a [u32]),
    Bss,
}

/// Renders one symbol's assembler block: pre-align, label macro, body,
/// size directive (spec.md §4.6). Writes directly into any `fmt::Write`
/// sink via `Display`, rather than building an intermediate `String`,
/// mirroring the teacher's `FunctionDisplay`/`SymDataDisplay`.
pub struct SymbolDisplay<'a> {
    config: &'a GlobalConfig,
    segment: &'a Segment,
    symbol: &'a ContextSymbol,
    name: &'a str,
    body: SymbolBody<'a>,
    relocations: Option<&'a BTreeMap<Vram, RelocationInfo>>,
}

impl<'a> SymbolDisplay<'a> {
    #[must_use]
    pub fn new(
        config: &'a GlobalConfig,
        segment: &'a Segment,
        symbol: &'a ContextSymbol,
        name: &'a str,
        body: SymbolBody<'a>,
        relocations: Option<&'a BTreeMap<Vram, RelocationInfo>>,
    ) -> Self {
        Self {
            config,
            segment,
            symbol,
            name,
            body,
            relocations,
        }
    }

    fn line_end(&self) -> &'static str {
        "\n"
    }

    fn label_macro(&self) -> &'static str {
        match self.symbol.sym_type() {
            Some(SymbolType::Function) => "glabel",
            Some(SymbolType::JumpTableLabel) => "jlabel",
            _ => "dlabel",
        }
    }

    fn word_comment(&self, f: &mut fmt::Formatter<'_>, offset: u32, vram: Vram, word: u32) -> fmt::Result {
        write!(f, "/* {offset:06X} {:08X} {word:08X} */ ", vram.inner())
    }

    fn resolved_operand(&self, vram: Vram) -> Option<alloc::string::String> {
        self.relocations.and_then(|map| map.get(&vram)).map(RelocationInfo::display_operand)
    }

    /// Resolves a `.word`'s value as a vram through the owning segment's
    /// context, per spec.md §4.6: pointer symbols render as `NAME` or
    /// `NAME + 0xOFFSET`, subject to three validity constraints that fall
    /// back to `None` (and thence to a raw hex literal) when violated -
    /// functions cannot be referenced with a non-zero addend, and branch-
    /// or jumptable-labels can only be referenced from a jumptable parent
    /// symbol. This is the baseline the caller overrides with an explicit
    /// [`RelocationInfo`] when one is known for the word.
    fn context_resolved_operand(&self, target_vram: Vram) -> Option<alloc::string::String> {
        let target = self.segment.get_symbol(target_vram, true, true)?;
        let addend = target_vram.inner().wrapping_sub(target.address().inner());

        match target.sym_type() {
            Some(SymbolType::Function) if addend != 0 => return None,
            Some(SymbolType::BranchLabel | SymbolType::JumpTableLabel) => {
                if !matches!(self.symbol.sym_type(), Some(SymbolType::JumpTable)) {
                    return None;
                }
                if addend != 0 {
                    return None;
                }
            }
            _ => {}
        }

        let name = target.name().unwrap_or("?");
        if addend == 0 {
            Some(alloc::string::String::from(name))
        } else {
            use core::fmt::Write;
            let mut out = alloc::string::String::from(name);
            let _ = write!(out, " + 0x{addend:X}");
            Some(out)
        }
    }

    fn fmt_instructions(
        &self,
        f: &mut fmt::Formatter<'_>,
        instrs: &[Instruction],
        words: &[u32],
    ) -> fmt::Result {
        let flags = DisplayFlags::default();
        for (i, (instr, &word)) in instrs.iter().zip(words.iter()).enumerate() {
            let offset = i as u32 * 4;
            let vram = instr.vram();
            self.word_comment(f, offset, vram, word)?;
            write!(f, "{}{}", instr.display(None, &flags), self.line_end())?;
        }
        Ok(())
    }

    fn fmt_words(&self, f: &mut fmt::Formatter<'_>, words: &[u32]) -> fmt::Result {
        let start = self.symbol.address();
        let directive = word_directive(self.symbol, self.config);

        if directive == ".asciz" {
            return self.fmt_string_words(f, words);
        }

        for (i, &word) in words.iter().enumerate() {
            let offset = i as u32 * 4;
            let vram = start + crate::addresses::Size::new(offset);
            self.word_comment(f, offset, vram, word)?;

            // Re-validated per word: a symbol typed as `f32` can still hold
            // an individual NaN-exponent word (spec.md §8 scenario 4), which
            // falls back to `.word` rather than misrepresenting it as a
            // float literal.
            let word_directive = if directive == ".float" && !is_plausible_f32(word) {
                ".word"
            } else {
                directive
            };

            // Relocations (when known for this word) override whatever the
            // context resolves; context resolution only ever applies to a
            // plain `.word` (a float/double/byte/short word's bits aren't a
            // vram). Raw hex is the final fallback.
            let operand = self.resolved_operand(vram).or_else(|| {
                if word_directive == ".word" {
                    self.context_resolved_operand(Vram::new(word))
                } else {
                    None
                }
            });

            if let Some(operand) = operand {
                write!(f, "{word_directive} {operand}{}", self.line_end())?;
            } else {
                write!(f, "{word_directive} {}{}", render_word(word_directive, word), self.line_end())?;
            }
        }
        Ok(())
    }

    /// A string symbol renders as a single `.asciz` literal over its
    /// null-terminated bytes rather than one directive per word; any padding
    /// words past the terminator are realigned with `.balign 4` instead of
    /// being spelled out (spec.md §8 scenario 3).
    fn fmt_string_words(&self, f: &mut fmt::Formatter<'_>, words: &[u32]) -> fmt::Result {
        let start = self.symbol.address();
        self.word_comment(f, 0, start, words.first().copied().unwrap_or(0))?;

        let bytes: alloc::vec::Vec<u8> = words
            .iter()
            .flat_map(|&w| self.config.endian.bytes_from_word(w))
            .collect();
        let text_len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let text = core::str::from_utf8(&bytes[..text_len]).unwrap_or("");
        write!(f, ".asciz \"{text}\"{}", self.line_end())?;

        if text_len + 1 < bytes.len() {
            write!(f, ".balign 4{}", self.line_end())?;
        }
        Ok(())
    }

    fn fmt_bss(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".space 0x{:X}{}", self.symbol.size().inner(), self.line_end())
    }
}

/// Chooses the per-word directive for a data/rodata symbol from its
/// effective type (spec.md §4.6).
fn word_directive<'a>(symbol: &ContextSymbol, config: &GlobalConfig) -> &'a str {
    if symbol.is_double() {
        ".double"
    } else if symbol.is_float() {
        ".float"
    } else if symbol.is_string() {
        ".asciz"
    } else if symbol.is_byte() && config.use_dot_byte {
        ".byte"
    } else if symbol.is_short() && config.use_dot_short {
        ".short"
    } else {
        ".word"
    }
}

/// Re-checked at render time: a symbol can carry an `f32` type (declared or
/// autodetected) while one specific word among its body is a NaN-exponent
/// bit pattern, which must still emit as `.word` (spec.md §8 scenario 4).
fn is_plausible_f32(word: u32) -> bool {
    let exponent = (word >> 23) & 0xFF;
    exponent != 0xFF
}

fn render_word(directive: &str, word: u32) -> alloc::string::String {
    use core::fmt::Write;
    let mut out = alloc::string::String::new();
    match directive {
        ".float" => {
            let _ = write!(out, "{}", f32::from_bits(word));
        }
        _ => {
            let _ = write!(out, "0x{word:08X}");
        }
    }
    out
}

impl fmt::Display for SymbolDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.symbol.is_double() && self.symbol.address().inner() % 8 == 0 {
            write!(f, ".align 3{}", self.line_end())?;
        }

        write!(f, "{} {}{}", self.label_macro(), self.name, self.line_end())?;
        write!(f, "{}:{}", self.name, self.line_end())?;

        match &self.body {
            SymbolBody::Instructions(instrs, words) => self.fmt_instructions(f, instrs, words)?,
            SymbolBody::Words(words) => self.fmt_words(f, words)?,
            SymbolBody::Bss => self.fmt_bss(f)?,
        }

        if self.config.emit_size_directive {
            write!(f, ".size {}, . - {}{}", self.name, self.name, self.line_end())?;
        }
        Ok(())
    }
}
