/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::vec::Vec;

use rabbitizer::Vram;

use crate::addresses::Size;
use crate::analysis::{self, DecodedString};
use crate::config::GlobalConfig;
use crate::context::Segment;
use crate::metadata::{SectionType, SymbolType};

/// Shared word-classification pass for `.data` and `.rodata` (spec.md §4.4):
/// treats every word as a potential pointer into the segment's address
/// range, then — for words belonging to an already-typed symbol — detects
/// floats, doubles, jump tables and strings.
#[derive(Debug, Clone)]
pub struct DataSection {
    section_type: SectionType,
    vram_start: Vram,
    word_count: usize,
}

impl DataSection {
    pub fn analyze(
        segment: &mut Segment,
        config: &GlobalConfig,
        section_type: SectionType,
        vram_start: Vram,
        bytes: &[u8],
    ) -> Self {
        debug_assert!(bytes.len() % 4 == 0, "data/rodata section must be word-aligned");

        let words: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|chunk| config.endian.word_from_bytes(chunk))
            .collect();

        segment.add_symbol(vram_start, section_type, true);

        find_pointer_candidates(segment, config, vram_start, &words);
        classify_typed_symbols(segment, config, section_type, vram_start, &words);

        Self {
            section_type,
            vram_start,
            word_count: words.len(),
        }
    }

    pub const fn section_type(&self) -> SectionType {
        self.section_type
    }
    pub const fn vram_start(&self) -> Vram {
        self.vram_start
    }
    pub const fn word_count(&self) -> usize {
        self.word_count
    }
}

/// Step 1 of spec.md §4.4: every word whose value lies in any segment's
/// vram range is a pointer candidate, filtered by the low/high address
/// thresholds.
fn find_pointer_candidates(segment: &mut Segment, config: &GlobalConfig, vram_start: Vram, words: &[u32]) {
    for (i, &word) in words.iter().enumerate() {
        let word_vram = vram_start + Size::new(i as u32 * 4);
        let candidate = Vram::new(word);

        if !config.address_passes_filter(word) {
            continue;
        }
        if !segment.is_vram_in_range(candidate) {
            continue;
        }

        segment.add_pointer_in_data_reference(candidate);
        let target = segment.add_symbol(candidate, SectionType::Unknown, true);
        target.add_reference_symbol(word_vram);
    }
}

/// Steps 2-5 of spec.md §4.4, applied per already-registered symbol whose
/// vram falls in `[vram_start, vram_start + words.len()*4)`.
fn classify_typed_symbols(
    segment: &mut Segment,
    config: &GlobalConfig,
    section_type: SectionType,
    vram_start: Vram,
    words: &[u32],
) {
    let section_end = vram_start + Size::new(words.len() as u32 * 4);
    let starts: Vec<Vram> = segment
        .get_symbols_range(vram_start, section_end)
        .map(|sym| sym.address())
        .collect();

    for (idx, &start) in starts.iter().enumerate() {
        let next = starts.get(idx + 1).copied().unwrap_or(section_end);
        let word_index = ((start.inner() - vram_start.inner()) / 4) as usize;
        let word_span = ((next.inner() - start.inner()) / 4) as usize;
        let span = &words[word_index..(word_index + word_span).min(words.len())];

        let sym_type = segment.get_symbol_exact(start).and_then(|s| s.sym_type().cloned());

        match sym_type {
            Some(SymbolType::JumpTable) => classify_jumptable(segment, span),
            Some(SymbolType::Named(name)) if name == "f32" || name == "Vec3f" => {
                classify_floats(segment, start, span);
            }
            Some(SymbolType::Named(name)) if name == "f64" => classify_doubles(segment, config, start, span),
            _ => {
                let (guesser_level, pascal_guesser_level) = if section_type == SectionType::Rodata {
                    (config.rodata_string_guesser_level, config.pascal_rodata_string_guesser_level)
                } else {
                    (config.data_string_guesser_level, config.pascal_data_string_guesser_level)
                };
                try_string(segment, config, guesser_level, pascal_guesser_level, start, span);
            }
        }
    }
}

fn classify_jumptable(segment: &mut Segment, span: &[u32]) {
    for &word in span {
        let target = Vram::new(word);
        if segment.is_vram_in_range(target) {
            segment.add_jump_table_label(target);
        }
    }
}

/// Excludes NaN/Inf patterns (exponent field all-ones) per spec.md §4.4 step
/// 2 and §8 scenario 4.
fn is_plausible_f32(word: u32) -> bool {
    let exponent = (word >> 23) & 0xFF;
    exponent != 0xFF
}

fn classify_floats(segment: &mut Segment, start: Vram, span: &[u32]) {
    for (i, &word) in span.iter().enumerate() {
        let word_vram = start + Size::new(i as u32 * 4);
        if word_vram.inner() % 4 != 0 || !is_plausible_f32(word) {
            continue;
        }
        if let Some(sym) = segment.get_symbol_exact_mut(word_vram) {
            sym.set_autodetected_type(SymbolType::named("f32"));
        }
    }
}

fn is_plausible_f64(hi_word: u32) -> bool {
    let exponent = (hi_word >> 20) & 0x7FF;
    exponent != 0x7FF
}

/// Doubles require 8-byte alignment, consume two words, and must not
/// swallow the second word if a symbol is already registered there (spec.md
/// §4.4 step 3).
fn classify_doubles(segment: &mut Segment, config: &GlobalConfig, start: Vram, span: &[u32]) {
    let mut i = 0;
    while i + 1 < span.len() {
        let word_vram = start + Size::new(i as u32 * 4);
        if word_vram.inner() % 8 != 0 {
            i += 1;
            continue;
        }

        let second_word_vram = word_vram + Size::new(4);
        if segment.get_symbol_exact(second_word_vram).is_some() {
            i += 1;
            continue;
        }

        let hi = if config.endian == crate::config::Endian::Little {
            span[i + 1]
        } else {
            span[i]
        };
        if !is_plausible_f64(hi) {
            i += 1;
            continue;
        }

        if let Some(sym) = segment.get_symbol_exact_mut(word_vram) {
            sym.set_autodetected_type(SymbolType::named("f64"));
        }
        i += 2;
    }
}

/// Pascal strings are length-prefixed and terminated by this byte by
/// default (spec.md §4.4 item 5).
const PASCAL_STRING_TERMINATOR: u8 = 0x20;

#[allow(clippy::too_many_arguments)]
fn try_string(
    segment: &mut Segment,
    config: &GlobalConfig,
    level: crate::config::StringGuesserLevel,
    pascal_level: crate::config::StringGuesserLevel,
    start: Vram,
    span: &[u32],
) {
    use crate::config::StringGuesserLevel;

    if level == StringGuesserLevel::Off && pascal_level == StringGuesserLevel::Off {
        return;
    }

    let bytes: Vec<u8> = span.iter().flat_map(|&w| config.endian.bytes_from_word(w)).collect();
    let reference_count = segment.get_symbol_exact(start).map_or(0, |s| s.reference_counter());

    if level != StringGuesserLevel::Off {
        let decoded: Option<DecodedString> = analysis::decode_ascii(&bytes);
        if let Some(decoded) = decoded {
            if analysis::string_guess_accepted(level, &decoded, reference_count) {
                if let Some(sym) = segment.get_symbol_exact_mut(start) {
                    sym.set_maybe_string(true);
                    if level == StringGuesserLevel::OverrideAutodetected || sym.autodetected_type().is_none() {
                        sym.set_autodetected_type(SymbolType::named("char*"));
                    }
                }
                return;
            }
        }
    }

    if pascal_level != StringGuesserLevel::Off {
        let decoded = analysis::decode_pascal(&bytes, PASCAL_STRING_TERMINATOR);
        if let Some(decoded) = decoded {
            if analysis::string_guess_accepted(pascal_level, &decoded, reference_count) {
                if let Some(sym) = segment.get_symbol_exact_mut(start) {
                    sym.set_maybe_pascal_string(true);
                    if pascal_level == StringGuesserLevel::OverrideAutodetected || sym.autodetected_type().is_none() {
                        sym.set_autodetected_type(SymbolType::named("PascalStr"));
                    }
                }
                return;
            }
        }
    }

    if let Some(sym) = segment.get_symbol_exact_mut(start) {
        sym.set_failed_string_decoding(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Compiler, Endian};

    fn segment() -> Segment {
        Segment::new(Vram::new(0x8000_0000), Vram::new(0x8010_0000), None)
    }

    #[test]
    fn word_pointing_into_segment_becomes_pointer_candidate() {
        let mut seg = segment();
        let cfg = GlobalConfig::new(Compiler::GCC, Endian::Big);
        let bytes = 0x8000_2000u32.to_be_bytes();

        DataSection::analyze(&mut seg, &cfg, SectionType::Data, Vram::new(0x8000_1000), &bytes);

        assert!(seg.get_symbol_exact(Vram::new(0x8000_2000)).is_some());
        assert!(seg
            .pending_pointers_in_data()
            .any(|&addr| addr == Vram::new(0x8000_2000)));
    }

    #[test]
    fn nan_pattern_is_not_treated_as_float() {
        let mut seg = segment();
        let cfg = GlobalConfig::new(Compiler::GCC, Endian::Big);
        let sym = seg.add_symbol(Vram::new(0x8000_1000), SectionType::Rodata, false);
        sym.set_user_declared_type(SymbolType::named("f32"));

        let bytes = 0x7F80_0000u32.to_be_bytes();
        DataSection::analyze(&mut seg, &cfg, SectionType::Rodata, Vram::new(0x8000_1000), &bytes);

        let sym = seg.get_symbol_exact(Vram::new(0x8000_1000)).unwrap();
        assert!(sym.autodetected_type().is_none());
    }

    #[test]
    fn pascal_string_is_detected_when_guesser_enabled() {
        let mut seg = segment();
        let mut cfg = GlobalConfig::new(Compiler::GCC, Endian::Big);
        cfg.pascal_rodata_string_guesser_level = crate::config::StringGuesserLevel::UniqueNonEmpty;

        // length=2, "hi", terminator 0x20, already 4-byte aligned.
        let bytes = [2u8, b'h', b'i', 0x20];
        DataSection::analyze(&mut seg, &cfg, SectionType::Rodata, Vram::new(0x8000_1000), &bytes);

        let sym = seg.get_symbol_exact(Vram::new(0x8000_1000)).unwrap();
        assert!(sym.is_maybe_pascal_string());
        assert!(sym.is_pascal_string());
    }

    #[test]
    fn jumptable_words_become_branch_label_candidates() {
        let mut seg = segment();
        let cfg = GlobalConfig::new(Compiler::GCC, Endian::Big);
        let sym = seg.add_symbol(Vram::new(0x8000_1000), SectionType::Rodata, false);
        sym.set_user_declared_type(SymbolType::JumpTable);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x8000_0100u32.to_be_bytes());
        DataSection::analyze(&mut seg, &cfg, SectionType::Rodata, Vram::new(0x8000_1000), &bytes);

        let label = seg.get_symbol_exact(Vram::new(0x8000_0100)).unwrap();
        assert_eq!(label.sym_type(), Some(&SymbolType::JumpTableLabel));
    }
}
