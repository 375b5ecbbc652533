/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use rabbitizer::Vram;

use spimdisasm::addresses::Size;
use spimdisasm::config::{Compiler, Endian, GlobalConfig, StringGuesserLevel};
use spimdisasm::context::Segment;
use spimdisasm::display::{SymbolBody, SymbolDisplay};
use spimdisasm::metadata::{naming, SectionType, SymbolType};
use spimdisasm::sections::{BssSection, DataSection, TextSection};

const NOP: u32 = 0x0000_0000;
const JR_RA: u32 = 0x03E0_0008;

fn segment() -> Segment {
    Segment::new(Vram::new(0x8000_0000), Vram::new(0x8010_0000), None)
}

/// Scenario 2: a data word pointing into a BSS range becomes a single
/// autogenerated symbol whose span is the remainder of the BSS section.
#[test]
fn data_pointer_into_bss_becomes_defined_symbol() {
    let mut seg = segment();
    let cfg = GlobalConfig::new(Compiler::GCC, Endian::Big);

    let data_bytes = 0x8000_2000u32.to_be_bytes();
    DataSection::analyze(&mut seg, &cfg, SectionType::Data, Vram::new(0x8000_1000), &data_bytes);
    BssSection::analyze(&mut seg, Vram::new(0x8000_2000), Size::new(0x100));

    let sym = seg.get_symbol_exact(Vram::new(0x8000_2000)).unwrap();
    assert!(sym.is_defined());
    assert_eq!(sym.section_type(), SectionType::Bss);
    assert_eq!(sym.size().inner(), 0x100);
}

/// Scenario 3: with the guesser at level 1 and a single reference, a
/// `"hi\0\0"` word run emits as one `.asciz` literal followed by a
/// realigning `.balign 4`; at level 0 it stays a plain `.word`.
#[test]
fn string_guesser_level_gates_asciz_emission() {
    let bytes = 0x6869_0000u32.to_be_bytes();

    let mut seg = segment();
    seg.add_symbol(Vram::new(0x8000_3000), SectionType::Rodata, true)
        .add_reference_symbol(Vram::new(0x8000_0000));
    let mut cfg = GlobalConfig::new(Compiler::GCC, Endian::Big);
    cfg.rodata_string_guesser_level = StringGuesserLevel::UniqueNonEmpty;
    DataSection::analyze(&mut seg, &cfg, SectionType::Rodata, Vram::new(0x8000_3000), &bytes);

    let symbol = seg.get_symbol_exact(Vram::new(0x8000_3000)).unwrap();
    assert!(symbol.is_string());
    let words: Vec<u32> = bytes.chunks_exact(4).map(|c| cfg.endian.word_from_bytes(c)).collect();
    let display = SymbolDisplay::new(&cfg, &seg, symbol, "STR_80003000", SymbolBody::Words(&words), None);
    let rendered = format!("{display}");
    assert!(rendered.contains(".asciz \"hi\""));
    assert!(rendered.contains(".balign 4"));

    let mut seg_off = segment();
    seg_off
        .add_symbol(Vram::new(0x8000_3000), SectionType::Rodata, true)
        .add_reference_symbol(Vram::new(0x8000_0000));
    let cfg_off = GlobalConfig::new(Compiler::GCC, Endian::Big);
    DataSection::analyze(&mut seg_off, &cfg_off, SectionType::Rodata, Vram::new(0x8000_3000), &bytes);
    let symbol_off = seg_off.get_symbol_exact(Vram::new(0x8000_3000)).unwrap();
    assert!(!symbol_off.is_string());
    let display_off = SymbolDisplay::new(&cfg_off, &seg_off, symbol_off, "D_80003000", SymbolBody::Words(&words), None);
    let rendered_off = format!("{display_off}");
    assert!(rendered_off.contains(".word 0x68690000"));
}

/// Scenario 4: a word with the NaN exponent pattern is excluded from float
/// classification at analysis time, and — even though the symbol's declared
/// type is still `f32` — the renderer re-checks each word and falls back to
/// `.word` rather than misrepresenting the NaN pattern as a float literal.
#[test]
fn nan_word_emits_as_word_not_float() {
    let mut seg = segment();
    let cfg = GlobalConfig::new(Compiler::GCC, Endian::Big);
    let sym = seg.add_symbol(Vram::new(0x8000_4000), SectionType::Rodata, false);
    sym.set_user_declared_type(SymbolType::named("f32"));

    let bytes = 0x7F80_0000u32.to_be_bytes();
    DataSection::analyze(&mut seg, &cfg, SectionType::Rodata, Vram::new(0x8000_4000), &bytes);

    let symbol = seg.get_symbol_exact(Vram::new(0x8000_4000)).unwrap();
    assert!(symbol.autodetected_type().is_none());
    let words: Vec<u32> = bytes.chunks_exact(4).map(|c| cfg.endian.word_from_bytes(c)).collect();
    let display = SymbolDisplay::new(&cfg, &seg, symbol, "D_80004000", SymbolBody::Words(&words), None);
    let rendered = format!("{display}");
    assert!(rendered.contains(".word 0x7F800000"));
}

/// Scenario 6: with `SEQUENTIAL_LABEL_NAMES`, a function's branch labels are
/// named by their 1-based position among that function's labels, in address
/// order, rather than by their own address.
#[test]
fn sequential_label_names_number_by_position_in_function() {
    let mut seg = segment();
    let cfg_decode = GlobalConfig::new(Compiler::GCC, Endian::Big);

    let words = [
        0x1000_0003, // beq zero, zero, 3  -> targets 0x80000110
        NOP,
        0x1000_0005, // beq zero, zero, 5  -> targets 0x80000120
        NOP,
        NOP, NOP, NOP, NOP,
        NOP,
        JR_RA,
        NOP,
    ];

    TextSection::analyze(&mut seg, &cfg_decode, Vram::new(0x8000_0100), &words);

    let mut cfg = cfg_decode;
    cfg.naming.sequential_label_names = true;

    let func_name = {
        let func = seg.get_symbol_exact_mut(Vram::new(0x8000_0100)).unwrap();
        let name = naming::default_name(func, None, &cfg, None);
        func.set_name(name.clone());
        name
    };
    assert_eq!(func_name, "func_80000100");

    let func = seg.get_symbol_exact(Vram::new(0x8000_0100)).unwrap().clone();
    let label_a = seg.get_symbol_exact(Vram::new(0x8000_0110)).unwrap();
    let label_b = seg.get_symbol_exact(Vram::new(0x8000_0120)).unwrap();

    assert_eq!(
        naming::default_name(label_a, Some(&func), &cfg, None),
        ".Lfunc_80000100_1"
    );
    assert_eq!(
        naming::default_name(label_b, Some(&func), &cfg, None),
        ".Lfunc_80000100_2"
    );
}

/// A `.word` pointing at another symbol renders as that symbol's name
/// rather than a raw hex literal, resolved through the segment's context
/// rather than through an explicit relocation (spec.md §4.6).
#[test]
fn word_pointer_resolves_to_symbol_name_via_context() {
    let mut seg = segment();
    let cfg = GlobalConfig::new(Compiler::GCC, Endian::Big);

    seg.add_symbol(Vram::new(0x8000_5000), SectionType::Data, false)
        .set_name("D_80005000");
    let bytes = 0x8000_5000u32.to_be_bytes();
    DataSection::analyze(&mut seg, &cfg, SectionType::Data, Vram::new(0x8000_6000), &bytes);

    let symbol = seg.get_symbol_exact(Vram::new(0x8000_6000)).unwrap();
    let words: Vec<u32> = bytes.chunks_exact(4).map(|c| cfg.endian.word_from_bytes(c)).collect();
    let display = SymbolDisplay::new(&cfg, &seg, symbol, "D_80006000", SymbolBody::Words(&words), None);
    let rendered = format!("{display}");
    assert!(rendered.contains(".word D_80005000"));
}

/// Jump-table words are resolved as branch-label addresses and printed by
/// name when resolvable (spec.md §4.4 item 4).
#[test]
fn jumptable_word_renders_branch_label_by_name() {
    let mut seg = segment();
    let cfg = GlobalConfig::new(Compiler::GCC, Endian::Big);

    let table = seg.add_symbol(Vram::new(0x8000_7000), SectionType::Rodata, false);
    table.set_user_declared_type(SymbolType::JumpTable);
    table.set_name("jtbl_80007000");

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0x8000_0100u32.to_be_bytes());
    DataSection::analyze(&mut seg, &cfg, SectionType::Rodata, Vram::new(0x8000_7000), &bytes);

    seg.get_symbol_exact_mut(Vram::new(0x8000_0100))
        .unwrap()
        .set_name(".L80000100");

    let symbol = seg.get_symbol_exact(Vram::new(0x8000_7000)).unwrap();
    let words: Vec<u32> = bytes.chunks_exact(4).map(|c| cfg.endian.word_from_bytes(c)).collect();
    let display = SymbolDisplay::new(&cfg, &seg, symbol, "jtbl_80007000", SymbolBody::Words(&words), None);
    let rendered = format!("{display}");
    assert!(rendered.contains(".word .L80000100"));
}
