/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use std::{
    fs,
    path::PathBuf,
};

use clap::Parser;
use object::{read::elf::ElfFile32, Object, ObjectSection};

use spimdisasm::{
    addresses::{Size, Vram},
    config::{Compiler, Endian, GlobalConfig},
    context::{Context, Segment},
    display::{SectionDisplay, SectionDisplayCtx},
    metadata::SectionType,
    sections::{BssSection, DataSection, TextSection},
};

#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
#[allow(non_camel_case_types)]
enum ArgCompiler {
    #[clap(aliases=&["ido"])]
    IDO,
    GCC,
}

impl From<ArgCompiler> for Compiler {
    fn from(value: ArgCompiler) -> Self {
        match value {
            ArgCompiler::IDO => Compiler::IDO,
            ArgCompiler::GCC => Compiler::GCC,
        }
    }
}

/// disasm-elf: a thin CLI that drives `spimdisasm`'s section analyzers over
/// a single statically-linked MIPS ELF and writes one `.s` file per section.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    input_path: PathBuf,
    output_dir: PathBuf,

    #[clap(long, default_value = "ido")]
    compiler: ArgCompiler,
}

fn section_bytes<'a>(obj: &'a ElfFile32, name: &str) -> Option<(Vram, &'a [u8])> {
    let section = obj.section_by_name(name)?;
    let address = section.address() as u32;
    let data = section.data().ok()?;
    Some((Vram::new(address), data))
}

fn main() {
    let args = Args::parse();

    let bytes = fs::read(&args.input_path).expect("failed to read input elf");
    let obj = ElfFile32::parse(bytes.as_slice()).expect("failed to parse elf");

    let config = GlobalConfig::new(args.compiler.into(), Endian::Big);

    let vram_lo = obj
        .sections()
        .map(|s| s.address() as u32)
        .min()
        .unwrap_or(0);
    let vram_hi = obj
        .sections()
        .map(|s| s.address() as u32 + s.size() as u32)
        .max()
        .unwrap_or(vram_lo + 1);
    let mut segment = Segment::new(Vram::new(vram_lo), Vram::new(vram_hi.max(vram_lo + 1)), None);

    fs::create_dir_all(&args.output_dir).expect("failed to create output dir");

    if let Some((vram_start, bytes)) = section_bytes(&obj, ".text") {
        let words: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|c| config.endian.word_from_bytes(c))
            .collect();
        let section = TextSection::analyze(&mut segment, &config, vram_start, &words);
        write_section(&args.output_dir, "text.s", SectionDisplay::Text(&section), &segment, &config);
    }

    for (name, kind, file) in [
        (".rodata", SectionType::Rodata, "rodata.s"),
        (".data", SectionType::Data, "data.s"),
    ] {
        if let Some((vram_start, bytes)) = section_bytes(&obj, name) {
            let section = DataSection::analyze(&mut segment, &config, kind, vram_start, bytes);
            write_section(&args.output_dir, file, SectionDisplay::Data(&section, &words_of(bytes, &config)), &segment, &config);
        }
    }

    if let Some(bss) = obj.section_by_name(".bss") {
        let vram_start = Vram::new(bss.address() as u32);
        let section = BssSection::analyze(&mut segment, vram_start, Size::new(bss.size() as u32));
        for warning in section.warnings() {
            eprintln!("warning: {warning}");
        }
        write_section(&args.output_dir, "bss.s", SectionDisplay::Bss(&section), &segment, &config);
    }

    let _ = Context::new(config, segment);
}

fn words_of(bytes: &[u8], config: &GlobalConfig) -> Vec<u32> {
    bytes.chunks_exact(4).map(|c| config.endian.word_from_bytes(c)).collect()
}

fn write_section(
    output_dir: &PathBuf,
    file_name: &str,
    section: SectionDisplay<'_>,
    segment: &Segment,
    config: &GlobalConfig,
) {
    let display = SectionDisplayCtx {
        section,
        segment,
        config,
        relocations: None,
    };
    let text = display.to_string();
    fs::write(output_dir.join(file_name), text).expect("failed to write output section");
}
