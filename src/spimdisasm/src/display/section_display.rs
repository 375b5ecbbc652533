/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use core::fmt;

use alloc::collections::btree_map::BTreeMap;

use rabbitizer::Vram;

use crate::config::GlobalConfig;
use crate::context::Segment;
use crate::relocation::RelocationInfo;
use crate::sections::{BssSection, DataSection, TextSection};

use super::symbol_display::{SymbolBody, SymbolDisplay};

/// One section's full text stream: every symbol in its vram range, in
/// address order (spec.md §4.6).
pub enum SectionDisplay<'a> {
    Text(&'a TextSection),
    Data(&'a DataSection, &'a [u32]),
    Bss(&'a BssSection),
}

impl<'a> SectionDisplay<'a> {
    fn write_section(
        &self,
        f: &mut fmt::Formatter<'_>,
        segment: &'a Segment,
        config: &'a GlobalConfig,
        relocations: Option<&'a BTreeMap<Vram, RelocationInfo>>,
    ) -> fmt::Result {
        match self {
            SectionDisplay::Text(section) => {
                for func in section.functions() {
                    let symbol = segment
                        .get_symbol_exact(func.start())
                        .ok_or(fmt::Error)?;
                    let name = symbol.name().unwrap_or("func");
                    let display = SymbolDisplay::new(
                        config,
                        segment,
                        symbol,
                        name,
                        SymbolBody::Instructions(func.instructions(), func.raw_words()),
                        relocations,
                    );
                    write!(f, "{display}")?;
                }
                Ok(())
            }
            SectionDisplay::Data(section, words) => {
                let vram_start = section.vram_start();
                let section_end = vram_start + crate::addresses::Size::new(words.len() as u32 * 4);
                let starts: alloc::vec::Vec<Vram> = segment
                    .get_symbols_range(vram_start, section_end)
                    .map(|sym| sym.address())
                    .collect();

                for (i, &start) in starts.iter().enumerate() {
                    let next = starts.get(i + 1).copied().unwrap_or(section_end);
                    let word_index = ((start.inner() - vram_start.inner()) / 4) as usize;
                    let word_span = ((next.inner() - start.inner()) / 4) as usize;
                    let span = &words[word_index..(word_index + word_span).min(words.len())];

                    let symbol = segment.get_symbol_exact(start).ok_or(fmt::Error)?;
                    let name = symbol.name().unwrap_or("obj");
                    let display =
                        SymbolDisplay::new(config, segment, symbol, name, SymbolBody::Words(span), relocations);
                    write!(f, "{display}")?;
                }
                Ok(())
            }
            SectionDisplay::Bss(section) => {
                let vram_start = section.vram_start();
                let vram_end = vram_start + section.total_size();
                let starts: alloc::vec::Vec<Vram> = segment
                    .get_symbols_range(vram_start, vram_end)
                    .map(|sym| sym.address())
                    .collect();

                for start in starts {
                    let symbol = segment.get_symbol_exact(start).ok_or(fmt::Error)?;
                    let name = symbol.name().unwrap_or("bss");
                    let display = SymbolDisplay::new(config, segment, symbol, name, SymbolBody::Bss, relocations);
                    write!(f, "{display}")?;
                }
                Ok(())
            }
        }
    }
}

/// Borrows everything [`SectionDisplay`] needs so it can implement
/// [`fmt::Display`] without an inherent lifetime-tying `fmt` signature.
pub struct SectionDisplayCtx<'a> {
    pub section: SectionDisplay<'a>,
    pub segment: &'a Segment,
    pub config: &'a GlobalConfig,
    pub relocations: Option<&'a BTreeMap<Vram, RelocationInfo>>,
}

impl fmt::Display for SectionDisplayCtx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.section.write_section(f, self.segment, self.config, self.relocations)
    }
}
