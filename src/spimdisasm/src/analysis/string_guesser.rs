/* SPDX-FileCopyrightText: © 2024-2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use alloc::string::String;

use crate::config::StringGuesserLevel;

/// A successfully decoded C string: byte length up to and including the NUL
/// terminator, and the length after padding to a 4-byte boundary with extra
/// NULs (spec.md §4.4: "strings decode byte-by-byte starting at a 4-aligned
/// address, terminating at NUL, and are padded to 4-byte boundary with
/// NULs").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedString {
    pub text: String,
    pub terminated_len: usize,
    pub padded_len: usize,
}

/// Renders `byte` the way a C-string literal would need it escaped, matching
/// the escape table any MIPS `.asciz` emitter uses: `\a \t \n \f \r \" \\`
/// plus a numeric escape for anything else non-printable.
fn escape_byte(byte: u8, out: &mut String) {
    match byte {
        b'\x07' => out.push_str("\\a"),
        b'\t' => out.push_str("\\t"),
        b'\n' => out.push_str("\\n"),
        b'\x0c' => out.push_str("\\f"),
        b'\r' => out.push_str("\\r"),
        b'"' => out.push_str("\\\""),
        b'\\' => out.push_str("\\\\"),
        0x20..=0x7e => out.push(byte as char),
        other => {
            use core::fmt::Write;
            let _ = write!(out, "\\x{other:02x}");
        }
    }
}

/// Decodes a NUL-terminated ASCII run starting at `bytes[0]`. Returns `None`
/// if no NUL is found within `bytes`, or if a byte outside printable ASCII
/// (and not one of the recognized escapes) is encountered, mirroring the
/// source's `UnicodeDecodeError` fallback.
#[must_use]
pub fn decode_ascii(bytes: &[u8]) -> Option<DecodedString> {
    let nul_pos = bytes.iter().position(|&b| b == 0)?;
    let mut text = String::new();
    for &byte in &bytes[..nul_pos] {
        if !(0x20..=0x7e).contains(&byte) && !matches!(byte, 0x07 | 0x09 | 0x0a | 0x0c | 0x0d) {
            return None;
        }
        escape_byte(byte, &mut text);
    }
    let terminated_len = nul_pos + 1;
    let padded_len = terminated_len.div_ceil(4) * 4;
    Some(DecodedString {
        text,
        terminated_len,
        padded_len,
    })
}

/// Decodes a length-prefixed Pascal string: the first byte is the length,
/// followed by that many characters, then a terminator byte (`0x20` by
/// default per spec.md §4.4).
#[must_use]
pub fn decode_pascal(bytes: &[u8], terminator: u8) -> Option<DecodedString> {
    let len = *bytes.first()? as usize;
    let body = bytes.get(1..1 + len)?;
    if *bytes.get(1 + len)? != terminator {
        return None;
    }
    let mut text = String::new();
    for &byte in body {
        if !(0x20..=0x7e).contains(&byte) {
            return None;
        }
        escape_byte(byte, &mut text);
    }
    let terminated_len = 1 + len + 1;
    let padded_len = terminated_len.div_ceil(4) * 4;
    Some(DecodedString {
        text,
        terminated_len,
        padded_len,
    })
}

/// Whether a successfully-decoded string at the given guesser level and
/// reference count should actually be accepted as a string, per spec.md
/// §4.2's guesser levels (0=off; 1=unique+non-empty; 2=allow duplicates;
/// 3=allow empty; 4=override autodetected type with the guess — that last
/// distinction is consumed by callers when deciding whether to clobber an
/// existing autodetected type, not by this predicate).
#[must_use]
pub fn accepts(level: StringGuesserLevel, decoded: &DecodedString, reference_count: u32) -> bool {
    if level == StringGuesserLevel::Off {
        return false;
    }
    if decoded.text.is_empty() && level < StringGuesserLevel::AllowEmpty {
        return false;
    }
    if reference_count > 1 && level < StringGuesserLevel::AllowDuplicates {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_simple_ascii() {
        let decoded = decode_ascii(b"hi\0\0").unwrap();
        assert_eq!(decoded.text, "hi");
        assert_eq!(decoded.terminated_len, 3);
        assert_eq!(decoded.padded_len, 4);
    }

    #[test]
    fn rejects_missing_terminator() {
        assert!(decode_ascii(b"hi").is_none());
    }

    #[test]
    fn rejects_non_printable_bytes() {
        assert!(decode_ascii(&[0x01, 0x00]).is_none());
    }

    #[test]
    fn pascal_requires_matching_terminator() {
        let bytes = [2u8, b'h', b'i', 0x20];
        let decoded = decode_pascal(&bytes, 0x20).unwrap();
        assert_eq!(decoded.text, "hi");

        let bad = [2u8, b'h', b'i', 0x00];
        assert!(decode_pascal(&bad, 0x20).is_none());
    }

    #[test]
    fn level_gating_matches_spec_scenario() {
        let decoded = decode_ascii(b"hi\0\0").unwrap();
        assert!(accepts(StringGuesserLevel::UniqueNonEmpty, &decoded, 1));
        assert!(!accepts(StringGuesserLevel::Off, &decoded, 1));
        assert!(!accepts(StringGuesserLevel::UniqueNonEmpty, &decoded, 2));
        assert!(accepts(StringGuesserLevel::AllowDuplicates, &decoded, 2));
    }
}
