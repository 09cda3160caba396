// Kopernikus
// Copyright (c) 2026 The Project Kopernikus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `ps` module codes the eight-character Programme Service label.
//!
//! The label alphabet is a 64-symbol set covering space, punctuation, digits, and the
//! uppercase letters; each character is a 6-bit code packed most-significant bit first
//! into six bytes. Lowercase ASCII letters fold to their uppercase codes; any other
//! character outside the alphabet takes the replacement code (space). Coding never fails.

use kopernikus_core::io::bits::{write_bits, BitReader};

/// Characters per label.
pub const PS_CHARS: usize = 8;

/// Packed size of a label in bytes.
pub const PS_BYTES: usize = 6;

/// Code emitted for characters outside the alphabet.
const REPLACEMENT: u32 = 0;

/// Maps one character to its 6-bit code.
fn char_code(c: char) -> u32 {
    let c = c.to_ascii_uppercase();
    let v = c as u32;

    // The alphabet is the 64 ASCII symbols from space through underscore.
    if v >= 0x20 && v < 0x60 {
        v - 0x20
    }
    else {
        REPLACEMENT
    }
}

/// Encodes up to eight characters of `text` into a packed label field. Short input is
/// padded with spaces.
pub fn encode_ps(text: &str) -> [u8; PS_BYTES] {
    let mut out = [0u8; PS_BYTES];
    let mut chars = text.chars();

    for i in 0..PS_CHARS {
        let code = chars.next().map_or(REPLACEMENT, char_code);
        write_bits(&mut out, 6 * i, code, 6);
    }

    out
}

/// Decodes a packed label field into its eight characters, trailing spaces retained.
pub fn decode_ps(src: &[u8; PS_BYTES]) -> String {
    let mut br = BitReader::new(src);
    (0..PS_CHARS).map(|_| char::from(0x20 + br.get(6) as u8)).collect()
}

#[cfg(test)]
mod tests {
    use super::{decode_ps, encode_ps};

    #[test]
    fn verify_packing() {
        // 'A' is code 0x21; six bits of 100001 land in the top of byte 0, and the space
        // padding is all zeros.
        assert_eq!(encode_ps("A"), [0x84, 0x00, 0x00, 0x00, 0x00, 0x00]);

        // All-ones codes pack to all-ones bytes.
        assert_eq!(encode_ps("________"), [0xff; 6]);
    }

    #[test]
    fn verify_round_trip() {
        assert_eq!(decode_ps(&encode_ps("HELLO")), "HELLO   ");
        assert_eq!(decode_ps(&encode_ps("KOPERNIK")), "KOPERNIK");
        assert_eq!(decode_ps(&encode_ps("DLF 1")), "DLF 1   ");
        assert_eq!(decode_ps(&encode_ps("")), "        ");
    }

    #[test]
    fn verify_case_folding() {
        assert_eq!(decode_ps(&encode_ps("Radio")), "RADIO   ");
        assert_eq!(decode_ps(&encode_ps("Test123")), "TEST123 ");
    }

    #[test]
    fn verify_replacement() {
        // Characters outside the alphabet come back as spaces.
        assert_eq!(decode_ps(&encode_ps("A{B}C~D")), "A B C D ");
        assert_eq!(decode_ps(&encode_ps("RÁDIO")), "R DIO   ");
    }

    #[test]
    fn verify_overlong_input_truncates() {
        assert_eq!(decode_ps(&encode_ps("PROGRAMME ONE")), "PROGRAMM");
    }

    #[test]
    fn verify_full_alphabet() {
        for v in 0x20u8..0x60 {
            let c = char::from(v);
            let decoded = decode_ps(&encode_ps(&c.to_string()));
            assert_eq!(decoded.chars().next().unwrap(), c);
        }
    }
}
