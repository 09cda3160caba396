// Kopernikus
// Copyright (c) 2026 The Project Kopernikus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `bch` module computes the 19 parity bits protecting each 44-bit block data field.
//!
//! The code is the shortened binary BCH(63,44), able to correct three errors per
//! codeword. Its generator is
//!
//! ```text
//! g(x) = x^19 + x^15 + x^10 + x^9 + x^8 + x^6 + x^4 + 1
//! ```
//!
//! kept here as the 19-bit feedback mask `0x8751` with the leading term implicit. The
//! parity of a data word d is the remainder of `d(x) * x^19` modulo g(x). The first five
//! data bytes run through a 256-entry remainder table; the trailing four bits run through
//! the bitwise feedback loop.

use lazy_static::lazy_static;

/// g(x) less its leading x^19 term.
const FEEDBACK: u32 = 0x8751;

/// Width mask of the 19-bit remainder register.
const REG_MASK: u32 = 0x7_ffff;

/// Most-significant register bit.
const REG_TOP: u32 = 0x4_0000;

lazy_static! {
    /// Remainder contribution of one input byte entering an empty register.
    static ref REMAINDERS: [u32; 256] = {
        let mut table = [0u32; 256];

        for (byte, entry) in table.iter_mut().enumerate() {
            let mut reg = (byte as u32) << 11;

            for _ in 0..8 {
                if reg & REG_TOP != 0 {
                    reg = ((reg << 1) & REG_MASK) ^ FEEDBACK;
                }
                else {
                    reg = (reg << 1) & REG_MASK;
                }
            }

            *entry = reg;
        }

        table
    };
}

/// Computes the 19-bit parity of the low 44 bits of `data`.
pub fn parity(data: u64) -> u32 {
    debug_assert!(data >> 44 == 0);

    let data = data & 0xfff_ffff_ffff;
    let mut reg = 0u32;

    // Five whole bytes cover data bits 43..4.
    for n in 0..5 {
        let byte = ((data >> (36 - 8 * n)) & 0xff) as u32;
        let idx = ((reg >> 11) ^ byte) & 0xff;
        reg = ((reg << 8) & REG_MASK) ^ REMAINDERS[idx as usize];
    }

    // Trailing bits 3..0.
    for n in (0..4).rev() {
        let bit = ((data >> n) & 1) as u32;
        let top = ((reg >> 18) & 1) ^ bit;

        reg = (reg << 1) & REG_MASK;
        if top != 0 {
            reg ^= FEEDBACK;
        }
    }

    reg
}
