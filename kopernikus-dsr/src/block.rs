// Kopernikus
// Copyright (c) 2026 The Project Kopernikus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `block` module builds the 77-bit protected block from two stereo sample pairs.
//!
//! A block carries samples l1, r1, l2, r2 of one programme split into an 11-bit
//! most-significant part and a 3-bit tail each, 19 bits of BCH parity over the four
//! 11-bit fields, and two zero-indicator bits:
//!
//! ```text
//! bits  0..43   l1, r1, l2, r2 most-significant parts (4 x 11)
//! bits 44..62   BCH(63,44) parity over bits 0..43
//! bit  63       zi1
//! bit  64       zi2
//! bits 65..76   l1, r1, l2, r2 tails (4 x 3)
//! ```
//!
//! A sample contributes its bits 13..3 to the protected field and bits 2..0 to the tail;
//! the two top bits are not transmitted. The zero indicators are reserved for a
//! scale-factor authority and are emitted clear.

use kopernikus_core::io::BitWriter;

use crate::bch;
use crate::BLOCK_BYTES;

/// One protected block in interchange form; bits 77..79 are zero.
pub type Block = [u8; BLOCK_BYTES];

/// Builds the protected block for the sample pairs (`l1`, `r1`) and (`l2`, `r2`).
pub fn build_block(out: &mut Block, l1: i16, r1: i16, l2: i16, r2: i16) {
    out.fill(0);

    let samples = [l1, r1, l2, r2];
    let heads = samples.map(|s| u32::from(s as u16 >> 3) & 0x7ff);

    let mut data = 0u64;
    for head in heads {
        data = (data << 11) | u64::from(head);
    }

    let mut bw = BitWriter::new(out);

    for head in heads {
        bw.put(head, 11);
    }

    bw.put(bch::parity(data), 19);

    // zi1, zi2.
    bw.put(0, 1);
    bw.put(0, 1);

    for s in samples {
        bw.put(u32::from(s as u16) & 0x7, 3);
    }
}

#[cfg(test)]
mod tests {
    use super::{build_block, Block};
    use crate::bch;

    use kopernikus_core::io::bits::read_bits;

    #[test]
    fn verify_field_layout() {
        let mut block: Block = [0xff; 10];
        build_block(&mut block, 0x1234, 0x5678, 0x1abc, -1);

        assert_eq!(read_bits(&block, 0, 11), (0x1234 >> 3) & 0x7ff);
        assert_eq!(read_bits(&block, 11, 11), (0x5678 >> 3) & 0x7ff);
        assert_eq!(read_bits(&block, 22, 11), (0x1abc >> 3) & 0x7ff);
        assert_eq!(read_bits(&block, 33, 11), 0x7ff);

        assert_eq!(read_bits(&block, 65, 3), 0x1234 & 0x7);
        assert_eq!(read_bits(&block, 68, 3), 0x5678 & 0x7);
        assert_eq!(read_bits(&block, 71, 3), 0x1abc & 0x7);
        assert_eq!(read_bits(&block, 74, 3), 0x7);
    }

    #[test]
    fn verify_parity_field() {
        let mut block: Block = [0; 10];
        build_block(&mut block, 100, -200, 300, -400);

        let data = (u64::from(read_bits(&block, 0, 22)) << 22)
            | u64::from(read_bits(&block, 22, 22));

        assert_eq!(read_bits(&block, 44, 19), bch::parity(data));
    }

    #[test]
    fn verify_indicators_and_padding_clear() {
        let mut block: Block = [0xff; 10];
        build_block(&mut block, -1, -1, -1, -1);

        assert_eq!(read_bits(&block, 63, 1), 0);
        assert_eq!(read_bits(&block, 64, 1), 0);

        // Interchange padding past bit 76.
        assert_eq!(block[9] & 0x07, 0);
    }

    #[test]
    fn verify_silence_block() {
        let mut block: Block = [0; 10];
        build_block(&mut block, 0, 0, 0, 0);
        assert_eq!(block, [0; 10]);
    }
}
