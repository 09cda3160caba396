// Kopernikus
// Copyright (c) 2026 The Project Kopernikus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `encoder` module drives the full multiplex: blocks, interleaving, framing, and
//! energy dispersal for all 32 channels.

use std::collections::VecDeque;

use log::trace;

use kopernikus_core::trace::TraceFlags;

use crate::block::{build_block, Block};
use crate::frame::{assemble_frame, FramePhase};
use crate::{
    AUDIO_SAMPLES, BLOCK_BYTES, ENCODED_BYTES, FRAMES_PER_SLOT, FRAME_BYTES,
    PAIRS_PER_FRAME, SAMPLES_PER_CHANNEL,
};

/// The multiplex encoder.
///
/// Each [`encode`](DsrEncoder::encode) call consumes one 2 ms audio block for all
/// channels and emits the 128 frames covering it. A frame carries four stereo pairs (two
/// per interleaved half), so four consecutive frames carry one sample slot of all 16
/// pairs:
///
/// ```text
/// frame 4k + g  (slot k in 0..32, group g in 0..4)
///     half A:  stereo pairs 4g + 0, 4g + 1
///     half B:  stereo pairs 4g + 2, 4g + 3
/// ```
///
/// Stereo pair p is the channel pair (2p, 2p + 1); a block holds its samples 2k and
/// 2k + 1. The alignment-word phase alternates every frame across the whole stream.
pub struct DsrEncoder {
    phase: FramePhase,
    service_bits: VecDeque<bool>,
    trace: TraceFlags,
}

impl DsrEncoder {
    /// Instantiates an encoder at the start of the frame sequence.
    pub fn new() -> DsrEncoder {
        DsrEncoder::with_trace(TraceFlags::empty())
    }

    /// Instantiates an encoder that emits the selected diagnostic traces.
    pub fn with_trace(trace: TraceFlags) -> DsrEncoder {
        DsrEncoder { phase: FramePhase::A, service_bits: VecDeque::new(), trace }
    }

    /// Queues one externally supplied SA service bit. Each frame consumes one queued bit;
    /// frames with no queued bit transmit 0.
    pub fn queue_service_bit(&mut self, bit: bool) {
        self.service_bits.push_back(bit);
    }

    /// Encodes one audio block of [`AUDIO_SAMPLES`] channel-major samples into
    /// [`ENCODED_BYTES`] bytes of multiplex.
    pub fn encode(&mut self, out: &mut [u8], audio: &[i16]) {
        assert_eq!(out.len(), ENCODED_BYTES);
        assert_eq!(audio.len(), AUDIO_SAMPLES);

        for slot in 0..SAMPLES_PER_CHANNEL / 2 {
            for group in 0..FRAMES_PER_SLOT {
                let mut blocks = [[0u8; BLOCK_BYTES]; PAIRS_PER_FRAME];

                for (b, block) in blocks.iter_mut().enumerate() {
                    let pair = PAIRS_PER_FRAME * group + b;
                    let left = 2 * pair * SAMPLES_PER_CHANNEL;
                    let right = (2 * pair + 1) * SAMPLES_PER_CHANNEL;

                    build_block(
                        block,
                        audio[left + 2 * slot],
                        audio[right + 2 * slot],
                        audio[left + 2 * slot + 1],
                        audio[right + 2 * slot + 1],
                    );
                }

                let index = slot * FRAMES_PER_SLOT + group;
                let sa = self.service_bits.pop_front().unwrap_or(false);

                if self.trace.contains(TraceFlags::BLOCKS) && index == 0 {
                    trace!("block 0: {:02x?}", blocks[0]);
                }

                let half_a: [Block; 2] = [blocks[0], blocks[1]];
                let half_b: [Block; 2] = [blocks[2], blocks[3]];

                let frame = &mut out[index * FRAME_BYTES..(index + 1) * FRAME_BYTES];
                assemble_frame(frame, &half_a, &half_b, self.phase, sa);

                if self.trace.contains(TraceFlags::FRAMES) && index < 2 {
                    trace!(
                        "frame {}: sync {:#05x}, sa {}",
                        index,
                        self.phase.sync_word(),
                        u8::from(sa)
                    );
                }

                self.phase = self.phase.toggled();
            }
        }
    }
}

impl Default for DsrEncoder {
    fn default() -> DsrEncoder {
        DsrEncoder::new()
    }
}
