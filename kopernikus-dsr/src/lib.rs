// Kopernikus
// Copyright (c) 2026 The Project Kopernikus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A bit-exact encoder for the DSR (Digitales Satellitenradio) baseband multiplex.
//!
//! DSR carries 16 stereo programmes (32 mono channels) of 32 kHz PCM audio in a
//! 20.48 Mbit/s stream of 320-bit frames. Every frame starts with an 11-bit alignment
//! word and a service bit, followed by two halves of 154 bits, each the bit-interleaved
//! combination of two 77-bit blocks. A block protects two consecutive stereo sample pairs
//! of one programme with 19 bits of BCH(63,44) parity. Everything after the alignment
//! word is masked with a short PRBS for energy dispersal.
//!
//! [`DsrEncoder`] is the entry point: each call consumes 2 ms of audio for all channels
//! and produces the corresponding 128 frames of the multiplex.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]
// The following lints are allowed in all Kopernikus crates. Please see the workspace
// Cargo.toml for their justification.
#![allow(clippy::identity_op)]
#![allow(clippy::manual_range_contains)]

pub mod bch;
pub mod block;
pub mod encoder;
pub mod frame;
pub mod interleave;
pub mod prbs;
pub mod ps;

pub use encoder::DsrEncoder;
pub use frame::FramePhase;

/// Number of mono audio channels in the multiplex.
pub const CHANNELS: usize = 32;

/// Audio samples consumed per channel per [`DsrEncoder::encode`] call (2 ms at 32 kHz).
pub const SAMPLES_PER_CHANNEL: usize = 64;

/// Total audio samples consumed per encode call, all channels, channel-major.
pub const AUDIO_SAMPLES: usize = CHANNELS * SAMPLES_PER_CHANNEL;

/// Audio sample rate in Hz.
pub const AUDIO_RATE: u32 = 32_000;

/// Meaningful bits in a protected block.
pub const BLOCK_BITS: usize = 77;

/// Interchange size of a protected block; bits 77..79 are zero padding.
pub const BLOCK_BYTES: usize = 10;

/// Bits per frame.
pub const FRAME_BITS: usize = 320;

/// Bytes per frame.
pub const FRAME_BYTES: usize = 40;

/// Stereo pairs carried by one frame (two per interleaved half).
pub const PAIRS_PER_FRAME: usize = 4;

/// Frames needed to carry one sample slot of all 16 stereo pairs.
pub const FRAMES_PER_SLOT: usize = 4;

/// Frames emitted per encode call.
pub const FRAMES_PER_CALL: usize = (SAMPLES_PER_CHANNEL / 2) * FRAMES_PER_SLOT;

/// Bytes emitted per encode call.
pub const ENCODED_BYTES: usize = FRAMES_PER_CALL * FRAME_BYTES;

/// Frame alignment word of the first frame of a superframe.
pub const SYNC_WORD: u16 = 0x712;

/// Frame alignment word of the second frame of a superframe; the 11-bit complement.
pub const SYNC_WORD_INV: u16 = !SYNC_WORD & 0x7ff;

/// Aggregate multiplex bit rate in bits per second.
pub const BIT_RATE: u32 = 20_480_000;

/// QPSK symbol rate in symbols per second.
pub const SYMBOL_RATE: u32 = BIT_RATE / 2;
