// Kopernikus
// Copyright (c) 2026 The Project Kopernikus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `qpsk` module implements a differentially coded QPSK modulator with an
//! interpolating root-raised-cosine pulse-shaping filter.
//!
//! Bit pairs select a phase rotation relative to the previously transmitted symbol, so a
//! receiver can recover the stream without an absolute phase reference. For every symbol
//! the modulator produces `interpolation` interleaved I/Q sample pairs, quantised to i16.

use std::f64::consts::{FRAC_1_SQRT_2, PI, SQRT_2};

use crate::errors::{config_error, Result};

/// Symbol span of the pulse shape, in symbol periods.
const SPAN: usize = 16;

/// Root-raised-cosine roll-off factor.
const ROLL_OFF: f64 = 0.35;

/// Phase rotation, in quarter turns, selected by each Gray-coded bit pair.
///
/// 00 advances 0°, 01 advances 90°, 11 advances 180°, 10 advances 270°.
const ROTATION: [u8; 4] = [0, 1, 3, 2];

/// I and Q polarity of each of the four constellation points, counter-clockwise from 45°.
const CONSTELLATION: [(i32, i32); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

/// Window slot value indicating that no symbol has been transmitted yet.
const EMPTY: u8 = 4;

/// Advances the differential symbol accumulator by the rotation encoded in `dibit`.
#[inline]
fn advance_symbol(sym: u8, dibit: u8) -> u8 {
    (sym + ROTATION[usize::from(dibit)]) & 0x3
}

/// Evaluates the root-raised-cosine impulse response at `t` symbol periods from the pulse
/// centre.
fn rrc(t: f64, beta: f64) -> f64 {
    if t == 0.0 {
        return 1.0 - beta + 4.0 * beta / PI;
    }

    let denom = 1.0 - (4.0 * beta * t) * (4.0 * beta * t);

    // At t = ±1/(4β) the generic expression is 0/0; take the analytic limit.
    if denom.abs() < 1e-9 {
        return (beta / SQRT_2)
            * ((1.0 + 2.0 / PI) * (PI / (4.0 * beta)).sin()
                + (1.0 - 2.0 / PI) * (PI / (4.0 * beta)).cos());
    }

    ((PI * t * (1.0 - beta)).sin() + 4.0 * beta * t * (PI * t * (1.0 + beta)).cos())
        / (PI * t * denom)
}

/// A differential QPSK modulator producing interpolated i16 IQ sample pairs.
pub struct QpskModulator {
    interpolation: usize,
    /// Per-constellation-point tap sets, interleaved I/Q, `2 * SPAN * interpolation` each.
    taps: [Vec<i16>; 4],
    /// Ring of the last `SPAN` transmitted symbols; `EMPTY` marks unfilled slots.
    window: Vec<u8>,
    winx: usize,
    /// Differential symbol accumulator.
    sym: u8,
}

impl QpskModulator {
    /// Instantiates a modulator emitting `interpolation` IQ pairs per symbol, with a peak
    /// amplitude of `level` relative to i16 full scale. `interpolation` must be at least 1
    /// and `level` must lie in (0, 1].
    pub fn new(interpolation: usize, level: f64) -> Result<QpskModulator> {
        if interpolation < 1 {
            return config_error("qpsk: interpolation must be at least 1");
        }
        if !(level > 0.0 && level <= 1.0) {
            return config_error("qpsk: level must be in (0, 1]");
        }

        let ntaps = SPAN * interpolation;
        let centre = (ntaps / 2) as f64;

        let mut shape = vec![0f64; ntaps];
        for (k, tap) in shape.iter_mut().enumerate() {
            let t = (k as f64 - centre) / interpolation as f64;
            *tap = rrc(t, ROLL_OFF);
        }

        // Scale so the worst-case symbol-spaced sum cannot exceed the target amplitude.
        // An output sample at sub-sample phase u sums one tap per symbol period,
        // `interpolation` apart, starting at u.
        let mut worst = 0f64;
        for u in 0..interpolation {
            let sum: f64 = shape.iter().skip(u).step_by(interpolation).map(|t| t.abs()).sum();
            worst = worst.max(sum);
        }

        let amp = level * 32767.0 * FRAC_1_SQRT_2 / worst;

        let taps = [0, 1, 2, 3].map(|s: usize| {
            let (i_pol, q_pol) = CONSTELLATION[s];
            let mut set = Vec::with_capacity(2 * ntaps);
            for tap in &shape {
                set.push((tap * amp * i_pol as f64).round() as i16);
                set.push((tap * amp * q_pol as f64).round() as i16);
            }
            set
        });

        Ok(QpskModulator {
            interpolation,
            taps,
            window: vec![EMPTY; SPAN],
            winx: 0,
            sym: 0,
        })
    }

    /// The number of IQ pairs produced per input symbol.
    pub fn interpolation(&self) -> usize {
        self.interpolation
    }

    /// Modulates `nbits` bits of `src`, most-significant bit first, appending interleaved
    /// i16 IQ pairs to `dst`. Returns the number of IQ pairs produced, which is always
    /// `(nbits / 2) * interpolation`.
    ///
    /// `nbits` must be even and no larger than the bits available in `src`.
    pub fn modulate(&mut self, dst: &mut Vec<i16>, src: &[u8], nbits: usize) -> usize {
        assert!(nbits % 2 == 0);
        assert!(nbits <= 8 * src.len());

        let nsyms = nbits / 2;
        dst.reserve(2 * nsyms * self.interpolation);

        for n in 0..nsyms {
            let byte = src[n >> 2];
            let dibit = (byte >> (6 - 2 * (n & 0x3))) & 0x3;

            self.sym = advance_symbol(self.sym, dibit);

            self.winx = (self.winx + 1) % SPAN;
            self.window[self.winx] = self.sym;

            for u in 0..self.interpolation {
                let mut i = 0i32;
                let mut q = 0i32;

                for j in 0..SPAN {
                    let s = self.window[(self.winx + SPAN - j) % SPAN];
                    if s == EMPTY {
                        continue;
                    }

                    let idx = 2 * (j * self.interpolation + u);
                    let set = &self.taps[usize::from(s)];
                    i += i32::from(set[idx]);
                    q += i32::from(set[idx + 1]);
                }

                dst.push(i as i16);
                dst.push(q as i16);
            }
        }

        nsyms * self.interpolation
    }
}

#[cfg(test)]
mod tests {
    use super::{advance_symbol, QpskModulator, ROTATION, SPAN};

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn verify_gray_rotations() {
        // 00 holds phase, 01/11/10 advance by one, two, and three quarter turns.
        assert_eq!(ROTATION[0b00], 0);
        assert_eq!(ROTATION[0b01], 1);
        assert_eq!(ROTATION[0b11], 2);
        assert_eq!(ROTATION[0b10], 3);
    }

    #[test]
    fn verify_differential_invariance() {
        // A constant rotation of the starting symbol commutes with every transition, so a
        // receiver without an absolute phase reference sees the same rotation sequence.
        for sym in 0..4u8 {
            for dibit in 0..4u8 {
                for rot in 0..4u8 {
                    let a = advance_symbol((sym + rot) & 0x3, dibit);
                    let b = (advance_symbol(sym, dibit) + rot) & 0x3;
                    assert_eq!(a, b);
                }
            }
        }
    }

    #[test]
    fn verify_sample_count() {
        let mut rng = SmallRng::seed_from_u64(0x5150);

        for &interpolation in &[1usize, 2, 4, 7] {
            let mut qpsk = QpskModulator::new(interpolation, 0.8).unwrap();

            let src: Vec<u8> = (0..40).map(|_| rng.random()).collect();
            let mut dst = Vec::new();

            let pairs = qpsk.modulate(&mut dst, &src, 8 * src.len());
            assert_eq!(pairs, (8 * src.len() / 2) * interpolation);
            assert_eq!(dst.len(), 2 * pairs);
        }
    }

    #[test]
    fn verify_amplitude_bound() {
        let mut rng = SmallRng::seed_from_u64(0xf11);

        for &level in &[1.0f64, 0.5, 0.1] {
            let mut qpsk = QpskModulator::new(4, level).unwrap();

            let src: Vec<u8> = (0..512).map(|_| rng.random()).collect();
            let mut dst = Vec::new();
            qpsk.modulate(&mut dst, &src, 8 * src.len());

            let bound = (level * 32767.0) as i32;
            for &s in &dst {
                assert!(i32::from(s).abs() <= bound);
            }
        }
    }

    #[test]
    fn verify_impulse_shape() {
        // The first symbol rides an otherwise empty window, so the leading output samples
        // are exactly the head of the pulse shape for that constellation point.
        let interpolation = 4;
        let mut qpsk = QpskModulator::new(interpolation, 0.8).unwrap();

        let expected: Vec<i16> = qpsk.taps[0][..2 * interpolation].to_vec();

        let mut dst = Vec::new();
        qpsk.modulate(&mut dst, &[0x00], 2);

        assert_eq!(dst, expected);
    }

    #[test]
    fn verify_rejects_bad_config() {
        assert!(QpskModulator::new(0, 0.8).is_err());
        assert!(QpskModulator::new(2, 0.0).is_err());
        assert!(QpskModulator::new(2, 1.5).is_err());
    }

    #[test]
    fn verify_determinism() {
        let mut rng = SmallRng::seed_from_u64(0xd5f);
        let src: Vec<u8> = (0..SPAN * 8).map(|_| rng.random()).collect();

        let mut a = Vec::new();
        let mut b = Vec::new();

        QpskModulator::new(2, 0.8).unwrap().modulate(&mut a, &src, 8 * src.len());
        QpskModulator::new(2, 0.8).unwrap().modulate(&mut b, &src, 8 * src.len());

        assert_eq!(a, b);
    }
}
