// Kopernikus
// Copyright (c) 2026 The Project Kopernikus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `trace` module defines the diagnostic trace-flag bitfield.
//!
//! Trace flags are plain configuration data owned by the application and handed to the
//! components that honour them. Components emit their diagnostics through the `log`
//! facade only when the matching flag is set; with no flags set the encoder is silent.

use bitflags::bitflags;

bitflags! {
    /// Selects which encoder stages emit diagnostic trace output.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TraceFlags: u32 {
        /// Bit-level field writes.
        const BITS = 0x0001;
        /// Block-pair interleaving.
        const INTERLEAVE = 0x0002;
        /// Energy-dispersal sequence generation.
        const PRBS = 0x0004;
        /// Parity computation.
        const BCH = 0x0008;
        /// Protected 77-bit blocks.
        const BLOCKS = 0x0010;
        /// Frame structure and sync alternation.
        const FRAMES = 0x0020;
        /// Programme Service label coding.
        const PS = 0x0040;
    }
}

impl TraceFlags {
    /// Parses a comma-separated flag list, e.g. `"frames,blocks"`. The names `none` and
    /// `all` are accepted. Unknown names are ignored.
    pub fn from_list(list: &str) -> TraceFlags {
        let mut flags = TraceFlags::empty();

        for name in list.split(',') {
            match name.trim().to_ascii_lowercase().as_str() {
                "bits" => flags |= TraceFlags::BITS,
                "interleave" => flags |= TraceFlags::INTERLEAVE,
                "prbs" => flags |= TraceFlags::PRBS,
                "bch" => flags |= TraceFlags::BCH,
                "blocks" => flags |= TraceFlags::BLOCKS,
                "frames" => flags |= TraceFlags::FRAMES,
                "ps" => flags |= TraceFlags::PS,
                "all" => flags |= TraceFlags::all(),
                _ => (),
            }
        }

        flags
    }
}

#[cfg(test)]
mod tests {
    use super::TraceFlags;

    #[test]
    fn verify_from_list() {
        assert_eq!(TraceFlags::from_list(""), TraceFlags::empty());
        assert_eq!(TraceFlags::from_list("none"), TraceFlags::empty());
        assert_eq!(TraceFlags::from_list("frames"), TraceFlags::FRAMES);
        assert_eq!(
            TraceFlags::from_list("frames, blocks"),
            TraceFlags::FRAMES | TraceFlags::BLOCKS
        );
        assert_eq!(TraceFlags::from_list("all"), TraceFlags::all());
        assert_eq!(TraceFlags::from_list("bogus"), TraceFlags::empty());
    }
}
