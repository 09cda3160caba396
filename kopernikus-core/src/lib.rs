// Kopernikus
// Copyright (c) 2026 The Project Kopernikus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared infrastructure for Project Kopernikus: the common error type, bit-level I/O
//! primitives, trace-flag configuration, the QPSK shaping modulator, and the output sinks
//! used to render or transmit the encoded stream.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]
// The following lints are allowed in all Kopernikus crates. Please see the workspace
// Cargo.toml for their justification.
#![allow(clippy::identity_op)]
#![allow(clippy::manual_range_contains)]

pub mod dsp;
pub mod errors;
pub mod io;
pub mod sink;
pub mod trace;
