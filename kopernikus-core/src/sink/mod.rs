// Kopernikus
// Copyright (c) 2026 The Project Kopernikus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `sink` module implements the output back-ends the encoded stream is rendered to.
//!
//! A sink accepts either interleaved i16 IQ sample pairs or raw bytes, and never feeds
//! anything back into the encoder; the encoded stream is byte-identical no matter which
//! sink is selected.

pub mod file;
pub mod udp;

pub use file::FileSink;
pub use udp::UdpSink;

use std::str::FromStr;

use crate::errors::{Error, Result};

/// The sample renderings supported by the file sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Unsigned 8-bit IQ, offset binary.
    Uint8,
    /// Signed 8-bit IQ.
    Int8,
    /// Unsigned 16-bit IQ, offset binary, little-endian.
    Uint16,
    /// Signed 16-bit IQ, little-endian.
    Int16,
    /// Signed 32-bit IQ with the 16-bit sample replicated into the low half, little-endian.
    Int32,
    /// 32-bit float IQ scaled to ±1.0, little-endian.
    Float32,
    /// Unmodulated stream bytes, written unchanged.
    RawBytes,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<OutputFormat> {
        match s {
            "uint8" => Ok(OutputFormat::Uint8),
            "int8" => Ok(OutputFormat::Int8),
            "uint16" => Ok(OutputFormat::Uint16),
            "int16" => Ok(OutputFormat::Int16),
            "int32" => Ok(OutputFormat::Int32),
            "float32" => Ok(OutputFormat::Float32),
            "raw" => Ok(OutputFormat::RawBytes),
            _ => Err(Error::ConfigError("unrecognised output format")),
        }
    }
}

/// An open output, file or UDP. Dispatch is by variant; both variants honour the same
/// write and close contract.
pub enum Output {
    File(FileSink),
    Udp(UdpSink),
}

impl Output {
    /// Writes interleaved i16 IQ sample pairs.
    pub fn write_iq(&mut self, iq: &[i16]) -> Result<()> {
        match *self {
            Output::File(ref mut sink) => sink.write_iq(iq),
            Output::Udp(ref mut sink) => sink.write_iq(iq),
        }
    }

    /// Writes raw stream bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        match *self {
            Output::File(ref mut sink) => sink.write_bytes(bytes),
            Output::Udp(ref mut sink) => sink.write_bytes(bytes),
        }
    }

    /// Flushes and releases the output.
    pub fn close(&mut self) -> Result<()> {
        match *self {
            Output::File(ref mut sink) => sink.close(),
            Output::Udp(ref mut sink) => sink.close(),
        }
    }
}
