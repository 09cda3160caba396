// Kopernikus
// Copyright (c) 2026 The Project Kopernikus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `file` module renders IQ samples or raw stream bytes to a file or standard output.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use log::debug;

use crate::errors::{sink_closed_error, Result};
use crate::sink::OutputFormat;

enum Target {
    File(BufWriter<File>),
    Stdout(io::Stdout),
}

impl Target {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match *self {
            Target::File(ref mut w) => w.write_all(buf),
            Target::Stdout(ref mut w) => w.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match *self {
            Target::File(ref mut w) => w.flush(),
            Target::Stdout(ref mut w) => w.flush(),
        }
    }
}

/// A `FileSink` writes IQ sample pairs in a selectable rendering, or raw stream bytes, to
/// a file. The path `-` selects standard output.
pub struct FileSink {
    target: Target,
    format: OutputFormat,
    stage: Vec<u8>,
    preview_done: bool,
    failed: bool,
}

impl FileSink {
    /// Opens `path` for writing, truncating any existing file. `-` selects stdout.
    pub fn open(path: &str, format: OutputFormat) -> Result<FileSink> {
        let target = if path == "-" {
            Target::Stdout(io::stdout())
        }
        else {
            Target::File(BufWriter::new(File::create(path)?))
        };

        Ok(FileSink { target, format, stage: Vec::new(), preview_done: false, failed: false })
    }

    /// Writes interleaved i16 IQ sample pairs, rendered per the sink's format.
    pub fn write_iq(&mut self, iq: &[i16]) -> Result<()> {
        if self.failed {
            return sink_closed_error();
        }

        self.stage.clear();

        match self.format {
            OutputFormat::Uint8 => {
                for &s in iq {
                    self.stage.push(((i32::from(s) - i32::from(i16::MIN)) >> 8) as u8);
                }
            }
            OutputFormat::Int8 => {
                for &s in iq {
                    self.stage.push((s >> 8) as u8);
                }
            }
            OutputFormat::Uint16 => {
                for &s in iq {
                    let u = (i32::from(s) - i32::from(i16::MIN)) as u16;
                    self.stage.extend_from_slice(&u.to_le_bytes());
                }
            }
            OutputFormat::Int16 | OutputFormat::RawBytes => {
                for &s in iq {
                    self.stage.extend_from_slice(&s.to_le_bytes());
                }
            }
            OutputFormat::Int32 => {
                for &s in iq {
                    let w = (i32::from(s) << 16) + i32::from(s);
                    self.stage.extend_from_slice(&w.to_le_bytes());
                }
            }
            OutputFormat::Float32 => {
                for &s in iq {
                    let f = f32::from(s) / 32767.0;
                    self.stage.extend_from_slice(&f.to_le_bytes());
                }
            }
        }

        if !self.preview_done {
            debug!(
                "file sink: writing {} IQ pairs as {:?}, first bytes {}",
                iq.len() / 2,
                self.format,
                hex_preview(&self.stage)
            );
            self.preview_done = true;
        }

        self.do_write_stage()
    }

    /// Writes raw stream bytes unchanged.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.failed {
            return sink_closed_error();
        }

        if !self.preview_done {
            debug!("file sink: writing raw stream, first bytes {}", hex_preview(bytes));
            self.preview_done = true;
        }

        if let Err(err) = self.target.write_all(bytes) {
            self.failed = true;
            return Err(err.into());
        }

        Ok(())
    }

    /// Flushes buffered output.
    pub fn close(&mut self) -> Result<()> {
        self.target.flush()?;
        Ok(())
    }

    fn do_write_stage(&mut self) -> Result<()> {
        if let Err(err) = self.target.write_all(&self.stage) {
            self.failed = true;
            return Err(err.into());
        }

        Ok(())
    }
}

fn hex_preview(bytes: &[u8]) -> String {
    let mut out = String::new();
    for b in bytes.iter().take(16) {
        out.push_str(&format!("{:02x} ", b));
    }
    if bytes.len() > 16 {
        out.push_str("...");
    }
    out
}
