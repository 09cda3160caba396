// Kopernikus
// Copyright (c) 2026 The Project Kopernikus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{self, Read};

use clap::{App, Arg, ArgMatches};
use log::{error, info, warn};

use kopernikus_core::dsp::qpsk::QpskModulator;
use kopernikus_core::errors::{Error, Result};
use kopernikus_core::sink::udp::parse_target;
use kopernikus_core::sink::{FileSink, Output, OutputFormat, UdpSink};
use kopernikus_core::trace::TraceFlags;
use kopernikus_dsr::{ps, DsrEncoder, AUDIO_SAMPLES, BIT_RATE, ENCODED_BYTES};

fn main() {
    pretty_env_logger::init();

    let matches = App::new("Kopernikus Transmitter")
        .version("0.2")
        .about("Encode a 16-programme DSR multiplex to a file or a paced UDP stream")
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("PATH")
                .takes_value(true)
                .default_value("-")
                .help("Output file, - for stdout, or host:port / udp://host:port with --format udp"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .value_name("FORMAT")
                .takes_value(true)
                .default_value("int16")
                .help("uint8, int8, uint16, int16, int32, float32 (modulated IQ); raw or udp (stream bytes)"),
        )
        .arg(
            Arg::new("interpolation")
                .long("interpolation")
                .value_name("N")
                .takes_value(true)
                .default_value("2")
                .help("IQ samples per QPSK symbol"),
        )
        .arg(
            Arg::new("level")
                .long("level")
                .value_name("LEVEL")
                .takes_value(true)
                .default_value("0.8")
                .help("Peak output amplitude relative to full scale, in (0, 1]"),
        )
        .arg(
            Arg::new("udp-payload")
                .long("udp-payload")
                .value_name("BYTES")
                .takes_value(true)
                .default_value("1400")
                .help("UDP datagram payload size"),
        )
        .arg(
            Arg::new("udp-bitrate")
                .long("udp-bitrate")
                .value_name("BPS")
                .takes_value(true)
                .default_value("20480000")
                .help("UDP pacing rate in bits per second, 0 to disable pacing"),
        )
        .arg(
            Arg::new("test-blocks")
                .long("test-blocks")
                .value_name("N")
                .takes_value(true)
                .help("Generate N blocks of deterministic test audio instead of reading input"),
        )
        .arg(
            Arg::new("ps")
                .long("ps")
                .value_name("LABEL")
                .takes_value(true)
                .help("Programme Service label (8 characters)"),
        )
        .arg(
            Arg::new("trace")
                .long("trace")
                .value_name("FLAGS")
                .takes_value(true)
                .help("Diagnostic traces: bits, interleave, prbs, bch, blocks, frames, ps, all"),
        )
        .arg(
            Arg::new("INPUT")
                .help("Raw PCM input (32 channels x 64 samples i16le, channel-major), - for stdin")
                .index(1),
        )
        .get_matches();

    if let Err(err) = run(&matches) {
        error!("{}", err);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let trace = matches.value_of("trace").map_or(TraceFlags::empty(), TraceFlags::from_list);

    if let Some(label) = matches.value_of("ps") {
        let field = ps::encode_ps(label);

        if trace.contains(TraceFlags::PS) {
            info!("programme service field: {:02x?}", field);
        }
        info!("programme service label: {:?}", ps::decode_ps(&field));
    }

    let format_name = matches.value_of("format").unwrap();
    let target = matches.value_of("output").unwrap();

    let mut output = open_output(format_name, target, matches)?;

    // All IQ renderings are modulated; raw and udp carry the stream bytes unchanged.
    let mut qpsk = match format_name {
        "raw" | "udp" => None,
        _ => {
            let interpolation = parse_num::<usize>(matches, "interpolation")?;
            let level = matches
                .value_of("level")
                .unwrap()
                .parse::<f64>()
                .map_err(|_| Error::ConfigError("level is not a number"))?;

            Some(QpskModulator::new(interpolation, level)?)
        }
    };

    let mut source = open_source(matches)?;

    let mut encoder = DsrEncoder::with_trace(trace);
    let mut audio = vec![0i16; AUDIO_SAMPLES];
    let mut encoded = vec![0u8; ENCODED_BYTES];
    let mut iq: Vec<i16> = Vec::new();

    let mut blocks = 0u64;

    while source.next_block(&mut audio)? {
        encoder.encode(&mut encoded, &audio);

        match qpsk {
            Some(ref mut qpsk) => {
                iq.clear();
                qpsk.modulate(&mut iq, &encoded, 8 * ENCODED_BYTES);
                output.write_iq(&iq)?;
            }
            None => output.write_bytes(&encoded)?,
        }

        blocks += 1;
    }

    output.close()?;

    info!(
        "encoded {} blocks ({} ms of audio, {} bytes of multiplex)",
        blocks,
        2 * blocks,
        blocks * ENCODED_BYTES as u64
    );

    Ok(())
}

fn open_output(format_name: &str, target: &str, matches: &ArgMatches) -> Result<Output> {
    if format_name == "udp" {
        let (host, port) = parse_target(target)?;

        let mut sink = UdpSink::open(host, port, parse_num::<usize>(matches, "udp-payload")?)?;

        let bitrate = parse_num::<u64>(matches, "udp-bitrate")?;
        sink.set_bitrate(bitrate);

        if bitrate > 0 && bitrate < u64::from(BIT_RATE) {
            warn!("pacing below the multiplex rate of {} bit/s will fall behind", BIT_RATE);
        }

        return Ok(Output::Udp(sink));
    }

    let format = format_name.parse::<OutputFormat>()?;
    Ok(Output::File(FileSink::open(target, format)?))
}

enum Source {
    Reader(Box<dyn Read>),
    /// Deterministic generator state: blocks remaining, next block number.
    Test(u64, u32),
}

impl Source {
    /// Fills `audio` with the next block. Returns false when the source is exhausted.
    fn next_block(&mut self, audio: &mut [i16]) -> Result<bool> {
        match *self {
            Source::Reader(ref mut reader) => read_audio_block(reader.as_mut(), audio),
            Source::Test(ref mut remaining, ref mut block) => {
                if *remaining == 0 {
                    return Ok(false);
                }

                generate_test_audio(audio, *block);
                *remaining -= 1;
                *block = block.wrapping_add(1);

                Ok(true)
            }
        }
    }
}

fn open_source(matches: &ArgMatches) -> Result<Source> {
    if let Some(n) = matches.value_of("test-blocks") {
        let n = n.parse::<u64>().map_err(|_| Error::ConfigError("test-blocks is not a number"))?;
        return Ok(Source::Test(n, 0));
    }

    match matches.value_of("INPUT") {
        Some("-") | None => Ok(Source::Reader(Box::new(io::stdin()))),
        Some(path) => Ok(Source::Reader(Box::new(File::open(path)?))),
    }
}

fn read_audio_block(reader: &mut dyn Read, audio: &mut [i16]) -> Result<bool> {
    let mut bytes = vec![0u8; 2 * audio.len()];
    let mut filled = 0;

    while filled < bytes.len() {
        match reader.read(&mut bytes[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }

    if filled == 0 {
        return Ok(false);
    }

    if filled < bytes.len() {
        warn!("dropping {} trailing bytes of partial audio block", filled);
        return Ok(false);
    }

    for (sample, pair) in audio.iter_mut().zip(bytes.chunks_exact(2)) {
        *sample = i16::from_le_bytes([pair[0], pair[1]]);
    }

    Ok(true)
}

/// Fills one audio block with reproducible pseudo-random samples for loopback testing.
fn generate_test_audio(audio: &mut [i16], block: u32) {
    let mut seed = 0x1234_5678u32.wrapping_add(block);

    for sample in audio.iter_mut() {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        *sample = (seed >> 16) as i16;
    }
}

fn parse_num<T: std::str::FromStr>(matches: &ArgMatches, name: &'static str) -> Result<T> {
    matches
        .value_of(name)
        .unwrap()
        .parse::<T>()
        .map_err(|_| Error::ConfigError("argument is not a valid number"))
}
