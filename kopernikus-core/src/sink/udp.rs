// Kopernikus
// Copyright (c) 2026 The Project Kopernikus Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `udp` module transmits the raw stream as connected UDP datagrams, optionally
//! metered by a token bucket.
//!
//! Datagrams carry at most the configured payload size; there is no framing, sequencing,
//! or retransmission. Pacing changes only the emission timing, never the bytes.

use std::cmp::min;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use socket2::{Domain, Protocol, Socket, Type};

use crate::errors::{config_error, sink_closed_error, Error, Result};

/// Default datagram payload size in bytes.
pub const DEFAULT_PAYLOAD: usize = 1400;

/// Payload sizes at or above this are rejected.
const MAX_PAYLOAD: usize = 9000;

/// Bucket capacity, in payloads.
const BUCKET_PAYLOADS: usize = 6;

/// Requested kernel send buffer size; the OS default falls behind at the sustained
/// multiplex line rate.
const SEND_BUFFER: usize = 1 << 20;

/// A `UdpSink` owns one connected datagram socket and its pacing state.
pub struct UdpSink {
    socket: Option<UdpSocket>,
    payload: usize,
    /// Pacing rate in bits per second; 0 disables pacing.
    bitrate_bps: u64,
    /// Token bucket fill, in bytes.
    tokens: f64,
    last_refill: Instant,
    preview_done: bool,
    failed: bool,
}

fn connect_socket(addr: SocketAddr) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;

    // Request a large send buffer; best effort, as in-kernel limits may cap it.
    let _ = socket.set_send_buffer_size(SEND_BUFFER);

    let bind = match addr {
        SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    };

    socket.bind(&bind.into())?;
    socket.connect(&addr.into())?;

    Ok(socket.into())
}

impl UdpSink {
    /// Resolves `host`:`port` and connects a datagram socket to the first usable address.
    /// `payload` outside [1, 9000) falls back to the default of 1400 bytes.
    pub fn open(host: &str, port: u16, payload: usize) -> Result<UdpSink> {
        let payload =
            if payload >= 1 && payload < MAX_PAYLOAD { payload } else { DEFAULT_PAYLOAD };

        let mut last_err: Option<Error> = None;

        for addr in (host, port).to_socket_addrs()? {
            match connect_socket(addr) {
                Ok(socket) => {
                    debug!("udp sink: connected to {}", addr);

                    return Ok(UdpSink {
                        socket: Some(socket),
                        payload,
                        bitrate_bps: 0,
                        tokens: 0.0,
                        last_refill: Instant::now(),
                        preview_done: false,
                        failed: false,
                    });
                }
                Err(err) => last_err = Some(err.into()),
            }
        }

        match last_err {
            Some(err) => Err(err),
            None => config_error("udp: target resolved to no addresses"),
        }
    }

    /// Sets the pacing rate in bits per second and resets the bucket. 0 disables pacing.
    pub fn set_bitrate(&mut self, bps: u64) {
        self.bitrate_bps = bps;
        self.tokens = 0.0;
        self.last_refill = Instant::now();
    }

    /// The effective datagram payload size.
    pub fn payload(&self) -> usize {
        self.payload
    }

    /// Sends `data` as a sequence of datagrams of at most the payload size, waiting for
    /// bucket tokens before each one when pacing is enabled. A transport error leaves the
    /// sink in a failed state; later calls, like calls after [`close`](UdpSink::close),
    /// fail immediately.
    pub fn send(&mut self, data: &[u8]) -> Result<()> {
        if self.failed || self.socket.is_none() {
            return sink_closed_error();
        }

        if !self.preview_done {
            debug!("udp sink: sending {} bytes, payload {}", data.len(), self.payload);
            self.preview_done = true;
        }

        let mut off = 0;

        while off < data.len() {
            let chunk = min(self.payload, data.len() - off);

            if self.bitrate_bps > 0 {
                self.refill();

                if self.tokens < chunk as f64 {
                    let deficit = chunk as f64 - self.tokens;
                    let need_ns = deficit * 8.0e9 / self.bitrate_bps as f64;

                    thread::sleep(Duration::from_nanos(need_ns as u64));
                    self.refill();
                }
            }

            let socket = match self.socket {
                Some(ref socket) => socket,
                None => return sink_closed_error(),
            };

            match socket.send(&data[off..off + chunk]) {
                Ok(sent) => {
                    off += sent;

                    if self.bitrate_bps > 0 {
                        self.tokens = (self.tokens - sent as f64).max(0.0);
                    }
                }
                Err(err) => {
                    self.failed = true;
                    return Err(err.into());
                }
            }
        }

        Ok(())
    }

    /// Sends interleaved i16 IQ sample pairs as little-endian bytes.
    pub fn write_iq(&mut self, iq: &[i16]) -> Result<()> {
        let mut bytes = Vec::with_capacity(2 * iq.len());
        for &s in iq {
            bytes.extend_from_slice(&s.to_le_bytes());
        }
        self.send(&bytes)
    }

    /// Sends raw stream bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.send(bytes)
    }

    /// Releases the socket. Further writes fail fast.
    pub fn close(&mut self) -> Result<()> {
        self.socket.take();
        Ok(())
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);

        let add = (self.bitrate_bps as f64 / 8.0) * elapsed.as_secs_f64();
        let cap = (self.payload * BUCKET_PAYLOADS) as f64;

        self.tokens = (self.tokens + add).min(cap);
        self.last_refill = now;
    }
}

/// Splits a UDP target string into host and port. Accepts `udp://host:port`, `host:port`,
/// and `[ipv6]:port`; for a bare `host:port` the last colon separates the port.
pub fn parse_target(target: &str) -> Result<(&str, u16)> {
    let s = target.strip_prefix("udp://").unwrap_or(target);

    let (host, port) = if let Some(stripped) = s.strip_prefix('[') {
        let end = match stripped.find(']') {
            Some(end) => end,
            None => return config_error("udp: unterminated ipv6 address"),
        };

        match stripped[end + 1..].strip_prefix(':') {
            Some(port) => (&stripped[..end], port),
            None => return config_error("udp: missing port"),
        }
    }
    else {
        match s.rfind(':') {
            Some(at) if at > 0 && at + 1 < s.len() => (&s[..at], &s[at + 1..]),
            _ => return config_error("udp: expected host:port"),
        }
    };

    match port.parse::<u16>() {
        Ok(port) => Ok((host, port)),
        Err(_) => config_error("udp: invalid port"),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_target, UdpSink};

    use std::net::UdpSocket;
    use std::time::Instant;

    #[test]
    fn verify_parse_target() {
        assert_eq!(parse_target("udp://127.0.0.1:5000").unwrap(), ("127.0.0.1", 5000));
        assert_eq!(parse_target("239.1.1.1:6000").unwrap(), ("239.1.1.1", 6000));
        assert_eq!(parse_target("[::1]:5000").unwrap(), ("::1", 5000));
        assert_eq!(parse_target("udp://[fe80::1]:1234").unwrap(), ("fe80::1", 1234));

        assert!(parse_target("localhost").is_err());
        assert!(parse_target(":5000").is_err());
        assert!(parse_target("host:").is_err());
        assert!(parse_target("[::1]5000").is_err());
        assert!(parse_target("host:port").is_err());
    }

    #[test]
    fn verify_payload_clamp() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = receiver.local_addr().unwrap().port();

        let sink = UdpSink::open("127.0.0.1", port, 0).unwrap();
        assert_eq!(sink.payload(), 1400);

        let sink = UdpSink::open("127.0.0.1", port, 64 * 1024).unwrap();
        assert_eq!(sink.payload(), 1400);

        let sink = UdpSink::open("127.0.0.1", port, 1000).unwrap();
        assert_eq!(sink.payload(), 1000);
    }

    #[test]
    fn verify_pacing_rate() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = receiver.local_addr().unwrap().port();

        let mut sink = UdpSink::open("127.0.0.1", port, 1000).unwrap();
        sink.set_bitrate(8_000_000);

        // 100 kB at 1 MB/s is 100 ms of wall time, less one bucket (6 payloads, 6 ms) that
        // may be sent without waiting.
        let data = vec![0u8; 100_000];
        let start = Instant::now();
        sink.send(&data).unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed.as_secs_f64() >= 0.088, "sent too fast: {:?}", elapsed);
    }

    #[test]
    fn verify_close_releases_socket() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = receiver.local_addr().unwrap().port();

        let mut sink = UdpSink::open("127.0.0.1", port, 1400).unwrap();
        sink.send(&[0u8; 16]).unwrap();

        sink.close().unwrap();
        assert!(sink.socket.is_none());
        assert!(sink.send(&[0u8; 16]).is_err());
    }

    #[test]
    fn verify_unpaced_send() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = receiver.local_addr().unwrap().port();

        let mut sink = UdpSink::open("127.0.0.1", port, 1400).unwrap();

        let data = vec![0xa5u8; 10_000];
        sink.send(&data).unwrap();

        let mut buf = [0u8; 2048];
        let n = receiver.recv(&mut buf).unwrap();
        assert_eq!(n, 1400);
        assert!(buf[..n].iter().all(|&b| b == 0xa5));
    }
}
