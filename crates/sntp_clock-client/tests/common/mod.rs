// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for integration tests.

// Integration test helpers are `pub` so each `tests/*.rs` file can import them
// via `mod common`; not every file uses every helper.
#![allow(unreachable_pub, dead_code)]

use std::collections::VecDeque;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use sntp_clock::endpoint::Resolver;
use sntp_clock::protocol::{FromBytes, LeapIndicator, Mode, Packet, Version};
use sntp_clock::transport::{DatagramSocket, EventSocket, PacketSink};
use sntp_clock::unix_time;

/// 2024-01-01T00:00:00Z.
pub const NEW_YEAR_2024: i64 = 1_704_067_200;

/// A server response whose receive and transmit timestamps are both
/// `unix_secs + fraction`.
pub fn response(unix_secs: i64, fraction: f64) -> [u8; 48] {
    let ts = unix_time::unix_to_timestamp(unix_secs, fraction);
    let mut packet = Packet::client_request();
    packet.set_flags(LeapIndicator::NoWarning, Version::V4, Mode::Server);
    packet.set_stratum(1);
    packet.set_receive_timestamp(ts);
    packet.set_transmit_timestamp(ts);
    packet.into_bytes()
}

/// How the mock server answers.
#[derive(Clone, Copy, Debug)]
pub enum Behavior {
    /// Answer immediately with a full response.
    Reply,
    /// Never answer.
    Silent,
    /// Answer with only this many bytes.
    Short(usize),
    /// Answer after sleeping this long.
    Delayed(Duration),
}

/// In-process NTP server on `127.0.0.1` answering with a fixed time.
pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
    behavior: Arc<Mutex<Behavior>>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl MockServer {
    /// Start a server that reports `unix_secs` (plus half a second).
    pub fn start(unix_secs: i64, behavior: Behavior) -> MockServer {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_millis(20)))
            .unwrap();
        let addr = socket.local_addr().unwrap();
        let requests = Arc::new(AtomicUsize::new(0));
        let behavior = Arc::new(Mutex::new(behavior));
        let stop = Arc::new(AtomicBool::new(false));

        let thread = {
            let requests = Arc::clone(&requests);
            let behavior = Arc::clone(&behavior);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                let mut buf = [0u8; 512];
                while !stop.load(Ordering::Acquire) {
                    let Ok((n, src)) = socket.recv_from(&mut buf) else {
                        continue;
                    };
                    requests.fetch_add(1, Ordering::SeqCst);
                    let Ok((request, _)) = Packet::from_bytes(&buf[..n]) else {
                        continue;
                    };
                    assert_eq!(request.mode(), Mode::Client);
                    let reply = response(unix_secs, 0.5);
                    let mode = *behavior.lock().unwrap();
                    match mode {
                        Behavior::Reply => {
                            let _ = socket.send_to(&reply, src);
                        }
                        Behavior::Silent => {}
                        Behavior::Short(len) => {
                            let _ = socket.send_to(&reply[..len], src);
                        }
                        Behavior::Delayed(d) => {
                            std::thread::sleep(d);
                            let _ = socket.send_to(&reply, src);
                        }
                    }
                }
            })
        };

        MockServer {
            addr,
            requests,
            behavior,
            stop,
            thread: Some(thread),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

/// Wraps a socket and sends every datagram to `target` instead of the
/// server's port 123.
pub struct Redirected<S> {
    pub inner: S,
    pub target: SocketAddr,
}

impl<S> Redirected<S> {
    pub fn new(inner: S, target: SocketAddr) -> Self {
        Redirected { inner, target }
    }
}

impl<S: DatagramSocket> DatagramSocket for Redirected<S> {
    fn bind(&mut self, port: u16) -> io::Result<()> {
        self.inner.bind(port)
    }

    fn send_to(&mut self, buf: &[u8], _addr: SocketAddr) -> io::Result<usize> {
        self.inner.send_to(buf, self.target)
    }

    fn available(&mut self) -> io::Result<Option<usize>> {
        self.inner.available()
    }

    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read_into(buf)
    }

    fn close(&mut self) {
        self.inner.close()
    }
}

impl<S: EventSocket> EventSocket for Redirected<S> {
    fn bind(&mut self, port: u16, sink: PacketSink) -> io::Result<()> {
        self.inner.bind(port, sink)
    }

    fn send_to(&mut self, buf: &[u8], _addr: SocketAddr) -> io::Result<usize> {
        self.inner.send_to(buf, self.target)
    }

    fn close(&mut self) {
        self.inner.close()
    }
}

/// In-memory socket: each send queues the configured reply.
#[derive(Default)]
pub struct ScriptedSocket {
    /// Queued after every successful send; `None` means the server is silent.
    pub reply: Option<Vec<u8>>,
    pub fail_bind: bool,
    pub fail_send: bool,
    pub binds: Vec<u16>,
    pub sent: Vec<SocketAddr>,
    pub queue: VecDeque<Vec<u8>>,
    pub open: bool,
}

impl ScriptedSocket {
    pub fn replying(reply: [u8; 48]) -> Self {
        ScriptedSocket {
            reply: Some(reply.to_vec()),
            ..ScriptedSocket::default()
        }
    }

    pub fn silent() -> Self {
        ScriptedSocket::default()
    }
}

impl DatagramSocket for ScriptedSocket {
    fn bind(&mut self, port: u16) -> io::Result<()> {
        if self.fail_bind {
            return Err(io::Error::new(io::ErrorKind::AddrInUse, "port in use"));
        }
        self.binds.push(port);
        self.open = true;
        Ok(())
    }

    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
        assert_eq!(buf.len(), 48);
        if self.fail_send {
            return Err(io::Error::other("network down"));
        }
        self.sent.push(addr);
        if let Some(reply) = &self.reply {
            self.queue.push_back(reply.clone());
        }
        Ok(buf.len())
    }

    fn available(&mut self) -> io::Result<Option<usize>> {
        Ok(self.queue.front().map(Vec::len))
    }

    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let d = self.queue.pop_front().unwrap_or_default();
        let n = d.len().min(buf.len());
        buf[..n].copy_from_slice(&d[..n]);
        Ok(n)
    }

    fn close(&mut self) {
        self.open = false;
    }
}

/// In-memory event socket exposing the sink it was bound with.
#[derive(Clone, Default)]
pub struct ScriptedEventSocket {
    pub sink: Arc<Mutex<Option<PacketSink>>>,
    pub sends: Arc<AtomicUsize>,
}

impl EventSocket for ScriptedEventSocket {
    fn bind(&mut self, _port: u16, sink: PacketSink) -> io::Result<()> {
        *self.sink.lock().unwrap() = Some(sink);
        Ok(())
    }

    fn send_to(&mut self, buf: &[u8], _addr: SocketAddr) -> io::Result<usize> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        Ok(buf.len())
    }

    fn close(&mut self) {
        *self.sink.lock().unwrap() = None;
    }
}

/// Resolves every name to one address, or to nothing.
pub struct FixedResolver(pub Option<IpAddr>);

impl Resolver for FixedResolver {
    fn resolve(&self, _host: &str) -> Option<IpAddr> {
        self.0
    }
}

pub fn test_server_ip() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(192, 0, 2, 123))
}
