// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, warn};

use super::{EventSocket, PacketSink};
use crate::socket_opts::SocketOptions;

/// How often the receiver thread wakes to check for shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Std UDP socket with a receiver thread that pushes every datagram into a
/// [`PacketSink`], for [`EventTransport`](super::EventTransport).
#[derive(Debug, Default)]
pub struct ThreadedUdpSocket {
    opts: SocketOptions,
    socket: Option<UdpSocket>,
    stop: Arc<AtomicBool>,
    receiver: Option<JoinHandle<()>>,
}

impl ThreadedUdpSocket {
    /// An unbound socket with default options.
    pub fn new() -> Self {
        ThreadedUdpSocket::default()
    }

    /// An unbound socket with custom bind options.
    pub fn with_options(opts: SocketOptions) -> Self {
        ThreadedUdpSocket {
            opts,
            socket: None,
            stop: Arc::new(AtomicBool::new(false)),
            receiver: None,
        }
    }

    /// Local address, once bound.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }
}

fn receive_loop(socket: UdpSocket, sink: PacketSink, stop: Arc<AtomicBool>) {
    let mut buf = [0u8; 1024];
    while !stop.load(Ordering::Acquire) {
        match socket.recv_from(&mut buf) {
            Ok((n, src)) => {
                debug!("received {n}-byte datagram from {src}");
                sink.deliver(&buf[..n]);
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) => {}
            Err(e) => {
                // ICMP port unreachable surfaces as ConnectionReset on some
                // platforms; keep listening.
                warn!("receive failed: {e}");
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

impl EventSocket for ThreadedUdpSocket {
    fn bind(&mut self, port: u16, sink: PacketSink) -> io::Result<()> {
        self.close();
        let socket = self.opts.bind_udp(port, false)?;
        socket.set_read_timeout(Some(POLL_INTERVAL))?;
        let reader = socket.try_clone()?;

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = std::thread::Builder::new()
            .name(format!("sntp-recv-{port}"))
            .spawn(move || receive_loop(reader, sink, thread_stop))?;

        self.socket = Some(socket);
        self.stop = stop;
        self.receiver = Some(handle);
        Ok(())
    }

    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
        match &self.socket {
            Some(s) => s.send_to(buf, addr),
            None => Err(io::Error::new(io::ErrorKind::NotConnected, "socket not bound")),
        }
    }

    fn close(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.receiver.take()
            && handle.join().is_err()
        {
            warn!("receiver thread panicked");
        }
        self.socket = None;
    }
}

impl Drop for ThreadedUdpSocket {
    fn drop(&mut self) {
        self.close();
    }
}
