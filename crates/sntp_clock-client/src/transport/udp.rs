// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::net::{SocketAddr, UdpSocket};

use super::DatagramSocket;
use crate::socket_opts::SocketOptions;

/// Non-blocking std UDP socket for [`BlockingTransport`](super::BlockingTransport).
#[derive(Debug, Default)]
pub struct UdpDatagramSocket {
    opts: SocketOptions,
    socket: Option<UdpSocket>,
}

impl UdpDatagramSocket {
    /// An unbound socket with default options.
    pub fn new() -> Self {
        UdpDatagramSocket::default()
    }

    /// An unbound socket with custom bind options.
    pub fn with_options(opts: SocketOptions) -> Self {
        UdpDatagramSocket { opts, socket: None }
    }

    /// Local address, once bound.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    fn bound(&self) -> io::Result<&UdpSocket> {
        self.socket
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "socket not bound"))
    }
}

impl DatagramSocket for UdpDatagramSocket {
    fn bind(&mut self, port: u16) -> io::Result<()> {
        self.socket = None;
        self.socket = Some(self.opts.bind_udp(port, true)?);
        Ok(())
    }

    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
        self.bound()?.send_to(buf, addr)
    }

    fn available(&mut self) -> io::Result<Option<usize>> {
        let mut peek = [0u8; 1024];
        match self.bound()?.peek_from(&mut peek) {
            Ok((n, _)) => Ok(Some(n)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let (n, _) = self.bound()?.recv_from(buf)?;
        Ok(n)
    }

    fn close(&mut self) {
        self.socket = None;
    }
}
