// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Datagram transport behind the synchronization state machine.
//!
//! Two strategies implement [`Transport`]:
//!
//! - [`BlockingTransport`] polls a [`DatagramSocket`] for a queued datagram.
//! - [`EventTransport`] receives datagrams pushed through a [`PacketSink`]
//!   from another thread or task, via an [`EventSocket`].
//!
//! Shipped sockets: [`UdpDatagramSocket`] (non-blocking std UDP),
//! [`ThreadedUdpSocket`] (std UDP with a receiver thread), and
//! `TokioUdpSocket` (a tokio receive task, `tokio` feature).

use std::io;
use std::net::SocketAddr;

use crate::error::SyncError;
use crate::protocol::{FromBytes, PACKET_SIZE, Packet};

mod blocking;
mod event;
mod threaded;
#[cfg(feature = "tokio")]
mod tokio_socket;
mod udp;

pub use blocking::BlockingTransport;
pub use event::{EventTransport, PacketSink};
pub use threaded::ThreadedUdpSocket;
#[cfg(feature = "tokio")]
pub use tokio_socket::TokioUdpSocket;
pub use udp::UdpDatagramSocket;

/// A received response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Datagram {
    /// The first 48 bytes, as a typed view.
    pub packet: Packet,
    /// Length of the datagram as received, including any trailing bytes.
    pub len: usize,
    /// Counter value when the datagram arrived, if the transport observed
    /// it. `None` means it is being read at the moment it is polled.
    pub received_at_ms: Option<u32>,
}

impl Datagram {
    /// Decode a received payload. Fails with [`SyncError::ShortPacket`] when
    /// it is shorter than a full header.
    pub fn decode(payload: &[u8]) -> Result<Datagram, SyncError> {
        let (packet, _) = Packet::from_bytes(payload)?;
        Ok(Datagram {
            packet,
            len: payload.len(),
            received_at_ms: None,
        })
    }
}

/// What the state machine needs from the network.
pub trait Transport {
    /// Bind the local port.
    fn begin(&mut self, port: u16) -> Result<(), SyncError>;

    /// Release the local port. Safe to call when not bound.
    fn end(&mut self);

    /// Whether `begin` succeeded and `end` has not been called since.
    fn is_bound(&self) -> bool;

    /// Discard anything already received.
    fn drain(&mut self);

    /// Send one request to `addr`.
    fn send(&mut self, addr: SocketAddr, request: &[u8; PACKET_SIZE]) -> Result<(), SyncError>;

    /// Take the response to the current request if one has arrived.
    fn try_receive(&mut self) -> Result<Option<Datagram>, SyncError>;

    /// The current request timed out.
    fn abandon(&mut self) {}

    /// A response to an abandoned request that arrived after its timeout.
    fn late_response(&mut self) -> Result<Option<Datagram>, SyncError> {
        Ok(None)
    }
}

/// A UDP socket polled by the caller.
pub trait DatagramSocket {
    /// Bind the local port.
    fn bind(&mut self, port: u16) -> io::Result<()>;

    /// Send `buf` to `addr`, returning the number of bytes sent.
    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> io::Result<usize>;

    /// Size of the next queued datagram, or `None` if nothing is queued.
    fn available(&mut self) -> io::Result<Option<usize>>;

    /// Read the next queued datagram into `buf`, returning its length
    /// (truncated to `buf.len()`).
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Release the socket.
    fn close(&mut self);
}

/// A UDP socket that pushes received datagrams into a [`PacketSink`].
pub trait EventSocket {
    /// Bind the local port and start delivering datagrams to `sink`.
    fn bind(&mut self, port: u16, sink: PacketSink) -> io::Result<()>;

    /// Send `buf` to `addr`, returning the number of bytes sent.
    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> io::Result<usize>;

    /// Stop delivering and release the socket.
    fn close(&mut self);
}

impl<S: DatagramSocket + ?Sized> DatagramSocket for Box<S> {
    fn bind(&mut self, port: u16) -> io::Result<()> {
        (**self).bind(port)
    }

    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
        (**self).send_to(buf, addr)
    }

    fn available(&mut self) -> io::Result<Option<usize>> {
        (**self).available()
    }

    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_into(buf)
    }

    fn close(&mut self) {
        (**self).close()
    }
}
