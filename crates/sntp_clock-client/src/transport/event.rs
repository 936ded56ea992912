// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Callback-driven transport.
//!
//! A receiver running on another thread or task hands each datagram to a
//! [`PacketSink`]. The sink and the polling [`EventTransport`] share a single
//! mutex-guarded cell; critical sections only copy bytes and flip flags.
//! The sink stamps each kept datagram with the counter value at which it
//! arrived, so the snapshot anchors at arrival and not at the next poll.

use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use super::{Datagram, EventSocket, Transport};
use crate::clock::MonotonicClock;
use crate::error::SyncError;
use crate::protocol::PACKET_SIZE;

#[derive(Debug)]
struct Shared {
    buffer: [u8; PACKET_SIZE],
    /// Length of the stored datagram as received; may exceed the buffer.
    len: usize,
    received_at_ms: u32,
    packet_ready: bool,
    request_in_flight: bool,
    /// Open between a timeout and the next send.
    late_window: bool,
    dropped: u64,
}

impl Default for Shared {
    fn default() -> Self {
        Shared {
            buffer: [0u8; PACKET_SIZE],
            len: 0,
            received_at_ms: 0,
            packet_ready: false,
            request_in_flight: false,
            late_window: false,
            dropped: 0,
        }
    }
}

impl Shared {
    fn take(&mut self) -> Option<Taken> {
        if !self.packet_ready {
            return None;
        }
        self.packet_ready = false;
        self.request_in_flight = false;
        self.late_window = false;
        Some(Taken {
            bytes: self.buffer,
            len: self.len,
            received_at_ms: self.received_at_ms,
        })
    }
}

struct Taken {
    bytes: [u8; PACKET_SIZE],
    len: usize,
    received_at_ms: u32,
}

impl Taken {
    fn decode(self) -> Result<Datagram, SyncError> {
        let mut datagram = Datagram::decode(&self.bytes[..self.len.min(PACKET_SIZE)])?;
        datagram.len = self.len;
        datagram.received_at_ms = Some(self.received_at_ms);
        Ok(datagram)
    }
}

type SharedClock = Arc<dyn MonotonicClock + Send + Sync>;

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    // Plain bytes and flags; still consistent after a poisoning panic.
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Delivery handle given to an [`EventSocket`]. Cheap to clone and safe to
/// use from any thread.
#[derive(Clone)]
pub struct PacketSink {
    shared: Arc<Mutex<Shared>>,
    clock: SharedClock,
}

impl fmt::Debug for PacketSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketSink")
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}

impl PacketSink {
    /// Offer a received datagram.
    ///
    /// Accepted only while a request is in flight (or its late window is
    /// open) and no response is already waiting. Returns whether the
    /// datagram was kept.
    pub fn deliver(&self, payload: &[u8]) -> bool {
        let arrived_at = self.clock.now_ms();
        let mut shared = lock(&self.shared);
        if !(shared.request_in_flight || shared.late_window) || shared.packet_ready {
            shared.dropped += 1;
            drop(shared);
            debug!("dropped unsolicited {}-byte datagram", payload.len());
            return false;
        }
        let n = payload.len().min(PACKET_SIZE);
        shared.buffer = [0u8; PACKET_SIZE];
        shared.buffer[..n].copy_from_slice(&payload[..n]);
        shared.len = payload.len();
        shared.received_at_ms = arrived_at;
        shared.packet_ready = true;
        true
    }

    /// Whether a datagram delivered now would be kept.
    pub fn is_expecting(&self) -> bool {
        let shared = lock(&self.shared);
        (shared.request_in_flight || shared.late_window) && !shared.packet_ready
    }
}

/// Transport fed by an [`EventSocket`] through a [`PacketSink`].
///
/// At most one request is in flight: a `send` while one is outstanding does
/// nothing.
///
/// `clock` timestamps arrivals. It must count on the same scale as the clock
/// the [`NtpClock`](crate::NtpClock) polls with; pass the same clock (or a
/// clone sharing its counter).
pub struct EventTransport<S> {
    socket: S,
    shared: Arc<Mutex<Shared>>,
    clock: SharedClock,
    bound: bool,
}

impl<S: fmt::Debug> fmt::Debug for EventTransport<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTransport")
            .field("socket", &self.socket)
            .field("shared", &self.shared)
            .field("bound", &self.bound)
            .finish_non_exhaustive()
    }
}

impl<S: EventSocket> EventTransport<S> {
    /// Wrap an unbound socket.
    pub fn new<K>(socket: S, clock: K) -> Self
    where
        K: MonotonicClock + Send + Sync + 'static,
    {
        EventTransport {
            socket,
            shared: Arc::new(Mutex::new(Shared::default())),
            clock: Arc::new(clock),
            bound: false,
        }
    }

    /// A sink sharing this transport's state.
    pub fn sink(&self) -> PacketSink {
        PacketSink {
            shared: Arc::clone(&self.shared),
            clock: Arc::clone(&self.clock),
        }
    }

    /// Whether a request is outstanding.
    pub fn request_in_flight(&self) -> bool {
        lock(&self.shared).request_in_flight
    }

    /// Number of datagrams the sink has refused since creation.
    pub fn dropped(&self) -> u64 {
        lock(&self.shared).dropped
    }

    /// The wrapped socket.
    pub fn socket(&self) -> &S {
        &self.socket
    }

    fn reset(&self) {
        let mut shared = lock(&self.shared);
        let dropped = shared.dropped;
        *shared = Shared {
            dropped,
            ..Shared::default()
        };
    }
}

impl<S: EventSocket> Transport for EventTransport<S> {
    fn begin(&mut self, port: u16) -> Result<(), SyncError> {
        if self.bound {
            self.end();
        }
        self.reset();
        match self.socket.bind(port, self.sink()) {
            Ok(()) => {
                debug!("bound UDP port {port} (event delivery)");
                self.bound = true;
                Ok(())
            }
            Err(e) => {
                warn!("failed to bind UDP port {port}: {e}");
                Err(SyncError::BindFailed)
            }
        }
    }

    fn end(&mut self) {
        if self.bound {
            self.socket.close();
            self.bound = false;
        }
        self.reset();
    }

    fn is_bound(&self) -> bool {
        self.bound
    }

    fn drain(&mut self) {
        let mut shared = lock(&self.shared);
        shared.packet_ready = false;
        shared.late_window = false;
    }

    fn send(&mut self, addr: SocketAddr, request: &[u8; PACKET_SIZE]) -> Result<(), SyncError> {
        if !self.bound {
            return Err(SyncError::NotBegun);
        }
        {
            let mut shared = lock(&self.shared);
            if shared.request_in_flight {
                debug!("request already in flight; not sending another");
                return Ok(());
            }
            // Flag first so a fast response is not dropped as unsolicited.
            shared.request_in_flight = true;
            shared.packet_ready = false;
            shared.late_window = false;
        }
        match self.socket.send_to(request, addr) {
            Ok(n) if n == PACKET_SIZE => {
                debug!("sent {n}-byte request to {addr}");
                Ok(())
            }
            result => {
                match result {
                    Ok(n) => warn!("short send to {addr}: {n} of {PACKET_SIZE} bytes"),
                    Err(e) => warn!("send to {addr} failed: {e}"),
                }
                lock(&self.shared).request_in_flight = false;
                Err(SyncError::SendFailed)
            }
        }
    }

    fn try_receive(&mut self) -> Result<Option<Datagram>, SyncError> {
        if !self.bound {
            return Err(SyncError::NotBegun);
        }
        let taken = lock(&self.shared).take();
        taken.map(Taken::decode).transpose()
    }

    fn abandon(&mut self) {
        let mut shared = lock(&self.shared);
        shared.request_in_flight = false;
        shared.packet_ready = false;
        shared.late_window = true;
    }

    fn late_response(&mut self) -> Result<Option<Datagram>, SyncError> {
        let taken = {
            let mut shared = lock(&self.shared);
            if !shared.late_window {
                return Ok(None);
            }
            shared.take()
        };
        match taken {
            Some(taken) => {
                debug!(
                    "taking late {}-byte response received at {} ms",
                    taken.len, taken.received_at_ms
                );
                taken.decode().map(Some)
            }
            None => Ok(None),
        }
    }
}
