// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use std::net::SocketAddr;

use log::{debug, warn};

use super::{Datagram, DatagramSocket, Transport};
use crate::error::SyncError;
use crate::protocol::PACKET_SIZE;

/// Larger than any response we care about; extension fields are read and
/// ignored.
const RECV_BUF_SIZE: usize = 1024;

/// Transport that polls a [`DatagramSocket`] for the response.
#[derive(Debug)]
pub struct BlockingTransport<S> {
    socket: S,
    bound: bool,
}

impl<S: DatagramSocket> BlockingTransport<S> {
    /// Wrap an unbound socket.
    pub fn new(socket: S) -> Self {
        BlockingTransport {
            socket,
            bound: false,
        }
    }

    /// The wrapped socket.
    pub fn socket(&self) -> &S {
        &self.socket
    }

    /// The wrapped socket, mutably.
    pub fn socket_mut(&mut self) -> &mut S {
        &mut self.socket
    }
}

impl<S: DatagramSocket> Transport for BlockingTransport<S> {
    fn begin(&mut self, port: u16) -> Result<(), SyncError> {
        if self.bound {
            self.end();
        }
        match self.socket.bind(port) {
            Ok(()) => {
                debug!("bound UDP port {port}");
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
    }

    fn is_bound(&self) -> bool {
        self.bound
    }

    fn drain(&mut self) {
        if !self.bound {
            return;
        }
        let mut scratch = [0u8; RECV_BUF_SIZE];
        while let Ok(Some(_)) = self.socket.available() {
            match self.socket.read_into(&mut scratch) {
                Ok(n) => debug!("discarded stale {n}-byte datagram"),
                Err(_) => break,
            }
        }
    }

    fn send(&mut self, addr: SocketAddr, request: &[u8; PACKET_SIZE]) -> Result<(), SyncError> {
        if !self.bound {
            return Err(SyncError::NotBegun);
        }
        match self.socket.send_to(request, addr) {
            Ok(n) if n == PACKET_SIZE => {
                debug!("sent {n}-byte request to {addr}");
                Ok(())
            }
            Ok(n) => {
                warn!("short send to {addr}: {n} of {PACKET_SIZE} bytes");
                Err(SyncError::SendFailed)
            }
            Err(e) => {
                warn!("send to {addr} failed: {e}");
                Err(SyncError::SendFailed)
            }
        }
    }

    fn try_receive(&mut self) -> Result<Option<Datagram>, SyncError> {
        if !self.bound {
            return Err(SyncError::NotBegun);
        }
        match self.socket.available() {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("polling socket failed: {e}");
                return Ok(None);
            }
        }
        let mut buf = [0u8; RECV_BUF_SIZE];
        let n = match self.socket.read_into(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                warn!("reading datagram failed: {e}");
                return Ok(None);
            }
        };
        debug!("received {n}-byte datagram");
        Datagram::decode(&buf[..n]).map(Some)
    }
}
