// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! UDP socket creation shared by the shipped socket implementations.
//!
//! Sockets are created through `socket2` so that `SO_REUSEADDR` can be set
//! before binding. The client rebinds the same local port after
//! `set_local_port` or `end`/`begin`, and a lingering socket must not make
//! that fail.

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use socket2::{Domain, Protocol, Socket, Type};

/// Options applied when a shipped socket binds its local port.
#[derive(Clone, Debug)]
pub struct SocketOptions {
    /// Local address to bind. Defaults to `0.0.0.0`.
    pub bind_ip: IpAddr,
    /// Set `SO_REUSEADDR` before binding. Defaults to `true`.
    pub reuse_address: bool,
    /// DSCP value for outgoing packets (lower 6 bits used).
    pub dscp: Option<u8>,
}

impl Default for SocketOptions {
    fn default() -> Self {
        SocketOptions {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            reuse_address: true,
            dscp: None,
        }
    }
}

impl SocketOptions {
    /// Create and bind a UDP socket on `port`, in blocking or non-blocking
    /// mode.
    pub fn bind_udp(&self, port: u16, nonblocking: bool) -> io::Result<UdpSocket> {
        let bind_addr = SocketAddr::new(self.bind_ip, port);
        let domain = if bind_addr.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };

        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
        if self.reuse_address {
            socket.set_reuse_address(true)?;
        }

        if let Some(dscp) = self.dscp {
            // DSCP occupies bits 7-2 of the TOS/Traffic Class byte.
            let tos = u32::from(dscp & 0x3F) << 2;
            if bind_addr.is_ipv4() {
                socket.set_tos_v4(tos)?;
            } else {
                socket.set_tclass_v6(tos)?;
            }
        }

        socket.set_nonblocking(nonblocking)?;
        socket.bind(&bind_addr.into())?;
        Ok(socket.into())
    }
}
