// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Server endpoint: a hostname resolved on demand, or a literal address.

use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

use log::debug;

use crate::error::SyncError;
use crate::protocol::PORT;

/// Hostname used when none is configured.
pub const DEFAULT_SERVER: &str = "pool.ntp.org";

/// Name-to-address lookup.
pub trait Resolver {
    /// Resolve `host` to one address, or `None` if it does not resolve.
    fn resolve(&self, host: &str) -> Option<IpAddr>;
}

/// Resolves through the operating system with [`ToSocketAddrs`].
///
/// IPv4 results are preferred because the bound socket is IPv4.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(&self, host: &str) -> Option<IpAddr> {
        if host.is_empty() {
            return None;
        }
        let addrs: Vec<SocketAddr> = match (host, PORT).to_socket_addrs() {
            Ok(iter) => iter.collect(),
            Err(e) => {
                debug!("resolving {host} failed: {e}");
                return None;
            }
        };
        addrs
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| addrs.first())
            .map(|a| a.ip())
    }
}

/// Where requests go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// A hostname, with the address it last resolved to.
    Host {
        /// The configured name.
        name: String,
        /// Cached resolution, cleared whenever the name changes.
        resolved: Option<IpAddr>,
    },
    /// A literal address; no lookup is performed.
    Address(IpAddr),
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint::host(DEFAULT_SERVER)
    }
}

impl Endpoint {
    /// An unresolved hostname endpoint.
    pub fn host(name: impl Into<String>) -> Endpoint {
        Endpoint::Host {
            name: name.into(),
            resolved: None,
        }
    }

    /// The socket address to send to, resolving and caching a hostname on
    /// first use.
    pub fn socket_addr(&mut self, resolver: &dyn Resolver) -> Result<SocketAddr, SyncError> {
        let ip = match self {
            Endpoint::Address(ip) => *ip,
            Endpoint::Host {
                resolved: Some(ip), ..
            } => *ip,
            Endpoint::Host { name, resolved } => {
                let ip = resolver.resolve(name).ok_or(SyncError::DnsFailed)?;
                debug!("resolved {name} to {ip}");
                *resolved = Some(ip);
                ip
            }
        };
        Ok(SocketAddr::new(ip, PORT))
    }
}
