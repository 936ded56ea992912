// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Client configuration and the [`NtpClockBuilder`].

use std::net::IpAddr;
use std::time::Duration;

use crate::client::NtpClock;
use crate::clock::MonotonicClock;
use crate::endpoint::{Endpoint, Resolver, SystemResolver};
use crate::transport::Transport;

/// Local UDP port bound by [`NtpClock::begin`].
pub const DEFAULT_LOCAL_PORT: u16 = 1337;
/// Minimum time between successful synchronizations.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60);
/// How long to wait for a response.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
/// Quiet period after a failed attempt.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(1500);

/// Tunable parameters. Every field can also be changed after construction
/// through the setters on [`NtpClock`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Seconds added to every reported time (time zone offset). Bounded to
    /// `i32`, about 68 years either way.
    pub time_offset_secs: i32,
    /// Minimum time between successful synchronizations.
    pub update_interval: Duration,
    /// How long to wait for a response before giving up.
    pub timeout: Duration,
    /// Local UDP port to bind.
    pub local_port: u16,
    /// After a failure, no new attempt is made for this long.
    pub retry_backoff: Duration,
    /// Shift the server time by half the estimated network delay.
    pub latency_compensation: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            time_offset_secs: 0,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            local_port: DEFAULT_LOCAL_PORT,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            latency_compensation: true,
        }
    }
}

/// Milliseconds on the `u32` counter scale, saturating.
pub(crate) fn duration_ms(d: Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}

impl ClientConfig {
    pub(crate) fn update_interval_ms(&self) -> u32 {
        duration_ms(self.update_interval)
    }

    pub(crate) fn timeout_ms(&self) -> u32 {
        duration_ms(self.timeout)
    }

    pub(crate) fn retry_backoff_ms(&self) -> u32 {
        duration_ms(self.retry_backoff)
    }
}

/// Builder for configuring and creating an [`NtpClock`].
///
/// ```
/// use std::time::Duration;
/// use sntp_clock::{ManualClock, NtpClock};
/// use sntp_clock::transport::{BlockingTransport, UdpDatagramSocket};
///
/// let clock = NtpClock::builder()
///     .pool_server_name("time.nist.gov")
///     .time_offset(3600)
///     .update_interval(Duration::from_secs(300))
///     .build(BlockingTransport::new(UdpDatagramSocket::new()), ManualClock::new(0));
/// assert!(!clock.is_time_set());
/// ```
pub struct NtpClockBuilder {
    config: ClientConfig,
    endpoint: Endpoint,
    resolver: Box<dyn Resolver + Send>,
}

impl Default for NtpClockBuilder {
    fn default() -> Self {
        NtpClockBuilder {
            config: ClientConfig::default(),
            endpoint: Endpoint::default(),
            resolver: Box::new(SystemResolver),
        }
    }
}

impl NtpClockBuilder {
    /// Query this hostname (default: `pool.ntp.org`).
    pub fn pool_server_name(mut self, name: impl Into<String>) -> Self {
        self.endpoint = Endpoint::host(name);
        self
    }

    /// Query this address directly, skipping name resolution.
    pub fn pool_server_address(mut self, ip: IpAddr) -> Self {
        self.endpoint = Endpoint::Address(ip);
        self
    }

    /// Seconds added to every reported time (default: 0).
    pub fn time_offset(mut self, secs: i32) -> Self {
        self.config.time_offset_secs = secs;
        self
    }

    /// Minimum time between synchronizations (default: 60 s).
    pub fn update_interval(mut self, interval: Duration) -> Self {
        self.config.update_interval = interval;
        self
    }

    /// Response timeout (default: 1 s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Local UDP port (default: 1337).
    pub fn local_port(mut self, port: u16) -> Self {
        self.config.local_port = port;
        self
    }

    /// Quiet period after a failed attempt (default: 1.5 s).
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.config.retry_backoff = backoff;
        self
    }

    /// Enable or disable latency compensation (default: enabled).
    pub fn latency_compensation(mut self, enabled: bool) -> Self {
        self.config.latency_compensation = enabled;
        self
    }

    /// Replace the system resolver, e.g. with a fixed table in tests.
    pub fn resolver(mut self, resolver: impl Resolver + Send + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Replace the whole configuration at once.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Create the clock. Nothing is bound until [`NtpClock::begin`].
    pub fn build<T: Transport, C: MonotonicClock>(self, transport: T, clock: C) -> NtpClock<T, C> {
        NtpClock::from_parts(self.config, self.endpoint, self.resolver, transport, clock)
    }
}
