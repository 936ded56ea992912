// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! The public clock: configuration setters, synchronization drivers, and
//! read accessors.
//!
//! # Examples
//!
//! Non-blocking use, polled from an application loop:
//!
//! ```no_run
//! use sntp_clock::{NtpClock, SystemClock, UpdateStatus};
//! use sntp_clock::transport::{BlockingTransport, UdpDatagramSocket};
//!
//! let mut clock = NtpClock::builder()
//!     .pool_server_name("pool.ntp.org")
//!     .time_offset(3600)
//!     .build(BlockingTransport::new(UdpDatagramSocket::new()), SystemClock);
//! clock.begin()?;
//!
//! loop {
//!     if let UpdateStatus::Failed(e) = clock.update() {
//!         eprintln!("sync failed: {e}");
//!     }
//!     if clock.is_time_set() {
//!         println!("{} {}", clock.formatted_date(), clock.formatted_time());
//!     }
//!     std::thread::sleep(std::time::Duration::from_millis(100));
//! }
//! # Ok::<(), sntp_clock::SyncError>(())
//! ```

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::net::IpAddr;
use std::ops::RangeInclusive;
use std::time::Duration;

use log::debug;

use crate::calendar::{self, Weekday};
use crate::clock::MonotonicClock;
use crate::config::{ClientConfig, NtpClockBuilder, duration_ms};
use crate::endpoint::{Endpoint, Resolver, SystemResolver};
use crate::error::SyncError;
use crate::locale::Locale;
use crate::session::{Link, Session, SessionState, UpdateStatus};
use crate::timing::{Exchange, Snapshot};
use crate::transport::Transport;

/// A wall clock kept in step with one SNTP server.
///
/// Generic over the [`Transport`] that carries datagrams and the
/// [`MonotonicClock`] that measures elapsed time. Read accessors are pure
/// projections of the latest snapshot, the configured offset, and the
/// current counter value; they never touch the network.
pub struct NtpClock<T, C> {
    config: ClientConfig,
    endpoint: Endpoint,
    resolver: Box<dyn Resolver + Send>,
    transport: T,
    clock: C,
    session: Session,
    /// The local port changed while bound; rebind before the next exchange.
    rebind_pending: bool,
}

impl NtpClock<(), ()> {
    /// Start configuring a clock.
    pub fn builder() -> NtpClockBuilder {
        NtpClockBuilder::default()
    }
}

impl<T: Transport, C: MonotonicClock> NtpClock<T, C> {
    /// A clock with default configuration querying `pool.ntp.org`.
    pub fn new(transport: T, clock: C) -> Self {
        NtpClock::from_parts(
            ClientConfig::default(),
            Endpoint::default(),
            Box::new(SystemResolver),
            transport,
            clock,
        )
    }

    pub(crate) fn from_parts(
        config: ClientConfig,
        endpoint: Endpoint,
        resolver: Box<dyn Resolver + Send>,
        transport: T,
        clock: C,
    ) -> Self {
        NtpClock {
            config,
            endpoint,
            resolver,
            transport,
            clock,
            session: Session::default(),
            rebind_pending: false,
        }
    }

    fn parts(&mut self) -> (&mut Session, Link<'_, T, C>) {
        (
            &mut self.session,
            Link {
                transport: &mut self.transport,
                clock: &self.clock,
                config: &self.config,
                endpoint: &mut self.endpoint,
                resolver: &*self.resolver,
            },
        )
    }

    fn ensure_bound(&mut self) -> Result<(), SyncError> {
        if !self.rebind_pending {
            return Ok(());
        }
        self.rebind_pending = false;
        let port = self.config.local_port;
        debug!("rebinding on port {port}");
        let (session, link) = self.parts();
        session.begin(link, port)
    }

    // --- lifecycle -------------------------------------------------------

    /// Bind the configured local port (default 1337).
    pub fn begin(&mut self) -> Result<(), SyncError> {
        let port = self.config.local_port;
        self.begin_on(port)
    }

    /// Bind `port` and remember it as the configured local port.
    pub fn begin_on(&mut self, port: u16) -> Result<(), SyncError> {
        self.config.local_port = port;
        self.rebind_pending = false;
        let (session, link) = self.parts();
        session.begin(link, port)
    }

    /// Release the local port. The snapshot is kept, so accessors keep
    /// projecting time from it.
    pub fn end(&mut self) {
        self.rebind_pending = false;
        self.session.end(&mut self.transport);
    }

    // --- synchronization -------------------------------------------------

    /// Advance the state machine by one step without blocking.
    pub fn update(&mut self) -> UpdateStatus {
        if let Err(e) = self.ensure_bound() {
            return UpdateStatus::Failed(e);
        }
        let (session, link) = self.parts();
        session.update(link)
    }

    /// Run a complete blocking exchange if one is due. Returns `Ok(false)`
    /// when nothing was due.
    pub fn update_blocking(&mut self) -> Result<bool, SyncError> {
        self.ensure_bound()?;
        let (session, link) = self.parts();
        session.update_blocking(link)
    }

    /// Run a complete blocking exchange now, ignoring the update interval,
    /// bounded by the configured timeout.
    pub fn force_update(&mut self) -> Result<(), SyncError> {
        let timeout = self.config.timeout;
        self.force_update_with_timeout(timeout)
    }

    /// [`force_update`](Self::force_update) with a one-off timeout.
    pub fn force_update_with_timeout(&mut self, timeout: Duration) -> Result<(), SyncError> {
        self.ensure_bound()?;
        let (session, link) = self.parts();
        session.force_update(link, duration_ms(timeout))
    }

    // --- status ----------------------------------------------------------

    /// Whether at least one exchange has succeeded.
    pub fn is_time_set(&self) -> bool {
        self.session.snapshot().is_some()
    }

    /// Error from the latest attempt, if it failed.
    pub fn last_error(&self) -> Option<SyncError> {
        self.session.last_error()
    }

    /// Current state machine state.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Measurements from the latest successful exchange.
    pub fn last_exchange(&self) -> Option<Exchange> {
        self.session.last_exchange()
    }

    /// The latest snapshot, if any.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.session.snapshot()
    }

    /// Current configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The server endpoint.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The monotonic clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    // --- time accessors --------------------------------------------------

    fn projection(&self) -> Snapshot {
        self.session.snapshot().unwrap_or(Snapshot::EMPTY)
    }

    /// Unix seconds including the configured offset.
    pub fn epoch_time(&self) -> i64 {
        self.projection()
            .epoch_seconds(self.config.time_offset_secs.into(), self.clock.now_ms())
    }

    /// Unix milliseconds including the configured offset.
    pub fn epoch_time_millis(&self) -> i64 {
        self.projection()
            .epoch_millis(self.config.time_offset_secs.into(), self.clock.now_ms())
    }

    /// Milliseconds into the current second.
    pub fn millis(&self) -> u32 {
        self.projection().subsec_millis(self.clock.now_ms())
    }

    /// `0..=23`.
    pub fn hours(&self) -> u8 {
        calendar::time_of_day(self.epoch_time()).hours
    }

    /// `0..=59`.
    pub fn minutes(&self) -> u8 {
        calendar::time_of_day(self.epoch_time()).minutes
    }

    /// `0..=59`.
    pub fn seconds(&self) -> u8 {
        calendar::time_of_day(self.epoch_time()).seconds
    }

    /// Day of the week, Sunday = 0.
    pub fn day_of_week(&self) -> Weekday {
        calendar::day_of_week(self.epoch_time())
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        calendar::civil_date(self.epoch_time()).year
    }

    /// Month, `1..=12`.
    pub fn month(&self) -> u8 {
        calendar::civil_date(self.epoch_time()).month
    }

    /// Day of the month, `1..=31`.
    pub fn day(&self) -> u8 {
        calendar::civil_date(self.epoch_time()).day
    }

    /// `HH:MM:SS`.
    pub fn formatted_time(&self) -> String {
        calendar::time_of_day(self.epoch_time()).to_string()
    }

    /// `YYYY-MM-DD`.
    pub fn formatted_date(&self) -> String {
        calendar::civil_date(self.epoch_time()).to_string()
    }

    /// Name of today's weekday in `lang`, falling back to English.
    pub fn weekday_name(&self, lang: &str) -> &'static str {
        Locale::lookup(lang).weekday(self.day_of_week().index())
    }

    /// Name of the current month in `lang`, falling back to English.
    pub fn month_name(&self, lang: &str) -> &'static str {
        Locale::lookup(lang).month(self.month())
    }

    // --- setters ---------------------------------------------------------

    /// Seconds added to every reported time.
    pub fn set_time_offset(&mut self, secs: i32) {
        self.config.time_offset_secs = secs;
    }

    /// Minimum time between synchronizations.
    pub fn set_update_interval(&mut self, interval: Duration) {
        self.config.update_interval = interval;
    }

    /// Response timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.config.timeout = timeout;
    }

    /// Quiet period after a failed attempt.
    pub fn set_retry_backoff(&mut self, backoff: Duration) {
        self.config.retry_backoff = backoff;
    }

    /// Enable or disable latency compensation.
    pub fn set_latency_compensation(&mut self, enabled: bool) {
        self.config.latency_compensation = enabled;
    }

    /// Change the local port. If bound, the port is released now and the
    /// new one is bound before the next exchange.
    pub fn set_local_port(&mut self, port: u16) {
        self.config.local_port = port;
        if self.transport.is_bound() || self.session.state() != SessionState::Uninitialized {
            self.session.end(&mut self.transport);
            self.rebind_pending = true;
        }
    }

    /// Pick a local port from `range` at random and apply it as
    /// [`set_local_port`](Self::set_local_port) does. Returns the port.
    pub fn set_random_port(&mut self, range: RangeInclusive<u16>) -> u16 {
        let (lo, hi) = (*range.start(), *range.end());
        let port = if hi <= lo {
            lo
        } else {
            let span = u64::from(hi - lo) + 1;
            let mut h = RandomState::new().build_hasher();
            h.write_u32(self.clock.now_ms());
            lo + (h.finish() % span) as u16
        };
        self.set_local_port(port);
        port
    }

    /// Query `name`, resolved on the next request.
    pub fn set_pool_server_name(&mut self, name: impl Into<String>) {
        self.endpoint = Endpoint::host(name);
    }

    /// Query `ip` directly.
    pub fn set_pool_server_address(&mut self, ip: IpAddr) {
        self.endpoint = Endpoint::Address(ip);
    }
}
