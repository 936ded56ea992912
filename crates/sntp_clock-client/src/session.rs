// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Resynchronization state machine.
//!
//! ```text
//! Uninitialized --begin--> Idle --due--> RequestSent --sent--> AwaitingResponse
//!                           ^                 |                       |
//!                           +----- error -----+---- response/timeout -+
//! ```
//!
//! The non-blocking driver ([`Session::update`]) advances at most one
//! transition per call, except that a due request is sent in the same call
//! that found it due. The blocking driver ([`Session::force_update`]) ignores
//! the due-check and back-off and polls until the exchange completes or the
//! timeout elapses.

use log::debug;

use crate::clock::MonotonicClock;
use crate::config::ClientConfig;
use crate::endpoint::{Endpoint, Resolver};
use crate::error::SyncError;
use crate::protocol::encode_request;
use crate::timing::{self, Exchange, Snapshot};
use crate::transport::{Datagram, Transport};

/// Where the session is in the request cycle.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SessionState {
    /// `begin` has not been called, or `end` was called.
    #[default]
    Uninitialized,
    /// Bound, no request outstanding.
    Idle,
    /// A request is being prepared and sent.
    RequestSent,
    /// A request was sent; waiting for the response or the timeout.
    AwaitingResponse,
}

/// Outcome of one non-blocking [`Session::update`] step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UpdateStatus {
    /// A response was received and the snapshot replaced.
    Synced,
    /// The last synchronization is still fresh.
    NotDue,
    /// A request is outstanding.
    InProgress,
    /// A recent attempt failed; waiting out the retry back-off.
    BackingOff,
    /// This step failed. The previous snapshot is kept.
    Failed(SyncError),
}

impl UpdateStatus {
    /// Whether this step replaced the snapshot.
    pub fn is_synced(&self) -> bool {
        matches!(self, UpdateStatus::Synced)
    }
}

/// Everything the state machine touches but does not own.
pub(crate) struct Link<'a, T: ?Sized, C: ?Sized> {
    pub(crate) transport: &'a mut T,
    pub(crate) clock: &'a C,
    pub(crate) config: &'a ClientConfig,
    pub(crate) endpoint: &'a mut Endpoint,
    pub(crate) resolver: &'a dyn Resolver,
}

/// Session state, snapshot, and error bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct Session {
    state: SessionState,
    snapshot: Option<Snapshot>,
    last_exchange: Option<Exchange>,
    request_sent_at: u32,
    last_failure_at: Option<u32>,
    last_error: Option<SyncError>,
}

impl Session {
    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The latest snapshot, if any exchange has succeeded.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.snapshot
    }

    /// Measurements from the latest successful exchange.
    pub fn last_exchange(&self) -> Option<Exchange> {
        self.last_exchange
    }

    /// Error from the latest attempt, cleared when a new attempt starts.
    pub fn last_error(&self) -> Option<SyncError> {
        self.last_error
    }

    /// Whether a refresh is due: no snapshot yet, or at least
    /// `update_interval` since the last one.
    pub fn is_due(&self, now_ms: u32, config: &ClientConfig) -> bool {
        match self.snapshot {
            None => true,
            Some(s) => now_ms.wrapping_sub(s.local_clock_at_sync) >= config.update_interval_ms(),
        }
    }

    fn backing_off(&self, now_ms: u32, config: &ClientConfig) -> bool {
        self.last_failure_at
            .is_some_and(|at| now_ms.wrapping_sub(at) < config.retry_backoff_ms())
    }

    pub(crate) fn begin<T, C>(&mut self, link: Link<'_, T, C>, port: u16) -> Result<(), SyncError>
    where
        T: Transport + ?Sized,
        C: MonotonicClock + ?Sized,
    {
        self.last_error = None;
        if link.transport.is_bound() {
            link.transport.end();
        }
        match link.transport.begin(port) {
            Ok(()) => {
                debug!("session idle on port {port}");
                self.state = SessionState::Idle;
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Uninitialized;
                self.last_error = Some(e);
                Err(e)
            }
        }
    }

    pub(crate) fn end<T: Transport + ?Sized>(&mut self, transport: &mut T) {
        transport.end();
        self.state = SessionState::Uninitialized;
    }

    /// Advance one step.
    pub(crate) fn update<T, C>(&mut self, link: Link<'_, T, C>) -> UpdateStatus
    where
        T: Transport + ?Sized,
        C: MonotonicClock + ?Sized,
    {
        let timeout_ms = link.config.timeout_ms();
        match self.state {
            SessionState::Uninitialized => {
                self.last_error = Some(SyncError::NotBegun);
                UpdateStatus::Failed(SyncError::NotBegun)
            }
            SessionState::Idle => {
                match link.transport.late_response() {
                    Ok(Some(datagram)) => {
                        debug!("accepting late response");
                        return self.accept(link, datagram);
                    }
                    Ok(None) => {}
                    Err(e) => debug!("discarding late response: {e}"),
                }
                let now = link.clock.now_ms();
                if !self.is_due(now, link.config) {
                    return UpdateStatus::NotDue;
                }
                if self.backing_off(now, link.config) {
                    return UpdateStatus::BackingOff;
                }
                self.start_request(link)
            }
            SessionState::RequestSent => self.send_request(link),
            SessionState::AwaitingResponse => self.poll_response(link, timeout_ms),
        }
    }

    /// Blocking exchange, bounded by `timeout_ms`.
    pub(crate) fn force_update<T, C>(
        &mut self,
        mut link: Link<'_, T, C>,
        timeout_ms: u32,
    ) -> Result<(), SyncError>
    where
        T: Transport + ?Sized,
        C: MonotonicClock + ?Sized,
    {
        match self.state {
            SessionState::Uninitialized => {
                self.last_error = Some(SyncError::NotBegun);
                return Err(SyncError::NotBegun);
            }
            SessionState::Idle | SessionState::RequestSent => {
                if let UpdateStatus::Failed(e) = self.start_request(link.reborrow()) {
                    return Err(e);
                }
            }
            // Keep waiting on the request a non-blocking step already sent.
            SessionState::AwaitingResponse => {}
        }
        loop {
            match self.poll_response(link.reborrow(), timeout_ms) {
                UpdateStatus::Synced => return Ok(()),
                UpdateStatus::Failed(e) => return Err(e),
                _ => link.clock.sleep_ms(1),
            }
        }
    }

    /// Blocking exchange only if due and not backing off. Returns whether an
    /// exchange was attempted.
    pub(crate) fn update_blocking<T, C>(&mut self, link: Link<'_, T, C>) -> Result<bool, SyncError>
    where
        T: Transport + ?Sized,
        C: MonotonicClock + ?Sized,
    {
        if self.state == SessionState::Idle {
            let now = link.clock.now_ms();
            if !self.is_due(now, link.config) || self.backing_off(now, link.config) {
                return Ok(false);
            }
        }
        let timeout_ms = link.config.timeout_ms();
        self.force_update(link, timeout_ms).map(|()| true)
    }

    fn start_request<T, C>(&mut self, link: Link<'_, T, C>) -> UpdateStatus
    where
        T: Transport + ?Sized,
        C: MonotonicClock + ?Sized,
    {
        self.last_error = None;
        link.transport.drain();
        self.state = SessionState::RequestSent;
        self.send_request(link)
    }

    fn send_request<T, C>(&mut self, link: Link<'_, T, C>) -> UpdateStatus
    where
        T: Transport + ?Sized,
        C: MonotonicClock + ?Sized,
    {
        let addr = match link.endpoint.socket_addr(link.resolver) {
            Ok(addr) => addr,
            Err(e) => return self.fail(e, link.clock.now_ms()),
        };
        if let Err(e) = link.transport.send(addr, &encode_request()) {
            return self.fail(e, link.clock.now_ms());
        }
        self.request_sent_at = link.clock.now_ms();
        self.state = SessionState::AwaitingResponse;
        UpdateStatus::InProgress
    }

    fn poll_response<T, C>(&mut self, link: Link<'_, T, C>, timeout_ms: u32) -> UpdateStatus
    where
        T: Transport + ?Sized,
        C: MonotonicClock + ?Sized,
    {
        match link.transport.try_receive() {
            Ok(Some(datagram)) => self.accept(link, datagram),
            Ok(None) => {
                let now = link.clock.now_ms();
                if now.wrapping_sub(self.request_sent_at) >= timeout_ms {
                    link.transport.abandon();
                    self.fail(SyncError::Timeout, now)
                } else {
                    UpdateStatus::InProgress
                }
            }
            Err(e) => self.fail(e, link.clock.now_ms()),
        }
    }

    /// Anchor the snapshot at the datagram's arrival, or at the current
    /// counter value when the transport did not record one.
    fn accept<T, C>(&mut self, link: Link<'_, T, C>, datagram: Datagram) -> UpdateStatus
    where
        T: Transport + ?Sized,
        C: MonotonicClock + ?Sized,
    {
        let received_at = datagram
            .received_at_ms
            .unwrap_or_else(|| link.clock.now_ms());
        let (snapshot, exchange) = timing::compensate(
            datagram.packet.receive_timestamp(),
            datagram.packet.transmit_timestamp(),
            self.request_sent_at,
            received_at,
            link.config.latency_compensation,
        );
        debug!(
            "synchronized: epoch {} (+{:.3}), round trip {} ms, delay {:.6}s",
            snapshot.server_epoch_secs,
            snapshot.fraction.unwrap_or(0.0),
            exchange.round_trip_ms,
            exchange.delay_secs
        );
        self.snapshot = Some(snapshot);
        self.last_exchange = Some(exchange);
        self.last_failure_at = None;
        self.last_error = None;
        self.state = SessionState::Idle;
        UpdateStatus::Synced
    }

    fn fail(&mut self, err: SyncError, now_ms: u32) -> UpdateStatus {
        debug!("synchronization attempt failed: {err}");
        self.last_error = Some(err);
        self.last_failure_at = Some(now_ms);
        self.state = if err == SyncError::NotBegun {
            SessionState::Uninitialized
        } else {
            SessionState::Idle
        };
        UpdateStatus::Failed(err)
    }
}

impl<'a, T: ?Sized, C: ?Sized> Link<'a, T, C> {
    fn reborrow(&mut self) -> Link<'_, T, C> {
        Link {
            transport: &mut *self.transport,
            clock: self.clock,
            config: self.config,
            endpoint: &mut *self.endpoint,
            resolver: self.resolver,
        }
    }
}
