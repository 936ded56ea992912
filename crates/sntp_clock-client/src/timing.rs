// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Synchronization snapshot and latency compensation.
//!
//! A [`Snapshot`] pairs the server's Unix time with the local monotonic
//! counter value at which it was valid. Current time is projected forward
//! from it by wrapping elapsed milliseconds; no wall clock is consulted.

use log::warn;

use crate::protocol::TimestampFormat;
use crate::unix_time;

/// Server time paired with the local counter value at which it was observed.
///
/// Replaced wholesale after every successful exchange.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Snapshot {
    /// Unix seconds reported by the server (latency compensated if enabled).
    pub server_epoch_secs: i64,
    /// Local monotonic counter, in ms, when the response was observed.
    pub local_clock_at_sync: u32,
    /// Sub-second part of the server time in `[0, 1)`.
    pub fraction: Option<f64>,
}

impl Snapshot {
    /// The projection used before any synchronization: epoch 0 anchored at
    /// counter value 0.
    pub const EMPTY: Snapshot = Snapshot {
        server_epoch_secs: 0,
        local_clock_at_sync: 0,
        fraction: None,
    };

    /// Milliseconds since the anchor, including the stored fraction.
    fn elapsed_with_fraction_ms(&self, now_ms: u32) -> i64 {
        let elapsed = now_ms.wrapping_sub(self.local_clock_at_sync) as i64;
        let frac_ms = match self.fraction {
            Some(f) => (f * 1000.0).round() as i64,
            None => 0,
        };
        elapsed.saturating_add(frac_ms)
    }

    /// Current Unix seconds: `offset + S + floor((elapsed + frac_ms) / 1000)`.
    ///
    /// Saturates at the `i64` range instead of overflowing.
    pub fn epoch_seconds(&self, offset_secs: i64, now_ms: u32) -> i64 {
        offset_secs
            .saturating_add(self.server_epoch_secs)
            .saturating_add(self.elapsed_with_fraction_ms(now_ms) / 1000)
    }

    /// Current Unix time in milliseconds, saturating like
    /// [`epoch_seconds`](Self::epoch_seconds).
    pub fn epoch_millis(&self, offset_secs: i64, now_ms: u32) -> i64 {
        offset_secs
            .saturating_add(self.server_epoch_secs)
            .saturating_mul(1000)
            .saturating_add(self.elapsed_with_fraction_ms(now_ms))
    }

    /// Millisecond part of the current second, `0..=999`.
    pub fn subsec_millis(&self, now_ms: u32) -> u32 {
        (self.elapsed_with_fraction_ms(now_ms) % 1000) as u32
    }
}

/// Measurements from one completed request/response exchange.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Exchange {
    /// Local round trip, receive counter minus send counter.
    pub round_trip_ms: u32,
    /// Time the server held the request, `T3 - T2`, in seconds.
    pub server_hold_secs: f64,
    /// One-way delay estimate applied to T3, in seconds. Zero when
    /// compensation is disabled or the estimate was rejected.
    pub delay_secs: f64,
    /// The estimate came out negative and was discarded.
    pub anomaly: bool,
}

/// Build a snapshot from the server's receive (T2) and transmit (T3)
/// timestamps and the local send/receive counter values.
///
/// With `compensate_latency` set, the snapshot anchors at
/// `T3 + ((t_recv - t_send) / 1000 - (T3 - T2)) / 2`. A negative estimate
/// (server hold time larger than the local round trip) is logged and the
/// uncompensated T3 is used instead.
pub fn compensate(
    receive: TimestampFormat,
    transmit: TimestampFormat,
    sent_at_ms: u32,
    received_at_ms: u32,
    compensate_latency: bool,
) -> (Snapshot, Exchange) {
    let round_trip_ms = received_at_ms.wrapping_sub(sent_at_ms);
    let server_hold_secs = transmit.as_secs_f64() - receive.as_secs_f64();

    let mut exchange = Exchange {
        round_trip_ms,
        server_hold_secs,
        ..Exchange::default()
    };

    if compensate_latency {
        let delay = (round_trip_ms as f64 / 1000.0 - server_hold_secs) / 2.0;
        if delay >= 0.0 {
            exchange.delay_secs = delay;
        } else {
            warn!(
                "negative latency estimate {delay:.6}s (round trip {round_trip_ms} ms, server hold {server_hold_secs:.6}s); using uncompensated transmit time"
            );
            exchange.anomaly = true;
        }
    }

    let mut secs = unix_time::to_unix_epoch(transmit.seconds);
    let mut fraction = transmit.fraction_secs() + exchange.delay_secs;
    let carry = fraction.floor();
    secs += carry as i64;
    fraction -= carry;

    let snapshot = Snapshot {
        server_epoch_secs: secs,
        local_clock_at_sync: received_at_ms,
        fraction: Some(fraction),
    };
    (snapshot, exchange)
}
