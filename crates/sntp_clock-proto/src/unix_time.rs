// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use crate::protocol::TimestampFormat;

/// The number of seconds from 1st January 1900 UTC to the start of the Unix epoch.
pub const EPOCH_DELTA: i64 = 2_208_988_800;

/// Convert era-0 NTP seconds to Unix seconds.
///
/// The result is not clamped: timestamps before 1970 come back negative.
pub fn to_unix_epoch(ntp_seconds: u32) -> i64 {
    ntp_seconds as i64 - EPOCH_DELTA
}

/// Convert Unix seconds to the 32-bit NTP seconds field.
///
/// Wraps modulo 2^32, so dates past 2036-02-07 land in era 1 exactly as they
/// would on the wire.
pub fn to_ntp_seconds(unix_seconds: i64) -> u32 {
    (unix_seconds + EPOCH_DELTA) as u32
}

/// Build an on-wire timestamp from Unix seconds and a fraction in `[0, 1)`.
pub fn unix_to_timestamp(unix_seconds: i64, fraction: f64) -> TimestampFormat {
    TimestampFormat::from_parts(to_ntp_seconds(unix_seconds), fraction)
}

/// The current wall-clock time as an on-wire timestamp.
///
/// Only used by test servers and diagnostics; the client itself never reads
/// the system wall clock.
#[cfg(feature = "std")]
pub fn now_timestamp() -> TimestampFormat {
    match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
        Ok(d) => unix_to_timestamp(d.as_secs() as i64, d.subsec_nanos() as f64 / 1e9),
        Err(_) => TimestampFormat::default(),
    }
}
