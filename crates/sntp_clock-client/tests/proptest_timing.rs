// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

mod common;

use chrono::{Datelike, Timelike};
use common::{ScriptedSocket, response, test_server_ip};
use proptest::prelude::*;
use sntp_clock::protocol::TimestampFormat;
use sntp_clock::timing::{self, Snapshot};
use sntp_clock::transport::BlockingTransport;
use sntp_clock::{ManualClock, NtpClock};

proptest! {
    /// Projection depends only on the wrapping distance from the anchor,
    /// wherever the anchor sits on the counter.
    #[test]
    fn elapsed_is_wrapping_distance(
        anchor in any::<u32>(),
        elapsed in 0u32..u32::MAX,
        server in -4_000_000_000i64..8_000_000_000i64,
        offset in -86_400i64..86_400i64,
    ) {
        let snap = Snapshot {
            server_epoch_secs: server,
            local_clock_at_sync: anchor,
            fraction: None,
        };
        let now = anchor.wrapping_add(elapsed);
        prop_assert_eq!(snap.epoch_seconds(offset, now), offset + server + (elapsed / 1000) as i64);
        prop_assert_eq!(snap.subsec_millis(now), elapsed % 1000);
        prop_assert_eq!(
            snap.epoch_millis(offset, now),
            (offset + server) * 1000 + elapsed as i64
        );
    }

    /// The compensated fraction always lands in [0, 1) and never moves the
    /// anchor backwards.
    #[test]
    fn compensation_normalizes_fraction(
        seconds in 2_208_988_800u32..u32::MAX,
        t2_frac in 0.0f64..1.0,
        hold_ms in 0u32..500,
        round_trip in 0u32..10_000,
        sent_at in any::<u32>(),
    ) {
        let t2 = TimestampFormat::from_parts(seconds, t2_frac);
        let t3_real = t2.as_secs_f64() + hold_ms as f64 / 1000.0;
        let t3 = TimestampFormat::from_parts(t3_real.floor() as u32, t3_real.fract());
        let (snap, exchange) =
            timing::compensate(t2, t3, sent_at, sent_at.wrapping_add(round_trip), true);

        let fraction = snap.fraction.unwrap();
        prop_assert!((0.0..1.0).contains(&fraction));
        prop_assert_eq!(exchange.round_trip_ms, round_trip);
        prop_assert!(exchange.delay_secs >= 0.0);
        prop_assert!(snap.server_epoch_secs >= t3.seconds as i64 - 2_208_988_800);
    }

    /// Calendar accessors on a synced clock agree with chrono for the
    /// projected instant, offset included.
    #[test]
    fn clock_fields_match_chrono(
        unix_secs in 0i64..2_000_000_000,
        offset in -1_000_000_000i32..1_000_000_000,
        elapsed in 0u32..100_000_000,
    ) {
        let time = ManualClock::new(0);
        let mut clock = NtpClock::builder()
            .pool_server_address(test_server_ip())
            .latency_compensation(false)
            .time_offset(offset)
            .build(
                BlockingTransport::new(ScriptedSocket::replying(response(unix_secs, 0.0))),
                time.clone(),
            );
        clock.begin().unwrap();
        clock.force_update().unwrap();
        time.advance(elapsed);

        let expected = unix_secs + i64::from(offset) + i64::from(elapsed / 1000);
        let dt = chrono::DateTime::from_timestamp(expected, 0).unwrap();
        prop_assert_eq!(clock.epoch_time(), expected);
        prop_assert_eq!(clock.formatted_date(), dt.format("%Y-%m-%d").to_string());
        prop_assert_eq!(clock.formatted_time(), dt.format("%H:%M:%S").to_string());
        prop_assert_eq!(clock.year(), dt.year());
        prop_assert_eq!(u32::from(clock.month()), dt.month());
        prop_assert_eq!(u32::from(clock.day()), dt.day());
        prop_assert_eq!(u32::from(clock.hours()), dt.hour());
        prop_assert_eq!(
            u32::from(clock.day_of_week().index()),
            dt.weekday().num_days_from_sunday()
        );
    }
}
