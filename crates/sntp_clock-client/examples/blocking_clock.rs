// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Synchronize once, then print the projected time every second.
//!
//! Usage: `cargo run -p sntp_clock-client --example blocking_clock -- [server] [offset-secs]`
//!
//! Set `RUST_LOG=debug` to see the exchange.

use std::time::Duration;

use sntp_clock::transport::{BlockingTransport, UdpDatagramSocket};
use sntp_clock::{NtpClock, SystemClock, UpdateStatus};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let server = args.next().unwrap_or_else(|| "pool.ntp.org".to_string());
    let offset: i32 = match args.next() {
        Some(s) => s.parse()?,
        None => 0,
    };

    let mut clock = NtpClock::builder()
        .pool_server_name(server.as_str())
        .time_offset(offset)
        .update_interval(Duration::from_secs(30))
        .build(BlockingTransport::new(UdpDatagramSocket::new()), SystemClock);
    clock.set_random_port(49152..=65535);
    clock.begin()?;

    clock.force_update()?;
    let exchange = clock.last_exchange().unwrap_or_default();
    log::info!(
        "synchronized with {server}: round trip {} ms, delay {:.3} ms",
        exchange.round_trip_ms,
        exchange.delay_secs * 1000.0
    );

    for _ in 0..10 {
        if let UpdateStatus::Failed(e) = clock.update() {
            log::warn!("refresh failed: {e}");
        }
        println!(
            "{} {} {}.{:03} ({}, {})",
            clock.formatted_date(),
            clock.formatted_time(),
            clock.epoch_time(),
            clock.millis(),
            clock.weekday_name("en"),
            clock.month_name("en"),
        );
        std::thread::sleep(Duration::from_secs(1));
    }

    clock.end();
    Ok(())
}
