// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Poll a clock whose responses arrive on a receiver thread.
//!
//! Usage: `cargo run -p sntp_clock-client --example event_clock -- [server] [lang]`

use std::time::Duration;

use sntp_clock::transport::{EventTransport, ThreadedUdpSocket};
use sntp_clock::{NtpClock, SystemClock, UpdateStatus};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let server = args.next().unwrap_or_else(|| "pool.ntp.org".to_string());
    let lang = args.next().unwrap_or_else(|| "en".to_string());

    let mut clock = NtpClock::builder()
        .pool_server_name(server)
        .update_interval(Duration::from_secs(10))
        .build(EventTransport::new(ThreadedUdpSocket::new(), SystemClock), SystemClock);
    clock.begin_on(0)?;

    for _ in 0..300 {
        match clock.update() {
            UpdateStatus::Synced => log::info!("synchronized: {:?}", clock.last_exchange()),
            UpdateStatus::Failed(e) => log::warn!("attempt failed: {e}"),
            _ => {}
        }
        if clock.is_time_set() {
            println!(
                "{}, {} {} {}",
                clock.weekday_name(&lang),
                clock.day(),
                clock.month_name(&lang),
                clock.formatted_time()
            );
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    Ok(())
}
