// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Clock whose responses are received by a tokio task.
//!
//! Usage: `cargo run -p sntp_clock-client --features tokio --example tokio_clock -- [server]`

use std::time::Duration;

use sntp_clock::transport::{EventTransport, TokioUdpSocket};
use sntp_clock::{NtpClock, SystemClock, UpdateStatus};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let server = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "pool.ntp.org".to_string());

    let socket = TokioUdpSocket::new(tokio::runtime::Handle::current());
    let mut clock = NtpClock::builder()
        .pool_server_name(server)
        .build(EventTransport::new(socket, SystemClock), SystemClock);
    clock.begin_on(0)?;

    let mut ticker = tokio::time::interval(Duration::from_millis(50));
    for _ in 0..200 {
        ticker.tick().await;
        match clock.update() {
            UpdateStatus::Synced => {
                tracing::info!(epoch = clock.epoch_time(), "synchronized");
            }
            UpdateStatus::Failed(e) => tracing::warn!(error = %e, "attempt failed"),
            _ => {}
        }
    }
    println!("{} {}", clock.formatted_date(), clock.formatted_time());
    Ok(())
}
