// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

/*!
Single-server SNTP wall clock.

An [`NtpClock`] asks one time server for the current time, anchors the answer
to a free-running millisecond counter, and projects the wall clock forward
from there until the next refresh is due. It never sets the system clock.

# Example

```no_run
use sntp_clock::{NtpClock, SystemClock};
use sntp_clock::transport::{BlockingTransport, UdpDatagramSocket};

let mut clock = NtpClock::new(BlockingTransport::new(UdpDatagramSocket::new()), SystemClock);
clock.begin()?;
clock.force_update()?;
println!("{} UTC ({})", clock.formatted_time(), clock.weekday_name("en"));
# Ok::<(), sntp_clock::SyncError>(())
```

# Transports

| Transport | Socket | Delivery |
|-----------|--------|----------|
| [`BlockingTransport`](transport::BlockingTransport) | [`UdpDatagramSocket`](transport::UdpDatagramSocket) | caller polls the socket |
| [`EventTransport`](transport::EventTransport) | [`ThreadedUdpSocket`](transport::ThreadedUdpSocket) | receiver thread pushes into a [`PacketSink`](transport::PacketSink) |
| [`EventTransport`](transport::EventTransport) | `TokioUdpSocket` | tokio task pushes into a [`PacketSink`](transport::PacketSink) |

# Feature Flags

| Feature | Default | Description |
|---------|---------|-------------|
| `tokio` | no | `TokioUdpSocket`, an event socket driven by a tokio receive task. |
*/

#![deny(unsafe_code)]
#![warn(missing_docs)]

// Re-export protocol types from sntp_proto for convenience.
pub use sntp_proto::{calendar, protocol, unix_time};

/// The client error type.
pub mod error;

/// Monotonic millisecond clocks.
pub mod clock;

/// Configuration and builder.
pub mod config;

/// Server hostname or address.
pub mod endpoint;

/// Weekday and month name tables.
pub mod locale;

/// The resynchronization state machine.
pub mod session;

/// UDP socket creation options.
pub mod socket_opts;

/// Snapshot projection and latency compensation.
pub mod timing;

/// Blocking and event-driven transports.
pub mod transport;

/// The public clock type.
pub mod client;

pub use calendar::Weekday;
pub use client::NtpClock;
pub use clock::{ManualClock, MonotonicClock, SystemClock};
pub use config::{ClientConfig, NtpClockBuilder};
pub use error::SyncError;
pub use session::{SessionState, UpdateStatus};
