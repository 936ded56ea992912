// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Error type for the clock client.
//!
//! Every failure is non-fatal: the session returns to idle, the last good
//! snapshot is kept, and [`NtpClock::last_error`](crate::NtpClock::last_error)
//! records what went wrong. Callers that live in `io::Result` code can convert
//! with `?` and still downcast back to [`SyncError`]:
//!
//! ```
//! use sntp_clock::error::SyncError;
//!
//! let e: std::io::Error = SyncError::Timeout.into();
//! assert_eq!(e.kind(), std::io::ErrorKind::TimedOut);
//! let inner = e.get_ref().and_then(|i| i.downcast_ref::<SyncError>());
//! assert_eq!(inner, Some(&SyncError::Timeout));
//! ```

pub use sntp_proto::error::ParseError;

use std::fmt;
use std::io;

/// Errors reported by a synchronization attempt.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SyncError {
    /// An operation needed a bound transport and `begin` was never called
    /// (or `end` was called since).
    NotBegun,
    /// The local port could not be bound.
    BindFailed,
    /// The request datagram could not be sent.
    SendFailed,
    /// The server hostname did not resolve to an address.
    DnsFailed,
    /// No response arrived before the timeout elapsed.
    Timeout,
    /// The response was shorter than 48 bytes.
    ShortPacket,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::NotBegun => write!(f, "client not started: call begin() first"),
            SyncError::BindFailed => write!(f, "failed to bind local UDP port"),
            SyncError::SendFailed => write!(f, "failed to send NTP request"),
            SyncError::DnsFailed => write!(f, "failed to resolve NTP server hostname"),
            SyncError::Timeout => write!(f, "NTP response timed out"),
            SyncError::ShortPacket => write!(f, "NTP response shorter than 48 bytes"),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<ParseError> for SyncError {
    fn from(_: ParseError) -> SyncError {
        SyncError::ShortPacket
    }
}

impl From<SyncError> for io::Error {
    fn from(err: SyncError) -> io::Error {
        let kind = match err {
            SyncError::NotBegun => io::ErrorKind::NotConnected,
            SyncError::BindFailed => io::ErrorKind::AddrInUse,
            SyncError::SendFailed => io::ErrorKind::Other,
            SyncError::DnsFailed => io::ErrorKind::InvalidInput,
            SyncError::Timeout => io::ErrorKind::TimedOut,
            SyncError::ShortPacket => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_kinds() {
        let cases = [
            (SyncError::NotBegun, io::ErrorKind::NotConnected),
            (SyncError::BindFailed, io::ErrorKind::AddrInUse),
            (SyncError::SendFailed, io::ErrorKind::Other),
            (SyncError::DnsFailed, io::ErrorKind::InvalidInput),
            (SyncError::Timeout, io::ErrorKind::TimedOut),
            (SyncError::ShortPacket, io::ErrorKind::InvalidData),
        ];
        for (err, kind) in cases {
            assert_eq!(io::Error::from(err).kind(), kind, "{err:?}");
        }
    }

    #[test]
    fn downcast_roundtrip() {
        let e: io::Error = SyncError::DnsFailed.into();
        let inner = e.get_ref().and_then(|i| i.downcast_ref::<SyncError>());
        assert_eq!(inner, Some(&SyncError::DnsFailed));
    }

    #[test]
    fn parse_error_is_short_packet() {
        let parse = ParseError::BufferTooShort {
            needed: 48,
            available: 12,
        };
        assert_eq!(SyncError::from(parse), SyncError::ShortPacket);
    }

    #[test]
    fn display_messages() {
        assert_eq!(SyncError::Timeout.to_string(), "NTP response timed out");
        assert!(SyncError::NotBegun.to_string().contains("begin()"));
    }
}
