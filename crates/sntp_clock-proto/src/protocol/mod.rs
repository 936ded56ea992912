// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! The 48-byte NTP header used by unicast SNTP, and the handful of fields a
//! single-server client actually interprets.
//!
//! ```ignore
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |LI | VN  |Mode |    Stratum    |     Poll      |   Precision   |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                 Root Delay / Root Dispersion                  |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          Reference ID                         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |        Reference / Origin Timestamp (unset on request)        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                Receive Timestamp (bytes 32..40)               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |               Transmit Timestamp (bytes 40..48)               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

/// NTP port number.
pub const PORT: u16 = 123;

/// Size of the fixed NTP header on the wire.
pub const PACKET_SIZE: usize = 48;

/// Poll exponent carried in every client request (64 s).
pub const REQUEST_POLL: u8 = 6;

/// Precision byte carried in every client request (`-20`, about 1 µs).
pub const REQUEST_PRECISION: u8 = 0xEC;

/// Reference identifier carried in every client request (ASCII `"1N14"`).
pub const REQUEST_REFERENCE_ID: [u8; 4] = [49, 0x4E, 49, 52];

// Byte offsets of the fields the codec reads or writes.
pub(crate) const OFFSET_FLAGS: usize = 0;
pub(crate) const OFFSET_STRATUM: usize = 1;
pub(crate) const OFFSET_POLL: usize = 2;
pub(crate) const OFFSET_PRECISION: usize = 3;
pub(crate) const OFFSET_REFERENCE_ID: usize = 12;
pub(crate) const OFFSET_ORIGIN_TIMESTAMP: usize = 24;
pub(crate) const OFFSET_RECEIVE_TIMESTAMP: usize = 32;
pub(crate) const OFFSET_TRANSMIT_TIMESTAMP: usize = 40;

mod packet;
mod traits;
mod types;

pub use self::packet::*;
pub use self::traits::*;
pub use self::types::*;
