// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Wire format, epoch conversion, and calendar arithmetic for a minimal
//! single-server SNTP client.
//!
//! Everything in this crate is a pure function of its input: no sockets, no
//! clocks, no allocation. The client crate (`sntp_clock`) layers transports
//! and the resynchronization state machine on top.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Errors produced while decoding or encoding packets.
pub mod error;

/// The fixed 48-byte request/response layout and its codec.
pub mod protocol;

/// Conversions between the NTP era-0 epoch (1900) and the Unix epoch (1970).
pub mod unix_time;

/// Day-of-week, time-of-day, and proleptic Gregorian date decomposition.
pub mod calendar;
