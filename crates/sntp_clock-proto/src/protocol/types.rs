// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use byteorder::{BigEndian, ByteOrder};

use super::{ConstPackedSizeBytes, FromBytes, ToBytes, ensure_len};
use crate::error::ParseError;

/// Scale of the 16-bit fraction the client keeps from each timestamp.
pub const FRACTION_SCALE: f64 = 65536.0;

/// **NTP Timestamp Format** - a 32-bit unsigned seconds field counted from
/// 0 h 1 January 1900 UTC, followed by a 32-bit binary fraction.
///
/// ### Layout
///
/// ```ignore
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            Seconds                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            Fraction                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimestampFormat {
    /// Seconds since 1900-01-01 00:00:00 UTC (32-bit unsigned).
    pub seconds: u32,
    /// Fractional seconds (32-bit unsigned binary fraction).
    pub fraction: u32,
}

impl TimestampFormat {
    /// The fractional part in `[0, 1)`, using only the high 16 bits of the
    /// fraction field (`value / 65536`).
    pub fn fraction_secs(&self) -> f64 {
        (self.fraction >> 16) as f64 / FRACTION_SCALE
    }

    /// Seconds and fraction as one real number of seconds since 1900.
    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + self.fraction_secs()
    }

    /// Build a timestamp from whole seconds and a fraction in `[0, 1)`.
    ///
    /// The fraction is stored with 16-bit resolution in the high half of the
    /// field, which is all a decoder of this crate reads back.
    pub fn from_parts(seconds: u32, fraction: f64) -> Self {
        let high = (fraction.clamp(0.0, 1.0) * FRACTION_SCALE).min(FRACTION_SCALE - 1.0) as u32;
        TimestampFormat {
            seconds,
            fraction: high << 16,
        }
    }
}

impl ConstPackedSizeBytes for TimestampFormat {
    const PACKED_SIZE_BYTES: usize = 8;
}

impl FromBytes for TimestampFormat {
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError> {
        ensure_len(buf, Self::PACKED_SIZE_BYTES)?;
        let seconds = BigEndian::read_u32(&buf[0..4]);
        let fraction = BigEndian::read_u32(&buf[4..8]);
        Ok((
            TimestampFormat { seconds, fraction },
            Self::PACKED_SIZE_BYTES,
        ))
    }
}

impl ToBytes for TimestampFormat {
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ParseError> {
        if buf.len() < Self::PACKED_SIZE_BYTES {
            return Err(ParseError::BufferTooShort {
                needed: Self::PACKED_SIZE_BYTES,
                available: buf.len(),
            });
        }
        BigEndian::write_u32(&mut buf[0..4], self.seconds);
        BigEndian::write_u32(&mut buf[4..8], self.fraction);
        Ok(Self::PACKED_SIZE_BYTES)
    }
}

/// A 2-bit integer warning of an impending leap second.
///
/// Clients send [`LeapIndicator::Unknown`] because they are, by definition,
/// not yet synchronized.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum LeapIndicator {
    /// No leap required.
    #[default]
    NoWarning = 0,
    /// Last minute of the day has 61 seconds.
    AddOne = 1,
    /// Last minute of the day has 59 seconds.
    SubOne = 2,
    /// Clock unsynchronized.
    Unknown = 3,
}

impl From<u8> for LeapIndicator {
    /// Decode the two low bits of `value`.
    fn from(value: u8) -> Self {
        match value & 0b11 {
            0 => LeapIndicator::NoWarning,
            1 => LeapIndicator::AddOne,
            2 => LeapIndicator::SubOne,
            _ => LeapIndicator::Unknown,
        }
    }
}

/// A 3-bit integer representing the NTP version number.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Version(pub(super) u8);

impl Version {
    /// NTP version 3.
    pub const V3: Version = Version(3);
    /// NTP version 4.
    pub const V4: Version = Version(4);

    /// The raw 3-bit version number.
    pub fn value(&self) -> u8 {
        self.0
    }
}

/// A 3-bit integer representing the association mode.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Mode {
    /// Reserved mode (value 0).
    Reserved = 0,
    /// Symmetric active mode (value 1).
    SymmetricActive = 1,
    /// Symmetric passive mode (value 2).
    SymmetricPassive = 2,
    /// Client mode (value 3).
    #[default]
    Client = 3,
    /// Server mode (value 4).
    Server = 4,
    /// Broadcast mode (value 5).
    Broadcast = 5,
    /// NTP control message mode (value 6).
    NtpControlMessage = 6,
    /// Reserved for private use (value 7).
    ReservedForPrivateUse = 7,
}

impl From<u8> for Mode {
    /// Decode the three low bits of `value`.
    fn from(value: u8) -> Self {
        match value & 0b111 {
            0 => Mode::Reserved,
            1 => Mode::SymmetricActive,
            2 => Mode::SymmetricPassive,
            3 => Mode::Client,
            4 => Mode::Server,
            5 => Mode::Broadcast,
            6 => Mode::NtpControlMessage,
            _ => Mode::ReservedForPrivateUse,
        }
    }
}

/// Pack leap indicator, version, and mode into the first header byte.
pub fn pack_flags(li: LeapIndicator, vn: Version, mode: Mode) -> u8 {
    let mut li_vn_mode = 0u8;
    li_vn_mode |= (li as u8) << 6;
    li_vn_mode |= (vn.0 & 0b111) << 3;
    li_vn_mode |= mode as u8;
    li_vn_mode
}

/// Split the first header byte into leap indicator, version, and mode.
pub fn unpack_flags(li_vn_mode: u8) -> (LeapIndicator, Version, Mode) {
    (
        LeapIndicator::from(li_vn_mode >> 6),
        Version((li_vn_mode >> 3) & 0b111),
        Mode::from(li_vn_mode),
    )
}
