// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use byteorder::{BigEndian, ByteOrder};

use super::{
    ConstPackedSizeBytes, FromBytes, LeapIndicator, Mode, OFFSET_FLAGS, OFFSET_ORIGIN_TIMESTAMP,
    OFFSET_POLL, OFFSET_PRECISION, OFFSET_RECEIVE_TIMESTAMP, OFFSET_REFERENCE_ID, OFFSET_STRATUM,
    OFFSET_TRANSMIT_TIMESTAMP, PACKET_SIZE, REQUEST_POLL, REQUEST_PRECISION, REQUEST_REFERENCE_ID,
    TimestampFormat, ToBytes, Version, ensure_len, pack_flags, unpack_flags,
};
use crate::error::ParseError;

/// A typed view over one fixed-size NTP header.
///
/// All offset arithmetic lives here; callers only see named accessors. The
/// same type is used for the outgoing request and for a received response,
/// so a test server can build a response by starting from the request it got.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Packet {
    bytes: [u8; PACKET_SIZE],
}

impl ConstPackedSizeBytes for Packet {
    const PACKED_SIZE_BYTES: usize = PACKET_SIZE;
}

impl Default for Packet {
    fn default() -> Self {
        Packet {
            bytes: [0u8; PACKET_SIZE],
        }
    }
}

impl Packet {
    /// Build the client request: everything zero except the flags byte, poll,
    /// precision, and the fixed reference identifier.
    pub fn client_request() -> Packet {
        let mut packet = Packet::default();
        packet.bytes[OFFSET_FLAGS] = pack_flags(LeapIndicator::Unknown, Version::V4, Mode::Client);
        packet.bytes[OFFSET_STRATUM] = 0;
        packet.bytes[OFFSET_POLL] = REQUEST_POLL;
        packet.bytes[OFFSET_PRECISION] = REQUEST_PRECISION;
        packet.bytes[OFFSET_REFERENCE_ID..OFFSET_REFERENCE_ID + 4]
            .copy_from_slice(&REQUEST_REFERENCE_ID);
        packet
    }

    /// Wrap an exact 48-byte buffer without validation.
    pub fn from_array(bytes: [u8; PACKET_SIZE]) -> Packet {
        Packet { bytes }
    }

    /// The raw wire bytes.
    pub fn as_bytes(&self) -> &[u8; PACKET_SIZE] {
        &self.bytes
    }

    /// Consume the view and return the raw wire bytes.
    pub fn into_bytes(self) -> [u8; PACKET_SIZE] {
        self.bytes
    }

    /// Leap indicator from the flags byte.
    pub fn leap_indicator(&self) -> LeapIndicator {
        unpack_flags(self.bytes[OFFSET_FLAGS]).0
    }

    /// Protocol version from the flags byte.
    pub fn version(&self) -> Version {
        unpack_flags(self.bytes[OFFSET_FLAGS]).1
    }

    /// Association mode from the flags byte.
    pub fn mode(&self) -> Mode {
        unpack_flags(self.bytes[OFFSET_FLAGS]).2
    }

    /// Stratum byte. The client never interprets it.
    pub fn stratum(&self) -> u8 {
        self.bytes[OFFSET_STRATUM]
    }

    /// Poll exponent byte.
    pub fn poll(&self) -> u8 {
        self.bytes[OFFSET_POLL]
    }

    /// Precision byte.
    pub fn precision(&self) -> u8 {
        self.bytes[OFFSET_PRECISION]
    }

    /// The 4-byte reference identifier.
    pub fn reference_id(&self) -> [u8; 4] {
        let mut id = [0u8; 4];
        id.copy_from_slice(&self.bytes[OFFSET_REFERENCE_ID..OFFSET_REFERENCE_ID + 4]);
        id
    }

    /// Server receive timestamp (T2), bytes 32..40.
    pub fn receive_timestamp(&self) -> TimestampFormat {
        self.timestamp_at(OFFSET_RECEIVE_TIMESTAMP)
    }

    /// Server transmit timestamp (T3), bytes 40..48.
    pub fn transmit_timestamp(&self) -> TimestampFormat {
        self.timestamp_at(OFFSET_TRANSMIT_TIMESTAMP)
    }

    /// Set the flags byte from its three components.
    pub fn set_flags(&mut self, li: LeapIndicator, vn: Version, mode: Mode) {
        self.bytes[OFFSET_FLAGS] = pack_flags(li, vn, mode);
    }

    /// Set the stratum byte.
    pub fn set_stratum(&mut self, stratum: u8) {
        self.bytes[OFFSET_STRATUM] = stratum;
    }

    /// Set the origin timestamp (bytes 24..32).
    pub fn set_origin_timestamp(&mut self, ts: TimestampFormat) {
        self.write_timestamp_at(OFFSET_ORIGIN_TIMESTAMP, ts);
    }

    /// Set the server receive timestamp (bytes 32..40).
    pub fn set_receive_timestamp(&mut self, ts: TimestampFormat) {
        self.write_timestamp_at(OFFSET_RECEIVE_TIMESTAMP, ts);
    }

    /// Set the server transmit timestamp (bytes 40..48).
    pub fn set_transmit_timestamp(&mut self, ts: TimestampFormat) {
        self.write_timestamp_at(OFFSET_TRANSMIT_TIMESTAMP, ts);
    }

    fn timestamp_at(&self, offset: usize) -> TimestampFormat {
        TimestampFormat {
            seconds: BigEndian::read_u32(&self.bytes[offset..offset + 4]),
            fraction: BigEndian::read_u32(&self.bytes[offset + 4..offset + 8]),
        }
    }

    fn write_timestamp_at(&mut self, offset: usize, ts: TimestampFormat) {
        BigEndian::write_u32(&mut self.bytes[offset..offset + 4], ts.seconds);
        BigEndian::write_u32(&mut self.bytes[offset + 4..offset + 8], ts.fraction);
    }
}

impl FromBytes for Packet {
    /// Copy the first 48 bytes of `buf`. Trailing bytes (extension fields,
    /// MACs) are ignored and not counted as consumed.
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError> {
        ensure_len(buf, Self::PACKED_SIZE_BYTES)?;
        let mut bytes = [0u8; PACKET_SIZE];
        bytes.copy_from_slice(&buf[..PACKET_SIZE]);
        Ok((Packet { bytes }, Self::PACKED_SIZE_BYTES))
    }
}

impl ToBytes for Packet {
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ParseError> {
        if buf.len() < Self::PACKED_SIZE_BYTES {
            return Err(ParseError::BufferTooShort {
                needed: Self::PACKED_SIZE_BYTES,
                available: buf.len(),
            });
        }
        buf[..PACKET_SIZE].copy_from_slice(&self.bytes);
        Ok(Self::PACKED_SIZE_BYTES)
    }
}

/// Encode the client request into a fresh 48-byte buffer.
pub fn encode_request() -> [u8; PACKET_SIZE] {
    Packet::client_request().into_bytes()
}

/// Read the server transmit timestamp from a response buffer.
///
/// Returns the era-0 seconds and the fraction in `[0, 1)` built from the high
/// 16 bits of the fraction field.
pub fn decode_transmit_timestamp(buf: &[u8]) -> Result<(u32, f64), ParseError> {
    let (packet, _) = Packet::from_bytes(buf)?;
    let ts = packet.transmit_timestamp();
    Ok((ts.seconds, ts.fraction_secs()))
}

/// Read the server receive timestamp from a response buffer, with the same
/// rules as [`decode_transmit_timestamp`].
pub fn decode_receive_timestamp(buf: &[u8]) -> Result<(u32, f64), ParseError> {
    let (packet, _) = Packet::from_bytes(buf)?;
    let ts = packet.receive_timestamp();
    Ok((ts.seconds, ts.fraction_secs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_layout_matches_wire_constants() {
        let buf = encode_request();
        assert_eq!(buf[0], 0b1110_0011);
        assert_eq!(buf[1], 0);
        assert_eq!(buf[2], 6);
        assert_eq!(buf[3], 0xEC);
        assert_eq!(&buf[4..12], &[0u8; 8]);
        assert_eq!(&buf[12..16], &[49, 0x4E, 49, 52]);
        assert!(buf[16..].iter().all(|&b| b == 0));
    }

    #[test]
    fn request_is_deterministic() {
        assert_eq!(encode_request(), encode_request());
    }

    #[test]
    fn request_accessors() {
        let p = Packet::client_request();
        assert_eq!(p.leap_indicator(), LeapIndicator::Unknown);
        assert_eq!(p.version(), Version::V4);
        assert_eq!(p.mode(), Mode::Client);
        assert_eq!(p.poll(), REQUEST_POLL);
        assert_eq!(p.precision(), REQUEST_PRECISION);
        assert_eq!(p.reference_id(), REQUEST_REFERENCE_ID);
    }

    #[test]
    fn decode_transmit_known_bytes() {
        let mut buf = [0u8; 48];
        buf[40..44].copy_from_slice(&[0xE6, 0x17, 0x3B, 0x5A]);
        buf[44] = 0x40;
        buf[45] = 0x00;
        let (secs, frac) = decode_transmit_timestamp(&buf).unwrap();
        assert_eq!(secs, 0xE617_3B5A);
        assert_eq!(secs, 3_860_282_202);
        assert_eq!(frac, 0.25);
    }

    #[test]
    fn decode_transmit_ignores_low_fraction_bytes() {
        let mut buf = [0u8; 48];
        buf[44] = 0x00;
        buf[45] = 0x01;
        buf[46] = 0xFF;
        buf[47] = 0xFF;
        let (_, frac) = decode_transmit_timestamp(&buf).unwrap();
        assert_eq!(frac, 1.0 / 65536.0);
    }

    #[test]
    fn decode_receive_known_bytes() {
        let mut buf = [0u8; 48];
        buf[32..36].copy_from_slice(&[0xE6, 0x17, 0x3B, 0x59]);
        buf[36] = 0x80;
        let (secs, frac) = decode_receive_timestamp(&buf).unwrap();
        assert_eq!(secs, 0xE617_3B59);
        assert_eq!(frac, 0.5);
    }

    #[test]
    fn decode_rejects_short_buffer() {
        let buf = [0u8; 47];
        assert_eq!(
            decode_transmit_timestamp(&buf),
            Err(ParseError::BufferTooShort {
                needed: 48,
                available: 47
            })
        );
        assert!(decode_receive_timestamp(&buf[..10]).is_err());
    }

    #[test]
    fn from_bytes_ignores_trailing_data() {
        let mut buf = [0u8; 68];
        buf[0] = 0x24;
        let (packet, consumed) = Packet::from_bytes(&buf).unwrap();
        assert_eq!(consumed, 48);
        assert_eq!(packet.mode(), Mode::Server);
    }

    #[test]
    fn setters_write_expected_offsets() {
        let mut p = Packet::default();
        p.set_transmit_timestamp(TimestampFormat {
            seconds: 0x0102_0304,
            fraction: 0x0506_0708,
        });
        p.set_receive_timestamp(TimestampFormat {
            seconds: 0x1112_1314,
            fraction: 0,
        });
        let bytes = p.as_bytes();
        assert_eq!(&bytes[40..48], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&bytes[32..36], &[0x11, 0x12, 0x13, 0x14]);
    }
}
