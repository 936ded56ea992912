// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use crate::error::ParseError;

/// Types that have a constant size when written to or read from bytes.
pub trait ConstPackedSizeBytes {
    /// The constant size in bytes when this type is packed for network transmission.
    const PACKED_SIZE_BYTES: usize;
}

/// Parse a type from a byte slice, returning the parsed value and the number
/// of bytes consumed.
///
/// Works directly on `&[u8]` with no `std::io` dependency, so it is usable in
/// `no_std` firmware that only ever sees a raw receive buffer.
pub trait FromBytes: Sized {
    /// Parse from the given byte slice. Returns the parsed value and the
    /// number of bytes consumed from the front of `buf`.
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError>;
}

/// Serialize a type into a byte slice, returning the number of bytes written.
pub trait ToBytes {
    /// Write this value into the given byte slice. Returns the number of bytes
    /// written. Fails with [`ParseError::BufferTooShort`] if `buf` is too short.
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ParseError>;
}

/// Fail with [`ParseError::BufferTooShort`] unless `buf` holds at least `needed` bytes.
pub(crate) fn ensure_len(buf: &[u8], needed: usize) -> Result<(), ParseError> {
    if buf.len() < needed {
        return Err(ParseError::BufferTooShort {
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}
