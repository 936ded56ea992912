// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

// Buffer-only codec demo
//
// Builds the client request, fabricates a server answer in place, and decodes
// it back into Unix time and calendar fields. Nothing here allocates or needs
// `std`, so the same calls work on a microcontroller's receive buffer.
//
// Usage:
//   cargo run -p sntp_clock-proto --example decode_response

use sntp_proto::calendar;
use sntp_proto::protocol::{
    ConstPackedSizeBytes, LeapIndicator, Mode, Packet, ToBytes, Version, decode_transmit_timestamp,
    encode_request,
};
use sntp_proto::unix_time;

fn main() {
    let request = encode_request();
    println!("request ({} bytes):", Packet::PACKED_SIZE_BYTES);
    for row in request.chunks(16) {
        let hex: Vec<String> = row.iter().map(|b| format!("{b:02x}")).collect();
        println!("  {}", hex.join(" "));
    }

    // A server echoes the header back with its own fields filled in.
    let mut answer = Packet::from_array(request);
    answer.set_flags(LeapIndicator::NoWarning, Version::V4, Mode::Server);
    answer.set_stratum(1);
    answer.set_transmit_timestamp(unix_time::unix_to_timestamp(1_709_208_000, 0.25));

    let mut wire = [0u8; 48];
    if let Err(e) = answer.to_bytes(&mut wire) {
        eprintln!("encode failed: {e}");
        return;
    }

    match decode_transmit_timestamp(&wire) {
        Ok((ntp_secs, fraction)) => {
            let epoch = unix_time::to_unix_epoch(ntp_secs);
            println!();
            println!("transmit timestamp: {ntp_secs} NTP s + {fraction}");
            println!("unix epoch:         {epoch}");
            println!(
                "calendar:           {} {} ({:?})",
                calendar::civil_date(epoch),
                calendar::time_of_day(epoch),
                calendar::day_of_week(epoch)
            );
        }
        Err(e) => eprintln!("decode failed: {e}"),
    }

    // A truncated datagram is rejected, never read past its end.
    match decode_transmit_timestamp(&wire[..30]) {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("truncated input: {e}"),
    }
}
