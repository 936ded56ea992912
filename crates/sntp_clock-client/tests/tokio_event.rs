// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Event transport fed by a tokio receive task.

#![cfg(feature = "tokio")]

mod common;

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use common::{Behavior, MockServer, NEW_YEAR_2024, Redirected};
use sntp_clock::socket_opts::SocketOptions;
use sntp_clock::transport::{EventTransport, TokioUdpSocket};
use sntp_clock::{NtpClock, SystemClock, UpdateStatus};

fn tokio_clock(
    server: &MockServer,
) -> NtpClock<EventTransport<Redirected<TokioUdpSocket>>, SystemClock> {
    let opts = SocketOptions {
        bind_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        ..SocketOptions::default()
    };
    let socket = Redirected::new(
        TokioUdpSocket::with_options(tokio::runtime::Handle::current(), opts),
        server.addr(),
    );
    NtpClock::builder()
        .pool_server_address(IpAddr::V4(Ipv4Addr::LOCALHOST))
        .timeout(Duration::from_secs(2))
        .build(EventTransport::new(socket, SystemClock), SystemClock)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn tokio_socket_syncs() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let server = MockServer::start(NEW_YEAR_2024, Behavior::Reply);
    let mut clock = tokio_clock(&server);
    clock.begin_on(0).unwrap();

    let mut status = clock.update();
    assert_eq!(status, UpdateStatus::InProgress);
    for _ in 0..200 {
        if status != UpdateStatus::InProgress {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        status = clock.update();
    }
    assert_eq!(status, UpdateStatus::Synced);
    assert!((NEW_YEAR_2024..NEW_YEAR_2024 + 3).contains(&clock.epoch_time()));
    assert_eq!(server.requests(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn tokio_socket_drops_unsolicited() {
    let server = MockServer::start(NEW_YEAR_2024, Behavior::Reply);
    let mut clock = tokio_clock(&server);
    clock.begin_on(0).unwrap();

    let local = clock.transport().socket().inner.local_addr().unwrap();
    let stray = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    stray.send_to(&common::response(0, 0.0), local).unwrap();

    for _ in 0..100 {
        if clock.transport().dropped() > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(clock.transport().dropped(), 1);
    assert!(!clock.is_time_set());
    clock.end();
}
