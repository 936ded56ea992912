// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Real UDP exchanges against an in-process server on 127.0.0.1.

mod common;

use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use common::{Behavior, MockServer, NEW_YEAR_2024, Redirected};
use sntp_clock::socket_opts::SocketOptions;
use sntp_clock::transport::{BlockingTransport, EventTransport, ThreadedUdpSocket, UdpDatagramSocket};
use sntp_clock::{NtpClock, SyncError, SystemClock, UpdateStatus};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn loopback_opts() -> SocketOptions {
    SocketOptions {
        bind_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        ..SocketOptions::default()
    }
}

fn blocking_clock(
    server: &MockServer,
) -> NtpClock<BlockingTransport<Redirected<UdpDatagramSocket>>, SystemClock> {
    let socket = Redirected::new(UdpDatagramSocket::with_options(loopback_opts()), server.addr());
    let mut clock = NtpClock::builder()
        .pool_server_address(IpAddr::V4(Ipv4Addr::LOCALHOST))
        .timeout(Duration::from_secs(2))
        .build(BlockingTransport::new(socket), SystemClock);
    clock.begin_on(0).unwrap();
    clock
}

fn event_clock(
    server: &MockServer,
) -> NtpClock<EventTransport<Redirected<ThreadedUdpSocket>>, SystemClock> {
    let socket = Redirected::new(ThreadedUdpSocket::with_options(loopback_opts()), server.addr());
    let mut clock = NtpClock::builder()
        .pool_server_address(IpAddr::V4(Ipv4Addr::LOCALHOST))
        .timeout(Duration::from_secs(2))
        .build(EventTransport::new(socket, SystemClock), SystemClock);
    clock.begin_on(0).unwrap();
    clock
}

fn assert_near_new_year(clock_epoch: i64) {
    assert!(
        (NEW_YEAR_2024..NEW_YEAR_2024 + 3).contains(&clock_epoch),
        "epoch {clock_epoch} not near 2024-01-01"
    );
}

#[test]
fn blocking_force_update() {
    init_logging();
    let server = MockServer::start(NEW_YEAR_2024, Behavior::Reply);
    let mut clock = blocking_clock(&server);

    clock.force_update().unwrap();
    assert!(clock.is_time_set());
    assert_near_new_year(clock.epoch_time());
    assert_eq!(clock.formatted_date(), "2024-01-01");
    assert_eq!(server.requests(), 1);
    assert!(clock.last_exchange().unwrap().round_trip_ms < 2_000);
}

#[test]
fn blocking_non_blocking_steps() {
    init_logging();
    let server = MockServer::start(NEW_YEAR_2024, Behavior::Reply);
    let mut clock = blocking_clock(&server);

    let deadline = Instant::now() + Duration::from_secs(2);
    let mut status = clock.update();
    assert_eq!(status, UpdateStatus::InProgress);
    while status == UpdateStatus::InProgress && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(1));
        status = clock.update();
    }
    assert_eq!(status, UpdateStatus::Synced);
    assert_eq!(clock.update(), UpdateStatus::NotDue);
}

#[test]
fn silent_server_times_out() {
    init_logging();
    let server = MockServer::start(NEW_YEAR_2024, Behavior::Silent);
    let mut clock = blocking_clock(&server);

    let started = Instant::now();
    assert_eq!(
        clock.force_update_with_timeout(Duration::from_millis(200)),
        Err(SyncError::Timeout)
    );
    assert!(started.elapsed() >= Duration::from_millis(200));
    assert_eq!(clock.last_error(), Some(SyncError::Timeout));
    assert!(!clock.is_time_set());
}

#[test]
fn short_response_is_rejected() {
    init_logging();
    let server = MockServer::start(NEW_YEAR_2024, Behavior::Short(40));
    let mut clock = blocking_clock(&server);
    assert_eq!(clock.force_update(), Err(SyncError::ShortPacket));
    assert!(!clock.is_time_set());

    server.set_behavior(Behavior::Reply);
    assert_eq!(clock.force_update(), Ok(()));
}

#[test]
fn rebinds_after_local_port_change() {
    init_logging();
    let server = MockServer::start(NEW_YEAR_2024, Behavior::Reply);
    let mut clock = blocking_clock(&server);
    clock.force_update().unwrap();
    let first = clock.transport().socket().inner.local_addr().unwrap();

    clock.set_local_port(0);
    assert!(clock.transport().socket().inner.local_addr().is_none());
    clock.force_update().unwrap();
    assert!(clock.transport().socket().inner.local_addr().is_some());
    assert_eq!(server.requests(), 2);
    assert_eq!(first.ip(), Ipv4Addr::LOCALHOST);
}

#[test]
fn threaded_event_socket_syncs() {
    init_logging();
    let server = MockServer::start(NEW_YEAR_2024, Behavior::Reply);
    let mut clock = event_clock(&server);
    clock.force_update().unwrap();
    assert_near_new_year(clock.epoch_time());
    assert!(!clock.transport().request_in_flight());
}

#[test]
fn threaded_event_socket_accepts_late_response() {
    init_logging();
    let server = MockServer::start(NEW_YEAR_2024, Behavior::Delayed(Duration::from_millis(300)));
    let mut clock = event_clock(&server);
    clock.set_retry_backoff(Duration::from_secs(30));

    assert_eq!(
        clock.force_update_with_timeout(Duration::from_millis(50)),
        Err(SyncError::Timeout)
    );

    let deadline = Instant::now() + Duration::from_secs(3);
    let mut status = clock.update();
    while status != UpdateStatus::Synced && Instant::now() < deadline {
        assert_eq!(status, UpdateStatus::BackingOff);
        std::thread::sleep(Duration::from_millis(10));
        status = clock.update();
    }
    assert_eq!(status, UpdateStatus::Synced);
    assert_near_new_year(clock.epoch_time());
    assert_eq!(server.requests(), 1);
}
