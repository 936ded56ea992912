// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{EventSocket, PacketSink};
use crate::socket_opts::SocketOptions;

/// UDP socket whose datagrams are received by a tokio task and pushed into
/// a [`PacketSink`], for [`EventTransport`](super::EventTransport).
///
/// The clock itself is still polled synchronously; only reception runs on
/// the runtime.
///
/// `close` waits briefly for the receive task to release its socket, so a
/// rebind on the same port does not leave two receivers on it. On a
/// current-thread runtime it cannot wait; the old task then stops
/// delivering and exits on its next wake-up.
#[derive(Debug)]
pub struct TokioUdpSocket {
    handle: Handle,
    opts: SocketOptions,
    socket: Option<Arc<UdpSocket>>,
    task: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

/// Upper bound on how long `close` waits for the aborted task.
const RELEASE_WAIT: Duration = Duration::from_millis(100);

/// Whether the calling thread may block while the runtime makes progress.
fn can_block_for_runtime() -> bool {
    !matches!(
        Handle::try_current().map(|h| h.runtime_flavor()),
        Ok(RuntimeFlavor::CurrentThread)
    )
}

impl TokioUdpSocket {
    /// An unbound socket whose receive task will run on `handle`.
    pub fn new(handle: Handle) -> Self {
        TokioUdpSocket::with_options(handle, SocketOptions::default())
    }

    /// An unbound socket with custom bind options.
    pub fn with_options(handle: Handle, opts: SocketOptions) -> Self {
        TokioUdpSocket {
            handle,
            opts,
            socket: None,
            task: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Local address, once bound.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }
}

async fn receive_task(socket: Arc<UdpSocket>, sink: PacketSink, stop: Arc<AtomicBool>) {
    let mut buf = [0u8; 1024];
    loop {
        let received = socket.recv_from(&mut buf).await;
        if stop.load(Ordering::Acquire) {
            debug!("receive task stopped");
            return;
        }
        match received {
            Ok((n, src)) => {
                let kept = sink.deliver(&buf[..n]);
                debug!(bytes = n, %src, kept, "received datagram");
            }
            Err(e) => {
                warn!(error = %e, "receive failed");
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
        }
    }
}

impl EventSocket for TokioUdpSocket {
    fn bind(&mut self, port: u16, sink: PacketSink) -> io::Result<()> {
        self.close();
        let std_socket = self.opts.bind_udp(port, true)?;
        let socket = {
            let _guard = self.handle.enter();
            Arc::new(UdpSocket::from_std(std_socket)?)
        };
        let stop = Arc::new(AtomicBool::new(false));
        self.task = Some(self.handle.spawn(receive_task(
            Arc::clone(&socket),
            sink,
            Arc::clone(&stop),
        )));
        self.socket = Some(socket);
        self.stop = stop;
        Ok(())
    }

    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
        match &self.socket {
            Some(s) => s.try_send_to(buf, addr),
            None => Err(io::Error::new(io::ErrorKind::NotConnected, "socket not bound")),
        }
    }

    fn close(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.socket = None;
        let Some(task) = self.task.take() else {
            return;
        };
        task.abort();
        if can_block_for_runtime() {
            let deadline = Instant::now() + RELEASE_WAIT;
            while !task.is_finished() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(1));
            }
        }
        if !task.is_finished() {
            warn!("receive task still holds its socket after close");
        }
    }
}

impl Drop for TokioUdpSocket {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    use crate::clock::ManualClock;
    use crate::transport::{EventTransport, Transport};

    fn loopback_opts() -> SocketOptions {
        SocketOptions {
            bind_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            ..SocketOptions::default()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn close_releases_socket_before_returning() {
        let mut socket = TokioUdpSocket::with_options(Handle::current(), loopback_opts());
        let transport = EventTransport::new(
            TokioUdpSocket::new(Handle::current()),
            ManualClock::new(0),
        );
        socket.bind(0, transport.sink()).unwrap();
        let held = Arc::downgrade(socket.socket.as_ref().unwrap());

        socket.close();
        assert!(held.upgrade().is_none());
        assert!(socket.local_addr().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn rebind_same_port_leaves_one_receiver() {
        let mut transport = EventTransport::new(
            TokioUdpSocket::with_options(Handle::current(), loopback_opts()),
            ManualClock::new(0),
        );
        transport.begin(0).unwrap();
        let port = transport.socket().local_addr().unwrap().port();
        let first = Arc::downgrade(transport.socket().socket.as_ref().unwrap());

        transport.begin(port).unwrap();
        assert!(first.upgrade().is_none());
        assert_eq!(transport.socket().local_addr().unwrap().port(), port);
    }
}
