// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Monotonic millisecond clock abstraction.
//!
//! The client never reads the system wall clock. All elapsed-time arithmetic
//! runs on a free-running `u32` millisecond counter that wraps roughly every
//! 49.7 days, so every difference must be taken with
//! [`u32::wrapping_sub`].

use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// A free-running millisecond counter.
pub trait MonotonicClock {
    /// Current counter value in milliseconds. Wraps at `u32::MAX`.
    fn now_ms(&self) -> u32;

    /// Block for roughly `ms` milliseconds. Used by the blocking update loop.
    fn sleep_ms(&self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }
}

impl<C: MonotonicClock + ?Sized> MonotonicClock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }

    fn sleep_ms(&self, ms: u32) {
        (**self).sleep_ms(ms)
    }
}

/// Milliseconds since the first use of any `SystemClock` in this process,
/// truncated to `u32`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

fn process_start() -> Instant {
    static START: OnceLock<Instant> = OnceLock::new();
    *START.get_or_init(Instant::now)
}

impl MonotonicClock for SystemClock {
    fn now_ms(&self) -> u32 {
        process_start().elapsed().as_millis() as u32
    }
}

/// A clock that only moves when told to. Clones share the same counter.
///
/// `sleep_ms` advances the counter instead of sleeping, so a blocking update
/// against a silent transport times out instantly in tests.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<AtomicU32>,
}

impl ManualClock {
    /// A clock starting at `start_ms`.
    pub fn new(start_ms: u32) -> ManualClock {
        ManualClock {
            now: Arc::new(AtomicU32::new(start_ms)),
        }
    }

    /// Jump to an absolute value.
    pub fn set(&self, ms: u32) {
        self.now.store(ms, Ordering::SeqCst);
    }

    /// Move forward by `ms`, wrapping at `u32::MAX`.
    pub fn advance(&self, ms: u32) {
        // fetch_add on atomics wraps on overflow.
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl MonotonicClock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.load(Ordering::SeqCst)
    }

    fn sleep_ms(&self, ms: u32) {
        self.advance(ms);
    }
}
