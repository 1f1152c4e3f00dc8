// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::{Duration, Instant};

/// Measures wall-clock time, with support for per-frame laps.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    start_time: Instant,
    last_lap: Instant,
}

impl Stopwatch {
    /// Creates a new Stopwatch and starts it.
    /// ## Returns
    /// A running stopwatch.
    #[inline]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_lap: now,
        }
    }

    /// Returns the elapsed time since the stopwatch was started.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the elapsed time since the stopwatch was started in milliseconds.
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Returns the elapsed time since the stopwatch was started in seconds as f64.
    #[inline]
    pub fn elapsed_secs_f64(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// Starts a new lap.
    /// ## Returns
    /// The time since the previous lap, or since the start for the first lap.
    /// This is the value to pass to [`FrameScheduler::tick`](super::FrameScheduler::tick).
    #[inline]
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now.duration_since(self.last_lap);
        self.last_lap = now;
        delta
    }

    /// Restarts the stopwatch from zero.
    #[inline]
    pub fn restart(&mut self) {
        *self = Self::new();
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const SMALL_DURATION_MS: u64 = 15;
    const SLEEP_DURATION_MS: u64 = 30;

    #[test]
    fn stopwatch_starts_near_zero() {
        let watch = Stopwatch::new();
        assert!(
            watch.elapsed() < Duration::from_millis(SMALL_DURATION_MS),
            "Initial elapsed duration should be very small"
        );
        assert!(watch.elapsed_secs_f64() < SMALL_DURATION_MS as f64 / 1000.0);
    }

    #[test]
    fn stopwatch_laps_partition_elapsed_time() {
        let mut watch = Stopwatch::new();
        thread::sleep(Duration::from_millis(SLEEP_DURATION_MS));
        let first = watch.lap();
        thread::sleep(Duration::from_millis(SLEEP_DURATION_MS));
        let second = watch.lap();

        assert!(first >= Duration::from_millis(SLEEP_DURATION_MS));
        assert!(second >= Duration::from_millis(SLEEP_DURATION_MS));
        assert!(
            first + second <= watch.elapsed(),
            "Laps ({first:?} + {second:?}) cannot exceed the total elapsed time"
        );
        assert!(watch.elapsed_ms() >= 2 * SLEEP_DURATION_MS);
    }

    #[test]
    fn stopwatch_restart_resets() {
        let mut watch = Stopwatch::new();
        thread::sleep(Duration::from_millis(SLEEP_DURATION_MS));
        watch.restart();
        assert!(watch.elapsed() < Duration::from_millis(SLEEP_DURATION_MS));
    }
}
