/*
 * Copyright (c) 2024, United States Government, as represented by the
 * Administrator of the National Aeronautics and Space Administration.
 * All rights reserved.
 *
 * The ODIN - Open Data Integration Framework is licensed under the
 * Apache License, Version 2.0 (the "License"); you may not use this file
 * except in compliance with the License. You may obtain a copy of the
 * License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! time abstraction so the dispatcher can be driven by either the real
//! monotonic clock or a scripted clock in tests. `Instant` here is a plain
//! millisecond count, not `std::time::Instant` - this is what lets a
//! simulated source fast-forward without an actual sleep.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

/// a monotonic point in time with millisecond resolution. Not required to
/// correspond to wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(u64);

impl Instant {
    pub fn from_millis(millis: u64) -> Instant {
        Instant(millis)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    pub fn checked_duration_since(self, earlier: Instant) -> Option<Duration> {
        self.0.checked_sub(earlier.0).map(Duration::from_millis)
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// abstracts "now" and "duration between two instants" so the dispatch loop
/// never has to know whether it is driven by the real clock or a test
/// double. `difference`'s `measurement_tag` lets a simulated source return a
/// scripted duration regardless of the instants passed in; the real source
/// ignores it.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Instant;
    fn difference(&self, measurement_tag: &str, t0: Instant, t1: Instant) -> Duration;
}

/// the real monotonic clock, anchored to the moment the source was created.
pub struct SystemTimeSource {
    epoch: std::time::Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        SystemTimeSource { epoch: std::time::Instant::now() }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant(self.epoch.elapsed().as_millis() as u64)
    }

    fn difference(&self, _measurement_tag: &str, t0: Instant, t1: Instant) -> Duration {
        t1.checked_duration_since(t0).unwrap_or_default()
    }
}

/// a scripted clock for deterministic tests: `now()` returns whatever was
/// last set with [`SimulatedTimeSource::set_now`]/[`advance`], and
/// `difference` returns a scripted value for a given tag if one was
/// registered, falling back to the plain instant subtraction otherwise.
pub struct SimulatedTimeSource {
    now: Mutex<Instant>,
    scripted: Mutex<HashMap<String, Duration>>,
}

impl SimulatedTimeSource {
    pub fn new(start: Instant) -> Self {
        SimulatedTimeSource { now: Mutex::new(start), scripted: Mutex::new(HashMap::new()) }
    }

    pub fn set_now(&self, t: Instant) {
        *self.now.lock().expect("simulated clock lock poisoned") = t;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("simulated clock lock poisoned");
        *now = Instant(now.0 + by.as_millis() as u64);
    }

    pub fn script(&self, measurement_tag: impl Into<String>, duration: Duration) {
        self.scripted.lock().expect("simulated clock lock poisoned").insert(measurement_tag.into(), duration);
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> Instant {
        *self.now.lock().expect("simulated clock lock poisoned")
    }

    fn difference(&self, measurement_tag: &str, t0: Instant, t1: Instant) -> Duration {
        if let Some(scripted) = self.scripted.lock().expect("simulated clock lock poisoned").get(measurement_tag) {
            return *scripted;
        }
        t1.checked_duration_since(t0).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_clock_advances_deterministically() {
        let src = SimulatedTimeSource::new(Instant::from_millis(0));
        assert_eq!(src.now(), Instant::from_millis(0));
        src.advance(Duration::from_millis(50));
        assert_eq!(src.now(), Instant::from_millis(50));
        src.set_now(Instant::from_millis(1000));
        assert_eq!(src.now(), Instant::from_millis(1000));
    }

    #[test]
    fn scripted_difference_overrides_actual_instants() {
        let src = SimulatedTimeSource::new(Instant::from_millis(0));
        src.script("net_latency", Duration::from_millis(7));
        let d = src.difference("net_latency", Instant::from_millis(0), Instant::from_millis(1000));
        assert_eq!(d, Duration::from_millis(7));
    }
}
