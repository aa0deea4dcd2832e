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

//! the handful of externally tunable knobs the dispatcher cares about,
//! loadable from a RON file the same way the rest of the stack loads its
//! config structs.

use std::path::Path;
use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{OdinTimerError, Result};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimerServiceConfig {
    /// initial capacity of the producer-facing command buffer.
    pub command_buffer_capacity: usize,

    /// name given to the dispatcher thread (shows up in thread dumps/panics).
    pub dispatcher_thread_name: String,

    /// how long `cancel_dispatch_loop` waits for the dispatcher thread to
    /// drain and exit before giving up on a clean join.
    #[serde(deserialize_with = "deserialize_duration", serialize_with = "serialize_duration")]
    pub shutdown_grace_period: Duration,
}

impl Default for TimerServiceConfig {
    fn default() -> Self {
        TimerServiceConfig {
            command_buffer_capacity: 64,
            dispatcher_thread_name: "timer-dispatcher".to_string(),
            shutdown_grace_period: Duration::from_secs(5),
        }
    }
}

pub fn load_config(pathname: impl AsRef<Path>) -> Result<TimerServiceConfig> {
    load_ron(pathname)
}

fn load_ron<C: DeserializeOwned>(pathname: impl AsRef<Path>) -> Result<C> {
    let path = pathname.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| OdinTimerError::ConfigParseError(format!("cannot read {}: {}", path.display(), e)))?;
    ron::from_str::<C>(&contents).map_err(|e| OdinTimerError::ConfigParseError(format!("{:?}", e)))
}

fn deserialize_duration<'a, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'a>,
{
    String::deserialize(deserializer).and_then(|s| parse_duration::parse(&s).map_err(|e| serde::de::Error::custom(format!("{:?}", e))))
}

fn serialize_duration<S: Serializer>(dur: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{:?}", dur))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = TimerServiceConfig::default();
        assert!(cfg.command_buffer_capacity > 0);
        assert!(!cfg.dispatcher_thread_name.is_empty());
    }

    #[test]
    fn roundtrips_through_ron() {
        let cfg = TimerServiceConfig::default();
        let mut pretty = ron::ser::PrettyConfig::default();
        pretty.struct_names = true;
        let serialized = ron::ser::to_string_pretty(&cfg, pretty).unwrap();
        let parsed: TimerServiceConfig = ron::from_str(&serialized).unwrap();
        assert_eq!(parsed.command_buffer_capacity, cfg.command_buffer_capacity);
        assert_eq!(parsed.dispatcher_thread_name, cfg.dispatcher_thread_name);
        assert_eq!(parsed.shutdown_grace_period, cfg.shutdown_grace_period);
    }
}
