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

//! actor timer service: schedules ordinary-, multi- and request-timeouts
//! plus delayed actor- and group-messages on behalf of running actors, and
//! dispatches them on a dedicated thread.
//!
//! Three layers, leaf first:
//! - [`schedule::ScheduleCore`] - the deadline-ordered multimap and its
//!   per-actor secondary index. Single-threaded, owned by the dispatcher.
//! - [`dispatcher::TimerService`] - the thread-safe facade producers submit
//!   commands to; its `new` constructor spawns the dispatcher's own loop on
//!   a dedicated thread.
//! - [`time_source::TimeSource`] - real or simulated "now".
//!
//! ```no_run
//! use std::sync::Arc;
//! use odin_actor::ActorRef;
//! use odin_timer::{TimerService, TimerServiceConfig, SystemTimeSource, time_source::Instant};
//!
//! #[derive(Debug, Clone)]
//! enum MyMsg { Tick }
//!
//! let (actor, _rx) = ActorRef::<MyMsg>::new("a", 8);
//! let weak = actor.downgrade();
//!
//! let svc: TimerService<&'static str> = TimerService::new(Arc::new(SystemTimeSource::new()), TimerServiceConfig::default()).unwrap();
//! svc.set_ordinary_timeout(Instant::from_millis(100), &weak, "tick", MyMsg::Tick);
//! svc.cancel_dispatch_loop().unwrap();
//! ```

pub mod config;
pub mod command;
pub mod dispatcher;
pub mod errors;
pub mod schedule;
pub mod time_source;

pub use command::{Command, SetterCommand};
pub use config::TimerServiceConfig;
pub use dispatcher::TimerService;
pub use errors::{OdinTimerError, Result};
pub use schedule::{Discriminator, EntryId, ScheduleCore, TimerEntry, TimerKind};
pub use time_source::{Instant, SimulatedTimeSource, SystemTimeSource, TimeSource};
