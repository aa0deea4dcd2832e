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

//! Minimal actor-reference surface: raw identity, strong and weak actor
//! references, and the mailbox-enqueue seam the rest of the runtime (actor
//! spawning, behaviors, supervision) builds on. This crate does not spawn
//! actors or run their behaviors - it only gives other crates something
//! concrete to hold, clone, downgrade and enqueue into.

pub mod errors;
pub use errors::{OdinActorError, Result};

mod actor_ref;
pub use actor_ref::*;

mod group;
pub use group::*;

pub mod kanal_channel;
pub use kanal_channel::{create_mpsc_sender_receiver, MpscReceiver, MpscSender};

pub mod prelude;

pub const DEFAULT_CHANNEL_BOUNDS: usize = 16;

/// forwards to [`tracing::trace!`], matching either a named-field form
/// (`trace!(id = actor.id(), "message")`) or a plain message expression.
#[macro_export]
macro_rules! trace {
    ($id:ident = $e:expr) => { tracing::trace!( $id = ?$e) };
    ($e:expr) => { tracing::trace!( "{}", $e) };
}

#[macro_export]
macro_rules! debug {
    ($id:ident = $e:expr) => { tracing::debug!( $id = ?$e) };
    ($e:expr) => { tracing::debug!( "{}", $e) };
}

#[macro_export]
macro_rules! info {
    ($id:ident = $e:expr) => { tracing::info!( $id = ?$e) };
    ($e:expr) => { tracing::info!( "{}", $e) };
}

#[macro_export]
macro_rules! warn {
    ($id:ident = $e:expr) => { tracing::warn!( $id = ?$e) };
    ($e:expr) => { tracing::warn!( "{}", $e) };
}

#[macro_export]
macro_rules! error {
    ($id:ident = $e:expr) => { tracing::error!( $id = ?$e) };
    ($e:expr) => { tracing::error!( "{}", $e) };
}
