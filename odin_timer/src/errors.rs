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

//! the timer command surface itself is fire-and-forget and infallible (a
//! setter for a gone actor is silently dropped, a cancel of a non-existent
//! timer is a silent no-op - see the schedule core). `OdinTimerError` exists
//! only for the crate's own setup/teardown boundary: starting the
//! dispatcher thread and shutting it down cleanly.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OdinTimerError>;

#[derive(Error, Debug)]
pub enum OdinTimerError {
    #[error("dispatcher not running")]
    NotRunning,

    #[error("failed to spawn dispatcher thread: {0}")]
    SpawnFailed(String),

    #[error("failed to join dispatcher thread")]
    JoinError,

    #[error("dispatcher did not signal shutdown within the configured grace period")]
    ShutdownTimedOut,

    #[error("config parse error {0}")]
    ConfigParseError(String),
}
