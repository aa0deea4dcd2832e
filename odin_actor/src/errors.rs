/*
 * Copyright © 2024, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OdinActorError>;

#[derive(Error,Debug)]
pub enum OdinActorError {

    #[error("receiver closed")]
    ReceiverClosed,

    #[error("receiver queue full")]
    ReceiverFull,

    #[error("senders dropped")]
    SendersDropped,

    #[error("actor reference is gone")]
    ActorGone,

    #[error("{op} failed for {failed} out of {all} items")]
    IterOpFailed { op: String, all: usize, failed: usize },

    #[error("poisoned lock error {0}")]
    PoisonedLockError(String),

    #[error("failed to join thread")]
    JoinError,

    // a generic error
    #[error("operation failed {0}")]
    OpFailed(String)
}

pub fn iter_op_result (op: &'static str, total: usize, failed: usize)->Result<()> {
    if failed == 0 { Ok(()) } else { Err(iter_op_failed( op, total, failed)) }
}

pub fn iter_op_failed <T: ToString> (op: T, all: usize, failed: usize)->OdinActorError {
    OdinActorError::IterOpFailed { op: op.to_string(), all, failed }
}

pub fn poisoned_lock <T: ToString> (op: T)->OdinActorError {
    OdinActorError::PoisonedLockError(op.to_string())
}

pub fn op_failed (msg: impl ToString)->OdinActorError {
    OdinActorError::OpFailed(msg.to_string())
}
