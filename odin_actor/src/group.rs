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

//! a minimal group-broadcast target, mirroring [`crate::MsgReceiver`]'s
//! enqueue shape but without per-member actor identity. Delayed
//! group-messages are never indexed per-actor (see the schedule's
//! per-actor index invariants), so a group target only needs to accept a
//! broadcast, not expose a [`crate::RawActorId`].

use crate::errors::Result;
use crate::RawActorId;

/// object-safe broadcast seam a delayed group-message fires through.
/// `sender` identifies the (strong) actor reference that originated the
/// broadcast - kept alive by the caller until this call returns, per the
/// timer service's "strong refs stay alive until firing" rule.
pub trait GroupReceiver<M>: Send {
    fn broadcast(&self, sender: RawActorId, msg: M) -> Result<()>;
}

/// a group of [`crate::MsgReceiver`]s that all get the same message on
/// broadcast. Members that have gone away (closed mailbox) are skipped;
/// a failure to reach any live member is reported to the caller as an
/// [`crate::errors::OdinActorError::IterOpFailed`].
pub struct GroupRef<M> {
    members: Vec<Box<dyn crate::MsgReceiver<M> + Send>>,
}

impl<M: Clone> GroupRef<M> {
    pub fn new(members: Vec<Box<dyn crate::MsgReceiver<M> + Send>>) -> Self {
        GroupRef { members }
    }
}

impl<M: Clone + Send> GroupReceiver<M> for GroupRef<M> {
    fn broadcast(&self, _sender: RawActorId, msg: M) -> Result<()> {
        let total = self.members.len();
        let mut failed = 0usize;
        for m in &self.members {
            if m.try_send_msg(msg.clone()).is_err() {
                failed += 1;
            }
        }
        crate::errors::iter_op_result("group broadcast", total, failed)
    }
}
