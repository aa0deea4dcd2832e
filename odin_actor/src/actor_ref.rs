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

//! The three actor-reference flavours used throughout the scheduling layer:
//! a bare, `Copy` identity token, a strong reference that keeps the actor's
//! mailbox endpoint alive, and a weak reference that can go "gone".
//!
//! `RawActorId` is a monotonically increasing counter rather than a pointer
//! into the actor's allocation, so identities are never reused across an
//! actor's death and a later actor's birth - a command that was addressed to
//! a dead actor can never be misdelivered to its successor.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::errors::{OdinActorError, Result};
use crate::kanal_channel::{create_mpsc_sender_receiver, MpscReceiver, MpscSender};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// opaque, comparable, hashable actor identity. Stable for the lifetime of
/// the strong reference it was minted for; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawActorId(u64);

impl RawActorId {
    fn next() -> RawActorId {
        RawActorId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RawActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct ActorCell<M> {
    id: RawActorId,
    name: String,
    tx: MpscSender<M>,
}

/// a strong, clonable reference to an actor's mailbox. Keeps the mailbox
/// endpoint (and anything it holds) alive as long as one clone survives.
/// Downgrades to a [`WeakActorRef`] that does not.
pub struct ActorRef<M> {
    cell: Arc<ActorCell<M>>,
}

impl<M> Clone for ActorRef<M> {
    fn clone(&self) -> Self {
        ActorRef { cell: self.cell.clone() }
    }
}

impl<M> fmt::Debug for ActorRef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorRef{{id: {}, name: {}}}", self.cell.id, self.cell.name)
    }
}

impl<M: Send + 'static> ActorRef<M> {
    /// creates a fresh strong reference together with the receiving end of
    /// its mailbox, bounded to `bound` pending messages.
    pub fn new(name: impl Into<String>, bound: usize) -> (ActorRef<M>, MpscReceiver<M>) {
        let (tx, rx) = create_mpsc_sender_receiver::<M>(bound);
        let cell = Arc::new(ActorCell { id: RawActorId::next(), name: name.into(), tx });
        (ActorRef { cell }, rx)
    }

    pub fn id(&self) -> RawActorId {
        self.cell.id
    }

    pub fn name(&self) -> &str {
        &self.cell.name
    }

    pub fn downgrade(&self) -> WeakActorRef<M> {
        WeakActorRef { id: self.cell.id, name: self.cell.name.clone(), cell: Arc::downgrade(&self.cell) }
    }
}

impl<M: Send + 'static> MsgReceiver<M> for ActorRef<M> {
    fn id(&self) -> RawActorId {
        self.cell.id
    }

    fn try_send_msg(&self, msg: M) -> Result<()> {
        match self.cell.tx.try_send(msg) {
            Ok(true) => Ok(()),
            Ok(false) => Err(OdinActorError::ReceiverFull),
            Err(_) => Err(OdinActorError::ReceiverClosed),
        }
    }
}

/// a weak reference to an actor's mailbox. Does not keep the actor alive;
/// [`upgrade`](WeakActorRef::upgrade) returns `None` once the last strong
/// reference has been dropped ("gone").
pub struct WeakActorRef<M> {
    id: RawActorId,
    name: String,
    cell: Weak<ActorCell<M>>,
}

impl<M> Clone for WeakActorRef<M> {
    fn clone(&self) -> Self {
        WeakActorRef { id: self.id, name: self.name.clone(), cell: self.cell.clone() }
    }
}

impl<M> fmt::Debug for WeakActorRef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakActorRef{{id: {}, name: {}}}", self.id, self.name)
    }
}

impl<M> WeakActorRef<M> {
    pub fn id(&self) -> RawActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// promotes to a strong reference, or `None` if the actor is gone.
    pub fn upgrade(&self) -> Option<ActorRef<M>> {
        self.cell.upgrade().map(|cell| ActorRef { cell })
    }
}

/// object-safe mailbox-enqueue seam shared by every timer-fired delivery
/// path (ordinary/multi/request timeout, delayed actor-message).
pub trait MsgReceiver<M>: Send {
    fn id(&self) -> RawActorId;
    fn try_send_msg(&self, msg: M) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let (a, _rx_a) = ActorRef::<i32>::new("a", 4);
        let (b, _rx_b) = ActorRef::<i32>::new("b", 4);
        assert_ne!(a.id(), b.id());
        assert!(a.id() < b.id());
    }

    #[test]
    fn weak_ref_upgrades_while_strong_ref_lives() {
        let (strong, _rx) = ActorRef::<i32>::new("a", 4);
        let weak = strong.downgrade();
        assert!(weak.upgrade().is_some());
        assert_eq!(weak.id(), strong.id());
    }

    #[test]
    fn weak_ref_is_gone_once_strong_ref_dropped() {
        let (strong, rx) = ActorRef::<i32>::new("a", 4);
        let weak = strong.downgrade();
        drop(strong);
        drop(rx);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn try_send_msg_delivers_via_mailbox() {
        let (actor, rx) = ActorRef::<i32>::new("a", 4);
        actor.try_send_msg(42).unwrap();
        assert_eq!(rx.recv().unwrap(), 42);
    }

    #[test]
    fn try_send_msg_reports_full_mailbox() {
        let (actor, _rx) = ActorRef::<i32>::new("a", 1);
        actor.try_send_msg(1).unwrap();
        let err = actor.try_send_msg(2).unwrap_err();
        assert!(matches!(err, OdinActorError::ReceiverFull));
    }

    #[test]
    fn try_send_msg_reports_closed_mailbox() {
        let (actor, rx) = ActorRef::<i32>::new("a", 4);
        drop(rx);
        let err = actor.try_send_msg(1).unwrap_err();
        assert!(matches!(err, OdinActorError::ReceiverClosed));
    }
}
