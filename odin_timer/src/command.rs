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

//! the command surface producers submit to the dispatcher. Setter commands
//! hold only a *weak* actor reference (so a backlog of commands can never
//! keep a dead actor's mailbox allocation alive); they are type-erased
//! behind [`SetterCommand`] so [`crate::dispatcher::TimerService`] stays
//! generic over the discriminator type `T` only, never over every actor's
//! concrete message type `M` - the same seam the wider runtime uses for its
//! `Box<dyn Fn>`-based dynamic actions.
//!
//! Cancel commands carry only a [`RawActorId`]: they never need to keep
//! anything alive, so they stay fully concrete and need no type erasure.

use odin_actor::{warn, GroupReceiver, MsgReceiver, RawActorId, WeakActorRef};

use crate::schedule::{Discriminator, TimerEntry, TimerKind};
use crate::time_source::Instant;

/// a setter command that has not yet been applied to the schedule. Built by
/// the `TimerService::set_*`/`schedule_*` methods and handed to the
/// dispatcher thread through the command buffer.
pub trait SetterCommand<T>: Send {
    fn deadline(&self) -> Instant;

    /// promotes any weak reference and builds the concrete schedule entry.
    /// Returns `None` if the target actor is gone - the command is then
    /// silently dropped by the dispatcher.
    fn try_build(self: Box<Self>) -> Option<TimerEntry<T>>;
}

pub struct OrdinaryTimeoutSetter<T, M> {
    pub deadline: Instant,
    pub actor: WeakActorRef<M>,
    pub type_tag: T,
    pub msg: M,
}

impl<T: Clone + Send + 'static, M: Send + 'static> SetterCommand<T> for OrdinaryTimeoutSetter<T, M> {
    fn deadline(&self) -> Instant {
        self.deadline
    }

    fn try_build(self: Box<Self>) -> Option<TimerEntry<T>> {
        let actor_id = self.actor.id();
        let strong = self.actor.upgrade()?;
        let msg = self.msg;
        let action: Box<dyn FnOnce() + Send> = Box::new(move || {
            if let Err(e) = strong.try_send_msg(msg) {
                warn!(format!("ordinary timeout delivery to {} failed: {}", actor_id, e));
            }
        });
        Some(TimerEntry::new(TimerKind::OrdinaryTimeout, Some(actor_id), Some(Discriminator::Type(self.type_tag)), action))
    }
}

pub struct MultiTimeoutSetter<T, M> {
    pub deadline: Instant,
    pub actor: WeakActorRef<M>,
    pub ord_id: u64,
    pub msg: M,
    pub _type_tag: std::marker::PhantomData<T>,
}

impl<T: Clone + Send + 'static, M: Send + 'static> SetterCommand<T> for MultiTimeoutSetter<T, M> {
    fn deadline(&self) -> Instant {
        self.deadline
    }

    fn try_build(self: Box<Self>) -> Option<TimerEntry<T>> {
        let actor_id = self.actor.id();
        let strong = self.actor.upgrade()?;
        let msg = self.msg;
        let ord_id = self.ord_id;
        let action: Box<dyn FnOnce() + Send> = Box::new(move || {
            if let Err(e) = strong.try_send_msg(msg) {
                warn!(format!("multi-timeout {} delivery to {} failed: {}", ord_id, actor_id, e));
            }
        });
        Some(TimerEntry::new(TimerKind::MultiTimeout, Some(actor_id), Some(Discriminator::Ordinal(self.ord_id)), action))
    }
}

pub struct RequestTimeoutSetter<T, M> {
    pub deadline: Instant,
    pub actor: WeakActorRef<M>,
    pub request_id: u64,
    pub msg: M,
    pub _type_tag: std::marker::PhantomData<T>,
}

impl<T: Clone + Send + 'static, M: Send + 'static> SetterCommand<T> for RequestTimeoutSetter<T, M> {
    fn deadline(&self) -> Instant {
        self.deadline
    }

    fn try_build(self: Box<Self>) -> Option<TimerEntry<T>> {
        let actor_id = self.actor.id();
        let strong = self.actor.upgrade()?;
        let msg = self.msg;
        let request_id = self.request_id;
        let action: Box<dyn FnOnce() + Send> = Box::new(move || {
            if let Err(e) = strong.try_send_msg(msg) {
                warn!(format!("request timeout {} delivery to {} failed: {}", request_id, actor_id, e));
            }
        });
        Some(TimerEntry::new(TimerKind::RequestTimeout, Some(actor_id), Some(Discriminator::Request(self.request_id)), action))
    }
}

/// a delayed actor-message. Unindexed: once enqueued it can only be removed
/// by `cancel_all`, never by a selective per-actor cancel.
pub struct DelayedMessageSetter<T, M> {
    pub deadline: Instant,
    pub receiver: WeakActorRef<M>,
    pub msg: M,
    pub _type_tag: std::marker::PhantomData<T>,
}

impl<T: Send + 'static, M: Send + 'static> SetterCommand<T> for DelayedMessageSetter<T, M> {
    fn deadline(&self) -> Instant {
        self.deadline
    }

    fn try_build(self: Box<Self>) -> Option<TimerEntry<T>> {
        let actor_id = self.receiver.id();
        let strong = self.receiver.upgrade()?;
        let msg = self.msg;
        let action: Box<dyn FnOnce() + Send> = Box::new(move || {
            if let Err(e) = strong.try_send_msg(msg) {
                warn!(format!("delayed message delivery to {} failed: {}", actor_id, e));
            }
        });
        Some(TimerEntry::new(TimerKind::DelayedActorMessage, None, None, action))
    }
}

/// a delayed group-message. Like delayed actor-messages, unindexed. Carries
/// a *weak* reference to the sending actor (promoted to strong at apply
/// time, same "target-gone drops the command" rule as every other setter)
/// so the sender stays alive until the broadcast fires and its identity can
/// be handed to [`GroupReceiver::broadcast`].
pub struct DelayedGroupMessageSetter<T, M, S> {
    pub deadline: Instant,
    pub group: std::sync::Arc<dyn GroupReceiver<M> + Send + Sync>,
    pub sender: WeakActorRef<S>,
    pub msg: M,
    pub _type_tag: std::marker::PhantomData<T>,
}

impl<T: Send + 'static, M: Send + 'static, S: Send + 'static> SetterCommand<T> for DelayedGroupMessageSetter<T, M, S> {
    fn deadline(&self) -> Instant {
        self.deadline
    }

    fn try_build(self: Box<Self>) -> Option<TimerEntry<T>> {
        let strong_sender = self.sender.upgrade()?;
        let sender_id = strong_sender.id();
        let group = self.group;
        let msg = self.msg;
        let action: Box<dyn FnOnce() + Send> = Box::new(move || {
            let _keep_alive = strong_sender;
            if let Err(e) = group.broadcast(sender_id, msg) {
                warn!(format!("delayed group-message broadcast failed: {}", e));
            }
        });
        Some(TimerEntry::new(TimerKind::DelayedGroupMessage, None, None, action))
    }
}

/// the full command surface. Setter commands are boxed and type-erased
/// over `M`; cancel commands stay concrete since they never touch a
/// message type.
pub enum Command<T> {
    Set(Box<dyn SetterCommand<T>>),
    CancelOrdinaryTimeout(RawActorId, T),
    CancelRequestTimeout(RawActorId, u64),
    CancelTimeouts(RawActorId),
    CancelAll,
}
