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

//! the schedule core: a deadline-ordered multimap of pending timer entries
//! plus a per-actor secondary index, so selective cancellation never has to
//! scan the whole schedule. Single-threaded by design - the dispatch loop
//! in [`crate::dispatcher`] is the only thing that ever touches it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use odin_actor::{trace, RawActorId};

use crate::time_source::Instant;

static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
    fn next() -> EntryId {
        EntryId(NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry#{}", self.0)
    }
}

/// the key a timer entry is indexed under inside its owning actor's bucket.
/// `Type` backs ordinary-timeouts (accumulate semantics - see
/// [`ScheduleCore::set_ordinary_timeout`]), `Ordinal` backs multi-timeouts,
/// `Request` backs request-timeouts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Discriminator<T> {
    Type(T),
    Ordinal(u64),
    Request(u64),
}

/// informational tag only - never used for matching, just for logging and
/// test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    OrdinaryTimeout,
    MultiTimeout,
    RequestTimeout,
    DelayedActorMessage,
    DelayedGroupMessage,
}

/// one pending timer. `action` is a type-erased thunk that performs the
/// actual mailbox enqueue or group broadcast when the entry fires; it is
/// built at command-application time, once any weak actor reference has
/// already been upgraded (see [`crate::command`]), so firing itself can
/// never fail due to a gone actor.
pub struct TimerEntry<T> {
    id: EntryId,
    kind: TimerKind,
    actor: Option<RawActorId>,
    discriminator: Option<Discriminator<T>>,
    action: Box<dyn FnOnce() + Send>,
}

impl<T> fmt::Debug for TimerEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TimerEntry{{id: {}, kind: {:?}, actor: {:?}}}",
            self.id, self.kind, self.actor
        )
    }
}

impl<T> TimerEntry<T> {
    pub fn new(
        kind: TimerKind,
        actor: Option<RawActorId>,
        discriminator: Option<Discriminator<T>>,
        action: Box<dyn FnOnce() + Send>,
    ) -> Self {
        TimerEntry { id: EntryId::next(), kind, actor, discriminator, action }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }
}

#[derive(Default)]
struct ActorBucket<T> {
    // multimap: accumulate semantics for repeated ordinary-timeout setters
    // with the same discriminator (open question 2, resolved: accumulate).
    entries: HashMap<Discriminator<T>, Vec<EntryId>>,
}

impl<T: Eq + std::hash::Hash> ActorBucket<T> {
    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, disc: Discriminator<T>, id: EntryId) {
        self.entries.entry(disc).or_default().push(id);
    }

    /// removes one entry id matching `disc`, if any.
    fn remove_one(&mut self, disc: &Discriminator<T>) -> Option<EntryId> {
        let ids = self.entries.get_mut(disc)?;
        let removed = ids.pop();
        if ids.is_empty() {
            self.entries.remove(disc);
        }
        removed
    }

    fn remove_all(&mut self) -> Vec<EntryId> {
        self.entries.drain().flat_map(|(_, ids)| ids).collect()
    }
}

/// the deadline-ordered schedule plus per-actor index. Not thread-safe;
/// owned exclusively by the dispatcher thread once constructed.
pub struct ScheduleCore<T> {
    // keyed by (deadline, insertion-order id) so entries sharing a deadline
    // don't collide and BTreeMap iteration order is still deterministic
    // (though callers must not rely on relative order among equal deadlines).
    schedule: BTreeMap<(Instant, EntryId), TimerEntry<T>>,
    deadlines: HashMap<EntryId, Instant>,
    index: HashMap<RawActorId, ActorBucket<T>>,
}

impl<T: Eq + std::hash::Hash + Clone + fmt::Debug> Default for ScheduleCore<T> {
    fn default() -> Self {
        ScheduleCore { schedule: BTreeMap::new(), deadlines: HashMap::new(), index: HashMap::new() }
    }
}

impl<T: Eq + std::hash::Hash + Clone + fmt::Debug> ScheduleCore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.schedule.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.schedule.keys().next().map(|(deadline, _)| *deadline)
    }

    /// inserts an already-built entry at `deadline`, indexing it under
    /// `(actor, discriminator)` if both are present. Ordinary-timeouts
    /// accumulate: a pre-existing entry for the same (actor, discriminator)
    /// is left in place and the new one is added alongside it.
    pub fn insert(&mut self, deadline: Instant, entry: TimerEntry<T>) {
        let id = entry.id();
        if let (Some(actor), Some(disc)) = (entry.actor, entry.discriminator.clone()) {
            self.index.entry(actor).or_default().insert(disc, id);
        }
        self.deadlines.insert(id, deadline);
        self.schedule.insert((deadline, id), entry);
        trace!(format!("scheduled {} at {:?}", id, deadline));
    }

    fn remove_by_id(&mut self, id: EntryId) -> Option<TimerEntry<T>> {
        let deadline = self.deadlines.remove(&id)?;
        self.schedule.remove(&(deadline, id))
    }

    /// cancels one entry matching `(actor, discriminator)`, if any. Silent
    /// no-op when nothing matches.
    pub fn cancel_discriminated(&mut self, actor: RawActorId, disc: &Discriminator<T>) -> bool {
        let Some(bucket) = self.index.get_mut(&actor) else { return false };
        let Some(id) = bucket.remove_one(disc) else { return false };
        if bucket.is_empty() {
            self.index.remove(&actor);
        }
        self.remove_by_id(id).is_some()
    }

    /// cancels every timer owned by `actor` (the whole bucket).
    pub fn cancel_timeouts(&mut self, actor: RawActorId) -> usize {
        let Some(mut bucket) = self.index.remove(&actor) else { return 0 };
        let ids = bucket.remove_all();
        let mut n = 0;
        for id in ids {
            if self.remove_by_id(id).is_some() {
                n += 1;
            }
        }
        n
    }

    /// clears the whole schedule and index.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.schedule.len();
        self.schedule.clear();
        self.deadlines.clear();
        self.index.clear();
        n
    }

    /// fires every entry whose deadline is `<= now`, removing it from the
    /// schedule (and its per-actor bucket, if indexed) before running its
    /// action. Returns the number of entries fired.
    pub fn tick(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        loop {
            let Some((&(deadline, id), _)) = self.schedule.iter().next() else { break };
            if deadline > now {
                break;
            }
            let Some(entry) = self.schedule.remove(&(deadline, id)) else { break };
            self.deadlines.remove(&id);
            if let Some(actor) = entry.actor {
                if let Some(bucket) = self.index.get_mut(&actor) {
                    if let Some(disc) = &entry.discriminator {
                        if let Some(ids) = bucket.entries.get_mut(disc) {
                            ids.retain(|existing| *existing != id);
                            if ids.is_empty() {
                                bucket.entries.remove(disc);
                            }
                        }
                    }
                    if bucket.is_empty() {
                        self.index.remove(&actor);
                    }
                }
            }
            trace!(format!("firing {} ({:?})", entry.id, entry.kind));
            (entry.action)();
            fired += 1;
        }
        fired
    }
}
