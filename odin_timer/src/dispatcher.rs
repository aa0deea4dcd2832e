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

//! the dispatcher facade: a thread-safe front for [`crate::schedule::ScheduleCore`].
//! Any number of producer threads call the `set_*`/`schedule_*`/`cancel_*`
//! methods on a cloned [`TimerService`] handle; exactly one dispatcher
//! thread owns the schedule and runs [`run_dispatch_loop`].
//!
//! This mirrors the single-dispatch-task shape of a job scheduler built on
//! a mutex-guarded deadline queue plus a wakeup notification, translated
//! from an async task + channel into a dedicated OS thread blocking on a
//! condition variable - the concurrency model this subsystem's design
//! calls for.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use odin_actor::{debug, info, warn, GroupReceiver, RawActorId, WeakActorRef};

use crate::command::{
    Command, DelayedGroupMessageSetter, DelayedMessageSetter, MultiTimeoutSetter, OrdinaryTimeoutSetter,
    RequestTimeoutSetter, SetterCommand,
};
use crate::config::TimerServiceConfig;
use crate::errors::{OdinTimerError, Result};
use crate::schedule::ScheduleCore;
use crate::time_source::TimeSource;

struct Inner<T> {
    commands: Vec<Command<T>>,
    shutdown: bool,
}

struct Shared<T> {
    mutex: Mutex<Inner<T>>,
    cv: Condvar,
    // set by the dispatcher thread right before it returns, so
    // `cancel_dispatch_loop` can bound its wait on `grace_period` instead of
    // blocking on `JoinHandle::join` indefinitely.
    finished: Mutex<bool>,
    finished_cv: Condvar,
}

/// a clonable handle to the timer dispatcher. Every clone shares the same
/// command buffer and the same dispatcher thread; dropping all handles
/// does not stop the dispatcher - call [`TimerService::cancel_dispatch_loop`]
/// explicitly.
pub struct TimerService<T> {
    shared: Arc<Shared<T>>,
    thread: Arc<Mutex<Option<JoinHandle<()>>>>,
    grace_period: Duration,
}

impl<T> Clone for TimerService<T> {
    fn clone(&self) -> Self {
        TimerService { shared: self.shared.clone(), thread: self.thread.clone(), grace_period: self.grace_period }
    }
}

impl<T> fmt::Debug for TimerService<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerService{{..}}")
    }
}

impl<T> TimerService<T>
where
    T: Eq + std::hash::Hash + Clone + fmt::Debug + Send + 'static,
{
    /// builds a dispatcher bound to `time_source` and spawns its dispatch
    /// loop on a dedicated thread named per `config`.
    pub fn new(time_source: Arc<dyn TimeSource>, config: TimerServiceConfig) -> Result<Self> {
        let shared = Arc::new(Shared {
            mutex: Mutex::new(Inner { commands: Vec::with_capacity(config.command_buffer_capacity), shutdown: false }),
            cv: Condvar::new(),
            finished: Mutex::new(false),
            finished_cv: Condvar::new(),
        });

        let loop_shared = shared.clone();
        let thread = std::thread::Builder::new()
            .name(config.dispatcher_thread_name.clone())
            .spawn(move || run_dispatch_loop(loop_shared, ScheduleCore::new(), time_source))
            .map_err(|e| OdinTimerError::SpawnFailed(e.to_string()))?;

        Ok(TimerService { shared, thread: Arc::new(Mutex::new(Some(thread))), grace_period: config.shutdown_grace_period })
    }

    fn submit(&self, command: Command<T>) {
        let mut inner = self.shared.mutex.lock().expect("timer command buffer lock poisoned");
        inner.commands.push(command);
        self.shared.cv.notify_one();
    }

    pub fn set_ordinary_timeout<M: Send + 'static>(&self, deadline: crate::time_source::Instant, actor: &WeakActorRef<M>, type_tag: T, msg: M) {
        let setter = OrdinaryTimeoutSetter { deadline, actor: actor.clone(), type_tag, msg };
        self.submit(Command::Set(Box::new(setter)));
    }

    pub fn set_multi_timeout<M: Send + 'static>(&self, deadline: crate::time_source::Instant, actor: &WeakActorRef<M>, ord_id: u64, msg: M) {
        let setter = MultiTimeoutSetter { deadline, actor: actor.clone(), ord_id, msg, _type_tag: std::marker::PhantomData };
        self.submit(Command::Set(Box::new(setter)));
    }

    pub fn set_request_timeout<M: Send + 'static>(&self, deadline: crate::time_source::Instant, actor: &WeakActorRef<M>, request_id: u64, msg: M) {
        let setter = RequestTimeoutSetter { deadline, actor: actor.clone(), request_id, msg, _type_tag: std::marker::PhantomData };
        self.submit(Command::Set(Box::new(setter)));
    }

    pub fn schedule_actor_message<M: Send + 'static>(&self, deadline: crate::time_source::Instant, receiver: &WeakActorRef<M>, msg: M) {
        let setter = DelayedMessageSetter { deadline, receiver: receiver.clone(), msg, _type_tag: std::marker::PhantomData };
        self.submit(Command::Set(Box::new(setter)));
    }

    pub fn schedule_group_message<M: Send + 'static, S: Send + 'static>(
        &self,
        deadline: crate::time_source::Instant,
        group: Arc<dyn GroupReceiver<M> + Send + Sync>,
        sender: &WeakActorRef<S>,
        msg: M,
    ) {
        let setter = DelayedGroupMessageSetter { deadline, group, sender: sender.clone(), msg, _type_tag: std::marker::PhantomData };
        self.submit(Command::Set(Box::new(setter)));
    }

    pub fn cancel_ordinary_timeout(&self, actor: RawActorId, type_tag: T) {
        self.submit(Command::CancelOrdinaryTimeout(actor, type_tag));
    }

    pub fn cancel_request_timeout(&self, actor: RawActorId, request_id: u64) {
        self.submit(Command::CancelRequestTimeout(actor, request_id));
    }

    pub fn cancel_timeouts(&self, actor: RawActorId) {
        self.submit(Command::CancelTimeouts(actor));
    }

    pub fn cancel_all(&self) {
        self.submit(Command::CancelAll);
    }

    /// requests shutdown and waits at most `grace_period` (from config) for
    /// the dispatcher thread to signal that it has drained and exited,
    /// joining it once it does. If the thread has not finished within
    /// `grace_period`, the join is abandoned and its handle dropped (the
    /// thread keeps running to completion on its own).
    pub fn cancel_dispatch_loop(&self) -> Result<()> {
        {
            let mut inner = self.shared.mutex.lock().expect("timer command buffer lock poisoned");
            inner.shutdown = true;
        }
        self.shared.cv.notify_one();

        let finished = self.shared.finished.lock().expect("dispatcher finished-flag lock poisoned");
        let (_finished, timeout_result) = self
            .shared
            .finished_cv
            .wait_timeout_while(finished, self.grace_period, |finished| !*finished)
            .expect("dispatcher finished-flag lock poisoned");

        let mut guard = self.thread.lock().expect("dispatcher thread handle lock poisoned");
        let Some(handle) = guard.take() else { return Err(OdinTimerError::NotRunning) };

        if timeout_result.timed_out() {
            warn!("dispatcher did not signal shutdown within grace period, abandoning join");
            return Err(OdinTimerError::ShutdownTimedOut);
        }

        info!("dispatcher shutdown requested, joining dispatcher thread");
        handle.join().map_err(|_| OdinTimerError::JoinError)
    }
}

/// drains the command buffer, applies every command to `schedule`, and
/// either waits forever (schedule empty) or until the next deadline.
///
/// Returns when the shutdown flag is observed; at that point it clears the
/// schedule and exits - the caller's `JoinHandle::join()` then returns.
///
/// [`TimerService::new`] spawns this on a dedicated thread; it is not part
/// of the public API because it takes the dispatcher's private command
/// buffer, not anything a caller outside this crate could construct.
fn run_dispatch_loop<T>(shared: Arc<Shared<T>>, mut schedule: ScheduleCore<T>, time_source: Arc<dyn TimeSource>)
where
    T: Eq + std::hash::Hash + Clone + fmt::Debug + Send + 'static,
{
    info!("dispatcher loop starting");
    loop {
        let (commands, shutdown) = {
            let mut inner = shared.mutex.lock().expect("timer command buffer lock poisoned");
            let drained = std::mem::take(&mut inner.commands);
            (drained, inner.shutdown)
        };

        for command in commands {
            apply_command(&mut schedule, command);
        }

        if shutdown {
            let cleared = schedule.cancel_all();
            debug!(format!("dispatcher shutting down, {} entries discarded", cleared));
            break;
        }

        let now = time_source.now();
        let fired = schedule.tick(now);
        if fired > 0 {
            debug!(format!("fired {} timer entries at {}", fired, now));
        }

        let next_deadline = schedule.next_deadline();
        let mut inner = shared.mutex.lock().expect("timer command buffer lock poisoned");
        while inner.commands.is_empty() && !inner.shutdown {
            match next_deadline {
                None => {
                    inner = shared.cv.wait(inner).expect("timer command buffer lock poisoned");
                }
                Some(deadline) => {
                    let now = time_source.now();
                    let Some(remaining) = deadline.checked_duration_since(now) else { break };
                    if remaining.is_zero() {
                        break;
                    }
                    let (next_inner, timeout_result) =
                        shared.cv.wait_timeout(inner, remaining).expect("timer command buffer lock poisoned");
                    inner = next_inner;
                    if timeout_result.timed_out() {
                        break;
                    }
                }
            }
        }
    }

    *shared.finished.lock().expect("dispatcher finished-flag lock poisoned") = true;
    shared.finished_cv.notify_one();
    info!("dispatcher loop exited");
}

fn apply_command<T>(schedule: &mut ScheduleCore<T>, command: Command<T>)
where
    T: Eq + std::hash::Hash + Clone + fmt::Debug + Send + 'static,
{
    match command {
        Command::Set(setter) => {
            let deadline = setter.deadline();
            if let Some(entry) = setter.try_build() {
                schedule.insert(deadline, entry);
            } else {
                debug!("setter command dropped: target actor is gone");
            }
        }
        Command::CancelOrdinaryTimeout(actor, type_tag) => {
            schedule.cancel_discriminated(actor, &crate::schedule::Discriminator::Type(type_tag));
        }
        Command::CancelRequestTimeout(actor, request_id) => {
            schedule.cancel_discriminated(actor, &crate::schedule::Discriminator::Request(request_id));
        }
        Command::CancelTimeouts(actor) => {
            schedule.cancel_timeouts(actor);
        }
        Command::CancelAll => {
            schedule.cancel_all();
        }
    }
}
