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

//! end-to-end tests driving the full dispatcher thread. Deadlines are kept
//! in the tens-of-milliseconds range and synchronization relies on
//! `recv_timeout`/small sleeps, not on a simulated clock - the dispatcher's
//! condition-variable wait always measures real wall-clock time regardless
//! of what a [`odin_timer::TimeSource`] reports, so only the schedule-core
//! unit tests use [`odin_timer::SimulatedTimeSource`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use odin_actor::{ActorRef, GroupReceiver, MsgReceiver};
use odin_timer::{Instant, SystemTimeSource, TimerService, TimerServiceConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
enum TestMsg {
    Timeout(&'static str, u64),
    Group(u32),
}

fn svc() -> (TimerService<&'static str>, Arc<SystemTimeSource>) {
    let ts = Arc::new(SystemTimeSource::new());
    let svc = TimerService::new(ts.clone(), TimerServiceConfig::default()).expect("dispatcher starts");
    (svc, ts)
}

fn deadline_in(ts: &SystemTimeSource, ms: u64) -> Instant {
    use odin_timer::TimeSource;
    Instant::from_millis(ts.now().as_millis() + ms)
}

#[test]
fn ordinary_timeout_fires_once_at_deadline() {
    let (svc, ts) = svc();
    let (actor, rx) = ActorRef::<TestMsg>::new("a", 4);
    let weak = actor.downgrade();

    svc.set_ordinary_timeout(deadline_in(&ts, 30), &weak, "tick", TestMsg::Timeout("tick", 1));

    assert!(rx.recv_timeout(Duration::from_millis(5)).is_err(), "must not fire early");
    let msg = rx.recv_timeout(Duration::from_millis(200)).expect("fires at deadline");
    assert_eq!(msg, TestMsg::Timeout("tick", 1));

    svc.cancel_dispatch_loop().unwrap();
}

#[test]
fn multi_timeouts_fire_independently() {
    let (svc, ts) = svc();
    let (actor, rx) = ActorRef::<TestMsg>::new("a", 8);
    let weak = actor.downgrade();

    svc.set_multi_timeout(deadline_in(&ts, 10), &weak, 1, TestMsg::Timeout("poll", 1));
    svc.set_multi_timeout(deadline_in(&ts, 20), &weak, 2, TestMsg::Timeout("poll", 2));
    svc.set_multi_timeout(deadline_in(&ts, 30), &weak, 3, TestMsg::Timeout("poll", 3));

    let mut seen = Vec::new();
    for _ in 0..3 {
        let msg = rx.recv_timeout(Duration::from_millis(300)).expect("each multi-timeout eventually fires");
        seen.push(msg);
    }
    assert_eq!(seen.len(), 3);
    assert!(seen.contains(&TestMsg::Timeout("poll", 1)));
    assert!(seen.contains(&TestMsg::Timeout("poll", 2)));
    assert!(seen.contains(&TestMsg::Timeout("poll", 3)));

    svc.cancel_dispatch_loop().unwrap();
}

#[test]
fn cancel_timeouts_suppresses_all_pending_entries_for_an_actor() {
    let (svc, ts) = svc();
    let (actor, rx) = ActorRef::<TestMsg>::new("a", 4);
    let weak = actor.downgrade();

    svc.set_ordinary_timeout(deadline_in(&ts, 20), &weak, "tick", TestMsg::Timeout("tick", 1));
    svc.cancel_timeouts(actor.id());

    assert!(rx.recv_timeout(Duration::from_millis(150)).is_err(), "cancelled entry must never fire");

    svc.cancel_dispatch_loop().unwrap();
}

#[test]
fn concurrent_set_and_cancel_of_a_request_timeout_yields_no_firing_either_order() {
    let (svc, ts) = svc();
    let (actor, rx) = ActorRef::<TestMsg>::new("a", 4);
    let weak = actor.downgrade();
    let actor_id = actor.id();
    let deadline = deadline_in(&ts, 40);

    let svc_setter = svc.clone();
    let weak_setter = weak.clone();
    let t1 = std::thread::spawn(move || {
        svc_setter.set_request_timeout(deadline, &weak_setter, 7, TestMsg::Timeout("req", 7));
    });
    let svc_canceller = svc.clone();
    let t2 = std::thread::spawn(move || {
        svc_canceller.cancel_request_timeout(actor_id, 7);
    });
    t1.join().unwrap();
    t2.join().unwrap();

    assert!(rx.recv_timeout(Duration::from_millis(250)).is_err(), "either interleaving must yield no firing");

    svc.cancel_dispatch_loop().unwrap();
}

struct TestGroup {
    members: Vec<Box<dyn MsgReceiver<TestMsg> + Send>>,
    senders_seen: Arc<Mutex<Vec<odin_actor::RawActorId>>>,
}
impl GroupReceiver<TestMsg> for TestGroup {
    fn broadcast(&self, sender: odin_actor::RawActorId, msg: TestMsg) -> odin_actor::Result<()> {
        self.senders_seen.lock().unwrap().push(sender);
        for m in &self.members {
            m.try_send_msg(msg.clone())?;
        }
        Ok(())
    }
}

#[test]
fn delayed_group_message_fires_once_for_every_member_with_sender_identity() {
    let (svc, ts) = svc();
    let (a1, rx1) = ActorRef::<TestMsg>::new("g1", 4);
    let (a2, rx2) = ActorRef::<TestMsg>::new("g2", 4);
    let (sender, _sender_rx) = ActorRef::<TestMsg>::new("sender", 4);
    let weak_sender = sender.downgrade();
    let senders_seen = Arc::new(Mutex::new(Vec::new()));
    let group: Arc<dyn GroupReceiver<TestMsg> + Send + Sync> =
        Arc::new(TestGroup { members: vec![Box::new(a1), Box::new(a2)], senders_seen: senders_seen.clone() });

    svc.schedule_group_message(deadline_in(&ts, 15), group, &weak_sender, TestMsg::Group(99));

    assert_eq!(rx1.recv_timeout(Duration::from_millis(200)).unwrap(), TestMsg::Group(99));
    assert_eq!(rx2.recv_timeout(Duration::from_millis(200)).unwrap(), TestMsg::Group(99));
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(senders_seen.lock().unwrap().as_slice(), &[sender.id()]);

    svc.cancel_dispatch_loop().unwrap();
}

#[test]
fn delayed_group_message_for_an_already_gone_sender_creates_no_entry() {
    let (svc, ts) = svc();
    let (a1, rx1) = ActorRef::<TestMsg>::new("g1", 4);
    let (sender, sender_rx) = ActorRef::<TestMsg>::new("sender", 4);
    let weak_sender = sender.downgrade();
    drop(sender);
    drop(sender_rx);
    let senders_seen = Arc::new(Mutex::new(Vec::new()));
    let group: Arc<dyn GroupReceiver<TestMsg> + Send + Sync> =
        Arc::new(TestGroup { members: vec![Box::new(a1)], senders_seen: senders_seen.clone() });

    svc.schedule_group_message(deadline_in(&ts, 10), group, &weak_sender, TestMsg::Group(1));

    assert!(rx1.recv_timeout(Duration::from_millis(150)).is_err(), "gone sender must suppress the whole entry");
    assert!(senders_seen.lock().unwrap().is_empty());

    svc.cancel_dispatch_loop().unwrap();
}

#[test]
fn setter_for_an_already_gone_actor_creates_no_entry() {
    let (svc, ts) = svc();
    let (actor, rx) = ActorRef::<TestMsg>::new("a", 4);
    let weak = actor.downgrade();
    drop(actor);
    drop(rx);

    svc.set_ordinary_timeout(deadline_in(&ts, 10), &weak, "tick", TestMsg::Timeout("tick", 1));
    std::thread::sleep(Duration::from_millis(60));

    svc.cancel_dispatch_loop().unwrap();
}

#[test]
fn cancel_all_twice_is_idempotent() {
    let (svc, ts) = svc();
    let (actor, _rx) = ActorRef::<TestMsg>::new("a", 4);
    let weak = actor.downgrade();
    svc.set_ordinary_timeout(deadline_in(&ts, 500), &weak, "tick", TestMsg::Timeout("tick", 1));

    svc.cancel_all();
    svc.cancel_all();

    svc.cancel_dispatch_loop().unwrap();
}
