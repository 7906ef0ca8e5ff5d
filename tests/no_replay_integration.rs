//! Integration tests for no-replay subscriptions
//!
//! Covers the end-to-end scenarios across containers, host scopes and derived
//! scopes, in both contexts.

use std::{cell::RefCell, rc::Rc};
#[cfg(all(feature = "shared", not(target_arch = "wasm32")))]
use std::{
  sync::{mpsc, Arc, Mutex},
  thread,
};

use rxlive::prelude::*;

type Seen<T> = Rc<RefCell<Vec<T>>>;

fn resumed_host<'a>() -> LocalLifecycle<'a> {
  let host = LocalLifecycle::local();
  host.set_current_state(LifecycleState::Resumed).unwrap();
  host
}

#[rxlive_macro::test]
fn present_value_is_not_replayed() {
  let host = resumed_host();
  let live = LocalLiveData::local_with(5);
  let seen = Seen::default();

  let c_seen = seen.clone();
  let _sub = live.subscribe_no_replay(&host, move |v| c_seen.borrow_mut().push(v));
  live.set_value(6);

  assert_eq!(*seen.borrow(), [6]);
}

#[rxlive_macro::test]
fn empty_container_delivers_every_value() {
  let host = resumed_host();
  let live = LocalLiveData::local();
  let seen = Seen::default();

  let c_seen = seen.clone();
  let _sub = live.subscribe_no_replay(&host, move |v| c_seen.borrow_mut().push(v));
  live.set_value(1);
  live.set_value(2);

  assert_eq!(*seen.borrow(), [1, 2]);
}

#[rxlive_macro::test]
fn derived_scope_phases() {
  let host = LocalLifecycle::local();
  let derived = ExtendedLifecycle::local(&host);

  let seen = Seen::default();
  let c_seen = seen.clone();
  let _sub = derived.add_observer(
    FnMutObserver(move |e: LifecycleEvent| c_seen.borrow_mut().push(e)).into_boxed(),
  );

  for event in [
    LifecycleEvent::Created,
    LifecycleEvent::Resumed,
    LifecycleEvent::Paused,
    LifecycleEvent::Destroyed,
  ] {
    host.handle_lifecycle_event(event).unwrap();
  }

  use LifecycleEvent::*;
  assert_eq!(*seen.borrow(), [Created, Started, Resumed, Paused, Stopped, Destroyed]);
}

#[rxlive_macro::test]
fn has_value_does_not_leave_observers_behind() {
  let live = LocalLiveData::local_with("event");
  assert!(!live.has_observers());
  assert!(live.has_value());
  assert!(!live.has_observers());

  let empty = LocalLiveData::<i32>::local();
  assert!(!empty.has_value());
  assert!(!empty.has_observers());
}

#[rxlive_macro::test]
fn plain_subscribe_still_replays() {
  let host = resumed_host();
  let live = LocalLiveData::local_with(5);
  let sticky = Seen::default();
  let fresh = Seen::default();

  let c_sticky = sticky.clone();
  let _a = live.subscribe(&host, move |v| c_sticky.borrow_mut().push(v));
  let c_fresh = fresh.clone();
  let _b = live.subscribe_no_replay(&host, move |v| c_fresh.borrow_mut().push(v));
  live.set_value(6);

  assert_eq!(*sticky.borrow(), [5, 6]);
  assert_eq!(*fresh.borrow(), [6]);
}

#[rxlive_macro::test]
fn resubscribing_screen_sees_only_new_events() {
  let live = LocalLiveData::local();
  let seen = Seen::default();

  // First screen consumes an event and goes away.
  let first = resumed_host();
  let c_seen = seen.clone();
  let _sub = live.subscribe_no_replay(&first, move |v| c_seen.borrow_mut().push(("first", v)));
  live.set_value(1);
  first.handle_lifecycle_event(LifecycleEvent::Destroyed).unwrap();

  // The next one must not get the same event again.
  let second = resumed_host();
  let c_seen = seen.clone();
  let _sub = live.subscribe_no_replay(&second, move |v| c_seen.borrow_mut().push(("second", v)));
  live.set_value(2);

  assert_eq!(*seen.borrow(), [("first", 1), ("second", 2)]);
  assert_eq!(live.observer_count(), 1);
}

#[rxlive_macro::test]
fn inactive_host_does_not_receive_until_created() {
  let host = LocalLifecycle::local();
  let live = LocalLiveData::local();
  let seen = Seen::default();

  let c_seen = seen.clone();
  let sub = live.subscribe_no_replay(&host, move |v| c_seen.borrow_mut().push(v));
  assert!(!sub.first().is_active());

  live.set_value(1);
  assert!(seen.borrow().is_empty());

  host.handle_lifecycle_event(LifecycleEvent::Created).unwrap();
  assert!(sub.first().is_active());
  assert_eq!(*seen.borrow(), [1]);
}

#[rxlive_macro::test]
fn paused_host_keeps_delivering() {
  let host = resumed_host();
  let live = LocalLiveData::local();
  let seen = Seen::default();

  let c_seen = seen.clone();
  let _sub = live.subscribe_no_replay(&host, move |v| c_seen.borrow_mut().push(v));
  host.handle_lifecycle_event(LifecycleEvent::Paused).unwrap();
  host.handle_lifecycle_event(LifecycleEvent::Stopped).unwrap();
  live.set_value(1);

  assert_eq!(host.current_state(), LifecycleState::Created);
  assert_eq!(*seen.borrow(), [1]);
}

#[rxlive_macro::test]
fn guard_unsubscribes_on_drop() {
  let host = resumed_host();
  let live = LocalLiveData::local();
  let seen = Seen::default();
  {
    let c_seen = seen.clone();
    let _guard = live
      .subscribe_no_replay(&host, move |v| c_seen.borrow_mut().push(v))
      .unsubscribe_when_dropped();
    live.set_value(1);
  }
  live.set_value(2);

  assert_eq!(*seen.borrow(), [1]);
  assert_eq!(host.observer_count(), 0);
  assert!(!live.has_observers());
}

#[rxlive_macro::test]
fn custom_observer_through_with_variant() {
  struct Counter(Rc<RefCell<usize>>);

  impl Observer<&'static str> for Counter {
    fn next(&mut self, _: &'static str) { *self.0.borrow_mut() += 1; }
  }

  let live = LocalLiveData::local_with("old");
  let count = Rc::new(RefCell::new(0));
  let _sub = live.subscribe_forever_no_replay_with(Counter(count.clone()));
  live.set_value("new");
  live.set_value("newer");

  assert_eq!(*count.borrow(), 2);
}

#[cfg(all(feature = "shared", not(target_arch = "wasm32")))]
#[rxlive_macro::test]
fn shared_context_matches_local() {
  let host = SharedLifecycle::shared();
  host.set_current_state(LifecycleState::Resumed).unwrap();
  let live = SharedLiveData::shared_with(5);
  let seen = Arc::new(Mutex::new(vec![]));

  let c_seen = seen.clone();
  let _sub = live.subscribe_no_replay(&host, move |v: i32| c_seen.lock().unwrap().push(v));

  let c_live = live.clone();
  thread::spawn(move || {
    c_live.set_value(6);
    c_live.set_value(7);
  })
  .join()
  .unwrap();

  assert_eq!(*seen.lock().unwrap(), [6, 7]);

  let c_host = host.clone();
  thread::spawn(move || c_host.handle_lifecycle_event(LifecycleEvent::Destroyed).unwrap())
    .join()
    .unwrap();
  assert!(!live.has_observers());
}

#[cfg(all(feature = "shared", not(target_arch = "wasm32")))]
#[rxlive_macro::test]
fn subscribing_during_another_threads_dispatch_skips_its_value() {
  let live = SharedLiveData::shared_with(5);
  let (entered_tx, entered_rx) = mpsc::channel();
  let (release_tx, release_rx) = mpsc::channel::<()>();
  let _slow = live.subscribe_forever(move |v: i32| {
    if v == 6 {
      entered_tx.send(()).unwrap();
      release_rx.recv().unwrap();
    }
  });

  let c_live = live.clone();
  let writer = thread::spawn(move || c_live.set_value(6));
  entered_rx.recv().unwrap();

  // The writer is still delivering 6 when the subscription is made.
  let seen = Arc::new(Mutex::new(vec![]));
  let c_seen = seen.clone();
  let _sub = live.subscribe_forever_no_replay(move |v: i32| c_seen.lock().unwrap().push(v));

  release_tx.send(()).unwrap();
  writer.join().unwrap();
  assert!(seen.lock().unwrap().is_empty());

  live.set_value(7);
  assert_eq!(*seen.lock().unwrap(), [7]);
}
