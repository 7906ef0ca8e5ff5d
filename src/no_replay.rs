//! Subscriptions that skip the replayed value.
//!
//! A [`LiveData`] replays its current value to every new registration. Event
//! consumers only want values set after they subscribed. The no-replay
//! registrations here work in three steps:
//!
//! 1. [`LiveData::has_value`] checks whether the container holds a value,
//! 2. the caller's observer is wrapped in a [`SkipReplayObserver`] that drops
//!    the first delivery if the check said yes,
//! 3. the wrapper is registered, through an [`ExtendedLifecycle`] for scoped
//!    registrations so that it is active from the host's `Created` phase on.
//!
//! # Limitations
//!
//! A value set between the check and the registration becoming active can't
//! be told apart from the replayed one and is suppressed as well. The
//! extended scope keeps that window as short as the host allows.

use crate::{
  context::{Context, RcDeref},
  lifecycle::{
    extended::HostForwarder, ExtendedLifecycle, Lifecycle, LifecycleEvent, LifecycleState,
    LifecycleSubscription,
  },
  live_data::{LiveData, LiveSubscription, ScopeBinding, ScopedLiveSubscription},
  observer::{FnMutObserver, IntoBoxedObserver, Observer},
  subscription::{Subscription, TupleSubscription},
};

/// Where a [`SkipReplayObserver`] is in its one-way state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayState {
  /// No notification seen yet.
  PendingFirst,
  /// Everything is forwarded.
  PassThrough,
}

/// Forwards every notification to `inner` except the first one, when the
/// container already held a value at registration time.
///
/// ```rust
/// use rxlive::prelude::*;
///
/// let mut seen = vec![];
/// let mut observer = SkipReplayObserver::new(true, FnMutObserver(|v: i32| seen.push(v)));
/// observer.next(5);
/// observer.next(6);
/// assert_eq!(observer.state(), ReplayState::PassThrough);
/// drop(observer);
/// assert_eq!(seen, [6]);
/// ```
pub struct SkipReplayObserver<O> {
  had_value: bool,
  state: ReplayState,
  inner: O,
}

impl<O> SkipReplayObserver<O> {
  pub fn new(had_value: bool, inner: O) -> Self {
    Self { had_value, state: ReplayState::PendingFirst, inner }
  }

  #[inline]
  pub fn had_value(&self) -> bool { self.had_value }

  #[inline]
  pub fn state(&self) -> ReplayState { self.state }

  pub fn into_inner(self) -> O { self.inner }
}

impl<Item, O> Observer<Item> for SkipReplayObserver<O>
where
  O: Observer<Item>,
{
  fn next(&mut self, value: Item) {
    if self.state == ReplayState::PendingFirst {
      self.state = ReplayState::PassThrough;
      if self.had_value {
        tracing::trace!("replayed value suppressed");
        return;
      }
    }
    self.inner.next(value);
  }
}

/// Handle of a scoped no-replay registration: the container registration
/// bound to the derived scope, and the derived scope's registration on the
/// host.
pub type NoReplaySubscription<'a, C, T, U> =
  TupleSubscription<ScopedLiveSubscription<'a, C, T, LifecycleSubscription<'a, C>>, Option<U>>;

impl<'a, C: Context, T: Clone + 'a> LiveData<'a, C, T> {
  /// Whether the container currently holds a value.
  ///
  /// Registers a throwaway observer and unregisters it right away; the
  /// observer set is the same before and after the call. While a dispatch is
  /// running, on this thread or another one, the replay owed to the
  /// throwaway observer counts as a value.
  pub fn has_value(&self) -> bool {
    let seen: C::RcMut<bool> = From::from(false);
    let check = self.subscribe_forever_boxed(C::flag_observer(seen.clone()));
    let pending = check.is_delivery_pending();
    check.unsubscribe();
    let has_value = *seen.rc_deref() || pending;
    tracing::trace!(has_value, "checked live data for a value");
    has_value
  }

  /// Register a closure that only receives values set after this call.
  pub fn subscribe_forever_no_replay<F>(&self, f: F) -> LiveSubscription<'a, C, T, ()>
  where
    F: FnMut(T) + 'a,
    SkipReplayObserver<FnMutObserver<F>>: IntoBoxedObserver<C::BoxedObserver<'a, T>>,
  {
    self.subscribe_forever_no_replay_with(FnMutObserver(f))
  }

  pub fn subscribe_forever_no_replay_with<O>(&self, observer: O) -> LiveSubscription<'a, C, T, ()>
  where
    O: Observer<T>,
    SkipReplayObserver<O>: IntoBoxedObserver<C::BoxedObserver<'a, T>>,
  {
    let had_value = self.has_value();
    self.subscribe_forever_with(SkipReplayObserver::new(had_value, observer))
  }

  /// Register a closure bound to `scope` that only receives values set after
  /// this call.
  ///
  /// The registration goes through an [`ExtendedLifecycle`] derived from
  /// `scope`, so it is active from the scope's `Created` phase until the scope
  /// is destroyed. Unsubscribing the returned handle removes the registration
  /// and detaches the derived scope from `scope`. A scope that is already
  /// destroyed refuses the registration and a closed handle is returned.
  pub fn subscribe_no_replay<L, F>(
    &self, scope: &L, f: F,
  ) -> NoReplaySubscription<'a, C, T, L::Unsub>
  where
    L: Lifecycle,
    F: FnMut(T) + 'a,
    SkipReplayObserver<FnMutObserver<F>>: IntoBoxedObserver<C::BoxedObserver<'a, T>>,
    HostForwarder<'a, C>: IntoBoxedObserver<L::BoxedObserver>,
    ScopeBinding<'a, C, T>: IntoBoxedObserver<C::BoxedObserver<'a, LifecycleEvent>>,
  {
    self.subscribe_no_replay_with(scope, FnMutObserver(f))
  }

  pub fn subscribe_no_replay_with<L, O>(
    &self, scope: &L, observer: O,
  ) -> NoReplaySubscription<'a, C, T, L::Unsub>
  where
    L: Lifecycle,
    O: Observer<T>,
    SkipReplayObserver<O>: IntoBoxedObserver<C::BoxedObserver<'a, T>>,
    HostForwarder<'a, C>: IntoBoxedObserver<L::BoxedObserver>,
    ScopeBinding<'a, C, T>: IntoBoxedObserver<C::BoxedObserver<'a, LifecycleEvent>>,
  {
    if scope.current_state() == LifecycleState::Destroyed {
      tracing::debug!("scope already destroyed, no-replay registration ignored");
      return TupleSubscription::new(self.closed_subscription(), None);
    }

    let had_value = self.has_value();
    let extended = ExtendedLifecycle::<C, L::Unsub>::new(scope);
    let live = self.subscribe_with(&extended, SkipReplayObserver::new(had_value, observer));
    TupleSubscription::new(live, Some(extended.into_host_subscription()))
  }
}
