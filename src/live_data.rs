//! A sticky observable container.
//!
//! [`LiveData`] holds zero or one value and a version counter. Every
//! registration carries the version it has seen; a registration is notified
//! when it is active and behind the container. New registrations therefore
//! receive the current value as soon as they become active ("sticky"
//! delivery).
//!
//! Registrations come in two kinds:
//!
//! - *forever*: active from registration until unsubscribed,
//! - *scoped*: bound to a [`Lifecycle`]; active while the scope is at least
//!   [`LifecycleState::Started`], removed when the scope is destroyed.
//!
//! # Re-entrancy
//!
//! Observers run with no borrow or lock on the container held, so they may
//! set values, subscribe and unsubscribe from inside their callbacks. A
//! `set_value` or an activation that happens while the container is already
//! dispatching, on this thread or another one, does not dispatch on its own:
//! it invalidates the running dispatch loop, which restarts and delivers the
//! newest value.
//!
//! A panic in an observer propagates out of the call that delivered the
//! value. The observer is put back into its slot on the way out, so its
//! registration keeps receiving later values.

use smallvec::SmallVec;

#[cfg(feature = "shared")]
use crate::context::Shared;
use crate::{
  context::{Context, Local, RcDeref, RcDerefMut},
  lifecycle::{Lifecycle, LifecycleEvent, LifecycleState},
  observer::{FnMutObserver, IntoBoxedObserver, Observer},
  subscription::{DynamicSubscriptions, Subscription},
};

pub(crate) type LivePtr<'a, C, T> =
  <C as Context>::RcMut<LiveState<<C as Context>::BoxedObserver<'a, T>, T>>;

pub(crate) struct LiveState<O, T> {
  data: Option<T>,
  /// Bumped by every `set_value`; `0` means never set.
  version: u64,
  observers: DynamicSubscriptions<LiveSlot<O>>,
  dispatching: bool,
  dispatch_invalidated: bool,
}

struct LiveSlot<O> {
  /// `None` while the observer is being called.
  observer: Option<O>,
  active: bool,
  last_version: u64,
}

/// A container of zero or one value that replays it to new registrations.
///
/// # Example
///
/// ```rust
/// use std::{cell::RefCell, rc::Rc};
///
/// use rxlive::prelude::*;
///
/// let live = LiveData::local_with(1);
/// let seen = Rc::new(RefCell::new(vec![]));
///
/// let c_seen = seen.clone();
/// let sub = live.subscribe_forever(move |v| c_seen.borrow_mut().push(v));
/// live.set_value(2);
/// sub.unsubscribe();
/// live.set_value(3);
///
/// assert_eq!(*seen.borrow(), [1, 2]);
/// ```
pub struct LiveData<'a, C: Context, T: 'a> {
  inner: LivePtr<'a, C, T>,
}

pub type LocalLiveData<'a, T> = LiveData<'a, Local, T>;

#[cfg(feature = "shared")]
pub type SharedLiveData<'a, T> = LiveData<'a, Shared, T>;

impl<'a, T: 'a> LiveData<'a, Local, T> {
  pub fn local() -> Self { Self::new() }

  pub fn local_with(value: T) -> Self { Self::with_value(value) }
}

#[cfg(feature = "shared")]
impl<'a, T: 'a> LiveData<'a, Shared, T> {
  pub fn shared() -> Self { Self::new() }

  pub fn shared_with(value: T) -> Self { Self::with_value(value) }
}

impl<'a, C: Context, T: 'a> Clone for LiveData<'a, C, T> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<'a, C: Context, T: 'a> Default for LiveData<'a, C, T> {
  fn default() -> Self { Self::new() }
}

impl<'a, C: Context, T: 'a> LiveData<'a, C, T> {
  /// An empty container.
  pub fn new() -> Self { Self::from_state(None, 0) }

  /// A container that already holds `value`, as if it had been set once.
  pub fn with_value(value: T) -> Self { Self::from_state(Some(value), 1) }

  fn from_state(data: Option<T>, version: u64) -> Self {
    let state = LiveState {
      data,
      version,
      observers: DynamicSubscriptions::new(),
      dispatching: false,
      dispatch_invalidated: false,
    };
    Self { inner: From::from(state) }
  }

  pub fn has_observers(&self) -> bool { !self.inner.rc_deref().observers.is_empty() }

  pub fn has_active_observers(&self) -> bool {
    self.inner.rc_deref().observers.iter().any(|slot| slot.active)
  }

  pub fn observer_count(&self) -> usize { self.inner.rc_deref().observers.len() }

  /// A handle that is already closed, for registrations that were refused.
  pub(crate) fn closed_subscription<U>(&self) -> LiveSubscription<'a, C, T, Option<U>> {
    let id = self.inner.rc_deref_mut().observers.reserve_id();
    LiveSubscription { live: self.inner.clone(), id, scope: None }
  }

  fn add_slot(&self, observer: C::BoxedObserver<'a, T>) -> usize {
    let slot = LiveSlot { observer: Some(observer), active: false, last_version: 0 };
    let id = self.inner.rc_deref_mut().observers.add(slot);
    tracing::trace!(observer = id, "live data observer added");
    id
  }

  fn remove_observer(&self, id: usize) {
    let removed = self.inner.rc_deref_mut().observers.remove(id);
    if removed.is_some() {
      tracing::trace!(observer = id, "live data observer removed");
    }
    drop(removed);
  }

  fn restore(&self, id: usize, observer: C::BoxedObserver<'a, T>) {
    let mut observer = Some(observer);
    if let Some(slot) = self.inner.rc_deref_mut().observers.get_mut(id) {
      slot.observer = observer.take();
    }
    drop(observer);
  }
}

impl<'a, C: Context, T: Clone + 'a> LiveData<'a, C, T> {
  /// Store `value` and deliver it to every active observer.
  pub fn set_value(&self, value: T) {
    let (old, version) = {
      let mut inner = self.inner.rc_deref_mut();
      inner.version += 1;
      (inner.data.replace(value), inner.version)
    };
    drop(old);
    tracing::trace!(version, "live data value set");
    self.dispatch(None);
  }

  /// Register a closure that stays active until the returned handle is
  /// unsubscribed. A present value is delivered before this returns, unless
  /// the container is already dispatching: then the running dispatch
  /// delivers it.
  pub fn subscribe_forever<F>(&self, f: F) -> LiveSubscription<'a, C, T, ()>
  where
    F: FnMut(T) + 'a,
    FnMutObserver<F>: IntoBoxedObserver<C::BoxedObserver<'a, T>>,
  {
    self.subscribe_forever_with(FnMutObserver(f))
  }

  pub fn subscribe_forever_with<O>(&self, observer: O) -> LiveSubscription<'a, C, T, ()>
  where
    O: IntoBoxedObserver<C::BoxedObserver<'a, T>>,
  {
    self.subscribe_forever_boxed(observer.into_boxed())
  }

  pub(crate) fn subscribe_forever_boxed(
    &self, observer: C::BoxedObserver<'a, T>,
  ) -> LiveSubscription<'a, C, T, ()> {
    let id = self.add_slot(observer);
    self.change_active_state(id, true);
    LiveSubscription { live: self.inner.clone(), id, scope: () }
  }

  /// Register a closure bound to `scope`.
  ///
  /// The registration is active while `scope` is at least `Started` and is
  /// removed when `scope` is destroyed. A scope that is already destroyed
  /// refuses the registration and a closed handle is returned.
  pub fn subscribe<L, F>(&self, scope: &L, f: F) -> ScopedLiveSubscription<'a, C, T, L::Unsub>
  where
    L: Lifecycle,
    F: FnMut(T) + 'a,
    FnMutObserver<F>: IntoBoxedObserver<C::BoxedObserver<'a, T>>,
    ScopeBinding<'a, C, T>: IntoBoxedObserver<L::BoxedObserver>,
  {
    self.subscribe_with(scope, FnMutObserver(f))
  }

  pub fn subscribe_with<L, O>(
    &self, scope: &L, observer: O,
  ) -> ScopedLiveSubscription<'a, C, T, L::Unsub>
  where
    L: Lifecycle,
    O: IntoBoxedObserver<C::BoxedObserver<'a, T>>,
    ScopeBinding<'a, C, T>: IntoBoxedObserver<L::BoxedObserver>,
  {
    if scope.current_state() == LifecycleState::Destroyed {
      tracing::debug!("scope already destroyed, registration ignored");
      return self.closed_subscription();
    }

    let id = self.add_slot(observer.into_boxed());
    let binding = ScopeBinding { live: self.clone(), id };
    let scope = scope.add_observer(binding.into_boxed());
    LiveSubscription { live: self.inner.clone(), id, scope: Some(scope) }
  }

  fn change_active_state(&self, id: usize, active: bool) {
    let changed = match self.inner.rc_deref_mut().observers.get_mut(id) {
      Some(slot) if slot.active != active => {
        slot.active = active;
        true
      }
      _ => false,
    };
    if changed {
      tracing::trace!(observer = id, active, "live data observer activity changed");
      if active {
        self.dispatch(Some(id));
      }
    }
  }

  /// Deliver the current value to `initiator`, or to every observer when
  /// `initiator` is `None`.
  fn dispatch(&self, mut initiator: Option<usize>) {
    {
      let mut inner = self.inner.rc_deref_mut();
      if inner.dispatching {
        inner.dispatch_invalidated = true;
        return;
      }
      inner.dispatching = true;
      inner.dispatch_invalidated = false;
    }
    let unwind = DispatchGuard(self);

    loop {
      if let Some(id) = initiator.take() {
        self.consider_notify(id);
      } else {
        let ids: SmallVec<[usize; 4]> = self.inner.rc_deref().observers.ids().collect();
        for id in ids {
          self.consider_notify(id);
          if self.inner.rc_deref().dispatch_invalidated {
            break;
          }
        }
      }
      // Exit check and end of dispatch happen under one lock.
      {
        let mut inner = self.inner.rc_deref_mut();
        if !inner.dispatch_invalidated {
          inner.dispatching = false;
          break;
        }
        inner.dispatch_invalidated = false;
      }
      tracing::trace!("live data dispatch invalidated, restarting");
    }
    std::mem::forget(unwind);
  }

  fn consider_notify(&self, id: usize) {
    let Some((value, observer)) = self.take_pending(id) else { return };
    let mut lent = LentObserver { live: self, id, observer: Some(observer) };
    if let Some(observer) = lent.observer.as_mut() {
      observer.next(value);
    }
  }

  /// Takes the observer out of its slot together with the value it has not
  /// seen yet, marking that version as delivered.
  fn take_pending(&self, id: usize) -> Option<(T, C::BoxedObserver<'a, T>)> {
    let mut inner = self.inner.rc_deref_mut();
    let LiveState { data, version, observers, .. } = &mut *inner;
    let slot = observers.get_mut(id)?;
    if !slot.active || slot.last_version >= *version {
      return None;
    }
    let value = data.as_ref()?.clone();
    let observer = slot.observer.take()?;
    slot.last_version = *version;
    Some((value, observer))
  }
}

impl<'a, C: Context, T: Clone + 'a> Observer<T> for LiveData<'a, C, T> {
  #[inline]
  fn next(&mut self, value: T) { self.set_value(value) }
}

/// Ends the dispatch when an observer panics out of it.
struct DispatchGuard<'g, 'a, C: Context, T: 'a>(&'g LiveData<'a, C, T>);

impl<'g, 'a, C: Context, T: 'a> Drop for DispatchGuard<'g, 'a, C, T> {
  fn drop(&mut self) {
    let mut inner = self.0.inner.rc_deref_mut();
    inner.dispatching = false;
    inner.dispatch_invalidated = false;
  }
}

/// An observer taken out of its slot for a call; put back on drop, panics
/// included.
struct LentObserver<'g, 'a, C: Context, T: 'a> {
  live: &'g LiveData<'a, C, T>,
  id: usize,
  observer: Option<C::BoxedObserver<'a, T>>,
}

impl<'g, 'a, C: Context, T: 'a> Drop for LentObserver<'g, 'a, C, T> {
  fn drop(&mut self) {
    if let Some(observer) = self.observer.take() {
      self.live.restore(self.id, observer);
    }
  }
}

/// The lifecycle observer a scoped registration places on its scope.
///
/// It keeps the registration's activity in step with the scope and removes
/// the registration when the scope is destroyed.
pub struct ScopeBinding<'a, C: Context, T: 'a> {
  live: LiveData<'a, C, T>,
  id: usize,
}

impl<'a, C: Context, T: Clone + 'a> Observer<LifecycleEvent> for ScopeBinding<'a, C, T> {
  fn next(&mut self, event: LifecycleEvent) {
    if event == LifecycleEvent::Destroyed {
      self.live.remove_observer(self.id);
    } else {
      let active = event.target_state().is_at_least(LifecycleState::Started);
      self.live.change_active_state(self.id, active);
    }
  }
}

/// Registration of an observer on a [`LiveData`].
///
/// `U` is the scope registration cancelled together with it: `()` for
/// forever registrations.
pub struct LiveSubscription<'a, C: Context, T: 'a, U> {
  live: LivePtr<'a, C, T>,
  id: usize,
  scope: U,
}

/// Handle of a registration bound to a scope whose registrations are `U`.
pub type ScopedLiveSubscription<'a, C, T, U> = LiveSubscription<'a, C, T, Option<U>>;

impl<'a, C: Context, T: 'a, U> LiveSubscription<'a, C, T, U> {
  /// Whether the registration is currently receiving values.
  pub fn is_active(&self) -> bool {
    self.live.rc_deref().observers.get(self.id).map_or(false, |slot| slot.active)
  }

  /// Whether the current value is owed to this registration or is being
  /// delivered to it right now.
  pub(crate) fn is_delivery_pending(&self) -> bool {
    let inner = self.live.rc_deref();
    let pending = inner.observers.get(self.id).map_or(false, |slot| {
      slot.observer.is_none() || (slot.active && slot.last_version < inner.version)
    });
    pending
  }
}

impl<'a, C: Context, T: 'a, U: Subscription> Subscription for LiveSubscription<'a, C, T, U> {
  fn unsubscribe(self) {
    let removed = self.live.rc_deref_mut().observers.remove(self.id);
    drop(removed);
    self.scope.unsubscribe();
  }

  fn is_closed(&self) -> bool { !self.live.rc_deref().observers.contains(self.id) }
}
