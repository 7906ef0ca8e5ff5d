use super::{Lifecycle, LifecycleError, LifecycleEvent, LifecycleState};
#[cfg(feature = "shared")]
use crate::context::Shared;
use crate::{
  context::{Context, Local, RcDeref, RcDerefMut},
  observer::Observer,
  subscription::{DynamicSubscriptions, Subscription},
};

/// Pointer to the shared state of a [`LifecycleRegistry`] in context `C`.
pub(crate) type RegistryPtr<'a, C> =
  <C as Context>::RcMut<RegistryState<<C as Context>::BoxedObserver<'a, LifecycleEvent>>>;

pub struct RegistryState<O> {
  state: LifecycleState,
  observers: DynamicSubscriptions<ObserverSlot<O>>,
}

struct ObserverSlot<O> {
  /// `None` while the observer is being called.
  observer: Option<O>,
  /// The state this observer has been told about so far.
  state: LifecycleState,
}

impl<O> ObserverSlot<O> {
  fn next_event(&self, target: LifecycleState) -> Option<LifecycleEvent> {
    self.observer.as_ref()?;
    if self.state > target {
      LifecycleEvent::down_from(self.state)
    } else if self.state < target {
      LifecycleEvent::up_from(self.state)
    } else {
      None
    }
  }
}

/// A host scope driven by explicit events.
///
/// The registry keeps every observer in step with its own state one event at
/// a time: moving a `Resumed` registry to `Destroyed` tells each observer
/// `Paused`, `Stopped` and `Destroyed` in turn (newest observer first), and
/// moving up tells `Created`, `Started`, `Resumed` (oldest observer first).
/// After reaching `Destroyed` all observers are released.
///
/// Observers are never called while the registry state is borrowed, so they
/// may add or remove observers and drive further events from inside their
/// callbacks. A panicking observer is put back into its slot and the panic
/// propagates; the registry keeps its new state and the remaining observers
/// are caught up by the next transition.
///
/// # Example
///
/// ```rust
/// use std::{cell::RefCell, rc::Rc};
///
/// use rxlive::prelude::*;
///
/// let host = LocalLifecycle::local();
/// host.handle_lifecycle_event(LifecycleEvent::Created).unwrap();
/// host.handle_lifecycle_event(LifecycleEvent::Started).unwrap();
///
/// let seen = Rc::new(RefCell::new(vec![]));
/// let c_seen = seen.clone();
/// let observer = FnMutObserver(move |e: LifecycleEvent| c_seen.borrow_mut().push(e));
/// let _sub = host.add_observer(observer.into_boxed());
///
/// // Caught up on registration.
/// assert_eq!(*seen.borrow(), [LifecycleEvent::Created, LifecycleEvent::Started]);
/// ```
pub struct LifecycleRegistry<'a, C: Context> {
  inner: RegistryPtr<'a, C>,
}

pub type LocalLifecycle<'a> = LifecycleRegistry<'a, Local>;

#[cfg(feature = "shared")]
pub type SharedLifecycle<'a> = LifecycleRegistry<'a, Shared>;

impl<'a> LifecycleRegistry<'a, Local> {
  /// Create a single-threaded registry in the `Initialized` state.
  pub fn local() -> Self { Self::new() }
}

#[cfg(feature = "shared")]
impl<'a> LifecycleRegistry<'a, Shared> {
  /// Create a thread-movable registry in the `Initialized` state.
  pub fn shared() -> Self { Self::new() }
}

impl<'a, C: Context> Clone for LifecycleRegistry<'a, C> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<'a, C: Context> Default for LifecycleRegistry<'a, C> {
  fn default() -> Self { Self::new() }
}

impl<'a, C: Context> LifecycleRegistry<'a, C> {
  pub fn new() -> Self {
    let state =
      RegistryState { state: LifecycleState::Initialized, observers: DynamicSubscriptions::new() };
    Self { inner: From::from(state) }
  }

  pub fn current_state(&self) -> LifecycleState { self.inner.rc_deref().state }

  pub fn observer_count(&self) -> usize { self.inner.rc_deref().observers.len() }

  /// Move to the state that follows `event`.
  pub fn handle_lifecycle_event(&self, event: LifecycleEvent) -> Result<(), LifecycleError> {
    self.set_current_state(event.target_state())
  }

  /// Move straight to `next`, stepping every observer through the events in
  /// between.
  pub fn set_current_state(&self, next: LifecycleState) -> Result<(), LifecycleError> {
    let current = {
      let mut inner = self.inner.rc_deref_mut();
      let current = inner.state;
      if current == next {
        return Ok(());
      }
      match (current, next) {
        (LifecycleState::Initialized, LifecycleState::Destroyed) => {
          return Err(LifecycleError::DestroyedBeforeCreated);
        }
        (LifecycleState::Destroyed, target) => {
          return Err(LifecycleError::AlreadyDestroyed { target });
        }
        _ => inner.state = next,
      }
      current
    };
    tracing::debug!(from = ?current, to = ?next, "lifecycle state changed");

    self.sync();
    if next == LifecycleState::Destroyed {
      self.release_observers();
    }
    Ok(())
  }

  /// Register `observer` and catch it up with the current state.
  ///
  /// Registering on a destroyed registry is a no-op that returns a closed
  /// subscription.
  pub fn add_observer(
    &self, observer: C::BoxedObserver<'a, LifecycleEvent>,
  ) -> LifecycleSubscription<'a, C> {
    let id = {
      let mut inner = self.inner.rc_deref_mut();
      if inner.state == LifecycleState::Destroyed {
        inner.observers.reserve_id()
      } else {
        let slot = ObserverSlot { observer: Some(observer), state: LifecycleState::Initialized };
        let id = inner.observers.add(slot);
        tracing::trace!(observer = id, "lifecycle observer added");
        id
      }
    };
    self.sync();
    LifecycleSubscription { registry: self.inner.clone(), id }
  }

  fn sync(&self) {
    while let Some((id, event, observer)) = self.next_step() {
      tracing::trace!(observer = id, ?event, "dispatching lifecycle event");
      let mut lent = LentObserver { registry: self, id, observer: Some(observer) };
      if let Some(observer) = lent.observer.as_mut() {
        observer.next(event);
      }
    }
  }

  /// Picks the next observer that lags behind the registry, advances its
  /// recorded state by one event and takes it out of its slot.
  fn next_step(&self) -> Option<(usize, LifecycleEvent, C::BoxedObserver<'a, LifecycleEvent>)> {
    let mut inner = self.inner.rc_deref_mut();
    let target = inner.state;
    let down = inner.observers.iter_mut().rev().find_map(|(id, slot)| {
      slot.next_event(target).filter(|_| slot.state > target).map(|event| (id, event))
    });
    let (id, event) = down.or_else(|| {
      inner.observers.iter_mut().find_map(|(id, slot)| slot.next_event(target).map(|e| (id, e)))
    })?;

    let slot = inner.observers.get_mut(id)?;
    slot.state = event.target_state();
    let observer = slot.observer.take()?;
    Some((id, event, observer))
  }

  fn restore(&self, id: usize, observer: C::BoxedObserver<'a, LifecycleEvent>) {
    let mut observer = Some(observer);
    if let Some(slot) = self.inner.rc_deref_mut().observers.get_mut(id) {
      slot.observer = observer.take();
    }
    // Removed while it was running; drop it outside the borrow.
    drop(observer);
  }

  fn release_observers(&self) {
    let released: Vec<_> = self.inner.rc_deref_mut().observers.drain().collect();
    tracing::debug!(count = released.len(), "lifecycle destroyed, releasing observers");
    drop(released);
  }
}

/// An observer taken out of its slot for a call; put back on drop, panics
/// included.
struct LentObserver<'g, 'a, C: Context> {
  registry: &'g LifecycleRegistry<'a, C>,
  id: usize,
  observer: Option<C::BoxedObserver<'a, LifecycleEvent>>,
}

impl<'g, 'a, C: Context> Drop for LentObserver<'g, 'a, C> {
  fn drop(&mut self) {
    if let Some(observer) = self.observer.take() {
      self.registry.restore(self.id, observer);
    }
  }
}

impl<'a, C: Context> Lifecycle for LifecycleRegistry<'a, C> {
  type BoxedObserver = C::BoxedObserver<'a, LifecycleEvent>;
  type Unsub = LifecycleSubscription<'a, C>;

  fn current_state(&self) -> LifecycleState { LifecycleRegistry::current_state(self) }

  fn add_observer(&self, observer: Self::BoxedObserver) -> Self::Unsub {
    LifecycleRegistry::add_observer(self, observer)
  }
}

/// Registration of an observer on a [`LifecycleRegistry`].
pub struct LifecycleSubscription<'a, C: Context> {
  registry: RegistryPtr<'a, C>,
  id: usize,
}

impl<'a, C: Context> Subscription for LifecycleSubscription<'a, C> {
  fn unsubscribe(self) {
    let removed = self.registry.rc_deref_mut().observers.remove(self.id);
    drop(removed);
  }

  fn is_closed(&self) -> bool { !self.registry.rc_deref().observers.contains(self.id) }
}
