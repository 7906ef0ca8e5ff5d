//! Activation scopes.
//!
//! A [`Lifecycle`] is the scope a container registration is bound to. It moves
//! through ordered [`LifecycleState`]s and tells its observers about every
//! step with a [`LifecycleEvent`]. Containers treat a registration as active
//! while its scope is at least [`LifecycleState::Started`] and drop it when
//! the scope is destroyed.
//!
//! [`LifecycleRegistry`] is the concrete host scope. [`ExtendedLifecycle`]
//! derives a scope from a host that is active from the host's `Created`
//! phase on, for event-style consumers that must not wait for `Started`.

pub mod extended;
pub mod registry;

pub use extended::{ExtendedLifecycle, LocalExtendedLifecycle};
pub use registry::{LifecycleRegistry, LifecycleSubscription, LocalLifecycle};
#[cfg(feature = "shared")]
pub use registry::SharedLifecycle;

use crate::subscription::Subscription;

/// Phases of a scope, ordered from torn down to fully active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
  Destroyed,
  Initialized,
  Created,
  Started,
  Resumed,
}

impl LifecycleState {
  #[inline]
  pub fn is_at_least(self, state: LifecycleState) -> bool { self >= state }
}

/// A single step between two adjacent [`LifecycleState`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
  Created,
  Started,
  Resumed,
  Paused,
  Stopped,
  Destroyed,
}

impl LifecycleEvent {
  /// The state a scope is in right after this event.
  pub fn target_state(self) -> LifecycleState {
    match self {
      LifecycleEvent::Created | LifecycleEvent::Stopped => LifecycleState::Created,
      LifecycleEvent::Started | LifecycleEvent::Paused => LifecycleState::Started,
      LifecycleEvent::Resumed => LifecycleState::Resumed,
      LifecycleEvent::Destroyed => LifecycleState::Destroyed,
    }
  }

  /// The event that moves one step up from `state`, if any.
  pub fn up_from(state: LifecycleState) -> Option<Self> {
    match state {
      LifecycleState::Initialized => Some(LifecycleEvent::Created),
      LifecycleState::Created => Some(LifecycleEvent::Started),
      LifecycleState::Started => Some(LifecycleEvent::Resumed),
      LifecycleState::Destroyed | LifecycleState::Resumed => None,
    }
  }

  /// The event that moves one step down from `state`, if any.
  pub fn down_from(state: LifecycleState) -> Option<Self> {
    match state {
      LifecycleState::Created => Some(LifecycleEvent::Destroyed),
      LifecycleState::Started => Some(LifecycleEvent::Stopped),
      LifecycleState::Resumed => Some(LifecycleEvent::Paused),
      LifecycleState::Destroyed | LifecycleState::Initialized => None,
    }
  }
}

/// Rejected state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
  #[error("a lifecycle must be at least Created to move to Destroyed, but was Initialized")]
  DestroyedBeforeCreated,
  #[error("lifecycle is Destroyed and cannot move to {target:?}")]
  AlreadyDestroyed { target: LifecycleState },
}

/// An activation scope that containers can bind registrations to.
///
/// Observers added with [`add_observer`](Lifecycle::add_observer) are caught
/// up synchronously: they receive the events leading from `Initialized` to the
/// current state before `add_observer` returns.
pub trait Lifecycle {
  /// The boxed observer form this scope stores.
  type BoxedObserver;
  type Unsub: Subscription;

  fn current_state(&self) -> LifecycleState;

  fn add_observer(&self, observer: Self::BoxedObserver) -> Self::Unsub;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[rxlive_macro::test]
  fn states_are_ordered() {
    assert!(LifecycleState::Resumed.is_at_least(LifecycleState::Started));
    assert!(LifecycleState::Started.is_at_least(LifecycleState::Started));
    assert!(!LifecycleState::Created.is_at_least(LifecycleState::Started));
    assert!(!LifecycleState::Destroyed.is_at_least(LifecycleState::Initialized));
  }

  #[rxlive_macro::test]
  fn up_and_down_walk_the_whole_ladder() {
    let mut state = LifecycleState::Initialized;
    let mut ups = vec![];
    while let Some(event) = LifecycleEvent::up_from(state) {
      ups.push(event);
      state = event.target_state();
    }
    assert_eq!(ups, [LifecycleEvent::Created, LifecycleEvent::Started, LifecycleEvent::Resumed]);
    assert_eq!(state, LifecycleState::Resumed);

    let mut downs = vec![];
    while let Some(event) = LifecycleEvent::down_from(state) {
      downs.push(event);
      state = event.target_state();
    }
    assert_eq!(downs, [LifecycleEvent::Paused, LifecycleEvent::Stopped, LifecycleEvent::Destroyed]);
    assert_eq!(state, LifecycleState::Destroyed);
  }

  #[rxlive_macro::test]
  fn error_messages() {
    assert_eq!(
      LifecycleError::AlreadyDestroyed { target: LifecycleState::Started }.to_string(),
      "lifecycle is Destroyed and cannot move to Started"
    );
  }
}
