//! A derived scope with a wider active window.
//!
//! [`ExtendedLifecycle`] observes a host and republishes its phases with
//! `Created` widened to `Created` + `Started`, so registrations bound to it
//! are active for the host's whole `Created..Destroyed` span:
//!
//! | Host event | Derived events |
//! |------------|----------------|
//! | `Created` | `Created`, `Started` |
//! | `Resumed` | `Resumed` |
//! | `Paused` | `Paused` |
//! | `Destroyed` | `Stopped`, `Destroyed` |
//!
//! Host `Started` and `Stopped` are absorbed. The host itself is never
//! mutated.

#[cfg(feature = "shared")]
use super::SharedLifecycle;
use super::{
  Lifecycle, LifecycleEvent, LifecycleRegistry, LifecycleState, LifecycleSubscription,
  LocalLifecycle,
};
#[cfg(feature = "shared")]
use crate::context::Shared;
use crate::{
  context::{Context, Local},
  observer::{IntoBoxedObserver, Observer},
  subscription::Subscription,
};

/// The events the derived scope emits when its host emits `host_event`.
pub fn derived_events(host_event: LifecycleEvent) -> &'static [LifecycleEvent] {
  use LifecycleEvent::*;
  match host_event {
    Created => &[Created, Started],
    Resumed => &[Resumed],
    Paused => &[Paused],
    Destroyed => &[Stopped, Destroyed],
    Started | Stopped => &[],
  }
}

/// A scope derived from a host [`Lifecycle`] that is active from the host's
/// `Created` phase on.
///
/// `U` is the host's subscription type; dropping the derived scope does not
/// detach it, call [`detach`](ExtendedLifecycle::detach) or keep
/// [`into_host_subscription`](ExtendedLifecycle::into_host_subscription) to
/// release the host registration early. A destroyed host releases it on its
/// own.
pub struct ExtendedLifecycle<'a, C: Context, U> {
  derived: LifecycleRegistry<'a, C>,
  host: U,
}

impl<'a, U: Subscription> ExtendedLifecycle<'a, Local, U> {
  pub fn local<L>(host: &L) -> Self
  where
    L: Lifecycle<Unsub = U>,
    HostForwarder<'a, Local>: IntoBoxedObserver<L::BoxedObserver>,
  {
    Self::new(host)
  }
}

#[cfg(feature = "shared")]
impl<'a, U: Subscription> ExtendedLifecycle<'a, Shared, U> {
  pub fn shared<L>(host: &L) -> Self
  where
    L: Lifecycle<Unsub = U>,
    HostForwarder<'a, Shared>: IntoBoxedObserver<L::BoxedObserver>,
  {
    Self::new(host)
  }
}

impl<'a, C: Context, U: Subscription> ExtendedLifecycle<'a, C, U> {
  /// Derive a scope from `host`.
  ///
  /// The host catches the derived scope up synchronously, so a host that is
  /// already `Created` yields a derived scope that is already `Started`.
  pub fn new<L>(host: &L) -> Self
  where
    L: Lifecycle<Unsub = U>,
    HostForwarder<'a, C>: IntoBoxedObserver<L::BoxedObserver>,
  {
    let derived = LifecycleRegistry::new();
    let forwarder = HostForwarder { derived: derived.clone() };
    let host = host.add_observer(forwarder.into_boxed());
    tracing::trace!(state = ?derived.current_state(), "extended lifecycle attached");
    Self { derived, host }
  }

  /// The registry the derived phases are published on.
  pub fn derived(&self) -> &LifecycleRegistry<'a, C> { &self.derived }

  pub fn into_host_subscription(self) -> U { self.host }

  /// Stop following the host. The derived scope keeps its current state.
  pub fn detach(self) { self.host.unsubscribe() }
}

impl<'a, C: Context, U> Lifecycle for ExtendedLifecycle<'a, C, U> {
  type BoxedObserver = C::BoxedObserver<'a, LifecycleEvent>;
  type Unsub = LifecycleSubscription<'a, C>;

  fn current_state(&self) -> LifecycleState { self.derived.current_state() }

  fn add_observer(&self, observer: Self::BoxedObserver) -> Self::Unsub {
    self.derived.add_observer(observer)
  }
}

/// The observer an [`ExtendedLifecycle`] registers on its host.
pub struct HostForwarder<'a, C: Context> {
  derived: LifecycleRegistry<'a, C>,
}

impl<'a, C: Context> Observer<LifecycleEvent> for HostForwarder<'a, C> {
  fn next(&mut self, host_event: LifecycleEvent) {
    for &event in derived_events(host_event) {
      if let Err(err) = self.derived.handle_lifecycle_event(event) {
        tracing::warn!(?host_event, ?event, %err, "derived lifecycle rejected event");
      }
    }
  }
}

/// Shorthand for a local scope derived from a local host registry.
pub type LocalExtendedLifecycle<'a> =
  ExtendedLifecycle<'a, Local, LifecycleSubscription<'a, Local>>;

impl<'a> LocalLifecycle<'a> {
  /// Derive an [`ExtendedLifecycle`] from this registry.
  pub fn extend(&self) -> LocalExtendedLifecycle<'a> { ExtendedLifecycle::new(self) }
}

#[cfg(feature = "shared")]
impl<'a> SharedLifecycle<'a> {
  /// Derive an [`ExtendedLifecycle`] from this registry.
  pub fn extend(&self) -> ExtendedLifecycle<'a, Shared, LifecycleSubscription<'a, Shared>> {
    ExtendedLifecycle::new(self)
  }
}
