//! Subscription handles.
//!
//! Every registration on a container or a lifecycle returns a handle that
//! implements [`Subscription`]. Unregistration always goes through the handle:
//! it names the registered wrapper, not the callback the caller passed in.

mod dynamic;
mod tuple;

pub use dynamic::DynamicSubscriptions;
pub use tuple::TupleSubscription;

/// A handle that can cancel a registration.
pub trait Subscription {
  /// Cancel the registration. No further notifications are delivered to the
  /// registered observer once this returns.
  fn unsubscribe(self);

  /// Whether the registration is no longer in effect, either because it was
  /// cancelled or because its owner tore it down.
  fn is_closed(&self) -> bool;

  /// Activates "RAII" behavior for this subscription: `unsubscribe()` is
  /// called as soon as the returned guard goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately.
  fn unsubscribe_when_dropped(self) -> SubscriptionGuard<Self>
  where
    Self: Sized,
  {
    SubscriptionGuard::new(self)
  }
}

impl Subscription for () {
  #[inline]
  fn unsubscribe(self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<S: Subscription> Subscription for Option<S> {
  #[inline]
  fn unsubscribe(self) {
    if let Some(inner) = self {
      inner.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.as_ref().map_or(true, Subscription::is_closed) }
}

/// An RAII guard that unsubscribes its subscription when dropped.
///
/// If you want to drop it immediately, wrap it in its own scope.
#[must_use]
pub struct SubscriptionGuard<S: Subscription>(Option<S>);

impl<S: Subscription> SubscriptionGuard<S> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: S) -> Self { Self(Some(subscription)) }

  /// Disarms the guard and returns the subscription untouched.
  pub fn into_inner(mut self) -> Option<S> { self.0.take() }

  pub fn is_closed(&self) -> bool { self.0.is_closed() }
}

impl<S: Subscription> Drop for SubscriptionGuard<S> {
  #[inline]
  fn drop(&mut self) {
    if let Some(subscription) = self.0.take() {
      subscription.unsubscribe();
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use super::*;

  struct Flag(Rc<Cell<bool>>);

  impl Subscription for Flag {
    fn unsubscribe(self) { self.0.set(true) }

    fn is_closed(&self) -> bool { self.0.get() }
  }

  #[rxlive_macro::test]
  fn guard_unsubscribes_on_drop() {
    let closed = Rc::new(Cell::new(false));
    {
      let _guard = Flag(closed.clone()).unsubscribe_when_dropped();
      assert!(!closed.get());
    }
    assert!(closed.get());
  }

  #[rxlive_macro::test]
  fn disarmed_guard_keeps_subscription() {
    let closed = Rc::new(Cell::new(false));
    let guard = Flag(closed.clone()).unsubscribe_when_dropped();
    let inner = guard.into_inner();
    assert!(!closed.get());
    inner.unsubscribe();
    assert!(closed.get());
  }

  #[rxlive_macro::test]
  fn option_and_unit_subscriptions() {
    assert!(().is_closed());
    assert!(None::<Flag>.is_closed());

    let closed = Rc::new(Cell::new(false));
    let some = Some(Flag(closed.clone()));
    assert!(!some.is_closed());
    some.unsubscribe();
    assert!(closed.get());
  }
}
