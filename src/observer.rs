//! Observer trait and implementations
//!
//! An [`Observer`] is the consumer side of a container: it receives every
//! value the container delivers to it. Containers have no error or completion
//! channel, so `next` is the only entry point.

// ============================================================================
// Observer Trait
// ============================================================================

/// The consumer of values delivered by a container or a lifecycle.
pub trait Observer<Item> {
  /// Receive the next value.
  fn next(&mut self, value: Item);
}

impl<Item, O> Observer<Item> for Box<O>
where
  O: Observer<Item> + ?Sized,
{
  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value) }
}

// ============================================================================
// Boxed Observers
// ============================================================================

/// Boxed observer for the local context (no `Send` bound).
pub type BoxedObserver<'a, Item> = Box<dyn Observer<Item> + 'a>;

/// Boxed observer for the shared context.
pub type BoxedObserverSend<'a, Item> = Box<dyn Observer<Item> + Send + 'a>;

/// Converts a concrete observer into the boxed form a context stores.
///
/// The blanket implementations pick the `Send` or non-`Send` box from the
/// target type, so generic code only has to name the context's
/// `BoxedObserver`.
pub trait IntoBoxedObserver<O> {
  fn into_boxed(self) -> O;
}

impl<'a, Item, O> IntoBoxedObserver<BoxedObserver<'a, Item>> for O
where
  O: Observer<Item> + 'a,
{
  fn into_boxed(self) -> BoxedObserver<'a, Item> { Box::new(self) }
}

impl<'a, Item, O> IntoBoxedObserver<BoxedObserverSend<'a, Item>> for O
where
  O: Observer<Item> + Send + 'a,
{
  fn into_boxed(self) -> BoxedObserverSend<'a, Item> { Box::new(self) }
}

// ============================================================================
// FnMutObserver - Closure adapter
// ============================================================================

/// Adapts a closure into an [`Observer`].
///
/// This is what `subscribe(|v| ...)` style methods wrap their argument in.
#[derive(Clone)]
pub struct FnMutObserver<F>(pub F);

impl<F, Item> Observer<Item> for FnMutObserver<F>
where
  F: FnMut(Item),
{
  #[inline]
  fn next(&mut self, v: Item) { (self.0)(v); }
}

// ============================================================================
// Tests
// ============================================================================
