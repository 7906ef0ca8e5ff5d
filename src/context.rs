//! Execution contexts.
//!
//! A [`Context`] is a type-level marker that decides how containers and
//! lifecycles store their state and which observers they accept:
//!
//! | Context | Cell | Observers |
//! |---------|------|-----------|
//! | [`Local`] | `Rc<RefCell<_>>` | `Box<dyn Observer<Item> + 'a>` |
//! | [`Shared`] | `Arc<Mutex<_>>` | `Box<dyn Observer<Item> + Send + 'a>` |
//!
//! Both contexts dispatch synchronously on the calling thread. `Shared` only
//! makes the handles movable across threads.

pub use crate::rc::*;
#[cfg(feature = "shared")]
use crate::observer::BoxedObserverSend;
use crate::observer::{BoxedObserver, FnMutObserver, Observer};

pub trait Context {
  type RcMut<T>: From<T> + Clone + RcDerefMut<Target = T>;
  type BoxedObserver<'a, Item>: Observer<Item>
  where
    Item: 'a;

  /// A boxed observer that raises `flag` on every notification.
  fn flag_observer<'a, Item: 'a>(flag: Self::RcMut<bool>) -> Self::BoxedObserver<'a, Item>;
}

/// Single-threaded context.
pub struct Local;

/// Thread-movable context.
#[cfg(feature = "shared")]
pub struct Shared;

impl Context for Local {
  type RcMut<T> = MutRc<T>;
  type BoxedObserver<'a, Item>
    = BoxedObserver<'a, Item>
  where
    Item: 'a;

  fn flag_observer<'a, Item: 'a>(flag: MutRc<bool>) -> BoxedObserver<'a, Item> {
    Box::new(FnMutObserver(move |_: Item| *flag.rc_deref_mut() = true))
  }
}

#[cfg(feature = "shared")]
impl Context for Shared {
  type RcMut<T> = MutArc<T>;
  type BoxedObserver<'a, Item>
    = BoxedObserverSend<'a, Item>
  where
    Item: 'a;

  fn flag_observer<'a, Item: 'a>(flag: MutArc<bool>) -> BoxedObserverSend<'a, Item> {
    Box::new(FnMutObserver(move |_: Item| *flag.rc_deref_mut() = true))
  }
}
