use std::{
  cell::{Ref, RefCell, RefMut},
  ops::{Deref, DerefMut},
  rc::Rc,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// Shared read access to the value behind a reference-counted cell.
pub trait RcDeref {
  type Target;
  type Ref<'a>: Deref<Target = Self::Target>
  where
    Self: 'a;

  fn rc_deref(&self) -> Self::Ref<'_>;
}

/// Exclusive access to the value behind a reference-counted cell.
///
/// Callers must drop the returned guard before invoking user callbacks: the
/// local flavor panics on a second borrow and the shared flavor deadlocks.
pub trait RcDerefMut: RcDeref {
  type RefMut<'a>: DerefMut<Target = Self::Target>
  where
    Self: 'a;

  fn rc_deref_mut(&self) -> Self::RefMut<'_>;
}

#[derive(Default)]
pub struct MutRc<T>(Rc<RefCell<T>>);

#[derive(Default)]
pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutRc<T> {
  pub fn own(t: T) -> Self { Self(Rc::new(RefCell::new(t))) }

  /// Whether both handles point at the same cell.
  pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }

  /// Whether both handles point at the same cell.
  pub fn ptr_eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }

  // Observers never run under the lock, so a poisoned mutex only means a
  // panic unwound through a bookkeeping section; the state is still usable.
  fn lock(&self) -> MutexGuard<'_, T> { self.0.lock().unwrap_or_else(PoisonError::into_inner) }
}

impl<T> RcDeref for MutRc<T> {
  type Target = T;
  type Ref<'a>
    = Ref<'a, T>
  where
    Self: 'a;

  #[inline]
  fn rc_deref(&self) -> Self::Ref<'_> { self.0.borrow() }
}

impl<T> RcDerefMut for MutRc<T> {
  type RefMut<'a>
    = RefMut<'a, T>
  where
    Self: 'a;

  #[inline]
  fn rc_deref_mut(&self) -> Self::RefMut<'_> { self.0.borrow_mut() }
}

impl<T> RcDeref for MutArc<T> {
  type Target = T;
  type Ref<'a>
    = MutexGuard<'a, T>
  where
    Self: 'a;

  #[inline]
  fn rc_deref(&self) -> Self::Ref<'_> { self.lock() }
}

impl<T> RcDerefMut for MutArc<T> {
  type RefMut<'a>
    = MutexGuard<'a, T>
  where
    Self: 'a;

  #[inline]
  fn rc_deref_mut(&self) -> Self::RefMut<'_> { self.lock() }
}

macro_rules! impl_rc_common {
  ($rc:ident) => {
    impl<T> Clone for $rc<T> {
      #[inline]
      fn clone(&self) -> Self { Self(self.0.clone()) }
    }

    impl<T> From<T> for $rc<T> {
      #[inline]
      fn from(t: T) -> Self { Self::own(t) }
    }
  };
}

impl_rc_common!(MutRc);
impl_rc_common!(MutArc);

#[cfg(test)]
mod tests {
  use super::*;

  #[rxlive_macro::test]
  fn clones_share_one_cell() {
    let a = MutRc::own(1);
    let b = a.clone();
    *b.rc_deref_mut() = 2;
    assert_eq!(*a.rc_deref(), 2);
    assert!(a.ptr_eq(&b));
    assert!(!a.ptr_eq(&MutRc::own(2)));
  }

  #[cfg(not(target_arch = "wasm32"))]
  #[rxlive_macro::test]
  fn poisoned_arc_is_still_readable() {
    let cell = MutArc::own(vec![1]);
    let c_cell = cell.clone();
    let _ = std::thread::spawn(move || {
      let _guard = c_cell.rc_deref_mut();
      panic!("poison the lock");
    })
    .join();

    cell.rc_deref_mut().push(2);
    assert_eq!(*cell.rc_deref(), vec![1, 2]);
  }
}
