use smallvec::SmallVec;

/// Id-keyed storage for registered observers.
///
/// Containers and lifecycles keep their observers here. Every registration
/// gets an id that is never reused, so a stale handle can't remove a newer
/// registration.
///
/// # Design
///
/// - **SmallVec Optimization**: Uses `SmallVec<[_; 2]>` to avoid heap
///   allocation for the common case of 0-2 observers.
/// - **Insertion order**: Iteration follows registration order, which is the
///   order observers are notified in.
///
/// # Examples
///
/// ```rust
/// use rxlive::subscription::DynamicSubscriptions;
///
/// let mut subs: DynamicSubscriptions<&str> = DynamicSubscriptions::default();
///
/// let id1 = subs.add("a");
/// let id2 = subs.add("b");
/// assert_eq!(subs.len(), 2);
///
/// // A reserved id is never handed out again.
/// let dangling = subs.reserve_id();
/// assert!(!subs.contains(dangling));
///
/// assert_eq!(subs.remove(id1), Some("a"));
/// assert_eq!(subs.ids().collect::<Vec<_>>(), vec![id2]);
/// ```
pub struct DynamicSubscriptions<U> {
  next_id: usize,
  items: SmallVec<[(usize, U); 2]>,
}

impl<U> Default for DynamicSubscriptions<U> {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl<U> DynamicSubscriptions<U> {
  /// Create an empty container.
  #[inline]
  pub fn new() -> Self { Self::default() }

  /// Add an item and return its unique ID.
  #[inline]
  pub fn add(&mut self, item: U) -> usize {
    let id = self.reserve_id();
    self.items.push((id, item));
    id
  }

  /// Reserve the next ID without adding an item.
  #[inline]
  pub fn reserve_id(&mut self) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    id
  }

  /// Remove an item by ID.
  pub fn remove(&mut self, id: usize) -> Option<U> {
    self.items.iter().position(|(i, _)| *i == id).map(|pos| self.items.remove(pos).1)
  }

  /// Check if an ID exists in the container.
  #[inline]
  pub fn contains(&self, id: usize) -> bool { self.items.iter().any(|(i, _)| *i == id) }

  #[inline]
  pub fn get(&self, id: usize) -> Option<&U> {
    self.items.iter().find(|(i, _)| *i == id).map(|(_, item)| item)
  }

  #[inline]
  pub fn get_mut(&mut self, id: usize) -> Option<&mut U> {
    self.items.iter_mut().find(|(i, _)| *i == id).map(|(_, item)| item)
  }

  /// Get the number of items.
  #[inline]
  pub fn len(&self) -> usize { self.items.len() }

  /// Check if empty.
  #[inline]
  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Drain all items.
  #[inline]
  pub fn drain(&mut self) -> impl Iterator<Item = U> + '_ { self.items.drain(..).map(|(_, item)| item) }

  /// IDs in registration order.
  #[inline]
  pub fn ids(&self) -> impl DoubleEndedIterator<Item = usize> + '_ {
    self.items.iter().map(|(id, _)| *id)
  }

  /// Iterate over all items.
  #[inline]
  pub fn iter(&self) -> impl DoubleEndedIterator<Item = &U> { self.items.iter().map(|(_, item)| item) }

  /// Iterate over all items mutably, together with their IDs.
  #[inline]
  pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (usize, &mut U)> {
    self.items.iter_mut().map(|(id, item)| (*id, item))
  }
}
