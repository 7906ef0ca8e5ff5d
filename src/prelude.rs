//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Lifecycles
#[cfg(feature = "shared")]
pub use crate::lifecycle::SharedLifecycle;
pub use crate::lifecycle::{
  ExtendedLifecycle, Lifecycle, LifecycleError, LifecycleEvent, LifecycleRegistry, LifecycleState,
  LifecycleSubscription, LocalLifecycle,
};
// Containers
#[cfg(feature = "shared")]
pub use crate::live_data::SharedLiveData;
pub use crate::live_data::{LiveData, LiveSubscription, LocalLiveData, ScopedLiveSubscription};
// No-replay
pub use crate::no_replay::{NoReplaySubscription, ReplayState, SkipReplayObserver};
// Observer
pub use crate::observer::{FnMutObserver, IntoBoxedObserver, Observer};
// Subscription
pub use crate::subscription::*;
pub use crate::context::*;
