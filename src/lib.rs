//! # rxlive: replay-free subscriptions for sticky containers
//!
//! A [`LiveData`] replays its current value to every new subscriber. That is
//! what state consumers want, and exactly what event consumers don't: a
//! navigation request or a toast must not fire again just because a screen
//! re-subscribed. `rxlive` adds no-replay registrations on top of the
//! container without touching its delivery rules.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//!
//! use rxlive::prelude::*;
//!
//! let host = LocalLifecycle::local();
//! host.set_current_state(LifecycleState::Resumed).unwrap();
//!
//! let events = LiveData::local_with("stale");
//! let seen = Rc::new(RefCell::new(vec![]));
//!
//! let c_seen = seen.clone();
//! let _sub = events.subscribe_no_replay(&host, move |v| c_seen.borrow_mut().push(v));
//! events.set_value("fresh");
//!
//! assert_eq!(*seen.borrow(), ["fresh"]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Local`] / [`Shared`] | Execution contexts (single-thread vs thread-movable) |
//! | [`LiveData`] | Sticky container of zero or one value |
//! | [`LifecycleRegistry`] | Host scope driven by explicit events |
//! | [`ExtendedLifecycle`] | Derived scope active from the host's `Created` phase |
//! | [`SkipReplayObserver`] | Drops the first delivery when a value was present |
//! | [`Subscription`] | Handle to cancel a registration |
//!
//! ## Feature Flags
//!
//! - **`shared`** (default): `Arc<Mutex<_>>` backed containers and lifecycles
//!
//! [`Local`]: prelude::Local
//! [`Shared`]: prelude::Shared
//! [`LiveData`]: live_data::LiveData
//! [`LifecycleRegistry`]: lifecycle::LifecycleRegistry
//! [`ExtendedLifecycle`]: lifecycle::ExtendedLifecycle
//! [`SkipReplayObserver`]: no_replay::SkipReplayObserver
//! [`Subscription`]: subscription::Subscription

pub mod context;
pub mod lifecycle;
pub mod live_data;
pub mod no_replay;
pub mod observer;
pub mod prelude;
pub mod rc;
pub mod subscription;

pub use prelude::*;

#[cfg(all(doctest, not(target_arch = "wasm32")))]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
