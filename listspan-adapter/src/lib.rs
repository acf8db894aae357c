//! Adapter utilities for the `listspan` crate.
//!
//! The `listspan` crate is UI-agnostic and focuses on the indexing math and state. This crate
//! provides framework-neutral workflows on top of it:
//!
//! - Scroll-to-index navigation (alignment, fixed header/footer, smooth-scroll watchdog, retry
//!   when content reshapes mid-scroll, queueing until the item count is known)
//! - Snapshot restore that cancels in-flight navigation
//! - A `Controller` that bundles both with a `ListEngine`
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod navigation;

#[cfg(test)]
mod tests;

pub use controller::Controller;
pub use navigation::{
    IndexLocation, NavState, Navigator, NavigatorOptions, ScrollToIndex, resolve_scroll_target,
};
