//! A headless indexing engine for virtualized lists.
//!
//! For scroll-to-index navigation and state restore, see the `listspan-adapter` crate.
//!
//! This crate focuses on the bookkeeping needed to render huge, variably sized lists without
//! mounting every row: a run-length size index, cumulative offsets, pixel → index lookup,
//! overscanned visible ranges with hysteresis, group headers folded into a flat index space,
//! and scroll anchoring when measured sizes differ from their estimates.
//!
//! It is UI-agnostic. A renderer is expected to provide:
//! - the item count (or group counts)
//! - scroll container geometry (scroll top, viewport height)
//! - measured sizes of mounted rows
//!
//! and to apply the [`ListEvent`]s the engine queues (mount ranges, scroll corrections, scroll
//! targets and the total extent).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod engine;
mod groups;
mod offset_table;
mod options;
mod range;
mod size_index;
mod state;
mod types;


pub use anchor::{CompensationContext, DeviationCompensator, ScrollAnchor, capture_anchor};
pub use engine::{ListEngine, ListEvent};
pub use groups::{DisplayIndex, GroupIndex};
pub use offset_table::{OffsetEntry, OffsetTable};
pub use options::{EngineOptions, ShouldCompensateCallback};
pub use range::{IncreaseViewportBy, Overscan, RangeCalculator, compute_visible_range};
pub use size_index::SizeIndex;
pub use state::{ListSnapshot, ViewportState};
pub use types::{
    Align, ListItem, ScrollBehavior, ScrollDirection, SizeReport, SizeRun, VisibleRange,
};
