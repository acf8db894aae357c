use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::{self, Ordering};
use core::fmt;

use crate::types::valid_extent;
use crate::{SizeReport, SizeRun};

type Link = Option<Box<Node>>;

#[derive(Clone)]
struct Node {
    key: usize,
    size: f64,
    height: u8,
    left: Link,
    right: Link,
}

impl Node {
    fn leaf(key: usize, size: f64) -> Box<Self> {
        Box::new(Self {
            key,
            size,
            height: 1,
            left: None,
            right: None,
        })
    }

    fn update(&mut self) {
        self.height = 1 + cmp::max(height(&self.left), height(&self.right));
    }

    fn balance_factor(&self) -> i16 {
        height(&self.left) as i16 - height(&self.right) as i16
    }
}

fn height(link: &Link) -> u8 {
    link.as_ref().map_or(0, |n| n.height)
}

fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update();
    pivot.right = Some(node);
    pivot.update();
    pivot
}

fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update();
    pivot.left = Some(node);
    pivot.update();
    pivot
}

fn rebalance(mut node: Box<Node>) -> Box<Node> {
    node.update();
    let bf = node.balance_factor();
    if bf > 1 {
        if let Some(left) = node.left.take() {
            node.left = Some(if left.balance_factor() < 0 {
                rotate_left(left)
            } else {
                left
            });
        }
        return rotate_right(node);
    }
    if bf < -1 {
        if let Some(right) = node.right.take() {
            node.right = Some(if right.balance_factor() > 0 {
                rotate_right(right)
            } else {
                right
            });
        }
        return rotate_left(node);
    }
    node
}

/// Inserts or overwrites `key`. Returns the new subtree and whether a node was added.
fn insert(link: Link, key: usize, size: f64) -> (Box<Node>, bool) {
    let Some(mut node) = link else {
        return (Node::leaf(key, size), true);
    };
    let added = match key.cmp(&node.key) {
        Ordering::Less => {
            let (child, added) = insert(node.left.take(), key, size);
            node.left = Some(child);
            added
        }
        Ordering::Greater => {
            let (child, added) = insert(node.right.take(), key, size);
            node.right = Some(child);
            added
        }
        Ordering::Equal => {
            node.size = size;
            return (node, false);
        }
    };
    (rebalance(node), added)
}

/// Removes `key`. Returns the new subtree and whether a node was removed.
fn remove(link: Link, key: usize) -> (Link, bool) {
    let Some(mut node) = link else {
        return (None, false);
    };
    let removed = match key.cmp(&node.key) {
        Ordering::Less => {
            let (child, removed) = remove(node.left.take(), key);
            node.left = child;
            removed
        }
        Ordering::Greater => {
            let (child, removed) = remove(node.right.take(), key);
            node.right = child;
            removed
        }
        Ordering::Equal => {
            let joined = match (node.left.take(), node.right.take()) {
                (None, None) => None,
                (Some(l), None) => Some(l),
                (None, Some(r)) => Some(r),
                (Some(l), Some(r)) => {
                    let (rest, mut successor) = take_min(r);
                    successor.left = Some(l);
                    successor.right = rest;
                    Some(rebalance(successor))
                }
            };
            return (joined, true);
        }
    };
    (Some(rebalance(node)), removed)
}

fn take_min(mut node: Box<Node>) -> (Link, Box<Node>) {
    match node.left.take() {
        None => {
            let rest = node.right.take();
            (rest, node)
        }
        Some(left) => {
            let (rest, min) = take_min(left);
            node.left = rest;
            (Some(rebalance(node)), min)
        }
    }
}

fn collect_keys(link: &Link, lo: usize, hi: usize, out: &mut Vec<usize>) {
    let Some(node) = link else {
        return;
    };
    if node.key > lo {
        collect_keys(&node.left, lo, hi, out);
    }
    if lo <= node.key && node.key <= hi {
        out.push(node.key);
    }
    if node.key < hi {
        collect_keys(&node.right, lo, hi, out);
    }
}

fn collect_runs(link: &Link, from: usize, out: &mut Vec<SizeRun>) {
    let Some(node) = link else {
        return;
    };
    if node.key > from {
        collect_runs(&node.left, from, out);
    }
    if node.key >= from {
        out.push(SizeRun {
            start_index: node.key,
            size: node.size,
        });
    }
    collect_runs(&node.right, from, out);
}

fn build_balanced(runs: &[SizeRun]) -> Link {
    if runs.is_empty() {
        return None;
    }
    let mid = runs.len() / 2;
    let mut node = Node::leaf(runs[mid].start_index, runs[mid].size);
    node.left = build_balanced(&runs[..mid]);
    node.right = build_balanced(&runs[mid + 1..]);
    node.update();
    Some(node)
}

/// Verifies AVL heights/balance and BST ordering; returns the subtree height.
fn check_subtree(link: &Link, lo: Option<usize>, hi: Option<usize>) -> Option<u8> {
    let Some(node) = link else {
        return Some(0);
    };
    if lo.is_some_and(|lo| node.key <= lo) || hi.is_some_and(|hi| node.key >= hi) {
        return None;
    }
    let lh = check_subtree(&node.left, lo, Some(node.key))?;
    let rh = check_subtree(&node.right, Some(node.key), hi)?;
    if (lh as i16 - rh as i16).abs() > 1 || node.height != 1 + cmp::max(lh, rh) {
        return None;
    }
    Some(node.height)
}

/// Sorts, filters and coalesces a run list so it satisfies the run invariant.
fn normalize_runs(mut runs: Vec<SizeRun>) -> Vec<SizeRun> {
    runs.retain(|r| valid_extent(r.size).is_some());
    // Stable: the last run for a duplicated start wins.
    runs.sort_by_key(|r| r.start_index);
    let mut out: Vec<SizeRun> = Vec::with_capacity(runs.len());
    for run in runs {
        match out.last_mut() {
            Some(last) if last.start_index == run.start_index => last.size = run.size,
            _ => out.push(run),
        }
    }
    out.dedup_by(|next, prev| next.size == prev.size);
    out
}

/// A run-length encoded map from flat item index to item size.
///
/// Sizes are stored as runs keyed by their first index. A run covers every index up to the next
/// run, the last run extends to infinity, and the first run also covers the indexes below it.
/// Adjacent runs never share a size, so uniformly sized content stays a single node no matter
/// how many measurements arrive.
///
/// Backed by an AVL tree: lookups, overwrites and deletes are `O(log runs)` per touched run.
#[derive(Clone, Default)]
pub struct SizeIndex {
    root: Link,
    len: usize,
}

impl SizeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an index where every item has `size`.
    pub fn with_default_size(size: f64) -> Self {
        let mut index = Self::new();
        if let Some(size) = valid_extent(size) {
            index.insert(0, size);
        } else {
            lwarn!(size, "SizeIndex::with_default_size: ignoring invalid size");
        }
        index
    }

    /// Builds an index from a (possibly unsorted or redundant) run list in `O(n log n)`.
    ///
    /// Malformed runs are dropped, duplicated starts keep the last value, and equal neighbours
    /// are merged.
    pub fn from_runs(runs: impl IntoIterator<Item = SizeRun>) -> Self {
        let runs = normalize_runs(runs.into_iter().collect());
        Self {
            root: build_balanced(&runs),
            len: runs.len(),
        }
    }

    /// Number of runs (not items).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the size in effect for `index`, or `None` when nothing is known yet.
    pub fn size_at(&self, index: usize) -> Option<f64> {
        self.floor(index).or_else(|| self.first()).map(|r| r.size)
    }

    /// In-order dump of every run.
    pub fn runs(&self) -> Vec<SizeRun> {
        self.runs_from(0)
    }

    /// In-order dump of the runs starting at or after `start_index`.
    pub fn runs_from(&self, start_index: usize) -> Vec<SizeRun> {
        let mut out = Vec::with_capacity(self.len);
        collect_runs(&self.root, start_index, &mut out);
        out
    }

    /// Applies a batch of reports. Returns `true` when any size changed.
    pub fn set_sizes(&mut self, reports: &[SizeReport]) -> bool {
        self.apply_reports(reports).is_some()
    }

    /// Applies a batch of reports and returns the smallest index whose size changed.
    ///
    /// Malformed reports (NaN, infinite or negative sizes, reversed ranges) are dropped.
    pub fn apply_reports(&mut self, reports: &[SizeReport]) -> Option<usize> {
        let mut changed: Option<usize> = None;
        for report in reports {
            let Some(size) = valid_extent(report.size) else {
                lwarn!(
                    start_index = report.start_index,
                    end_index = report.end_index,
                    size = report.size,
                    "dropping size report with invalid size"
                );
                continue;
            };
            if report.end_index < report.start_index {
                lwarn!(
                    start_index = report.start_index,
                    end_index = report.end_index,
                    "dropping size report with reversed range"
                );
                continue;
            }
            if size == 0.0 {
                lwarn!(
                    start_index = report.start_index,
                    end_index = report.end_index,
                    "zero-sized report; items usually have a non-zero size"
                );
            }
            if let Some(from) = self.set_range(report.start_index, report.end_index, size) {
                changed = Some(changed.map_or(from, |c| c.min(from)));
            }
        }
        if changed.is_some() {
            self.ensure_invariants();
        }
        changed
    }

    /// Overwrites `[start_index, end_index]` with `size`, splitting and merging runs.
    ///
    /// Returns the smallest changed index, or `None` when the range already had `size`.
    fn set_range(&mut self, start_index: usize, end_index: usize, size: f64) -> Option<usize> {
        if self.is_empty() {
            ltrace!(size, "seeding size index");
            self.insert(0, size);
            return Some(0);
        }
        self.anchor_base();

        let mut inner = Vec::new();
        if start_index < end_index {
            collect_keys(&self.root, start_index + 1, end_index, &mut inner);
        }
        if inner.is_empty() && self.size_at(start_index) == Some(size) {
            return None;
        }

        let before = start_index.checked_sub(1).and_then(|i| self.size_at(i));
        let after = end_index
            .checked_add(1)
            .and_then(|next| self.size_at(next).map(|s| (next, s)));

        let mut doomed = inner;
        doomed.push(start_index);
        if let Some((next, _)) = after {
            doomed.push(next);
        }
        for key in doomed {
            self.remove(key);
        }

        if before != Some(size) {
            self.insert(start_index, size);
        }
        if let Some((next, after_size)) = after {
            if after_size != size {
                self.insert(next, after_size);
            }
        }
        Some(start_index)
    }

    /// Removes the run boundaries inside `[start_index, end_index]`.
    ///
    /// The affected indexes fall back to the run that covers them afterwards; indexes past
    /// `end_index` keep their size. The base run is kept. Returns the smallest index whose size may have changed.
    pub fn delete_range(&mut self, start_index: usize, end_index: usize) -> Option<usize> {
        if self.is_empty() || end_index < start_index {
            return None;
        }
        self.anchor_base();
        let lo = start_index.max(1);
        if end_index < lo {
            return None;
        }
        let mut keys = Vec::new();
        collect_keys(&self.root, lo, end_index, &mut keys);
        let &first = keys.first()?;
        let after = end_index
            .checked_add(1)
            .and_then(|next| self.size_at(next).map(|s| (next, s)));
        for key in keys {
            self.remove(key);
        }

        // Indexes past the span keep their size.
        if let Some((next, after_size)) = after {
            if self.size_at(next) != Some(after_size) {
                self.insert(next, after_size);
            }
        }
        // The boundary after the deleted span may now repeat its predecessor.
        if let Some(next) = end_index.checked_add(1).and_then(|n| self.ceil(n)) {
            if self.size_at(next.start_index - 1) == Some(next.size) {
                self.remove(next.start_index);
            }
        }
        ldebug!(start_index, end_index, runs = self.len, "SizeIndex::delete_range");
        self.ensure_invariants();
        Some(first)
    }

    /// Shifts every run by `delta` indexes (prepend when positive, drop-from-front when
    /// negative). Runs pushed below zero collapse onto index 0, the highest original start
    /// winning.
    pub fn rebase(&mut self, delta: isize) {
        if delta == 0 || self.is_empty() {
            return;
        }
        let shift = delta.unsigned_abs();
        let mut shifted: Vec<SizeRun> = Vec::with_capacity(self.len);
        for run in self.runs() {
            let start_index = if delta > 0 {
                run.start_index.saturating_add(shift)
            } else {
                run.start_index.saturating_sub(shift)
            };
            match shifted.last_mut() {
                Some(last) if last.start_index == start_index => last.size = run.size,
                _ => shifted.push(SizeRun {
                    start_index,
                    size: run.size,
                }),
            }
        }
        shifted.dedup_by(|next, prev| next.size == prev.size);
        self.len = shifted.len();
        self.root = build_balanced(&shifted);
        ldebug!(delta, runs = self.len, "SizeIndex::rebase");
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Returns `true` when the tree is balanced, sorted and free of redundant runs.
    pub fn check_invariants(&self) -> bool {
        if check_subtree(&self.root, None, None).is_none() {
            return false;
        }
        let runs = self.runs();
        runs.len() == self.len
            && runs.iter().all(|r| valid_extent(r.size).is_some())
            && runs
                .windows(2)
                .all(|w| w[0].start_index < w[1].start_index && w[0].size != w[1].size)
    }

    fn ensure_invariants(&mut self) {
        let valid = self.check_invariants();
        debug_assert!(valid, "SizeIndex invariant violated: {self:?}");
        if valid {
            return;
        }
        lwarn!(runs = self.len, "size index invariant violated; rebuilding from runs");
        *self = Self::from_runs(self.runs());
    }

    /// Moves the first run to index 0 so mutations never expose the implicit prefix.
    fn anchor_base(&mut self) {
        let Some(first) = self.first() else {
            return;
        };
        if first.start_index > 0 {
            self.remove(first.start_index);
            self.insert(0, first.size);
        }
    }

    fn insert(&mut self, key: usize, size: f64) {
        let (root, added) = insert(self.root.take(), key, size);
        self.root = Some(root);
        if added {
            self.len += 1;
        }
    }

    fn remove(&mut self, key: usize) {
        let (root, removed) = remove(self.root.take(), key);
        self.root = root;
        if removed {
            self.len -= 1;
        }
    }

    fn first(&self) -> Option<SizeRun> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(SizeRun {
            start_index: node.key,
            size: node.size,
        })
    }

    /// The run with the greatest start `<= index`.
    fn floor(&self, index: usize) -> Option<SizeRun> {
        let mut cur = self.root.as_deref();
        let mut best = None;
        while let Some(node) = cur {
            if node.key <= index {
                best = Some(SizeRun {
                    start_index: node.key,
                    size: node.size,
                });
                cur = node.right.as_deref();
            } else {
                cur = node.left.as_deref();
            }
        }
        best
    }

    /// The run with the smallest start `>= index`.
    fn ceil(&self, index: usize) -> Option<SizeRun> {
        let mut cur = self.root.as_deref();
        let mut best = None;
        while let Some(node) = cur {
            if node.key >= index {
                best = Some(SizeRun {
                    start_index: node.key,
                    size: node.size,
                });
                cur = node.left.as_deref();
            } else {
                cur = node.right.as_deref();
            }
        }
        best
    }
}

impl fmt::Debug for SizeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.runs().iter().map(|r| (r.start_index, r.size)))
            .finish()
    }
}
