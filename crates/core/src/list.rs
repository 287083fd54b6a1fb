// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stable sorted container backing the scheduler's run queue
//!
//! Entries are kept in ascending order according to a comparator. Entries
//! that compare equal keep their insertion order, so draining the list is
//! FIFO among ties.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;

/// Comparator used to order entries
pub type Compare<T> = fn(&T, &T) -> Ordering;

pub struct SortedList<T> {
    items: VecDeque<T>,
    cmp: Compare<T>,
}

impl<T> SortedList<T> {
    pub fn new(cmp: Compare<T>) -> Self {
        Self {
            items: VecDeque::new(),
            cmp,
        }
    }

    /// Insert after every entry that does not compare greater than `item`. O(n)
    pub fn insert(&mut self, item: T) {
        let cmp = self.cmp;
        let at = self
            .items
            .partition_point(|existing| cmp(existing, &item) != Ordering::Greater);
        self.items.insert(at, item);
    }

    /// Smallest entry. O(1)
    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    /// Remove the smallest entry. O(1)
    pub fn pop_front(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Remove the first entry (in order) matching `pred`
    pub fn remove_first(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
        let at = self.items.iter().position(|item| pred(item))?;
        self.items.remove(at)
    }

    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|item| pred(item))
    }

    /// Merge `other` into `self`.
    ///
    /// Among entries that compare equal, entries already in `self` come first,
    /// then entries from `other` in their original order.
    pub fn merge(&mut self, mut other: SortedList<T>) {
        let cmp = self.cmp;
        let mut merged = VecDeque::with_capacity(self.items.len() + other.items.len());

        loop {
            let take_other = match (self.items.front(), other.items.front()) {
                (Some(mine), Some(theirs)) => cmp(theirs, mine) == Ordering::Less,
                (Some(_), None) => false,
                (None, Some(_)) => true,
                (None, None) => break,
            };
            let next = if take_other {
                other.items.pop_front()
            } else {
                self.items.pop_front()
            };
            merged.extend(next);
        }

        self.items = merged;
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Remove every entry, smallest first
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.items.drain(..)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Ord> Default for SortedList<T> {
    fn default() -> Self {
        Self::new(T::cmp)
    }
}

impl<T: fmt::Debug> fmt::Debug for SortedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
