// src/core/storage/list.rs

//! The list value: an ordered sequence of byte strings with O(1) push/pop at
//! both ends and O(k) range reads.

use bytes::Bytes;
use std::collections::VecDeque;

/// The direction of a push operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, Default)]
pub struct List {
    items: VecDeque<Bytes>,
}

impl List {
    /// Appends the values in the given order. Returns the new length.
    pub fn rpush(&mut self, values: &[Bytes]) -> usize {
        self.items.extend(values.iter().cloned());
        self.items.len()
    }

    /// Prepends the values one by one, so the last argument ends up at the
    /// head: `LPUSH k a b c` yields `c, b, a`. Returns the new length.
    pub fn lpush(&mut self, values: &[Bytes]) -> usize {
        for value in values {
            self.items.push_front(value.clone());
        }
        self.items.len()
    }

    /// Returns the inclusive range `[start, stop]`. Negative indices count
    /// from the tail (`-1` is the last element); out-of-range indices clamp
    /// silently, and an inverted range yields an empty slice.
    pub fn lrange(&self, start: i64, stop: i64) -> Vec<Bytes> {
        let len = self.items.len() as i64;
        let lo = if start < 0 {
            (len + start).max(0)
        } else {
            start.min(len)
        };
        // `stop` is inclusive: shift the endpoint one past it, resolving a
        // negative endpoint against the tail first so `-1` covers the whole
        // list.
        let hi = if stop == -1 {
            len
        } else {
            let past = stop + 1;
            if past < 0 {
                (len + past).max(0)
            } else {
                past.min(len)
            }
        };
        if lo >= hi {
            return Vec::new();
        }
        self.items
            .iter()
            .skip(lo as usize)
            .take((hi - lo) as usize)
            .cloned()
            .collect()
    }

    pub fn llen(&self) -> usize {
        self.items.len()
    }

    /// Removes and returns the head element, if any.
    pub fn lpop(&mut self) -> Option<Bytes> {
        self.items.pop_front()
    }

    /// Removes and returns up to `count` head elements. The caller is
    /// responsible for the empty-list reply shape (null bulk, not an empty
    /// array).
    pub fn lpop_many(&mut self, count: usize) -> Vec<Bytes> {
        let take = count.min(self.items.len());
        self.items.drain(..take).collect()
    }

    /// Restores an element to the head. Used when a blocking hand-off fails
    /// after the element was already detached.
    pub(crate) fn push_front(&mut self, value: Bytes) {
        self.items.push_front(value);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
