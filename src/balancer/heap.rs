//! Indexed min-heap of balancer workers, keyed on `pending` ascending.
//!
//! Rust's standard library has no equivalent of Go's `container/heap`
//! (a heap interface implemented over caller-owned storage, exposing
//! `Fix` for an in-place re-sift at a known index). `std::collections::
//! BinaryHeap` hands back no handle a caller could use to re-sift a
//! specific, already-inserted element in `O(log n)` — exactly what
//! [`Balancer::complete`](super::balancer::Balancer) needs when a worker's
//! `pending` count decreases. So this module is a small, purpose-built
//! indexed heap: each worker carries a stable [`WorkerId`](super::WorkerId)
//! and the heap maintains an `id -> current slot` map, updated on every
//! swap, alongside each slot's own `index` field mirroring that same slot.

// Layer 1: Standard library
use std::fmt;

// Layer 2: Third-party
use tokio::sync::mpsc;

// Layer 3: Internal
use super::request::Request;
use super::worker::WorkerId;

/// One worker's entry in the [`WorkerHeap`].
pub(crate) struct WorkerEntry<T> {
    pub(crate) id: WorkerId,
    pub(crate) sender: mpsc::Sender<Request<T>>,
    pub(crate) pending: usize,
    /// This entry's current position in the owning heap's backing vector.
    /// Kept in sync with [`WorkerHeap`]'s `slot_of` map on every swap —
    /// see `SPEC_FULL.md` §3 "Each worker's `index` equals its current
    /// position in the sequence."
    pub(crate) index: usize,
}

impl<T> fmt::Debug for WorkerEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerEntry")
            .field("id", &self.id)
            .field("pending", &self.pending)
            .field("index", &self.index)
            .finish()
    }
}

/// An indexed min-heap of [`WorkerEntry`] values, ordered by `pending`
/// ascending.
///
/// Ties are broken by heap sift order, which makes no fairness guarantee
/// beyond "strictly least loaded wins, consistently within one heap" — see
/// `SPEC_FULL.md` §9 "Balancer tie-break fairness".
pub(crate) struct WorkerHeap<T> {
    slots: Vec<WorkerEntry<T>>,
    /// `slot_of[id]` is the current index of worker `id` within `slots`.
    slot_of: Vec<usize>,
}

impl<T> WorkerHeap<T> {
    /// Build a heap from entries in arbitrary order and restore the heap
    /// invariant in `O(n)`, mirroring Go's `container/heap.Init`.
    pub(crate) fn init(mut entries: Vec<WorkerEntry<T>>) -> Self {
        let mut slot_of = vec![0; entries.len()];
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.index = i;
            slot_of[entry.id.0] = i;
        }
        let mut heap = Self {
            slots: entries,
            slot_of,
        };
        if heap.slots.len() > 1 {
            let len = heap.slots.len();
            for i in (0..len / 2).rev() {
                heap.sift_down(i, len);
            }
        }
        heap
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Remove and return the minimum-`pending` entry, mirroring
    /// `container/heap.Pop`: swap the root with the last slot, sift the new
    /// root down over the shrunk range, then physically remove the last
    /// slot. The returned entry's `index` therefore equals `len - 1`
    /// (the position the final swap left it in) — this is the behavior
    /// `SPEC_FULL.md` §8 scenario 2 exercises directly.
    ///
    /// Panics if the heap is empty; a balancer is constructed with a fixed,
    /// non-empty worker count and workers are never removed outside this
    /// pop/push pair within `dispatch`, so the heap is never empty at a
    /// call site that has `&mut self` to call this with.
    #[allow(clippy::expect_used)] // invariant documented above: never called on an empty heap
    pub(crate) fn pop_min(&mut self) -> WorkerEntry<T> {
        let last = self.slots.len() - 1;
        self.swap(0, last);
        self.sift_down(0, last);
        self.slots.pop().expect("heap must be non-empty to pop")
    }

    /// Insert an entry, restoring heap order in `O(log n)`.
    pub(crate) fn push(&mut self, mut entry: WorkerEntry<T>) {
        let i = self.slots.len();
        entry.index = i;
        if self.slot_of.len() <= entry.id.0 {
            self.slot_of.resize(entry.id.0 + 1, 0);
        }
        self.slot_of[entry.id.0] = i;
        self.slots.push(entry);
        self.sift_up(i);
    }

    /// Decrement `id`'s pending count and re-sift it into place.
    ///
    /// A decrement can only move a worker toward the root, so this only
    /// ever needs `sift_up`; it's still expressed as "fix" (try down, then
    /// up) to mirror `container/heap.Fix`'s general contract rather than
    /// assume callers only ever decrement.
    pub(crate) fn complete(&mut self, id: WorkerId) {
        let i = self.slot_of[id.0];
        self.slots[i].pending = self.slots[i].pending.saturating_sub(1);
        self.fix(i);
    }

    /// Restore heap order around a worker whose key may have moved in
    /// either direction: sift it down, then sift whatever landed at its
    /// final resting place up. Since only one key changes at a time, at
    /// most one of the two phases ever actually moves anything; running
    /// both unconditionally is simpler than Go's `down`-then-conditional-
    /// `up` and no less correct.
    fn fix(&mut self, i: usize) {
        let len = self.slots.len();
        let landed = self.sift_down(i, len);
        self.sift_up(landed);
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.slots[i].pending < self.slots[parent].pending {
                self.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    /// Sift down starting at `i`, only considering indices in `[0, len)`.
    /// Returns the index the starting element ended up at.
    fn sift_down(&mut self, mut i: usize, len: usize) -> usize {
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut smallest = i;
            if left < len && self.slots[left].pending < self.slots[smallest].pending {
                smallest = left;
            }
            if right < len && self.slots[right].pending < self.slots[smallest].pending {
                smallest = right;
            }
            if smallest == i {
                return i;
            }
            self.swap(i, smallest);
            i = smallest;
        }
    }

    fn swap(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.slots.swap(i, j);
        self.slots[i].index = i;
        self.slots[j].index = j;
        self.slot_of[self.slots[i].id.0] = i;
        self.slot_of[self.slots[j].id.0] = j;
    }

    #[cfg(test)]
    pub(crate) fn pending_in_slot_order(&self) -> Vec<usize> {
        self.slots.iter().map(|e| e.pending).collect()
    }

    #[cfg(test)]
    pub(crate) fn is_valid_min_heap(&self) -> bool {
        for i in 0..self.slots.len() {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            if left < self.slots.len() && self.slots[left].pending < self.slots[i].pending {
                return false;
            }
            if right < self.slots.len() && self.slots[right].pending < self.slots[i].pending {
                return false;
            }
            if self.slots[i].index != i {
                return false;
            }
            if self.slot_of[self.slots[i].id.0] != i {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(super) fn entry(id: usize, pending: usize) -> WorkerEntry<i64> {
        let (tx, _rx) = mpsc::channel(1);
        WorkerEntry {
            id: WorkerId(id),
            sender: tx,
            pending,
            index: 0,
        }
    }

    #[test]
    fn pop_returns_minimum() {
        let entries = vec![entry(0, 5), entry(1, 7), entry(2, 2), entry(3, 9)];
        let mut heap = WorkerHeap::init(entries);
        assert!(heap.is_valid_min_heap());

        let len_before_pop = heap.len();
        let min = heap.pop_min();
        assert_eq!(min.pending, 2);
        assert_eq!(min.index, len_before_pop - 1);
    }

    #[test]
    fn successive_pops_are_ascending() {
        let entries = vec![
            entry(0, 9),
            entry(1, 1),
            entry(2, 5),
            entry(3, 3),
            entry(4, 7),
            entry(5, 2),
        ];
        let mut heap = WorkerHeap::init(entries);
        let mut popped = Vec::new();
        while heap.len() > 0 {
            popped.push(heap.pop_min().pending);
        }
        let mut sorted = popped.clone();
        sorted.sort_unstable();
        assert_eq!(popped, sorted);
    }

    #[test]
    fn dispatch_then_complete_preserves_heap_order() {
        let entries = vec![entry(0, 0), entry(1, 0), entry(2, 0), entry(3, 0)];
        let mut heap = WorkerHeap::init(entries);

        // dispatch: pop min, increment pending, push back.
        let mut w = heap.pop_min();
        w.pending += 1;
        let dispatched_id = w.id;
        heap.push(w);
        assert!(heap.is_valid_min_heap());

        // complete: decrement and re-sift from the worker's current index.
        heap.complete(dispatched_id);
        assert!(heap.is_valid_min_heap());
        assert_eq!(heap.pending_in_slot_order().iter().sum::<usize>(), 0);
    }

    #[test]
    fn index_tracks_position_across_many_operations() {
        let entries: Vec<_> = (0..6).map(|i| entry(i, 0)).collect();
        let mut heap = WorkerHeap::init(entries);

        for round in 0..50 {
            let mut w = heap.pop_min();
            w.pending += 1 + round % 3;
            let id = w.id;
            heap.push(w);
            assert!(heap.is_valid_min_heap());
            if round % 2 == 0 {
                heap.complete(id);
                assert!(heap.is_valid_min_heap());
            }
        }
    }
}
