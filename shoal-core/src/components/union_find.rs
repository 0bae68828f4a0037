//! Lock-striped disjoint sets shared by concurrent graph workers.
//!
//! Finds are lock-free and compress paths by halving. A merge locks the two
//! current roots in ascending order, then confirms they are still roots of
//! the same sets before linking; a concurrent merge that moved either root
//! makes the attempt start over.

use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicUsize, Ordering},
};

use crate::error::GraphError;

pub(super) struct DisjointSets {
    parent: Vec<AtomicUsize>,
    rank: Vec<AtomicUsize>,
    root_locks: Vec<Mutex<()>>,
    set_count: AtomicUsize,
}

impl DisjointSets {
    pub(super) fn new(len: usize) -> Self {
        Self {
            parent: (0..len).map(AtomicUsize::new).collect(),
            rank: (0..len).map(|_| AtomicUsize::new(0)).collect(),
            root_locks: (0..len).map(|_| Mutex::new(())).collect(),
            set_count: AtomicUsize::new(len),
        }
    }

    pub(super) fn set_count(&self) -> usize {
        self.set_count.load(Ordering::Acquire)
    }

    /// Merges the sets of `left` and `right`; returns `false` when they were
    /// already joined.
    pub(super) fn merge(&self, left: usize, right: usize) -> Result<bool, GraphError> {
        loop {
            let (low, high) = ascending(self.root(left)?, self.root(right)?);
            if low == high {
                return Ok(false);
            }

            let _low_guard = self.lock(low)?;
            let _high_guard = self.lock(high)?;

            let current = ascending(self.root(left)?, self.root(right)?);
            if current.0 == current.1 {
                return Ok(false);
            }
            if current != (low, high) || !self.is_root(low) || !self.is_root(high) {
                continue;
            }

            self.link(low, high);
            return Ok(true);
        }
    }

    /// Returns the representative of `node`.
    pub(super) fn root(&self, node: usize) -> Result<usize, GraphError> {
        let mut current = node;
        loop {
            let parent = self.load_parent(current)?;
            if parent == current {
                return Ok(current);
            }
            let grandparent = self.load_parent(parent)?;
            if grandparent != parent {
                self.parent[current].store(grandparent, Ordering::Release);
            }
            current = parent;
        }
    }

    /// Groups node positions by representative, in order of first member.
    pub(super) fn groups(&self) -> Result<Vec<Vec<usize>>, GraphError> {
        let mut slot_of_root = vec![usize::MAX; self.parent.len()];
        let mut groups: Vec<Vec<usize>> = Vec::with_capacity(self.set_count());
        for node in 0..self.parent.len() {
            let root = self.root(node)?;
            let slot = &mut slot_of_root[root];
            if *slot == usize::MAX {
                *slot = groups.len();
                groups.push(Vec::new());
            }
            if let Some(group) = groups.get_mut(*slot) {
                group.push(node);
            }
        }
        Ok(groups)
    }

    fn load_parent(&self, node: usize) -> Result<usize, GraphError> {
        self.parent
            .get(node)
            .map(|parent| parent.load(Ordering::Acquire))
            .ok_or(GraphError::InvariantViolation {
                invariant: "union-find node must be within the parent table",
                index: node,
                lock_count: self.root_locks.len(),
            })
    }

    fn is_root(&self, node: usize) -> bool {
        self.parent[node].load(Ordering::Acquire) == node
    }

    fn lock(&self, root: usize) -> Result<MutexGuard<'_, ()>, GraphError> {
        let lock = self
            .root_locks
            .get(root)
            .ok_or(GraphError::InvariantViolation {
                invariant: "root lock index must be within the lock table",
                index: root,
                lock_count: self.root_locks.len(),
            })?;
        lock.lock().map_err(|_| GraphError::LockPoisoned {
            resource: "union-find root lock",
        })
    }

    /// Attaches the lower-ranked root below the other; equal ranks keep the
    /// smaller index as the representative.
    fn link(&self, low: usize, high: usize) {
        let low_rank = self.rank[low].load(Ordering::Relaxed);
        let high_rank = self.rank[high].load(Ordering::Relaxed);
        let (parent, child) = if high_rank > low_rank {
            (high, low)
        } else {
            (low, high)
        };
        self.parent[child].store(parent, Ordering::Release);
        if low_rank == high_rank {
            self.rank[parent].fetch_add(1, Ordering::Relaxed);
        }
        self.set_count.fetch_sub(1, Ordering::AcqRel);
    }
}

const fn ascending(first: usize, second: usize) -> (usize, usize) {
    if first <= second {
        (first, second)
    } else {
        (second, first)
    }
}
