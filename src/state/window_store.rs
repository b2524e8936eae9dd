use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{AppError, Result};
use crate::types::WindowSnapshot;

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Bounded, deduplicated, FIFO-evicting sequence of numbers. Oldest first.
///
/// Invariants: `values.len() <= capacity` and no value appears twice.
#[derive(Debug)]
struct Window {
    values: VecDeque<i64>,
    capacity: usize,
}

impl Window {
    fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Linear scan is fine: the window holds a handful of values.
    fn contains(&self, n: i64) -> bool {
        self.values.contains(&n)
    }

    fn insert(&mut self, n: i64) {
        if self.contains(n) {
            return;
        }
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(n);
    }

    fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot::new(self.values.iter().copied().collect())
    }
}

// ---------------------------------------------------------------------------
// WindowStore
// ---------------------------------------------------------------------------

/// Process-wide window shared by every request. All mutation goes through
/// `insert_and_snapshot`, which holds the lock for the whole read-modify-write.
pub struct WindowStore {
    inner: Mutex<Window>,
    capacity: usize,
}

impl WindowStore {
    /// `capacity` must be >= 1; `Config` enforces this.
    pub fn new(capacity: usize) -> Arc<Self> {
        let capacity = capacity.max(1);
        Arc::new(Self {
            inner: Mutex::new(Window::new(capacity)),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append the unseen values of `numbers` in order, evicting the oldest entry
    /// whenever the window is full. Already-present values are skipped without
    /// reordering. Returns `(previous, current)` snapshots taken under the same
    /// lock acquisition.
    pub fn insert_and_snapshot(&self, numbers: &[i64]) -> Result<(WindowSnapshot, WindowSnapshot)> {
        let mut window = self.lock()?;
        let previous = window.snapshot();
        for &n in numbers {
            window.insert(n);
        }
        let current = window.snapshot();
        Ok((previous, current))
    }

    /// Read-only copy of the current contents.
    pub fn snapshot(&self) -> Result<WindowSnapshot> {
        Ok(self.lock()?.snapshot())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Window>> {
        // A panic while holding the guard can only happen between whole
        // insertions, so the window itself is still consistent; we still refuse
        // to serve from it rather than guess.
        self.inner
            .lock()
            .map_err(|_| AppError::Internal("window lock poisoned".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
