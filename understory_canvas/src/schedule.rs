// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Idle queue with a maximum-latency guarantee.
//!
//! Tasks wait until the host reports an idle period, but never longer than
//! their timeout: a frame observed after the deadline runs them anyway. This
//! mirrors `requestIdleCallback(cb, { timeout })` for hosts that only have a
//! frame clock.

use alloc::collections::VecDeque;

#[derive(Debug)]
struct Entry<T> {
    deadline_ms: f64,
    task: T,
}

/// FIFO of deferred tasks with per-task deadlines.
#[derive(Debug)]
pub struct IdleQueue<T> {
    entries: VecDeque<Entry<T>>,
}

impl<T> Default for IdleQueue<T> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }
}

impl<T> IdleQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues `task`, due at the latest at `now_ms + timeout_ms`.
    pub fn push(&mut self, task: T, now_ms: f64, timeout_ms: f64) {
        self.entries.push_back(Entry {
            deadline_ms: now_ms + timeout_ms.max(0.0),
            task,
        });
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<f64> {
        self.entries
            .iter()
            .map(|e| e.deadline_ms)
            .reduce(f64::min)
    }

    /// Removes and returns the next task that may run now.
    ///
    /// When `idle` is `true` every task is eligible; otherwise only tasks
    /// whose deadline has passed. Tasks keep their enqueue order.
    pub fn pop_ready(&mut self, now_ms: f64, idle: bool) -> Option<T> {
        let index = if idle {
            if self.entries.is_empty() {
                return None;
            }
            0
        } else {
            self.entries.iter().position(|e| e.deadline_ms <= now_ms)?
        };
        self.entries.remove(index).map(|e| e.task)
    }

    /// Drops every pending task.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::IdleQueue;

    #[test]
    fn idle_runs_everything_in_order() {
        let mut q = IdleQueue::new();
        q.push('a', 0.0, 100.0);
        q.push('b', 5.0, 100.0);
        assert_eq!(q.pop_ready(10.0, true), Some('a'));
        assert_eq!(q.pop_ready(10.0, true), Some('b'));
        assert_eq!(q.pop_ready(10.0, true), None);
    }

    #[test]
    fn busy_frames_only_run_expired_tasks() {
        let mut q = IdleQueue::new();
        q.push(1, 0.0, 300.0);
        q.push(2, 0.0, 100.0);
        assert_eq!(q.next_deadline(), Some(100.0));
        assert_eq!(q.pop_ready(50.0, false), None);
        assert_eq!(q.pop_ready(100.0, false), Some(2));
        assert_eq!(q.pop_ready(299.0, false), None);
        assert_eq!(q.pop_ready(300.0, false), Some(1));
        assert!(q.is_empty());
    }
}
