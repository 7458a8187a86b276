//! Cancellable delayed actions.
//!
//! The whole cue system runs on one primitive: an action queued for a future
//! instant, cancellable through a capability handle. There is no internal
//! thread -- the embedding caller drives [`TimerQueue::due`] periodically
//! with its own clock (wall or virtual), the same way the host drives a
//! timer engine's `tick()`.
//!
//! Ordering of entries sharing an instant follows scheduling order, but
//! callers must not rely on sub-tick ordering across independently created
//! timers; cues that must never coincide are deliberately offset instead.

use std::cell::Cell;
use std::rc::Rc;

type CancelFlag = Rc<Cell<bool>>;

/// Capability to cancel scheduled work.
///
/// Cancelling is idempotent and safe after the work has already fired:
/// entries check their flag at drain time, so a cancelled entry simply never
/// comes due. Handles compose -- a round's handle carries the flags of every
/// nested schedule it spawned. Clones share the same flags, so either copy
/// cancels the same entries.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flags: Vec<CancelFlag>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self {
            flags: vec![Rc::new(Cell::new(false))],
        }
    }

    /// Stop every entry attached to this handle. Repeated calls are no-ops.
    pub fn cancel(&self) {
        for flag in &self.flags {
            flag.set(true);
        }
    }

    /// Absorb another handle so one cancel covers both.
    pub fn merge(&mut self, other: CancelHandle) {
        self.flags.extend(other.flags);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flags.iter().all(|f| f.get())
    }

    pub(crate) fn flag(&self) -> CancelFlag {
        Rc::clone(&self.flags[0])
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

struct Scheduled<A> {
    due_ms: u64,
    seq: u64,
    flag: CancelFlag,
    action: A,
}

/// Queue of delayed actions, drained in `(due, scheduling)` order.
pub struct TimerQueue<A> {
    entries: Vec<Scheduled<A>>,
    next_seq: u64,
}

impl<A> TimerQueue<A> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Schedule `action` for `due_ms`, returning a fresh handle for it.
    pub fn schedule(&mut self, due_ms: u64, action: A) -> CancelHandle {
        let handle = CancelHandle::new();
        self.push(due_ms, action, handle.flag());
        handle
    }

    /// Schedule `action` under an existing handle, so cancelling that handle
    /// covers this entry too.
    pub fn schedule_under(&mut self, due_ms: u64, action: A, handle: &CancelHandle) {
        self.push(due_ms, action, handle.flag());
    }

    fn push(&mut self, due_ms: u64, action: A, flag: CancelFlag) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Scheduled {
            due_ms,
            seq,
            flag,
            action,
        });
    }

    /// Remove and return every non-cancelled action due at or before
    /// `now_ms`, ordered by `(due_ms, seq)`. Cancelled entries are dropped
    /// silently whenever they surface.
    pub fn due(&mut self, now_ms: u64) -> Vec<A> {
        let entries = std::mem::take(&mut self.entries);
        let mut fired = Vec::new();
        for entry in entries {
            if entry.flag.get() {
                continue;
            }
            if entry.due_ms <= now_ms {
                fired.push(entry);
            } else {
                self.entries.push(entry);
            }
        }
        fired.sort_by_key(|e| (e.due_ms, e.seq));
        fired.into_iter().map(|e| e.action).collect()
    }

    /// Earliest pending (non-cancelled) due time.
    pub fn next_due(&self) -> Option<u64> {
        self.entries
            .iter()
            .filter(|e| !e.flag.get())
            .map(|e| e.due_ms)
            .min()
    }

    pub fn pending(&self) -> usize {
        self.entries.iter().filter(|e| !e.flag.get()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    /// Drop everything, cancelled or not.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Milliseconds since the Unix epoch; the default clock for live sessions.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
