use std::collections::BTreeMap;

/// Identifies one pending timer. Ordered by due time, then by arming order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId {
    due: u64,
    seq: u64,
}

impl TimerId {
    pub fn due(&self) -> u64 {
        self.due
    }
}

/// Single-threaded virtual-time timer queue.
///
/// Nothing runs on its own: the owner pulls due events with [`pop_due`] and
/// handles them one at a time, so a handler can cancel or arm timers before
/// the next event is observed.
///
/// [`pop_due`]: Scheduler::pop_due
#[derive(Debug)]
pub struct Scheduler<E> {
    now: u64,
    next_seq: u64,
    timers: BTreeMap<TimerId, E>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Scheduler {
            now: 0,
            next_seq: 0,
            timers: BTreeMap::new(),
        }
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule(&mut self, delay_ms: u64, event: E) -> TimerId {
        let id = TimerId {
            due: self.now.saturating_add(delay_ms),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.timers.insert(id, event);
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> Option<E> {
        self.timers.remove(&id)
    }

    /// Drop every pending event matching `pred`; returns how many went.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&E) -> bool) -> usize {
        let before = self.timers.len();
        self.timers.retain(|_, e| !pred(e));
        before - self.timers.len()
    }

    /// Remove the earliest event due at or before `until`, moving the clock
    /// to its due time.
    pub fn pop_due(&mut self, until: u64) -> Option<(u64, E)> {
        let id = *self.timers.keys().next()?;
        if id.due > until {
            return None;
        }
        let event = self.timers.remove(&id)?;
        self.now = self.now.max(id.due);
        Some((self.now, event))
    }

    pub fn advance_to(&mut self, t: u64) {
        self.now = self.now.max(t);
    }
}
