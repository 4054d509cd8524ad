use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClickError {
    #[error("click window {0:?} is still open or settling")]
    Busy(WindowId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Closed,
    Open(WindowId),
    Settling(WindowId),
}

/// Tallies input pulses for one timed window at a time.
///
/// `open` -> pulses counted -> `close` (pulses ignored from here) -> `settle`
/// hands back the count. The caller drives the transitions from its timers.
#[derive(Debug)]
pub struct ClickCounter {
    phase: Phase,
    count: u32,
    next_id: u64,
}

impl Default for ClickCounter {
    fn default() -> Self {
        ClickCounter {
            phase: Phase::Closed,
            count: 0,
            next_id: 0,
        }
    }
}

impl ClickCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) -> Result<WindowId, ClickError> {
        match self.phase {
            Phase::Open(id) | Phase::Settling(id) => Err(ClickError::Busy(id)),
            Phase::Closed => {
                self.next_id += 1;
                let id = WindowId(self.next_id);
                self.count = 0;
                self.phase = Phase::Open(id);
                Ok(id)
            }
        }
    }

    /// Count a pulse; returns false if no window is open.
    pub fn pulse(&mut self) -> bool {
        if let Phase::Open(_) = self.phase {
            self.count += 1;
            true
        } else {
            false
        }
    }

    pub fn close(&mut self, id: WindowId) -> bool {
        if self.phase == Phase::Open(id) {
            self.phase = Phase::Settling(id);
            true
        } else {
            false
        }
    }

    /// Finish a closed window and return its count.
    pub fn settle(&mut self, id: WindowId) -> Option<u32> {
        if self.phase == Phase::Settling(id) {
            self.phase = Phase::Closed;
            Some(self.count)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.phase = Phase::Closed;
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scheduler::Scheduler;

    enum Ev {
        Pulse,
        Close(WindowId),
        Settle(WindowId),
    }

    #[test]
    fn pulses_after_close_do_not_count() {
        let mut clicks = ClickCounter::new();
        let mut timers = Scheduler::new();

        let id = clicks.open().unwrap();
        timers.schedule(1000, Ev::Close(id));
        timers.schedule(1500, Ev::Settle(id));
        for at in [100, 400, 900, 1200] {
            timers.schedule(at, Ev::Pulse);
        }

        let mut result = None;
        while let Some((_, ev)) = timers.pop_due(u64::MAX) {
            match ev {
                Ev::Pulse => {
                    clicks.pulse();
                }
                Ev::Close(w) => {
                    assert!(clicks.close(w));
                }
                Ev::Settle(w) => result = clicks.settle(w),
            }
        }

        assert_eq!(result, Some(3));
        assert!(clicks.open().is_ok());
    }

    #[test]
    fn no_new_window_while_settling() {
        let mut clicks = ClickCounter::new();
        let id = clicks.open().unwrap();
        clicks.pulse();
        clicks.pulse();
        assert_eq!(clicks.open(), Err(ClickError::Busy(id)));
        clicks.close(id);
        assert_eq!(clicks.open(), Err(ClickError::Busy(id)));
        assert_eq!(clicks.settle(id), Some(2));

        // A fresh window starts counting from zero.
        let next = clicks.open().unwrap();
        assert_ne!(next, id);
        clicks.pulse();
        clicks.close(next);
        assert_eq!(clicks.settle(next), Some(1));
    }

    #[test]
    fn cancelled_window_yields_nothing() {
        let mut clicks = ClickCounter::new();
        let id = clicks.open().unwrap();
        clicks.pulse();
        clicks.cancel();

        assert!(!clicks.close(id));
        assert_eq!(clicks.settle(id), None);
        assert!(!clicks.pulse());
    }
}
