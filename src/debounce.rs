use std::time::{Duration, Instant};

use crate::config::EdgeDetect;

/// Per-pin debounce state machine.
///
/// The caller feeds in every raw level sample the kernel wakes it up for,
/// together with the monotonic time of the observation; `sample` answers with
/// the logical value of a stable transition, or `None` while the line is
/// still bouncing. An interval of zero accepts every qualifying transition
/// immediately.
#[derive(Debug)]
pub struct Debouncer {
    edge: EdgeDetect,
    interval: Duration,
    switch_state: bool,
    pending_since: Option<Instant>,
}

impl Debouncer {
    pub fn new(edge: EdgeDetect, interval: Duration, initial_level: bool) -> Self {
        Self {
            edge,
            interval,
            switch_state: initial_level,
            pending_since: None,
        }
    }

    pub fn sample(&mut self, level: bool, at: Instant) -> Option<bool> {
        match self.edge {
            EdgeDetect::None => None,
            EdgeDetect::Rising | EdgeDetect::Falling => self.sample_single(level, at),
            EdgeDetect::Both => self.sample_both(level, at),
        }
    }

    /// Rising and falling mode: arming when the level matches the configured
    /// edge's target, firing when it leaves again after holding long enough.
    fn sample_single(&mut self, level: bool, at: Instant) -> Option<bool> {
        let asserted = level == (self.edge == EdgeDetect::Rising);
        if asserted {
            if self.pending_since.is_none() {
                self.pending_since = Some(at);
            }
            None
        } else {
            let since = self.pending_since.take()?;
            (at.duration_since(since) >= self.interval).then_some(level)
        }
    }

    /// Both mode: any level change re-arms the timer; the event fires on the
    /// first wakeup that finds the level settled, and only once per change.
    fn sample_both(&mut self, level: bool, at: Instant) -> Option<bool> {
        if level != self.switch_state {
            self.switch_state = level;
            self.pending_since = Some(at);
            return None;
        }

        let since = self.pending_since?;
        if at.duration_since(since) >= self.interval {
            self.pending_since = None;
            Some(level)
        } else {
            None
        }
    }
}
