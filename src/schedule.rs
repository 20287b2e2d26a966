//! Virtual-time task scheduler.
//!
//! Every deferred action in the game (start delays, the countdown interval,
//! mole group refreshes, the hammer swing) is a task in one `Scheduler`. The
//! host drives time forward explicitly: the browser pumps it with
//! `performance.now()` each animation frame, tests pass plain integers. Nothing
//! here reads a clock, so ordering and cancellation are fully deterministic.

/// Everything the game ever defers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timer {
    ShowMoleGroup,
    /// End of the start delay; arms the repeating countdown.
    StartCountdown,
    CountdownTick,
    HammerRevert,
    ChooseDifficulty,
}

/// Handle returned by `schedule_*`, used to cancel the task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

struct Task<E> {
    id: TaskId,
    due_ms: u64,
    period_ms: Option<u64>,
    event: E,
}

pub struct Scheduler<E> {
    now_ms: u64,
    next_id: u64,
    pending: Vec<Task<E>>,
}

impl<E: Clone> Scheduler<E> {
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Current scheduler time. Only moves forward.
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Fire `event` once, `delay_ms` from now.
    pub fn schedule_once(&mut self, delay_ms: u64, event: E) -> TaskId {
        self.push(delay_ms, None, event)
    }

    /// Fire `event` every `period_ms`, first firing one period from now.
    pub fn schedule_repeating(&mut self, period_ms: u64, event: E) -> TaskId {
        // A zero period would never let time advance.
        let period_ms = period_ms.max(1);
        self.push(period_ms, Some(period_ms), event)
    }

    fn push(&mut self, delay_ms: u64, period_ms: Option<u64>, event: E) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(Task {
            id,
            due_ms: self.now_ms.saturating_add(delay_ms),
            period_ms,
            event,
        });
        id
    }

    /// Drop a pending task. Returns false when nothing was pending under `id`.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != id);
        self.pending.len() != before
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.pending.iter().any(|t| t.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Earliest due time among pending tasks.
    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|t| t.due_ms).min()
    }

    /// Take the earliest task due at or before `until_ms`, moving `now` to its
    /// due time. Ties go to the task scheduled first. Repeating tasks are
    /// re-armed one period later under the same id.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<E> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id.0))
            .map(|(i, _)| i)?;

        let due = self.pending[idx].due_ms;
        self.now_ms = self.now_ms.max(due);
        match self.pending[idx].period_ms {
            Some(period) => {
                let task = &mut self.pending[idx];
                task.due_ms = due + period;
                Some(task.event.clone())
            }
            None => Some(self.pending.swap_remove(idx).event),
        }
    }

    /// Move `now` forward to `until_ms` once everything due has been popped.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
