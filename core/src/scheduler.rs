//! Periodic task scheduler — one cancellable task per timed concern.
//!
//! RULE: tasks fire in (due time, schedule order) order. Two tasks due at
//! the same instant always fire in the order they were scheduled, so a
//! run is reproducible for a given sequence of `advance` calls.

use crate::types::Millis;

pub type TaskHandle = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Integer-truncated accrual, always on.
    IdleAccrual,
    /// Fractional accrual, on once the game is opened.
    OpenAccrual,
    TideTurn,
    RaidExpiryPoll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTask {
    pub handle: TaskHandle,
    pub kind:   TaskKind,
    pub at:     Millis,
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    handle:   TaskHandle,
    kind:     TaskKind,
    period:   Millis,
    next_due: Millis,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    tasks:       Vec<ScheduledTask>,
    next_handle: TaskHandle,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a repeating task. The first fire is one period after `now`.
    pub fn schedule(&mut self, kind: TaskKind, period: Millis, now: Millis) -> TaskHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        let period = period.max(1);
        self.tasks.push(ScheduledTask {
            handle,
            kind,
            period,
            next_due: now + period,
        });
        log::debug!("scheduled {kind:?} every {period}ms (handle {handle})");
        handle
    }

    /// Returns false if the task was already gone.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);
        before != self.tasks.len()
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Take the earliest task due at or before `until` and re-arm it for
    /// its next period.
    pub fn pop_due(&mut self, until: Millis) -> Option<FiredTask> {
        let task = self
            .tasks
            .iter_mut()
            .filter(|t| t.next_due <= until)
            .min_by_key(|t| (t.next_due, t.handle))?;

        let fired = FiredTask {
            handle: task.handle,
            kind:   task.kind,
            at:     task.next_due,
        };
        task.next_due += task.period;
        Some(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scheduler: &mut Scheduler, until: Millis) -> Vec<(TaskKind, Millis)> {
        std::iter::from_fn(|| scheduler.pop_due(until))
            .map(|f| (f.kind, f.at))
            .collect()
    }

    #[test]
    fn fires_in_time_then_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TaskKind::IdleAccrual, 1_000, 0);
        scheduler.schedule(TaskKind::TideTurn, 2_000, 0);

        let fired = drain(&mut scheduler, 2_000);
        assert_eq!(
            fired,
            vec![
                (TaskKind::IdleAccrual, 1_000),
                (TaskKind::IdleAccrual, 2_000),
                (TaskKind::TideTurn, 2_000),
            ]
        );
    }

    #[test]
    fn cancelled_task_never_fires_again() {
        let mut scheduler = Scheduler::new();
        let poll = scheduler.schedule(TaskKind::RaidExpiryPoll, 200, 0);
        assert_eq!(drain(&mut scheduler, 400).len(), 2);

        assert!(scheduler.cancel(poll));
        assert!(!scheduler.cancel(poll));
        assert!(!scheduler.is_scheduled(poll));
        assert!(drain(&mut scheduler, 10_000).is_empty());
    }

    #[test]
    fn nothing_fires_before_first_period() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TaskKind::OpenAccrual, 1_000, 500);
        assert!(scheduler.pop_due(1_499).is_none());
        assert_eq!(scheduler.pop_due(1_500).map(|f| f.at), Some(1_500));
    }
}
