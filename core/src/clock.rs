//! Game clock — owns simulated time and the two accrual paths.
//!
//! The idle path runs from construction and credits whole timber only.
//! The open path starts when the main play screen opens and credits the
//! unrounded rate on top of the idle path, not instead of it.

use crate::{
    scheduler::{Scheduler, TaskHandle, TaskKind},
    types::Millis,
};

#[derive(Debug, Clone, PartialEq)]
pub struct GameClock {
    now:         Millis,
    period:      Millis,
    idle_task:   TaskHandle,
    open_task:   Option<TaskHandle>,
}

impl GameClock {
    /// Start the clock at time zero and schedule the idle accrual path.
    pub fn start(scheduler: &mut Scheduler, period: Millis) -> Self {
        let idle_task = scheduler.schedule(TaskKind::IdleAccrual, period, 0);
        Self {
            now: 0,
            period,
            idle_task,
            open_task: None,
        }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// Time only moves forward.
    pub(crate) fn set_now(&mut self, now: Millis) {
        self.now = self.now.max(now);
    }

    pub fn is_open(&self) -> bool {
        self.open_task.is_some()
    }

    pub fn idle_task(&self) -> TaskHandle {
        self.idle_task
    }

    /// Start the fractional accrual path. Returns false if already open.
    pub fn open(&mut self, scheduler: &mut Scheduler) -> bool {
        if self.open_task.is_some() {
            return false;
        }
        self.open_task = Some(scheduler.schedule(TaskKind::OpenAccrual, self.period, self.now));
        true
    }

    /// Timber one accrual tick of `kind` credits at `rate`.
    pub fn accrual_for(kind: TaskKind, rate: f64) -> f64 {
        match kind {
            TaskKind::IdleAccrual => rate.floor().max(0.0),
            TaskKind::OpenAccrual => rate.max(0.0),
            _ => 0.0,
        }
    }
}
