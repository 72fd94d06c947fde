//! Raid session — a 20 second scoring window.
//!
//! Idle → Active → Idle. Each hit scores a point and pays a small reward
//! at once; expiry pays one lump reward based on score and building
//! count. A hit after `end_time` is refused even if the expiry poll has
//! not run yet.

use crate::{
    config::RaidConfig,
    ledger::ResourceLedger,
    scheduler::{Scheduler, TaskHandle, TaskKind},
    types::Millis,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveRaid {
    end_time:  Millis,
    score:     u64,
    poll_task: TaskHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidOutcome {
    pub score:  u64,
    pub reward: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaidSession {
    active: Option<ActiveRaid>,
}

pub fn raid_reward(config: &RaidConfig, score: u64, building_count: usize) -> u64 {
    let earned = score * config.score_weight + building_count as u64 * config.building_weight;
    earned.max(config.min_reward)
}

impl RaidSession {
    pub fn new() -> Self {
        Self { active: None }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn score(&self) -> Option<u64> {
        self.active.as_ref().map(|r| r.score)
    }

    pub fn end_time(&self) -> Option<Millis> {
        self.active.as_ref().map(|r| r.end_time)
    }

    /// Begin a raid and schedule its expiry poll. Returns the end time,
    /// or None if a raid is already running.
    pub fn start(
        &mut self,
        scheduler: &mut Scheduler,
        config: &RaidConfig,
        now: Millis,
    ) -> Option<Millis> {
        if self.active.is_some() {
            return None;
        }
        let end_time = now + config.duration_ms;
        let poll_task = scheduler.schedule(TaskKind::RaidExpiryPoll, config.poll_ms, now);
        self.active = Some(ActiveRaid { end_time, score: 0, poll_task });
        Some(end_time)
    }

    /// Score a hit and pay the instant reward. Returns the new score.
    pub fn register_hit(
        &mut self,
        ledger: &mut ResourceLedger,
        config: &RaidConfig,
        now: Millis,
    ) -> Option<u64> {
        let raid = self.active.as_mut().filter(|r| now <= r.end_time)?;
        raid.score += 1;
        ledger.credit(config.hit_reward);
        Some(raid.score)
    }

    /// Expiry check. Once `now` is past the end time the raid closes,
    /// its poll task is cancelled, and the end reward is credited.
    pub fn poll(
        &mut self,
        scheduler: &mut Scheduler,
        ledger: &mut ResourceLedger,
        config: &RaidConfig,
        building_count: usize,
        now: Millis,
    ) -> Option<RaidOutcome> {
        if !self.active.as_ref().is_some_and(|r| now > r.end_time) {
            return None;
        }
        let raid = self.active.take()?;
        scheduler.cancel(raid.poll_task);

        let reward = raid_reward(config, raid.score, building_count);
        ledger.credit(reward as f64);
        Some(RaidOutcome { score: raid.score, reward })
    }
}
