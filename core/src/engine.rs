//! The island engine — the session context that owns every component.
//!
//! ORDER OF EFFECTS for a mutating operation:
//!   1. Validate and apply the change (buildings, ledger, raid, tide).
//!   2. Recompute the accrual rate if buildings or tide changed.
//!   3. Emit events, which are dispatched to collaborators as they go.
//!
//! RULES:
//!   - Every mutation goes through `&mut self`; nothing observes a
//!     half-applied change.
//!   - Time only moves through `advance()`, which fires scheduler tasks in
//!     (due time, schedule order) order.
//!   - The rate is derived state. It is recomputed on placement, upgrade,
//!     removal, tide change, restore, and game open, never by accrual.
//!   - Recoverable rejections leave state untouched.

use crate::{
    buildings::{Building, BuildingRegistry, BuildingType, VisualHint},
    clock::GameClock,
    collaborator::{AudioSink, Collaborators, DisplaySink, RenderSink, ScenePicker},
    command::PlayerCommand,
    config::GameConfig,
    error::{SimError, SimResult},
    event::{GameEvent, TimedEvent},
    ledger::ResourceLedger,
    raid::RaidSession,
    rates::accrual_rate,
    scheduler::{FiredTask, Scheduler, TaskHandle, TaskKind},
    snapshot::{self, SaveBlob},
    store::SimStore,
    tide::{TideCycle, TideLabel},
    types::{GroundPoint, Millis, ScreenPoint},
};

/// Longest span a single `advance` call will simulate (one day).
pub const MAX_ADVANCE_MS: Millis = 24 * 60 * 60 * 1000;

pub struct IslandEngine {
    pub config:    GameConfig,
    clock:         GameClock,
    scheduler:     Scheduler,
    tide_task:     TaskHandle,
    ledger:        ResourceLedger,
    buildings:     BuildingRegistry,
    tide:          TideCycle,
    raid:          RaidSession,
    store:         SimStore,
    selected_type: BuildingType,
    unlocked:      bool,
    collaborators: Collaborators,
    events:        Vec<TimedEvent>,
}

impl IslandEngine {
    /// A fresh island at time zero. The idle accrual and tide tasks start
    /// running immediately.
    pub fn new(config: GameConfig, store: SimStore) -> Self {
        let mut scheduler = Scheduler::new();
        let clock = GameClock::start(&mut scheduler, config.accrual_period_ms);
        let tide_task = scheduler.schedule(TaskKind::TideTurn, config.tide.period_ms, 0);
        let ledger = ResourceLedger::new(config.starting_timber);

        Self {
            config,
            clock,
            scheduler,
            tide_task,
            ledger,
            buildings: BuildingRegistry::new(),
            tide: TideCycle::new(),
            raid: RaidSession::new(),
            store,
            selected_type: BuildingType::Hut,
            unlocked: false,
            collaborators: Collaborators::default(),
            events: Vec::new(),
        }
    }

    /// Open the save database at `db_path`, migrate it, and build an engine.
    pub fn build(config: GameConfig, db_path: &str) -> SimResult<Self> {
        let store = SimStore::open(db_path)?;
        store.migrate()?;
        Ok(Self::new(config, store))
    }

    /// Default config over an in-memory database.
    pub fn build_test() -> SimResult<Self> {
        let store = SimStore::in_memory()?;
        store.migrate()?;
        Ok(Self::new(GameConfig::default(), store))
    }

    // ── Collaborators ──────────────────────────────────────────

    pub fn add_render_sink(&mut self, sink: Box<dyn RenderSink>) {
        self.collaborators.add_render(sink);
    }

    pub fn add_display_sink(&mut self, sink: Box<dyn DisplaySink>) {
        self.collaborators.add_display(sink);
    }

    pub fn add_audio_sink(&mut self, sink: Box<dyn AudioSink>) {
        self.collaborators.add_audio(sink);
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<TimedEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Read access ────────────────────────────────────────────

    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    pub fn timber(&self) -> f64 {
        self.ledger.current()
    }

    pub fn rate(&self) -> f64 {
        self.ledger.rate()
    }

    pub fn tide(&self) -> TideLabel {
        self.tide.label()
    }

    pub fn tide_index(&self) -> usize {
        self.tide.index()
    }

    pub fn buildings(&self) -> &BuildingRegistry {
        &self.buildings
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Building> {
        self.buildings.find_by_id(id)
    }

    pub fn raid(&self) -> &RaidSession {
        &self.raid
    }

    pub fn selected_type(&self) -> BuildingType {
        self.selected_type
    }

    pub fn is_open(&self) -> bool {
        self.clock.is_open()
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn store(&self) -> &SimStore {
        &self.store
    }

    // ── Session ────────────────────────────────────────────────

    /// Enable pointer input and start the ambient soundscape. Only the
    /// first call has any effect.
    pub fn unlock(&mut self) -> bool {
        if self.unlocked {
            return false;
        }
        self.unlocked = true;
        self.emit(GameEvent::AmbientStarted);
        true
    }

    /// Start fractional accrual on top of the idle path. Idempotent apart
    /// from the rate refresh.
    pub fn open_game(&mut self) -> bool {
        let opened = self.clock.open(&mut self.scheduler);
        if opened {
            log::info!("game opened at {}ms", self.now());
            self.emit(GameEvent::GameOpened);
        }
        self.recalculate_rate();
        opened
    }

    /// Process teardown: stop the soundscape.
    pub fn shutdown(&mut self) {
        if self.unlocked {
            self.emit(GameEvent::AmbientStopped);
        }
    }

    // ── Buildings ──────────────────────────────────────────────

    pub fn select_build_type(&mut self, building_type: BuildingType) {
        self.selected_type = building_type;
    }

    pub fn place(&mut self, building_type: BuildingType, point: GroundPoint) -> SimResult<Building> {
        let building =
            self.buildings
                .place(&mut self.ledger, &self.config.costs, building_type, point)?;

        log::debug!(
            "placed {} {} at ({}, {})",
            building.building_type.as_str(),
            building.id,
            building.position.x,
            building.position.z
        );
        self.emit(GameEvent::BuildingPlaced {
            id:            building.id.clone(),
            building_type: building.building_type,
            level:         building.level,
            position:      building.position,
        });
        self.recalculate_rate();
        self.notify_resources();
        Ok(building)
    }

    /// Place the selected type wherever the pointer meets the ground.
    /// Ok(None) when the pointer is not over the ground.
    pub fn place_at(
        &mut self,
        point: ScreenPoint,
        picker: &dyn ScenePicker,
    ) -> SimResult<Option<Building>> {
        match picker.resolve_ground_position(point) {
            Some(ground) => self.place(self.selected_type, ground).map(Some),
            None => Ok(None),
        }
    }

    pub fn upgrade(&mut self, id: &str) -> SimResult<i32> {
        let new_level = self.buildings.upgrade(&mut self.ledger, &self.config.costs, id)?;

        log::debug!("upgraded {id} to level {new_level}");
        self.emit(GameEvent::BuildingUpgraded {
            id: id.to_string(),
            new_level,
            hint: VisualHint::for_level(new_level),
        });
        self.recalculate_rate();
        self.notify_resources();
        Ok(new_level)
    }

    pub fn remove_most_recent(&mut self) -> Option<Building> {
        let removed = self.buildings.remove_most_recent()?;
        log::debug!("removed {}", removed.id);
        self.emit(GameEvent::BuildingRemoved { id: removed.id.clone() });
        self.recalculate_rate();
        Some(removed)
    }

    // ── Raid ───────────────────────────────────────────────────

    /// False if a raid is already running.
    pub fn start_raid(&mut self) -> bool {
        let now = self.now();
        match self.raid.start(&mut self.scheduler, &self.config.raid, now) {
            Some(ends_at) => {
                log::info!("raid started at {now}ms, ends at {ends_at}ms");
                self.emit(GameEvent::RaidStarted { ends_at });
                true
            }
            None => false,
        }
    }

    /// False when no raid is running or it has already run out.
    pub fn register_hit(&mut self) -> bool {
        let now = self.now();
        match self.raid.register_hit(&mut self.ledger, &self.config.raid, now) {
            Some(score) => {
                self.emit(GameEvent::RaidHit { score });
                self.notify_resources();
                true
            }
            None => false,
        }
    }

    /// Route a pointer press the way the play screen does. Ignored until
    /// the session is unlocked.
    pub fn pointer_down(&mut self, point: ScreenPoint, picker: &dyn ScenePicker) -> SimResult<()> {
        if !self.unlocked {
            return Ok(());
        }
        if self.raid.is_active() {
            self.register_hit();
            return Ok(());
        }
        if let Some(id) = picker.resolve_building_at(point) {
            self.upgrade(&id)?;
            return Ok(());
        }
        self.place_at(point, picker)?;
        Ok(())
    }

    // ── Persistence ────────────────────────────────────────────

    /// Encode the current state and overwrite the save slot.
    pub fn save(&mut self) -> SimResult<SaveBlob> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let blob = snapshot::encode(&self.ledger, &self.buildings, &self.tide, timestamp);
        let json = blob.to_json()?;
        self.store.write_slot(&self.config.save_slot, &json, timestamp)?;

        log::info!(
            "saved {} buildings to slot '{}'",
            blob.buildings.len(),
            self.config.save_slot
        );
        self.emit(GameEvent::GameSaved {
            slot: self.config.save_slot.clone(),
            timestamp,
        });
        Ok(blob)
    }

    /// Replace all state with the save slot's contents. On any error the
    /// current state is left as it was.
    pub fn load(&mut self) -> SimResult<()> {
        let slot = self.config.save_slot.clone();
        let raw = self
            .store
            .read_slot(&slot)?
            .ok_or_else(|| SimError::NoSavedState { slot: slot.clone() })?;
        let restored = snapshot::decode(&SaveBlob::from_json(&raw)?)?;
        self.restore(restored);

        log::info!("loaded {} buildings from slot '{slot}'", self.buildings.len());
        self.emit(GameEvent::GameLoaded {
            slot,
            building_count: self.buildings.len(),
        });
        Ok(())
    }

    /// Swap in decoded state wholesale. The tide timer keeps its phase.
    fn restore(&mut self, restored: snapshot::RestoredState) {
        let old = std::mem::replace(&mut self.buildings, restored.buildings);
        for b in old.iter() {
            self.emit(GameEvent::BuildingRemoved { id: b.id.clone() });
        }

        self.ledger = restored.ledger;
        self.tide = restored.tide;

        let placed: Vec<GameEvent> = self
            .buildings
            .iter()
            .map(|b| GameEvent::BuildingPlaced {
                id:            b.id.clone(),
                building_type: b.building_type,
                level:         b.level,
                position:      b.position,
            })
            .collect();
        for event in placed {
            self.emit(event);
        }

        self.emit(GameEvent::TideChanged { label: self.tide.label() });
        self.recalculate_rate();
        self.notify_resources();
    }

    // ── Commands ───────────────────────────────────────────────

    /// Apply a player intent. Recoverable rejections become a `Notice`
    /// and return Ok; only infrastructure failures are returned as errors.
    pub fn handle_command(
        &mut self,
        command: PlayerCommand,
        picker: &dyn ScenePicker,
    ) -> SimResult<()> {
        let result = match command {
            PlayerCommand::Unlock => {
                self.unlock();
                Ok(())
            }
            PlayerCommand::OpenGame => {
                self.open_game();
                Ok(())
            }
            PlayerCommand::SelectBuildType { building_type } => {
                self.select_build_type(building_type);
                Ok(())
            }
            PlayerCommand::RequestPlacement { point } => self.place_at(point, picker).map(|_| ()),
            PlayerCommand::RequestUpgrade { id } => self.upgrade(&id).map(|_| ()),
            PlayerCommand::RequestRemoveLast => {
                self.remove_most_recent();
                Ok(())
            }
            PlayerCommand::RequestRaidStart => {
                self.start_raid();
                Ok(())
            }
            PlayerCommand::RequestRaidHit => {
                self.register_hit();
                Ok(())
            }
            PlayerCommand::RequestSave => self.save().map(|_| ()),
            PlayerCommand::RequestLoad => self.load(),
            PlayerCommand::PointerDown { point } => self.pointer_down(point, picker),
        };

        match result {
            Err(e) if e.is_recoverable() => {
                log::warn!("command rejected: {e}");
                self.emit(GameEvent::Notice { message: e.to_string() });
                Ok(())
            }
            other => other,
        }
    }

    // ── Time ───────────────────────────────────────────────────

    /// Let `ms` of real time pass, firing every task that falls due.
    /// Spans longer than `MAX_ADVANCE_MS` are clamped to it.
    pub fn advance(&mut self, ms: Millis) {
        let span = ms.min(MAX_ADVANCE_MS);
        if span < ms {
            log::warn!("advance of {ms}ms clamped to {span}ms");
        }
        let target = self.now().saturating_add(span);
        while let Some(task) = self.scheduler.pop_due(target) {
            self.clock.set_now(task.at);
            self.fire(task);
        }
        self.clock.set_now(target);
    }

    fn fire(&mut self, task: FiredTask) {
        match task.kind {
            TaskKind::IdleAccrual | TaskKind::OpenAccrual => {
                let amount = GameClock::accrual_for(task.kind, self.ledger.rate());
                if amount > 0.0 {
                    self.ledger.credit(amount);
                    self.notify_resources();
                }
            }
            TaskKind::TideTurn => {
                debug_assert_eq!(task.handle, self.tide_task);
                let label = self.tide.advance();
                log::debug!("tide turned to {label} at {}ms", task.at);
                self.emit(GameEvent::TideChanged { label });
                self.recalculate_rate();
            }
            TaskKind::RaidExpiryPoll => {
                let outcome = self.raid.poll(
                    &mut self.scheduler,
                    &mut self.ledger,
                    &self.config.raid,
                    self.buildings.len(),
                    task.at,
                );
                if let Some(outcome) = outcome {
                    log::info!("raid finished: score={} reward={}", outcome.score, outcome.reward);
                    self.emit(GameEvent::RaidEnded {
                        score:  outcome.score,
                        reward: outcome.reward,
                    });
                    self.notify_resources();
                }
            }
        }
    }

    // ── Internals ──────────────────────────────────────────────

    fn recalculate_rate(&mut self) {
        let rate = accrual_rate(
            &self.buildings,
            self.tide.label(),
            &self.config.rates,
            &self.config.tide,
        );
        self.ledger.set_rate(rate);
        log::debug!("rate={rate:.4} tide={}", self.tide.label());
        self.emit(GameEvent::RateChanged { rate });
    }

    fn notify_resources(&mut self) {
        self.emit(GameEvent::ResourceChanged { amount: self.ledger.current() });
    }

    fn emit(&mut self, event: GameEvent) {
        self.collaborators.dispatch(&event);
        self.events.push(TimedEvent { at: self.clock.now(), event });
    }
}
