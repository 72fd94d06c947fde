//! Boundaries to the presentation layer: rendering, picking, display,
//! and audio. The core never reads anything back from a sink.

use crate::{
    buildings::{BuildingType, VisualHint},
    event::GameEvent,
    tide::TideLabel,
    types::{BuildingId, GridPos, GroundPoint, ScreenPoint},
};

pub trait RenderSink {
    fn on_building_placed(&mut self, id: &str, building_type: BuildingType, level: i32, position: GridPos);
    fn on_building_upgraded(&mut self, id: &str, new_level: i32, hint: VisualHint);
    fn on_building_removed(&mut self, id: &str);
    /// Camera focus while a raid runs.
    fn on_raid_focus(&mut self, _active: bool) {}
}

pub trait DisplaySink {
    fn on_resource_changed(&mut self, amount: f64);
    fn on_rate_changed(&mut self, rate: f64);
    fn on_tide_changed(&mut self, label: TideLabel);
    fn on_raid_ended(&mut self, score: u64, reward: u64);
    fn on_notice(&mut self, _message: &str) {}
}

pub trait AudioSink {
    fn start_ambient(&mut self);
    fn stop_ambient(&mut self) {}
}

/// Resolves screen points against the scene.
pub trait ScenePicker {
    fn resolve_ground_position(&self, point: ScreenPoint) -> Option<GroundPoint>;
    fn resolve_building_at(&self, point: ScreenPoint) -> Option<BuildingId>;
}

/// A picker for callers without a scene: nothing is ever under the pointer.
pub struct NoScene;

impl ScenePicker for NoScene {
    fn resolve_ground_position(&self, _point: ScreenPoint) -> Option<GroundPoint> {
        None
    }

    fn resolve_building_at(&self, _point: ScreenPoint) -> Option<BuildingId> {
        None
    }
}

#[derive(Default)]
pub struct Collaborators {
    render:  Vec<Box<dyn RenderSink>>,
    display: Vec<Box<dyn DisplaySink>>,
    audio:   Vec<Box<dyn AudioSink>>,
}

impl Collaborators {
    pub fn add_render(&mut self, sink: Box<dyn RenderSink>) {
        self.render.push(sink);
    }

    pub fn add_display(&mut self, sink: Box<dyn DisplaySink>) {
        self.display.push(sink);
    }

    pub fn add_audio(&mut self, sink: Box<dyn AudioSink>) {
        self.audio.push(sink);
    }

    pub fn dispatch(&mut self, event: &GameEvent) {
        match event {
            GameEvent::BuildingPlaced { id, building_type, level, position } => {
                for r in &mut self.render {
                    r.on_building_placed(id, *building_type, *level, *position);
                }
            }
            GameEvent::BuildingUpgraded { id, new_level, hint } => {
                for r in &mut self.render {
                    r.on_building_upgraded(id, *new_level, *hint);
                }
            }
            GameEvent::BuildingRemoved { id } => {
                for r in &mut self.render {
                    r.on_building_removed(id);
                }
            }
            GameEvent::ResourceChanged { amount } => {
                for d in &mut self.display {
                    d.on_resource_changed(*amount);
                }
            }
            GameEvent::RateChanged { rate } => {
                for d in &mut self.display {
                    d.on_rate_changed(*rate);
                }
            }
            GameEvent::TideChanged { label } => {
                for d in &mut self.display {
                    d.on_tide_changed(*label);
                }
            }
            GameEvent::RaidStarted { .. } => {
                for r in &mut self.render {
                    r.on_raid_focus(true);
                }
            }
            GameEvent::RaidEnded { score, reward } => {
                for d in &mut self.display {
                    d.on_raid_ended(*score, *reward);
                }
                for r in &mut self.render {
                    r.on_raid_focus(false);
                }
            }
            GameEvent::AmbientStarted => {
                for a in &mut self.audio {
                    a.start_ambient();
                }
            }
            GameEvent::AmbientStopped => {
                for a in &mut self.audio {
                    a.stop_ambient();
                }
            }
            GameEvent::GameSaved { .. } => self.notice("Saved!"),
            GameEvent::GameLoaded { .. } => self.notice("Loaded save"),
            GameEvent::Notice { message } => self.notice(message),
            GameEvent::RaidHit { .. } | GameEvent::GameOpened => {}
        }
    }

    fn notice(&mut self, message: &str) {
        for d in &mut self.display {
            d.on_notice(message);
        }
    }
}
