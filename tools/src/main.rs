//! isle-runner: headless runner for the Clash of Isles simulation core.
//!
//! Usage:
//!   isle-runner --seconds 120 --db island.db
//!   isle-runner --data-dir ./data --ipc-mode

use anyhow::Result;
use isles_core::{
    buildings::BuildingType,
    collaborator::ScenePicker,
    command::PlayerCommand,
    config::GameConfig,
    engine::{IslandEngine, MAX_ADVANCE_MS},
    event::TimedEvent,
    rates::format_rate,
    types::{BuildingId, GridPos, GroundPoint, Millis, ScreenPoint},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Advance { ms: Millis },
    Command { command: PlayerCommand },
    Quit,
}

#[derive(serde::Serialize)]
struct UiBuilding {
    id: BuildingId,
    building_type: BuildingType,
    level: i32,
    position: GridPos,
}

#[derive(serde::Serialize)]
struct UiState {
    now_ms: Millis,
    timber: f64,
    rate: String,
    tide: String,
    open: bool,
    raid_active: bool,
    raid_score: Option<u64>,
    buildings: Vec<UiBuilding>,
    events: Vec<TimedEvent>,
}

/// Screen coordinates are taken as ground coordinates. A building is under
/// the pointer when it sits on the snapped cell; the most recent one wins.
struct FlatGround {
    cells: Vec<(GridPos, BuildingId)>,
}

impl FlatGround {
    fn from_engine(engine: &IslandEngine) -> Self {
        Self {
            cells: engine
                .buildings()
                .iter()
                .map(|b| (b.position, b.id.clone()))
                .collect(),
        }
    }
}

impl ScenePicker for FlatGround {
    fn resolve_ground_position(&self, point: ScreenPoint) -> Option<GroundPoint> {
        Some(GroundPoint { x: point.x, z: point.y })
    }

    fn resolve_building_at(&self, point: ScreenPoint) -> Option<BuildingId> {
        let cell = GridPos::snap(GroundPoint { x: point.x, z: point.y });
        self.cells
            .iter()
            .rev()
            .find(|(pos, _)| *pos == cell)
            .map(|(_, id)| id.clone())
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seconds = parse_arg(&args, "--seconds", 120u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str());

    let config = match data_dir {
        Some(dir) => GameConfig::load(dir)?,
        None => GameConfig::default(),
    };

    if !ipc_mode {
        println!("Clash of Isles — isle-runner");
        println!("  seconds:   {seconds}");
        println!("  db:        {db}");
        println!("  data_dir:  {}", data_dir.unwrap_or("(defaults)"));
        println!();
    }

    let mut engine = IslandEngine::build(config, db)?;

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        run_batch(&mut engine, seconds)?;
    }
    engine.shutdown();

    Ok(())
}

fn run_ipc_loop(engine: &mut IslandEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Bad IPC line: {e}");
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Advance { ms } if ms > MAX_ADVANCE_MS => {
                log::warn!("Rejected advance of {ms}ms");
                let err_json = serde_json::json!({
                    "error": format!("advance span {ms}ms exceeds {MAX_ADVANCE_MS}ms"),
                });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
            IpcCommand::Advance { ms } => engine.advance(ms),
            IpcCommand::GetState => {}
            IpcCommand::Command { command } => {
                let picker = FlatGround::from_engine(engine);
                engine.handle_command(command, &picker)?;
            }
        }
        let state = build_ui_state(engine);
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

/// Scripted session: open the game, build a small village, run a raid,
/// and let the island idle for `seconds`.
fn run_batch(engine: &mut IslandEngine, seconds: u64) -> Result<()> {
    let script = [
        PlayerCommand::Unlock,
        PlayerCommand::OpenGame,
        PlayerCommand::RequestPlacement { point: ScreenPoint { x: 0.0, y: 0.0 } },
        PlayerCommand::RequestPlacement { point: ScreenPoint { x: 2.0, y: 0.0 } },
        PlayerCommand::SelectBuildType { building_type: BuildingType::Mill },
        PlayerCommand::RequestPlacement { point: ScreenPoint { x: 0.0, y: 2.0 } },
    ];
    for command in script {
        let picker = FlatGround::from_engine(engine);
        engine.handle_command(command, &picker)?;
    }

    engine.start_raid();
    for _ in 0..5 {
        engine.register_hit();
    }

    for _ in 0..seconds {
        engine.advance(1_000);
    }
    engine.save()?;

    print_summary(engine, seconds);
    Ok(())
}

fn build_ui_state(engine: &mut IslandEngine) -> UiState {
    UiState {
        now_ms: engine.now(),
        timber: engine.timber().floor(),
        rate: format_rate(engine.rate()),
        tide: engine.tide().to_string(),
        open: engine.is_open(),
        raid_active: engine.raid().is_active(),
        raid_score: engine.raid().score(),
        buildings: engine
            .buildings()
            .iter()
            .map(|b| UiBuilding {
                id: b.id.clone(),
                building_type: b.building_type,
                level: b.level,
                position: b.position,
            })
            .collect(),
        events: engine.drain_events(),
    }
}

fn print_summary(engine: &mut IslandEngine, seconds: u64) {
    let events = engine.drain_events();
    let notices: Vec<&TimedEvent> = events
        .iter()
        .filter(|e| e.event.type_name() == "notice")
        .collect();

    println!("=== RUN SUMMARY ===");
    println!("  seconds run:    {seconds}");
    println!("  final time:     {}ms", engine.now());
    println!("  timber:         {}", engine.timber().floor());
    println!("  rate:           {}", format_rate(engine.rate()));
    println!("  tide:           {}", engine.tide());
    println!("  buildings:      {}", engine.buildings().len());
    println!("  events:         {}", events.len());
    println!("  notices:        {}", notices.len());
    for n in notices {
        println!("    {:>8}ms  {}", n.at, serde_json::to_string(&n.event).unwrap_or_default());
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
