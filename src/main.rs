//! Playforge headless player.
//!
//! Loads a project document, runs it for a fixed number of ticks without a
//! window, and optionally prints the final snapshot as JSON. Useful for
//! checking a game's logic from the command line or in CI.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- game.json --room level1 --ticks 600 --hold ArrowRight --dump
//! ```

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info};

use playforge::events::sound::SoundCmd;
use playforge::gameloop::{FrameSink, GameLoop};
use playforge::project::Project;
use playforge::resources::runtimeconfig::RuntimeConfig;
use playforge::resources::toast::Toast;
use playforge::runtime::{Runtime, Snapshot};

/// Playforge headless runtime
#[derive(Parser)]
#[command(version, about = "Runs a Playforge project document without a window.")]
struct Cli {
    /// Project document (JSON).
    project: PathBuf,

    /// Room to start in. Defaults to the first room of the project.
    #[arg(long)]
    room: Option<String>,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// INI configuration file (default: ./playforge.ini, if present).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Keys held down for the whole run. Repeatable.
    #[arg(long = "hold", value_name = "KEY")]
    hold: Vec<String>,

    /// Print the final snapshot as JSON.
    #[arg(long)]
    dump: bool,
}

/// Logs what a renderer and mixer would receive.
#[derive(Default)]
struct LogSink {
    /// Active toast seen in the previous frame.
    shown: Option<Toast>,
}

impl LogSink {
    /// Text of the toast that became active since the previous frame.
    fn new_toast(&mut self, snapshot: &Snapshot) -> Option<String> {
        let active = snapshot.toast.active();
        let is_new = match (active, &self.shown) {
            (Some(now), Some(before)) => {
                now.text != before.text || now.remaining_ms > before.remaining_ms
            }
            (Some(_), None) => true,
            (None, _) => false,
        };
        self.shown = active.cloned();
        if is_new { active.map(|t| t.text.clone()) } else { None }
    }
}

impl FrameSink for LogSink {
    fn draw(&mut self, snapshot: &Snapshot) {
        debug!(
            "frame {}: {} instances, score {}",
            snapshot.frame,
            snapshot.instances.len(),
            snapshot.score
        );
        if let Some(text) = self.new_toast(snapshot) {
            info!("Toast: {}", text);
        }
    }

    fn play(&mut self, sound: &SoundCmd) {
        info!("Sound: {}", sound.sound_id);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::with_path(path),
        None => RuntimeConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        if cli.config.is_some() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        debug!("No config file loaded, using defaults: {e}");
    }
    let tick_ms = config.tick_ms;

    let project = match Project::load(&cli.project) {
        Ok(project) => project,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let Some(room_id) = cli
        .room
        .clone()
        .or_else(|| project.rooms.first().map(|r| r.id.clone()))
    else {
        eprintln!("Error: project has no rooms");
        std::process::exit(1);
    };

    let mut runtime = Runtime::new(config);
    if let Err(e) = runtime.start(&project, &room_id) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    for key in &cli.hold {
        runtime.key_down(key);
    }

    let mut game = GameLoop::new(runtime);
    let mut sink = LogSink::default();
    let mut ran = 0;
    while ran < cli.ticks && game.runtime().state().is_live() {
        match game.frame(tick_ms, &mut sink) {
            Ok(0) => break,
            Ok(n) => ran += n,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }

    let mut runtime = game.into_runtime();
    let snapshot = runtime.snapshot();
    info!(
        "Ran {} ticks: state {:?}, score {}, {} instances",
        ran,
        snapshot.state,
        snapshot.score,
        snapshot.instances.len()
    );
    if let Some(message) = &snapshot.ended {
        info!("Game over: {}", message);
    }
    if cli.dump {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }
}
