//! Headless action replay.
//!
//! Steps a scene at a fixed dt until every event has played out, then
//! prints a JSON summary. Useful for checking logs and timing without a GPU.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use actionviz::audio::{AudioEngine, EngineStats, NullBackend};
use actionviz::core::config::VisConfig;
use actionviz::renderer::QuadBatch;
use actionviz::scene::log::load_log;
use actionviz::scene::synthetic::SyntheticLog;
use actionviz::scene::{Scene, SceneStats};

/// Headless replay of an event log
#[derive(Parser, Debug)]
#[command(name = "action_replay")]
#[command(about = "Replay an event log without a window and report what happened")]
struct Args {
    /// Custom event log; a seeded random stream if omitted
    #[arg(long)]
    log: Option<PathBuf>,

    /// TOML config overriding the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for the synthetic stream
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of synthetic events
    #[arg(long, default_value_t = 500)]
    events: usize,

    /// Simulation step in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Log seconds played per simulated second
    #[arg(long, default_value_t = 60.0)]
    speed: f64,

    /// Stop after this many ticks even if actions remain
    #[arg(long, default_value_t = 1_000_000)]
    max_ticks: u64,

    /// Write the final frame's quad batch as JSON
    #[arg(long)]
    dump_json: Option<PathBuf>,
}

#[derive(Serialize)]
struct ReplaySummary {
    events: usize,
    skipped_events: usize,
    ticks: u64,
    simulated_seconds: f64,
    scene: SceneStats,
    cues_played: usize,
    cues_dropped: usize,
    peak_quads: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => VisConfig::load_from_toml(path).expect("Failed to load config"),
        None => VisConfig::default(),
    };

    let entries = match &args.log {
        Some(path) => load_log(path).expect("Failed to load event log"),
        None => SyntheticLog::new(args.seed, 4).take(args.events),
    };

    // The engine counts played cues; the samples themselves are discarded
    let (engine, cues) = AudioEngine::start_or_disabled(&config.audio, Box::new(NullBackend));
    let dropped = cues.clone();
    let mut scene = Scene::with_config(config).with_cues(cues);

    let start = entries.first().map_or(0, |e| e.timestamp) as f64;
    let mut log_time = start;
    let mut next = 0;
    let mut ticks = 0;
    let mut skipped = 0;
    let mut peak_quads = 0;
    let mut batch = QuadBatch::new();

    while ticks < args.max_ticks && (next < entries.len() || !scene.is_idle()) {
        log_time += args.dt as f64 * args.speed;
        while next < entries.len() && entries[next].timestamp as f64 <= log_time {
            if let Err(e) = scene.record(&entries[next]) {
                tracing::warn!("Skipping entry {}: {}", next, e);
                skipped += 1;
            }
            next += 1;
        }
        scene.step(args.dt);
        ticks += 1;

        batch.clear();
        scene.emit_geometry(&mut batch);
        peak_quads = peak_quads.max(batch.quad_count());
    }

    if let Some(path) = &args.dump_json {
        let json = serde_json::to_string_pretty(&batch).expect("Failed to serialize batch");
        std::fs::write(path, json).expect("Failed to write geometry dump");
        tracing::info!("Wrote {} quads to {}", batch.quad_count(), path.display());
    }

    let audio: EngineStats = engine.map(AudioEngine::shutdown).unwrap_or_default();

    let summary = ReplaySummary {
        events: entries.len(),
        skipped_events: skipped,
        ticks,
        simulated_seconds: ticks as f64 * args.dt as f64,
        scene: scene.stats(),
        cues_played: audio.played,
        cues_dropped: dropped.dropped_count(),
        peak_quads,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).expect("Failed to serialize summary")
    );
}
