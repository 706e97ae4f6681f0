//! Integration tests for the scene layer
//!
//! These replay small event logs end to end:
//! - Log text -> entries -> actions -> completion
//! - Removal and purge of deleted files
//! - Cues reaching a real audio engine
//! - Geometry batching for the renderer

use actionviz::audio::{AudioEngine, CaptureBackend};
use actionviz::core::config::VisConfig;
use actionviz::entity::ActionTarget;
use actionviz::renderer::quads::QuadBatch;
use actionviz::scene::log::parse_log;
use actionviz::scene::synthetic::SyntheticLog;
use actionviz::scene::Scene;

const LOG: &str = "\
# timestamp|user|type|path
100|alice|A|src/main.rs
101|alice|A|src/lib.rs|3366FF
105|bob|M|src/lib.rs
110|bob|D|src/main.rs
";

fn run_to_idle(scene: &mut Scene, dt: f32) -> u32 {
    let mut ticks = 0;
    while !scene.is_idle() {
        scene.step(dt);
        ticks += 1;
        assert!(ticks < 10_000, "scene never settled");
    }
    ticks
}

#[test]
fn test_log_replay_end_to_end() {
    let entries = parse_log(LOG).unwrap();
    assert_eq!(entries.len(), 4);

    let mut scene = Scene::new();
    for entry in &entries {
        scene.record(entry).unwrap();
    }
    assert_eq!(scene.stats().actors, 2);
    assert_eq!(scene.stats().files, 2);

    run_to_idle(&mut scene, 0.1);

    let stats = scene.stats();
    assert_eq!(stats.scheduled, 4);
    assert_eq!(stats.completed, 4);
    assert_eq!(stats.purged, 1);
    assert_eq!(scene.registry().find_file("src/main.rs"), None);

    let lib = scene.registry().find_file("src/lib.rs").unwrap();
    let lib = scene.registry().file(lib).unwrap();
    assert_eq!(lib.touch_count, 1);
    assert_eq!(lib.last_touched, Some(105));
    assert!(!lib.is_removed());
    assert!((lib.size() - 8.0).abs() < f32::EPSILON);
}

#[test]
fn test_cues_reach_audio_engine() {
    let config = VisConfig::default();
    let capture = CaptureBackend::new();
    let engine = AudioEngine::start(&config.audio, Box::new(capture.clone())).unwrap();

    let mut scene = Scene::with_config(config).with_cues(engine.trigger());
    for entry in parse_log(LOG).unwrap() {
        scene.record(&entry).unwrap();
    }
    run_to_idle(&mut scene, 0.1);
    drop(scene);

    let stats = engine.shutdown();
    assert_eq!(stats.played, 4);
    assert_eq!(capture.cue_count(), 4);
}

#[test]
fn test_faster_base_rate_from_config() {
    let slow = {
        let mut scene = Scene::new();
        for entry in parse_log(LOG).unwrap() {
            scene.record(&entry).unwrap();
        }
        run_to_idle(&mut scene, 0.1)
    };

    let config = VisConfig::parse_toml("[action]\nbase_rate = 2.0\n").unwrap();
    let fast = {
        let mut scene = Scene::with_config(config);
        for entry in parse_log(LOG).unwrap() {
            scene.record(&entry).unwrap();
        }
        run_to_idle(&mut scene, 0.1)
    };

    assert!(fast < slow);
}

#[test]
fn test_synthetic_stream_settles_and_batches() {
    let mut scene = Scene::new();
    for entry in SyntheticLog::new(3, 4).take(300) {
        scene.record(&entry).unwrap();
    }
    scene.step(0.05);

    let mut batch = QuadBatch::with_capacity(1024);
    scene.emit_geometry(&mut batch);
    let stats = scene.stats();
    assert!(batch.quad_count() >= stats.live_actions + stats.actors);
    assert_eq!(batch.indices().len(), batch.quad_count() * 6);
    assert!(batch.vertices().iter().all(|v| v.is_finite()));

    run_to_idle(&mut scene, 0.05);
    assert_eq!(scene.stats().scheduled, 300);
    assert_eq!(scene.stats().completed + scene.stats().dropped, 300);

    let json = serde_json::to_string(&batch).unwrap();
    assert!(json.contains("\"vertices\""));
}
