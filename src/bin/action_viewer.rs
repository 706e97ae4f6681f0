//! Live action viewer.
//!
//! Plays an event log (or a seeded random stream) into a scene and draws
//! the beams with wgpu.
//! Controls:
//!   WASD / Arrow keys: Pan camera
//!   +/-: Zoom in/out
//!   Mouse wheel: Zoom toward cursor
//!   F: Fit camera to the scene
//!   Space: Pause
//!   Escape: Quit

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use glam::Vec2;
use winit::{
    event::{ElementState, Event, MouseScrollDelta, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

use actionviz::audio::{AudioBackend, AudioEngine, RawFileBackend};
use actionviz::core::config::{set_config, VisConfig};
use actionviz::renderer::{BeamBlend, CameraState, QuadBatch, Renderer};
use actionviz::scene::log::{load_log, LogEntry};
use actionviz::scene::synthetic::SyntheticLog;
use actionviz::scene::Scene;

/// Animated actor-to-file action beams
#[derive(Parser, Debug)]
#[command(name = "action_viewer")]
#[command(about = "Watch actions flow from actors to files")]
struct Args {
    /// Custom event log (timestamp|user|A/M/D|path[|RRGGBB]); random events if omitted
    #[arg(long)]
    log: Option<PathBuf>,

    /// TOML config overriding the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log seconds played per real second
    #[arg(long, default_value_t = 60.0)]
    speed: f64,

    /// Random seed for the synthetic event stream
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Distinct users in the synthetic stream
    #[arg(long, default_value_t = 4)]
    users: usize,

    /// Write cue audio as raw f32 PCM to this file instead of the speakers
    #[arg(long)]
    audio_out: Option<PathBuf>,

    /// Disable audio cues entirely
    #[arg(long)]
    mute: bool,
}

#[cfg(feature = "device-audio")]
fn speaker_backend() -> Box<dyn AudioBackend> {
    Box::new(actionviz::audio::DeviceBackend::new())
}

#[cfg(not(feature = "device-audio"))]
fn speaker_backend() -> Box<dyn AudioBackend> {
    tracing::info!("built without device-audio; cues are silent unless --audio-out is given");
    Box::new(actionviz::audio::NullBackend)
}

/// Entries waiting to be recorded, from a file or generated on demand.
enum Feed {
    Log(VecDeque<LogEntry>),
    Synthetic { log: SyntheticLog, next: LogEntry },
}

impl Feed {
    /// Pop every entry due by `log_time`.
    fn due(&mut self, log_time: i64) -> Vec<LogEntry> {
        let mut due = Vec::new();
        match self {
            Feed::Log(entries) => {
                while entries.front().is_some_and(|e| e.timestamp <= log_time) {
                    if let Some(entry) = entries.pop_front() {
                        due.push(entry);
                    }
                }
            }
            Feed::Synthetic { log, next } => {
                while next.timestamp <= log_time {
                    due.push(std::mem::replace(next, log.next_entry()));
                }
            }
        }
        due
    }

    fn start_time(&self) -> i64 {
        match self {
            Feed::Log(entries) => entries.front().map_or(0, |e| e.timestamp),
            Feed::Synthetic { next, .. } => next.timestamp,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => VisConfig::load_from_toml(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config {}: {}, using defaults", path.display(), e);
            VisConfig::default()
        }),
        None => VisConfig::default(),
    };
    if args.mute {
        config.audio.enabled = false;
    }
    if set_config(config.clone()).is_err() {
        tracing::warn!("Global config already set");
    }

    let mut feed = match &args.log {
        Some(path) => Feed::Log(load_log(path).expect("Failed to load event log").into()),
        None => {
            let mut log = SyntheticLog::new(args.seed, args.users);
            let next = log.next_entry();
            Feed::Synthetic { log, next }
        }
    };

    let backend: Box<dyn AudioBackend> = match &args.audio_out {
        Some(path) => Box::new(RawFileBackend::new(path)),
        None => speaker_backend(),
    };
    let (audio, cues) = AudioEngine::start_or_disabled(&config.audio, backend);
    let blend = BeamBlend::from_additive(config.scene.additive_beams);
    let mut scene = Scene::with_config(config).with_cues(cues);

    tracing::info!("Starting action viewer");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("actionviz")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
            .build(&event_loop)
            .expect("Failed to create window"),
    );

    let mut renderer = pollster::block_on(Renderer::new(window.clone(), blend))
        .expect("Failed to create renderer");
    let (width, height) = renderer.size();
    let mut camera = CameraState::new(width as f32, height as f32);
    let mut batch = QuadBatch::with_capacity(4096);

    let mut log_time = feed.start_time() as f64;
    let mut last_frame = Instant::now();
    let mut last_title = Instant::now();
    let mut cursor = Vec2::ZERO;
    let mut paused = false;
    let mut fitted = false;
    let mut audio = audio;

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),

                WindowEvent::Resized(size) => {
                    renderer.resize(size.width, size.height);
                    camera.set_viewport_size(size.width as f32, size.height as f32);
                }

                WindowEvent::CursorMoved { position, .. } => {
                    cursor = Vec2::new(position.x as f32, position.y as f32);
                }

                WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                    let pan_speed = 20.0 * camera.zoom;
                    let centre = camera.viewport_size / 2.0;
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::KeyW | KeyCode::ArrowUp) => {
                            camera.pan(Vec2::new(0.0, pan_speed))
                        }
                        PhysicalKey::Code(KeyCode::KeyS | KeyCode::ArrowDown) => {
                            camera.pan(Vec2::new(0.0, -pan_speed))
                        }
                        PhysicalKey::Code(KeyCode::KeyA | KeyCode::ArrowLeft) => {
                            camera.pan(Vec2::new(-pan_speed, 0.0))
                        }
                        PhysicalKey::Code(KeyCode::KeyD | KeyCode::ArrowRight) => {
                            camera.pan(Vec2::new(pan_speed, 0.0))
                        }
                        PhysicalKey::Code(KeyCode::Equal | KeyCode::NumpadAdd) => {
                            camera.zoom_toward(centre, 0.9)
                        }
                        PhysicalKey::Code(KeyCode::Minus | KeyCode::NumpadSubtract) => {
                            camera.zoom_toward(centre, 1.1)
                        }
                        PhysicalKey::Code(KeyCode::KeyF) => {
                            if let Some((min, max)) = scene.bounds() {
                                camera.fit(min, max, 40.0);
                            }
                        }
                        PhysicalKey::Code(KeyCode::Space) => paused = !paused,
                        PhysicalKey::Code(KeyCode::Escape) => elwt.exit(),
                        _ => {}
                    }
                }

                WindowEvent::MouseWheel { delta, .. } => {
                    let factor = match delta {
                        MouseScrollDelta::LineDelta(_, y) => {
                            if y > 0.0 { 0.9 } else { 1.1 }
                        }
                        MouseScrollDelta::PixelDelta(pos) => {
                            if pos.y > 0.0 { 0.95 } else { 1.05 }
                        }
                    };
                    camera.zoom_toward(cursor, factor);
                }

                WindowEvent::RedrawRequested => {
                    let dt = last_frame.elapsed().as_secs_f32();
                    last_frame = Instant::now();

                    if !paused {
                        log_time += dt as f64 * args.speed;
                        for entry in feed.due(log_time as i64) {
                            if let Err(e) = scene.record(&entry) {
                                tracing::warn!("Skipping entry {:?}: {}", entry.path, e);
                            }
                        }
                        scene.step(dt);
                    }

                    if !fitted {
                        if let Some((min, max)) = scene.bounds() {
                            camera.fit(min, max, 40.0);
                            fitted = scene.registry().actor_count() > 1;
                        }
                    }

                    batch.clear();
                    scene.emit_geometry(&mut batch);

                    match renderer.render(&camera, &batch) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            tracing::error!("Out of GPU memory!");
                            elwt.exit();
                        }
                        Err(e) => tracing::warn!("Render error: {:?}", e),
                    }

                    if last_title.elapsed().as_secs_f32() >= 1.0 {
                        last_title = Instant::now();
                        let stats = scene.stats();
                        let metrics = renderer.metrics();
                        window.set_title(&format!(
                            "actionviz - {} actors | {} files | {} actions | {:.1} FPS ({:.2}ms) | {} quads",
                            stats.actors,
                            stats.files,
                            stats.live_actions,
                            metrics.fps(),
                            metrics.avg_frame_time_ms(),
                            metrics.quad_count,
                        ));
                    }
                }

                _ => {}
            },

            Event::AboutToWait => window.request_redraw(),

            Event::LoopExiting => {
                if let Some(engine) = audio.take() {
                    let stats = engine.shutdown();
                    tracing::info!(played = stats.played, "Audio shut down");
                }
            }

            _ => {}
        })
        .expect("Event loop error");
}
