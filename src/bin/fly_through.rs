//! Streaming demo: flies an observer across the endless terrain and logs
//! what the controller streams in and out.
//!
//! Usage: cargo run --release --bin fly_through -- [OPTIONS]
//!
//! Options:
//!   --seed <SEED>    World seed (default: 12345)
//!   --ticks <N>      Simulation ticks (default: 600)
//!   --speed <UNITS>  Observer speed per tick in world units (default: 20)
//!   --jobs <N>       Max parallel worker jobs (default: 4)

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec3;

use terrastream::generation::jobs::BackgroundGenerator;
use terrastream::generation::map::MapGenerator;
use terrastream::streaming::controller::{StreamingConfig, StreamingController};
use terrastream::streaming::sink::{RecordingSink, SinkEvent};

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let args: Vec<String> = std::env::args().collect();
    let seed = parse_u32_arg(&args, "--seed").unwrap_or(12345);
    let ticks = parse_u32_arg(&args, "--ticks").unwrap_or(600);
    let speed = parse_f32_arg(&args, "--speed").unwrap_or(20.0);
    let jobs = parse_usize_arg(&args, "--jobs").unwrap_or(4);

    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build_global()
        .expect("Failed to configure thread pool");

    let config = StreamingConfig::default();
    let workers = Arc::new(BackgroundGenerator::new(
        MapGenerator::with_defaults(seed),
        40.0,
    ));
    let sink = RecordingSink::new();
    let mut controller = StreamingController::new(
        config,
        workers.clone(),
        workers,
        Box::new(sink.clone()),
    )
    .expect("invalid streaming configuration");

    log::info!("flying {} ticks at {} units/tick, seed {}", ticks, speed, seed);

    let start = Instant::now();
    for tick in 0..ticks {
        let t = tick as f32;
        // Mostly straight flight with a slow weave so the window shifts on
        // both axes.
        let position = Vec3::new(t * speed, 0.0, (t * 0.01).sin() * 500.0);
        controller.on_tick(position);

        if tick % 100 == 0 {
            log::info!(
                "tick {:4}: {} chunks registered, {} visible",
                tick,
                controller.chunk_count(),
                controller.visible_count()
            );
        }

        // Stand-in frame pacing; gives workers time to land
        std::thread::sleep(Duration::from_millis(2));
    }

    let events = sink.events();
    let meshes = events
        .iter()
        .filter(|e| matches!(e, SinkEvent::RenderMesh(..)))
        .count();
    let textures = events
        .iter()
        .filter(|e| matches!(e, SinkEvent::Texture(..)))
        .count();
    log::info!(
        "done in {:.1}s: {} chunks, {} mesh adoptions, {} textures",
        start.elapsed().as_secs_f64(),
        controller.chunk_count(),
        meshes,
        textures
    );
}

fn parse_u32_arg(args: &[String], name: &str) -> Option<u32> {
    find_arg(args, name).and_then(|v| v.parse().ok())
}

fn parse_f32_arg(args: &[String], name: &str) -> Option<f32> {
    find_arg(args, name).and_then(|v| v.parse().ok())
}

fn parse_usize_arg(args: &[String], name: &str) -> Option<usize> {
    find_arg(args, name).and_then(|v| v.parse().ok())
}

fn find_arg<'a>(args: &'a [String], name: &str) -> Option<&'a String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
}
