//! Headless double-buffer render test.
//!
//! Runs the scene for a number of ticks with scripted key presses, then logs
//! how long full and double-buffered refreshes took.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use serde::Serialize;

use tilestack_core::DrawCommand;
use tilestack_renderer::{MapRefreshReport, MapSettings};

mod input;
mod registry;
mod scene;
mod tracer;

use input::{FrameContext, KeyScript};
use registry::SpriteRegistry;
use scene::{DoubleBufferScene, ModeTimings, TickResult, DEFAULT_SCENE_TIMER};

#[derive(Parser, Debug)]
#[command(
    name = "tilestack-demo",
    version,
    about = "Compare full and double-buffered layer re-rendering"
)]
struct Args {
    /// Ticks before the scene finishes
    #[arg(long, default_value_t = DEFAULT_SCENE_TIMER)]
    ticks: u64,

    /// Key-up events as `tick:key` pairs, e.g. `600:x,1200:x,1800:z`
    #[arg(long, value_name = "SCRIPT", default_value = "1200:x,2400:x")]
    keys: KeyScript,

    /// Seed for choosing which sprite changes each tick
    #[arg(long)]
    seed: Option<u64>,

    /// Map settings JSON file
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Save the final composite as a PNG
    #[arg(long, value_name = "FILE")]
    png: Option<PathBuf>,

    /// Write the timing summary, last refresh report and status labels as JSON
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Serialize)]
struct RunReport<'a> {
    ticks: u64,
    timings: &'a ModeTimings,
    last_refresh: Option<&'a MapRefreshReport>,
    hud: &'a [DrawCommand],
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();

    let settings = match &args.settings {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            MapSettings::from_json(&json).with_context(|| format!("invalid settings in {}", path.display()))?
        }
        None => MapSettings::default(),
    };

    let registry = SpriteRegistry::with_defaults();
    let mut scene = DoubleBufferScene::new(settings, &registry, args.seed)?;
    scene.prepare_scene(args.ticks);

    let mut ticks = 0;
    let mut framerate = 0.0;
    loop {
        let started = Instant::now();
        let ctx = FrameContext {
            tick: ticks,
            key_up: args.keys.keys_at(ticks),
            framerate,
        };
        let result = scene.perform_tick(&ctx)?;
        ticks += 1;

        let elapsed = started.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            framerate = 1.0 / elapsed;
        }
        if result == TickResult::Finished {
            break;
        }
    }

    let timings = scene.timings();
    log::info!(
        "full re-render: {} refreshes, {:.3} ms mean",
        timings.full.refreshes,
        timings.full.mean_ms()
    );
    log::info!(
        "double buffered re-render: {} refreshes, {:.3} ms mean",
        timings.double_buffered.refreshes,
        timings.double_buffered.mean_ms()
    );

    if let Some(path) = &args.png {
        let canvas = scene.map.composite()?;
        canvas
            .save_png(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("saved composite to {}", path.display());
    }

    if let Some(path) = &args.report {
        let report = RunReport {
            ticks,
            timings,
            last_refresh: scene.last_report(),
            hud: scene.hud_commands(),
        };
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("saved report to {}", path.display());
    }

    Ok(())
}
