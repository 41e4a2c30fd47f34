// Framebuffer Pipeline - Main Entry Point
//
// Runs the pipeline in the scheduler for a number of frames, optionally
// drawing a demo pattern, capturing frames and exporting a signal trace.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fbpipe::debug::{LogFilter, SignalLog};
use fbpipe::draw::{self, Line};
use fbpipe::pipeline::WriteRequest;
use fbpipe::sim::{save_capture, AppConfig, Scheduler};

/// Demo patterns drawn through the write pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Demo {
    /// Border, diagonals and a filled block
    Shapes,
    /// One vertical bar per colour index
    Bars,
    /// Lines that run off every edge
    Clipping,
}

#[derive(Debug, Parser)]
#[command(name = "fbpipe-rs")]
#[command(about = "Cycle-stepped indexed-colour framebuffer pipeline", long_about = None)]
struct Cli {
    /// Configuration file (TOML); defaults are used when missing
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 2)]
    frames: usize,

    /// Draw a demo pattern before the first frame
    #[arg(short, long, value_enum)]
    draw: Option<Demo>,

    /// Save every completed frame as PNG
    #[arg(long)]
    capture: bool,

    /// Export pipeline events as JSON to this file
    #[arg(long, value_name = "JSON")]
    trace: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => AppConfig::default(),
    };

    let mut scheduler = Scheduler::from_config(&config).context("failed to build pipeline")?;
    if cli.trace.is_some() {
        scheduler.attach_signal_log(SignalLog::new());
    }

    if let Some(demo) = cli.draw {
        let requests = demo_writes(demo, &config);
        info!(demo = ?demo, writes = requests.len(), "drawing demo");
        scheduler.queue_writes(requests);
    }

    for frame in scheduler.run_frames(cli.frames) {
        if cli.capture {
            save_capture(
                &frame,
                &config.sim.capture_directory,
                config.sim.include_timestamp,
            )
            .context("failed to save capture")?;
        }
    }

    info!(
        frames = scheduler.frames_completed(),
        writes = scheduler.writes_landed(),
        clipped = scheduler.clips(),
        pending = scheduler.pending_writes(),
        "run finished"
    );

    if let Some(path) = &cli.trace {
        if let Some(log) = scheduler.take_signal_log() {
            log.export_json(path, Some(&LogFilter::all()))
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), events = log.len(), "trace exported");
        }
    }

    Ok(())
}

/// Write requests for a demo pattern
fn demo_writes(demo: Demo, config: &AppConfig) -> Vec<WriteRequest> {
    let w = config.pipeline.width as i32;
    let h = config.pipeline.height as i32;
    let top = (config.pipeline.palette_entries() - 1) as u16;

    match demo {
        Demo::Shapes => {
            let mut requests: Vec<WriteRequest> =
                draw::writes(draw::rect(0, 0, w, h), top).collect();
            requests.extend(draw::writes(Line::new(0, 0, w - 1, h - 1), top / 2 + 1));
            requests.extend(draw::writes(Line::new(w - 1, 0, 0, h - 1), top / 2 + 1));
            requests.extend(draw::writes(draw::fill_rect(w / 4, h / 4, w / 4, h / 4), top / 3 + 1));
            requests
        }
        Demo::Bars => {
            let colours = config.pipeline.palette_entries() as i32;
            let bar = (w / colours).max(1);
            (0..colours)
                .flat_map(|i| draw::writes(draw::fill_rect(i * bar, 0, bar, h), i as u16))
                .collect()
        }
        Demo::Clipping => {
            let mut requests: Vec<WriteRequest> =
                draw::writes(Line::new(-w / 2, h / 2, w + w / 2, h / 2), top).collect();
            requests.extend(draw::writes(Line::new(w / 2, -h, w / 2, 2 * h), top));
            requests.extend(draw::writes(draw::rect(-2, -2, w + 4, h + 4), top));
            requests
        }
    }
}
