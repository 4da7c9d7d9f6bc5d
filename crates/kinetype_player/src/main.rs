// SPDX-License-Identifier: MIT OR Apache-2.0
//! Kinetype player - headless timeline driver
//!
//! Replays scripted editing sessions against the keyframe timeline and
//! streams the interpolated parameters of every rendered frame:
//! - Session settings from RON
//! - Timelines loaded from and saved to RON or JSON
//! - Scripted pointer, capture and transport actions
//! - JSON-lines output, one object per frame
//!
//! Logs go to stderr so stdout carries only frame data.

mod renderer;
mod script;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use kinetype_timeline::{Session, SessionConfig, TimelineDocument};
use renderer::JsonLinesRenderer;
use script::Script;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "kinetype", version, about = "Headless Kinetype timeline player")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a script and render frames as JSON lines.
    Run(RunArgs),
    /// Print the interpolated parameters at one frame.
    Sample(SampleArgs),
    /// Write the default session settings.
    InitConfig {
        /// Output RON path.
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Parser, Debug)]
struct SessionArgs {
    /// Session settings (RON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Timeline to start from (RON or JSON).
    #[arg(long)]
    timeline: Option<PathBuf>,

    /// Override the number of frames.
    #[arg(long)]
    total_frames: Option<u32>,

    /// Override the track zoom.
    #[arg(long)]
    zoom: Option<f64>,
}

#[derive(Parser, Debug)]
struct RunArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Script of actions to replay (RON or JSON).
    #[arg(long)]
    script: Option<PathBuf>,

    /// Extra ticks to render after the script, playing from the current playhead.
    #[arg(long, default_value_t = 0)]
    ticks: u32,

    /// Write frames here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Save the resulting timeline (RON or JSON by extension).
    #[arg(long)]
    save: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Frame to evaluate (fractional frames allowed).
    #[arg(long)]
    frame: f64,
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("kinetype_player=info,kinetype_timeline=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting Kinetype player v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(Cli::parse()) {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.cmd {
        Command::Run(args) => run_script(args),
        Command::Sample(args) => sample(args),
        Command::InitConfig { out } => {
            SessionConfig::default()
                .save(&out)
                .with_context(|| format!("writing {}", out.display()))?;
            tracing::info!("Wrote default settings to {}", out.display());
            Ok(())
        }
    }
}

fn open_session(args: &SessionArgs) -> anyhow::Result<Session> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading settings {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(total_frames) = args.total_frames {
        config.total_frames = total_frames;
    }
    if let Some(zoom) = args.zoom {
        config.zoom = zoom;
    }

    let mut session = Session::new(config).context("invalid session settings")?;
    if let Some(path) = &args.timeline {
        let document = TimelineDocument::load(path)
            .with_context(|| format!("loading timeline {}", path.display()))?;
        session.load_document(&document)?;
    }
    Ok(session)
}

fn run_script(args: RunArgs) -> anyhow::Result<()> {
    let mut session = open_session(&args.session)?;
    let script = match &args.script {
        Some(path) => Script::load(path)?,
        None => Script::default(),
    };

    let out: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut renderer = JsonLinesRenderer::new(out, session.config().frame_rate);

    let summary = script.replay(&mut session, &mut renderer);
    if args.ticks > 0 {
        session.play();
        for _ in 0..args.ticks {
            session.tick(&mut renderer);
        }
    }
    let written = renderer.written();
    renderer.finish().context("writing frames")?;

    tracing::info!(
        applied = summary.applied,
        collisions = summary.collisions,
        rejected = summary.rejected,
        frames = written,
        keyframes = session.store().len(),
        "Replay finished"
    );

    if let Some(path) = &args.save {
        save_timeline(&session, path)?;
    }
    Ok(())
}

fn sample(args: SampleArgs) -> anyhow::Result<()> {
    let session = open_session(&args.session)?;
    let parameters = session.evaluate_at(args.frame);
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &parameters)?;
    writeln!(stdout)?;
    Ok(())
}

fn save_timeline(session: &Session, path: &Path) -> anyhow::Result<()> {
    session
        .to_document()
        .save(path)
        .with_context(|| format!("saving timeline {}", path.display()))
}
