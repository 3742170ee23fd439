//! gesturectl - replay hand frames from a stream and emit host control events.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::{info, warn};

use gesturectl::control::{Controller, Mode, VolumeControl};
use gesturectl::gesture::sensitivity::{MAX_SENSITIVITY, MIN_SENSITIVITY};
use gesturectl::ipc::{SexpSink, Session};
use gesturectl::ControllerConfig;

#[derive(Parser, Debug)]
#[command(name = "gesturectl", about = "Hand-gesture media and pointer control")]
struct Cli {
    /// Config file (s-expression plist)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frame stream to read, one s-expression per line (default: stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Initial mode: media, mouse, window, or presentation
    #[arg(long)]
    mode: Option<String>,

    /// Initial sensitivity (0.3 - 3.0)
    #[arg(long)]
    sensitivity: Option<f64>,

    /// Volume control: mixer or keys
    #[arg(long)]
    volume: Option<String>,

    /// Starting level of the virtual master volume (0.0 - 1.0)
    #[arg(long, default_value_t = 0.5)]
    initial_volume: f64,

    /// Classify and report frame results without emitting host events
    #[arg(long)]
    dry_run: bool,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("gesturectl {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesturectl=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    info!("gesturectl v{} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    info!("config: {}", config.config_sexp());

    let events: Box<dyn Write> = if cli.dry_run {
        info!("dry run: host events suppressed");
        Box::new(io::sink())
    } else {
        Box::new(io::stdout())
    };
    if !cli.initial_volume.is_finite() {
        return Err(anyhow!("initial volume must be a number"));
    }
    // The virtual pointer starts at the screen center
    let (width, height) = (config.dispatch.screen_width, config.dispatch.screen_height);
    let sink = SexpSink::new(events)
        .with_cursor((width / 2) as i32, (height / 2) as i32)
        .with_volume(cli.initial_volume);
    let controller = Controller::new(&config, sink);
    let mut session = Session::new(controller);

    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening input {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut out = io::stdout();
    for line in input.lines() {
        let line = line.context("reading input")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(response) = session.handle_message(line) {
            writeln!(out, "{}", response).context("writing response")?;
        }
    }

    session.finish();
    out.flush().context("flushing output")?;
    info!("input closed after {} frames", session.frames());
    Ok(())
}

/// Config file (if any) with command-line overrides applied.
fn load_config(cli: &Cli) -> anyhow::Result<ControllerConfig> {
    let mut config = match &cli.config {
        Some(path) => ControllerConfig::load(path)?,
        None => ControllerConfig::default(),
    };

    if let Some(mode) = &cli.mode {
        config.mode = Mode::from_str(mode).ok_or_else(|| {
            anyhow!("unknown mode: {mode}. Use: media, mouse, window, or presentation")
        })?;
    }
    if let Some(s) = cli.sensitivity {
        if !s.is_finite() {
            return Err(anyhow!("sensitivity must be a number"));
        }
        if !(MIN_SENSITIVITY..=MAX_SENSITIVITY).contains(&s) {
            warn!("sensitivity {} clamped to [{}, {}]", s, MIN_SENSITIVITY, MAX_SENSITIVITY);
        }
        config.sensitivity = s;
    }
    if let Some(volume) = &cli.volume {
        config.dispatch.volume = VolumeControl::from_str(volume)
            .ok_or_else(|| anyhow!("unknown volume control: {volume}. Use: mixer or keys"))?;
    }

    Ok(config)
}
