//! Command line entry point: calibrate against the game window, then play.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use rhythm_autoplayer::input::{EnigoKeyboard, KeyPresser};
use rhythm_autoplayer::panel::{ControlPanel, DebugWindow, HeadlessPanel};
use rhythm_autoplayer::vision::{FrameSource, ReplayCapture, ScreenCapture};
use rhythm_autoplayer::{run_session, BotConfig, Calibrator, SessionOutcome, LANE_COUNT};

#[derive(Parser)]
#[command(
    name = "rhythm-autoplayer",
    about = "Calibrate on four lane markers, then press lane keys when notes reach the hit zone"
)]
struct Args {
    /// TOML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Lane marker template image (overrides the config)
    #[arg(long, short)]
    template: Option<PathBuf>,

    /// Monitor index to capture (overrides the config)
    #[arg(long, short)]
    monitor: Option<usize>,

    /// Four lane keys, left to right, e.g. "asdf" (overrides the config)
    #[arg(long, short)]
    keys: Option<String>,

    /// Run without the debug window; calibration accepts the first valid frame
    #[arg(long)]
    headless: bool,

    /// Replay frames from a directory instead of capturing the screen
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Log key presses instead of sending them
    #[arg(long)]
    dry_run: bool,
}

/// Presser used by `--dry-run`
struct LogPresser;

impl KeyPresser for LogPresser {
    fn press(&mut self, key: char) -> rhythm_autoplayer::Result<()> {
        log::debug!("press '{}'", key);
        Ok(())
    }
}

fn parse_keys(keys: &str) -> Result<[char; LANE_COUNT]> {
    let chars: Vec<char> = keys.chars().collect();
    match <[char; LANE_COUNT]>::try_from(chars) {
        Ok(keys) => Ok(keys),
        Err(chars) => bail!("expected {} keys, got {} in {:?}", LANE_COUNT, chars.len(), keys),
    }
}

fn load_config(args: &Args) -> Result<BotConfig> {
    let mut config = match &args.config {
        Some(path) => BotConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BotConfig::default(),
    };

    if let Some(template) = &args.template {
        config = config.with_template_path(template);
    }
    if let Some(monitor) = args.monitor {
        config = config.with_monitor(monitor);
    }
    if let Some(keys) = &args.keys {
        config = config.with_keys(parse_keys(keys)?);
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let calibrator = Calibrator::from_config(&config).context("loading lane marker template")?;

    let mut source: Box<dyn FrameSource> = match &args.replay {
        Some(dir) => Box::new(ReplayCapture::from_directory(dir, true)?),
        None => Box::new(ScreenCapture::new().context("initialising screen capture")?),
    };
    let mut panel: Box<dyn ControlPanel> = if args.headless {
        Box::new(HeadlessPanel)
    } else {
        Box::new(DebugWindow::new())
    };

    let outcome = if args.dry_run {
        run_session(&config, &calibrator, &mut source, &mut panel, || Ok(LogPresser))
    } else {
        run_session(&config, &calibrator, &mut source, &mut panel, EnigoKeyboard::new)
    };

    // Close the debug window before reporting
    drop(panel);

    match outcome? {
        SessionOutcome::Aborted => {
            println!("Calibration aborted");
        }
        SessionOutcome::Completed(summary) => {
            println!(
                "Stopped after {} frames, {} key presses",
                summary.frames, summary.key_presses
            );
        }
    }

    Ok(())
}
