mod profile_store;

use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};

use faceauth_core::detection::domain::frame_source::FrameSource;
use faceauth_core::detection::infrastructure::jsonl_frame_source::JsonlFrameSource;
use faceauth_core::matching::domain::profile_gallery::ProfileGallery;
use faceauth_core::session::continuous_recognizer::ContinuousRecognizer;
use faceauth_core::session::engine_config::EngineConfig;
use faceauth_core::session::session_outcome::{SessionMode, SessionOutcome};
use faceauth_core::session::verification_session::VerificationSession;
use faceauth_core::shared::clock::{Clock, ManualClock, SystemClock};
use faceauth_core::shared::constants::{APP_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_FRAME_INTERVAL_MS};

/// Face enrollment, login and live recognition over recorded detector output.
#[derive(Parser, Debug)]
#[command(name = "faceauth")]
struct Cli {
    /// Engine configuration JSON (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Profiles JSON file (defaults to the platform data directory).
    #[arg(long = "profiles", global = true)]
    profiles_file: Option<PathBuf>,

    /// Wait in real time between draws instead of replaying on virtual time.
    #[arg(long, global = true)]
    realtime: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enroll a new identity (blink and head movement required).
    Enroll {
        #[arg(long)]
        name: String,
        /// Detections file, one JSON record or `null` per line.
        #[arg(long)]
        detections: PathBuf,
    },
    /// Replace an existing identity's profile.
    Update {
        #[arg(long)]
        name: String,
        #[arg(long)]
        detections: PathBuf,
    },
    /// Verify against a stored identity; enrolls when none exists yet.
    Login {
        #[arg(long)]
        name: String,
        #[arg(long)]
        detections: PathBuf,
    },
    /// Label every frame against all enrolled identities.
    Recognize {
        #[arg(long)]
        detections: PathBuf,
        /// Spacing between replayed frames in milliseconds.
        #[arg(long, default_value_t = DEFAULT_FRAME_INTERVAL_MS)]
        frame_interval_ms: u64,
    },
    /// List enrolled identities.
    Profiles,
}

fn main() {
    env_logger::init();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Returns `false` when a session ended without success.
fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let profiles_path = match cli.profiles_file {
        Some(path) => path,
        None => profile_store::default_path()?,
    };
    let gallery = ProfileGallery::new(profile_store::load(&profiles_path)?);
    let clock = make_clock(cli.realtime);

    match cli.command {
        Command::Enroll { name, detections } => {
            validate_name(&name)?;
            if gallery.get(&name).is_some() {
                log::warn!("Profile '{name}' already exists and will be replaced");
            }
            run_bounded(
                SessionMode::Enroll,
                &name,
                &detections,
                config,
                clock,
                &gallery,
                &profiles_path,
            )
        }
        Command::Update { name, detections } => {
            if gallery.get(&name).is_none() {
                return Err(format!("No profile named '{name}'; enroll first").into());
            }
            run_bounded(
                SessionMode::Update,
                &name,
                &detections,
                config,
                clock,
                &gallery,
                &profiles_path,
            )
        }
        Command::Login { name, detections } => {
            validate_name(&name)?;
            run_bounded(
                SessionMode::Login,
                &name,
                &detections,
                config,
                clock,
                &gallery,
                &profiles_path,
            )
        }
        Command::Recognize {
            detections,
            frame_interval_ms,
        } => {
            run_recognize(&detections, frame_interval_ms, &config, clock, &gallery)?;
            Ok(true)
        }
        Command::Profiles => {
            let profiles = gallery.snapshot();
            if profiles.is_empty() {
                println!("No enrolled profiles");
            }
            for p in profiles.iter() {
                println!("{}\t{} dimensions", p.name, p.embedding.len());
            }
            Ok(true)
        }
    }
}

fn run_bounded(
    mode: SessionMode,
    name: &str,
    detections: &Path,
    config: EngineConfig,
    clock: Box<dyn Clock>,
    gallery: &ProfileGallery,
    profiles_path: &Path,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut source = JsonlFrameSource::open(detections)?;
    let reference = gallery.get(name);

    let mut session = VerificationSession::new(config, clock);
    let outcome = session.run(mode, reference.as_ref(), &mut source)?;
    let success = outcome.is_success();
    println!("{name}: {outcome}");

    if matches!(outcome, SessionOutcome::ProfileVersionMismatch { .. }) {
        eprintln!("Run `faceauth update --name {name}` to re-enroll with the current detector");
    }

    if let Some(profile) = outcome.into_profile(name) {
        let replaced = gallery.upsert(profile);
        profile_store::save(profiles_path, &gallery.snapshot())?;
        log::info!(
            "{} profile '{name}'",
            if replaced { "Replaced" } else { "Created" }
        );
    }

    Ok(success)
}

fn run_recognize(
    detections: &Path,
    frame_interval_ms: u64,
    config: &EngineConfig,
    clock: Box<dyn Clock>,
    gallery: &ProfileGallery,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut source = JsonlFrameSource::open(detections)?;
    let mut recognizer = ContinuousRecognizer::new(config);
    let interval = Duration::from_millis(frame_interval_ms);

    if gallery.is_empty() {
        log::warn!("No enrolled profiles; every face will be reported as unknown");
    }

    let mut frame = 0usize;
    loop {
        let detection = source.next_detection()?;
        if source.is_exhausted() {
            break;
        }
        let known = gallery.snapshot();
        match recognizer.evaluate_frame(detection.as_ref(), &known, clock.now()) {
            Some(verdict) => println!(
                "frame {frame}: {} ({}, score {:.2})",
                verdict.label(),
                if verdict.live { "live" } else { "not live" },
                verdict.liveness_score
            ),
            None => println!("frame {frame}: -"),
        }
        frame += 1;
        clock.sleep(interval);
    }

    log::info!("Processed {frame} frames");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(EngineConfig::load(path)?);
    }
    match dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME)) {
        Some(path) if path.exists() => {
            log::info!("Using config {}", path.display());
            Ok(EngineConfig::load(&path)?)
        }
        _ => Ok(EngineConfig::default()),
    }
}

fn make_clock(realtime: bool) -> Box<dyn Clock> {
    if realtime {
        Box::new(SystemClock::new())
    } else {
        Box::new(ManualClock::new())
    }
}

fn validate_name(name: &str) -> Result<(), Box<dyn std::error::Error>> {
    if name.trim().is_empty() {
        return Err("Name must not be empty".into());
    }
    Ok(())
}
