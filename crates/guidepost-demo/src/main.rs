#![forbid(unsafe_code)]

//! Guidepost demo runner
//!
//! Replays a walkthrough script against an in-memory page and prints what
//! the tour engine did: transitions, highlight geometry and the overlay a
//! renderer would draw after each settle.
//!
//! # Running
//!
//! ```sh
//! cargo run -p guidepost-demo
//! cargo run -p guidepost-demo -- crates/guidepost-demo/tours/intake.toml --json
//! RUST_LOG=guidepost=debug cargo run -p guidepost-demo
//! ```

mod error;
mod runner;
mod script;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use guidepost::{MissingTargetPolicy, TourSettings};
use tracing_subscriber::EnvFilter;

use crate::error::Result;
use crate::runner::Format;
use crate::script::DemoScript;

#[derive(Debug, Parser)]
#[command(
    name = "guidepost-demo",
    about = "Replay a guided tour against an in-memory page",
    version
)]
struct Cli {
    /// Walkthrough script (TOML). Defaults to the bundled patient-intake tour.
    script: Option<PathBuf>,

    /// Engine settings file (TOML or JSON by extension).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Override the missing-target policy.
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Print one JSON object per line.
    #[arg(long)]
    json: bool,

    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    KeepLast,
    SkipAhead,
    Abort,
}

impl From<PolicyArg> for MissingTargetPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::KeepLast => Self::KeepLast,
            PolicyArg::SkipAhead => Self::SkipAhead,
            PolicyArg::Abort => Self::Abort,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_settings(cli: &Cli) -> Result<TourSettings> {
    let mut settings = match &cli.settings {
        Some(path) if path.extension().is_some_and(|ext| ext == "json") => {
            TourSettings::from_json_file(path)?
        }
        Some(path) => TourSettings::from_toml_file(path)?,
        None => TourSettings::default(),
    };
    if let Some(policy) = cli.policy {
        settings = settings.missing_target(policy.into());
    }
    Ok(settings)
}

fn run(cli: Cli) -> Result<()> {
    let script = match &cli.script {
        Some(path) => DemoScript::from_toml_file(path)?,
        None => DemoScript::from_toml_str(script::BUNDLED)?,
    };
    let settings = load_settings(&cli)?;
    tracing::info!(
        target: "guidepost_demo",
        title = script.tour.title.as_deref().unwrap_or("untitled"),
        steps = script.tour.steps.len(),
        "replaying tour"
    );

    let format = if cli.json { Format::Json } else { Format::Text };
    let transcript = runner::run(&script, settings, format)?;
    for line in &transcript.lines {
        println!("{line}");
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(error) = run(cli) {
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
