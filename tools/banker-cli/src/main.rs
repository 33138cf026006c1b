//! Banker scenario runner
//!
//! Loads a scenario file, refuses to continue if the initial state is
//! unsafe, then runs each request in order and reports the outcome.

mod report;
mod scenario;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use banker_session::banker_core::SafetyResult;
use banker_session::{init_logging, BankerConfig, ConfigLoader, Session};
use clap::Parser;
use tracing::error;

use crate::scenario::Scenario;

/// Run a Banker's Algorithm scenario
#[derive(Parser, Debug)]
#[command(name = "banker", version, about)]
struct Args {
    /// Scenario file (TOML)
    scenario: PathBuf,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print one JSON object per request instead of a text report
    #[arg(long)]
    json: bool,
}

fn load_config(args: &Args) -> Result<BankerConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    loader.load().context("Failed to load configuration")
}

fn run(args: &Args) -> Result<ExitCode> {
    let config = load_config(args)?;
    init_logging(&config.logging)?;

    let scenario = Scenario::load(&args.scenario)?;

    let mut session = match Session::start(&config.limits, &scenario.initial) {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "Session refused to start");
            eprintln!("Initial state rejected: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if !args.json {
        if let SafetyResult::Safe { sequence } = session.check_safety() {
            print!("{}", report::render_start(&sequence));
        }
    }

    for req in &scenario.requests {
        let outcome = session.request(req.pid(), &req.vector);
        if args.json {
            println!("{}", serde_json::to_string(&outcome)?);
        } else {
            println!();
            print!("{}", report::render_outcome(&outcome));
        }
    }

    if args.json {
        println!("{}", serde_json::to_string(&session.summary())?);
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
