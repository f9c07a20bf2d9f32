//! `annotation-replay`: run a recorded annotation session and print the result.
//!
//! Usage: `annotation-replay <script.json> [config.json]`
//!
//! Without a config argument the user's saved configuration is used if
//! present, otherwise the defaults.

#[cfg(not(target_arch = "wasm32"))]
use std::{path::PathBuf, process::ExitCode};

#[cfg(not(target_arch = "wasm32"))]
use annotation_canvas::{
    SessionConfig,
    replay::{ReplayError, ReplayScript, run_script},
};

#[cfg(not(target_arch = "wasm32"))]
fn load_config(path: Option<PathBuf>) -> Result<SessionConfig, ReplayError> {
    match path {
        Some(path) => Ok(SessionConfig::from_file(&path)?),
        None => Ok(SessionConfig::load_from_default_path().unwrap_or_default()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run(script_path: PathBuf, config_path: Option<PathBuf>) -> Result<String, ReplayError> {
    let config = load_config(config_path)?;
    let script = ReplayScript::from_file(&script_path)?;
    let report = run_script(&script, config)?;
    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let Some(script_path) = args.next() else {
        eprintln!("usage: annotation-replay <script.json> [config.json]");
        return ExitCode::from(2);
    };
    let config_path = args.next();

    // The configured level applies unless RUST_LOG overrides it.
    let level = config_path
        .as_deref()
        .and_then(|p| SessionConfig::from_file(p).ok())
        .or_else(SessionConfig::load_from_default_path)
        .unwrap_or_default()
        .log_level;
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .init();

    match run(script_path, config_path) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Replay failed: {}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

// The replay tool is native only.
#[cfg(target_arch = "wasm32")]
fn main() {}
