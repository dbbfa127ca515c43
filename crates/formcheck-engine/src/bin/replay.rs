//! Replay recorded landmark frames through the engine.
//!
//! Usage: `formcheck-replay <frames.jsonl> [--config <path>] [--verbose]`
//!
//! Each input line is `{"t": <seconds>, "landmarks": {<name>: {"x":..,"y":..} | null}}`.
//! One JSON snapshot is printed per analyzed frame, then a summary line.

use std::fs::File;
use std::io::{BufRead, BufReader};

use formcheck_core::{Error, LandmarkFrame, Result, Timestamp};
use formcheck_engine::{EngineConfig, FormEngine};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct RecordedFrame {
    t: f64,
    landmarks: LandmarkFrame,
}

#[derive(Debug, Serialize)]
struct Summary {
    frames: u64,
    /// Frames with all 13 landmarks present
    complete_frames: u64,
    skipped_lines: u64,
    reps: u32,
    final_phase: String,
}

struct Args {
    input: String,
    config: Option<String>,
    verbose: bool,
}

fn parse_args() -> Result<Args> {
    let mut input = None;
    let mut config = None;
    let mut verbose = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config = Some(args.next().ok_or_else(|| {
                    Error::InvalidInput("--config requires a path".to_string())
                })?);
            }
            "--verbose" | "-v" => verbose = true,
            _ if input.is_none() => input = Some(arg),
            other => return Err(Error::InvalidInput(format!("unexpected argument: {other}"))),
        }
    }

    let input = input.ok_or_else(|| {
        Error::InvalidInput("usage: formcheck-replay <frames.jsonl> [--config <path>]".to_string())
    })?;

    Ok(Args {
        input,
        config,
        verbose,
    })
}

fn run(args: Args) -> Result<Summary> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    let reader = BufReader::new(File::open(&args.input)?);
    let mut engine: Option<FormEngine> = None;
    let mut skipped_lines = 0;
    let mut complete_frames = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let recorded: RecordedFrame = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(line = line_no + 1, "skipping malformed frame: {}", e);
                skipped_lines += 1;
                continue;
            }
        };

        let now = Timestamp::from_secs_f64(recorded.t);
        // The dwell timer starts at the first recorded frame
        if engine.is_none() {
            engine = Some(FormEngine::new_at(config.clone(), now)?);
        }
        let Some(engine) = engine.as_ref() else {
            continue;
        };

        if recorded.landmarks.is_complete() {
            complete_frames += 1;
        }
        let snapshot = engine.analyze_frame_at(recorded.landmarks, now);
        if snapshot.analyzed {
            println!("{}", serde_json::to_string(&snapshot)?);
        }
    }

    let state = engine.map(|e| e.state());
    Ok(Summary {
        frames: state.as_ref().map_or(0, |s| s.frame_counter),
        complete_frames,
        skipped_lines,
        reps: state.as_ref().map_or(0, |s| s.rep_count),
        final_phase: state
            .map(|s| s.current_phase.to_string())
            .unwrap_or_else(|| "preparation".to_string()),
    })
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    // RUST_LOG takes precedence over --verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(args).and_then(|summary| Ok(serde_json::to_string(&summary)?)) {
        Ok(summary) => println!("{summary}"),
        Err(e) => {
            tracing::error!("replay failed: {}", e);
            std::process::exit(1);
        }
    }
}
