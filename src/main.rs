//! Typereel CLI - render a typing animation video from JSON configuration.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use typereel::encode::{self, EncoderSettings};
use typereel::{DirState, Session, SessionConfig};

/// One render job: the source file plus the session parameters.
#[derive(Debug, Serialize, Deserialize)]
struct JobConfig {
    /// Source text file to animate.
    source: PathBuf,
    #[serde(flatten)]
    session: SessionConfig,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <job.json>", args[0]);
        eprintln!();
        eprintln!("Render a code-typing animation video from a JSON job file.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  job.json  Path to the job configuration file");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_str = fs::read_to_string(&args[1]).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });
    let job: JobConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    let source = fs::read_to_string(&job.source).unwrap_or_else(|e| {
        eprintln!("Error reading source file {:?}: {}", job.source, e);
        std::process::exit(1);
    });

    let frame_rate = job.session.frame_rate;
    let session = Session::new(&source, job.session).unwrap_or_else(|e| {
        eprintln!("Error preparing session: {}", e);
        std::process::exit(1);
    });

    println!("Typereel");
    println!("========");
    println!("Source: {:?} ({} bytes)", job.source, source.len());
    println!("Output: {:?}", session.workspace().video_path());
    println!("Frames: {} at {} fps", session.frame_count(), frame_rate);
    println!();

    match session.prepare() {
        Ok(DirState::Created) => {}
        Ok(DirState::AlreadyExisting) => {
            if !confirm_reuse(session.workspace().root()) {
                println!("Aborted.");
                return;
            }
        }
        Err(e) => {
            eprintln!("Error creating working directory: {}", e);
            std::process::exit(1);
        }
    }

    println!("Rendering...");
    let start = Instant::now();
    let report = session.run().unwrap_or_else(|e| {
        eprintln!("Render failed: {}", e);
        std::process::exit(1);
    });
    println!(
        "Rendered {} frames over {} lines in {:.2}s",
        report.frames,
        report.lines,
        start.elapsed().as_secs_f32()
    );

    println!("Encoding...");
    let encode_start = Instant::now();
    encode::encode(
        &session.workspace().frames_dir(),
        session.workspace().video_path(),
        frame_rate,
        0,
        report.frames,
        &EncoderSettings::default(),
    )
    .unwrap_or_else(|e| {
        eprintln!("Encoding failed: {}", e);
        std::process::exit(1);
    });
    println!(
        "Wrote {:?} in {:.2}s",
        session.workspace().video_path(),
        encode_start.elapsed().as_secs_f32()
    );
}

/// Ask whether stale artifacts in an existing working directory may be
/// reused or overwritten.
fn confirm_reuse(root: &std::path::Path) -> bool {
    print!("Working directory {:?} already exists. Continue? [y/N] ", root);
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

fn print_example_config() {
    let session: SessionConfig =
        serde_json::from_str(r#"{ "output_dir": "out", "output_name": "demo.mp4" }"#)
            .expect("example config is valid");
    let job = JobConfig {
        source: PathBuf::from("demo.py"),
        session,
    };
    println!("Example configuration (job.json):");
    println!("{}", serde_json::to_string_pretty(&job).unwrap());
}
