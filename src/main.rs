//! reflections — performs source text, by default its own, as music.

use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

use clap::Parser;

use reflections::analyze::{Analyzer, Lexicon};
use reflections::backend::{LiveBackend, OfflineBackend, RecordingBackend};
use reflections::config::PerformanceConfig;
use reflections::render::{score_duration, Renderer};

/// This file is the piece: when no input is given, the region between the
/// marker lines below is what gets performed.
const SELF_SOURCE: &str = include_str!("main.rs");

/// Seconds to let release tails ring out after a live performance.
const TAIL_SECONDS: f64 = 1.5;

#[derive(Parser)]
#[command(version, about = "Performs source text, by default its own, as music")]
struct Args {
    /// Text file to perform instead of this program's own source.
    file: Option<PathBuf>,

    /// Render offline into memory and report on it instead of playing live.
    #[arg(long)]
    offline: bool,

    /// Configuration file (default: ~/.reflections/config.yaml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Analyze and resolve without producing sound.
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match PerformanceConfig::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load {}: {e}", path.display());
                process::exit(1);
            }
        },
        None => PerformanceConfig::load_default(),
    };

    let (text, lexicon) = match &args.file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => (text, Lexicon::rust()),
            Err(e) => {
                eprintln!("failed to read {}: {e}", path.display());
                process::exit(1);
            }
        },
        None => (SELF_SOURCE.to_string(), Lexicon::performance()),
    };

    //>>START-HERE
    let analyzer = Analyzer::with_lexicon(lexicon);
    let score = analyzer.analyze(&text);

    let notes: usize = score
        .iter()
        .flat_map(|unit| unit.specs())
        .filter(|spec| spec.pitch.is_some())
        .count();

    println!("reflections v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "score: {} units, {} playable notes, ~{:.1}s",
        score.len(),
        notes,
        score_duration(&score)
    );

    if args.dry_run {
        let mut renderer = Renderer::new(RecordingBackend::new());
        if let Err(e) = renderer.perform(&score) {
            eprintln!("performance failed: {e}");
            process::exit(1);
        }
        let backend = renderer.into_backend();
        println!(
            "dry run: {} play calls, {} bus updates",
            backend.plays(),
            backend.bus_updates()
        );
        return;
    }

    if args.offline {
        let mut renderer = Renderer::new(OfflineBackend::new(config.sample_rate, config.volume));
        if let Err(e) = renderer.perform(&score) {
            eprintln!("performance failed: {e}");
            process::exit(1);
        }
        let backend = renderer.into_backend();
        println!(
            "offline render: {:.1}s at {} Hz, peak {:.2}",
            backend.duration(),
            backend.sample_rate(),
            backend.peak()
        );
        return;
    }

    if let Err(e) = ctrlc::set_handler(|| {
        eprintln!("\ninterrupted");
        process::exit(130);
    }) {
        eprintln!("warning: could not install interrupt handler: {e}");
    }

    let backend = match LiveBackend::new(config.volume) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("failed to start audio: {e}");
            process::exit(1);
        }
    };
    println!("audio: {} Hz, 2 ch", backend.sample_rate());

    let mut renderer = Renderer::new(backend);
    if let Err(e) = renderer.perform(&score) {
        eprintln!("performance failed: {e}");
        process::exit(1);
    }

    // Let the last release tails ring out before the stream drops.
    thread::sleep(Duration::from_secs_f64(TAIL_SECONDS));
    println!("done.");
    //>>END-HERE
}
