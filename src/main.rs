//! Blinkwatch Agent CLI
//!
//! Blink-rate and system-load monitor for webcam wellness tools.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use blinkwatch_agent::{
    analyzer::{BlinkTracker, WindowAggregator},
    capture::ReplaySource,
    config::Config,
    probe::{FixedProbe, LoadProbe, SystemProbe},
    session::BlinkMonitor,
    sink::{JsonlStore, DEFAULT_RECENT_LIMIT},
    stats::{create_shared_stats, create_shared_stats_with_persistence},
    VERSION,
};

#[derive(Parser)]
#[command(name = "blinkwatch")]
#[command(author = "Blinkwatch")]
#[command(version = VERSION)]
#[command(about = "Blink-rate and system-load monitor for webcam wellness tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded frame trace through the pipeline
    Run {
        /// JSONL frame trace to replay
        #[arg(long)]
        trace: PathBuf,

        /// Use fixed load readings instead of live probing ("cpu,mem")
        #[arg(long)]
        fixed_load: Option<String>,
    },

    /// Show store location and session statistics
    Status,

    /// List stored window summaries
    History {
        /// Number of most recent windows to show
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,

        /// Range start as Unix epoch seconds (defaults to 60s before the end)
        #[arg(long)]
        since: Option<i64>,

        /// Range end as Unix epoch seconds (defaults to now)
        #[arg(long)]
        until: Option<i64>,
    },

    /// Export the stored series as pretty-printed JSON
    Export {
        /// Output file for the export
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blinkwatch_agent=info".into()),
        )
        .init();

    match cli.command {
        Commands::Run { trace, fixed_load } => {
            cmd_run(trace, fixed_load.as_deref());
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::History {
            limit,
            since,
            until,
        } => {
            cmd_history(limit, since, until);
        }
        Commands::Export { output } => {
            cmd_export(output);
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

fn cmd_run(trace: PathBuf, fixed_load: Option<&str>) {
    println!("Blinkwatch Agent v{VERSION}");
    println!();

    // Parse the fixed-load override before touching anything else
    let fixed = match fixed_load {
        Some(raw) => match parse_load_pair(raw) {
            Some(pair) => Some(pair),
            None => {
                eprintln!("Error: --fixed-load expects \"cpu,mem\" (e.g. \"12.5,3.0\")");
                std::process::exit(1);
            }
        },
        None => None,
    };

    // Load or create configuration
    let config = Config::load().unwrap_or_default();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    let source = match ReplaySource::open(&trace) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error opening trace {trace:?}: {e}");
            std::process::exit(1);
        }
    };

    let store = match JsonlStore::open(&config.store_path()) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening metrics store: {e}");
            std::process::exit(1);
        }
    };

    println!("Starting replay...");
    println!("  Trace: {trace:?}");
    println!("  Store: {:?}", store.path());
    println!("  Window size: {} frames", config.window.frames_per_window);
    println!(
        "  Blink threshold: {} (cooldown {} frames)",
        config.detector.ear_close_threshold, config.detector.blink_cooldown_frames
    );
    match fixed {
        Some((cpu, mem)) => println!("  Load readings: fixed at {cpu}% cpu, {mem}% mem"),
        None => println!("  Load readings: live (sysinfo)"),
    }
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let stats = if config.persist_stats {
        create_shared_stats_with_persistence(config.stats_path())
    } else {
        create_shared_stats()
    };
    println!("Session ID: {}", stats.snapshot().session_id);

    let probe: Box<dyn LoadProbe> = match fixed {
        Some((cpu, mem)) => Box::new(FixedProbe::new(cpu, mem)),
        None => Box::new(SystemProbe::new()),
    };

    let mut monitor = BlinkMonitor::new(Box::new(source), probe, Box::new(store), stats.clone())
        .with_tuning(
            BlinkTracker::new(
                config.detector.ear_close_threshold,
                config.detector.blink_cooldown_frames,
            ),
            WindowAggregator::new(
                config.window.frames_per_window,
                config.window.cpu_sample_capacity,
            ),
        );

    // Set up Ctrl+C handler
    ctrlc_handler(monitor.stop_handle());

    monitor.run();

    // Final stats
    println!();
    println!("{}", stats.summary());

    if config.persist_stats {
        if let Err(e) = stats.save() {
            eprintln!("Warning: Could not save session stats: {e}");
        }
    }
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("Blinkwatch Agent Status");
    println!("=======================");
    println!();

    println!("Configuration:");
    println!("  Config file: {:?}", Config::config_path());
    println!("  Metrics store: {:?}", config.store_path());
    println!("  Window size: {} frames", config.window.frames_per_window);
    println!(
        "  Blink threshold: {} (cooldown {} frames)",
        config.detector.ear_close_threshold, config.detector.blink_cooldown_frames
    );
    println!();

    // Stored windows
    let store_path = config.store_path();
    if store_path.exists() {
        match JsonlStore::open(&store_path) {
            Ok(store) => {
                println!("Stored windows: {}", store.count().unwrap_or(0));
                if let Ok(recent) = store.fetch_recent(1) {
                    if let Some(last) = recent.first() {
                        println!(
                            "Last window: [{}] {} blinks, cpu {:.1}%, mem {:.1}%",
                            format_epoch(last.epoch_seconds),
                            last.blink_count,
                            last.avg_cpu_percent,
                            last.mem_percent
                        );
                    }
                }
            }
            Err(e) => eprintln!("Warning: Could not open metrics store: {e}"),
        }
    } else {
        println!("No stored windows yet.");
    }
    println!();

    // Load and show persisted session counters if available
    let stats_path = config.stats_path();
    if stats_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&stats_path) {
            if let Ok(stats) = serde_json::from_str::<serde_json::Value>(&content) {
                println!("Cumulative Statistics:");
                if let Some(frames) = stats.get("frames_processed") {
                    println!("  Frames processed: {frames}");
                }
                if let Some(faceless) = stats.get("frames_without_face") {
                    println!("  Frames without a face: {faceless}");
                }
                if let Some(blinks) = stats.get("blinks_counted") {
                    println!("  Blinks counted: {blinks}");
                }
                if let Some(windows) = stats.get("windows_closed") {
                    println!("  Windows closed: {windows}");
                }
            }
        }
    } else {
        println!("No previous session data found.");
    }
}

fn cmd_history(limit: usize, since: Option<i64>, until: Option<i64>) {
    let config = Config::load().unwrap_or_default();
    let store_path = config.store_path();

    if !store_path.exists() {
        println!("No stored windows found at {store_path:?}");
        println!("Run 'blinkwatch run --trace <file>' to begin collecting data.");
        return;
    }

    let store = match JsonlStore::open(&store_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening metrics store: {e}");
            std::process::exit(1);
        }
    };

    // A bare `history` lists the most recent windows; any range flag
    // switches to an epoch query, filling the missing bound.
    let (summaries, newest_first) = if since.is_none() && until.is_none() {
        match store.fetch_recent(limit) {
            Ok(rows) => (rows, true),
            Err(e) => {
                eprintln!("Error reading metrics store: {e}");
                std::process::exit(1);
            }
        }
    } else {
        let end = until.unwrap_or_else(|| Utc::now().timestamp());
        let start = since.unwrap_or(end - 60);
        match store.query_range(start, end) {
            Ok(rows) => (rows, false),
            Err(e) => {
                eprintln!("Error reading metrics store: {e}");
                std::process::exit(1);
            }
        }
    };

    if summaries.is_empty() {
        println!("No windows in the requested range.");
        return;
    }

    if newest_first {
        println!("Most recent {} window(s):", summaries.len());
    } else {
        println!("{} window(s) in range:", summaries.len());
    }
    for summary in &summaries {
        println!(
            "[{}] blinks: {:3}  cpu: {:5.1}%  mem: {:5.1}%",
            format_epoch(summary.epoch_seconds),
            summary.blink_count,
            summary.avg_cpu_percent,
            summary.mem_percent
        );
    }
}

fn cmd_export(output: Option<PathBuf>) {
    let config = Config::load().unwrap_or_default();
    let store_path = config.store_path();

    if !store_path.exists() {
        println!("No stored windows found at {store_path:?}");
        println!("Run 'blinkwatch run --trace <file>' to begin collecting data.");
        return;
    }

    let store = match JsonlStore::open(&store_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening metrics store: {e}");
            std::process::exit(1);
        }
    };

    let summaries = match store.read_all() {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Error reading metrics store: {e}");
            std::process::exit(1);
        }
    };
    println!("Total windows: {}", summaries.len());

    let output_path = output.unwrap_or_else(|| {
        config
            .data_path
            .join(format!("export_{}.json", Utc::now().format("%Y%m%d_%H%M%S")))
    });

    if let Some(parent) = output_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match serde_json::to_string_pretty(&summaries) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&output_path, json) {
                eprintln!("Error writing export: {e}");
            } else {
                println!(
                    "Exported {} window(s) to {:?}",
                    summaries.len(),
                    output_path
                );
            }
        }
        Err(e) => {
            eprintln!("Error serializing windows: {e}");
        }
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Parse a "cpu,mem" percentage pair.
fn parse_load_pair(raw: &str) -> Option<(f64, f64)> {
    let (cpu, mem) = raw.split_once(',')?;
    Some((cpu.trim().parse().ok()?, mem.trim().parse().ok()?))
}

/// Render an epoch as a readable UTC timestamp.
fn format_epoch(epoch_seconds: i64) -> String {
    DateTime::from_timestamp(epoch_seconds, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| epoch_seconds.to_string())
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(stop: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        stop.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
