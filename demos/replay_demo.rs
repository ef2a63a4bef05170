//! Demonstration of the Blinkwatch analysis pipeline.
//!
//! This example shows how to:
//! 1. Script a frame sequence with known blinks
//! 2. Wire a monitor from source, probe and sink
//! 3. Run the session to completion
//! 4. Inspect the per-window summaries it produced
//!
//! Run with: cargo run --example replay_demo

use blinkwatch_agent::stats::create_shared_stats;
use blinkwatch_agent::{BlinkMonitor, FixedProbe, MemorySink, ScriptedSource};

fn main() {
    println!("Blinkwatch Agent - Replay Demo");
    println!("==============================");
    println!();

    // Three windows of thirty frames each. Eyes sit open at 0.32 apart
    // from short dips below the 0.25 threshold: one blink in the first
    // window, two in the second, two faceless frames in the third.
    let mut ears: Vec<Option<f64>> = vec![Some(0.32); 90];
    for i in [10, 11, 12, 35, 36, 50, 51] {
        ears[i] = Some(0.12);
    }
    ears[70] = None;
    ears[71] = None;

    let sink = MemorySink::new();
    let stats = create_shared_stats();

    let mut monitor = BlinkMonitor::new(
        Box::new(ScriptedSource::from_ears(ears)),
        Box::new(FixedProbe::new(23.4, 1.8)),
        Box::new(sink.clone()),
        stats.clone(),
    );

    println!("Feeding 90 scripted frames through the pipeline...");
    println!();

    monitor.run();

    for summary in sink.summaries() {
        println!("=== Window Completed ===");
        println!("  Closed at: {} (epoch)", summary.epoch_seconds);
        println!("  Blinks: {}", summary.blink_count);
        println!("  Avg CPU: {:.1}%", summary.avg_cpu_percent);
        println!("  Mem: {:.1}%", summary.mem_percent);
        println!();
    }

    // Show one record as it would land in the store
    if let Some(first) = sink.summaries().first() {
        println!("Summary as stored (JSON):");
        println!("{}", serde_json::to_string_pretty(first).unwrap());
        println!();
    }

    // Final statistics
    println!("{}", stats.summary());
    println!();
    println!("Demo complete!");
}
