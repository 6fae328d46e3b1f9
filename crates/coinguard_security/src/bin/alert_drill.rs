//! # Alert Drill
//!
//! Fires a burst of security alerts from many threads through a real logger
//! and reports what reached the alert log.
//!
//! ## Usage
//!
//! ```bash
//! alert_drill --config security.toml --producers 50 --alerts 100
//! ```

use coinguard_security::{SecurityLogConfig, SecurityLogger};
use std::thread;
use std::time::Instant;
use uuid::Uuid;

fn main() {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         COINGUARD ALERT DRILL                                    ║");
    println!("║         THE ALERT LEDGER                                         ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;
    let mut producers = 50usize;
    let mut alerts = 100usize;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                config_path = args.get(i + 1).cloned();
                i += 1;
            }
            "--producers" | "-p" => {
                producers = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(50);
                i += 1;
            }
            "--alerts" | "-a" => {
                alerts = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(100);
                i += 1;
            }
            "--help" | "-h" => {
                println!("Usage: alert_drill [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <FILE>      TOML logger config (default: built-in)");
                println!("  -p, --producers <NUM>    Concurrent reporting threads (default: 50)");
                println!("  -a, --alerts <NUM>       Alerts per thread (default: 100)");
                println!("  -h, --help               Show this help");
                return;
            }
            _ => {}
        }
        i += 1;
    }

    let config = match config_path {
        Some(path) => match SecurityLogConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                println!("Error: {e}");
                std::process::exit(2);
            }
        },
        None => SecurityLogConfig::default(),
    };

    println!("┌─ CONFIGURATION ─────────────────────────────────────────────────┐");
    println!("│ Log Path:           {}", config.log_path.display());
    println!("│ Flush Interval:     {:?}", config.flush_interval());
    println!("│ Shutdown Timeout:   {:?}", config.shutdown_timeout());
    println!("│ Producers:          {producers}");
    println!("│ Alerts/Producer:    {alerts}");
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    let logger = match SecurityLogger::start(&config) {
        Ok(logger) => logger,
        Err(e) => {
            println!("Error: {e}");
            std::process::exit(1);
        }
    };
    if !logger.is_persistent() {
        println!("⚠ Alert log unavailable - alerts will stay in memory");
    }

    let start = Instant::now();
    let handles: Vec<_> = (0..producers)
        .map(|p| {
            let reporter = logger.reporter();
            let actor = Uuid::new_v4();
            thread::spawn(move || {
                let name = format!("drill-{p}");
                for n in 0..alerts {
                    if n % 10 == 0 {
                        reporter.log_critical(actor, &name, "DrillGUI", "WITHDRAW", &format!("seq={n}"));
                    } else {
                        reporter.log_suspicious(actor, &name, "DrillGUI", "INSPECT", &format!("seq={n}"));
                    }
                }
            })
        })
        .collect();

    for h in handles {
        if h.join().is_err() {
            println!("Error: a producer thread panicked");
        }
    }
    let intake_time = start.elapsed();

    let report = logger.shutdown();

    println!();
    println!("┌─ DRILL RESULTS ────────────────────────────────────────────────┐");
    println!("│ Intake Time:        {intake_time:?}");
    println!("│ Accepted:           {}", report.stats.accepted);
    println!("│ Written:            {}", report.stats.written);
    println!("│ Batches:            {}", report.stats.batches);
    println!("│ Lost (I/O):         {}", report.stats.lost);
    println!("│ Dropped (overflow): {}", report.stats.dropped_on_overflow);
    println!("│ Still Pending:      {}", report.stats.pending);
    println!("│ Final Flush:        {:?}", report.final_flush);
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    if report.stats.written == report.stats.accepted {
        println!("✓ Every alert reached the log");
    } else {
        println!(
            "⚠ {} of {} alerts not written",
            report.stats.accepted - report.stats.written,
            report.stats.accepted
        );
    }
}
