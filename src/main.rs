//! CREATE2 Salt Finder CLI
//!
//! Usage:
//!   create2_vanity -p 0x00 -s 00 --seed genesis --init-code-hash 0x...
//!   create2_vanity -p 1111 -s "" --seed v2 --init-code 0x6080... --constructor-args 0x...
//!
//! Set RUST_LOG=debug for worker diagnostics.

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use create2_vanity::{Config, Progress, SaltFinder, SaltMatch, SearchOutcome};

fn main() {
    env_logger::init();

    let config = Config::parse();

    let params = match config.validate() {
        Ok(params) => params,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    println!("CREATE2 Salt Finder");
    println!("===================");
    println!("Criteria:       {}", params.criteria);
    println!("Difficulty:     {}", params.criteria.difficulty_description());
    println!("Deployer:       {}", params.deployer);
    println!("Init code hash: 0x{}", hex::encode(params.init_code_hash));
    println!("Seed:           {} ({})", params.seed_label, params.seed_offset().to_decimal());
    println!("Workers:        {}", config.worker_count());
    if config.resume_from > 0 {
        println!("Resuming after: {} salts", format_number(config.resume_from));
    }
    println!();

    let stop_flag = Arc::new(AtomicBool::new(false));
    let handler_flag = stop_flag.clone();
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    })
    .expect("Error setting Ctrl-C handler");

    let mut finder = SaltFinder::new(params)
        .workers(config.worker_count())
        .resume_from(config.resume_from)
        .progress_every(config.progress_every)
        .on_progress(print_progress)
        .stop_flag(stop_flag);
    if let Some(attempts) = config.max_attempts {
        finder = finder.max_attempts(attempts);
    }
    if let Some(duration) = config.max_duration() {
        finder = finder.max_duration(duration);
    }

    println!("Searching... (Press Ctrl+C to stop)\n");

    let mut pool = finder.spawn();
    let outcome = pool.wait();

    let code = match outcome {
        SearchOutcome::Found(found) => {
            print_result(&found);
            0
        }
        SearchOutcome::NotFoundWithinBudget { attempts } => {
            println!("No match within budget after {} salts.", format_number(attempts));
            println!("Resume with --resume-from {}", attempts);
            2
        }
        SearchOutcome::Cancelled { attempts } => {
            println!("\nStopped by user after {} salts.", format_number(attempts));
            println!("Resume with --resume-from {}", attempts);
            130
        }
    };

    println!("\n--- Final Statistics ---");
    println!("Salts tried:    {}", format_number(pool.total_salts()));
    println!("Matches:        {}", pool.total_matches());
    println!("Time elapsed:   {:.2}s", pool.elapsed().as_secs_f64());
    println!(
        "Average speed:  {}/s",
        format_number(pool.salts_per_second() as u64)
    );

    drop(pool);
    process::exit(code);
}

fn print_result(found: &SaltMatch) {
    println!("=== Match ===");
    println!("Address:     {}", found.address);
    println!("Salt (hex):  {}", found.salt.to_hex_prefixed());
    println!("Salt (dec):  {}", found.salt.to_decimal());
    println!("Attempts:    {}", format_number(found.attempts));
}

fn print_progress(progress: &Progress) {
    println!(
        "[{:>4}s] {} tries so far ({}/s)",
        progress.elapsed.as_secs(),
        format_number(progress.attempts),
        format_number(progress.salts_per_second() as u64)
    );
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1e9)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1e6)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1e3)
    } else {
        n.to_string()
    }
}
