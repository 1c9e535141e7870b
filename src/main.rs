use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use dining_monitor::{signal::SignalWatcher, Dinner, DinnerArgs, DinnerConfig};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = DinnerArgs::parse();
    setup_logging(&args);

    let config = DinnerConfig::from_args(&args).context("invalid configuration")?;
    let dinner = Dinner::new(config)?;

    // Ctrl-C などで割り込まれたら全員止めてから失敗で終了する
    let watcher = SignalWatcher::spawn(dinner.monitor())?;
    let result = dinner.run();
    watcher.stop();

    let report = result.context("dinner was aborted")?;
    for p in &report.philosophers {
        println!("philosopher {}: ate {} times, talked {} times", p.id, p.meals, p.talks);
    }
    println!("total: {} meals, {} talks", report.meals(), report.talks());
    Ok(())
}

fn setup_logging(args: &DinnerArgs) {
    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .init();
}
