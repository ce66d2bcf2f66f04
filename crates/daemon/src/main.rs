// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fastrecompile: watches a TeX source and keeps a parked engine ready to
//! resume on every change, cutting edit-compile latency to roughly the
//! time spent past the preamble (spec §1, §4.H).

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

use std::io::{self, Write as _};
use std::time::Duration;

use clap::Parser;
use fr_daemon::config::{Cli, Config};
use fr_daemon::{CompilationDaemon, EventIntake};
use fr_tempdir::TempDirRegistry;

#[tokio::main]
async fn main() {
    setup_logging();

    let cli = Cli::parse();
    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("fastrecompile: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(config).await {
        eprintln!("fastrecompile: {err}");
        std::process::exit(1);
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    // Reclaim orphaned scratch directories left by a crashed prior daemon
    // before doing anything else, regardless of this run's own mode.
    let registry = TempDirRegistry::open()?;
    registry.gc_dead();

    let staging_registry = if config.mode == fr_core::CompilerMode::Staged {
        Some(registry)
    } else {
        None
    };

    let mut daemon = CompilationDaemon::new(config.clone(), staging_registry);
    daemon.enter()?;

    let debounce = Duration::from_secs_f64(config.extra_delay.max(0.0));
    let mut intake = EventIntake::new(
        &config.filename,
        &config.extra_watch,
        &config.extra_watch_preamble,
        debounce,
    )?;

    let stdout = io::stdout();
    loop {
        let tick = tokio::select! {
            tick = intake.next_tick() => tick,
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        };
        let Some(recompile_preamble) = tick else {
            break;
        };

        daemon.recompile(recompile_preamble);
        if let Some(mut output) = daemon.take_output() {
            let mut buf = Vec::new();
            io::Read::read_to_end(&mut output, &mut buf)?;
            let mut handle = stdout.lock();
            handle.write_all(&buf)?;
            handle.flush()?;
        }
    }

    daemon.exit();
    Ok(())
}
