//! Command-line entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and open the entity store.
//! - Serve the sorted employee payload to other processes via stdout.
//! - Drive the aggregate report on a fixed rate until Ctrl-C.

mod cli;
mod ticker;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use ems_api::EmsApi;
use ems_core::{
    default_log_level, init_logging, init_stderr_logging, load_config, sqlite_report_service,
    EmsConfig,
};
use log::info;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Ping = cli.command {
        println!("ems_core ping={}", ems_core::ping());
        println!("ems_core version={}", ems_core::core_version());
        return Ok(());
    }

    let mut config = load_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    start_logging(&config)?;

    let api = EmsApi::open(&config.database_path)
        .with_context(|| format!("opening {}", config.database_path.display()))?;

    match cli.command {
        Commands::Ping => Ok(()),
        Commands::Sorted => print_sorted(&api),
        Commands::Report { once: true } => report_once(&api),
        Commands::Report { once: false } => report_forever(&api, &config),
    }
}

fn start_logging(config: &EmsConfig) -> Result<()> {
    let level = config.log_level.as_deref().unwrap_or(default_log_level());
    let started = match config.log_dir.as_deref() {
        Some(dir) => {
            let dir = dir
                .to_str()
                .ok_or_else(|| anyhow!("log_dir `{}` is not valid UTF-8", dir.display()))?;
            init_logging(level, dir)
        }
        None => init_stderr_logging(level),
    };
    started.map_err(|err| anyhow!(err))
}

fn print_sorted(api: &EmsApi) -> Result<()> {
    let response = api.sorted_employees();
    let body = response.body.unwrap_or_default();
    if !(200..300).contains(&response.status) {
        bail!("sorted listing failed with status {}: {body}", response.status);
    }
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn report_once(api: &EmsApi) -> Result<()> {
    let report = sqlite_report_service(api.connection())
        .run_scheduled_report()
        .ok_or_else(|| anyhow!("report generation failed; see logs"))?;
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn report_forever(api: &EmsApi, config: &EmsConfig) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))
        .context("installing Ctrl-C handler")?;

    let period = config.report.interval();
    info!(
        "event=report_schedule module=cli status=start fixed_rate_ms={}",
        config.report.fixed_rate_ms
    );

    let service = sqlite_report_service(api.connection());
    let runs = ticker::run_fixed_rate(period, &running, || {
        if let Some(report) = service.run_scheduled_report() {
            match serde_json::to_string(&report) {
                Ok(line) => println!("{line}"),
                Err(err) => log::error!(
                    "event=report_print module=cli status=error error={err}"
                ),
            }
        }
    });

    info!("event=report_schedule module=cli status=stopped runs={runs}");
    Ok(())
}
