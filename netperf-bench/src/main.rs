// Copyright (c) Facebook, Inc. and its affiliates.
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::process::exit;

use netperf_bench_intf::{Args, Mode, ScenarioResults};
use netperf_util::*;

mod compare;
mod report;
mod study;
mod summary;

use report::Reporter;

fn format_results(args: &Args, results: &ScenarioResults) -> Result<String> {
    let mut buf = String::new();
    let mut reporter = Reporter::new(results, args.overhead);
    reporter.format_all(&mut buf)?;
    if args.pcts {
        reporter.format_pcts(&mut buf)?;
    }

    let nr_failed = reporter.failures().len();
    if nr_failed > 0 {
        warn!(
            "{} report cell(s) couldn't be computed and are shown as {:?}",
            nr_failed, NA
        );
        for failure in reporter.failures() {
            debug!(
                "  [{}] {}: {}",
                failure.table, &failure.sample, &failure.error
            );
        }
    }
    Ok(buf)
}

fn run(args: &Args) -> Result<()> {
    let results = ScenarioResults::load(&args.result)
        .with_context(|| format!("Loading result file {:?}", &args.result))?;
    info!(
        "Loaded {} sample(s) from {:?}",
        results.len(),
        &args.result
    );

    match args.mode {
        Mode::Format => print!("{}", format_results(args, &results)?),
        Mode::Summary => {
            let summary = summary::summarize(&results, args.overhead);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

fn main() {
    let args_file = Args::init_args_and_logging().unwrap_or_else(|e| {
        error!("Failed to process args ({:#})", &e);
        exit(1);
    });

    if let Err(e) = run(&args_file.data) {
        error!("{:#}", &e);
        exit(1);
    }
}
