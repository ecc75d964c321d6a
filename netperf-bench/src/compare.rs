// Copyright (c) Facebook, Inc. and its affiliates.
use log::{debug, warn};

use super::study::{self, StatError};
use netperf_bench_intf::{Profile, Sample, ScenarioResults, Selection};
use netperf_util::*;

/// Symmetric relative difference of `a` against `b` in percents, using
/// their mean as the base.
pub fn percent_difference(a: f64, b: f64) -> Result<f64, StatError> {
    // halve first, a + b overflows for large throughputs
    let base = a / 2.0 + b / 2.0;
    if base == 0.0 {
        return Err(StatError::DivisionByZero);
    }
    Ok((a - b) / base * TO_PCT)
}

fn select_throughput<'a, I>(
    mut samples: I,
    selection: Selection,
    profile: Profile,
    host_network: bool,
) -> Result<f64, StatError>
where
    I: Iterator<Item = &'a Sample>,
{
    let missing = StatError::MissingScenario {
        profile,
        host_network,
    };

    match selection {
        Selection::First => {
            let sample = samples.next().ok_or(missing)?;
            debug!("compare: Using the first match {}", sample);
            study::median(&sample.throughput_summary)
        }
        Selection::MedianOfAll => {
            let mut nr_matches = 0;
            let mut medians = vec![];
            for sample in samples {
                nr_matches += 1;
                match study::median(&sample.throughput_summary) {
                    Ok(v) => medians.push(v),
                    Err(e) => warn!("compare: Skipping {} ({})", sample, &e),
                }
            }
            if nr_matches == 0 {
                return Err(missing);
            }
            debug!(
                "compare: Aggregating {}/{} matches for {} host_network={}",
                medians.len(),
                nr_matches,
                profile,
                host_network
            );
            study::median(&medians)
        }
    }
}

/// Median throughput of non-service samples of `profile` on the host
/// network or the pod network, aggregated according to `selection`.
pub fn placement_throughput(
    results: &ScenarioResults,
    profile: Profile,
    host_network: bool,
    selection: Selection,
) -> Result<f64, StatError> {
    let matches = results
        .iter()
        .filter(move |s| !s.service() && s.profile() == profile && s.host_network == host_network);
    select_throughput(matches, selection, profile, host_network)
}

/// How much faster TCP_STREAM runs on the host network than on the pod
/// network, in percents. Negative if the pod network is faster.
pub fn tcp_stream_overhead(
    results: &ScenarioResults,
    selection: Selection,
) -> Result<f64, StatError> {
    let host_perf = placement_throughput(results, Profile::TcpStream, true, selection)?;
    let pod_perf = placement_throughput(results, Profile::TcpStream, false, selection)?;
    percent_difference(host_perf, pod_perf)
}
