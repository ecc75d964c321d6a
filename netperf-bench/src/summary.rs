// Copyright (c) Facebook, Inc. and its affiliates.
//
// Machine readable per-scenario digest for archiving and metrics export.
// Statistics which couldn't be computed are null rather than zero.
//
use chrono::{DateTime, Local};
use log::debug;
use serde::{Deserialize, Serialize};

use super::compare;
use super::study::{self, StatError};
use netperf_bench_intf::{Family, Profile, Sample, ScenarioResults, Selection};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub profile: Profile,
    pub family: Family,
    pub message_size: u64,
    pub duration: u64,
    pub samples: u32,
    pub metric: String,
    pub same_node: bool,
    pub host_network: bool,
    pub service: bool,
    pub vm: bool,
    pub vm_host: Option<String>,
    pub client_node: String,
    pub server_node: String,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub throughput: Option<f64>,
    pub latency: Option<f64>,
    pub latency_p99: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub scenarios: Vec<ScenarioSummary>,
    pub overhead_selection: Selection,
    pub tcp_stream_overhead: Option<f64>,
}

fn ok_or_log(what: &str, sample: &Sample, stat: Result<f64, StatError>) -> Option<f64> {
    match stat {
        Ok(v) => Some(v),
        Err(e) => {
            debug!("summary: {} of {} unavailable ({})", what, sample, &e);
            None
        }
    }
}

impl ScenarioSummary {
    pub fn from_sample(sample: &Sample) -> Self {
        let cfg = &sample.config;
        Self {
            profile: cfg.profile,
            family: cfg.profile.family(),
            message_size: cfg.message_size,
            duration: cfg.duration,
            samples: cfg.samples,
            metric: cfg.metric.clone(),
            same_node: sample.same_node,
            host_network: sample.host_network,
            service: sample.service(),
            vm: sample.vm(),
            vm_host: cfg.vm_host.clone(),
            client_node: sample.client_node.name.clone(),
            server_node: sample.server_node.name.clone(),
            start_time: sample.start_time,
            end_time: sample.end_time,
            throughput: ok_or_log(
                "throughput",
                sample,
                study::median(&sample.throughput_summary),
            ),
            latency: ok_or_log("latency", sample, study::median(&sample.latency_summary)),
            latency_p99: ok_or_log(
                "latency p99",
                sample,
                study::percentile(&sample.latency_summary, 99.0),
            ),
        }
    }
}

pub fn summarize(results: &ScenarioResults, selection: Selection) -> Summary {
    let tcp_stream_overhead = match compare::tcp_stream_overhead(results, selection) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!("summary: TCP_STREAM overhead unavailable ({})", &e);
            None
        }
    };

    Summary {
        scenarios: results.iter().map(ScenarioSummary::from_sample).collect(),
        overhead_selection: selection,
        tcp_stream_overhead,
    }
}
