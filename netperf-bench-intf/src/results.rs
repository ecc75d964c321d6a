// Copyright (c) Facebook, Inc. and its affiliates.
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::sync::{Arc, Mutex};

use super::{Family, Sample};
use netperf_util::*;

const RESULTS_DOC: &str = "\
//
// k8s-netperf scenario results
//
// One entry per completed benchmark run in completion order. Reruns of
// the same scenario are recorded as separate entries.
//
//  results[].profile: TCP_STREAM, UDP_STREAM, TCP_RR, UDP_RR or TCP_CRR
//  results[].message_size: Message size in bytes
//  results[].duration: Run duration in seconds
//  results[].samples: Requested number of measurements
//  results[].metric: Throughput unit label
//  results[].service, host_network, same_node, vm: Placement flags
//  results[].throughput_summary[]: Throughput measurements
//  results[].latency_summary[]: Latency measurements in usecs
//  results[].{client|server}_metrics: Node CPU breakdown in percents
//  results[].{client|server}_pod_cpu.results[]: Per-pod CPU utilization
//
";

/// All samples of a benchmarking session in completion order. Samples can
/// only get in through `push()` or deserialization, both of which validate,
/// and are read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioResults {
    #[serde(deserialize_with = "deserialize_validated")]
    results: Vec<Sample>,
}

fn deserialize_validated<'de, D>(deserializer: D) -> std::result::Result<Vec<Sample>, D::Error>
where
    D: Deserializer<'de>,
{
    let results = Vec::<Sample>::deserialize(deserializer)?;
    for (idx, sample) in results.iter().enumerate() {
        if let Err(e) = sample.validate() {
            return Err(de::Error::custom(format!("results[{}] {}: {}", idx, sample, &e)));
        }
    }
    Ok(results)
}

impl ScenarioResults {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, sample: Sample) -> Result<()> {
        sample
            .validate()
            .with_context(|| format!("Rejecting {}", &sample))?;
        if !sample.is_complete() {
            warn!(
                "results: {} has fewer measurements than the requested {}",
                &sample, sample.config.samples
            );
        }
        debug!("results: Recording {}", &sample);
        self.results.push(sample);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<Sample> {
        self.results.iter()
    }

    pub fn by_family(&self, family: Family) -> impl Iterator<Item = &Sample> {
        self.results.iter().filter(move |s| s.family() == family)
    }

    pub fn has_family(&self, family: Family) -> bool {
        self.by_family(family).next().is_some()
    }

    pub fn has_host_network(&self) -> bool {
        self.results.iter().any(|s| s.host_network)
    }

    pub fn has_pod_cpu(&self) -> bool {
        self.results
            .iter()
            .any(|s| !s.client_pod_cpu.results.is_empty() || !s.server_pod_cpu.results.is_empty())
    }
}

impl JsonLoad for ScenarioResults {}

impl JsonSave for ScenarioResults {
    fn preamble() -> Option<String> {
        Some(RESULTS_DOC.to_string())
    }
}

/// Mutex-guarded result store for orchestrators which run scenarios in
/// parallel. Reporting works on a snapshot or on the unwrapped store.
#[derive(Clone, Default)]
pub struct SharedResults {
    inner: Arc<Mutex<ScenarioResults>>,
}

impl SharedResults {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&self, sample: Sample) -> Result<()> {
        self.inner.lock().unwrap().push(sample)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn snapshot(&self) -> ScenarioResults {
        self.inner.lock().unwrap().clone()
    }

    /// Unwraps the store if this is the last handle, otherwise clones.
    pub fn into_results(self) -> ScenarioResults {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().unwrap(),
            Err(arc) => arc.lock().unwrap().clone(),
        }
    }
}
