// Copyright (c) Facebook, Inc. and its affiliates.
use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Family, Profile};

#[derive(Debug, Error, PartialEq)]
pub enum SampleError {
    #[error("{series}[{idx}] is {value}, measurements must be finite and non-negative")]
    InvalidValue {
        series: &'static str,
        idx: usize,
        value: f64,
    },
}

/// Identifying configuration of a scenario as requested by the operator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub profile: Profile,
    pub message_size: u64,
    pub duration: u64,
    pub samples: u32,
    pub metric: String,
    pub service: bool,
    pub vm: bool,
    pub vm_host: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: Profile::TcpStream,
            message_size: 1024,
            duration: 10,
            samples: 1,
            metric: "Mb/s".into(),
            service: false,
            vm: false,
            vm_host: None,
        }
    }
}

impl Config {
    pub fn new(profile: Profile, message_size: u64, duration: u64, samples: u32) -> Self {
        let metric = match profile.family() {
            Family::Stream => "Mb/s",
            Family::RR => "OP/s",
        };
        Self {
            profile,
            message_size,
            duration,
            samples,
            metric: metric.into(),
            ..Default::default()
        }
    }

    pub fn service(mut self) -> Self {
        self.service = true;
        self
    }

    /// Runs the scenario from inside a virtual machine on `host`.
    pub fn into_vm(mut self, host: &str) -> Self {
        self.vm = true;
        self.vm_host = Some(host.to_string());
        self
    }
}

/// Marks every config to be run from virtual machines on `host`.
pub fn mark_vm(configs: &[Config], host: &str) -> Vec<Config> {
    configs
        .iter()
        .cloned()
        .map(|cfg| cfg.into_vm(host))
        .collect()
}

/// Node identity, passed through as is from cluster introspection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeInfo {
    pub name: String,
    pub hostname: String,
    pub ip: String,
    pub architecture: String,
    pub kernel: String,
    pub os_image: String,
}

/// Node-wide CPU breakdown in percents.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeCpu {
    pub idle: f64,
    pub user: f64,
    pub system: f64,
    pub steal: f64,
    pub iowait: f64,
    pub nice: f64,
    pub softirq: f64,
    pub irq: f64,
}

impl NodeCpu {
    pub fn fields(&self) -> [f64; 8] {
        [
            self.idle,
            self.user,
            self.system,
            self.steal,
            self.iowait,
            self.nice,
            self.softirq,
            self.irq,
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PodCpu {
    pub name: String,
    pub value: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodValues {
    pub results: Vec<PodCpu>,
}

impl PodValues {
    pub fn push(&mut self, name: &str, value: f64) {
        self.results.push(PodCpu {
            name: name.into(),
            value,
        });
    }
}

/// One completed measurement of a scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(flatten)]
    pub config: Config,
    #[serde(default)]
    pub same_node: bool,
    #[serde(default)]
    pub host_network: bool,
    #[serde(default)]
    pub client_node: NodeInfo,
    #[serde(default)]
    pub server_node: NodeInfo,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    #[serde(default)]
    pub throughput_summary: Vec<f64>,
    #[serde(default)]
    pub latency_summary: Vec<f64>,
    #[serde(default)]
    pub client_metrics: NodeCpu,
    #[serde(default)]
    pub server_metrics: NodeCpu,
    #[serde(default)]
    pub client_pod_cpu: PodValues,
    #[serde(default)]
    pub server_pod_cpu: PodValues,
}

impl Sample {
    pub fn new(config: Config, host_network: bool, same_node: bool) -> Self {
        let now = Local::now();
        Self {
            config,
            same_node,
            host_network,
            client_node: Default::default(),
            server_node: Default::default(),
            start_time: now,
            end_time: now,
            throughput_summary: vec![],
            latency_summary: vec![],
            client_metrics: Default::default(),
            server_metrics: Default::default(),
            client_pod_cpu: Default::default(),
            server_pod_cpu: Default::default(),
        }
    }

    pub fn throughput(mut self, series: Vec<f64>) -> Self {
        self.throughput_summary = series;
        self
    }

    pub fn latency(mut self, series: Vec<f64>) -> Self {
        self.latency_summary = series;
        self
    }

    pub fn period(mut self, start: DateTime<Local>, end: DateTime<Local>) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    pub fn profile(&self) -> Profile {
        self.config.profile
    }

    pub fn family(&self) -> Family {
        self.config.profile.family()
    }

    pub fn service(&self) -> bool {
        self.config.service
    }

    pub fn vm(&self) -> bool {
        self.config.vm
    }

    /// Whether every requested measurement made it into both series.
    pub fn is_complete(&self) -> bool {
        let want = self.config.samples as usize;
        self.throughput_summary.len() >= want && self.latency_summary.len() >= want
    }

    pub fn validate(&self) -> Result<(), SampleError> {
        for &(series, vals) in [
            ("throughput", &self.throughput_summary),
            ("latency", &self.latency_summary),
        ]
        .iter()
        {
            for (idx, &value) in vals.iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(SampleError::InvalidValue {
                        series,
                        idx,
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}[msg={}",
            self.config.profile, self.config.message_size
        )?;
        if self.host_network {
            write!(f, ",host")?;
        }
        if self.config.service {
            write!(f, ",svc")?;
        }
        if self.same_node {
            write!(f, ",same-node")?;
        }
        match (self.config.vm, self.config.vm_host.as_deref()) {
            (true, Some(host)) => write!(f, ",vm@{}", host)?,
            (true, None) => write!(f, ",vm")?,
            _ => {}
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::{mark_vm, Config, Sample, SampleError};
    use crate::Profile;

    #[test]
    fn test_validate() {
        let cfg = Config::new(Profile::TcpStream, 1024, 10, 3);
        let sample = Sample::new(cfg.clone(), false, false).throughput(vec![1.0, 0.0, 3.5]);
        assert_eq!(sample.validate(), Ok(()));

        let sample = Sample::new(cfg.clone(), false, false).throughput(vec![1.0, -2.0]);
        assert_eq!(
            sample.validate(),
            Err(SampleError::InvalidValue {
                series: "throughput",
                idx: 1,
                value: -2.0
            })
        );

        let sample = Sample::new(cfg.clone(), false, false).latency(vec![std::f64::INFINITY]);
        assert!(sample.validate().is_err());

        let sample = Sample::new(cfg, false, false).latency(vec![12.0, std::f64::NAN]);
        match sample.validate() {
            Err(SampleError::InvalidValue { series, idx, .. }) => {
                assert_eq!(series, "latency");
                assert_eq!(idx, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_is_complete() {
        let cfg = Config::new(Profile::TcpRr, 64, 10, 2);
        let sample = Sample::new(cfg, false, true)
            .throughput(vec![1.0, 2.0])
            .latency(vec![3.0]);
        assert!(!sample.is_complete());
        assert!(sample.clone().latency(vec![3.0, 4.0]).is_complete());
    }

    #[test]
    fn test_mark_vm() {
        let configs = vec![
            Config::new(Profile::TcpStream, 1024, 10, 3),
            Config::new(Profile::UdpRr, 64, 10, 3).service(),
        ];
        let marked = mark_vm(&configs, "vm.apps.example.com");
        assert_eq!(marked.len(), configs.len());
        for (cfg, orig) in marked.iter().zip(configs.iter()) {
            assert!(cfg.vm);
            assert_eq!(cfg.vm_host.as_deref(), Some("vm.apps.example.com"));
            assert_eq!(cfg.profile, orig.profile);
            assert_eq!(cfg.service, orig.service);
        }
    }

    #[test]
    fn test_metric_default_follows_family() {
        assert_eq!(Config::new(Profile::UdpStream, 1024, 10, 1).metric, "Mb/s");
        assert_eq!(Config::new(Profile::TcpCrr, 1024, 10, 1).metric, "OP/s");
    }

    #[test]
    fn test_display() {
        let sample = Sample::new(
            Config::new(Profile::TcpStream, 8192, 10, 3).service(),
            true,
            true,
        );
        assert_eq!(format!("{}", sample), "TCP_STREAM[msg=8192,host,svc,same-node]");

        let cfg = Config::new(Profile::TcpRr, 64, 10, 3).into_vm("worker-1");
        let sample = Sample::new(cfg, false, false);
        assert_eq!(format!("{}", sample), "TCP_RR[msg=64,vm@worker-1]");
    }

    #[test]
    fn test_json_flattens_config() {
        let sample = Sample::new(Config::new(Profile::UdpRr, 64, 30, 5), true, false)
            .throughput(vec![100.0]);
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["profile"], "UDP_RR");
        assert_eq!(json["message_size"], 64);
        assert_eq!(json["host_network"], true);

        let back: Sample = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample);
    }
}
