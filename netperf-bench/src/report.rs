// Copyright (c) Facebook, Inc. and its affiliates.
//
// Fixed-width text reports over a result set. Every table is emitted only
// if the result set has something for it. A cell whose statistic can't be
// computed shows "n/a" and the failure is logged and recorded, the rest of
// the report is unaffected.
//
use log::warn;
use std::fmt::{self, Write};

use super::compare;
use super::study::{self, PctsMap, StatError};
use netperf_bench_intf::{Family, NodeCpu, PodValues, Sample, ScenarioResults, Selection};
use netperf_util::*;

const POD_NAME_WIDTH: usize = 20;
const LAT_UNIT: &str = "usec";

#[derive(Clone, Debug, PartialEq)]
pub struct RowFailure {
    pub table: &'static str,
    pub sample: String,
    pub error: StatError,
}

#[derive(Clone, Copy)]
enum Series {
    Throughput,
    Latency,
}

impl Series {
    fn of<'a>(&self, sample: &'a Sample) -> &'a [f64] {
        match self {
            Self::Throughput => &sample.throughput_summary,
            Self::Latency => &sample.latency_summary,
        }
    }

    fn unit<'a>(&self, sample: &'a Sample) -> &'a str {
        match self {
            Self::Throughput => &sample.config.metric,
            Self::Latency => LAT_UNIT,
        }
    }
}

pub struct Reporter<'a> {
    results: &'a ScenarioResults,
    selection: Selection,
    failures: Vec<RowFailure>,
}

fn write_table_head(out: &mut dyn Write, title: &str, header: &str) -> fmt::Result {
    let width = header.chars().count();
    writeln!(out, "{}", format_banner(title, width))?;
    writeln!(out, "{}", header)?;
    writeln!(out, "{}", format_rule(width))
}

fn scenario_header(value_title: &str) -> String {
    format!(
        "{:<12} | {:<12} | {:<7} | {:<12} | {:<9} | {:<8} | {:<7} | {}",
        "Scenario",
        "Host Network",
        "Service",
        "Message Size",
        "Same node",
        "Duration",
        "Samples",
        value_title
    )
}

fn pod_header() -> String {
    format!(
        "{:<6} | {:<12} | {:<12} | {:<7} | {:<12} | {:<9} | {:<width$} | {}",
        "Role",
        "Scenario",
        "Host Network",
        "Service",
        "Message Size",
        "Same node",
        "Pod",
        "Utilization",
        width = POD_NAME_WIDTH
    )
}

fn node_header() -> String {
    format!(
        "{:<6} | {:<12} | {:<12} | {:<7} | {:<12} | {:<9} | {:<10} | {:<10} | {:<10} | {:<10} | {:<10} | {:<10} | {:<11} | {}",
        "Role",
        "Scenario",
        "Host Network",
        "Service",
        "Message Size",
        "Same node",
        "Idle CPU",
        "User CPU",
        "System CPU",
        "Steal CPU",
        "IOWait CPU",
        "Nice CPU",
        "SoftIRQ CPU",
        "IRQ CPU"
    )
}

impl<'a> Reporter<'a> {
    pub fn new(results: &'a ScenarioResults, selection: Selection) -> Self {
        Self {
            results,
            selection,
            failures: vec![],
        }
    }

    pub fn failures(&self) -> &[RowFailure] {
        &self.failures
    }

    fn record_failure(&mut self, table: &'static str, sample: String, error: StatError) {
        warn!("report: {}: {} ({})", table, &sample, &error);
        self.failures.push(RowFailure {
            table,
            sample,
            error,
        });
    }

    fn stat_cell(
        &mut self,
        table: &'static str,
        sample: &Sample,
        stat: Result<f64, StatError>,
        unit: &str,
    ) -> String {
        match stat {
            Ok(v) => format!("{:<15.6} ({})", v, unit),
            Err(e) => {
                self.record_failure(table, sample.to_string(), e);
                NA.to_string()
            }
        }
    }

    fn write_pod_rows(
        out: &mut dyn Write,
        role: &str,
        sample: &Sample,
        pods: &PodValues,
    ) -> fmt::Result {
        for pod in pods.results.iter() {
            writeln!(
                out,
                "{:<6} | {:<12} | {:<12} | {:<7} | {:<12} | {:<9} | {:<width$} | {:.6}",
                role,
                sample.profile(),
                format_bool(sample.host_network),
                format_bool(sample.service()),
                sample.config.message_size,
                format_bool(sample.same_node),
                truncate_str(&pod.name, POD_NAME_WIDTH),
                pod.value,
                width = POD_NAME_WIDTH
            )?;
        }
        Ok(())
    }

    /// Per-pod CPU utilization of every sample, client pods first.
    pub fn format_pod_cpu(&mut self, out: &mut dyn Write) -> fmt::Result {
        if !self.results.has_pod_cpu() {
            return Ok(());
        }

        let header = pod_header();
        let rule = format_rule(header.chars().count());
        write_table_head(out, "Pod CPU Utilization", &header)?;
        for sample in self.results.iter() {
            Self::write_pod_rows(out, "Client", sample, &sample.client_pod_cpu)?;
            Self::write_pod_rows(out, "Server", sample, &sample.server_pod_cpu)?;
            writeln!(out, "{}", &rule)?;
        }
        writeln!(out, "")
    }

    fn write_node_row(
        out: &mut dyn Write,
        role: &str,
        sample: &Sample,
        cpu: &NodeCpu,
    ) -> fmt::Result {
        write!(
            out,
            "{:<6} | {:<12} | {:<12} | {:<7} | {:<12} | {:<9}",
            role,
            sample.profile(),
            format_bool(sample.host_network),
            format_bool(sample.service()),
            sample.config.message_size,
            format_bool(sample.same_node),
        )?;
        let fields = cpu.fields();
        for (idx, v) in fields.iter().enumerate() {
            if idx < fields.len() - 1 {
                write!(out, " | {:<10.4}", v)?;
            } else {
                write!(out, " | {:.4}", v)?;
            }
        }
        writeln!(out, "")
    }

    /// Node CPU breakdown of the client and server node of every sample.
    pub fn format_node_cpu(&mut self, out: &mut dyn Write) -> fmt::Result {
        if self.results.is_empty() {
            return Ok(());
        }

        let header = node_header();
        write_table_head(out, "Node CPU Utilization", &header)?;
        for sample in self.results.iter() {
            Self::write_node_row(out, "Client", sample, &sample.client_metrics)?;
            Self::write_node_row(out, "Server", sample, &sample.server_metrics)?;
        }
        writeln!(out, "{}\n", format_rule(header.chars().count()))
    }

    fn format_family_table(
        &mut self,
        out: &mut dyn Write,
        title: &'static str,
        family: Family,
        series: Series,
    ) -> fmt::Result {
        if !self.results.has_family(family) {
            return Ok(());
        }

        let header = scenario_header("Median value");
        write_table_head(out, title, &header)?;
        let results = self.results;
        for sample in results.by_family(family) {
            let cell = self.stat_cell(
                title,
                sample,
                study::median(series.of(sample)),
                series.unit(sample),
            );
            writeln!(
                out,
                "{:<12} | {:<12} | {:<7} | {:<12} | {:<9} | {:<8} | {:<7} | {}",
                sample.profile(),
                format_bool(sample.host_network),
                format_bool(sample.service()),
                sample.config.message_size,
                format_bool(sample.same_node),
                sample.config.duration,
                sample.config.samples,
                cell
            )?;
        }
        writeln!(out, "{}\n", format_rule(header.chars().count()))
    }

    /// Median throughput of STREAM samples.
    pub fn format_stream(&mut self, out: &mut dyn Write) -> fmt::Result {
        self.format_family_table(out, "Stream Results", Family::Stream, Series::Throughput)
    }

    /// Median latency of STREAM and RR samples, one table per family.
    pub fn format_latency(&mut self, out: &mut dyn Write) -> fmt::Result {
        self.format_family_table(
            out,
            "Stream Latency Results",
            Family::Stream,
            Series::Latency,
        )?;
        self.format_family_table(out, "RR Latency Results", Family::RR, Series::Latency)
    }

    /// Median throughput of RR samples.
    pub fn format_rr(&mut self, out: &mut dyn Write) -> fmt::Result {
        self.format_family_table(out, "RR Results", Family::RR, Series::Throughput)
    }

    /// TCP_STREAM throughput difference between host and pod networking.
    pub fn format_overhead(&mut self, out: &mut dyn Write) -> fmt::Result {
        if !self.results.has_host_network() {
            return Ok(());
        }

        let title = "Host Network Overhead";
        let val = match compare::tcp_stream_overhead(self.results, self.selection) {
            Ok(v) => format!("{:.2}%", v),
            Err(e) => {
                self.record_failure(title, "TCP_STREAM".into(), e);
                NA.to_string()
            }
        };
        let line = format!(
            "TCP_STREAM host network vs pod network throughput: {} (reruns: {})",
            val, self.selection
        );
        writeln!(out, "{}", format_banner(title, line.chars().count()))?;
        writeln!(out, "{}\n", line)
    }

    /// All tables in report order.
    pub fn format_all(&mut self, out: &mut dyn Write) -> fmt::Result {
        self.format_pod_cpu(out)?;
        self.format_node_cpu(out)?;
        self.format_stream(out)?;
        self.format_latency(out)?;
        self.format_rr(out)?;
        self.format_overhead(out)
    }

    fn sample_pcts(&mut self, sample: &Sample, series: Series) -> Option<PctsMap> {
        match study::study_pcts(series.of(sample), None) {
            Ok(pcts) => Some(pcts),
            Err(e) => {
                self.record_failure("Distributions", sample.to_string(), e);
                None
            }
        }
    }

    /// Throughput and latency distributions of every sample.
    pub fn format_pcts(&mut self, out: &mut dyn Write) -> fmt::Result {
        let results = self.results;
        for sample in results.iter() {
            write!(
                out,
                "{}",
                underline(&format!(
                    "{} {}",
                    sample,
                    format_period(&sample.start_time, &sample.end_time)
                ))
            )?;
            let tput = self.sample_pcts(sample, Series::Throughput);
            let lat = self.sample_pcts(sample, Series::Latency);
            let tput_name = format!("tput({})", Series::Throughput.unit(sample));
            let lat_name = format!("lat({})", LAT_UNIT);
            let width = tput_name.len().max(lat_name.len());

            study::print_pcts_header(out, width, "", None)?;
            study::print_pcts_line(out, width, &tput_name, tput.as_ref(), format_value, None)?;
            study::print_pcts_line(out, width, &lat_name, lat.as_ref(), format_value, None)?;
            writeln!(out, "")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Reporter;
    use crate::study::StatError;
    use netperf_bench_intf::{Config, NodeCpu, Profile, Sample, ScenarioResults, Selection};
    use netperf_util::NA;

    fn sample(profile: Profile, host_network: bool, tput: Vec<f64>, lat: Vec<f64>) -> Sample {
        Sample::new(Config::new(profile, 1024, 10, 3), host_network, false)
            .throughput(tput)
            .latency(lat)
    }

    fn results(samples: Vec<Sample>) -> ScenarioResults {
        let mut results = ScenarioResults::new();
        for sample in samples {
            results.push(sample).unwrap();
        }
        results
    }

    fn render<F>(results: &ScenarioResults, func: F) -> (String, usize)
    where
        F: FnOnce(&mut Reporter, &mut String) -> std::fmt::Result,
    {
        let _ = ::env_logger::try_init();
        let mut reporter = Reporter::new(results, Selection::First);
        let mut buf = String::new();
        func(&mut reporter, &mut buf).unwrap();
        (buf, reporter.failures().len())
    }

    #[test]
    fn test_rr_tables_skipped_without_rr_samples() {
        let results = results(vec![
            sample(Profile::TcpStream, false, vec![900.0, 1000.0, 1100.0], vec![5.0]),
            sample(Profile::UdpStream, false, vec![800.0], vec![6.0]),
        ]);
        let (out, nr_failed) = render(&results, |r, buf| r.format_all(buf));

        assert!(out.contains(" Stream Results "));
        assert!(out.contains(" Stream Latency Results "));
        assert!(!out.contains("RR Results"));
        assert!(!out.contains("RR Latency Results"));
        assert!(!out.contains("Host Network Overhead"));
        assert!(!out.contains("Pod CPU Utilization"));
        assert!(out.contains("Node CPU Utilization"));
        assert_eq!(nr_failed, 0);

        let (rr_out, _) = render(&results, |r, buf| r.format_rr(buf));
        assert_eq!(rr_out, "");
    }

    #[test]
    fn test_stream_table_rows() {
        let results = results(vec![
            sample(Profile::TcpStream, true, vec![100.0, 110.0, 90.0], vec![]),
            sample(Profile::TcpRr, false, vec![20000.0], vec![45.0]),
            sample(Profile::UdpStream, false, vec![50.0, 60.0, 40.0], vec![]),
        ]);
        let (out, _) = render(&results, |r, buf| r.format_stream(buf));
        let lines: Vec<&str> = out.lines().collect();

        // banner, header, rule, 2 rows, rule, blank
        assert_eq!(lines.len(), 7, "{}", &out);
        assert!(lines[0].starts_with('-') && lines[0].contains(" Stream Results "));
        assert!(lines[1].starts_with("Scenario"));
        assert_eq!(lines[0].chars().count(), lines[1].chars().count());
        assert!(lines[3].starts_with("TCP_STREAM   | true "));
        assert!(lines[3].contains("100.000000"));
        assert!(lines[3].ends_with("(Mb/s)"));
        assert!(lines[4].starts_with("UDP_STREAM   | false"));
        assert!(lines[4].contains("50.000000"));
        assert!(!out.contains("TCP_RR"));
    }

    #[test]
    fn test_empty_series_row_shows_placeholder() {
        let results = results(vec![
            sample(Profile::TcpStream, false, vec![], vec![]),
            sample(Profile::TcpStream, true, vec![10.0], vec![1.0]),
        ]);
        let mut reporter = Reporter::new(&results, Selection::First);
        let mut buf = String::new();
        reporter.format_stream(&mut buf).unwrap();

        let lines: Vec<&str> = buf.lines().collect();
        assert!(lines[3].ends_with(&format!("| {}", NA)), "{}", lines[3]);
        assert!(lines[4].contains("10.000000"));
        assert_eq!(reporter.failures().len(), 1);
        assert_eq!(reporter.failures()[0].table, "Stream Results");
        assert_eq!(reporter.failures()[0].error, StatError::EmptySeries);
    }

    #[test]
    fn test_latency_tables() {
        let results = results(vec![
            sample(Profile::TcpRr, false, vec![1.0], vec![40.0, 50.0, 45.0]),
            sample(Profile::UdpRr, true, vec![1.0], vec![]),
        ]);
        let (out, nr_failed) = render(&results, |r, buf| r.format_latency(buf));
        assert!(!out.contains("Stream Latency Results"));
        assert!(out.contains(" RR Latency Results "));
        assert!(out.contains("45.000000       (usec)"));
        assert!(out.contains(NA));
        assert_eq!(nr_failed, 1);
    }

    #[test]
    fn test_pod_cpu() {
        let mut first = sample(Profile::TcpStream, false, vec![1.0], vec![1.0]);
        first
            .client_pod_cpu
            .push("client-7c9d8f6b5-abcdefghijklmnop", 12.5);
        first.server_pod_cpu.push("server-0", 7.25);
        first.server_pod_cpu.push("server-1", 3.0);
        let mut second = sample(Profile::TcpRr, true, vec![1.0], vec![1.0]);
        second.client_pod_cpu.push("client-1", 1.0);
        let results = results(vec![first, second]);

        let (out, _) = render(&results, |r, buf| r.format_pod_cpu(buf));
        let rows: Vec<&str> = out
            .lines()
            .filter(|l| l.starts_with("Client") || l.starts_with("Server"))
            .collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].starts_with("Client | TCP_STREAM"));
        assert!(rows[0].contains("| client-7c9d8f6b5-abc | 12.500000"));
        assert!(rows[1].starts_with("Server") && rows[1].contains("server-0"));
        assert!(rows[2].starts_with("Server") && rows[2].contains("server-1"));
        assert!(rows[3].starts_with("Client | TCP_RR"));

        let (none, _) = render(
            &self::results(vec![sample(Profile::TcpRr, true, vec![1.0], vec![1.0])]),
            |r, buf| r.format_pod_cpu(buf),
        );
        assert_eq!(none, "");
    }

    #[test]
    fn test_node_cpu_uses_each_roles_metrics() {
        let mut s = sample(Profile::TcpStream, false, vec![1.0], vec![1.0]);
        s.client_metrics = NodeCpu {
            idle: 90.0,
            iowait: 1.5,
            ..Default::default()
        };
        s.server_metrics = NodeCpu {
            idle: 80.0,
            iowait: 2.5,
            irq: 0.25,
            ..Default::default()
        };
        let (out, _) = render(&results(vec![s]), |r, buf| r.format_node_cpu(buf));
        let rows: Vec<&str> = out
            .lines()
            .filter(|l| l.starts_with("Client") || l.starts_with("Server"))
            .collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("90.0000") && rows[0].contains("1.5000"));
        assert!(rows[1].contains("80.0000") && rows[1].contains("2.5000"));
        assert!(rows[1].ends_with("| 0.2500"));
        assert!(!rows[1].contains("1.5000"));

        let (none, _) = render(&ScenarioResults::new(), |r, buf| r.format_node_cpu(buf));
        assert_eq!(none, "");
    }

    #[test]
    fn test_overhead_line() {
        let results = results(vec![
            sample(Profile::TcpStream, true, vec![100.0, 110.0, 90.0], vec![1.0]),
            sample(Profile::TcpStream, false, vec![50.0, 60.0, 40.0], vec![1.0]),
        ]);
        let (out, nr_failed) = render(&results, |r, buf| r.format_all(buf));
        assert!(out.contains(" Host Network Overhead "));
        assert!(out.contains("throughput: 66.67% (reruns: first)"));
        assert_eq!(nr_failed, 0);

        let host_only = self::results(vec![sample(
            Profile::TcpStream,
            true,
            vec![100.0],
            vec![1.0],
        )]);
        let (out, nr_failed) = render(&host_only, |r, buf| r.format_overhead(buf));
        assert!(out.contains(&format!("throughput: {} ", NA)));
        assert_eq!(nr_failed, 1);
    }

    #[test]
    fn test_format_pcts() {
        let start = chrono::Local::now();
        let results = results(vec![sample(
            Profile::TcpStream,
            false,
            vec![100.0, 200.0, 300.0],
            vec![],
        )
        .period(start, start + chrono::Duration::seconds(10))]);
        let (out, nr_failed) = render(&results, |r, buf| r.format_pcts(buf));
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("TCP_STREAM[msg=1024]"));
        assert!(lines[0].ends_with("(10.0s)"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert!(lines[2].contains("min") && lines[2].contains("p99"));
        assert!(lines[3].starts_with("tput(Mb/s)") && lines[3].contains("  200 "));
        assert!(lines[4].starts_with("lat(usec)") && lines[4].trim_end().ends_with('-'));
        assert_eq!(nr_failed, 1);
    }
}
