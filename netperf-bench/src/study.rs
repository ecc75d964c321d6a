// Copyright (c) Facebook, Inc. and its affiliates.
use std::collections::BTreeMap;
use std::fmt::{self, Write};
use thiserror::Error;

use netperf_bench_intf::Profile;
use netperf_util::*;

pub const DFL_PCTS: &[&'static str] = &[
    "00", "01", "05", "25", "50", "75", "95", "99", "100", "mean", "stdev",
];

pub type PctsMap = BTreeMap<String, f64>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatError {
    #[error("no measurements in series")]
    EmptySeries,
    #[error("percentile {0} is outside (0, 100]")]
    InvalidPercentile(f64),
    #[error("percent difference of two zeros")]
    DivisionByZero,
    #[error("no {profile} sample with host_network={host_network}")]
    MissingScenario { profile: Profile, host_network: bool },
}

fn sorted(series: &[f64]) -> Result<Vec<f64>, StatError> {
    if series.is_empty() {
        return Err(StatError::EmptySeries);
    }
    let mut data = series.to_vec();
    data.sort_by(|a, b| a.total_cmp(b));
    Ok(data)
}

/// Median of `series`, the mean of the two middle values for even lengths.
/// The midpoint is taken as `lo + (hi - lo) / 2` which can't overflow for
/// non-negative inputs.
pub fn median(series: &[f64]) -> Result<f64, StatError> {
    let data = sorted(series)?;
    let mid = data.len() / 2;
    if data.len() % 2 == 1 {
        Ok(data[mid])
    } else {
        let (lo, hi) = (data[mid - 1], data[mid]);
        Ok(lo + (hi - lo) / 2.0)
    }
}

/// `p`th percentile of `series` for `0 < p <= 100`.
///
/// Linearly interpolates between the closest ranks of the sorted series:
/// the rank is `p / 100 * (n - 1)` and a fractional rank blends the two
/// neighboring order statistics. `p = 100` yields the maximum, `p = 50` the
/// median and `p` approaching zero the minimum.
pub fn percentile(series: &[f64], p: f64) -> Result<f64, StatError> {
    if !(p > 0.0 && p <= 100.0) {
        return Err(StatError::InvalidPercentile(p));
    }
    let data = sorted(series)?;

    let rank = p / 100.0 * (data.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    Ok(data[lo] + (data[hi] - data[lo]) * (rank - lo as f64))
}

pub fn min_max(series: &[f64]) -> Result<(f64, f64), StatError> {
    let data = sorted(series)?;
    Ok((data[0], data[data.len() - 1]))
}

/// Mean and sample standard deviation. The latter is zero for a single
/// measurement.
pub fn mean_stdev(series: &[f64]) -> Result<(f64, f64), StatError> {
    if series.is_empty() {
        return Err(StatError::EmptySeries);
    }
    let mean = statistical::mean(series);
    let stdev = match series.len() {
        1 => 0.0,
        _ => statistical::standard_deviation(series, Some(mean)),
    };
    Ok((mean, stdev))
}

/// Distribution of `series` keyed by the labels in `pcts`. "00" is the
/// minimum, numeric labels are percentiles, "mean" and "stdev" are what
/// they say.
pub fn study_pcts(series: &[f64], pcts: Option<&[&str]>) -> Result<PctsMap, StatError> {
    let pcts = pcts.unwrap_or(DFL_PCTS);
    let (mean, stdev) = mean_stdev(series)?;

    pcts.iter()
        .map(|pct| -> Result<(String, f64), StatError> {
            let val = match *pct {
                "mean" => mean,
                "stdev" => stdev,
                "0" | "00" => min_max(series)?.0,
                pct => percentile(series, pct.parse::<f64>().unwrap_or(std::f64::NAN))?,
            };
            Ok((pct.to_string(), val))
        })
        .collect()
}

//
// Pcts print helpers
//
pub fn print_pcts_header(
    out: &mut dyn Write,
    max_field_name_len: usize,
    name: &str,
    pcts: Option<&[&str]>,
) -> fmt::Result {
    let pcts = pcts.unwrap_or(DFL_PCTS);
    let name = if name.len() > 0 {
        format!("[{}]", name)
    } else {
        "".to_string()
    };
    writeln!(
        out,
        "{:<width$}  {}",
        &name,
        pcts.iter()
            .map(|x| format!("{:>5}", format_percentile(*x)))
            .collect::<Vec<String>>()
            .join(" "),
        width = max_field_name_len.max(10),
    )
}

/// Prints one distribution line. Unavailable distributions are shown as
/// a row of dashes.
pub fn print_pcts_line<F>(
    out: &mut dyn Write,
    max_field_name_len: usize,
    field_name: &str,
    data: Option<&PctsMap>,
    fmt: F,
    pcts: Option<&[&str]>,
) -> fmt::Result
where
    F: Fn(f64) -> String,
{
    let pcts = pcts.unwrap_or(DFL_PCTS);
    write!(
        out,
        "{:<width$}  ",
        field_name,
        width = max_field_name_len.max(10)
    )?;

    match data {
        Some(data) => {
            for pct in pcts.iter() {
                write!(out, "{:>5} ", fmt(data[*pct]))?;
            }
        }
        None => {
            for _ in pcts.iter() {
                write!(out, "{:>5} ", "-")?;
            }
        }
    }
    writeln!(out, "")
}
