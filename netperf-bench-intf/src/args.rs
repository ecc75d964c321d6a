// Copyright (c) Facebook, Inc. and its affiliates.
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use netperf_util::*;

lazy_static::lazy_static! {
    static ref TOP_ARGS_STR: String = {
        let dfl_args = Args::default();
        format!(
            "-r, --result=[RESULTFILE]    'Result json file'
             -a, --args=[FILE]            'Loads base command line arguments from FILE'
                 --overhead=[SELECTION]   'How TCP_STREAM reruns feed the host network overhead, first|median (dfl: {dfl_overhead})'
             -v...                        'Sets the level of verbosity'",
            dfl_overhead = dfl_args.overhead,
        )
    };
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mode {
    Format,
    Summary,
}

/// Which samples feed a comparative metric when a scenario was run more
/// than once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Selection {
    /// Only the first matching sample, later reruns are ignored.
    #[serde(rename = "first")]
    First,
    /// Median of the per-sample medians of all matching samples.
    #[serde(rename = "median")]
    MedianOfAll,
}

impl Default for Selection {
    fn default() -> Self {
        Self::First
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(match self {
            Self::First => "first",
            Self::MedianOfAll => "median",
        })
    }
}

impl FromStr for Selection {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self> {
        match input {
            "first" => Ok(Self::First),
            "median" => Ok(Self::MedianOfAll),
            v => bail!("invalid selection {:?}, must be \"first\" or \"median\"", v),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Args {
    pub mode: Mode,
    pub overhead: Selection,

    #[serde(skip)]
    pub result: String,
    #[serde(skip)]
    pub pcts: bool,
    #[serde(skip)]
    pub verbosity: u32,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            mode: Mode::Format,
            overhead: Default::default(),
            result: "".into(),
            pcts: false,
            verbosity: 0,
        }
    }
}

impl JsonLoad for Args {}
impl JsonSave for Args {}

impl JsonArgs for Args {
    #[allow(dangerous_implicit_autorefs)]
    fn match_cmdline() -> clap::ArgMatches<'static> {
        clap::App::new("netperf-bench")
            .version(*super::VERSION)
            .author(clap::crate_authors!("\n"))
            .about("Kubernetes network performance result reports")
            .setting(clap::AppSettings::UnifiedHelpMessage)
            .setting(clap::AppSettings::DeriveDisplayOrder)
            .args_from_usage(&TOP_ARGS_STR)
            .subcommand(
                clap::SubCommand::with_name("format")
                    .about("Formats benchmark results as tables")
                    .arg(
                        clap::Arg::with_name("pcts")
                            .long("pcts")
                            .short("p")
                            .help("Show throughput and latency distributions of each sample"),
                    ),
            )
            .subcommand(
                clap::SubCommand::with_name("summary")
                    .about("Prints per-scenario summaries as json for archiving"),
            )
            .get_matches()
    }

    fn verbosity(matches: &clap::ArgMatches) -> u32 {
        matches.occurrences_of("v") as u32
    }

    fn process_cmdline(&mut self, matches: &clap::ArgMatches) -> Result<bool> {
        let dfl = Args::default();
        let mut updated = false;

        if let Some(v) = matches.value_of("overhead") {
            self.overhead = if v.len() > 0 {
                v.parse::<Selection>()?
            } else {
                dfl.overhead
            };
            updated = true;
        }

        self.result = matches.value_of("result").unwrap_or("").into();
        self.verbosity = Self::verbosity(matches);

        match matches.subcommand() {
            ("format", Some(subm)) => {
                if self.mode != Mode::Format {
                    self.mode = Mode::Format;
                    updated = true;
                }
                self.pcts = subm.is_present("pcts");
            }
            ("summary", Some(_subm)) => {
                if self.mode != Mode::Summary {
                    self.mode = Mode::Summary;
                    updated = true;
                }
            }
            _ => {}
        }

        if self.result.len() == 0 {
            bail!("{:?} requires --result", &self.mode);
        }

        Ok(updated)
    }
}
