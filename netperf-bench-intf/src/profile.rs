// Copyright (c) Facebook, Inc. and its affiliates.
use anyhow::{bail, Result};
use enum_iterator::IntoEnumIterator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Benchmark microbenchmark type of a scenario, named after the netperf
/// test it drives.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, IntoEnumIterator, Serialize, Deserialize,
)]
pub enum Profile {
    #[serde(rename = "TCP_STREAM")]
    TcpStream,
    #[serde(rename = "UDP_STREAM")]
    UdpStream,
    #[serde(rename = "TCP_RR")]
    TcpRr,
    #[serde(rename = "UDP_RR")]
    UdpRr,
    #[serde(rename = "TCP_CRR")]
    TcpCrr,
}

/// Coarse grouping of profiles. Each report table covers one family.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, IntoEnumIterator, Serialize, Deserialize,
)]
pub enum Family {
    Stream,
    RR,
}

impl Profile {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::TcpStream => "TCP_STREAM",
            Self::UdpStream => "UDP_STREAM",
            Self::TcpRr => "TCP_RR",
            Self::UdpRr => "UDP_RR",
            Self::TcpCrr => "TCP_CRR",
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Self::TcpStream | Self::UdpStream => Family::Stream,
            Self::TcpRr | Self::UdpRr | Self::TcpCrr => Family::RR,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // pad() so that width specs in the report tables apply
        f.pad(self.tag())
    }
}

impl FromStr for Profile {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self> {
        let upper = input.trim().to_uppercase();
        for profile in Self::into_enum_iter() {
            if profile.tag() == upper {
                return Ok(profile);
            }
        }
        bail!("unknown profile {:?}", input);
    }
}

impl Family {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stream => "Stream",
            Self::RR => "RR",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.name())
    }
}
