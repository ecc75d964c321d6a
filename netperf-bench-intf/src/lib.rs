// Copyright (c) Facebook, Inc. and its affiliates.
pub mod args;
pub mod profile;
pub mod results;
pub mod sample;

pub use args::{Args, Mode, Selection};
pub use profile::{Family, Profile};
pub use results::{ScenarioResults, SharedResults};
pub use sample::{mark_vm, Config, NodeCpu, NodeInfo, PodCpu, PodValues, Sample, SampleError};

lazy_static::lazy_static! {
    pub static ref VERSION: &'static str = env!("CARGO_PKG_VERSION");
}
