//! Experiment files, the multi-run driver and result dumping.
//!
//! # Key Types
//!
//! - [`RunConfig`]: experiment file (JSON)
//! - [`ExperimentDriver`]: loads once, runs `iteration` times
//! - [`Dumper`]: `i_k.json` / `s_k.txt` / `v_k.txt` writer

mod config;
mod driver;
mod dumper;

pub use config::RunConfig;
pub use driver::{ExperimentDriver, RunSummary};
pub use dumper::Dumper;
