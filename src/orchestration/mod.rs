//! Orchestration layer for release distribution
//!
//! This module provides the pipeline orchestrator that sequences the remote
//! steps of a distribution run and the report it returns.

pub mod pipeline;

pub use pipeline::{DistributeReport, ReleasePipeline};
