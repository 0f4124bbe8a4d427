//! ---
//! herd_section: "01-core-functionality"
//! herd_subsection: "module"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Simulation driver and run reporting."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
//! Drives a herd of entity simulators against a telemetry sink.

pub mod driver;
pub mod report;

pub use driver::SimulationDriver;
pub use report::{CycleSummary, RunSummary, WorkerOutcome, WorkerReport};
