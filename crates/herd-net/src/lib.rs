//! ---
//! herd_section: "05-networking-external-interfaces"
//! herd_subsection: "module"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Transmission sinks for simulated telemetry."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
//! Delivery of telemetry records to the external tracking API.

pub mod sink;

pub use sink::{HttpSink, SinkError, StdoutSink, TelemetrySink};
