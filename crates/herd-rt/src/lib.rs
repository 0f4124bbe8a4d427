//! ---
//! herd_section: "01-core-functionality"
//! herd_subsection: "module"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Runtime helpers supporting the simulation driver."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
//! Scheduling helpers for the emulator runtime.

pub mod scheduling;

pub use scheduling::{sleep_or_stop, StopListener, StopSignal};
