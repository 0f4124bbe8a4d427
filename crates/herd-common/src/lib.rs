//! ---
//! herd_section: "01-core-functionality"
//! herd_subsection: "module"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Shared configuration and logging primitives."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
//! Shared primitives for the herd emulator workspace: the explicit
//! configuration structure handed to every constructor, and tracing setup.

pub mod config;
pub mod logging;

pub use config::{
    ApiConfig, AppConfig, Coordinate, HerdConfig, LoadedAppConfig, LoggingConfig, MotionConfig,
    ScheduleConfig, ScheduleMode, SpreadConfig, SpreadPattern, TelemetryConfig, ValueRange,
};
pub use logging::{init_tracing, LogFormat};
