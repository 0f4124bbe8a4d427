//! ---
//! herd_section: "01-core-functionality"
//! herd_subsection: "module"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Emulator configuration structure, loading and validation."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds, DurationSeconds};
use tracing::debug;
use url::Url;

use crate::logging::LogFormat;

fn default_base_url() -> String {
    "http://localhost:5192".to_owned()
}

fn default_endpoint_path() -> String {
    "/api/tracking/tracker-data".to_owned()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_accepted_status() -> u16 {
    200
}

fn default_entity_count() -> usize {
    10
}

fn default_base() -> Coordinate {
    Coordinate {
        latitude: -33.0167,
        longitude: -58.5167,
    }
}

fn default_containment_radius() -> f64 {
    0.007
}

fn default_device_id_prefix() -> String {
    "COW_GPS_ER_".to_owned()
}

fn default_tag_prefix() -> String {
    "ER".to_owned()
}

fn default_entity_stagger() -> Duration {
    Duration::from_millis(500)
}

fn default_cycle_period() -> Duration {
    Duration::from_secs(20)
}

fn default_worker_interval() -> ValueRange<u64> {
    ValueRange::new(15, 25)
}

fn default_startup_stagger() -> Duration {
    Duration::from_millis(500)
}

fn default_shutdown_grace() -> Duration {
    Duration::from_secs(5)
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

/// Inclusive `[min, max]` range used for every sampled quantity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ValueRange<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> ValueRange<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }

    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Latitude/longitude pair expressed in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn validate(&self, label: &str) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            bail!("{label}: latitude {} is out of range", self.latitude);
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            bail!("{label}: longitude {} is out of range", self.longitude);
        }
        Ok(())
    }
}

/// Primary configuration object for the emulator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub herd: HerdConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Master seed; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    /// `None` when no file was found and built-in defaults apply.
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "HERD_EMU_CONFIG";

    /// Load configuration together with the effective source path.
    ///
    /// `HERD_EMU_CONFIG` takes precedence over `candidates`. When neither
    /// yields an existing file the defaults are returned unvalidated so the
    /// caller can apply command line overrides first.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                let config = Self::from_path(path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path.to_path_buf()),
                });
            }
        }

        debug!(
            inspected = %candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            "no configuration file found; using defaults"
        );
        Ok(LoadedAppConfig {
            config: AppConfig::default(),
            source: None,
        })
    }

    /// Load exactly `path`. A missing or unreadable file is an error; no
    /// candidate or default fallback applies.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<LoadedAppConfig> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("config file {} does not exist", path.display());
        }
        let config = Self::from_path(path)?;
        Ok(LoadedAppConfig {
            config,
            source: Some(path.to_path_buf()),
        })
    }

    fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Validate structural invariants. Any failure is fatal at startup.
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.herd.validate()?;
        self.motion.validate()?;
        self.telemetry.validate()?;
        self.schedule.validate()?;
        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Remote tracking API the telemetry is posted to.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_endpoint_path")]
    pub endpoint_path: String,
    #[serde(default = "default_request_timeout")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub request_timeout: Duration,
    #[serde(default = "default_accepted_status")]
    pub accepted_status: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint_path: default_endpoint_path(),
            request_timeout: default_request_timeout(),
            accepted_status: default_accepted_status(),
        }
    }
}

impl ApiConfig {
    /// Absolute URL of the telemetry endpoint.
    pub fn endpoint_url(&self) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .with_context(|| format!("api base_url '{}' is not a valid url", self.base_url))?;
        base.join(&self.endpoint_path).with_context(|| {
            format!(
                "api endpoint_path '{}' cannot be joined to '{}'",
                self.endpoint_path, self.base_url
            )
        })
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.endpoint_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("api base_url must use http or https, got '{}'", url.scheme());
        }
        if self.request_timeout.is_zero() {
            bail!("api request_timeout must be greater than zero");
        }
        if !(100..=599).contains(&self.accepted_status) {
            bail!(
                "api accepted_status {} is not an http status code",
                self.accepted_status
            );
        }
        Ok(())
    }
}

/// How initial home ranges are laid out around the base coordinate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SpreadPattern {
    /// Every entity gets its own home-range center on a ring around the base.
    #[default]
    Ring,
    /// All entities share the base as center and start spread on a ring.
    SharedPasture,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadConfig {
    #[serde(default)]
    pub pattern: SpreadPattern,
    /// Ring distance from the base in degrees.
    #[serde(default = "SpreadConfig::default_offset")]
    pub offset_deg: ValueRange<f64>,
}

impl SpreadConfig {
    fn default_offset() -> ValueRange<f64> {
        ValueRange::new(0.002, 0.005)
    }
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            pattern: SpreadPattern::default(),
            offset_deg: Self::default_offset(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HerdConfig {
    #[serde(default = "default_entity_count")]
    pub count: usize,
    #[serde(default = "default_base")]
    pub base: Coordinate,
    /// Allowed excursion from each home-range center, in degrees.
    #[serde(default = "default_containment_radius")]
    pub containment_radius_deg: f64,
    #[serde(default)]
    pub spread: SpreadConfig,
    #[serde(default = "default_device_id_prefix")]
    pub device_id_prefix: String,
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,
}

impl Default for HerdConfig {
    fn default() -> Self {
        Self {
            count: default_entity_count(),
            base: default_base(),
            containment_radius_deg: default_containment_radius(),
            spread: SpreadConfig::default(),
            device_id_prefix: default_device_id_prefix(),
            tag_prefix: default_tag_prefix(),
        }
    }
}

impl HerdConfig {
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            bail!("herd count must be at least one");
        }
        self.base.validate("herd base")?;
        if !self.containment_radius_deg.is_finite() || self.containment_radius_deg <= 0.0 {
            bail!(
                "herd containment_radius_deg must be positive, got {}",
                self.containment_radius_deg
            );
        }
        let offset = &self.spread.offset_deg;
        if !offset.is_ordered() || offset.min < 0.0 {
            bail!("herd spread offset_deg must satisfy 0 <= min <= max");
        }
        if self.spread.pattern == SpreadPattern::SharedPasture
            && offset.max >= self.containment_radius_deg
        {
            bail!(
                "shared-pasture spread offset max {} must lie inside the containment radius {}",
                offset.max,
                self.containment_radius_deg
            );
        }
        if self.device_id_prefix.trim().is_empty() {
            bail!("herd device_id_prefix must not be empty");
        }
        Ok(())
    }
}

/// Movement model tuning. Step sizes are degrees per tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Per-tick probability that a grazing entity starts resting.
    pub rest_probability: f64,
    /// Length of a resting period in ticks.
    pub rest_cycles: ValueRange<u32>,
    pub resting_step_deg: ValueRange<f64>,
    pub grazing_step_deg: ValueRange<f64>,
    /// Heading change per tick in degrees, applied as a signed offset.
    pub resting_turn_deg: ValueRange<f64>,
    pub grazing_turn_deg: ValueRange<f64>,
    /// Jitter applied when re-heading toward the center after a rejected step.
    pub return_turn_deg: ValueRange<f64>,
    /// Share of the remaining distance covered when pulled back toward center.
    pub return_fraction: f64,
    /// Reported grazing speed in m/s.
    pub grazing_speed: ValueRange<f64>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            rest_probability: 0.15,
            rest_cycles: ValueRange::new(2, 6),
            resting_step_deg: ValueRange::new(0.00001, 0.00005),
            grazing_step_deg: ValueRange::new(0.0001, 0.0003),
            resting_turn_deg: ValueRange::new(-30.0, 30.0),
            grazing_turn_deg: ValueRange::new(-45.0, 45.0),
            return_turn_deg: ValueRange::new(-30.0, 30.0),
            return_fraction: 0.2,
            grazing_speed: ValueRange::new(0.2, 1.5),
        }
    }
}

impl MotionConfig {
    pub fn validate(&self) -> Result<()> {
        check_probability("motion rest_probability", self.rest_probability)?;
        if !self.rest_cycles.is_ordered() || self.rest_cycles.min == 0 {
            bail!("motion rest_cycles must satisfy 1 <= min <= max");
        }
        check_non_negative("motion resting_step_deg", &self.resting_step_deg)?;
        check_non_negative("motion grazing_step_deg", &self.grazing_step_deg)?;
        check_ordered("motion resting_turn_deg", &self.resting_turn_deg)?;
        check_ordered("motion grazing_turn_deg", &self.grazing_turn_deg)?;
        check_ordered("motion return_turn_deg", &self.return_turn_deg)?;
        if !(self.return_fraction > 0.0 && self.return_fraction <= 1.0) {
            bail!(
                "motion return_fraction must lie in (0, 1], got {}",
                self.return_fraction
            );
        }
        check_non_negative("motion grazing_speed", &self.grazing_speed)?;
        if self.grazing_speed.min <= 0.0 {
            bail!("motion grazing_speed min must be greater than zero");
        }
        Ok(())
    }
}

/// Sensor ranges for the physiological and device readings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub altitude_m: ValueRange<f64>,
    pub temperature_c: ValueRange<f64>,
    pub signal_strength: ValueRange<u32>,
    pub resting_activity: ValueRange<u32>,
    pub grazing_activity: ValueRange<u32>,
    pub initial_battery: ValueRange<u32>,
    pub battery_floor: u32,
    /// Per-tick probability of a one point battery drop.
    pub battery_drain_probability: f64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            altitude_m: ValueRange::new(15.0, 25.0),
            temperature_c: ValueRange::new(36.5, 39.5),
            signal_strength: ValueRange::new(70, 95),
            resting_activity: ValueRange::new(1, 3),
            grazing_activity: ValueRange::new(4, 9),
            initial_battery: ValueRange::new(85, 100),
            battery_floor: 10,
            battery_drain_probability: 0.25,
        }
    }
}

impl TelemetryConfig {
    pub fn validate(&self) -> Result<()> {
        check_ordered("telemetry altitude_m", &self.altitude_m)?;
        check_ordered("telemetry temperature_c", &self.temperature_c)?;
        check_ordered("telemetry signal_strength", &self.signal_strength)?;
        check_ordered("telemetry resting_activity", &self.resting_activity)?;
        check_ordered("telemetry grazing_activity", &self.grazing_activity)?;
        check_ordered("telemetry initial_battery", &self.initial_battery)?;
        if self.initial_battery.max > 100 {
            bail!("telemetry initial_battery cannot exceed 100");
        }
        if self.battery_floor > self.initial_battery.min {
            bail!(
                "telemetry battery_floor {} exceeds the initial battery minimum {}",
                self.battery_floor,
                self.initial_battery.min
            );
        }
        check_probability(
            "telemetry battery_drain_probability",
            self.battery_drain_probability,
        )?;
        Ok(())
    }
}

/// Scheduling model of the driver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    /// One loop advancing every entity in order, once per cycle.
    #[default]
    Sequential,
    /// One task per entity on its own randomized interval.
    Concurrent,
}

impl std::str::FromStr for ScheduleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" => Ok(ScheduleMode::Sequential),
            "concurrent" => Ok(ScheduleMode::Concurrent),
            other => Err(format!("unknown schedule mode: {}", other)),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub mode: ScheduleMode,
    /// Pause between two entities within a sequential cycle.
    #[serde(default = "default_entity_stagger")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub entity_stagger: Duration,
    /// Target length of a full sequential cycle.
    #[serde(default = "default_cycle_period")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub cycle_period: Duration,
    /// Per-worker send interval in seconds, sampled once per worker.
    #[serde(default = "default_worker_interval")]
    pub worker_interval_secs: ValueRange<u64>,
    /// Pause between spawning two concurrent workers.
    #[serde(default = "default_startup_stagger")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub startup_stagger: Duration,
    /// Total run time; runs until stopped when absent.
    #[serde(default)]
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    pub duration: Option<Duration>,
    /// How long to wait for workers to finish after the stop signal.
    #[serde(default = "default_shutdown_grace")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub shutdown_grace: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            mode: ScheduleMode::default(),
            entity_stagger: default_entity_stagger(),
            cycle_period: default_cycle_period(),
            worker_interval_secs: default_worker_interval(),
            startup_stagger: default_startup_stagger(),
            duration: None,
            shutdown_grace: default_shutdown_grace(),
        }
    }
}

impl ScheduleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cycle_period.is_zero() {
            bail!("schedule cycle_period must be greater than zero");
        }
        check_ordered("schedule worker_interval_secs", &self.worker_interval_secs)?;
        if self.worker_interval_secs.min == 0 {
            bail!("schedule worker_interval_secs min must be greater than zero");
        }
        if matches!(self.duration, Some(d) if d.is_zero()) {
            bail!("schedule duration must be greater than zero when set");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    /// Also write a daily rolling JSON log file.
    #[serde(default)]
    pub file_enabled: bool,
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            file_enabled: false,
            directory: default_logging_directory(),
            file_prefix: None,
        }
    }
}

fn check_probability(label: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(anyhow!("{label} must lie in [0, 1], got {value}"));
    }
    Ok(())
}

fn check_ordered<T: PartialOrd + Copy + std::fmt::Display>(
    label: &str,
    range: &ValueRange<T>,
) -> Result<()> {
    if !range.is_ordered() {
        return Err(anyhow!(
            "{label} min {} is greater than max {}",
            range.min,
            range.max
        ));
    }
    Ok(())
}

fn check_non_negative(label: &str, range: &ValueRange<f64>) -> Result<()> {
    check_ordered(label, range)?;
    if range.min < 0.0 || !range.max.is_finite() {
        return Err(anyhow!("{label} must be a finite non-negative range"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::str::FromStr;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_validate() {
        AppConfig::default().validate().expect("defaults are valid");
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_str("").unwrap();
        assert_eq!(config.herd.count, 10);
        assert_eq!(config.schedule.mode, ScheduleMode::Sequential);
        assert_eq!(config.api.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn parses_sections_and_durations() {
        let config = AppConfig::from_str(
            r#"
            seed = 7

            [api]
            base_url = "http://127.0.0.1:5191"
            request_timeout = 5

            [herd]
            count = 15
            containment_radius_deg = 0.005
            base = { latitude = -33.0, longitude = -58.5 }
            spread = { pattern = "shared-pasture", offset_deg = { min = 0.001, max = 0.004 } }

            [schedule]
            mode = "concurrent"
            entity_stagger = 3000
            cycle_period = 60
            duration = 3600
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.herd.count, 15);
        assert_eq!(config.herd.spread.pattern, SpreadPattern::SharedPasture);
        assert_eq!(config.schedule.mode, ScheduleMode::Concurrent);
        assert_eq!(config.schedule.entity_stagger, Duration::from_secs(3));
        assert_eq!(config.schedule.duration, Some(Duration::from_secs(3600)));
        assert_eq!(
            config.api.endpoint_url().unwrap().as_str(),
            "http://127.0.0.1:5191/api/tracking/tracker-data"
        );
    }

    #[test]
    fn rejects_zero_entities() {
        let err = AppConfig::from_str("[herd]\ncount = 0\n").unwrap_err();
        assert!(err.to_string().contains("at least one"));
    }

    #[test]
    fn rejects_non_positive_radius() {
        let mut config = AppConfig::default();
        config.herd.containment_radius_deg = 0.0;
        assert!(config.validate().is_err());
        config.herd.containment_radius_deg = -0.01;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_shared_pasture_spread_outside_radius() {
        let mut config = AppConfig::default();
        config.herd.spread.pattern = SpreadPattern::SharedPasture;
        config.herd.spread.offset_deg = ValueRange::new(0.001, 0.01);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unordered_ranges_and_bad_probabilities() {
        let mut config = AppConfig::default();
        config.motion.grazing_step_deg = ValueRange::new(0.0003, 0.0001);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.motion.rest_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.motion.return_fraction = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_invalid_base_url() {
        let mut config = AppConfig::default();
        config.api.base_url = "not a url".into();
        assert!(config.validate().is_err());
        config.api.base_url = "ftp://example.com".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_with_source_prefers_first_existing_candidate() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[herd]\ncount = 3").unwrap();
        let missing = PathBuf::from("does/not/exist.toml");
        let loaded =
            AppConfig::load_with_source(&[missing.as_path(), file.path()]).unwrap();
        assert_eq!(loaded.config.herd.count, 3);
        assert_eq!(loaded.source.as_deref(), Some(file.path()));
    }

    #[test]
    fn load_with_source_falls_back_to_defaults() {
        let loaded = AppConfig::load_with_source(&["does/not/exist.toml"]).unwrap();
        assert!(loaded.source.is_none());
        assert_eq!(loaded.config.herd.count, 10);
    }

    #[test]
    fn load_from_path_requires_the_file() {
        let err = AppConfig::load_from_path("does/not/exist.toml").unwrap_err();
        assert!(err.to_string().contains("does not exist"));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[herd]\ncount = 4").unwrap();
        let loaded = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(loaded.config.herd.count, 4);
        assert_eq!(loaded.source.as_deref(), Some(file.path()));
    }

    #[test]
    fn rejects_non_positive_grazing_speed() {
        let mut config = AppConfig::default();
        config.motion.grazing_speed = ValueRange::new(0.0, 1.5);
        assert!(config.validate().is_err());
        config.motion.grazing_speed = ValueRange::new(0.05, 1.5);
        config.validate().unwrap();
    }

    #[test]
    fn schedule_mode_from_str() {
        assert_eq!(
            "Concurrent".parse::<ScheduleMode>().unwrap(),
            ScheduleMode::Concurrent
        );
        assert!("parallel".parse::<ScheduleMode>().is_err());
    }
}
