use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use vendora_events::bus::DEFAULT_CAPACITY;

use crate::error::{StudioError, StudioResult};

/// Studio configuration loaded from environment variables.
///
/// All fields except the snapshot path have defaults suitable for local use.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    /// Quiet period after the last transform edit before a flush.
    pub transform_flush_debounce: Duration,
    /// How often the cascade watcher refreshes the store.
    pub cascade_refresh_interval: Duration,
    /// Broadcast channel capacity of the event bus.
    pub event_bus_capacity: usize,
    /// Snapshot consumed by `vendora-reconcile`.
    pub snapshot_path: Option<PathBuf>,
    /// Keep `vendora-reconcile` running with the background services.
    pub watch: bool,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            transform_flush_debounce: Duration::from_millis(1000),
            cascade_refresh_interval: Duration::from_secs(30),
            event_bus_capacity: DEFAULT_CAPACITY,
            snapshot_path: None,
            watch: false,
        }
    }
}

impl StudioConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default |
    /// |---------------------------------|---------|
    /// | `TRANSFORM_FLUSH_DEBOUNCE_MS`   | `1000`  |
    /// | `CASCADE_REFRESH_INTERVAL_SECS` | `30`    |
    /// | `EVENT_BUS_CAPACITY`            | `256`   |
    /// | `VENDORA_SNAPSHOT`              | unset   |
    /// | `VENDORA_WATCH`                 | `false` |
    pub fn from_env() -> StudioResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StudioResult<Self> {
        let defaults = Self::default();

        let debounce_ms: u64 = parse_var(&lookup, "TRANSFORM_FLUSH_DEBOUNCE_MS", 1000)?;
        let refresh_secs: u64 = parse_var(&lookup, "CASCADE_REFRESH_INTERVAL_SECS", 30)?;
        let event_bus_capacity: usize =
            parse_var(&lookup, "EVENT_BUS_CAPACITY", defaults.event_bus_capacity)?;

        if refresh_secs == 0 {
            return Err(StudioError::Config(
                "CASCADE_REFRESH_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }
        if event_bus_capacity == 0 {
            return Err(StudioError::Config(
                "EVENT_BUS_CAPACITY must be greater than zero".to_string(),
            ));
        }

        let snapshot_path = lookup("VENDORA_SNAPSHOT")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let watch = match lookup("VENDORA_WATCH") {
            None => false,
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                StudioError::Config(format!("VENDORA_WATCH must be true or false, got {raw:?}"))
            })?,
        };

        Ok(Self {
            transform_flush_debounce: Duration::from_millis(debounce_ms),
            cascade_refresh_interval: Duration::from_secs(refresh_secs),
            event_bus_capacity,
            snapshot_path,
            watch,
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> StudioResult<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            StudioError::Config(format!("{key} must be a non-negative integer, got {raw:?}"))
        }),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}
