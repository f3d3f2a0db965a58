//! Demo configuration: TOML with serde defaults, so partial files work and
//! a missing file means defaults.

use std::path::Path;
use std::time::Duration;

use mosaic_common::MosaicError;
use mosaic_registry::RegistryPolicy;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cli::Args;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MosaicConfig {
    pub registry: RegistrySection,
    pub screen: ScreenSection,
    pub simulation: SimulationSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    pub tick_ms: u64,
    pub staleness_ms: u64,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            tick_ms: 250,
            staleness_ms: 1500,
        }
    }
}

/// The virtual screen the simulated windows drift around on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSection {
    pub width: f64,
    pub height: f64,
}

impl Default for ScreenSection {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    pub windows: usize,
    /// Maximum movement per step, in pixels.
    pub drift: f64,
    pub duration_secs: u64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            windows: 3,
            drift: 40.0,
            duration_secs: 10,
        }
    }
}

impl MosaicConfig {
    /// Fold CLI overrides in: CLI beats file beats defaults.
    pub fn apply_cli(&mut self, args: &Args) {
        if let Some(windows) = args.windows {
            self.simulation.windows = windows;
        }
        if let Some(duration) = args.duration_secs {
            self.simulation.duration_secs = duration;
        }
        if let Some(tick_ms) = args.tick_ms {
            self.registry.tick_ms = tick_ms;
        }
        if let Some(staleness_ms) = args.staleness_ms {
            self.registry.staleness_ms = staleness_ms;
        }
    }

    pub fn policy(&self) -> RegistryPolicy {
        RegistryPolicy::new(
            Duration::from_millis(self.registry.tick_ms),
            Duration::from_millis(self.registry.staleness_ms),
        )
    }

    fn validate(&mut self) {
        if self.simulation.windows == 0 {
            warn!("simulation.windows must be at least 1, using 1");
            self.simulation.windows = 1;
        }
        if self.registry.tick_ms == 0 {
            warn!("registry.tick_ms must be positive, using default");
            self.registry.tick_ms = RegistrySection::default().tick_ms;
        }
        if self.screen.width <= 0.0 || self.screen.height <= 0.0 {
            warn!("screen dimensions must be positive, using defaults");
            self.screen = ScreenSection::default();
        }
        if self.simulation.drift < 0.0 {
            warn!("simulation.drift must not be negative, using 0");
            self.simulation.drift = 0.0;
        }
    }
}

/// Load config from a specific TOML file path.
pub fn load_from_path(path: &Path) -> Result<MosaicConfig, MosaicError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| MosaicError::Config(format!("failed to read {}: {e}", path.display())))?;

    let mut config: MosaicConfig = toml::from_str(&content)
        .map_err(|e| MosaicError::Config(format!("failed to parse TOML: {e}")))?;
    config.validate();

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform default path; a missing file means
/// defaults.
///
/// On macOS: `~/Library/Application Support/mosaic/config.toml`
/// On Linux: `~/.config/mosaic/config.toml`
pub fn load_default() -> MosaicConfig {
    let Some(config_dir) = dirs::config_dir() else {
        warn!("could not determine config directory, using defaults");
        return MosaicConfig::default();
    };
    let path = config_dir.join("mosaic").join("config.toml");
    if !path.exists() {
        return MosaicConfig::default();
    }
    match load_from_path(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{e} — using defaults");
            MosaicConfig::default()
        }
    }
}
