//! # Configuration
//!
//! [`DispatchConfig`] is layered from an optional file and `DISPATCH__`-prefixed
//! environment variables, nested with double underscores:
//!
//! ```bash
//! DISPATCH__ROUTING__API_KEY=... DISPATCH__VIEW__MAX_ZOOM=16 cargo run
//! ```
//!
//! Every section has defaults, so an empty configuration is valid. Routing stays
//! disabled until an API key is provided.

use crate::model::{Coordinate, RouteProfile};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const ENV_PREFIX: &str = "DISPATCH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub routing: RoutingConfig,
    pub view: ViewConfig,
    pub actors: ActorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub profile: RouteProfile,
    pub timeout_ms: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openrouteservice.org".to_string(),
            api_key: None,
            profile: RouteProfile::DrivingCar,
            timeout_ms: 10_000,
        }
    }
}

impl RoutingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The key, unless missing or blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub default_center: Coordinate,
    pub default_zoom: f64,
    /// Viewport size in pixels, used by the headless surface.
    pub width: f64,
    pub height: f64,
    pub max_zoom: f64,
    /// Top, right, bottom, left.
    pub padding: [f64; 4],
    pub animation_ms: u64,
    pub popup_autopan_ms: u64,
    pub hit_radius_px: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_center: Coordinate::new(13.388, 52.517),
            default_zoom: 9.5,
            width: 800.0,
            height: 600.0,
            max_zoom: 15.0,
            padding: [80.0, 80.0, 120.0, 80.0],
            animation_ms: 500,
            popup_autopan_ms: 250,
            hit_radius_px: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub inbox_size: usize,
    pub event_capacity: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            inbox_size: 32,
            event_capacity: 128,
        }
    }
}

impl DispatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.view.default_center.is_valid() {
            return Err(ConfigError::Invalid("view.default_center must be finite".into()));
        }
        if !(self.view.width > 0.0 && self.view.height > 0.0) {
            return Err(ConfigError::Invalid("view size must be positive".into()));
        }
        if self.actors.inbox_size == 0 || self.actors.event_capacity == 0 {
            return Err(ConfigError::Invalid("actor buffers must be non-zero".into()));
        }
        Ok(())
    }
}

/// Loads the configuration: file (when given) first, then environment overrides.
///
/// # Errors
/// Fails if a given file is missing or unreadable, if a value has the wrong shape,
/// or if the result does not pass [`DispatchConfig::validate`].
pub fn load_config(path: Option<&Path>) -> Result<DispatchConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        info!("Loading config from {}", path.display());
        builder = builder.add_source(File::from(path).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    let config: DispatchConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
