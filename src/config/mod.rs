use anyhow::{Context, Result};
use serde::Deserialize;

use crate::fleet::{Coordinates, FilterSelection, ValidationError};

// Re-export component config types
pub use crate::client::ApiConfig;
pub use crate::session::SessionConfig;

/// Complete fleet-sync configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FleetConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub observer: ObserverConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub listing: ListingConfig,
}

/// Map center used for nearby queries
#[derive(Debug, Clone, Deserialize)]
pub struct ObserverConfig {
    #[serde(default = "default_lat")]
    pub lat: f64,
    #[serde(default = "default_lon")]
    pub lon: f64,
    /// Filter active when the map opens
    #[serde(default)]
    pub filter: FilterSelection,
}

fn default_lat() -> f64 {
    41.0
}

fn default_lon() -> f64 {
    29.0
}

impl ObserverConfig {
    pub fn coordinates(&self) -> Result<Coordinates, ValidationError> {
        Coordinates::new(self.lat, self.lon)
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            lat: default_lat(),
            lon: default_lon(),
            filter: FilterSelection::default(),
        }
    }
}

/// Default page for the bulk driver listing
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    100
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl FleetConfig {
    /// Apply env var overrides on top of file/default values.
    ///
    /// - `FLEET_API_URL` replaces `api.base_url`
    /// - `FLEET_SESSION_FILE` replaces `session.persist_path`
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("FLEET_API_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("FLEET_SESSION_FILE") {
            if !v.trim().is_empty() {
                self.session.persist_path = Some(v.trim().into());
            }
        }
        self
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<FleetConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    let config: FleetConfig =
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file {}", path))?;
    config
        .observer
        .coordinates()
        .context("Invalid observer coordinates")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    // Env-mutating tests share the process environment
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = FleetConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_secs, None);
        assert_eq!(config.observer.lat, 41.0);
        assert_eq!(config.observer.lon, 29.0);
        assert_eq!(config.observer.filter, FilterSelection::All);
        assert!(config.session.persist_path.is_none());
        assert_eq!(config.listing.page, 1);
        assert_eq!(config.listing.page_size, 100);
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [api]
            base_url = "http://gateway.internal:8000"
            user_agent = "dispatch-console/2.0"
            timeout_secs = 5

            [observer]
            lat = 39.92
            lon = 32.85
            filter = "black"

            [session]
            persist_path = "/tmp/fleet/session"

            [listing]
            page = 2
            page_size = 25
        "#;

        let config: FleetConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "http://gateway.internal:8000");
        assert_eq!(config.api.timeout_secs, Some(5));
        assert_eq!(config.observer.filter, FilterSelection::ClassB);
        assert_eq!(
            config.session.persist_path.as_deref(),
            Some(std::path::Path::new("/tmp/fleet/session"))
        );
        assert_eq!(config.listing.page_size, 25);
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [observer]
            filter = "yellow"
        "#;

        let config: FleetConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.observer.filter, FilterSelection::ClassA);
        assert_eq!(config.observer.lat, 41.0); // Default
        assert_eq!(config.api.base_url, "http://localhost:8000"); // Default
    }

    #[test]
    fn test_unknown_filter_rejected() {
        let toml = r#"
            [observer]
            filter = "green"
        "#;
        assert!(toml::from_str::<FleetConfig>(toml).is_err());
    }

    #[test]
    fn test_load_config_validates_observer() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[observer]\nlat = 95.0").unwrap();

        let err = load_config(file.path().to_str().unwrap()).unwrap_err();
        assert!(format!("{:#}", err).contains("latitude"));
    }

    #[test]
    fn test_env_overrides() {
        let _lock = ENV_LOCK.lock().unwrap();
        std::env::set_var("FLEET_API_URL", "http://override:9000");
        std::env::set_var("FLEET_SESSION_FILE", "/tmp/override-session");

        let config = FleetConfig::default().with_env_overrides();
        assert_eq!(config.api.base_url, "http://override:9000");
        assert_eq!(
            config.session.persist_path.as_deref(),
            Some(std::path::Path::new("/tmp/override-session"))
        );

        std::env::remove_var("FLEET_API_URL");
        std::env::remove_var("FLEET_SESSION_FILE");

        let config = FleetConfig::default().with_env_overrides();
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }
}
