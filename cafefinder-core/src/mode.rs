//! Runtime mode configuration for CafeFinder.

use serde::{Deserialize, Serialize};

use crate::config::CafeFinderConfig;

/// Runtime mode for CafeFinder services.
///
/// Controls whether to use real external services or seeded synthetic data.
/// This allows offline development while maintaining the same interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RuntimeMode {
    /// Production mode - uses real external APIs and services
    Production,
    /// Development mode - serves synthetic cafés without network access
    #[default]
    Development,
}

impl RuntimeMode {
    /// Check if running in development mode.
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if running in production mode.
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Configuration appropriate for this mode, with environment overrides applied.
    pub fn config(self) -> CafeFinderConfig {
        let mut config = CafeFinderConfig::from_env();
        if self.is_development() {
            let dev = CafeFinderConfig::for_development();
            config.upstream.overpass_enabled = dev.upstream.overpass_enabled;
            config.upstream.google_places_api_key = None;
            config.upstream.google_maps_api_key = None;
            config.synthetic.seed = config.synthetic.seed.or(dev.synthetic.seed);
        }
        config
    }

    /// Wire label used in health responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

impl std::fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "PRODUCTION"),
            Self::Development => write!(f, "DEVELOPMENT"),
        }
    }
}

impl std::str::FromStr for RuntimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            _ => Err(format!(
                "Invalid runtime mode: '{s}'. Valid options are: production, development"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_runtime_mode() {
        assert_eq!("prod".parse::<RuntimeMode>(), Ok(RuntimeMode::Production));
        assert_eq!(
            "Development".parse::<RuntimeMode>(),
            Ok(RuntimeMode::Development)
        );
        assert!("staging".parse::<RuntimeMode>().is_err());
    }

    #[test]
    fn test_development_config_is_offline() {
        let config = RuntimeMode::Development.config();
        assert!(!config.upstream.overpass_enabled);
        assert!(config.upstream.google_places_api_key.is_none());
        assert!(config.synthetic.seed.is_some());
    }
}
