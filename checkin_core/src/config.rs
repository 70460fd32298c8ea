//! Session configuration, with defaults for everything and optional TOML
//! overrides.
//!
//! ```toml
//! [sampler]
//! hold_ramp_ms = 6000
//!
//! [navigator]
//! debounce_ms = 600
//!
//! [route]
//! points = 48
//! seed = 7
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::navigator::NavigatorConfig;
use crate::route::RouteConfig;
use crate::sampler::SamplerConfig;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CheckinConfig {
    pub sampler:   SamplerConfig,
    pub navigator: NavigatorConfig,
    pub route:     RouteConfig,
}

impl CheckinConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let cfg = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "config loaded");
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckinError;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(CheckinConfig::from_toml_str("").unwrap(), CheckinConfig::default());
    }

    #[test]
    fn partial_sections_override() {
        let cfg = CheckinConfig::from_toml_str(
            "[sampler]\nhold_ramp_ms = 6000\n\n[route]\nseed = 7\n",
        ).unwrap();
        assert_eq!(cfg.sampler.hold_ramp_ms, 6000);
        assert_eq!(cfg.sampler.proximity_exponent, 1.5);
        assert_eq!(cfg.route.seed, Some(7));
        assert_eq!(cfg.route.points, 32);
        assert_eq!(cfg.navigator.debounce_ms, 800);
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = CheckinConfig::from_toml_str("[sampler\n").unwrap_err();
        assert!(matches!(err, CheckinError::Config(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CheckinConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, CheckinError::Io(_)));
    }
}
