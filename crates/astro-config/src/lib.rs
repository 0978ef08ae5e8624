use astro_engine::ephemeris::{EphemerisContext, EphemerisFlags, SwissEphemerisProvider};
use astro_engine::houses::{HouseMode, HouseSystem};
use astro_engine::transit::DEFAULT_DAILY_HOUR_UTC;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolved engine settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub ephemeris_path: Option<PathBuf>,
    pub house_system: HouseSystem,
    pub daily_hour_utc: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            ephemeris_path: None,
            house_system: HouseSystem::default(),
            daily_hour_utc: DEFAULT_DAILY_HOUR_UTC,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EphemerisToml {
    #[serde(default)]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct HousesToml {
    #[serde(default)]
    system: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TransitsToml {
    #[serde(default = "default_daily_hour")]
    daily_hour_utc: u32,
}

impl Default for TransitsToml {
    fn default() -> Self {
        Self {
            daily_hour_utc: default_daily_hour(),
        }
    }
}

fn default_daily_hour() -> u32 {
    DEFAULT_DAILY_HOUR_UTC
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RootConfigToml {
    #[serde(default)]
    ephemeris: EphemerisToml,
    #[serde(default)]
    houses: HousesToml,
    #[serde(default)]
    transits: TransitsToml,
}

/// Try the usual relative locations of `configs/engine.toml`, from the
/// workspace root or from inside a crate.
pub fn read_engine_toml_text() -> anyhow::Result<String> {
    let paths = ["configs/engine.toml", "../../configs/engine.toml"];
    for p in &paths {
        if let Ok(c) = fs::read_to_string(p) {
            return Ok(c);
        }
    }
    anyhow::bail!("Could not load engine.toml from {:?}", paths);
}

pub fn parse_engine_settings(text: &str) -> anyhow::Result<EngineSettings> {
    let root: RootConfigToml = toml::from_str(text)
        .map_err(|e| anyhow::anyhow!("Failed to parse engine.toml: {e}"))?;

    let house_system = match root.houses.system {
        Some(name) => {
            let mode: HouseMode = name
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid [houses] system in engine.toml: {e}"))?;
            HouseSystem::new(mode)
        }
        None => HouseSystem::default(),
    };

    let daily_hour_utc = root.transits.daily_hour_utc;
    if daily_hour_utc >= 24 {
        anyhow::bail!("transits.daily_hour_utc must be in 0..24, got {}", daily_hour_utc);
    }

    Ok(EngineSettings {
        ephemeris_path: root.ephemeris.path,
        house_system,
        daily_hour_utc,
    })
}

pub fn load_from_path(path: &Path) -> anyhow::Result<EngineSettings> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Could not read {}: {e}", path.display()))?;
    parse_engine_settings(&text)
}

/// Load from an explicit path, else the default locations, else defaults.
pub fn load_engine_settings(explicit: Option<&Path>) -> anyhow::Result<EngineSettings> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }
    match read_engine_toml_text() {
        Ok(text) => parse_engine_settings(&text),
        Err(e) => {
            log::info!("{e}; using default engine settings");
            Ok(EngineSettings::default())
        }
    }
}

/// Build the single ephemeris context for this process.
///
/// A configured data path must exist. Without one, the Swiss Ephemeris
/// default lookup is tried and the Moshier model is used if it fails.
pub fn build_context(settings: &EngineSettings) -> anyhow::Result<EphemerisContext> {
    if let Some(path) = &settings.ephemeris_path {
        let provider = SwissEphemerisProvider::new(Some(path.clone()))?;
        return Ok(EphemerisContext::new(Arc::new(provider)));
    }
    match SwissEphemerisProvider::new(None) {
        Ok(provider) => Ok(EphemerisContext::new(Arc::new(provider))),
        Err(e) => {
            log::warn!("{e}; falling back to the Moshier model");
            Ok(EphemerisContext::with_flags(
                Arc::new(SwissEphemerisProvider::moshier()),
                EphemerisFlags::MOSEPH | EphemerisFlags::SPEED,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astro_engine::ephemeris::HouseSystemCode;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings = parse_engine_settings("").unwrap();
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(settings.house_system.mode(), HouseMode::Provider(HouseSystemCode::Placidus));
        assert_eq!(settings.daily_hour_utc, 12);
    }

    #[test]
    fn test_full_config() {
        let text = r#"
            [ephemeris]
            path = "/opt/ephe"

            [houses]
            system = "whole_sign"

            [transits]
            daily_hour_utc = 6
        "#;
        let settings = parse_engine_settings(text).unwrap();
        assert_eq!(settings.ephemeris_path, Some(PathBuf::from("/opt/ephe")));
        assert_eq!(settings.house_system.mode(), HouseMode::WholeSign);
        assert_eq!(settings.daily_hour_utc, 6);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse_engine_settings("[houses]\nsystem = \"topocentric_x\"\n").is_err());
        assert!(parse_engine_settings("[transits]\ndaily_hour_utc = 24\n").is_err());
        assert!(parse_engine_settings("[houses\n").is_err());
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[houses]\nsystem = \"koch\"").unwrap();
        let settings = load_from_path(file.path()).unwrap();
        assert_eq!(settings.house_system.mode(), HouseMode::Provider(HouseSystemCode::Koch));

        assert!(load_from_path(Path::new("/nonexistent/engine.toml")).is_err());
    }

    #[test]
    fn test_missing_configured_ephemeris_path_fails() {
        let settings = EngineSettings {
            ephemeris_path: Some(PathBuf::from("/nonexistent/ephe")),
            ..EngineSettings::default()
        };
        assert!(build_context(&settings).is_err());
    }
}
