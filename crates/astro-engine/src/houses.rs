//! House systems and house assignment.
//!
//! Two modes share one contract: whole-sign cusps are derived from the
//! ascendant's sign, every other system takes its cusps from the provider.
//! Either way the caller gets 12 [`HouseCusp`]s and [`HouseLayout::assign_house`].

use crate::ephemeris::{EphemerisContext, HouseSystemCode};
use crate::error::{EngineError, EngineResult, EphemerisError};
use crate::time::{validate_coordinates, JulianDay};
use crate::zodiac::{
    checked_longitude, format_longitude, normalize_degrees, sign_index, ZodiacSign,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseCusp {
    pub house: u8,
    pub longitude: f64,
    pub sign: ZodiacSign,
    pub formatted: String,
}

impl HouseCusp {
    pub fn new(house: u8, longitude: f64) -> Self {
        let longitude = normalize_degrees(longitude);
        Self {
            house,
            longitude,
            sign: ZodiacSign::from_longitude(longitude),
            formatted: format_longitude(longitude),
        }
    }
}

/// Which way cusps are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "system")]
pub enum HouseMode {
    /// Cusps at the 0° boundary of each sign, starting from the ascendant's sign.
    WholeSign,
    /// Cusps delegated to the ephemeris provider.
    Provider(HouseSystemCode),
}

impl HouseMode {
    /// Code sent to the provider; whole-sign still needs the ascendant.
    pub fn provider_code(self) -> HouseSystemCode {
        match self {
            HouseMode::WholeSign => HouseSystemCode::WholeSign,
            HouseMode::Provider(code) => code,
        }
    }
}

impl From<HouseSystemCode> for HouseMode {
    fn from(code: HouseSystemCode) -> Self {
        match code {
            HouseSystemCode::WholeSign => HouseMode::WholeSign,
            other => HouseMode::Provider(other),
        }
    }
}

impl FromStr for HouseMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: HouseSystemCode = s
            .parse()
            .map_err(|e: crate::error::EphemerisError| {
                EngineError::invalid_input("houseSystem", e.to_string())
            })?;
        Ok(code.into())
    }
}

impl fmt::Display for HouseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_code().name())
    }
}

/// House system selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HouseSystem {
    mode: HouseMode,
}

impl HouseSystem {
    pub fn new(mode: HouseMode) -> Self {
        Self { mode }
    }

    pub fn whole_sign() -> Self {
        Self::new(HouseMode::WholeSign)
    }

    pub fn placidus() -> Self {
        Self::new(HouseMode::Provider(HouseSystemCode::Placidus))
    }

    pub fn mode(&self) -> HouseMode {
        self.mode
    }

    /// Ascendant and cusps for a moment and place.
    pub fn layout(
        &self,
        ctx: &EphemerisContext,
        jd: JulianDay,
        latitude: f64,
        longitude: f64,
    ) -> EngineResult<HouseLayout> {
        validate_coordinates(latitude, longitude)?;
        let data = ctx.houses(jd, latitude, longitude, self.mode.provider_code())?;
        let ascendant = checked_longitude("ascendant", data.ascendant_deg)?;

        let layout = match self.mode {
            HouseMode::WholeSign => HouseLayout::whole_sign(ascendant),
            HouseMode::Provider(_) => {
                if let Some(i) = data.cusps_deg.iter().position(|c| !c.is_finite()) {
                    log::warn!("{} cusp {} at {} is not finite", self.mode, i + 1, jd);
                    return Err(EphemerisError::NonFinite {
                        field: format!("cusp {}", i + 1),
                        julian_day: jd.value(),
                    }
                    .into());
                }
                let mut boundaries = [0.0; 12];
                for (i, raw) in data.cusps_deg.iter().enumerate() {
                    boundaries[i] = checked_longitude(&format!("cusp {}", i + 1), *raw)?;
                }
                HouseLayout::from_cusps(self.mode, ascendant, boundaries)
            }
        };
        log::debug!(
            "{} houses at {}: asc {:.4}",
            self.mode,
            jd,
            layout.ascendant
        );
        Ok(layout)
    }
}

impl Default for HouseSystem {
    fn default() -> Self {
        Self::placidus()
    }
}

/// Resolved houses for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseLayout {
    pub mode: HouseMode,
    pub ascendant: f64,
    pub cusps: Vec<HouseCusp>,
    boundaries: Option<[f64; 12]>,
}

impl HouseLayout {
    pub fn whole_sign(ascendant: f64) -> Self {
        let ascendant = normalize_degrees(ascendant);
        let first = sign_index(ascendant);
        let cusps = (0..12)
            .map(|i| {
                let sign = ZodiacSign::from_index(first + i);
                HouseCusp::new(i as u8 + 1, sign.start_longitude())
            })
            .collect();
        Self {
            mode: HouseMode::WholeSign,
            ascendant,
            cusps,
            boundaries: None,
        }
    }

    pub fn from_cusps(mode: HouseMode, ascendant: f64, boundaries: [f64; 12]) -> Self {
        let boundaries = boundaries.map(normalize_degrees);
        let cusps = boundaries
            .iter()
            .enumerate()
            .map(|(i, lon)| HouseCusp::new(i as u8 + 1, *lon))
            .collect();
        Self {
            mode,
            ascendant: normalize_degrees(ascendant),
            cusps,
            boundaries: Some(boundaries),
        }
    }

    /// House (1-12) containing `longitude`.
    pub fn assign_house(&self, longitude: f64) -> EngineResult<u8> {
        match &self.boundaries {
            Some(boundaries) => house_from_cusps(longitude, boundaries).ok_or_else(|| {
                EngineError::invariant(format!(
                    "longitude {:.4} falls in no house of {:?}",
                    longitude, boundaries
                ))
            }),
            None => Ok(whole_sign_house(longitude, self.ascendant)),
        }
    }
}

/// Whole-sign house: sign distance from the ascendant's sign, plus one.
pub fn whole_sign_house(longitude: f64, ascendant: f64) -> u8 {
    (((sign_index(longitude) + 12 - sign_index(ascendant)) % 12) + 1) as u8
}

/// Walk the cusps in house order; a pair whose upper cusp is numerically
/// smaller than the lower one crosses 0°.
pub fn house_from_cusps(longitude: f64, cusps: &[f64; 12]) -> Option<u8> {
    let lon = normalize_degrees(longitude);
    (0..12).find_map(|i| {
        let lower = cusps[i];
        let upper = cusps[(i + 1) % 12];
        let inside = if lower <= upper {
            lon >= lower && lon < upper
        } else {
            lon >= lower || lon < upper
        };
        inside.then_some(i as u8 + 1)
    })
}
