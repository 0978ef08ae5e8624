use crate::aspects::Aspect;
use crate::ephemeris::Body;
use crate::error::{EngineError, EngineResult};
use crate::houses::{HouseCusp, HouseMode};
use crate::time::JulianDay;
use crate::zodiac::{format_longitude, ZodiacSign};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Placement of one body in a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetPosition {
    /// Longitude in degrees (0-360)
    pub longitude: f64,
    pub sign: ZodiacSign,
    pub formatted: String,
    pub house: u8,
    pub retrograde: bool,
    /// Speed in longitude (degrees per day)
    pub speed: f64,
}

impl PlanetPosition {
    pub fn new(longitude: f64, speed: f64, house: u8) -> Self {
        Self {
            longitude,
            sign: ZodiacSign::from_longitude(longitude),
            formatted: format_longitude(longitude),
            house,
            retrograde: speed < 0.0,
            speed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ascendant {
    pub longitude: f64,
    pub sign: ZodiacSign,
    pub formatted: String,
}

impl Ascendant {
    pub fn new(longitude: f64) -> Self {
        Self {
            longitude,
            sign: ZodiacSign::from_longitude(longitude),
            formatted: format_longitude(longitude),
        }
    }
}

/// Sun, moon and rising signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BigThree {
    pub sun: ZodiacSign,
    pub moon: ZodiacSign,
    pub rising: ZodiacSign,
}

impl BigThree {
    pub fn from_placements(
        planets: &BTreeMap<Body, PlanetPosition>,
        ascendant: &Ascendant,
    ) -> EngineResult<Self> {
        let sign_of = |body: Body| {
            planets
                .get(&body)
                .map(|p| p.sign)
                .ok_or_else(|| EngineError::invariant(format!("chart is missing {}", body)))
        };
        Ok(BigThree {
            sun: sign_of(Body::Sun)?,
            moon: sign_of(Body::Moon)?,
            rising: ascendant.sign,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NatalChart {
    pub julian_day: JulianDay,
    pub house_system: HouseMode,
    pub ascendant: Ascendant,
    pub big_three: BigThree,
    pub planets: BTreeMap<Body, PlanetPosition>,
    pub houses: Vec<HouseCusp>,
    pub aspects: Vec<Aspect>,
}

impl NatalChart {
    pub fn planet(&self, body: Body) -> Option<&PlanetPosition> {
        self.planets.get(&body)
    }

    /// Re-check every structural invariant of a complete chart.
    pub fn verify(&self) -> EngineResult<()> {
        check_longitude("ascendant", self.ascendant.longitude)?;
        if self.ascendant.sign != ZodiacSign::from_longitude(self.ascendant.longitude) {
            return Err(EngineError::invariant("ascendant sign disagrees with longitude"));
        }

        for body in Body::ALL {
            let planet = self
                .planets
                .get(&body)
                .ok_or_else(|| EngineError::invariant(format!("chart is missing {}", body)))?;
            check_longitude(body.id(), planet.longitude)?;
            if !planet.speed.is_finite() {
                return Err(EngineError::invariant(format!("{} speed is not finite", body)));
            }
            if planet.sign != ZodiacSign::from_longitude(planet.longitude) {
                return Err(EngineError::invariant(format!(
                    "{} sign disagrees with longitude",
                    body
                )));
            }
            if !(1..=12).contains(&planet.house) {
                return Err(EngineError::invariant(format!(
                    "{} assigned to house {}",
                    body, planet.house
                )));
            }
            if planet.retrograde != (planet.speed < 0.0) {
                return Err(EngineError::invariant(format!(
                    "{} retrograde flag disagrees with speed",
                    body
                )));
            }
        }
        if self.planets.len() != Body::ALL.len() {
            return Err(EngineError::invariant(format!(
                "chart has {} planets",
                self.planets.len()
            )));
        }

        if self.houses.len() != 12 {
            return Err(EngineError::invariant(format!(
                "chart has {} house cusps",
                self.houses.len()
            )));
        }
        for (i, cusp) in self.houses.iter().enumerate() {
            if cusp.house as usize != i + 1 {
                return Err(EngineError::invariant(format!(
                    "cusp at position {} is numbered {}",
                    i + 1,
                    cusp.house
                )));
            }
            check_longitude(&format!("cusp {}", cusp.house), cusp.longitude)?;
        }

        let mut seen = HashSet::new();
        for aspect in &self.aspects {
            if aspect.body_a == aspect.body_b {
                return Err(EngineError::invariant(format!(
                    "self-aspect on {}",
                    aspect.body_a
                )));
            }
            let key = if aspect.body_a < aspect.body_b {
                (aspect.body_a, aspect.body_b)
            } else {
                (aspect.body_b, aspect.body_a)
            };
            if !seen.insert(key) {
                return Err(EngineError::invariant(format!(
                    "duplicate aspect between {} and {}",
                    key.0, key.1
                )));
            }
            if !(aspect.orb >= 0.0) {
                return Err(EngineError::invariant(format!(
                    "negative orb between {} and {}",
                    key.0, key.1
                )));
            }
        }

        if self.big_three != self.derive_big_three()? {
            return Err(EngineError::invariant("big three disagrees with placements"));
        }
        Ok(())
    }

    /// Apply a partial update, producing a new verified chart. The original
    /// is left untouched if the patched chart fails verification.
    pub fn apply_patch(&self, patch: ChartPatch) -> EngineResult<NatalChart> {
        let mut chart = self.clone();
        if let Some(ascendant) = patch.ascendant {
            chart.ascendant = ascendant;
        }
        if let Some(planets) = patch.planets {
            chart.planets = planets;
        }
        if let Some(houses) = patch.houses {
            chart.houses = houses;
        }
        if let Some(aspects) = patch.aspects {
            chart.aspects = aspects;
        }
        chart.big_three = chart.derive_big_three()?;
        chart.verify()?;
        Ok(chart)
    }

    fn derive_big_three(&self) -> EngineResult<BigThree> {
        BigThree::from_placements(&self.planets, &self.ascendant)
    }
}

/// Explicit partial update of a stored chart; unset fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartPatch {
    pub ascendant: Option<Ascendant>,
    pub planets: Option<BTreeMap<Body, PlanetPosition>>,
    pub houses: Option<Vec<HouseCusp>>,
    pub aspects: Option<Vec<Aspect>>,
}

impl ChartPatch {
    pub fn is_empty(&self) -> bool {
        self.ascendant.is_none()
            && self.planets.is_none()
            && self.houses.is_none()
            && self.aspects.is_none()
    }
}

fn check_longitude(field: &str, longitude: f64) -> EngineResult<()> {
    if longitude.is_finite() && (0.0..360.0).contains(&longitude) {
        Ok(())
    } else {
        Err(EngineError::invariant(format!(
            "{} longitude {} is outside [0, 360)",
            field, longitude
        )))
    }
}
