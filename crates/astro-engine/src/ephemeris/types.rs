use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bodies tracked by the engine, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Body {
    pub const ALL: [Body; 10] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    /// Everything except the sun and moon; the only bodies that station.
    pub const NON_LUMINARIES: [Body; 8] = [
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    /// Slow movers used for weekly transits.
    pub const OUTER: [Body; 5] = [
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Moon => "moon",
            Body::Mercury => "mercury",
            Body::Venus => "venus",
            Body::Mars => "mars",
            Body::Jupiter => "jupiter",
            Body::Saturn => "saturn",
            Body::Uranus => "uranus",
            Body::Neptune => "neptune",
            Body::Pluto => "pluto",
        }
    }

    /// Swiss Ephemeris planet number (SE_SUN = 0 ... SE_PLUTO = 9).
    pub fn swiss_code(self) -> u32 {
        self as u32
    }

    pub fn is_luminary(self) -> bool {
        matches!(self, Body::Sun | Body::Moon)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Body {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Body::ALL
            .iter()
            .copied()
            .find(|body| body.id() == wanted)
            .ok_or_else(|| format!("Unknown body: {}", s))
    }
}

/// Longitude and speed reported by a provider for one body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyState {
    /// Ecliptic longitude in degrees
    pub longitude_deg: f64,
    /// Speed in longitude (degrees per day)
    pub speed_deg_per_day: f64,
}

impl BodyState {
    pub fn is_retrograde(&self) -> bool {
        self.speed_deg_per_day < 0.0
    }
}

/// Raw house output from a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseData {
    pub ascendant_deg: f64,
    pub midheaven_deg: f64,
    /// Cusps 1..12 in house order
    pub cusps_deg: [f64; 12],
}

/// House systems a provider can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseSystemCode {
    Placidus,
    WholeSign,
    Koch,
    Equal,
    Regiomontanus,
    Campanus,
    Alcabitius,
    Morinus,
    Porphyry,
}

/// House system mapping
const HOUSE_SYSTEMS: &[(&str, HouseSystemCode, u8)] = &[
    ("placidus", HouseSystemCode::Placidus, b'P'),
    ("whole_sign", HouseSystemCode::WholeSign, b'W'),
    ("koch", HouseSystemCode::Koch, b'K'),
    ("equal", HouseSystemCode::Equal, b'E'),
    ("regiomontanus", HouseSystemCode::Regiomontanus, b'R'),
    ("campanus", HouseSystemCode::Campanus, b'C'),
    ("alcabitius", HouseSystemCode::Alcabitius, b'B'),
    ("morinus", HouseSystemCode::Morinus, b'M'),
    ("porphyry", HouseSystemCode::Porphyry, b'O'),
];

impl HouseSystemCode {
    pub fn name(self) -> &'static str {
        HOUSE_SYSTEMS
            .iter()
            .find(|(_, code, _)| *code == self)
            .map(|(name, _, _)| *name)
            .unwrap_or("placidus")
    }

    /// Single-letter code understood by the Swiss Ephemeris.
    pub fn swiss_byte(self) -> u8 {
        HOUSE_SYSTEMS
            .iter()
            .find(|(_, code, _)| *code == self)
            .map(|(_, _, byte)| *byte)
            .unwrap_or(b'P')
    }

    pub fn valid_names() -> Vec<String> {
        HOUSE_SYSTEMS.iter().map(|(name, _, _)| name.to_string()).collect()
    }
}

impl FromStr for HouseSystemCode {
    type Err = crate::error::EphemerisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        HOUSE_SYSTEMS
            .iter()
            .find(|(name, _, _)| *name == wanted)
            .map(|(_, code, _)| *code)
            .ok_or_else(|| crate::error::EphemerisError::InvalidHouseSystem {
                system: s.to_string(),
                valid: HouseSystemCode::valid_names(),
            })
    }
}

impl fmt::Display for HouseSystemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Calculation flags passed through to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EphemerisFlags(pub i32);

impl EphemerisFlags {
    /// FLG_SWIEPH: use Swiss Ephemeris data files
    pub const SWIEPH: EphemerisFlags = EphemerisFlags(2);
    /// FLG_MOSEPH: built-in Moshier model, no data files needed
    pub const MOSEPH: EphemerisFlags = EphemerisFlags(4);
    /// FLG_SPEED: also compute speeds
    pub const SPEED: EphemerisFlags = EphemerisFlags(256);

    pub fn bits(self) -> i32 {
        self.0
    }

    pub fn contains(self, other: EphemerisFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for EphemerisFlags {
    type Output = EphemerisFlags;

    fn bitor(self, rhs: EphemerisFlags) -> EphemerisFlags {
        EphemerisFlags(self.0 | rhs.0)
    }
}

impl Default for EphemerisFlags {
    fn default() -> Self {
        EphemerisFlags::SWIEPH | EphemerisFlags::SPEED
    }
}
