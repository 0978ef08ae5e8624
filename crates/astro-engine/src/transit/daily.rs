use crate::ephemeris::Body;
use crate::time::JulianDay;
use crate::zodiac::ZodiacSign;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Eight named lunar phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoonPhase {
    #[serde(rename = "New Moon")]
    NewMoon,
    #[serde(rename = "Waxing Crescent")]
    WaxingCrescent,
    #[serde(rename = "First Quarter")]
    FirstQuarter,
    #[serde(rename = "Waxing Gibbous")]
    WaxingGibbous,
    #[serde(rename = "Full Moon")]
    FullMoon,
    #[serde(rename = "Waning Gibbous")]
    WaningGibbous,
    #[serde(rename = "Last Quarter")]
    LastQuarter,
    #[serde(rename = "Waning Crescent")]
    WaningCrescent,
}

/// Upper bounds (exclusive) of each phase bucket, in phase-angle order.
const PHASE_THRESHOLDS: [(f64, MoonPhase); 7] = [
    (22.5, MoonPhase::NewMoon),
    (67.5, MoonPhase::WaxingCrescent),
    (112.5, MoonPhase::FirstQuarter),
    (157.5, MoonPhase::WaxingGibbous),
    (202.5, MoonPhase::FullMoon),
    (247.5, MoonPhase::WaningGibbous),
    (292.5, MoonPhase::LastQuarter),
];

impl MoonPhase {
    /// Bucket a sun-moon phase angle in [0, 360). Bounds are strict `<`.
    pub fn from_angle(phase_angle: f64) -> Self {
        PHASE_THRESHOLDS
            .iter()
            .find(|(upper, _)| phase_angle < *upper)
            .map(|(_, phase)| *phase)
            .unwrap_or(MoonPhase::WaningCrescent)
    }

    pub fn name(self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::FullMoon => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoonSnapshot {
    pub sign: ZodiacSign,
    pub phase_name: MoonPhase,
    /// (moon - sun) mod 360
    pub phase_angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTransitSnapshot {
    pub julian_day: JulianDay,
    pub moon: MoonSnapshot,
    pub retrograde_planets: Vec<Body>,
}
