//! Zodiac signs and longitude helpers.
//!
//! Signs partition the ecliptic into 12 contiguous 30° buckets starting at
//! 0° Aries.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SIGN_SPAN: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Cardinal,
    Fixed,
    Mutable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Sign for an index; wraps modulo 12.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    /// Sign containing an arbitrary longitude.
    pub fn from_longitude(longitude: f64) -> Self {
        Self::from_index(sign_index(longitude))
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }

    /// Longitude of the sign's 0° boundary.
    pub fn start_longitude(self) -> f64 {
        self.index() as f64 * SIGN_SPAN
    }

    pub fn element(self) -> Element {
        match self.index() % 4 {
            0 => Element::Fire,
            1 => Element::Earth,
            2 => Element::Air,
            _ => Element::Water,
        }
    }

    pub fn modality(self) -> Modality {
        match self.index() % 3 {
            0 => Modality::Cardinal,
            1 => Modality::Fixed,
            _ => Modality::Mutable,
        }
    }

    /// Ruling planet, traditional or modern rulership.
    pub fn ruler(self, modern: bool) -> &'static str {
        const TRADITIONAL_RULERS: [&str; 12] = [
            "mars", "venus", "mercury", "moon", "sun", "mercury",
            "venus", "mars", "jupiter", "saturn", "saturn", "jupiter",
        ];
        match (self, modern) {
            (ZodiacSign::Scorpio, true) => "pluto",
            (ZodiacSign::Aquarius, true) => "uranus",
            (ZodiacSign::Pisces, true) => "neptune",
            _ => TRADITIONAL_RULERS[self.index()],
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ZodiacSign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|sign| sign.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown sign: {}", s))
    }
}

/// Normalize degrees to [0, 360).
pub fn normalize_degrees(value: f64) -> f64 {
    let normalized = value.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Normalize provider output, failing if the result is not a usable longitude.
pub fn checked_longitude(field: &str, raw: f64) -> EngineResult<f64> {
    let lon = normalize_degrees(raw);
    if !lon.is_finite() || !(0.0..360.0).contains(&lon) {
        return Err(EngineError::invariant(format!(
            "{} normalized to {} (raw {})",
            field, lon, raw
        )));
    }
    Ok(lon)
}

/// Get sign index (0-11) from longitude
pub fn sign_index(longitude: f64) -> usize {
    ((normalize_degrees(longitude) / SIGN_SPAN).floor() as usize) % 12
}

/// Degrees elapsed inside the containing sign, in [0, 30).
pub fn degree_in_sign(longitude: f64) -> f64 {
    let lon = normalize_degrees(longitude);
    lon - sign_index(lon) as f64 * SIGN_SPAN
}

/// Render a longitude as `"<deg>°<min>' <Sign>"`, minutes truncated.
pub fn format_longitude(longitude: f64) -> String {
    let sign = ZodiacSign::from_longitude(longitude);
    let within = degree_in_sign(longitude);
    let total_minutes = (within * 60.0).floor() as u32;
    let (degrees, minutes) = (total_minutes / 60, total_minutes % 60);
    format!("{}°{:02}' {}", degrees, minutes, sign)
}

/// Shortest angular distance between two longitudes, in [0, 180].
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    diff.min(360.0 - diff)
}
