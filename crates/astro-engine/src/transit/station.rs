use crate::ephemeris::Body;
use crate::time::JulianDay;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Hard cap on daily steps per search.
pub const MAX_STATION_STEPS: u32 = 120;

/// Which station to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationDirection {
    /// Station retrograde: search backward in time.
    Start,
    /// Station direct: search forward in time.
    End,
}

impl StationDirection {
    /// Signed step in days.
    pub fn step_days(self) -> f64 {
        match self {
            StationDirection::Start => -1.0,
            StationDirection::End => 1.0,
        }
    }
}

impl FromStr for StationDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start" => Ok(StationDirection::Start),
            "end" => Ok(StationDirection::End),
            other => Err(format!("Unknown station direction: {} (expected start or end)", other)),
        }
    }
}

/// Both stations bracketing a retrograde period, where found.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrogradePeriod {
    pub body: Body,
    pub start: Option<JulianDay>,
    pub end: Option<JulianDay>,
}

impl RetrogradePeriod {
    /// Length in days when both stations were found.
    pub fn duration_days(&self) -> Option<f64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(end.value() - start.value()),
            _ => None,
        }
    }
}
