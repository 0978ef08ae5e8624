use crate::ephemeris::Body;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectKind {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Opposition,
}

impl AspectKind {
    pub fn name(self) -> &'static str {
        match self {
            AspectKind::Conjunction => "conjunction",
            AspectKind::Sextile => "sextile",
            AspectKind::Square => "square",
            AspectKind::Trine => "trine",
            AspectKind::Opposition => "opposition",
        }
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of an aspect table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectDefinition {
    pub kind: AspectKind,
    /// Exact angle (0, 60, 90, 120, 180)
    pub angle: f64,
    /// Allowed deviation from the exact angle
    pub orb: f64,
}

/// Checked in this order; the first entry within orb wins.
pub const ASPECT_TABLE: [AspectDefinition; 5] = [
    AspectDefinition { kind: AspectKind::Conjunction, angle: 0.0, orb: 8.0 },
    AspectDefinition { kind: AspectKind::Sextile, angle: 60.0, orb: 6.0 },
    AspectDefinition { kind: AspectKind::Square, angle: 90.0, orb: 6.0 },
    AspectDefinition { kind: AspectKind::Trine, angle: 120.0, orb: 6.0 },
    AspectDefinition { kind: AspectKind::Opposition, angle: 180.0, orb: 8.0 },
];

/// A longitude to test, optionally with its speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectPoint {
    pub body: Body,
    pub longitude: f64,
    pub speed: Option<f64>,
}

impl AspectPoint {
    pub fn new(body: Body, longitude: f64) -> Self {
        Self { body, longitude, speed: None }
    }

    pub fn with_speed(body: Body, longitude: f64, speed: f64) -> Self {
        Self { body, longitude, speed: Some(speed) }
    }
}

/// A detected aspect between two bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aspect {
    pub body_a: Body,
    pub body_b: Body,
    #[serde(rename = "type")]
    pub aspect_type: AspectKind,
    pub exact_angle: f64,
    /// Deviation from the exact angle, always >= 0
    pub orb: f64,
    /// Whether the aspect is tightening; unknown without both speeds
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub applying: Option<bool>,
}

impl Aspect {
    /// True if this aspect joins `a` and `b`, in either order.
    pub fn joins(&self, a: Body, b: Body) -> bool {
        (self.body_a == a && self.body_b == b) || (self.body_a == b && self.body_b == a)
    }
}
