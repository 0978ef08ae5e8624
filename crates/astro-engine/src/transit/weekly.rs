use crate::aspects::{Aspect, AspectDefinition, AspectKind};
use crate::ephemeris::Body;
use crate::time::JulianDay;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Days a weekly snapshot stays valid.
pub const WEEKLY_VALIDITY_DAYS: f64 = 7.0;

/// Entries kept in `major_transits`.
pub const MAX_MAJOR_TRANSITS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Major,
    Minor,
}

/// Transit aspect table: same angles and orbs as the natal table, in the
/// same order, each tagged with an intensity.
pub const TRANSIT_ASPECT_TABLE: [(AspectDefinition, Intensity); 5] = [
    (AspectDefinition { kind: AspectKind::Conjunction, angle: 0.0, orb: 8.0 }, Intensity::Major),
    (AspectDefinition { kind: AspectKind::Sextile, angle: 60.0, orb: 6.0 }, Intensity::Minor),
    (AspectDefinition { kind: AspectKind::Square, angle: 90.0, orb: 6.0 }, Intensity::Major),
    (AspectDefinition { kind: AspectKind::Trine, angle: 120.0, orb: 6.0 }, Intensity::Major),
    (AspectDefinition { kind: AspectKind::Opposition, angle: 180.0, orb: 8.0 }, Intensity::Major),
];

pub fn intensity_of(kind: AspectKind) -> Intensity {
    TRANSIT_ASPECT_TABLE
        .iter()
        .find(|(def, _)| def.kind == kind)
        .map(|(_, intensity)| *intensity)
        .unwrap_or(Intensity::Minor)
}

/// An outer body currently aspecting a natal placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitAspect {
    pub transit_body: Body,
    pub transit_longitude: f64,
    pub natal_body: Body,
    pub natal_longitude: f64,
    #[serde(rename = "type")]
    pub aspect_type: AspectKind,
    pub exact_angle: f64,
    pub orb: f64,
    pub intensity: Intensity,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub applying: Option<bool>,
}

impl TransitAspect {
    pub(crate) fn from_aspect(aspect: Aspect, transit_longitude: f64, natal_longitude: f64) -> Self {
        Self {
            transit_body: aspect.body_a,
            transit_longitude,
            natal_body: aspect.body_b,
            natal_longitude,
            aspect_type: aspect.aspect_type,
            exact_angle: aspect.exact_angle,
            orb: aspect.orb,
            intensity: intensity_of(aspect.aspect_type),
            applying: aspect.applying,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTransitSnapshot {
    pub calculated_julian_day: JulianDay,
    pub valid_until_julian_day: JulianDay,
    /// Every transit aspect, tightest orb first
    pub active_transits: Vec<TransitAspect>,
    /// First five major entries of `active_transits`
    pub major_transits: Vec<TransitAspect>,
}

impl WeeklyTransitSnapshot {
    pub fn needs_recalculation(&self, now: DateTime<Utc>) -> bool {
        needs_recalculation(self.valid_until_julian_day, now)
    }
}

/// True exactly when `now` has reached the snapshot's expiry.
pub fn needs_recalculation(valid_until: JulianDay, now: DateTime<Utc>) -> bool {
    needs_recalculation_at(valid_until, JulianDay::from_datetime(now))
}

pub fn needs_recalculation_at(valid_until: JulianDay, now: JulianDay) -> bool {
    now.value() >= valid_until.value()
}

/// Sort tightest first and pick the leading major transits.
pub(crate) fn rank_transits(mut transits: Vec<TransitAspect>) -> (Vec<TransitAspect>, Vec<TransitAspect>) {
    transits.sort_by(|a, b| a.orb.total_cmp(&b.orb));
    let major = transits
        .iter()
        .filter(|t| t.intensity == Intensity::Major)
        .take(MAX_MAJOR_TRANSITS)
        .cloned()
        .collect();
    (transits, major)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspects::ASPECT_TABLE;

    fn transit(kind: AspectKind, orb: f64) -> TransitAspect {
        TransitAspect {
            transit_body: Body::Saturn,
            transit_longitude: 0.0,
            natal_body: Body::Sun,
            natal_longitude: 0.0,
            aspect_type: kind,
            exact_angle: 0.0,
            orb,
            intensity: intensity_of(kind),
            applying: None,
        }
    }

    #[test]
    fn test_transit_table_parallels_natal_table() {
        for ((def, _), natal) in TRANSIT_ASPECT_TABLE.iter().zip(ASPECT_TABLE.iter()) {
            assert_eq!(def, natal);
        }
        assert_eq!(intensity_of(AspectKind::Sextile), Intensity::Minor);
        assert_eq!(intensity_of(AspectKind::Square), Intensity::Major);
    }

    #[test]
    fn test_rank_sorts_by_orb_and_caps_majors() {
        let input = vec![
            transit(AspectKind::Trine, 4.0),
            transit(AspectKind::Sextile, 0.1),
            transit(AspectKind::Square, 2.0),
            transit(AspectKind::Conjunction, 0.5),
            transit(AspectKind::Opposition, 3.0),
            transit(AspectKind::Square, 5.5),
            transit(AspectKind::Trine, 1.0),
        ];
        let (active, major) = rank_transits(input);
        let orbs: Vec<f64> = active.iter().map(|t| t.orb).collect();
        assert_eq!(orbs, vec![0.1, 0.5, 1.0, 2.0, 3.0, 4.0, 5.5]);
        assert_eq!(major.len(), 5);
        assert!(major.iter().all(|t| t.intensity == Intensity::Major));
        assert_eq!(major[0].orb, 0.5);
        assert_eq!(major[4].orb, 4.0);
    }

    #[test]
    fn test_recalculation_threshold_is_inclusive() {
        let until = JulianDay(2_460_000.5);
        assert!(!needs_recalculation_at(until, JulianDay(2_460_000.4)));
        assert!(needs_recalculation_at(until, JulianDay(2_460_000.5)));
        assert!(needs_recalculation_at(until, JulianDay(2_460_001.0)));
    }
}
