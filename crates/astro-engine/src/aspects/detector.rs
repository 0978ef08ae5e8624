use crate::aspects::types::{Aspect, AspectDefinition, AspectPoint, ASPECT_TABLE};
use crate::zodiac::angular_distance;

/// Project relative motion this far ahead (days) to classify applying aspects.
const APPLYING_TIME_STEP: f64 = 0.1;

/// Finds aspects between longitudes using a fixed, ordered table.
#[derive(Debug, Clone)]
pub struct AspectDetector {
    table: Vec<AspectDefinition>,
}

impl AspectDetector {
    /// Detector using the standard natal table.
    pub fn new() -> Self {
        Self::with_table(ASPECT_TABLE.to_vec())
    }

    pub fn with_table(table: Vec<AspectDefinition>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &[AspectDefinition] {
        &self.table
    }

    /// First table entry within orb of the separation between two longitudes,
    /// with the orb actually measured.
    ///
    /// Entries are checked in table order and the first hit wins, even if a
    /// later entry would be tighter.
    pub fn match_angle(&self, lon_a: f64, lon_b: f64) -> Option<(AspectDefinition, f64)> {
        let distance = angular_distance(lon_a, lon_b);
        if !distance.is_finite() {
            return None;
        }
        self.table.iter().find_map(|def| {
            let delta = (distance - def.angle).abs();
            (delta <= def.orb).then_some((*def, delta))
        })
    }

    /// Aspects among one set of bodies: every unordered pair once, in
    /// canonical body order, skipping self-pairs.
    pub fn detect(&self, points: &[AspectPoint]) -> Vec<Aspect> {
        let mut ordered: Vec<AspectPoint> = points.to_vec();
        ordered.sort_by_key(|p| p.body);
        ordered.dedup_by_key(|p| p.body);

        let mut aspects = Vec::new();
        for i in 0..ordered.len() {
            for j in (i + 1)..ordered.len() {
                if let Some(aspect) = self.aspect_between(&ordered[i], &ordered[j]) {
                    aspects.push(aspect);
                }
            }
        }
        log::debug!("{} aspects among {} bodies", aspects.len(), ordered.len());
        aspects
    }

    /// Aspects from every point in `from` to every point in `to`.
    ///
    /// The two sets are different moments, so a body may aspect its own
    /// position in the other set.
    pub fn detect_between(&self, from: &[AspectPoint], to: &[AspectPoint]) -> Vec<Aspect> {
        let mut aspects = Vec::new();
        for a in from {
            for b in to {
                if let Some(aspect) = self.aspect_between(a, b) {
                    aspects.push(aspect);
                }
            }
        }
        aspects
    }

    fn aspect_between(&self, a: &AspectPoint, b: &AspectPoint) -> Option<Aspect> {
        let (def, orb) = self.match_angle(a.longitude, b.longitude)?;
        let applying = match (a.speed, b.speed) {
            (Some(speed_a), Some(speed_b)) => Some(is_applying(
                a.longitude,
                b.longitude,
                speed_a,
                speed_b,
                def.angle,
            )),
            _ => None,
        };
        Some(Aspect {
            body_a: a.body,
            body_b: b.body,
            aspect_type: def.kind,
            exact_angle: def.angle,
            orb,
            applying,
        })
    }
}

impl Default for AspectDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the separation is moving toward the exact angle.
fn is_applying(lon_a: f64, lon_b: f64, speed_a: f64, speed_b: f64, aspect_angle: f64) -> bool {
    let current_distance = (angular_distance(lon_a, lon_b) - aspect_angle).abs();
    let future_a = lon_a + speed_a * APPLYING_TIME_STEP;
    let future_b = lon_b + speed_b * APPLYING_TIME_STEP;
    let future_distance = (angular_distance(future_a, future_b) - aspect_angle).abs();
    future_distance < current_distance
}
