use crate::aspects::{AspectDetector, AspectPoint};
use crate::chart::types::{Ascendant, BigThree, NatalChart, PlanetPosition};
use crate::ephemeris::{Body, EphemerisContext};
use crate::error::EngineResult;
use crate::houses::HouseSystem;
use crate::time::{BirthData, JulianDay, TimeConverter};
use crate::zodiac::checked_longitude;
use std::collections::BTreeMap;

/// Builds complete natal charts from birth data.
pub struct NatalChartCalculator<'a> {
    ctx: &'a EphemerisContext,
    house_system: HouseSystem,
    converter: TimeConverter,
    detector: AspectDetector,
}

impl<'a> NatalChartCalculator<'a> {
    pub fn new(ctx: &'a EphemerisContext, house_system: HouseSystem) -> Self {
        Self {
            ctx,
            house_system,
            converter: TimeConverter::new(),
            detector: AspectDetector::new(),
        }
    }

    pub fn house_system(&self) -> HouseSystem {
        self.house_system
    }

    /// Compute the full chart for `birth`. Either every field is populated
    /// and verified, or an error is returned.
    pub fn compute(&self, birth: &BirthData) -> EngineResult<NatalChart> {
        let jd = self.converter.julian_day(birth)?;
        self.compute_at(jd, birth.latitude, birth.longitude)
    }

    /// Compute a chart for an already converted moment and place.
    pub fn compute_at(&self, jd: JulianDay, latitude: f64, longitude: f64) -> EngineResult<NatalChart> {
        let layout = self.house_system.layout(self.ctx, jd, latitude, longitude)?;

        let mut planets = BTreeMap::new();
        let mut points = Vec::with_capacity(Body::ALL.len());
        for body in Body::ALL {
            let state = self.ctx.position(jd, body)?;
            let lon = checked_longitude(body.id(), state.longitude_deg)?;
            let house = layout.assign_house(lon)?;
            planets.insert(body, PlanetPosition::new(lon, state.speed_deg_per_day, house));
            points.push(AspectPoint::with_speed(body, lon, state.speed_deg_per_day));
        }

        let aspects = self.detector.detect(&points);
        let ascendant = Ascendant::new(layout.ascendant);

        let big_three = BigThree::from_placements(&planets, &ascendant)?;

        let chart = NatalChart {
            julian_day: jd,
            house_system: layout.mode,
            ascendant,
            big_three,
            planets,
            houses: layout.cusps,
            aspects,
        };
        chart.verify()?;

        log::debug!(
            "natal chart at {}: sun {} moon {} rising {}, {} aspects",
            jd,
            chart.big_three.sun,
            chart.big_three.moon,
            chart.big_three.rising,
            chart.aspects.len()
        );
        Ok(chart)
    }
}
