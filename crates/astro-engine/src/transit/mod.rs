//! Daily and weekly transit snapshots and retrograde station search.
//!
//! The engine holds no cached state. Whether a stored weekly snapshot is
//! stale is decided by the caller through [`needs_recalculation`].

pub mod daily;
pub mod station;
pub mod weekly;

pub use daily::{DailyTransitSnapshot, MoonPhase, MoonSnapshot};
pub use station::{RetrogradePeriod, StationDirection, MAX_STATION_STEPS};
pub use weekly::{
    intensity_of, needs_recalculation, needs_recalculation_at, Intensity, TransitAspect,
    WeeklyTransitSnapshot, MAX_MAJOR_TRANSITS, TRANSIT_ASPECT_TABLE, WEEKLY_VALIDITY_DAYS,
};

use crate::aspects::{AspectDetector, AspectPoint};
use crate::chart::NatalChart;
use crate::ephemeris::{Body, EphemerisContext};
use crate::error::EngineResult;
use crate::time::{JulianDay, TimeConverter};
use crate::zodiac::{checked_longitude, normalize_degrees, ZodiacSign};
use chrono::{DateTime, NaiveDate, Utc};

/// Hour (UTC) at which daily snapshots are taken.
pub const DEFAULT_DAILY_HOUR_UTC: u32 = 12;

pub struct TransitEngine<'a> {
    ctx: &'a EphemerisContext,
    converter: TimeConverter,
    detector: AspectDetector,
    daily_hour_utc: u32,
}

impl<'a> TransitEngine<'a> {
    pub fn new(ctx: &'a EphemerisContext) -> Self {
        Self {
            ctx,
            converter: TimeConverter::new(),
            detector: AspectDetector::with_table(
                TRANSIT_ASPECT_TABLE.iter().map(|(def, _)| *def).collect(),
            ),
            daily_hour_utc: DEFAULT_DAILY_HOUR_UTC,
        }
    }

    /// Take daily snapshots at a different UTC hour.
    pub fn with_daily_hour(mut self, hour_utc: u32) -> Self {
        self.daily_hour_utc = hour_utc;
        self
    }

    /// Moon sign and phase plus the retrograde set for a calendar date.
    pub fn daily(&self, date: NaiveDate) -> EngineResult<DailyTransitSnapshot> {
        let jd = self.converter.julian_day_at_hour(date, self.daily_hour_utc)?;
        self.daily_at(jd)
    }

    pub fn daily_at(&self, jd: JulianDay) -> EngineResult<DailyTransitSnapshot> {
        let sun = checked_longitude("sun", self.ctx.position(jd, Body::Sun)?.longitude_deg)?;
        let moon = checked_longitude("moon", self.ctx.position(jd, Body::Moon)?.longitude_deg)?;
        let phase_angle = normalize_degrees(moon - sun);

        let mut retrograde_planets = Vec::new();
        for body in Body::NON_LUMINARIES {
            if self.ctx.position(jd, body)?.is_retrograde() {
                retrograde_planets.push(body);
            }
        }

        let snapshot = DailyTransitSnapshot {
            julian_day: jd,
            moon: MoonSnapshot {
                sign: ZodiacSign::from_longitude(moon),
                phase_name: MoonPhase::from_angle(phase_angle),
                phase_angle,
            },
            retrograde_planets,
        };
        log::debug!(
            "daily transits at {}: moon in {} ({}, {:.2}°), {} retrograde",
            jd,
            snapshot.moon.sign,
            snapshot.moon.phase_name,
            phase_angle,
            snapshot.retrograde_planets.len()
        );
        Ok(snapshot)
    }

    /// Outer-body aspects to the natal placements, valid for seven days.
    pub fn weekly(&self, chart: &NatalChart, now: DateTime<Utc>) -> EngineResult<WeeklyTransitSnapshot> {
        self.weekly_at(chart, JulianDay::from_datetime(now))
    }

    pub fn weekly_at(&self, chart: &NatalChart, jd: JulianDay) -> EngineResult<WeeklyTransitSnapshot> {
        let mut outer = Vec::with_capacity(Body::OUTER.len());
        for body in Body::OUTER {
            let state = self.ctx.position(jd, body)?;
            let lon = checked_longitude(body.id(), state.longitude_deg)?;
            outer.push(AspectPoint::with_speed(body, lon, state.speed_deg_per_day));
        }
        // Natal placements are fixed in time.
        let natal: Vec<AspectPoint> = chart
            .planets
            .iter()
            .map(|(body, p)| AspectPoint::with_speed(*body, p.longitude, 0.0))
            .collect();

        let transits = self
            .detector
            .detect_between(&outer, &natal)
            .into_iter()
            .map(|aspect| {
                let transit_lon = longitude_of(&outer, aspect.body_a);
                let natal_lon = longitude_of(&natal, aspect.body_b);
                TransitAspect::from_aspect(aspect, transit_lon, natal_lon)
            })
            .collect();
        let (active_transits, major_transits) = weekly::rank_transits(transits);

        log::debug!(
            "weekly transits at {}: {} active, {} major",
            jd,
            active_transits.len(),
            major_transits.len()
        );
        Ok(WeeklyTransitSnapshot {
            calculated_julian_day: jd,
            valid_until_julian_day: jd.plus_days(WEEKLY_VALIDITY_DAYS),
            active_transits,
            major_transits,
        })
    }

    /// Step one day at a time from `jd` until the sign of `body`'s speed
    /// flips, giving up after [`MAX_STATION_STEPS`] days.
    ///
    /// `Start` walks backward to the station retrograde, `End` walks forward
    /// to the station direct. Returns the first day on the far side of the
    /// flip.
    pub fn find_retrograde_station(
        &self,
        jd: JulianDay,
        body: Body,
        direction: StationDirection,
    ) -> EngineResult<Option<JulianDay>> {
        let step = direction.step_days();
        let mut previous = self.ctx.position(jd, body)?.is_retrograde();
        if !previous {
            log::debug!("{} is not retrograde at {}; scanning for any speed flip", body, jd);
        }

        for i in 1..=MAX_STATION_STEPS {
            let t = jd.plus_days(step * i as f64);
            let retrograde = self.ctx.position(t, body)?.is_retrograde();
            if retrograde != previous {
                log::debug!("{} station ({:?}) found at {} after {} steps", body, direction, t, i);
                return Ok(Some(t));
            }
            previous = retrograde;
        }

        log::debug!(
            "{} station ({:?}) not found within {} days of {}",
            body,
            direction,
            MAX_STATION_STEPS,
            jd
        );
        Ok(None)
    }

    /// Both stations around a moment when `body` is retrograde.
    pub fn retrograde_period(&self, jd: JulianDay, body: Body) -> EngineResult<RetrogradePeriod> {
        Ok(RetrogradePeriod {
            body,
            start: self.find_retrograde_station(jd, body, StationDirection::Start)?,
            end: self.find_retrograde_station(jd, body, StationDirection::End)?,
        })
    }
}

fn longitude_of(points: &[AspectPoint], body: Body) -> f64 {
    points
        .iter()
        .find(|p| p.body == body)
        .map(|p| p.longitude)
        .unwrap_or_default()
}
