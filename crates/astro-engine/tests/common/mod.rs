#![allow(dead_code)]

use astro_engine::ephemeris::{
    Body, BodyState, EphemerisContext, EphemerisFlags, EphemerisProvider, HouseData,
    HouseSystemCode,
};
use astro_engine::error::EphemerisError;
use astro_engine::time::JulianDay;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Offsets (degrees) of cusps 1..12 from the ascendant; uneven like a
/// quadrant system.
pub const CUSP_OFFSETS: [f64; 12] = [
    0.0, 28.0, 58.0, 90.0, 122.0, 152.0, 180.0, 208.0, 238.0, 270.0, 302.0, 332.0,
];

#[derive(Debug, Clone, Copy)]
struct Motion {
    longitude: f64,
    speed: f64,
}

/// Deterministic linear-motion provider for tests.
///
/// Each body moves at a constant speed from its longitude at `epoch`. A body
/// can be given a retrograde window (in days after `epoch`) during which its
/// speed is negated, and individual bodies can be made to fail or to return
/// NaN.
pub struct SyntheticProvider {
    pub epoch: JulianDay,
    motions: HashMap<Body, Motion>,
    retrograde: HashMap<Body, (f64, f64)>,
    failing: Option<Body>,
    nan: Option<Body>,
    houses_fail: bool,
    nan_cusps: bool,
    ascendant: f64,
    position_calls: AtomicUsize,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        let motions = [
            (Body::Sun, 0.0, 0.9856),
            (Body::Moon, 90.0, 13.1764),
            (Body::Mercury, 10.0, 1.2),
            (Body::Venus, 40.0, 1.1),
            (Body::Mars, 200.0, 0.5),
            (Body::Jupiter, 100.0, 0.08),
            (Body::Saturn, 270.0, 0.03),
            (Body::Uranus, 300.0, 0.01),
            (Body::Neptune, 330.0, 0.006),
            (Body::Pluto, 250.0, 0.004),
        ]
        .into_iter()
        .map(|(body, longitude, speed)| (body, Motion { longitude, speed }))
        .collect();

        Self {
            epoch: JulianDay::J2000,
            motions,
            retrograde: HashMap::new(),
            failing: None,
            nan: None,
            houses_fail: false,
            nan_cusps: false,
            ascendant: 152.0,
            position_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_epoch(mut self, epoch: JulianDay) -> Self {
        self.epoch = epoch;
        self
    }

    /// Place `body` at `longitude` at the epoch, moving at `speed`.
    pub fn with_body(mut self, body: Body, longitude: f64, speed: f64) -> Self {
        self.motions.insert(body, Motion { longitude, speed });
        self
    }

    /// Negate `body`'s speed for epoch offsets in `[from_day, to_day)`.
    pub fn with_retrograde(mut self, body: Body, from_day: f64, to_day: f64) -> Self {
        self.retrograde.insert(body, (from_day, to_day));
        self
    }

    pub fn with_ascendant(mut self, ascendant: f64) -> Self {
        self.ascendant = ascendant;
        self
    }

    pub fn failing_for(mut self, body: Body) -> Self {
        self.failing = Some(body);
        self
    }

    pub fn nan_for(mut self, body: Body) -> Self {
        self.nan = Some(body);
        self
    }

    pub fn failing_houses(mut self) -> Self {
        self.houses_fail = true;
        self
    }

    /// Finite ascendant, NaN cusps.
    pub fn nan_cusps(mut self) -> Self {
        self.nan_cusps = true;
        self
    }

    pub fn position_calls(&self) -> usize {
        self.position_calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) {
        self.position_calls.store(0, Ordering::SeqCst);
    }
}

impl EphemerisProvider for SyntheticProvider {
    fn position(
        &self,
        jd: JulianDay,
        body: Body,
        _flags: EphemerisFlags,
    ) -> Result<BodyState, EphemerisError> {
        self.position_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing == Some(body) {
            return Err(EphemerisError::CalculationFailed {
                body: body.id().to_string(),
                julian_day: jd.value(),
                message: "synthetic failure".to_string(),
            });
        }
        if self.nan == Some(body) {
            return Ok(BodyState {
                longitude_deg: f64::NAN,
                speed_deg_per_day: 1.0,
            });
        }

        let motion = self.motions[&body];
        let days = jd.value() - self.epoch.value();
        let mut speed = motion.speed;
        if let Some((from, to)) = self.retrograde.get(&body) {
            if days >= *from && days < *to {
                speed = -speed.abs();
            }
        }
        Ok(BodyState {
            longitude_deg: (motion.longitude + motion.speed * days).rem_euclid(360.0),
            speed_deg_per_day: speed,
        })
    }

    fn houses(
        &self,
        jd: JulianDay,
        _latitude: f64,
        _longitude: f64,
        _system: HouseSystemCode,
    ) -> Result<HouseData, EphemerisError> {
        if self.houses_fail {
            return Err(EphemerisError::HouseCalculationFailed {
                julian_day: jd.value(),
                message: "synthetic failure".to_string(),
            });
        }
        let cusps_deg = if self.nan_cusps {
            [f64::NAN; 12]
        } else {
            CUSP_OFFSETS.map(|offset| (self.ascendant + offset).rem_euclid(360.0))
        };
        Ok(HouseData {
            ascendant_deg: self.ascendant,
            midheaven_deg: (self.ascendant + 270.0).rem_euclid(360.0),
            cusps_deg,
        })
    }
}

/// Route engine logs through the test harness; `RUST_LOG=debug` shows them.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Context over a shared synthetic provider, keeping a handle for
/// inspecting call counts.
pub fn context(provider: SyntheticProvider) -> (EphemerisContext, Arc<SyntheticProvider>) {
    let provider = Arc::new(provider);
    (EphemerisContext::new(provider.clone()), provider)
}
