use crate::ephemeris::types::{Body, BodyState, EphemerisFlags, HouseData, HouseSystemCode};
use crate::error::EphemerisError;
use crate::time::JulianDay;
use std::fmt;
use std::sync::Arc;

/// Source of body positions and house cusps.
///
/// Implementations must be idempotent and free of side effects visible to
/// the engine: the same query always yields the same answer, so callers may
/// retry freely.
pub trait EphemerisProvider: Send + Sync {
    /// Ecliptic longitude and longitudinal speed of `body` at `jd` (UT).
    fn position(
        &self,
        jd: JulianDay,
        body: Body,
        flags: EphemerisFlags,
    ) -> Result<BodyState, EphemerisError>;

    /// Ascendant, midheaven and the 12 cusps for a place and house system.
    fn houses(
        &self,
        jd: JulianDay,
        latitude: f64,
        longitude: f64,
        system: HouseSystemCode,
    ) -> Result<HouseData, EphemerisError>;
}

impl<P: EphemerisProvider + ?Sized> EphemerisProvider for Arc<P> {
    fn position(
        &self,
        jd: JulianDay,
        body: Body,
        flags: EphemerisFlags,
    ) -> Result<BodyState, EphemerisError> {
        (**self).position(jd, body, flags)
    }

    fn houses(
        &self,
        jd: JulianDay,
        latitude: f64,
        longitude: f64,
        system: HouseSystemCode,
    ) -> Result<HouseData, EphemerisError> {
        (**self).houses(jd, latitude, longitude, system)
    }
}

/// Ephemeris configuration built once at process start and handed by
/// reference to every calculator.
#[derive(Clone)]
pub struct EphemerisContext {
    provider: Arc<dyn EphemerisProvider>,
    flags: EphemerisFlags,
}

impl EphemerisContext {
    pub fn new(provider: Arc<dyn EphemerisProvider>) -> Self {
        Self::with_flags(provider, EphemerisFlags::default())
    }

    pub fn with_flags(provider: Arc<dyn EphemerisProvider>, flags: EphemerisFlags) -> Self {
        Self { provider, flags }
    }

    pub fn flags(&self) -> EphemerisFlags {
        self.flags
    }

    pub fn provider(&self) -> &dyn EphemerisProvider {
        self.provider.as_ref()
    }

    /// Position of `body`, rejecting non-finite provider output.
    pub fn position(&self, jd: JulianDay, body: Body) -> Result<BodyState, EphemerisError> {
        let state = self.provider.position(jd, body, self.flags)?;
        if !state.longitude_deg.is_finite() {
            log::warn!("{} longitude at {} is not finite", body, jd);
            return Err(EphemerisError::NonFinite {
                field: format!("{} longitude", body),
                julian_day: jd.value(),
            });
        }
        if !state.speed_deg_per_day.is_finite() {
            log::warn!("{} speed at {} is not finite", body, jd);
            return Err(EphemerisError::NonFinite {
                field: format!("{} speed", body),
                julian_day: jd.value(),
            });
        }
        Ok(state)
    }

    /// House output, rejecting a non-finite ascendant. Cusps are left to the
    /// caller since whole-sign layouts never read them.
    pub fn houses(
        &self,
        jd: JulianDay,
        latitude: f64,
        longitude: f64,
        system: HouseSystemCode,
    ) -> Result<HouseData, EphemerisError> {
        let data = self.provider.houses(jd, latitude, longitude, system)?;
        if !data.ascendant_deg.is_finite() {
            return Err(EphemerisError::NonFinite {
                field: "ascendant".to_string(),
                julian_day: jd.value(),
            });
        }
        Ok(data)
    }
}

impl fmt::Debug for EphemerisContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemerisContext")
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
