//! Civil birth data and the Julian Day time coordinate.

use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Largest real-world UTC offset in hours (UTC+14, Line Islands).
const MAX_UTC_OFFSET_HOURS: f64 = 14.0;

/// Civil birth data as captured from the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthData {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub hour: u32,
    pub minute: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub utc_offset_hours: f64,
}

/// Continuous day count used as the universal time coordinate.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JulianDay(pub f64);

impl JulianDay {
    /// J2000.0 epoch, 2000-01-01 12:00 UTC.
    pub const J2000: JulianDay = JulianDay(2_451_545.0);

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn plus_days(self, days: f64) -> JulianDay {
        JulianDay(self.0 + days)
    }

    /// Julian Day of a UTC instant.
    pub fn from_datetime(dt: DateTime<Utc>) -> JulianDay {
        let naive = dt.naive_utc();
        let hour_decimal = naive.hour() as f64
            + naive.minute() as f64 / 60.0
            + (naive.second() as f64 + naive.nanosecond() as f64 / 1e9) / 3600.0;
        JulianDay(gregorian_to_julian_day(
            naive.year(),
            naive.month(),
            naive.day(),
            hour_decimal,
        ))
    }

    /// UTC instant of this Julian Day, to the nearest millisecond.
    pub fn to_datetime(self) -> EngineResult<DateTime<Utc>> {
        if !self.0.is_finite() {
            return Err(EngineError::invalid_input("julianDay", "not a finite number"));
        }
        let (year, month, day, day_fraction) = julian_day_to_gregorian(self.0);
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            EngineError::invalid_input(
                "julianDay",
                format!("{} maps outside the supported calendar range", self.0),
            )
        })?;
        let millis = (day_fraction * 86_400_000.0).round() as i64;
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| EngineError::invariant(format!("midnight missing on {}", date)))?
            .checked_add_signed(Duration::milliseconds(millis))
            .ok_or_else(|| {
                EngineError::invalid_input(
                    "julianDay",
                    format!("{} maps outside the supported calendar range", self.0),
                )
            })?;
        Ok(Utc.from_utc_datetime(&naive))
    }
}

impl fmt::Display for JulianDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JD {:.5}", self.0)
    }
}

impl Add<f64> for JulianDay {
    type Output = JulianDay;

    fn add(self, days: f64) -> JulianDay {
        self.plus_days(days)
    }
}

impl Sub<f64> for JulianDay {
    type Output = JulianDay;

    fn sub(self, days: f64) -> JulianDay {
        self.plus_days(-days)
    }
}

/// Converts civil birth data into a Julian Day.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeConverter;

impl TimeConverter {
    pub fn new() -> Self {
        Self
    }

    /// Validate birth data and return its UTC instant.
    pub fn to_utc(&self, birth: &BirthData) -> EngineResult<NaiveDateTime> {
        let date = NaiveDate::from_ymd_opt(birth.year, birth.month, birth.day).ok_or_else(|| {
            EngineError::invalid_input(
                "date",
                format!(
                    "{:04}-{:02}-{:02} is not a valid Gregorian date",
                    birth.year, birth.month, birth.day
                ),
            )
        })?;
        if birth.hour >= 24 {
            return Err(EngineError::invalid_input(
                "hour",
                format!("{} is outside [0, 24)", birth.hour),
            ));
        }
        if birth.minute >= 60 {
            return Err(EngineError::invalid_input(
                "minute",
                format!("{} is outside [0, 60)", birth.minute),
            ));
        }
        validate_coordinates(birth.latitude, birth.longitude)?;
        if !birth.utc_offset_hours.is_finite()
            || birth.utc_offset_hours.abs() > MAX_UTC_OFFSET_HOURS
        {
            return Err(EngineError::invalid_input(
                "utcOffsetHours",
                format!("{} is outside [-14, 14]", birth.utc_offset_hours),
            ));
        }

        let local = date
            .and_hms_opt(birth.hour, birth.minute, 0)
            .ok_or_else(|| EngineError::invalid_input("time", "invalid hour/minute"))?;
        let offset_seconds = (birth.utc_offset_hours * 3600.0).round() as i64;
        local
            .checked_sub_signed(Duration::seconds(offset_seconds))
            .ok_or_else(|| {
                EngineError::invalid_input(
                    "utcOffsetHours",
                    format!(
                        "{} moves {} outside the supported calendar range",
                        birth.utc_offset_hours, local
                    ),
                )
            })
    }

    /// Julian Day (UT) of the birth moment.
    pub fn julian_day(&self, birth: &BirthData) -> EngineResult<JulianDay> {
        let utc = self.to_utc(birth)?;
        let jd = JulianDay::from_datetime(Utc.from_utc_datetime(&utc));
        log::debug!("birth {:?} -> utc {} -> {}", birth, utc, jd);
        Ok(jd)
    }

    /// Julian Day of a calendar date at a fixed UTC hour.
    pub fn julian_day_at_hour(&self, date: NaiveDate, hour_utc: u32) -> EngineResult<JulianDay> {
        if hour_utc >= 24 {
            return Err(EngineError::invalid_input(
                "hour",
                format!("{} is outside [0, 24)", hour_utc),
            ));
        }
        Ok(JulianDay(gregorian_to_julian_day(
            date.year(),
            date.month(),
            date.day(),
            hour_utc as f64,
        )))
    }
}

/// Reject latitude outside [-90, 90] or longitude outside [-180, 180].
pub fn validate_coordinates(latitude: f64, longitude: f64) -> EngineResult<()> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(EngineError::invalid_input(
            "latitude",
            format!("{} is outside [-90, 90]", latitude),
        ));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(EngineError::invalid_input(
            "longitude",
            format!("{} is outside [-180, 180]", longitude),
        ));
    }
    Ok(())
}

/// Standard Gregorian calendar to Julian Day conversion (Meeus, ch. 7).
pub fn gregorian_to_julian_day(year: i32, month: u32, day: u32, hour_decimal: f64) -> f64 {
    let (mut y, mut m) = (year as f64, month as f64);
    if month <= 2 {
        y -= 1.0;
        m += 12.0;
    }
    let a = (y / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    let d = day as f64 + hour_decimal / 24.0;
    (365.25 * (y + 4716.0)).floor() + (30.6001 * (m + 1.0)).floor() + d + b - 1524.5
}

/// Inverse of [`gregorian_to_julian_day`]: (year, month, day, fraction of day).
pub fn julian_day_to_gregorian(jd: f64) -> (i32, u32, u32, f64) {
    let shifted = jd + 0.5;
    let z = shifted.floor();
    let f = shifted - z;
    let alpha = ((z - 1_867_216.25) / 36_524.25).floor();
    let a = z + 1.0 + alpha - (alpha / 4.0).floor();
    let b = a + 1524.0;
    let c = ((b - 122.1) / 365.25).floor();
    let d = (365.25 * c).floor();
    let e = ((b - d) / 30.6001).floor();

    let day = b - d - (30.6001 * e).floor();
    let month = if e < 14.0 { e - 1.0 } else { e - 13.0 };
    let year = if month > 2.0 { c - 4716.0 } else { c - 4715.0 };
    (year as i32, month as u32, day as u32, f)
}
