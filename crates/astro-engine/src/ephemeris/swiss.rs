use crate::ephemeris::provider::EphemerisProvider;
use crate::ephemeris::types::{Body, BodyState, EphemerisFlags, HouseData, HouseSystemCode};
use crate::error::EphemerisError;
use crate::time::JulianDay;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use swisseph::swe::{calc_ut, houses_ex, set_ephe_path};
use swisseph::{AscMc, Cusp};

// libswe keeps its state in C globals; calls are serialized through this lock.
static SWE_LOCK: Mutex<()> = Mutex::new(());

const DEFAULT_EPHEMERIS_PATH: &str = "/usr/local/share/swisseph";

// SEFLG_JPLEPH | SEFLG_SWIEPH | SEFLG_MOSEPH
const EPHEMERIS_SOURCE_MASK: i32 = 7;

/// Swiss Ephemeris backed provider.
#[derive(Debug, Clone)]
pub struct SwissEphemerisProvider {
    ephemeris_path: Option<PathBuf>,
    // UTF-8 form handed to libswe before every call
    ephe_path_arg: Option<String>,
}

impl SwissEphemerisProvider {
    /// Create a provider reading data files from `ephemeris_path`,
    /// `SWISS_EPHEMERIS_PATH`, or the default install location.
    pub fn new(ephemeris_path: Option<PathBuf>) -> Result<Self, EphemerisError> {
        let path = ephemeris_path.unwrap_or_else(|| {
            env::var("SWISS_EPHEMERIS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_EPHEMERIS_PATH))
        });

        if !path.exists() {
            return Err(EphemerisError::FileNotFound {
                path: path.display().to_string(),
                message: "Ephemeris path does not exist. Please ensure Swiss Ephemeris data files are installed.".to_string(),
            });
        }

        let arg = path
            .to_str()
            .filter(|s| !s.contains('\0'))
            .map(str::to_owned)
            .ok_or_else(|| EphemerisError::FileNotFound {
                path: path.display().to_string(),
                message: "Ephemeris path must be valid UTF-8 without NUL bytes".to_string(),
            })?;

        log::debug!("swiss ephemeris data path: {}", arg);
        Ok(Self {
            ephemeris_path: Some(path),
            ephe_path_arg: Some(arg),
        })
    }

    /// Provider using the built-in Moshier model; pair it with
    /// [`EphemerisFlags::MOSEPH`].
    pub fn moshier() -> Self {
        Self {
            ephemeris_path: None,
            ephe_path_arg: None,
        }
    }

    pub fn ephemeris_path(&self) -> Option<&Path> {
        self.ephemeris_path.as_deref()
    }

    // Caller must hold SWE_LOCK: the path lives in libswe globals and another
    // provider may have changed it since our last call.
    fn select_path(&self) {
        if let Some(path) = &self.ephe_path_arg {
            set_ephe_path(path);
        }
    }
}

/// Ephemeris source libswe actually used, when it differs from the one
/// requested. libswe silently drops to Moshier when data files are missing.
pub fn substituted_source(requested: EphemerisFlags, reported: i32) -> Option<EphemerisFlags> {
    let wanted = requested.bits() & EPHEMERIS_SOURCE_MASK;
    let used = reported & EPHEMERIS_SOURCE_MASK;
    (wanted != 0 && used != wanted).then_some(EphemerisFlags(used))
}

impl EphemerisProvider for SwissEphemerisProvider {
    fn position(
        &self,
        jd: JulianDay,
        body: Body,
        flags: EphemerisFlags,
    ) -> Result<BodyState, EphemerisError> {
        let result = {
            let _guard = SWE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            self.select_path();
            calc_ut(jd.value(), body.swiss_code(), flags.bits() as u32)
        }
        .map_err(|e| EphemerisError::CalculationFailed {
            body: body.to_string(),
            julian_day: jd.value(),
            message: format!("Swiss Ephemeris error: {}", e),
        })?;

        if let Some(used) = substituted_source(flags, result.code) {
            log::warn!(
                "{} at {}: requested ephemeris flags {:#x}, libswe used {:#x}",
                body,
                jd,
                flags.bits(),
                used.bits()
            );
            return Err(EphemerisError::CalculationFailed {
                body: body.to_string(),
                julian_day: jd.value(),
                message: format!(
                    "Swiss Ephemeris data files not found under {}",
                    self.ephe_path_arg.as_deref().unwrap_or("the default search path")
                ),
            });
        }

        let out = result.out;
        Ok(BodyState {
            longitude_deg: out[0],
            speed_deg_per_day: out[3],
        })
    }

    fn houses(
        &self,
        jd: JulianDay,
        latitude: f64,
        longitude: f64,
        system: HouseSystemCode,
    ) -> Result<HouseData, EphemerisError> {
        let (c, a) = {
            let _guard = SWE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            self.select_path();
            houses_ex(jd.value(), 0, latitude, longitude, system.swiss_byte() as i32)
        };

        let cusps = Cusp::from_array(c);
        let ascmc = AscMc::from_array(a);
        let cusps_deg = [
            cusps.first, cusps.second, cusps.third, cusps.fourth,
            cusps.fifth, cusps.sixth, cusps.seventh, cusps.eighth,
            cusps.ninth, cusps.tenth, cusps.eleventh, cusps.twelfth,
        ];

        if cusps_deg.iter().all(|&cusp| cusp == 0.0) {
            return Err(EphemerisError::HouseCalculationFailed {
                julian_day: jd.value(),
                message: format!(
                    "{} returned no cusps for lat {} lon {}",
                    system, latitude, longitude
                ),
            });
        }

        Ok(HouseData {
            ascendant_deg: ascmc.ascendant,
            midheaven_deg: ascmc.mc,
            cusps_deg,
        })
    }
}
