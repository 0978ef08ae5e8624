//! Astrological computation engine: natal charts, aspects, transit snapshots
//! and compatibility scoring over a pluggable ephemeris provider.

pub mod aspects;
pub mod chart;
pub mod compatibility;
pub mod ephemeris;
pub mod error;
pub mod houses;
pub mod time;
pub mod transit;
pub mod zodiac;

pub use aspects::{Aspect, AspectDetector, AspectKind, AspectPoint};
pub use chart::{ChartPatch, NatalChart, NatalChartCalculator};
pub use compatibility::{CompatibilityResult, CompatibilityScorer, CompatibilityScores, RelationshipType};
pub use ephemeris::{Body, EphemerisContext, EphemerisProvider, SwissEphemerisProvider};
pub use error::{EngineError, EngineResult, EphemerisError, ErrorKind};
pub use houses::{HouseMode, HouseSystem};
pub use time::{BirthData, JulianDay, TimeConverter};
pub use transit::{
    DailyTransitSnapshot, StationDirection, TransitEngine, WeeklyTransitSnapshot,
};
pub use zodiac::ZodiacSign;
