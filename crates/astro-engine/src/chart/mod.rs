pub mod natal;
pub mod types;

pub use natal::NatalChartCalculator;
pub use types::{Ascendant, BigThree, ChartPatch, NatalChart, PlanetPosition};
