pub mod provider;
pub mod swiss;
pub mod types;

pub use provider::{EphemerisContext, EphemerisProvider};
pub use swiss::SwissEphemerisProvider;
pub use types::{Body, BodyState, EphemerisFlags, HouseData, HouseSystemCode};
