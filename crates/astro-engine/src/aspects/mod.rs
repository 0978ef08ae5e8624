pub mod detector;
pub mod types;

pub use detector::AspectDetector;
pub use types::{Aspect, AspectDefinition, AspectKind, AspectPoint, ASPECT_TABLE};
