pub mod media_assembly;
pub mod segment_extractor;

pub use media_assembly::*;
pub use segment_extractor::*;
