pub mod job;
pub mod pool;
pub mod queue;

pub use job::*;
pub use pool::*;
pub use queue::*;
