pub mod actors;
pub mod interpolator;

pub use actors::*;
pub use interpolator::*;
