pub mod ports;
pub mod simulator;

pub use ports::*;
pub use simulator::*;
