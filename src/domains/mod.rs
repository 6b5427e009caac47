pub mod agent_tracking;
pub mod geodesy;
pub mod home_base;
pub mod logger;
pub mod motion;
pub mod presence;
pub mod rendering;
pub mod route_simulation;

pub use agent_tracking::*;
pub use geodesy::*;
pub use home_base::*;
pub use logger::*;
pub use motion::*;
pub use presence::*;
pub use rendering::*;
pub use route_simulation::*;
