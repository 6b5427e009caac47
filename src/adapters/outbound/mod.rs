pub mod home_base_file;
pub mod logging;
pub mod memory_store;
pub mod osrm_routing;
pub mod tracing_render;

pub use home_base_file::*;
pub use logging::*;
pub use memory_store::*;
pub use osrm_routing::*;
pub use tracing_render::*;
