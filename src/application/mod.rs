pub mod simulation_service;
pub mod tracking_view;

pub use simulation_service::*;
pub use tracking_view::*;
