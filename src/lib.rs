pub mod config;
pub mod control_system;
pub mod global_variables;
pub mod models;
pub mod monitoring;
pub mod shared_data;
pub mod simulation_engine;

pub use config::{CrossingTimings, TimingsError};
pub use control_system::{CrossingController, PendingTimers, StateTransition, TimerClass};
pub use models::signals::{CarLight, CrossingState, PedestrianLight, SignalSnapshot};
