// simulation_engine/mod.rs
pub mod pedestrian;
pub mod simulation;

pub use pedestrian::{Pedestrian, Position, SensorZone};
pub use simulation::{run_simulation, SimulationConfig, SimulationStats};
