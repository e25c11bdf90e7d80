// control_system/mod.rs
pub mod crossing_controller;
pub mod timers;

pub use crossing_controller::{CrossingController, StateTransition};
pub use timers::{PendingTimers, TimerClass};
