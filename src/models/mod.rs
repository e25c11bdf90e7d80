pub mod signals;

pub use signals::{CarLight, CrossingState, PedestrianLight, SignalSnapshot};
