// simulation.rs
use crate::control_system::CrossingController;
use crate::models::signals::CrossingState;
use crate::simulation_engine::pedestrian::{Pedestrian, SensorZone};
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Knobs for the headless scene loop.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub duration: Duration,
    pub frame: Duration,
    /// Chance per frame that the pedestrian presses the button while idle.
    pub press_probability: f64,
    /// Chance per frame that the pedestrian gets dragged somewhere else.
    pub drag_probability: f64,
    pub drag_reach: f64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(60),
            frame: Duration::from_millis(100),
            press_probability: 0.05,
            drag_probability: 0.01,
            drag_reach: 6.0,
            seed: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationStats {
    pub frames: u64,
    pub button_presses: u64,
    pub accepted_requests: u64,
    pub crossings_started: u64,
    pub occupancy_changes: u64,
}

/// Runs the scene loop: moves the pedestrian, feeds occupancy into the
/// controller and occasionally presses the button.
pub async fn run_simulation(
    controller: Arc<CrossingController>,
    config: SimulationConfig,
) -> SimulationStats {
    let zone = SensorZone::default();
    let mut pedestrian = Pedestrian::default();
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let press_probability = config.press_probability.clamp(0.0, 1.0);
    let drag_probability = config.drag_probability.clamp(0.0, 1.0);
    let mut stats = SimulationStats::default();
    let frame = config.frame.max(Duration::from_millis(1));
    let frame_ms = frame.as_millis() as u64;
    let total_frames = (config.duration.as_millis() / frame.as_millis()) as u64;

    let mut ticker = interval(frame);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut in_zone = false;
    let mut last_state = controller.state();

    info!(
        "Starting crossing simulation: {} frames of {}ms",
        total_frames, frame_ms
    );

    while stats.frames < total_frames {
        ticker.tick().await;
        stats.frames += 1;

        let snapshot = controller.snapshot();
        if snapshot.state == CrossingState::Default && rng.random_bool(drag_probability) {
            pedestrian.drag(&mut rng, config.drag_reach.abs());
            debug!(
                "Pedestrian dragged to ({:.1}, {:.1})",
                pedestrian.position.x, pedestrian.position.z
            );
        }
        pedestrian.step(frame_ms, snapshot.pedestrian_light);

        let now_in_zone = zone.contains(&pedestrian.position);
        if now_in_zone != in_zone {
            in_zone = now_in_zone;
            stats.occupancy_changes += 1;
            controller.set_occupancy(in_zone);
        }

        if snapshot.state.accepts_request()
            && !pedestrian.has_crossed
            && rng.random_bool(press_probability)
        {
            stats.button_presses += 1;
            if controller.request_crossing() {
                stats.accepted_requests += 1;
            }
        }

        let state = controller.state();
        if state != last_state {
            if state == CrossingState::Crossing {
                stats.crossings_started += 1;
            }
            last_state = state;
        }
    }

    info!("Simulation finished: {:?}", stats);
    stats
}
