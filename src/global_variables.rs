// Crossing cycle timings (milliseconds)
pub const REQUEST_DELAY_MS: u64 = 500;
pub const CONFIRM_PRESENCE_MS: u64 = 3000;
pub const ABORT_AFTER_LEAVING_MS: u64 = 1000;
pub const ABORT_WHEN_ABSENT_MS: u64 = 2000;
pub const TRANSITION_MS: u64 = 2000;
pub const COUNTDOWN_TICK_MS: u64 = 1000;

// Countdown lengths (seconds)
pub const CROSSING_SECONDS: u32 = 5;
pub const ENDING_SECONDS: u32 = 3;

// Scene geometry used by the headless simulation
pub const ROAD_WIDTH: f64 = 12.0;
pub const SENSOR_RADIUS: f64 = 3.5;
pub const PEDESTRIAN_START: (f64, f64) = (-10.0, 0.0);
pub const CROSSING_TARGET_X: f64 = 10.0;
pub const WALK_SPEED: f64 = 2.2;
pub const HURRY_SPEED: f64 = 3.5;
pub const RETURN_HOME_DELAY_MS: u64 = 2000;

// Output files
pub const TRANSITIONS_CSV: &str = "crossing_transitions.csv";
pub const TIMELINE_PNG: &str = "crossing_timeline.png";
