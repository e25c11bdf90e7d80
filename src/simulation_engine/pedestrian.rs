use crate::global_variables::{
    CROSSING_TARGET_X, HURRY_SPEED, PEDESTRIAN_START, RETURN_HOME_DELAY_MS, ROAD_WIDTH,
    SENSOR_RADIUS, WALK_SPEED,
};
use crate::models::signals::PedestrianLight;
use rand::Rng;

/// Ground-plane position (x across the road, z along it).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }
}

/// Circular detection zone next to the push button.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorZone {
    pub center: Position,
    pub radius: f64,
}

impl SensorZone {
    pub fn contains(&self, position: &Position) -> bool {
        self.center.distance_to(position) < self.radius
    }
}

impl Default for SensorZone {
    fn default() -> Self {
        Self {
            center: Position::new(-ROAD_WIDTH / 2.0 - 4.0, 0.0),
            radius: SENSOR_RADIUS,
        }
    }
}

/// A pedestrian that waits at the kerb, crosses on green and walks back
/// a little after the light returns to red.
#[derive(Debug, Clone)]
pub struct Pedestrian {
    pub position: Position,
    pub home: Position,
    pub has_crossed: bool,
    // Milliseconds spent on the far side since the light went red.
    waiting_to_return_ms: u64,
}

impl Pedestrian {
    pub fn new(home: Position) -> Self {
        Self {
            position: home,
            home,
            has_crossed: false,
            waiting_to_return_ms: 0,
        }
    }

    pub fn is_walking(&self, light: PedestrianLight) -> bool {
        light.allows_walking() && !self.has_crossed && self.position.x < CROSSING_TARGET_X
    }

    /// Advances the pedestrian by `dt_ms` under the given pedestrian light.
    pub fn step(&mut self, dt_ms: u64, light: PedestrianLight) {
        if self.is_walking(light) {
            let speed = match light {
                PedestrianLight::Blinking => HURRY_SPEED,
                _ => WALK_SPEED,
            };
            self.position.x += speed * dt_ms as f64 / 1000.0;
            if self.position.x >= CROSSING_TARGET_X {
                self.position.x = CROSSING_TARGET_X;
                self.has_crossed = true;
            }
            return;
        }

        if light.allows_walking() && !self.has_crossed {
            // Already at or past the far kerb.
            self.has_crossed = true;
        }

        if light == PedestrianLight::Red && self.has_crossed {
            self.waiting_to_return_ms += dt_ms;
            if self.waiting_to_return_ms >= RETURN_HOME_DELAY_MS {
                self.return_home();
            }
        }
    }

    /// Moves the pedestrian somewhere within `reach` of home, the way a
    /// user drags the figure around the kerb. Only while idle on the home side.
    pub fn drag<R: Rng>(&mut self, rng: &mut R, reach: f64) {
        if self.has_crossed {
            return;
        }
        self.position = Position::new(
            self.home.x + rng.random_range(-reach..=reach),
            self.home.z + rng.random_range(-reach..=reach),
        );
    }

    pub fn return_home(&mut self) {
        self.position = self.home;
        self.has_crossed = false;
        self.waiting_to_return_ms = 0;
    }
}

impl Default for Pedestrian {
    fn default() -> Self {
        Self::new(Position::new(PEDESTRIAN_START.0, PEDESTRIAN_START.1))
    }
}
