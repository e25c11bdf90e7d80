use serde::{Deserialize, Serialize};
use std::fmt;

/// The six phases of a crossing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossingState {
    Default,    // Cars green, pedestrians red
    Request,    // Button pressed, sensor switched on
    Validation, // Checking that someone is really waiting
    Transition, // Cars yellow before red
    Crossing,   // Pedestrians may cross
    Ending,     // Time running out, pedestrian light blinking
}

impl CrossingState {
    pub const ALL: [CrossingState; 6] = [
        CrossingState::Default,
        CrossingState::Request,
        CrossingState::Validation,
        CrossingState::Transition,
        CrossingState::Crossing,
        CrossingState::Ending,
    ];

    /// Short label shown in a status panel.
    pub fn label(&self) -> &'static str {
        match self {
            CrossingState::Default => "Normal Flow",
            CrossingState::Request => "Request Sent",
            CrossingState::Validation => "Presence Check",
            CrossingState::Transition => "Transition",
            CrossingState::Crossing => "Safe Crossing",
            CrossingState::Ending => "Finishing",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CrossingState::Default => {
                "Green for vehicles. Step into the sensor zone and press the button to cross."
            }
            CrossingState::Request => "Button pressed. Ultrasonic sensor activated.",
            CrossingState::Validation => "Checking for a real presence in the sensor zone.",
            CrossingState::Transition => "Vehicle light turning red. Vehicles slowing down.",
            CrossingState::Crossing => "Pedestrian signal open. Sound waves and vibration active.",
            CrossingState::Ending => "Time running out. Blinking light with faster alerts.",
        }
    }

    /// The push button only does something while the cycle is idle.
    pub fn accepts_request(&self) -> bool {
        *self == CrossingState::Default
    }

    /// Position on the cycle, used as the y axis of timeline charts.
    pub fn index(&self) -> i32 {
        match self {
            CrossingState::Default => 0,
            CrossingState::Request => 1,
            CrossingState::Validation => 2,
            CrossingState::Transition => 3,
            CrossingState::Crossing => 4,
            CrossingState::Ending => 5,
        }
    }
}

impl fmt::Display for CrossingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrossingState::Default => "default",
            CrossingState::Request => "request",
            CrossingState::Validation => "validation",
            CrossingState::Transition => "transition",
            CrossingState::Crossing => "crossing",
            CrossingState::Ending => "ending",
        };
        f.write_str(name)
    }
}

/// Vehicle signal head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarLight {
    Green,
    Yellow,
    Red,
}

/// Pedestrian signal head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PedestrianLight {
    Red,
    Green,
    Blinking,
}

impl PedestrianLight {
    /// Green and blinking both mean the pedestrian may be on the road.
    pub fn allows_walking(&self) -> bool {
        matches!(self, PedestrianLight::Green | PedestrianLight::Blinking)
    }
}

/// Everything the rendering side needs to draw the crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalSnapshot {
    pub state: CrossingState,
    pub car_light: CarLight,
    pub pedestrian_light: PedestrianLight,
    pub sensor_active: bool,
    pub sound_waves: bool,
    pub sound_waves_fast: bool,
    pub vibration: bool,
    pub pedestrian_in_sensor: bool,
    pub time_remaining: u32,
}

impl SignalSnapshot {
    /// Derives the observable signals from the controller fields.
    pub fn derive(state: CrossingState, occupancy: bool, countdown: u32) -> Self {
        use CrossingState::*;

        let car_light = match state {
            Transition => CarLight::Yellow,
            Crossing | Ending => CarLight::Red,
            Default | Request | Validation => CarLight::Green,
        };
        let pedestrian_light = match state {
            Crossing => PedestrianLight::Green,
            Ending => PedestrianLight::Blinking,
            Default | Request | Validation | Transition => PedestrianLight::Red,
        };
        let signalling = matches!(state, Crossing | Ending);

        SignalSnapshot {
            state,
            car_light,
            pedestrian_light,
            sensor_active: matches!(state, Request | Validation),
            sound_waves: signalling,
            sound_waves_fast: state == Ending,
            vibration: signalling,
            pedestrian_in_sensor: occupancy,
            time_remaining: countdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn car_and_pedestrian_are_never_both_green() {
        for state in CrossingState::ALL {
            for occupancy in [false, true] {
                let snapshot = SignalSnapshot::derive(state, occupancy, 0);
                assert!(
                    !(snapshot.car_light == CarLight::Green
                        && snapshot.pedestrian_light == PedestrianLight::Green),
                    "both green in {state}"
                );
                // A moving car and a walking pedestrian must never overlap either.
                if snapshot.pedestrian_light.allows_walking() {
                    assert_eq!(snapshot.car_light, CarLight::Red);
                }
            }
        }
    }

    #[test]
    fn derivation_table() {
        let expected = [
            (CrossingState::Default, CarLight::Green, PedestrianLight::Red, false, false, false),
            (CrossingState::Request, CarLight::Green, PedestrianLight::Red, true, false, false),
            (CrossingState::Validation, CarLight::Green, PedestrianLight::Red, true, false, false),
            (CrossingState::Transition, CarLight::Yellow, PedestrianLight::Red, false, false, false),
            (CrossingState::Crossing, CarLight::Red, PedestrianLight::Green, false, true, false),
            (CrossingState::Ending, CarLight::Red, PedestrianLight::Blinking, false, true, true),
        ];
        for (state, car, pedestrian, sensor, waves, fast) in expected {
            let snapshot = SignalSnapshot::derive(state, false, 0);
            assert_eq!(snapshot.car_light, car, "car light in {state}");
            assert_eq!(snapshot.pedestrian_light, pedestrian, "pedestrian light in {state}");
            assert_eq!(snapshot.sensor_active, sensor, "sensor in {state}");
            assert_eq!(snapshot.sound_waves, waves, "sound waves in {state}");
            assert_eq!(snapshot.vibration, waves, "vibration in {state}");
            assert_eq!(snapshot.sound_waves_fast, fast, "fast waves in {state}");
        }
    }

    #[test]
    fn occupancy_and_countdown_pass_through() {
        let snapshot = SignalSnapshot::derive(CrossingState::Crossing, true, 4);
        assert!(snapshot.pedestrian_in_sensor);
        assert_eq!(snapshot.time_remaining, 4);
    }

    #[test]
    fn only_default_accepts_a_request() {
        for state in CrossingState::ALL {
            assert_eq!(state.accepts_request(), state == CrossingState::Default);
        }
    }

    #[test]
    fn snapshot_serializes_with_camel_case_fields() {
        let snapshot = SignalSnapshot::derive(CrossingState::Ending, false, 3);
        let json = serde_json::to_value(snapshot).unwrap();
        assert_eq!(json["state"], "ending");
        assert_eq!(json["carLight"], "red");
        assert_eq!(json["pedestrianLight"], "blinking");
        assert_eq!(json["soundWavesFast"], true);
        assert_eq!(json["timeRemaining"], 3);
    }
}
