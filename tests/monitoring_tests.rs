//! Integration tests for the transition log and the headless simulation.

use pedestrian_crossing::monitoring::{
    log_to_csv, read_transitions, record_transitions, render_timeline, summarize, CycleSummary,
    TransitionRecord,
};
use pedestrian_crossing::simulation_engine::{run_simulation, SimulationConfig};
use pedestrian_crossing::{CarLight, CrossingController, CrossingState, PedestrianLight};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

fn temp_csv(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{}_{}.csv", name, std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

#[test]
fn csv_header_is_written_once() {
    let path = temp_csv("crossing_header");
    let record = TransitionRecord {
        timestamp_ms: 1,
        from: CrossingState::Transition,
        to: CrossingState::Crossing,
        car_light: CarLight::Red,
        pedestrian_light: PedestrianLight::Green,
        time_remaining: 5,
    };
    log_to_csv(&path, &record).unwrap();
    log_to_csv(&path, &record).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.matches("timestamp_ms").count(), 1);
    let records = read_transitions(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(records, vec![record.clone(), record]);
}

#[test]
fn reading_a_missing_log_is_an_error() {
    let path = temp_csv("crossing_missing");
    assert!(read_transitions(&path).is_err());
}

#[test]
fn empty_timeline_is_skipped() {
    let path = std::env::temp_dir().join("crossing_empty_timeline.png");
    assert!(render_timeline(&[], &path).is_ok());
    assert!(!path.exists());
}

#[tokio::test(start_paused = true)]
async fn recorder_logs_a_complete_cycle() {
    let path = temp_csv("crossing_cycle");
    let controller = CrossingController::new();
    let recorder = tokio::spawn(record_transitions(
        controller.subscribe_transitions(),
        path.clone(),
    ));

    assert!(controller.request_crossing());
    controller.set_occupancy(true);
    sleep(Duration::from_secs(14)).await;
    assert_eq!(controller.state(), CrossingState::Default);
    drop(controller);

    let written = recorder.await.unwrap();
    assert_eq!(written, 6);

    let records = read_transitions(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[3].to, CrossingState::Crossing);
    assert_eq!(records[3].pedestrian_light, PedestrianLight::Green);
    assert_eq!(records[3].time_remaining, 5);
    assert_eq!(
        summarize(&records),
        CycleSummary {
            requests: 1,
            aborted: 0,
            completed: 1,
            resets: 0
        }
    );
}

#[tokio::test(start_paused = true)]
async fn recorder_counts_aborts_and_resets() {
    let path = temp_csv("crossing_aborts");
    let controller = CrossingController::new();
    let recorder = tokio::spawn(record_transitions(
        controller.subscribe_transitions(),
        path.clone(),
    ));

    // Nobody waiting: aborted in validation.
    assert!(controller.request_crossing());
    sleep(Duration::from_secs(3)).await;
    // Reset by an operator mid-request.
    assert!(controller.request_crossing());
    controller.reset();
    drop(controller);

    recorder.await.unwrap();
    let records = read_transitions(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(
        summarize(&records),
        CycleSummary {
            requests: 2,
            aborted: 1,
            completed: 0,
            resets: 1
        }
    );
}

#[tokio::test(start_paused = true)]
async fn simulated_pedestrian_gets_across() {
    let controller = Arc::new(CrossingController::new());
    let config = SimulationConfig {
        duration: Duration::from_secs(120),
        press_probability: 0.2,
        drag_probability: 0.0,
        ..SimulationConfig::default()
    };
    let stats = run_simulation(Arc::clone(&controller), config).await;

    assert_eq!(stats.frames, 1200);
    assert!(stats.accepted_requests >= 1);
    assert!(stats.crossings_started >= 1);
    assert!(stats.button_presses >= stats.accepted_requests);
    // Walking over and coming back both cross the sensor boundary.
    assert!(stats.occupancy_changes >= 2);

    controller.reset();
    assert!(controller.pending_timers().is_empty());
}
