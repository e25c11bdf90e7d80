// crossing_simulation_main.rs
use pedestrian_crossing::config::CrossingTimings;
use pedestrian_crossing::control_system::CrossingController;
use pedestrian_crossing::global_variables::{TIMELINE_PNG, TRANSITIONS_CSV};
use pedestrian_crossing::monitoring::{read_transitions, record_transitions, render_timeline, summarize};
use pedestrian_crossing::simulation_engine::{run_simulation, SimulationConfig};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    env_logger::init();

    // Optional first argument: JSON file with crossing timings.
    let timings = match std::env::args().nth(1) {
        Some(path) => match CrossingTimings::from_json_file(&path) {
            Ok(timings) => timings,
            Err(e) => {
                eprintln!("Error loading timings from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => CrossingTimings::default(),
    };

    let controller = match CrossingController::with_timings(timings) {
        Ok(controller) => Arc::new(controller),
        Err(e) => {
            eprintln!("Invalid timings: {}", e);
            std::process::exit(1);
        }
    };

    // Each run starts a fresh log so the report covers this run only.
    let log_path = PathBuf::from(TRANSITIONS_CSV);
    if log_path.exists() {
        if let Err(e) = std::fs::remove_file(&log_path) {
            eprintln!("Error clearing old transition log: {}", e);
        }
    }
    let recorder = tokio::spawn(record_transitions(
        controller.subscribe_transitions(),
        log_path.clone(),
    ));

    println!("Starting crossing simulation...");
    let stats = run_simulation(Arc::clone(&controller), SimulationConfig::default()).await;
    controller.reset();
    drop(controller);

    match recorder.await {
        Ok(written) => println!("Recorded {} transitions to {}", written, log_path.display()),
        Err(e) => eprintln!("Transition recorder failed: {}", e),
    }

    println!("Simulation stats: {:?}", stats);
    match read_transitions(&log_path) {
        Ok(records) => {
            let summary = summarize(&records);
            println!("Report Summary:");
            println!("Requests: {}", summary.requests);
            println!("Aborted at validation: {}", summary.aborted);
            println!("Completed crossings: {}", summary.completed);
            println!("Resets: {}", summary.resets);
            if let Err(e) = render_timeline(&records, &PathBuf::from(TIMELINE_PNG)) {
                eprintln!("Error rendering timeline: {}", e);
            }
        }
        Err(e) => eprintln!("Error reading transition log: {}", e),
    }
}
