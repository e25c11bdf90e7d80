// crossing_console_main.rs
use pedestrian_crossing::config::CrossingTimings;
use pedestrian_crossing::control_system::CrossingController;
use pedestrian_crossing::models::signals::SignalSnapshot;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

fn print_snapshot(snapshot: &SignalSnapshot) {
    println!(
        "[{}] {}",
        snapshot.state.label(),
        snapshot.state.description()
    );
    match serde_json::to_string_pretty(snapshot) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing snapshot: {}", e),
    }
}

fn print_menu() {
    println!("\nPedestrian Crossing Admin CLI");
    println!("1. Press crossing button");
    println!("2. Pedestrian enters sensor zone");
    println!("3. Pedestrian leaves sensor zone");
    println!("4. Show current signals");
    println!("5. Show pending timers");
    println!("6. Reset controller");
    println!("7. Exit");
    print!("Enter your choice: ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() {
    env_logger::init();

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
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("Invalid timings: {}", e);
            std::process::exit(1);
        }
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_menu();
        let input = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        };
        let choice = input.trim().parse::<u32>().unwrap_or(0);
        match choice {
            1 => {
                if controller.request_crossing() {
                    println!("Crossing requested.");
                } else {
                    println!("Button has no effect while in {}.", controller.state());
                }
            }
            2 => {
                controller.set_occupancy(true);
                println!("Sensor zone occupied.");
            }
            3 => {
                controller.set_occupancy(false);
                println!("Sensor zone empty.");
            }
            4 => print_snapshot(&controller.snapshot()),
            5 => {
                let pending = controller.pending_timers();
                println!(
                    "Pending timers: validation={} advance={} tick={}",
                    pending.validation, pending.advance, pending.tick
                );
            }
            6 => {
                controller.reset();
                println!("Controller reset to {}.", controller.state());
            }
            7 => {
                println!("Exiting CLI.");
                break;
            }
            _ => println!("Invalid choice. Try again."),
        }
    }
    controller.reset();
}
