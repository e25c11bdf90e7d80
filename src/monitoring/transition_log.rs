use crate::control_system::StateTransition;
use crate::models::signals::{CarLight, CrossingState, PedestrianLight};
use crate::shared_data::current_timestamp_millis;
use log::{info, warn};
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;

/// One row of the transition log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub timestamp_ms: u64,
    pub from: CrossingState,
    pub to: CrossingState,
    pub car_light: CarLight,
    pub pedestrian_light: PedestrianLight,
    pub time_remaining: u32,
}

impl TransitionRecord {
    pub fn from_transition(transition: &StateTransition, timestamp_ms: u64) -> Self {
        TransitionRecord {
            timestamp_ms,
            from: transition.from,
            to: transition.to,
            car_light: transition.snapshot.car_light,
            pedestrian_light: transition.snapshot.pedestrian_light,
            time_remaining: transition.snapshot.time_remaining,
        }
    }
}

/// Counts of how crossing cycles ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub requests: usize,
    pub aborted: usize,
    pub completed: usize,
    pub resets: usize,
}

/// Generic helper to log a record to a CSV file.
pub fn log_to_csv<T: Serialize>(path: &Path, record: &T) -> Result<(), Box<dyn Error>> {
    let file_exists = path.exists();
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    wtr.serialize(record)?;
    wtr.flush()?;
    Ok(())
}

/// Appends every transition to `path` until the controller goes away.
pub async fn record_transitions(
    mut receiver: broadcast::Receiver<StateTransition>,
    path: PathBuf,
) -> usize {
    let mut written = 0;
    loop {
        match receiver.recv().await {
            Ok(transition) => {
                let record = TransitionRecord::from_transition(&transition, current_timestamp_millis());
                match log_to_csv(&path, &record) {
                    Ok(()) => written += 1,
                    Err(e) => warn!("Error logging transition to {}: {}", path.display(), e),
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Transition recorder fell behind, {} transitions not logged", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    info!("Transition recorder stopped after {} records", written);
    written
}

pub fn read_transitions(path: &Path) -> Result<Vec<TransitionRecord>, Box<dyn Error>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: TransitionRecord = result?;
        records.push(record);
    }
    Ok(records)
}

pub fn summarize(records: &[TransitionRecord]) -> CycleSummary {
    let mut summary = CycleSummary::default();
    for record in records {
        match (record.from, record.to) {
            (CrossingState::Default, CrossingState::Request) => summary.requests += 1,
            (CrossingState::Validation, CrossingState::Default) => summary.aborted += 1,
            (CrossingState::Ending, CrossingState::Default) => summary.completed += 1,
            (_, CrossingState::Default) => summary.resets += 1,
            _ => {}
        }
    }
    summary
}

/// Draws the state sequence as a step line over time (seconds since the
/// first record).
pub fn render_timeline(records: &[TransitionRecord], path: &Path) -> Result<(), Box<dyn Error>> {
    let Some(first) = records.first() else {
        println!("No transitions recorded, skipping timeline.");
        return Ok(());
    };
    let start = first.timestamp_ms;
    let seconds = |ts: u64| ts.saturating_sub(start) as f64 / 1000.0;

    let mut points = vec![(0.0, first.from.index())];
    for record in records {
        let t = seconds(record.timestamp_ms);
        points.push((t, record.from.index()));
        points.push((t, record.to.index()));
    }
    let end = points.last().map(|(t, _)| *t).unwrap_or(0.0).max(1.0);

    let root = BitMapBackend::new(path, (1000, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Crossing state timeline", ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(0.0..end, -1..6)?;

    chart
        .configure_mesh()
        .x_desc("seconds")
        .y_labels(8)
        .y_label_formatter(&|y| {
            CrossingState::ALL
                .iter()
                .find(|state| state.index() == *y)
                .map(|state| state.to_string())
                .unwrap_or_default()
        })
        .draw()?;

    chart.draw_series(LineSeries::new(points, &BLUE))?;

    root.present()?;
    println!("Crossing timeline saved to {}", path.display());
    Ok(())
}
