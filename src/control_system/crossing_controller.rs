// control_system/crossing_controller.rs
use crate::config::{CrossingTimings, TimingsError};
use crate::control_system::timers::{PendingTimers, TimerBank, TimerClass};
use crate::models::signals::{CrossingState, SignalSnapshot};
use log::{debug, info, trace};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};

const TRANSITION_CHANNEL_CAPACITY: usize = 64;

/// A state change, published once per transition to every subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: CrossingState,
    pub to: CrossingState,
    pub snapshot: SignalSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    EnterValidation,
    ConfirmPresence,
    AbortRequest,
    BeginCrossing,
    CountdownTick,
}

#[derive(Debug, Clone, Copy)]
enum Schedule {
    Once(Duration),
    Every(Duration),
}

struct CrossingCore {
    state: CrossingState,
    occupancy: bool,
    countdown: u32,
    // Whether occupancy has been true at any point since entering validation.
    presence_seen: bool,
    timings: CrossingTimings,
    timers: TimerBank,
    snapshots: watch::Sender<SignalSnapshot>,
    transitions: broadcast::Sender<StateTransition>,
    this: Weak<Mutex<CrossingCore>>,
}

impl CrossingCore {
    fn snapshot(&self) -> SignalSnapshot {
        SignalSnapshot::derive(self.state, self.occupancy, self.countdown)
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }

    /// Runs the entry actions of `next`. Every timer armed by the previous
    /// state is cancelled first.
    fn enter(&mut self, next: CrossingState) {
        let previous = self.state;
        self.timers.cancel_all();
        self.state = next;

        match next {
            CrossingState::Default => {
                self.countdown = 0;
            }
            CrossingState::Request => {
                self.countdown = 0;
                let delay = self.timings.request_delay();
                self.arm(TimerClass::Advance, Schedule::Once(delay), TimerEvent::EnterValidation);
            }
            CrossingState::Validation => {
                self.countdown = 0;
                self.presence_seen = self.occupancy;
                self.arm_validation();
            }
            CrossingState::Transition => {
                self.countdown = 0;
                let delay = self.timings.transition();
                self.arm(TimerClass::Advance, Schedule::Once(delay), TimerEvent::BeginCrossing);
            }
            CrossingState::Crossing => {
                self.countdown = self.timings.crossing_seconds;
                let period = self.timings.tick_period();
                self.arm(TimerClass::Tick, Schedule::Every(period), TimerEvent::CountdownTick);
            }
            CrossingState::Ending => {
                self.countdown = self.timings.ending_seconds;
                let period = self.timings.tick_period();
                self.arm(TimerClass::Tick, Schedule::Every(period), TimerEvent::CountdownTick);
            }
        }

        self.publish();
        if previous != next {
            info!(
                "Crossing {} -> {} ({})",
                previous,
                next,
                next.label()
            );
            // No subscribers is not an error.
            let _ = self.transitions.send(StateTransition {
                from: previous,
                to: next,
                snapshot: self.snapshot(),
            });
        }
    }

    /// Arms the confirm or abort timer for the current occupancy reading,
    /// replacing whichever one was pending.
    fn arm_validation(&mut self) {
        let (delay, event) = if self.occupancy {
            (self.timings.confirm_presence(), TimerEvent::ConfirmPresence)
        } else if self.presence_seen {
            (self.timings.abort_after_leaving(), TimerEvent::AbortRequest)
        } else {
            (self.timings.abort_when_absent(), TimerEvent::AbortRequest)
        };
        debug!(
            "Validation: occupancy={} -> {:?} in {}ms",
            self.occupancy,
            event,
            delay.as_millis()
        );
        self.arm(TimerClass::Validation, Schedule::Once(delay), event);
    }

    fn arm(&mut self, class: TimerClass, schedule: Schedule, event: TimerEvent) {
        let generation = self.timers.begin(class);
        let core = self.this.clone();
        trace!("Arming {:?} timer #{} as {:?} for {:?}", class, generation, schedule, event);

        let handle = match schedule {
            Schedule::Once(delay) => {
                let deadline = Instant::now() + delay;
                tokio::spawn(async move {
                    sleep_until(deadline).await;
                    fire(&core, class, generation, event);
                })
            }
            Schedule::Every(period) => {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                tokio::spawn(async move {
                    loop {
                        ticker.tick().await;
                        if !fire(&core, class, generation, event) {
                            break;
                        }
                    }
                })
            }
        };
        self.timers.install(class, generation, handle);
    }

    fn on_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::EnterValidation => self.enter(CrossingState::Validation),
            TimerEvent::ConfirmPresence => self.enter(CrossingState::Transition),
            TimerEvent::AbortRequest => self.enter(CrossingState::Default),
            TimerEvent::BeginCrossing => self.enter(CrossingState::Crossing),
            TimerEvent::CountdownTick => self.count_down(),
        }
    }

    fn count_down(&mut self) {
        if self.countdown <= 1 {
            let next = match self.state {
                CrossingState::Crossing => CrossingState::Ending,
                // Ticks only run in crossing and ending.
                _ => CrossingState::Default,
            };
            self.enter(next);
        } else {
            self.countdown -= 1;
            trace!("Countdown in {}: {}s", self.state, self.countdown);
            self.publish();
        }
    }

    fn set_occupancy(&mut self, present: bool) {
        if self.occupancy == present {
            return;
        }
        self.occupancy = present;
        if present {
            self.presence_seen = true;
        }
        if self.state == CrossingState::Validation {
            self.arm_validation();
        }
        self.publish();
    }
}

fn lock(core: &Mutex<CrossingCore>) -> MutexGuard<'_, CrossingCore> {
    core.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Timer callback body. Returns whether the timer is still the live one for
/// its class, which is what keeps a periodic timer running.
fn fire(core: &Weak<Mutex<CrossingCore>>, class: TimerClass, generation: u64, event: TimerEvent) -> bool {
    let Some(shared) = core.upgrade() else {
        return false;
    };
    let mut core = lock(&shared);
    if !core.timers.is_current(class, generation) {
        debug!("Dropping stale {:?} timer #{} ({:?})", class, generation, event);
        return false;
    }
    core.on_timer(event);
    core.timers.is_current(class, generation)
}

/// Timed state machine for a push-button pedestrian crossing.
///
/// Every operation and every timer callback mutates the state under the same
/// lock. Operations that arm timers spawn Tokio tasks, so they must be called
/// from within a Tokio runtime.
pub struct CrossingController {
    core: Arc<Mutex<CrossingCore>>,
}

impl CrossingController {
    /// Creates a controller in `default` with the standard timings.
    pub fn new() -> Self {
        Self::build(CrossingTimings::default())
    }

    pub fn with_timings(timings: CrossingTimings) -> Result<Self, TimingsError> {
        timings.validate()?;
        Ok(Self::build(timings))
    }

    fn build(timings: CrossingTimings) -> Self {
        let initial = SignalSnapshot::derive(CrossingState::Default, false, 0);
        let (snapshots, _) = watch::channel(initial);
        let (transitions, _) = broadcast::channel(TRANSITION_CHANNEL_CAPACITY);
        let core = Arc::new_cyclic(|this| {
            Mutex::new(CrossingCore {
                state: CrossingState::Default,
                occupancy: false,
                countdown: 0,
                presence_seen: false,
                timings,
                timers: TimerBank::new(),
                snapshots,
                transitions,
                this: this.clone(),
            })
        });
        CrossingController { core }
    }

    /// Presses the crossing button. Only starts a cycle from `default`;
    /// anywhere else the press is ignored. Returns whether it was accepted.
    pub fn request_crossing(&self) -> bool {
        let mut core = lock(&self.core);
        if !core.state.accepts_request() {
            debug!("Ignoring crossing request while in {}", core.state);
            return false;
        }
        core.enter(CrossingState::Request);
        true
    }

    /// Reports whether someone is standing in the sensor zone.
    pub fn set_occupancy(&self, present: bool) {
        lock(&self.core).set_occupancy(present);
    }

    /// Returns to `default` immediately, cancelling every pending timer.
    pub fn reset(&self) {
        lock(&self.core).enter(CrossingState::Default);
    }

    pub fn snapshot(&self) -> SignalSnapshot {
        lock(&self.core).snapshot()
    }

    pub fn state(&self) -> CrossingState {
        lock(&self.core).state
    }

    pub fn timings(&self) -> CrossingTimings {
        lock(&self.core).timings
    }

    pub fn pending_timers(&self) -> PendingTimers {
        lock(&self.core).timers.pending()
    }

    /// Latest snapshot, updated after every change.
    pub fn subscribe(&self) -> watch::Receiver<SignalSnapshot> {
        lock(&self.core).snapshots.subscribe()
    }

    /// Every state change, in order.
    pub fn subscribe_transitions(&self) -> broadcast::Receiver<StateTransition> {
        lock(&self.core).transitions.subscribe()
    }
}

impl Default for CrossingController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CrossingController {
    fn drop(&mut self) {
        lock(&self.core).timers.cancel_all();
    }
}
