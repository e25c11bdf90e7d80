// control_system/timers.rs
use tokio::task::JoinHandle;

/// The three kinds of timer a crossing cycle can arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerClass {
    /// One-shot confirm/abort while validating presence.
    Validation,
    /// One-shot delay that moves the cycle forward (request, transition).
    Advance,
    /// Periodic countdown tick in crossing and ending.
    Tick,
}

impl TimerClass {
    pub const ALL: [TimerClass; 3] = [TimerClass::Validation, TimerClass::Advance, TimerClass::Tick];

    fn slot(self) -> usize {
        match self {
            TimerClass::Validation => 0,
            TimerClass::Advance => 1,
            TimerClass::Tick => 2,
        }
    }
}

/// Which timer classes currently have a live task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingTimers {
    pub validation: bool,
    pub advance: bool,
    pub tick: bool,
}

impl PendingTimers {
    pub fn count(&self) -> usize {
        [self.validation, self.advance, self.tick]
            .iter()
            .filter(|armed| **armed)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

#[derive(Debug, Default)]
struct TimerSlot {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

/// One handle slot per timer class.
///
/// A callback only acts if the generation it was armed with is still the
/// slot's current one; any `begin` or `cancel` moves the generation on, so a
/// task that already woke up before being aborted still sees itself as stale.
#[derive(Debug, Default)]
pub struct TimerBank {
    slots: [TimerSlot; 3],
}

impl TimerBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels whatever the class had armed and reserves a fresh generation
    /// for the task about to be spawned.
    pub fn begin(&mut self, class: TimerClass) -> u64 {
        self.cancel(class);
        self.slots[class.slot()].generation
    }

    /// Stores the task spawned for `generation`. A handle for an outdated
    /// generation is aborted instead of stored.
    pub fn install(&mut self, class: TimerClass, generation: u64, handle: JoinHandle<()>) {
        let slot = &mut self.slots[class.slot()];
        if slot.generation != generation {
            handle.abort();
            return;
        }
        if let Some(old) = slot.handle.replace(handle) {
            old.abort();
        }
    }

    pub fn is_current(&self, class: TimerClass, generation: u64) -> bool {
        self.slots[class.slot()].generation == generation
    }

    pub fn cancel(&mut self, class: TimerClass) {
        let slot = &mut self.slots[class.slot()];
        slot.generation = slot.generation.wrapping_add(1);
        if let Some(handle) = slot.handle.take() {
            handle.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        for class in TimerClass::ALL {
            self.cancel(class);
        }
    }

    pub fn is_pending(&self, class: TimerClass) -> bool {
        self.slots[class.slot()]
            .handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn pending(&self) -> PendingTimers {
        PendingTimers {
            validation: self.is_pending(TimerClass::Validation),
            advance: self.is_pending(TimerClass::Advance),
            tick: self.is_pending(TimerClass::Tick),
        }
    }
}

impl Drop for TimerBank {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
