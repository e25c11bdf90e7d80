pub mod transition_log;

pub use transition_log::{
    log_to_csv, read_transitions, record_transitions, render_timeline, summarize, CycleSummary,
    TransitionRecord,
};
