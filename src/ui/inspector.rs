use super::progress::create_status_spinner;
use crate::session::{BeatSnapshot, SchedulerPhase, SharedSession};
use std::thread;
use std::time::Duration;

const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Redraws the status line until the session stops.
pub fn run_status_display(session: SharedSession) {
    let spinner = create_status_spinner();

    while session.is_running() {
        spinner.set_message(format_status(&session.snapshot()));
        spinner.tick();
        thread::sleep(REFRESH_INTERVAL);
    }

    spinner.finish_and_clear();
}

pub fn format_status(snapshot: &BeatSnapshot) -> String {
    let tempo = match snapshot.period.bpm() {
        Some(bpm) => format!(
            "{:.2} BPM ({} ms)",
            bpm,
            snapshot.period.as_millis()
        ),
        None => "-- BPM".to_string(),
    };
    let phase = match snapshot.phase {
        SchedulerPhase::Idle => "idle",
        SchedulerPhase::Armed => "armed",
    };

    let mut status = format!(
        "{}, Taps: {}, Beats: {}, Scheduler: {}",
        tempo, snapshot.taps, snapshot.beats_fired, phase
    );
    if snapshot.beats_dropped > 0 {
        status.push_str(&format!(", Dropped: {}", snapshot.beats_dropped));
    }
    status
}
