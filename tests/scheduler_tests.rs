use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tapsyncrs::interrupt_handler;
use tapsyncrs::midi::{run_midi_input, MockMidiEngine};
use tapsyncrs::playback::{Playback, PlaybackError};
use tapsyncrs::session::SchedulerPhase;
use tapsyncrs::{create_session, BeatScheduler, SharedSession, TapClock, TapEvent};

/// Records when each beat was triggered.
#[derive(Clone, Default)]
struct RecordingPlayback {
    fired: Arc<Mutex<Vec<Instant>>>,
    hold: Duration,
    fail: bool,
}

impl RecordingPlayback {
    fn count(&self) -> usize {
        self.fired.lock().unwrap().len()
    }

    fn times(&self) -> Vec<Instant> {
        self.fired.lock().unwrap().clone()
    }
}

impl Playback for RecordingPlayback {
    fn trigger(&mut self) -> Result<(), PlaybackError> {
        self.fired.lock().unwrap().push(Instant::now());
        if !self.hold.is_zero() {
            thread::sleep(self.hold);
        }
        if self.fail {
            Err(PlaybackError::Device("simulated failure".to_string()))
        } else {
            Ok(())
        }
    }
}

fn start_scheduler(
    session: &SharedSession,
    playback: RecordingPlayback,
) -> thread::JoinHandle<RecordingPlayback> {
    let session = session.clone();
    thread::spawn(move || BeatScheduler::new(session, playback).run())
}

/// Feeds 16 taps `period_ms` apart (synthetic timestamps) so the period is set.
fn establish_period(session: &SharedSession, period_ms: u64) -> TapClock {
    let base = Instant::now();
    let mut clock = TapClock::default();
    for i in 0..16 {
        session.on_tap(
            &mut clock,
            TapEvent::new(base + Duration::from_millis(i * period_ms)),
        );
    }
    clock
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_without_taps() {
        let _ = env_logger::builder().is_test(true).try_init();
        let session = create_session();
        let playback = RecordingPlayback::default();
        let handle = start_scheduler(&session, playback.clone());

        thread::sleep(Duration::from_millis(150));
        session.shutdown();
        handle.join().unwrap();

        assert_eq!(playback.count(), 0);
        assert_eq!(session.snapshot().phase, SchedulerPhase::Idle);
    }

    #[test]
    fn test_single_tap_plays_once_without_tempo() {
        let session = create_session();
        let playback = RecordingPlayback::default();
        let handle = start_scheduler(&session, playback.clone());

        let mut clock = TapClock::default();
        session.on_tap(&mut clock, TapEvent::now());
        thread::sleep(Duration::from_millis(200));
        session.shutdown();
        handle.join().unwrap();

        // No tempo yet: the tap plays the sample, then the scheduler idles.
        assert_eq!(playback.count(), 1);
        assert_eq!(session.snapshot().phase, SchedulerPhase::Idle);
    }

    #[test]
    fn test_beats_repeat_at_detected_period() {
        let session = create_session();
        let playback = RecordingPlayback::default();
        let handle = start_scheduler(&session, playback.clone());

        establish_period(&session, 40);
        assert_eq!(session.period().as_millis(), 40);

        // Beats fired while the taps were still arriving are not on the grid.
        thread::sleep(Duration::from_millis(20));
        let start = playback.count();

        thread::sleep(Duration::from_millis(400));
        session.shutdown();
        handle.join().unwrap();

        let times = playback.times();
        assert!(
            times.len() >= start + 5,
            "expected repeated beats, got {}",
            times.len() - start
        );

        for pair in times[start..].windows(2) {
            let gap = pair[1].duration_since(pair[0]);
            assert!(
                gap >= Duration::from_millis(30),
                "beat fired early: {:?}",
                gap
            );
        }
    }

    #[test]
    fn test_tap_rearms_far_future_deadline() {
        let session = create_session();
        let playback = RecordingPlayback::default();
        let handle = start_scheduler(&session, playback.clone());

        // Two-second period: after the first beat the next one is far away.
        let mut clock = establish_period(&session, 2000);
        thread::sleep(Duration::from_millis(100));
        let before = playback.count();
        assert!(before >= 1);

        let tapped_at = Instant::now();
        session.on_tap(&mut clock, TapEvent::now());
        thread::sleep(Duration::from_millis(100));
        session.shutdown();
        handle.join().unwrap();

        let times = playback.times();
        assert_eq!(times.len(), before + 1);
        assert!(times[before].duration_since(tapped_at) < Duration::from_millis(100));
    }

    #[test]
    fn test_failed_playback_keeps_schedule() {
        let session = create_session();
        let playback = RecordingPlayback {
            fail: true,
            ..RecordingPlayback::default()
        };
        let handle = start_scheduler(&session, playback.clone());

        establish_period(&session, 40);
        thread::sleep(Duration::from_millis(300));
        session.shutdown();
        handle.join().unwrap();

        assert!(playback.count() >= 3);
        assert_eq!(session.period().as_millis(), 40);
    }

    #[test]
    fn test_long_playback_drops_beats() {
        let session = create_session();
        let playback = RecordingPlayback {
            hold: Duration::from_millis(110),
            ..RecordingPlayback::default()
        };
        let handle = start_scheduler(&session, playback.clone());

        establish_period(&session, 40);
        thread::sleep(Duration::from_millis(500));
        session.shutdown();
        handle.join().unwrap();

        // At most one playback runs at a time, so far fewer beats than 500/40.
        assert!(playback.count() <= 7, "got {} beats", playback.count());
        assert!(session.snapshot().beats_dropped > 0);
    }

    #[test]
    fn test_shutdown_wakes_idle_scheduler() {
        let session = create_session();
        let handle = start_scheduler(&session, RecordingPlayback::default());

        thread::sleep(Duration::from_millis(20));
        let stop_requested = Instant::now();
        session.shutdown();
        handle.join().unwrap();

        assert!(stop_requested.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_interrupt_stops_scheduler_and_input() {
        let session = create_session();
        let playback = RecordingPlayback::default();
        let scheduler = start_scheduler(&session, playback.clone());
        let input_session = session.clone();
        let input = thread::spawn(move || {
            run_midi_input(MockMidiEngine::default(), input_session, TapClock::default());
        });

        establish_period(&session, 40);
        thread::sleep(Duration::from_millis(50));

        let mut on_interrupt = interrupt_handler(session.clone());
        on_interrupt();
        scheduler.join().unwrap();
        input.join().unwrap();

        assert!(!session.is_running());
        let fired = playback.count();
        thread::sleep(Duration::from_millis(100));
        assert_eq!(playback.count(), fired);
    }
}
