use crate::tap_clock::{BeatPeriod, TapClock};
use crate::tap_window::TapEvent;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

pub type SharedSession = Arc<Session>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    Idle,
    Wait(Duration),
    Fire(Firing),
}

/// A beat that came due, remembered so the reschedule can be checked against
/// taps that arrived while it was playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    pub deadline: Instant,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Disarmed,
    /// Next beat armed one (or more, if beats were dropped) period later.
    Rescheduled { next: Instant, dropped: u64 },
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    Idle,
    Armed,
}

#[derive(Debug, Default)]
pub struct BeatState {
    period: BeatPeriod,
    deadline: Option<Instant>,
    generation: u64,
    taps: u64,
    beats_fired: u64,
    beats_dropped: u64,
}

impl BeatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn period(&self) -> BeatPeriod {
        self.period
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn set_period(&mut self, period: BeatPeriod) -> bool {
        let changed = self.period != period;
        self.period = period;
        changed
    }

    pub fn arm(&mut self, at: Instant) {
        self.deadline = Some(at);
        self.generation += 1;
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn poll(&self, now: Instant) -> Poll {
        match self.deadline {
            None => Poll::Idle,
            Some(deadline) if now >= deadline => Poll::Fire(Firing {
                deadline,
                generation: self.generation,
            }),
            Some(deadline) => Poll::Wait(deadline - now),
        }
    }

    /// Reschedules after `firing` was played, as observed at `now`.
    ///
    /// The next deadline counts from the fired deadline, not from `now`, so
    /// the grid does not drift by the playback latency.
    pub fn complete(&mut self, firing: Firing, now: Instant) -> Completion {
        self.beats_fired += 1;

        if self.generation != firing.generation {
            return Completion::Superseded;
        }

        if !self.period.is_set() {
            self.disarm();
            return Completion::Disarmed;
        }

        let period = self.period.as_duration();
        let mut next = firing.deadline + period;
        let mut dropped = 0;

        if next < now {
            let behind = (now - next).as_nanos() / period.as_nanos();
            let skip = u32::try_from(behind + 1).unwrap_or(u32::MAX);
            next += period * skip;
            dropped = u64::from(skip);
            self.beats_dropped += dropped;
        }

        self.deadline = Some(next);
        Completion::Rescheduled { next, dropped }
    }

    pub fn phase(&self) -> SchedulerPhase {
        if self.deadline.is_some() {
            SchedulerPhase::Armed
        } else {
            SchedulerPhase::Idle
        }
    }

    pub fn snapshot(&self) -> BeatSnapshot {
        BeatSnapshot {
            period: self.period,
            phase: self.phase(),
            taps: self.taps,
            beats_fired: self.beats_fired,
            beats_dropped: self.beats_dropped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatSnapshot {
    pub period: BeatPeriod,
    pub phase: SchedulerPhase,
    pub taps: u64,
    pub beats_fired: u64,
    pub beats_dropped: u64,
}

#[derive(Debug)]
pub struct Session {
    beat: Mutex<BeatState>,
    wake: Condvar,
    running: AtomicBool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            beat: Mutex::new(BeatState::new()),
            wake: Condvar::new(),
            running: AtomicBool::new(true),
        }
    }

    pub fn shared() -> SharedSession {
        Arc::new(Self::new())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn shutdown(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("Session shutting down");
        }
        // Taking the lock orders the flag store before a waiting scheduler re-checks it.
        drop(self.lock_state());
        self.wake.notify_all();
    }

    /// Handles one Note-On: records it, refreshes the period and re-arms the
    /// scheduler so the next beat plays immediately.
    pub fn on_tap(&self, clock: &mut TapClock, tap: TapEvent) -> BeatPeriod {
        clock.record_tap(tap);
        let period = clock.estimate_period();

        {
            let mut state = self.lock_state();
            state.taps += 1;
            if state.set_period(period) {
                match period.bpm() {
                    Some(bpm) => info!(
                        "Beat period changed to {} ms ({:.2} BPM)",
                        period.as_millis(),
                        bpm
                    ),
                    None => info!("Tempo unreliable, beat period cleared"),
                }
            }
            state.arm(Instant::now());
        }
        self.wake.notify_all();

        debug!("Tap {} handled, period {}", clock.taps_recorded(), period);
        period
    }

    pub fn period(&self) -> BeatPeriod {
        self.lock_state().period()
    }

    pub fn snapshot(&self) -> BeatSnapshot {
        self.lock_state().snapshot()
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, BeatState> {
        self.beat.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn wait<'a>(
        &self,
        guard: MutexGuard<'a, BeatState>,
        timeout: Duration,
    ) -> MutexGuard<'a, BeatState> {
        match self.wake.wait_timeout(guard, timeout) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }
}
