use crate::playback::Playback;
use crate::session::{Completion, Firing, Poll, SharedSession};
use log::{debug, error, info, trace, warn};
use std::time::{Duration, Instant};

/// Wait between checks while nothing is armed.
pub const DEFAULT_IDLE_POLL: Duration = Duration::from_millis(2);

pub struct BeatScheduler<P: Playback> {
    session: SharedSession,
    playback: P,
    idle_poll: Duration,
}

impl<P: Playback> BeatScheduler<P> {
    pub fn new(session: SharedSession, playback: P) -> Self {
        Self::with_idle_poll(session, playback, DEFAULT_IDLE_POLL)
    }

    pub fn with_idle_poll(session: SharedSession, playback: P, idle_poll: Duration) -> Self {
        Self {
            session,
            playback,
            idle_poll,
        }
    }

    /// Runs until the session stops. Returns the playback collaborator.
    pub fn run(mut self) -> P {
        info!("Beat scheduler started");

        while let Some(firing) = self.next_firing() {
            self.fire(firing);
        }

        info!("Beat scheduler stopped");
        self.playback
    }

    fn next_firing(&self) -> Option<Firing> {
        let mut state = self.session.lock_state();
        loop {
            if !self.session.is_running() {
                return None;
            }

            let timeout = match state.poll(Instant::now()) {
                Poll::Fire(firing) => return Some(firing),
                Poll::Wait(remaining) => remaining,
                Poll::Idle => self.idle_poll,
            };
            trace!("Scheduler waiting {:?}", timeout);
            state = self.session.wait(state, timeout);
        }
    }

    fn fire(&mut self, firing: Firing) {
        let late = Instant::now().saturating_duration_since(firing.deadline);
        debug!("Beat due, firing {:?} late", late);

        if let Err(err) = self.playback.trigger() {
            error!("Playback failed, skipping beat: {}", err);
        }

        let completion = self.session.lock_state().complete(firing, Instant::now());
        match completion {
            Completion::Disarmed => debug!("No beat period set, scheduler idle"),
            Completion::Rescheduled { dropped: 0, .. } => {}
            Completion::Rescheduled { dropped, .. } => {
                warn!("Playback overran the beat period, dropped {} beats", dropped)
            }
            Completion::Superseded => debug!("Beat re-armed by a tap during playback"),
        }
    }
}
