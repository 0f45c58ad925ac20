//! Prompt timeout timer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

/// Sets a flag once a duration elapses, unless disarmed first.
///
/// The timer thread waits on a channel, so disarming wakes it immediately
/// and the flag can no longer change once [`disarm`](Self::disarm) returns.
/// Dropping the timer disarms it.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use switchbind_prompt::TimeoutTimer;
///
/// let mut timer = TimeoutTimer::start(Duration::from_secs(60));
/// assert!(!timer.fired());
/// timer.disarm();
/// assert!(!timer.fired());
/// ```
#[derive(Debug)]
pub struct TimeoutTimer {
    fired: Arc<AtomicBool>,
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TimeoutTimer {
    pub fn start(duration: Duration) -> Self {
        let fired = Arc::new(AtomicBool::new(false));
        let (cancel, cancelled) = mpsc::channel::<()>();

        let flag = Arc::clone(&fired);
        let handle = thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = cancelled.recv_timeout(duration) {
                debug!(?duration, "prompt timer fired");
                flag.store(true, Ordering::Release);
            }
        });

        Self {
            fired,
            cancel: Some(cancel),
            handle: Some(handle),
        }
    }

    pub fn fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Stops the timer and waits for its thread to exit.
    pub fn disarm(&mut self) {
        // Dropping the sender disconnects the channel and wakes the thread
        self.cancel.take();
        if let Some(handle) = self.handle.take() {
            if let Err(panic) = handle.join() {
                debug!(?panic, "prompt timer thread panicked");
            }
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for TimeoutTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_fires_after_duration() {
        let timer = TimeoutTimer::start(Duration::from_millis(10));
        thread::sleep(Duration::from_millis(100));
        assert!(timer.fired());
    }

    #[test]
    fn test_disarm_is_idempotent() {
        let mut timer = TimeoutTimer::start(Duration::from_millis(5));
        thread::sleep(Duration::from_millis(40));
        timer.disarm();
        timer.disarm();
        assert!(!timer.is_armed());
        assert!(timer.fired());
    }

    #[test]
    fn test_disarmed_timer_never_fires() {
        let mut timer = TimeoutTimer::start(Duration::from_millis(30));
        timer.disarm();
        assert!(!timer.is_armed());
        thread::sleep(Duration::from_millis(60));
        assert!(!timer.fired());
    }
}
