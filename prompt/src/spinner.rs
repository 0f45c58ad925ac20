//! Busy indicator for long-running work.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};

const FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Animates a one-line spinner while a closure runs.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use switchbind_prompt::Spinner;
///
/// let spinner = Spinner::new("Resolving").with_interval(Duration::from_millis(5));
/// let answer = spinner.run(Vec::new(), || 6 * 7);
/// assert_eq!(answer, 42);
/// ```
#[derive(Debug, Clone)]
pub struct Spinner {
    message: String,
    interval: Duration,
}

impl Spinner {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            interval: Duration::from_millis(100),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs `action` on the calling thread while `out` shows the animation.
    ///
    /// The spinner line is cleared before this returns. Write failures stop
    /// the animation but never the action.
    pub fn run<T, W, F>(&self, mut out: W, action: F) -> T
    where
        W: Write + Send,
        F: FnOnce() -> T,
    {
        let done = AtomicBool::new(false);

        thread::scope(|scope| {
            let animator = scope.spawn(|| {
                for frame in FRAMES.iter().cycle() {
                    if done.load(Ordering::Acquire) {
                        break;
                    }
                    let drawn = queue!(
                        out,
                        MoveToColumn(0),
                        Print(format!("{frame} {}", self.message))
                    )
                    .and_then(|()| out.flush());
                    if drawn.is_err() {
                        return;
                    }
                    thread::park_timeout(self.interval);
                }
                let _ = queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))
                    .and_then(|()| out.flush());
            });

            let result = action();
            done.store(true, Ordering::Release);
            animator.thread().unpark();
            result
        })
    }
}
