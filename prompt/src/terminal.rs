//! [`Prompter`] backed by a real terminal.

use std::io::{self, Stderr, Stdout, Write};
use std::time::Duration;

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal;
use switchbind_core::{PromptError, PromptOutcome, PromptRequest, Prompter};
use tracing::debug;

use crate::keys::{CrosstermKeys, KeySource};
use crate::session::{POLL_INTERVAL, PromptSession};

/// Keeps the terminal in raw mode until dropped.
#[derive(Debug)]
pub struct RawModeGuard(());

impl RawModeGuard {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self(()))
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            debug!(%err, "failed to leave raw mode");
        }
    }
}

/// Runs each prompt as a [`PromptSession`] over a key source and a writer.
///
/// [`TerminalPrompter::stdout`] reads the keyboard in raw mode and draws
/// on standard output. Any other key source and writer can be paired
/// through [`TerminalPrompter::new`], which leaves the terminal alone.
///
/// # Examples
///
/// ```
/// use switchbind_core::{PromptOutcome, PromptRequest, Prompter, Response};
/// use switchbind_prompt::{ScriptedKeys, TerminalPrompter};
///
/// let mut prompter = TerminalPrompter::new(ScriptedKeys::typed("8080"), Vec::new());
/// let outcome = prompter.prompt(&PromptRequest::new("Port: ")).unwrap();
/// assert_eq!(outcome, PromptOutcome::Completed(Response::Plain("8080".into())));
/// ```
pub struct TerminalPrompter<K = CrosstermKeys, W = Stdout> {
    keys: K,
    out: W,
    raw_mode: bool,
    poll_interval: Duration,
}

impl TerminalPrompter {
    pub fn stdout() -> Self {
        Self {
            keys: CrosstermKeys,
            out: io::stdout(),
            raw_mode: true,
            poll_interval: POLL_INTERVAL,
        }
    }
}

impl TerminalPrompter<CrosstermKeys, Stderr> {
    /// Like [`stdout`](TerminalPrompter::stdout) but draws on standard
    /// error, leaving standard output to the program's results.
    pub fn stderr() -> Self {
        Self {
            keys: CrosstermKeys,
            out: io::stderr(),
            raw_mode: true,
            poll_interval: POLL_INTERVAL,
        }
    }
}

impl<K: KeySource, W: Write> TerminalPrompter<K, W> {
    pub fn new(keys: K, out: W) -> Self {
        Self {
            keys,
            out,
            raw_mode: false,
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn into_parts(self) -> (K, W) {
        (self.keys, self.out)
    }
}

impl<K: KeySource, W: Write> Prompter for TerminalPrompter<K, W> {
    fn prompt(&mut self, request: &PromptRequest) -> Result<PromptOutcome, PromptError> {
        let _guard = if self.raw_mode {
            Some(RawModeGuard::enable()?)
        } else {
            None
        };
        PromptSession::new(request)
            .with_poll_interval(self.poll_interval)
            .run(&mut self.keys, &mut self.out)
    }

    fn report_error(&mut self, message: &str) {
        let written = queue!(
            self.out,
            SetForegroundColor(Color::Red),
            Print(message),
            ResetColor,
            Print("\r\n")
        )
        .and_then(|()| self.out.flush());
        if let Err(err) = written {
            debug!(%err, "failed to report prompt error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{Key, ScriptedKeys};
    use switchbind_core::Response;

    #[test]
    fn test_report_error_is_colored() {
        let mut prompter = TerminalPrompter::new(ScriptedKeys::new([]), Vec::new());
        prompter.report_error("bad value");
        let (_, screen) = prompter.into_parts();
        let screen = String::from_utf8_lossy(&screen).into_owned();
        assert!(screen.contains("bad value"));
        assert!(screen.contains('\u{1b}'));
        assert!(screen.ends_with("\r\n"));
    }

    #[test]
    fn test_sequential_prompts_share_key_source() {
        let keys = ScriptedKeys::typed("a").then_keys([Key::Char('b'), Key::Enter]);
        let mut prompter = TerminalPrompter::new(keys, Vec::new());
        let request = PromptRequest::new("> ");

        let first = prompter.prompt(&request).unwrap();
        let second = prompter.prompt(&request).unwrap();
        assert_eq!(first, PromptOutcome::Completed(Response::Plain("a".into())));
        assert_eq!(second, PromptOutcome::Completed(Response::Plain("b".into())));
    }

    #[test]
    fn test_stderr_prompter_draws_on_stderr() {
        let prompter = TerminalPrompter::stderr();
        assert!(prompter.raw_mode);
        let (_, out): (CrosstermKeys, Stderr) = prompter.into_parts();
        drop(out);
    }

    #[test]
    fn test_exhausted_keys_close_input() {
        let mut prompter = TerminalPrompter::new(ScriptedKeys::new([]), Vec::new());
        let err = prompter.prompt(&PromptRequest::new("> ")).unwrap_err();
        assert!(matches!(err, PromptError::InputClosed));
    }
}
