//! The keystroke state machine behind a single prompt.
//!
//! A session moves `Idle -> Reading` when it renders its prompt, then to
//! exactly one of `Completed`, `Cancelled`, or `TimedOut`:
//!
//! | Key | Effect while reading |
//! |---|---|
//! | Escape | cancel, discarding input |
//! | Enter | complete with the buffer |
//! | Backspace | drop the last character |
//! | Tab | cycle autocomplete candidates (not in forced mode) |
//! | arrows | nothing |
//! | shortcut letter | complete with its candidate (forced mode only) |
//! | other characters | append if allowed, echo (or mask) |
//!
//! Secure sessions keep input only in a [`SecureText`], which is cleared on
//! cancel and timeout and moved into the outcome on completion.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::MoveLeft;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use switchbind_core::{PromptError, PromptOutcome, PromptRequest, Response, SecureText};
use tracing::debug;

use crate::autocomplete::{self, Autocomplete, Shortcut};
use crate::keys::{Key, KeySource};
use crate::timer::TimeoutTimer;

/// How long each wait for a key lasts before the timeout flag is checked.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Echoed for every character of secure input.
pub const MASK_CHAR: char = '*';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Reading,
    Completed,
    Cancelled,
    TimedOut,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::TimedOut)
    }
}

enum Buffer {
    Plain(String),
    Secure(SecureText),
}

impl Buffer {
    fn len(&self) -> usize {
        match self {
            Self::Plain(text) => text.chars().count(),
            Self::Secure(text) => text.len(),
        }
    }

    fn push(&mut self, ch: char) {
        match self {
            Self::Plain(text) => text.push(ch),
            Self::Secure(text) => text.push(ch),
        }
    }

    fn remove_last(&mut self) -> bool {
        match self {
            Self::Plain(text) => text.pop().is_some(),
            Self::Secure(text) => text.remove_last(),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::Plain(text) => text.clear(),
            Self::Secure(text) => text.clear(),
        }
    }

    fn take(&mut self) -> Response {
        match self {
            Self::Plain(text) => Response::Plain(std::mem::take(text)),
            Self::Secure(text) => Response::Secure(std::mem::take(text)),
        }
    }
}

/// One prompt, from rendering to a terminal outcome.
///
/// # Examples
///
/// ```
/// use switchbind_core::{PromptOutcome, PromptRequest, Response};
/// use switchbind_prompt::{Key, PromptSession, ScriptedKeys};
///
/// let request = PromptRequest::new("Continue? ").with_candidates(["Yes", "No"]).forced();
/// let mut keys = ScriptedKeys::new([Key::Char('n')]);
/// let mut screen = Vec::new();
///
/// let outcome = PromptSession::new(&request).run(&mut keys, &mut screen).unwrap();
/// assert_eq!(outcome, PromptOutcome::Completed(Response::Plain("No".into())));
/// assert!(String::from_utf8_lossy(&screen).contains("[Y]es / [N]o"));
/// ```
pub struct PromptSession<'a> {
    request: &'a PromptRequest,
    state: SessionState,
    buffer: Buffer,
    autocomplete: Autocomplete,
    shortcuts: Vec<Shortcut>,
    pre_guess: Option<String>,
    poll_interval: Duration,
}

impl<'a> PromptSession<'a> {
    pub fn new(request: &'a PromptRequest) -> Self {
        let buffer = if request.secure {
            Buffer::Secure(SecureText::new())
        } else {
            Buffer::Plain(String::new())
        };
        let shortcuts = if request.uses_forced_menu() {
            autocomplete::shortcut_table(&request.candidates)
        } else {
            Vec::new()
        };

        Self {
            request,
            state: SessionState::Idle,
            buffer,
            autocomplete: Autocomplete::new(request.candidates.clone(), request.mode),
            shortcuts,
            pre_guess: None,
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Renders the prompt and reads keys until the session ends.
    ///
    /// The timeout timer, if any, is disarmed by the first keystroke.
    ///
    /// # Errors
    ///
    /// [`PromptError::InputClosed`] when `keys` reaches end of input and
    /// [`PromptError::Io`] for other read or write failures.
    pub fn run<K, W>(mut self, keys: &mut K, out: &mut W) -> Result<PromptOutcome, PromptError>
    where
        K: KeySource + ?Sized,
        W: Write,
    {
        self.begin(out)?;
        let mut timer = self.request.timeout.map(TimeoutTimer::start);

        loop {
            let key = keys.next_key(self.poll_interval).map_err(|err| {
                self.buffer.clear();
                if err.kind() == io::ErrorKind::UnexpectedEof {
                    PromptError::InputClosed
                } else {
                    PromptError::Io(err)
                }
            })?;

            match key {
                Some(key) => {
                    if let Some(mut armed) = timer.take() {
                        armed.disarm();
                    }
                    if let Some(outcome) = self.handle_key(key, out)? {
                        return Ok(outcome);
                    }
                }
                None if timer.as_ref().is_some_and(TimeoutTimer::fired) => {
                    self.buffer.clear();
                    self.finish(SessionState::TimedOut, out)?;
                    return Ok(PromptOutcome::TimedOut);
                }
                None => {}
            }
        }
    }

    fn begin<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.state = SessionState::Reading;
        debug!(secure = self.request.secure, forced = self.request.forced, "prompt reading");
        queue!(out, Print(&self.request.text))?;
        if !self.shortcuts.is_empty() {
            let menu = autocomplete::render_menu(&self.request.candidates, &self.shortcuts);
            queue!(out, Print(format!("{menu} ")))?;
        }
        out.flush()
    }

    fn finish<W: Write>(&mut self, state: SessionState, out: &mut W) -> io::Result<()> {
        self.state = state;
        debug!(?state, "prompt finished");
        queue!(out, Print("\r\n"))?;
        out.flush()
    }

    /// Applies one key, returning the outcome once the session ends.
    fn handle_key<W: Write>(
        &mut self,
        key: Key,
        out: &mut W,
    ) -> io::Result<Option<PromptOutcome>> {
        match key {
            Key::Escape => {
                self.buffer.clear();
                self.finish(SessionState::Cancelled, out)?;
                return Ok(Some(PromptOutcome::Cancelled));
            }
            Key::Enter => {
                self.finish(SessionState::Completed, out)?;
                return Ok(Some(PromptOutcome::Completed(self.buffer.take())));
            }
            Key::Backspace => {
                if self.buffer.remove_last() {
                    self.edited();
                    queue!(out, MoveLeft(1), Print(' '), MoveLeft(1))?;
                }
            }
            Key::Tab if !self.request.forced && !self.request.secure => {
                self.cycle_candidate(out)?;
            }
            Key::Char(ch) if self.request.forced && !self.shortcuts.is_empty() => {
                if let Some(index) = autocomplete::lookup(&self.shortcuts, ch) {
                    let choice = self.request.candidates[index].clone();
                    queue!(out, Print(&choice))?;
                    self.finish(SessionState::Completed, out)?;
                    return Ok(Some(PromptOutcome::Completed(Response::Plain(choice))));
                }
            }
            Key::Char(ch) if !ch.is_control() && self.request.accepts(ch) => {
                self.buffer.push(ch);
                self.edited();
                let echo = if self.request.secure { MASK_CHAR } else { ch };
                queue!(out, Print(echo))?;
            }
            _ => {}
        }
        out.flush()?;
        Ok(None)
    }

    fn edited(&mut self) {
        self.pre_guess = None;
        self.autocomplete.reset();
    }

    fn cycle_candidate<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let Buffer::Plain(text) = &mut self.buffer else {
            return Ok(());
        };
        let seed = self.pre_guess.get_or_insert_with(|| text.clone());
        let Some(candidate) = self.autocomplete.next(seed) else {
            return Ok(());
        };

        let shown = text.chars().count() as u16;
        if shown > 0 {
            queue!(out, MoveLeft(shown))?;
        }
        queue!(out, Clear(ClearType::UntilNewLine), Print(candidate))?;
        *text = candidate.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::ScriptedKeys;

    fn run(request: &PromptRequest, keys: Vec<Key>) -> (PromptOutcome, String) {
        let mut source = ScriptedKeys::new(keys);
        let mut screen = Vec::new();
        let outcome = PromptSession::new(request)
            .run(&mut source, &mut screen)
            .unwrap();
        (outcome, String::from_utf8_lossy(&screen).into_owned())
    }

    fn plain(text: &str) -> PromptOutcome {
        PromptOutcome::Completed(Response::Plain(text.to_string()))
    }

    #[test]
    fn test_enter_completes_with_buffer() {
        let request = PromptRequest::new("Name: ");
        let keys = Key::chars("bob").chain([Key::Enter]).collect();
        let (outcome, screen) = run(&request, keys);
        assert_eq!(outcome, plain("bob"));
        assert!(screen.starts_with("Name: "));
        assert!(screen.contains("bob"));
    }

    #[test]
    fn test_backspace_and_arrows() {
        let request = PromptRequest::new("> ");
        let keys = vec![
            Key::Backspace,
            Key::Char('a'),
            Key::Left,
            Key::Char('b'),
            Key::Up,
            Key::Backspace,
            Key::Char('c'),
            Key::Enter,
        ];
        assert_eq!(run(&request, keys).0, plain("ac"));
    }

    #[test]
    fn test_allowed_filter() {
        let request = PromptRequest::new("> ").with_allowed(switchbind_core::charset::DIGITS);
        let keys = Key::chars("1a2-3").chain([Key::Enter]).collect();
        assert_eq!(run(&request, keys).0, plain("123"));
    }

    #[test]
    fn test_state_starts_idle() {
        let request = PromptRequest::new("> ");
        let session = PromptSession::new(&request);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.state().is_terminal());
    }

    #[test]
    fn test_forced_ignores_other_characters() {
        let request = PromptRequest::new("? ")
            .with_candidates(["Yes", "No"])
            .forced();
        let keys = vec![Key::Char('x'), Key::Tab, Key::Char('Y')];
        assert_eq!(run(&request, keys).0, plain("Yes"));
    }
}
