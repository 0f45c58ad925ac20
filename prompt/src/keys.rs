//! Key input sources.

use std::collections::VecDeque;
use std::io;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A keystroke as seen by a prompt session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    /// Any key a session has no use for.
    Other,
}

impl Key {
    /// One [`Key::Char`] per character of `text`.
    pub fn chars(text: &str) -> impl Iterator<Item = Key> + '_ {
        text.chars().map(Key::Char)
    }

    pub fn is_arrow(self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Left | Self::Right)
    }
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        // Raw mode swallows SIGINT, so Ctrl+C cancels like Escape
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            return match event.code {
                KeyCode::Char('c') | KeyCode::Char('C') => Self::Escape,
                _ => Self::Other,
            };
        }
        match event.code {
            KeyCode::Char(c) => Self::Char(c),
            KeyCode::Enter => Self::Enter,
            KeyCode::Esc => Self::Escape,
            KeyCode::Backspace => Self::Backspace,
            KeyCode::Tab => Self::Tab,
            KeyCode::Up => Self::Up,
            KeyCode::Down => Self::Down,
            KeyCode::Left => Self::Left,
            KeyCode::Right => Self::Right,
            _ => Self::Other,
        }
    }
}

/// Blocking source of keystrokes.
pub trait KeySource {
    /// Waits up to `wait` for the next key.
    ///
    /// Returns `Ok(None)` when nothing arrived in time. End of input is an
    /// [`io::ErrorKind::UnexpectedEof`] error.
    fn next_key(&mut self, wait: Duration) -> io::Result<Option<Key>>;
}

/// Reads key presses from the terminal through crossterm.
///
/// The terminal should be in raw mode while reading; see
/// [`TerminalPrompter`](crate::TerminalPrompter).
#[derive(Debug, Default)]
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn next_key(&mut self, wait: Duration) -> io::Result<Option<Key>> {
        if !event::poll(wait)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(Key::from(key))),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Key(Key),
    Pause(Duration),
}

/// Replays a fixed sequence of keys and pauses.
///
/// Once the script is exhausted the source either reports end of input or,
/// after [`then_idle`](Self::then_idle), stays silent forever.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use switchbind_prompt::{Key, KeySource, ScriptedKeys};
///
/// let mut keys = ScriptedKeys::new([Key::Char('a'), Key::Enter]);
/// let wait = Duration::from_millis(1);
/// assert_eq!(keys.next_key(wait).unwrap(), Some(Key::Char('a')));
/// assert_eq!(keys.next_key(wait).unwrap(), Some(Key::Enter));
/// assert!(keys.next_key(wait).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    steps: VecDeque<Step>,
    idle_when_done: bool,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            steps: keys.into_iter().map(Step::Key).collect(),
            idle_when_done: false,
        }
    }

    /// Keys for `text` followed by Enter.
    pub fn typed(text: &str) -> Self {
        Self::new(Key::chars(text).chain([Key::Enter]))
    }

    pub fn then_keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.steps.extend(keys.into_iter().map(Step::Key));
        self
    }

    /// Appends a stretch with no input.
    pub fn then_pause(mut self, duration: Duration) -> Self {
        self.steps.push_back(Step::Pause(duration));
        self
    }

    /// Stays silent instead of reporting end of input once exhausted.
    pub fn then_idle(mut self) -> Self {
        self.idle_when_done = true;
        self
    }

    pub fn is_exhausted(&self) -> bool {
        self.steps.is_empty()
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self, wait: Duration) -> io::Result<Option<Key>> {
        match self.steps.pop_front() {
            Some(Step::Key(key)) => Ok(Some(key)),
            Some(Step::Pause(remaining)) => {
                let slept = remaining.min(wait);
                thread::sleep(slept);
                if remaining > slept {
                    self.steps.push_front(Step::Pause(remaining - slept));
                }
                Ok(None)
            }
            None if self.idle_when_done => {
                thread::sleep(wait);
                Ok(None)
            }
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "scripted keys exhausted",
            )),
        }
    }
}
