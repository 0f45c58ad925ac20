//! Candidate cycling and forced-choice shortcuts.

use switchbind_core::AutocompleteMode;

/// Cycles through the candidates matching a seed.
///
/// The seed is the text typed before the first Tab; repeated calls with the
/// same seed step through its matches and wrap around.
///
/// # Examples
///
/// ```
/// use switchbind_core::AutocompleteMode;
/// use switchbind_prompt::Autocomplete;
///
/// let mut ac = Autocomplete::new(
///     vec!["apple".into(), "banana".into(), "apricot".into()],
///     AutocompleteMode::Prefix,
/// );
/// assert_eq!(ac.next("ap"), Some("apple"));
/// assert_eq!(ac.next("ap"), Some("apricot"));
/// assert_eq!(ac.next("ap"), Some("apple"));
/// assert_eq!(ac.next("x"), None);
/// ```
#[derive(Debug, Clone)]
pub struct Autocomplete {
    candidates: Vec<String>,
    mode: AutocompleteMode,
    seed: Option<String>,
    matches: Vec<usize>,
    position: usize,
}

impl Autocomplete {
    pub fn new(candidates: Vec<String>, mode: AutocompleteMode) -> Self {
        Self {
            candidates,
            mode,
            seed: None,
            matches: Vec::new(),
            position: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Next candidate matching `seed`, wrapping after the last one.
    pub fn next(&mut self, seed: &str) -> Option<&str> {
        if self.seed.as_deref() != Some(seed) {
            self.matches = self
                .candidates
                .iter()
                .enumerate()
                .filter(|(_, c)| self.mode.matches(c, seed))
                .map(|(i, _)| i)
                .collect();
            self.seed = Some(seed.to_string());
            self.position = 0;
        }
        if self.matches.is_empty() {
            return None;
        }

        let index = self.matches[self.position % self.matches.len()];
        self.position = (self.position + 1) % self.matches.len();
        Some(&self.candidates[index])
    }

    /// Forgets the current seed so the next call starts over.
    pub fn reset(&mut self) {
        self.seed = None;
        self.matches.clear();
        self.position = 0;
    }
}

/// A candidate's reserved shortcut key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
    /// Lower-cased shortcut character.
    pub key: char,
    /// Index of the candidate.
    pub candidate: usize,
    /// Character offset of the shortcut within the candidate.
    pub offset: usize,
}

/// Assigns each candidate the first of its letters or digits not taken by
/// an earlier candidate.
///
/// Candidates whose characters are all taken get no shortcut.
///
/// # Examples
///
/// ```
/// use switchbind_prompt::shortcut_table;
///
/// let candidates = vec!["Yes".to_string(), "No".to_string(), "Never".to_string()];
/// let keys: Vec<char> = shortcut_table(&candidates).iter().map(|s| s.key).collect();
/// assert_eq!(keys, vec!['y', 'n', 'e']);
/// ```
pub fn shortcut_table(candidates: &[String]) -> Vec<Shortcut> {
    let mut table: Vec<Shortcut> = Vec::with_capacity(candidates.len());
    for (candidate, text) in candidates.iter().enumerate() {
        let free = text.chars().enumerate().find_map(|(offset, ch)| {
            let key = ch.to_lowercase().next().unwrap_or(ch);
            let taken = table.iter().any(|s| s.key == key);
            (ch.is_alphanumeric() && !taken).then_some(Shortcut {
                key,
                candidate,
                offset,
            })
        });
        if let Some(shortcut) = free {
            table.push(shortcut);
        }
    }
    table
}

/// Finds the candidate reserved for a pressed character.
pub fn lookup(table: &[Shortcut], pressed: char) -> Option<usize> {
    let pressed = pressed.to_lowercase().next().unwrap_or(pressed);
    table
        .iter()
        .find(|s| s.key == pressed)
        .map(|s| s.candidate)
}

/// Renders candidates with their shortcut bracketed, e.g. `[Y]es / [N]o`.
pub fn render_menu(candidates: &[String], table: &[Shortcut]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(index, text)| match table.iter().find(|s| s.candidate == index) {
            Some(shortcut) => text
                .chars()
                .enumerate()
                .map(|(offset, ch)| {
                    if offset == shortcut.offset {
                        format!("[{}]", ch.to_uppercase())
                    } else {
                        ch.to_string()
                    }
                })
                .collect::<String>(),
            None => text.clone(),
        })
        .collect::<Vec<_>>()
        .join(" / ")
}
