//! Protected buffer for sensitive input.
//!
//! [`SecureText`] holds its characters inside a [`secrecy::SecretBox`], so the
//! contents are zeroed when the value is dropped and never appear in `Debug`
//! or `Display` output. The only way to read the characters is the explicit
//! [`ExposeSecret`] trait.

use std::fmt;

use secrecy::zeroize::Zeroize;
use secrecy::{ExposeSecret, ExposeSecretMut, SecretBox};
use serde::{Serialize, Serializer};

/// Rendered in place of secure contents wherever text output is produced.
pub const REDACTED: &str = "[REDACTED]";

/// Bytes reserved up front; the buffer doubles from here.
const INITIAL_CAPACITY: usize = 64;

/// Sensitive text that supports only length, append, remove-last, and clear.
///
/// # Examples
///
/// ```
/// use switchbind_core::SecureText;
/// use switchbind_core::ExposeSecret;
///
/// let mut secret = SecureText::new();
/// secret.push('h');
/// secret.push('i');
/// assert_eq!(secret.len(), 2);
/// assert_eq!(format!("{secret:?}"), "SecureText([REDACTED])");
/// assert_eq!(secret.expose_secret(), "hi");
///
/// secret.clear();
/// assert!(secret.is_empty());
/// ```
pub struct SecureText {
    inner: SecretBox<String>,
    chars: usize,
}

impl SecureText {
    pub fn new() -> Self {
        Self {
            inner: SecretBox::new(Box::new(String::with_capacity(INITIAL_CAPACITY))),
            chars: 0,
        }
    }

    /// Builds secure text from characters, consuming them one at a time.
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Self {
        let mut text = Self::new();
        for ch in chars {
            text.push(ch);
        }
        text
    }

    /// Number of characters held.
    pub fn len(&self) -> usize {
        self.chars
    }

    pub fn is_empty(&self) -> bool {
        self.chars == 0
    }

    pub fn push(&mut self, ch: char) {
        let text = self.inner.expose_secret_mut();
        if text.capacity() - text.len() < ch.len_utf8() {
            // Grow by hand so the old allocation is zeroed before it is freed
            let mut grown = String::with_capacity((text.capacity() * 2).max(INITIAL_CAPACITY));
            grown.push_str(text);
            let mut old = std::mem::replace(text, grown);
            old.zeroize();
        }
        text.push(ch);
        self.chars += 1;
    }

    /// Removes the last character without returning it.
    ///
    /// Returns `false` when the buffer was already empty.
    pub fn remove_last(&mut self) -> bool {
        let text = self.inner.expose_secret_mut();
        let Some((start, ch)) = text.char_indices().next_back() else {
            return false;
        };
        // Overwrite in place before truncating so no stale bytes remain
        text.replace_range(start.., &"\0".repeat(ch.len_utf8()));
        text.truncate(start);
        self.chars -= 1;
        true
    }

    /// Clears the contents, zeroing the previously used bytes.
    pub fn clear(&mut self) {
        self.inner.expose_secret_mut().zeroize();
        self.chars = 0;
    }
}

impl Default for SecureText {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SecureText {
    fn clone(&self) -> Self {
        Self::from_chars(self.inner.expose_secret().chars())
    }
}

/// Compares contents without exposing them to the caller.
impl PartialEq for SecureText {
    fn eq(&self, other: &Self) -> bool {
        self.inner.expose_secret() == other.inner.expose_secret()
    }
}

impl ExposeSecret<str> for SecureText {
    fn expose_secret(&self) -> &str {
        self.inner.expose_secret().as_str()
    }
}

impl fmt::Debug for SecureText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureText({REDACTED})")
    }
}

impl fmt::Display for SecureText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for SecureText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}
