//! Interactive terminal prompts for switchbind.
//!
//! [`TerminalPrompter`] implements [`switchbind_core::Prompter`] on top of
//! crossterm so a [`Binder`](switchbind_core::Binder) can ask for missing
//! required fields. Each prompt is a [`PromptSession`] that reads keys from
//! a [`KeySource`], which lets tests replay input through [`ScriptedKeys`].
//!
//! ```no_run
//! use switchbind_core::{Binder, FieldDescriptor, ParserSettings, Schema, ValueKind};
//! use switchbind_prompt::TerminalPrompter;
//!
//! let schema = Schema::new("greet")
//!     .with_field(FieldDescriptor::required("Name", ValueKind::String));
//! let settings = ParserSettings::default().prompt_for_missing_required(true);
//! let mut binder = Binder::new(settings).with_prompter(TerminalPrompter::stdout());
//! let args: Vec<String> = std::env::args().skip(1).collect();
//! let result = binder.parse(&args, &schema)?;
//! println!("{:?}", result.values.get_str("name"));
//! # Ok::<(), switchbind_core::ParseError>(())
//! ```

mod autocomplete;
mod keys;
mod session;
mod spinner;
mod terminal;
mod timer;

pub use autocomplete::{Autocomplete, Shortcut, lookup, render_menu, shortcut_table};
pub use keys::{CrosstermKeys, Key, KeySource, ScriptedKeys};
pub use session::{MASK_CHAR, POLL_INTERVAL, PromptSession, SessionState};
pub use spinner::Spinner;
pub use terminal::{RawModeGuard, TerminalPrompter};
pub use timer::TimeoutTimer;
