//! Line-oriented terminal interface for role-play sessions.
//!
//! - [`shell`]: the read/dispatch loop. Turns parsed [`crate::commands`] into
//!   session edits and streamed completions via [`crate::core::conversation`].
//! - [`prompts`]: yes/no questions, room detail entry and the scenario picker.
//! - [`render`]: banner and `show context` formatting.
//!
//! Ownership boundary: this layer reads input and writes output, while
//! [`crate::core`] owns the conversation state and backend calls.

pub mod prompts;
pub mod render;
pub mod shell;
