//! rpchat is a line-oriented role-play chat shell for OpenAI-compatible APIs.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns scenarios, context construction, the conversation engine
//!   and the HTTP completion client.
//! - [`ui`] runs the interactive shell: prompts, rendering and streaming
//!   replies to the terminal.
//! - [`commands`] parses shell input into commands and provides completion.
//! - [`api`] defines chat payloads sent to and received from the API.
//! - [`utils`] holds the line editor, clipboard, transcript log and input
//!   helpers.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which loads configuration and credentials
//! and starts [`ui::shell`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod logging;
pub mod ui;
pub mod utils;
