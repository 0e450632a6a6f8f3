//! Scripted call guidance for support agents.
//!
//! A flow is a graph of info, choice, input and resolution nodes. The
//! [`flow::Interpreter`] walks it one agent action at a time, rendering
//! `{variable}` templates from the call's [`session::Context`] and appending
//! each visit to the [`history::HistoryLog`]. At the end of the call
//! [`call_note::generate_call_note`] folds that history into the text
//! summary.

pub mod call_note;
pub mod config;
pub mod console;
pub mod error;
pub mod flow;
pub mod history;
pub mod session;
pub mod template;

pub use error::{FlowError, Result};
