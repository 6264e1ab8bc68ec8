//! JudgeInk application shell.
//!
//! Drives the annotation engine from the command line: replaying recorded
//! sessions into file-backed storage and exporting stored annotations.

pub mod commands;
pub mod trace;

pub use commands::{AppError, Cli, Command, run};
pub use trace::{ReplaySummary, SessionTrace, TraceStep, replay};
