//! Declarative shell-config rendering engine.
//!
//! Turns YAML config files describing aliases, functions, raw snippets, and
//! run-and-capture commands into shell-script text, filtered for the current
//! OS and target shell and parameterised through a layered variable
//! environment with a handlebars template pass.
//!
//! The crate is organised around one stateless per-file pipeline:
//!
//! - **[`split`]** — break a file into header and body documents
//! - **[`vars`]** / **[`host`]** — resolve the layered variable environment
//! - **[`render`]** — template pass with the fixed helper library
//! - **[`config`]** — strict-schema parsing, validation, OS/shell filtering
//! - **[`export`]** / **[`exec`]** / **[`instrument`]** — emit shell text,
//!   executing `run` commands and optionally wrapping timing capture
//! - **[`commands`]** — top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod export;
pub mod format;
pub mod hash;
pub mod host;
pub mod instrument;
pub mod logging;
pub mod render;
pub mod split;
pub mod vars;
