//! Structured config documents: parsing, validation, and filtering.

pub mod command;
pub mod header;

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{ParseError, ValidationError};
use self::command::{Command, KINDS, Kind};

/// The parsed body document of one input file.
///
/// `commands` keeps its declared order; that order is the export order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDocument {
    /// Plain shell assignments.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,

    /// Exported environment-variable assignments.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Ordered command definitions.
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl ConfigDocument {
    /// Parse a rendered body document with a strict schema: any top-level
    /// field outside `vars`, `env`, `commands` is a hard parse error.
    ///
    /// # Errors
    ///
    /// Fails on malformed YAML or unknown fields.
    pub fn parse(data: &str, file: &str) -> Result<Self, ParseError> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(data).map_err(|source| ParseError::InvalidDocument {
            file: file.to_string(),
            source,
        })
    }

    /// Validate command kinds, returning a corrected copy.
    ///
    /// Empty kinds are defaulted to `alias`. Every command is checked;
    /// invalid kinds are accumulated and reported together rather than
    /// stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the joined [`ValidationError`] when any command carries an
    /// unrecognized kind.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        let mut issues = Vec::new();

        for command in &mut self.commands {
            if command.kind.is_empty() {
                command.kind = "alias".to_string();
            } else if Kind::parse(&command.kind).is_none() {
                issues.push(format!(
                    "command {:?} has invalid kind {:?}, must be one of {KINDS:?}",
                    command.name, command.kind
                ));
            }
        }

        if issues.is_empty() {
            Ok(self)
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Produce a new document containing only the commands applicable to
    /// the given OS and shell. `env` and `vars` pass through unchanged.
    #[must_use]
    pub fn filtered(&self, os: &str, shell: &str) -> Self {
        Self {
            vars: self.vars.clone(),
            env: self.env.clone(),
            commands: self
                .commands
                .iter()
                .filter(|c| !c.is_excluded(os, shell))
                .cloned()
                .collect(),
        }
    }
}
