//! Command model: one exportable unit of a config document.

use serde::Deserialize;

/// The recognized command kinds, in the order they are reported.
pub const KINDS: [&str; 4] = ["alias", "function", "raw", "run"];

/// Export strategy for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// One-line `alias NAME='...'`.
    Alias,
    /// Shell function definition.
    Function,
    /// Body emitted verbatim.
    Raw,
    /// Body executed at generation time, output captured.
    Run,
}

impl Kind {
    /// Parse a kind string; `None` for anything unrecognized.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "alias" => Some(Self::Alias),
            "function" => Some(Self::Function),
            "raw" => Some(Self::Raw),
            "run" => Some(Self::Run),
            _ => None,
        }
    }
}

/// A single command definition: alias, function, raw snippet, or
/// run-and-capture action.
///
/// `kind` stays a plain string until validation so an invalid value can be
/// reported per command instead of failing the whole decode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Command {
    /// Name of the alias or function.
    pub name: String,

    /// Documentation string, emitted as a comment block.
    #[serde(default)]
    pub doc: Option<String>,

    /// The command body; meaning depends on `kind`.
    pub cmd: String,

    /// Export strategy; defaults to `alias` during validation.
    #[serde(default)]
    pub kind: String,

    /// Destination path for captured output; only meaningful for `run`.
    #[serde(default)]
    pub export_to: Option<String>,

    /// Shells this command applies to; empty means all.
    #[serde(default)]
    pub shell: Vec<String>,

    /// Operating systems this command applies to; empty means all.
    #[serde(default)]
    pub os: Vec<String>,

    /// Hard exclude, regardless of OS or shell.
    #[serde(default)]
    pub exclude: bool,
}

impl Command {
    /// Whether this command is excluded for the given OS and shell.
    ///
    /// Checked in order: the explicit exclude flag, then the OS allow-list,
    /// then the shell allow-list. An empty list never excludes on that axis.
    #[must_use]
    pub fn is_excluded(&self, os: &str, shell: &str) -> bool {
        if self.exclude {
            return true;
        }

        if !self.os.is_empty() && !self.os.iter().any(|o| o == os) {
            return true;
        }

        if !self.shell.is_empty() && !self.shell.iter().any(|s| s == shell) {
            return true;
        }

        false
    }
}
