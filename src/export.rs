//! Shell-script export of a filtered config document.
//!
//! Emits, in fixed order: the environment-variable block, the plain-variable
//! block, the instrumentation array declaration (when enabled), the commands
//! block, and the instrumentation summary footer. `run` commands execute
//! during export; their failure aborts the whole file. Reformatting failures
//! are non-fatal and fall back to the unformatted text.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

use crate::config::ConfigDocument;
use crate::config::command::{Command, Kind};
use crate::error::{ExecutionError, ShellgenError, ValidationError};
use crate::exec::{self, ExecError};
use crate::format;
use crate::instrument::Instrumentation;

/// Horizontal rule used between export sections.
const RULE: &str = "# ------------------------------------------------";

/// Serialize a filtered document to shell-script text.
///
/// `file` is the source file identity, used to scope instrumentation state.
/// `run` commands are executed under `shell` with the given `timeout`.
///
/// # Errors
///
/// Fails when a `run` command exits non-zero, times out, cannot be
/// launched, or its captured output cannot be written to `export_to`.
pub fn export(
    doc: &ConfigDocument,
    shell: &str,
    file: &str,
    instrument: bool,
    timeout: Duration,
) -> Result<String, ShellgenError> {
    let inst = Instrumentation::new(file, instrument);
    let mut out = String::new();

    if !doc.env.is_empty() {
        let _ = writeln!(
            out,
            "\n# Environment variables\n{RULE}\n{}\n{RULE}",
            assignments(&doc.env, "export ")
        );
    }

    if !doc.vars.is_empty() {
        let _ = writeln!(
            out,
            "\n# Variables\n{RULE}\n{}\n{RULE}",
            assignments(&doc.vars, "")
        );
    }

    let header = inst.header();
    if !header.is_empty() {
        let _ = write!(out, "\n{header}");
    }

    if !doc.commands.is_empty() {
        let _ = writeln!(out, "\n# Commands\n{RULE}");

        for command in &doc.commands {
            let text = command_text(command, shell, timeout)?;
            out.push_str(&inst.wrap(&command.name, &text));
            out.push('\n');
        }

        let _ = writeln!(out, "{RULE}");
    }

    let footer = inst.footer();
    if !footer.is_empty() {
        let _ = write!(out, "\n{footer}");
    }

    Ok(out.trim().to_string())
}

/// Sorted `PREFIX NAME="value"` lines for an assignment block.
fn assignments(map: &BTreeMap<String, String>, prefix: &str) -> String {
    map.iter()
        .map(|(k, v)| format!("{prefix}{k}={}", format::quote(v)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `# name:` / `# doc:` comment header preceding every command.
fn comment_header(command: &Command) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# name: {}", command.name.trim());

    if let Some(doc) = &command.doc {
        let doc = doc.trim().replace('\n', "\n#  ");
        let _ = writeln!(out, "# doc:");
        let _ = writeln!(out, "#  {doc}");
    }

    out
}

/// Render one command according to its kind.
fn command_text(
    command: &Command,
    shell: &str,
    timeout: Duration,
) -> Result<String, ShellgenError> {
    let kind = Kind::parse(&command.kind).ok_or_else(|| ValidationError {
        issues: vec![format!(
            "command {:?} has invalid kind {:?}",
            command.name, command.kind
        )],
    })?;

    match kind {
        Kind::Alias => Ok(export_alias(command)),
        Kind::Function => Ok(export_function(command)),
        Kind::Raw => Ok(export_raw(command)),
        Kind::Run => export_run(command, shell, timeout).map_err(Into::into),
    }
}

fn export_alias(command: &Command) -> String {
    let mut cmd = command.cmd.trim().to_string();

    // Best-effort single-line reformat; keep the raw text on failure.
    if let Ok(formatted) = format::shell(&cmd, true) {
        cmd = formatted;
    }

    format!(
        "{}alias {}='{}'\n",
        comment_header(command),
        command.name.trim(),
        cmd.trim_end_matches('\n')
    )
}

fn export_function(command: &Command) -> String {
    let text = format!(
        "{}{}() {{\n{}\n}}\n",
        comment_header(command),
        command.name.trim(),
        command.cmd.trim()
    );

    match format::shell(&text, false) {
        Ok(formatted) => format!("{formatted}\n"),
        Err(_) => text,
    }
}

fn export_raw(command: &Command) -> String {
    let text = format!("{}{}", comment_header(command), command.cmd);

    match format::shell(&text, false) {
        Ok(formatted) => format!("{formatted}\n"),
        Err(_) => text,
    }
}

fn export_run(
    command: &Command,
    shell: &str,
    timeout: Duration,
) -> Result<String, ExecutionError> {
    let name = command.name.trim().to_string();
    let cmd = command.cmd.trim();

    let result = exec::run_snippet(shell, cmd, timeout).map_err(|e| match e {
        ExecError::NoShell => ExecutionError::NoShell { name: name.clone() },
        ExecError::Timeout(d) => ExecutionError::Timeout {
            name: name.clone(),
            seconds: d.as_secs(),
        },
        ExecError::Io(source) => ExecutionError::Launch {
            name: name.clone(),
            source,
        },
    })?;

    if !result.success {
        return Err(ExecutionError::CommandFailed {
            name,
            code: result.code.unwrap_or(-1),
            stderr: result.stderr.trim().to_string(),
        });
    }

    let mut out = comment_header(command);

    // The original command is always recorded for traceability.
    let _ = writeln!(out, "# original:");
    let _ = writeln!(out, "#  {}", cmd.replace('\n', "\n#  "));

    if let Some(raw) = command.export_to.as_deref().filter(|p| !p.is_empty()) {
        let export_to = expand_env(raw);
        let quoted = format::quote(&export_to);
        let _ = writeln!(out, "# output exported to {quoted}");
        let _ = writeln!(out, ". {quoted}");

        let path = std::path::Path::new(&export_to);
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &result.stdout)
        };
        write().map_err(|source| ExecutionError::ExportWrite {
            name,
            path: export_to.clone(),
            source,
        })?;
    } else {
        out.push_str(&result.stdout);
    }

    Ok(out)
}

/// Expand `$NAME` and `${NAME}` references against the process environment.
/// Unset variables expand to the empty string; a `$` that starts no
/// reference is kept literally.
fn expand_env(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let name: String = if chars.peek() == Some(&'{') {
            chars.next();
            let mut name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                name.push(c);
            }
            name
        } else {
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            name
        };

        if name.is_empty() {
            out.push('$');
        } else {
            out.push_str(&std::env::var(&name).unwrap_or_default());
        }
    }

    out
}
