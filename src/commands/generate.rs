//! `generate` subcommand: render config files to shell-script text.
//!
//! Per input file: read, split into header/body, resolve the layered
//! variable environment, render twice (header with the pre-header
//! environment, body with the final one), parse, validate, filter, export.
//! The outputs of all files are concatenated; any per-file error aborts the
//! whole run with a non-zero exit.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use tracing::debug;

use crate::cli::GenerateOpts;
use crate::config::ConfigDocument;
use crate::config::header::Header;
use crate::error::ParseError;
use crate::export;
use crate::hash;
use crate::host::{HostInfo, SystemHost};
use crate::render::Renderer;
use crate::split;
use crate::vars::{self, VarMap};

/// OS identifiers recognized in `*_<os>.<ext>` file names.
const KNOWN_OS: [&str; 9] = [
    "linux",
    "darwin",
    "windows",
    "freebsd",
    "openbsd",
    "netbsd",
    "dragonfly",
    "solaris",
    "aix",
];

/// Banner rule for verbose per-file output.
const STARS: &str = "************************************************";

/// Execute the subcommand against the real host and print to stdout.
///
/// # Errors
///
/// Returns an error when any input file fails to render; nothing is
/// printed in that case.
pub fn run(opts: &GenerateOpts, verbose: bool) -> Result<()> {
    let host = SystemHost;
    let out = generate(opts, verbose, &host)?;
    println!("{out}");
    Ok(())
}

/// Render every input to one combined script (or, in hash mode, a digest).
///
/// # Errors
///
/// Fails on unreadable inputs, malformed documents, invalid command kinds,
/// render failures, or `run` command failures. The first failing file stops
/// the run.
pub fn generate(opts: &GenerateOpts, verbose: bool, host: &dyn HostInfo) -> Result<String> {
    let files = discover(&opts.inputs)?;

    let pipeline = Pipeline {
        opts,
        verbose,
        host,
        renderer: Renderer::new(),
        // Both layers are plain maps; loading them once and re-merging per
        // file yields the same result as re-reading them after each header.
        value_files: vars::load_files(&opts.value_files)?,
        overrides: vars::parse_args(&opts.overrides)?,
        timeout: Duration::from_secs(opts.timeout),
    };

    let mut sections = Vec::new();
    let mut included = BTreeMap::new();

    for file in &files {
        if let Some(output) = pipeline.render_file(file)? {
            included.insert(file.display().to_string(), output.vars_export);
            if !output.text.is_empty() {
                sections.push(output.text);
            }
        }
    }

    if opts.hash {
        return Ok(hash::digest(&included)?);
    }

    Ok(sections.join("\n\n"))
}

/// Expand the input list into concrete config files.
///
/// Directories are scanned recursively for `*.yaml`/`*.yml` in file-name
/// order; plain files are taken as-is. A missing input is an error.
fn discover(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            for entry in walkdir::WalkDir::new(input).sort_by_file_name() {
                let entry =
                    entry.with_context(|| format!("scanning {}", input.display()))?;
                if entry.file_type().is_file() && is_config_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            anyhow::bail!("input {} does not exist", input.display());
        }
    }

    Ok(files)
}

fn is_config_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

/// Whether a file named for a specific OS should be skipped on this one.
fn skipped_by_os_suffix(path: &Path, os: &str) -> bool {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    let Some((_, suffix)) = stem.rsplit_once('_') else {
        return false;
    };
    KNOWN_OS.contains(&suffix) && suffix != os
}

/// One file's rendered output plus its resolved-variable export.
struct FileOutput {
    text: String,
    vars_export: String,
}

/// Everything that stays fixed across the files of one run.
struct Pipeline<'a> {
    opts: &'a GenerateOpts,
    verbose: bool,
    host: &'a dyn HostInfo,
    renderer: Renderer,
    value_files: VarMap,
    overrides: VarMap,
    timeout: Duration,
}

impl Pipeline<'_> {
    /// The environment available before the header has been read:
    /// defaults < value-files < overrides.
    fn base_env(&self, path: &Path) -> VarMap {
        let defaults = vars::defaults(&self.opts.shell, Some(path), self.host);
        let env = vars::merge(defaults, self.value_files.clone());
        vars::merge(env, self.overrides.clone())
    }

    /// The full environment once header values are known. Value-files and
    /// overrides are re-applied so they keep beating header values.
    fn final_env(&self, path: &Path, header: &Header) -> VarMap {
        let defaults = vars::defaults(&self.opts.shell, Some(path), self.host);
        let env = vars::merge(defaults, header.values.clone());
        let env = vars::merge(env, self.value_files.clone());
        vars::merge(env, self.overrides.clone())
    }

    /// Run one file through the whole pipeline.
    ///
    /// `None` means the file was skipped (OS-suffix mismatch, no documents,
    /// or header exclude) and contributes nothing to output or digest.
    fn render_file(&self, path: &Path) -> Result<Option<FileOutput>> {
        let file = path.display().to_string();
        let data = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: file.clone(),
            source,
        })?;

        let base = self.base_env(path);
        let os = base
            .get("OS")
            .map_or_else(String::new, ToString::to_string);

        if skipped_by_os_suffix(path, &os) {
            debug!("skipping {file}: file is for another os (current: {os})");
            return Ok(None);
        }

        let mut docs = split::documents(&data);
        let (header_text, body_text) = match docs.len() {
            0 => {
                debug!("skipping {file}: no documents");
                return Ok(None);
            }
            1 => (None, docs.remove(0)),
            2 => {
                let body = docs.remove(1);
                (Some(docs.remove(0)), body)
            }
            count => {
                return Err(ParseError::TooManyDocuments { file, count }.into());
            }
        };

        let header = match header_text {
            Some(text) => {
                let rendered = self.renderer.render(&text, &base, &file)?;
                Header::parse(&rendered, &file)?
            }
            None => Header::default(),
        };

        if header.exclude {
            debug!("skipping {file}: excluded by header");
            return Ok(None);
        }

        let env = self.final_env(path, &header);
        let os = env
            .get("OS")
            .map_or_else(String::new, ToString::to_string);
        let vars_export = vars::export(&env);

        if self.opts.hash {
            return Ok(Some(FileOutput {
                text: String::new(),
                vars_export,
            }));
        }

        let rendered = self.renderer.render(&body_text, &env, &file)?;
        let doc = ConfigDocument::parse(&rendered, &file)?.validated()?;
        let filtered = doc.filtered(&os, &self.opts.shell);

        let mut text = export::export(
            &filtered,
            &self.opts.shell,
            &file,
            self.opts.instrument,
            self.timeout,
        )?;

        if self.verbose {
            text = format!("# {STARS}\n# {file}\n# {STARS}\n{vars_export}\n\n{text}");
        }

        Ok(Some(FileOutput { text, vars_export }))
    }
}
