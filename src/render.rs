//! Template rendering collaborator.
//!
//! Wraps the handlebars engine with the fixed function library available to
//! both header and body documents: command lookup, existence tests, path
//! resolution, file size/read/copy, and POSIX/Windows path-form conversion.
//! All helpers are read-only except `copy`.
//!
//! HTML escaping is disabled; the output is shell text.

// handlebars_helper! expands to public helper structs that cannot carry doc
// comments.
#![allow(missing_docs)]

use handlebars::{Handlebars, handlebars_helper, no_escape};

use crate::error::RenderError;
use crate::format;
use crate::vars::VarMap;

handlebars_helper!(which_helper: |name: str| {
    which::which(name)
        .map_or_else(|_| String::new(), |p| format::to_slash(&p.to_string_lossy()))
});

handlebars_helper!(in_path: |name: str| which::which(name).is_ok());

handlebars_helper!(not_in_path: |name: str| which::which(name).is_err());

handlebars_helper!(exists: |path: str| std::path::Path::new(path).exists());

handlebars_helper!(size: |path: str| {
    std::fs::metadata(path)
        .ok()
        .filter(|m| !m.is_dir())
        .map_or(0, |m| m.len())
});

handlebars_helper!(join: |*args| {
    let parts: Vec<String> = args
        .iter()
        .filter_map(|v| v.as_str().map(ToString::to_string))
        .collect();
    join_paths(&parts)
});

handlebars_helper!(resolve: |*args| {
    let parts: Vec<String> = args
        .iter()
        .filter_map(|v| v.as_str().map(ToString::to_string))
        .collect();
    let path = join_paths(&parts);
    if !path.is_empty() && std::path::Path::new(&path).exists() {
        path
    } else {
        String::new()
    }
});

handlebars_helper!(posix_path: |path: str| format::posix_path(path));

handlebars_helper!(windows_path: |path: str| format::windows_path(path));

/// Join path segments with forward slashes, normalizing separators.
fn join_paths(parts: &[String]) -> String {
    let mut path = std::path::PathBuf::new();
    for part in parts {
        path.push(part);
    }
    format::to_slash(&path.to_string_lossy())
}

/// `{{read "path"}}` — inline a file's content; a missing file fails the
/// render.
fn read_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let path = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or(handlebars::RenderErrorReason::ParamNotFoundForIndex("read", 0))?;

    let data = std::fs::read_to_string(path)
        .map_err(|e| handlebars::RenderErrorReason::Other(format!("read {path}: {e}")))?;

    out.write(&data)?;
    Ok(())
}

/// `{{copy "src" "dst"}}` — copy a file, creating destination directories.
/// Produces no output; a failed copy fails the render.
fn copy_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    _: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let src = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or(handlebars::RenderErrorReason::ParamNotFoundForIndex("copy", 0))?;
    let dst = h
        .param(1)
        .and_then(|v| v.value().as_str())
        .ok_or(handlebars::RenderErrorReason::ParamNotFoundForIndex("copy", 1))?;

    let copy = || -> std::io::Result<()> {
        if let Some(parent) = std::path::Path::new(dst).parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(src, dst)?;
        Ok(())
    };

    copy().map_err(|e| {
        handlebars::RenderErrorReason::Other(format!("copy {src} -> {dst}: {e}"))
    })?;

    Ok(())
}

/// Template renderer with the fixed helper library registered.
pub struct Renderer {
    engine: Handlebars<'static>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer").finish_non_exhaustive()
    }
}

impl Renderer {
    /// Build a renderer with all helpers registered and escaping disabled.
    #[must_use]
    pub fn new() -> Self {
        let mut engine = Handlebars::new();
        engine.register_escape_fn(no_escape);

        engine.register_helper("which", Box::new(which_helper));
        engine.register_helper("in_path", Box::new(in_path));
        engine.register_helper("not_in_path", Box::new(not_in_path));
        engine.register_helper("exists", Box::new(exists));
        engine.register_helper("size", Box::new(size));
        engine.register_helper("join", Box::new(join));
        engine.register_helper("resolve", Box::new(resolve));
        engine.register_helper("posix_path", Box::new(posix_path));
        engine.register_helper("windows_path", Box::new(windows_path));
        engine.register_helper("read", Box::new(read_helper));
        engine.register_helper("copy", Box::new(copy_helper));

        Self { engine }
    }

    /// Render one document against the resolved variable environment.
    ///
    /// # Errors
    ///
    /// Passes engine failures through unchanged, tagged with the source
    /// file for context.
    pub fn render(&self, template: &str, vars: &VarMap, file: &str) -> Result<String, RenderError> {
        let data = serde_json::to_value(vars).map_err(|e| RenderError {
            file: file.to_string(),
            source: handlebars::RenderErrorReason::Other(format!("encoding variables: {e}"))
                .into(),
        })?;

        self.engine
            .render_template(template, &data)
            .map_err(|source| RenderError {
                file: file.to_string(),
                source,
            })
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
