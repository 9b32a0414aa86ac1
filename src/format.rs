//! Shell-text formatting helpers.
//!
//! Reformatting is a best-effort service: [`shell`] either returns a cleaned
//! rendition of the source or an explicit error, and callers fall back to
//! the original text on failure. It never has to be correct for every shell
//! construct, only conservative enough to refuse what it cannot handle.

use thiserror::Error;

/// Reasons the conservative reformatter refuses a piece of shell source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A single or double quote is left open at end of input.
    #[error("unbalanced quoting in shell source")]
    UnbalancedQuote,

    /// A line break falls inside quoted text; reflowing lines would change
    /// the quoted content.
    #[error("line break inside quoted text")]
    NewlineInQuotes,

    /// A heredoc body is whitespace-sensitive and cannot be reflowed.
    #[error("heredoc in shell source")]
    Heredoc,

    /// Comments cannot be folded onto a single line.
    #[error("comment in single-line shell source")]
    CommentInSingleLine,
}

/// Tokens that continue a command onto the next line without a `;`.
const CONTINUATION_SUFFIXES: [&str; 9] = [
    "&&", "||", "|", ";", "{", "(", "then", "do", "else",
];

/// Reformat shell source.
///
/// With `single_line` set, the lines are folded into one command list joined
/// by `;` (or a space after connectives like `&&` and `then`). Otherwise the
/// source is re-indented with two spaces per block level, where blocks are
/// opened by trailing `{`, `then`, `do`, `(` and closed by leading `}`,
/// `fi`, `done`, `esac`, `)`.
///
/// # Errors
///
/// Fails on unbalanced quoting, line breaks inside quoted text, heredocs,
/// or comments in single-line mode. Callers are expected to fall back to
/// the unformatted source.
pub fn shell(src: &str, single_line: bool) -> Result<String, FormatError> {
    check_source(src)?;

    if single_line {
        fold_single_line(src)
    } else {
        Ok(reindent(src))
    }
}

/// Scan for constructs whose whitespace the reformatter must not touch:
/// unbalanced quotes, line breaks inside quoted text, and heredocs.
fn check_source(src: &str) -> Result<(), FormatError> {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut prev_lt = false;

    for c in src.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if !in_single => {
                escaped = true;
                prev_lt = false;
            }
            '\'' if !in_double => {
                in_single = !in_single;
                prev_lt = false;
            }
            '"' if !in_single => {
                in_double = !in_double;
                prev_lt = false;
            }
            '\n' if in_single || in_double => return Err(FormatError::NewlineInQuotes),
            '<' if !in_single && !in_double => {
                if prev_lt {
                    return Err(FormatError::Heredoc);
                }
                prev_lt = true;
            }
            _ => prev_lt = false,
        }
    }

    if in_single || in_double {
        Err(FormatError::UnbalancedQuote)
    } else {
        Ok(())
    }
}

fn fold_single_line(src: &str) -> Result<String, FormatError> {
    let mut out = String::new();
    let mut continued = false;

    for line in src.lines() {
        let mut line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            return Err(FormatError::CommentInSingleLine);
        }

        // A trailing backslash splices the next line on with a plain space.
        let continues_next = if let Some(stripped) = line.strip_suffix('\\') {
            line = stripped.trim_end();
            true
        } else {
            false
        };

        if !out.is_empty() {
            let prev_connects = continued
                || CONTINUATION_SUFFIXES
                    .iter()
                    .any(|suffix| out.ends_with(suffix));
            out.push_str(if prev_connects { " " } else { "; " });
        }

        out.push_str(line);
        continued = continues_next;
    }

    Ok(out)
}

/// Keywords that close a block when they start a line.
fn closes_block(line: &str) -> bool {
    ["}", "fi", "done", "esac", ")"]
        .iter()
        .any(|kw| line == *kw || line.starts_with(&format!("{kw} ")) || line.starts_with(&format!("{kw};")))
}

/// Keywords that open a block when they end a line.
fn opens_block(line: &str) -> bool {
    ["{", "then", "do", "(", "in"]
        .iter()
        .any(|kw| line == *kw || line.ends_with(&format!(" {kw}")))
}

/// Keywords that sit one level out but keep the block open (`else`, `elif`).
fn is_mid_block(line: &str) -> bool {
    line == "else" || line.starts_with("elif ") || line.ends_with(";;")
}

fn reindent(src: &str) -> String {
    let mut depth = 0usize;
    let mut out: Vec<String> = Vec::new();

    for raw in src.lines() {
        let line = raw.trim();
        if line.is_empty() {
            out.push(String::new());
            continue;
        }

        if closes_block(line) {
            depth = depth.saturating_sub(1);
        }

        let level = if is_mid_block(line) {
            depth.saturating_sub(1)
        } else {
            depth
        };

        out.push(format!("{}{line}", "  ".repeat(level)));

        if opens_block(line) {
            depth += 1;
        }
    }

    let mut text = out.join("\n");
    while text.ends_with('\n') {
        text.pop();
    }
    text
}

/// Replace backslashes with forward slashes.
#[must_use]
pub fn to_slash(path: &str) -> String {
    path.replace('\\', "/")
}

/// Convert a POSIX-form path like `/c/Users/x` to Windows form `C:/Users/x`.
///
/// Applies regardless of platform whenever a drive-letter pattern is
/// detected; other paths only get their slashes normalized.
#[must_use]
pub fn windows_path(path: &str) -> String {
    let path = to_slash(path);
    let bytes = path.as_bytes();

    if bytes.len() >= 3
        && bytes.first() == Some(&b'/')
        && bytes.get(2) == Some(&b'/')
        && bytes.get(1).is_some_and(u8::is_ascii_alphabetic)
    {
        let drive = path
            .get(1..2)
            .map_or_else(String::new, str::to_uppercase);
        let rest = path.get(2..).unwrap_or_default();
        return format!("{drive}:{rest}");
    }

    path
}

/// Convert a Windows-form path like `C:/Users/x` to POSIX form `/c/Users/x`.
///
/// Applies regardless of platform whenever a drive-letter pattern is
/// detected; other paths only get their slashes normalized.
#[must_use]
pub fn posix_path(path: &str) -> String {
    let path = to_slash(path);
    let bytes = path.as_bytes();

    if bytes.len() >= 3
        && bytes.get(1) == Some(&b':')
        && bytes.get(2) == Some(&b'/')
        && bytes.first().is_some_and(u8::is_ascii_alphabetic)
    {
        let drive = path
            .get(0..1)
            .map_or_else(String::new, str::to_lowercase);
        let rest = path.get(2..).unwrap_or_default();
        return format!("/{drive}{rest}");
    }

    path
}

/// Double-quote a value for shell emission, escaping `\`, `"`, `$`, and
/// backticks.
#[must_use]
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn single_line_joins_with_semicolons() {
        let out = shell("cd /tmp\nls -la\n", true).unwrap();
        assert_eq!(out, "cd /tmp; ls -la");
    }

    #[test]
    fn single_line_keeps_connectives_unterminated() {
        let out = shell("cd /tmp &&\nls\n", true).unwrap();
        assert_eq!(out, "cd /tmp && ls");
    }

    #[test]
    fn single_line_already_flat_is_unchanged() {
        let out = shell("echo hi", true).unwrap();
        assert_eq!(out, "echo hi");
    }

    #[test]
    fn single_line_rejects_comments() {
        let err = shell("# nope\nls\n", true).unwrap_err();
        assert_eq!(err, FormatError::CommentInSingleLine);
    }

    #[test]
    fn unbalanced_quote_is_an_error() {
        assert_eq!(
            shell("echo 'oops", true).unwrap_err(),
            FormatError::UnbalancedQuote
        );
        assert_eq!(
            shell("echo \"oops", false).unwrap_err(),
            FormatError::UnbalancedQuote
        );
    }

    #[test]
    fn newline_inside_quotes_is_an_error() {
        assert_eq!(
            shell("echo 'a\nb'", true).unwrap_err(),
            FormatError::NewlineInQuotes
        );
        assert_eq!(
            shell("echo \"a\nb\"", false).unwrap_err(),
            FormatError::NewlineInQuotes
        );
    }

    #[test]
    fn escaped_newline_is_not_a_quoted_break() {
        let out = shell("echo \"a \\\nb\"", true).unwrap();
        assert_eq!(out, "echo \"a b\"");
    }

    #[test]
    fn heredoc_is_refused() {
        assert_eq!(
            shell("cat <<EOF\n  indented data\nEOF", false).unwrap_err(),
            FormatError::Heredoc
        );
        assert_eq!(
            shell("cat <<-EOF\n\tdata\nEOF", true).unwrap_err(),
            FormatError::Heredoc
        );
    }

    #[test]
    fn quoted_heredoc_marker_is_allowed() {
        assert!(shell("echo '<<'", true).is_ok());
    }

    #[test]
    fn escaped_quote_is_balanced() {
        assert!(shell("echo \\\"hi", false).is_ok());
    }

    #[test]
    fn reindent_nested_if() {
        let src = "f() {\nif true; then\necho yes\nelse\necho no\nfi\n}";
        let out = shell(src, false).unwrap();
        assert_eq!(
            out,
            "f() {\n  if true; then\n    echo yes\n  else\n    echo no\n  fi\n}"
        );
    }

    #[test]
    fn reindent_keeps_blank_lines() {
        let out = shell("a\n\nb", false).unwrap();
        assert_eq!(out, "a\n\nb");
    }

    #[test]
    fn windows_path_converts_drive_form() {
        assert_eq!(windows_path("/c/Users/dev"), "C:/Users/dev");
        assert_eq!(windows_path("C:\\Users\\dev"), "C:/Users/dev");
        assert_eq!(windows_path("/usr/bin"), "/usr/bin");
    }

    #[test]
    fn posix_path_converts_drive_form() {
        assert_eq!(posix_path("C:/Users/dev"), "/c/Users/dev");
        assert_eq!(posix_path("D:\\data"), "/d/data");
        assert_eq!(posix_path("/usr/bin"), "/usr/bin");
    }

    #[test]
    fn path_forms_round_trip() {
        assert_eq!(windows_path(&posix_path("C:/x/y")), "C:/x/y");
        assert_eq!(posix_path(&windows_path("/c/x/y")), "/c/x/y");
    }

    #[test]
    fn quote_escapes_shell_metacharacters() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("a \"b\" $c"), "\"a \\\"b\\\" \\$c\"");
        assert_eq!(quote("back`tick"), "\"back\\`tick\"");
    }
}
