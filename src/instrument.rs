//! Execution-time instrumentation for generated scripts.
//!
//! The wrapper emits shell statements, not measurements: timing happens when
//! the generated script runs, not when it is generated. Each wrapped command
//! captures start/end epoch-milliseconds, computes the elapsed time, and
//! appends a `"NAME elapsed"` pair to a file-scoped accumulator array. The
//! footer sorts and totals those pairs with `awk` when it is available.

use std::fmt::Write as _;

/// Timing-capture wrapper for one generated file.
#[derive(Debug, Clone)]
pub struct Instrumentation {
    /// Name of the file being instrumented, for the summary banner.
    name: String,
    /// Shell array variable accumulating `(name, elapsed)` pairs.
    variable: String,
    /// Whether instrumentation statements are emitted at all.
    enabled: bool,
}

impl Instrumentation {
    /// Create instrumentation scoped to the given source file identity.
    ///
    /// The accumulator array name is derived deterministically from the
    /// file identity so two files never share state when sourced together.
    #[must_use]
    pub fn new(file: &str, enabled: bool) -> Self {
        Self {
            name: file.to_string(),
            variable: format!("__shellgen_instrumentation_{}", to_shell_var(file)),
            enabled,
        }
    }

    /// Declaration block for the accumulator array; empty when disabled.
    #[must_use]
    pub fn header(&self) -> String {
        if !self.enabled {
            return String::new();
        }

        format!(
            "# Instrumentation\n\
             # ------------------------------------------------\n\
             {}=()\n\
             # ------------------------------------------------\n",
            self.variable
        )
    }

    /// Wrap one command's emitted text with timing capture statements.
    ///
    /// When disabled, returns the command unchanged.
    #[must_use]
    pub fn wrap(&self, name: &str, command: &str) -> String {
        if !self.enabled {
            return command.to_string();
        }

        let var = to_shell_var(name);
        let start = format!("__shellgen_{var}_start");
        let end = format!("__shellgen_{var}_end");
        let elapsed = format!("__shellgen_{var}_elapsed");

        let mut out = String::new();
        let _ = writeln!(out);
        let _ = writeln!(out, "# Instrumentation for: {name}");
        let _ = writeln!(out, "# ------------------------------------------------");
        let _ = writeln!(out);
        let _ = writeln!(out, "{start}=$(date +%s%3N)");
        let _ = writeln!(out);
        let _ = writeln!(out, "# Command to measure");
        let _ = writeln!(out, "# ------------------------------------------------");
        let _ = writeln!(out, "{}", command.trim_end_matches('\n'));
        let _ = writeln!(out, "# ------------------------------------------------");
        let _ = writeln!(out);
        let _ = writeln!(out, "{end}=$(date +%s%3N)");
        let _ = writeln!(out, "{elapsed}=$(({end} - {start}))");
        let _ = writeln!(out, "{}+=(\"{var} ${{{elapsed}}}\")", self.variable);
        let _ = writeln!(out);

        out
    }

    /// End-of-file summary block; empty when disabled.
    ///
    /// Sorts the accumulated pairs by elapsed time descending (name
    /// ascending on ties) and prints a total, falling back to the raw pairs
    /// when `awk` is unavailable at script-execution time.
    #[must_use]
    pub fn footer(&self) -> String {
        if !self.enabled {
            return String::new();
        }

        let var = &self.variable;
        format!(
            "echo '************************************************'\n\
             echo \"[shellgen instrumentation] summary for {}:\"\n\
             if command -v awk >/dev/null 2>&1; then\n\
             \x20\x20LC_ALL=C printf '%s\\n' \"${{{var}[@]}}\" \\\n\
             \x20\x20| sort -k2,2nr -k1,1 \\\n\
             \x20\x20| awk '{{\n\
             \x20\x20\x20\x20\x20\x20printf(\"(%4d ms) %s\\n\", $2+0, $1)\n\
             \x20\x20\x20\x20\x20\x20total += $2\n\
             \x20\x20\x20\x20}}\n\
             \x20\x20\x20\x20END {{\n\
             \x20\x20\x20\x20\x20\x20printf(\"\\nTotal: %d ms\\n\", total)\n\
             \x20\x20\x20\x20}}'\n\
             else\n\
             \x20\x20printf '%s\\n' \"${{{var}[@]}}\"\n\
             fi\n\
             echo '************************************************'\n",
            self.name
        )
    }
}

/// Convert an arbitrary string into a valid shell variable name.
fn to_shell_var(s: &str) -> String {
    let mut safe: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    let starts_ok = safe
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok {
        safe.insert(0, '_');
    }

    safe
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn disabled_instrumentation_is_invisible() {
        let inst = Instrumentation::new("conf/aliases.yaml", false);
        assert_eq!(inst.header(), "");
        assert_eq!(inst.footer(), "");
        assert_eq!(inst.wrap("ll", "alias ll='ls -la'"), "alias ll='ls -la'");
    }

    #[test]
    fn header_declares_empty_array() {
        let inst = Instrumentation::new("conf/aliases.yaml", true);
        assert!(
            inst.header()
                .contains("__shellgen_instrumentation_conf_aliases_yaml=()")
        );
    }

    #[test]
    fn wrap_emits_start_end_elapsed_and_append() {
        let inst = Instrumentation::new("f.yaml", true);
        let out = inst.wrap("ll", "alias ll='ls -la'");
        assert!(out.contains("__shellgen_ll_start=$(date +%s%3N)"));
        assert!(out.contains("__shellgen_ll_end=$(date +%s%3N)"));
        assert!(out.contains("__shellgen_ll_elapsed=$((__shellgen_ll_end - __shellgen_ll_start))"));
        assert!(out.contains("__shellgen_instrumentation_f_yaml+=(\"ll ${__shellgen_ll_elapsed}\")"));
        assert!(out.contains("alias ll='ls -la'"));
    }

    #[test]
    fn footer_sorts_and_totals_with_awk_fallback() {
        let inst = Instrumentation::new("f.yaml", true);
        let footer = inst.footer();
        assert!(footer.contains("command -v awk"));
        assert!(footer.contains("sort -k2,2nr -k1,1"));
        assert!(footer.contains("Total: %d ms"));
        assert!(footer.contains("else"));
    }

    #[test]
    fn to_shell_var_sanitizes() {
        assert_eq!(to_shell_var("conf/a-b.yaml"), "conf_a_b_yaml");
        assert_eq!(to_shell_var("9lives"), "_9lives");
        assert_eq!(to_shell_var("_ok"), "_ok");
    }

    #[test]
    fn distinct_files_get_distinct_arrays() {
        let a = Instrumentation::new("a.yaml", true);
        let b = Instrumentation::new("b.yaml", true);
        assert_ne!(a.header(), b.header());
    }
}
