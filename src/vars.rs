//! Variable environment: layered key/value resolution for one input file.
//!
//! Variables come from four layers, merged in a fixed precedence order
//! (later layers win on key collision, each layer applied atomically):
//!
//! 1. defaults derived from the host ([`defaults`])
//! 2. values declared in the file's header document
//! 3. value-files given on the command line ([`load_files`])
//! 4. `key=value` command-line overrides ([`parse_args`])

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ResolutionError;
use crate::format;
use crate::host::HostInfo;

/// A single substitution value: a tagged scalar with a total stringification
/// rule for shell emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating-point scalar.
    Float(f64),
    /// Plain string.
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Resolved set of substitution variables for one input file.
///
/// Backed by a sorted map so exports and digests are deterministic.
pub type VarMap = BTreeMap<String, Value>;

/// Build the default variable layer from host information.
///
/// Best-effort entries (`HOSTNAME`, `PLATFORM`) are omitted when the query
/// fails. `HOME` follows a fallback chain: the host's environment
/// declaration, then its user-database lookup, then empty. Directory-valued
/// entries use forward slashes on every platform.
#[must_use]
pub fn defaults(shell: &str, current_file: Option<&Path>, host: &dyn HostInfo) -> VarMap {
    let mut vars = VarMap::new();

    vars.insert("OS".to_string(), host.os().into());
    vars.insert("ARCHITECTURE".to_string(), host.arch().into());

    if let Some(platform) = host.platform() {
        vars.insert("PLATFORM".to_string(), platform.into());
    }

    if let Some(hostname) = host.hostname() {
        vars.insert("HOSTNAME".to_string(), hostname.into());
    }

    vars.insert(
        "USER".to_string(),
        host.user().unwrap_or_default().into(),
    );

    let home = home_dir(host);
    vars.insert("HOME".to_string(), home.clone().into());

    if !home.is_empty() {
        vars.insert(
            "CONFIG_DIR".to_string(),
            format!("{home}/.config").into(),
        );
        vars.insert("CACHE_DIR".to_string(), format!("{home}/.cache").into());
    }

    vars.insert(
        "TMP_DIR".to_string(),
        format::to_slash(&host.temp_dir().to_string_lossy()).into(),
    );

    vars.insert("SHELL".to_string(), shell.into());

    let binary_ext = if host.os() == "windows" { ".exe" } else { "" };
    vars.insert("BINARY_EXT".to_string(), binary_ext.into());

    if let Some(file) = current_file {
        vars.insert(
            "FILE".to_string(),
            format::to_slash(&file.to_string_lossy()).into(),
        );
        if let Some(dir) = file.parent() {
            vars.insert(
                "FILE_DIR".to_string(),
                format::to_slash(&dir.to_string_lossy()).into(),
            );
        }
    }

    vars
}

/// Home directory with the documented fallback chain:
/// environment declaration → user-database lookup → empty string.
fn home_dir(host: &dyn HostInfo) -> String {
    if let Some(home) = host.env_home().filter(|h| !h.is_empty()) {
        return format::to_slash(&home);
    }

    host.home()
        .map_or_else(String::new, |p| format::to_slash(&p.to_string_lossy()))
}

/// Load and merge variables from the given value-files, left to right.
///
/// # Errors
///
/// A missing or malformed file fails the whole call; there is no partial
/// success.
pub fn load_files(paths: &[std::path::PathBuf]) -> Result<VarMap, ResolutionError> {
    let mut vars = VarMap::new();

    for path in paths {
        let data =
            std::fs::read_to_string(path).map_err(|source| ResolutionError::ValuesFileIo {
                path: path.display().to_string(),
                source,
            })?;

        let values: VarMap =
            serde_yaml::from_str(&data).map_err(|source| ResolutionError::ValuesFileParse {
                path: path.display().to_string(),
                source,
            })?;

        vars.extend(values);
    }

    Ok(vars)
}

/// Parse `key=value` override tokens into a variable map.
///
/// # Errors
///
/// Malformed tokens (no `=`, or an empty key) are collected and reported
/// together in a single [`ResolutionError::MalformedArgs`] rather than
/// short-circuiting at the first one.
pub fn parse_args(args: &[String]) -> Result<VarMap, ResolutionError> {
    let mut issues = Vec::new();
    let mut vars = VarMap::new();

    for token in args {
        let Some((key, value)) = token.split_once('=') else {
            issues.push(format!("missing value for {token:?}"));
            continue;
        };

        if key.is_empty() {
            issues.push(format!("missing key for {token:?}"));
            continue;
        }

        vars.insert(key.to_string(), value.into());
    }

    if issues.is_empty() {
        Ok(vars)
    } else {
        Err(ResolutionError::MalformedArgs { issues })
    }
}

/// Overlay `overlay` onto `base`; `overlay` wins on key collision.
#[must_use]
pub fn merge(mut base: VarMap, overlay: VarMap) -> VarMap {
    base.extend(overlay);
    base
}

/// Render the variables as a sorted `# KEY=VALUE` comment block.
#[must_use]
pub fn export(vars: &VarMap) -> String {
    vars.iter()
        .map(|(k, v)| format!("# {k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::host::FakeHost;
    use std::path::PathBuf;

    fn var(vars: &VarMap, key: &str) -> String {
        vars.get(key).expect(key).to_string()
    }

    #[test]
    fn defaults_include_os_and_shell() {
        let host = FakeHost::default();
        let vars = defaults("zsh", None, &host);
        assert_eq!(var(&vars, "OS"), "linux");
        assert_eq!(var(&vars, "SHELL"), "zsh");
        assert_eq!(var(&vars, "ARCHITECTURE"), "x86_64");
    }

    #[test]
    fn defaults_omit_hostname_when_unavailable() {
        let host = FakeHost {
            hostname: None,
            platform: None,
            ..FakeHost::default()
        };
        let vars = defaults("bash", None, &host);
        assert!(!vars.contains_key("HOSTNAME"));
        assert!(!vars.contains_key("PLATFORM"));
    }

    #[test]
    fn defaults_binary_ext_on_windows() {
        let host = FakeHost {
            os: "windows".to_string(),
            ..FakeHost::default()
        };
        let vars = defaults("bash", None, &host);
        assert_eq!(var(&vars, "BINARY_EXT"), ".exe");
    }

    #[test]
    fn defaults_binary_ext_empty_elsewhere() {
        let host = FakeHost::default();
        let vars = defaults("bash", None, &host);
        assert_eq!(var(&vars, "BINARY_EXT"), "");
    }

    #[test]
    fn home_prefers_environment_declaration() {
        let host = FakeHost {
            env_home: Some("C:\\Users\\tester".to_string()),
            ..FakeHost::default()
        };
        let vars = defaults("bash", None, &host);
        assert_eq!(var(&vars, "HOME"), "C:/Users/tester");
    }

    #[test]
    fn home_falls_back_to_host_lookup() {
        let host = FakeHost::default();
        let vars = defaults("bash", None, &host);
        assert_eq!(var(&vars, "HOME"), "/home/tester");
        assert_eq!(var(&vars, "CONFIG_DIR"), "/home/tester/.config");
        assert_eq!(var(&vars, "CACHE_DIR"), "/home/tester/.cache");
    }

    #[test]
    fn home_empty_when_host_knows_nothing() {
        let host = FakeHost {
            home: None,
            ..FakeHost::default()
        };
        let vars = defaults("bash", None, &host);
        assert_eq!(var(&vars, "HOME"), "");
        assert!(!vars.contains_key("CONFIG_DIR"));
        assert!(!vars.contains_key("CACHE_DIR"));
    }

    #[test]
    fn defaults_include_file_and_dir() {
        let host = FakeHost::default();
        let file = PathBuf::from("/conf/shell/aliases.yaml");
        let vars = defaults("bash", Some(&file), &host);
        assert_eq!(var(&vars, "FILE"), "/conf/shell/aliases.yaml");
        assert_eq!(var(&vars, "FILE_DIR"), "/conf/shell");
    }

    #[test]
    fn merge_later_layer_wins() {
        let mut a = VarMap::new();
        a.insert("A".to_string(), "1".into());
        a.insert("B".to_string(), "1".into());
        let mut b = VarMap::new();
        b.insert("B".to_string(), "2".into());

        let merged = merge(a, b);
        assert_eq!(merged["A"], Value::from("1"));
        assert_eq!(merged["B"], Value::from("2"));
    }

    #[test]
    fn four_layers_resolve_to_latest() {
        let mut layers: Vec<VarMap> = Vec::new();
        for i in 1..=4 {
            let mut layer = VarMap::new();
            layer.insert("KEY".to_string(), i.to_string().into());
            layers.push(layer);
        }
        let resolved = layers.into_iter().fold(VarMap::new(), merge);
        assert_eq!(resolved["KEY"], Value::from("4"));
    }

    #[test]
    fn parse_args_valid_tokens() {
        let args = vec!["FOO=bar".to_string(), "BAZ=qux=quux".to_string()];
        let vars = parse_args(&args).unwrap();
        assert_eq!(vars["FOO"], Value::from("bar"));
        // Only the first '=' splits key from value.
        assert_eq!(vars["BAZ"], Value::from("qux=quux"));
    }

    #[test]
    fn parse_args_collects_all_malformed_tokens() {
        let args = vec![
            "FOO".to_string(),
            "=bar".to_string(),
            "GOOD=1".to_string(),
        ];
        let err = parse_args(&args).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("missing value for \"FOO\""));
        assert!(msg.contains("missing key for \"=bar\""));
    }

    #[test]
    fn load_files_merge_left_to_right() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.yaml");
        let second = dir.path().join("b.yaml");
        std::fs::write(&first, "A: 1\nB: first\n").unwrap();
        std::fs::write(&second, "B: second\n").unwrap();

        let vars = load_files(&[first, second]).unwrap();
        assert_eq!(vars["A"], Value::Int(1));
        assert_eq!(vars["B"], Value::from("second"));
    }

    #[test]
    fn load_files_missing_file_is_fatal() {
        let err = load_files(&[PathBuf::from("/no/such/values.yaml")]).unwrap_err();
        assert!(err.to_string().contains("loading values file"));
    }

    #[test]
    fn load_files_malformed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "not: [valid\n").unwrap();
        let err = load_files(&[path]).unwrap_err();
        assert!(err.to_string().contains("parsing values file"));
    }

    #[test]
    fn export_is_sorted_comment_block() {
        let mut vars = VarMap::new();
        vars.insert("ZULU".to_string(), "z".into());
        vars.insert("ALPHA".to_string(), Value::Int(7));
        assert_eq!(export(&vars), "# ALPHA=7\n# ZULU=z");
    }

    #[test]
    fn value_display_is_total() {
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::from("hi").to_string(), "hi");
    }

    #[test]
    fn value_deserializes_tagged_scalars() {
        let vars: VarMap = serde_yaml::from_str("A: true\nB: 2\nC: hi\n").unwrap();
        assert_eq!(vars["A"], Value::Bool(true));
        assert_eq!(vars["B"], Value::Int(2));
        assert_eq!(vars["C"], Value::from("hi"));
    }
}
