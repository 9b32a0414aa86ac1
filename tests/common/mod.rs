// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed config tree, a fixed fake host, and
// an options builder so each integration test can set up an isolated
// environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use shellgen::cli::GenerateOpts;
use shellgen::host::HostInfo;

/// A fixed host so variable resolution does not depend on the machine the
/// tests run on.
#[derive(Debug)]
pub struct TestHost;

impl HostInfo for TestHost {
    fn os(&self) -> String {
        "linux".to_string()
    }

    fn arch(&self) -> String {
        "x86_64".to_string()
    }

    fn platform(&self) -> Option<String> {
        Some("arch".to_string())
    }

    fn hostname(&self) -> Option<String> {
        Some("testbox".to_string())
    }

    fn user(&self) -> Option<String> {
        Some("tester".to_string())
    }

    fn env_home(&self) -> Option<String> {
        None
    }

    fn home(&self) -> Option<PathBuf> {
        Some(PathBuf::from("/home/tester"))
    }

    fn temp_dir(&self) -> PathBuf {
        PathBuf::from("/tmp")
    }
}

/// An isolated config tree backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct IntegrationTestContext {
    /// Temporary directory holding the config files.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Path to the config tree root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Write a config file under the root and return its path.
    pub fn write(&self, name: &str, data: &str) -> PathBuf {
        let path = self.root.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, data).expect("write config file");
        path
    }

    /// Default generate options targeting the given inputs.
    pub fn opts(&self, inputs: Vec<PathBuf>) -> GenerateOpts {
        GenerateOpts {
            inputs,
            shell: "bash".to_string(),
            value_files: Vec::new(),
            overrides: Vec::new(),
            instrument: false,
            timeout: 30,
            hash: false,
        }
    }
}
