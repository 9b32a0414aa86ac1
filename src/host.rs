//! Read-only host information behind an injectable trait.
//!
//! The default variable layer draws on process environment and platform
//! queries. Putting those behind [`HostInfo`] keeps the variable resolution
//! logic testable with fixed, fake host data instead of whatever machine the
//! tests happen to run on.

use std::fmt;
use std::path::PathBuf;

/// Read-only capability for querying the machine the generator runs on.
///
/// All queries are best-effort: a `None` means the value could not be
/// determined and the corresponding default variable is omitted or falls
/// back along a defined chain.
pub trait HostInfo: fmt::Debug {
    /// Operating system identifier (e.g. `"linux"`, `"windows"`, `"macos"`).
    fn os(&self) -> String;

    /// CPU architecture identifier (e.g. `"x86_64"`, `"aarch64"`).
    fn arch(&self) -> String;

    /// Platform/distribution name, when one can be determined.
    fn platform(&self) -> Option<String>;

    /// Host name, when one can be determined.
    fn hostname(&self) -> Option<String>;

    /// Name of the current user, when one can be determined.
    fn user(&self) -> Option<String>;

    /// Home directory as declared by the environment (`HOME` /
    /// `USERPROFILE`).
    ///
    /// Takes precedence over [`HostInfo::home`] in the default variable
    /// layer.
    fn env_home(&self) -> Option<String>;

    /// Home directory from a user-database style lookup.
    ///
    /// This is the *fallback* source when [`HostInfo::env_home`] reports
    /// nothing.
    fn home(&self) -> Option<PathBuf>;

    /// Directory for temporary files.
    fn temp_dir(&self) -> PathBuf;
}

/// [`HostInfo`] implementation backed by the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostInfo for SystemHost {
    fn os(&self) -> String {
        std::env::consts::OS.to_string()
    }

    fn arch(&self) -> String {
        std::env::consts::ARCH.to_string()
    }

    fn platform(&self) -> Option<String> {
        // Linux: distribution ID from os-release. Elsewhere the OS name is
        // the best identifier available without extra probing.
        if cfg!(target_os = "linux") {
            let data = std::fs::read_to_string("/etc/os-release").ok()?;
            for line in data.lines() {
                if let Some(id) = line.strip_prefix("ID=") {
                    return Some(id.trim_matches('"').to_string());
                }
            }
            None
        } else {
            Some(std::env::consts::OS.to_string())
        }
    }

    fn hostname(&self) -> Option<String> {
        for var in ["HOSTNAME", "COMPUTERNAME"] {
            if let Ok(name) = std::env::var(var)
                && !name.is_empty()
            {
                return Some(name);
            }
        }
        std::fs::read_to_string("/etc/hostname")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn user(&self) -> Option<String> {
        for var in ["USER", "USERNAME"] {
            if let Ok(name) = std::env::var(var)
                && !name.is_empty()
            {
                return Some(name);
            }
        }
        None
    }

    fn env_home(&self) -> Option<String> {
        for var in ["HOME", "USERPROFILE"] {
            if let Ok(home) = std::env::var(var)
                && !home.is_empty()
            {
                return Some(home);
            }
        }
        None
    }

    fn home(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    fn temp_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }
}

/// Fixed host data for unit tests.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct FakeHost {
    pub os: String,
    pub arch: String,
    pub platform: Option<String>,
    pub hostname: Option<String>,
    pub user: Option<String>,
    pub env_home: Option<String>,
    pub home: Option<PathBuf>,
}

#[cfg(test)]
impl Default for FakeHost {
    fn default() -> Self {
        Self {
            os: "linux".to_string(),
            arch: "x86_64".to_string(),
            platform: Some("arch".to_string()),
            hostname: Some("testbox".to_string()),
            user: Some("tester".to_string()),
            env_home: None,
            home: Some(PathBuf::from("/home/tester")),
        }
    }
}

#[cfg(test)]
impl HostInfo for FakeHost {
    fn os(&self) -> String {
        self.os.clone()
    }

    fn arch(&self) -> String {
        self.arch.clone()
    }

    fn platform(&self) -> Option<String> {
        self.platform.clone()
    }

    fn hostname(&self) -> Option<String> {
        self.hostname.clone()
    }

    fn user(&self) -> Option<String> {
        self.user.clone()
    }

    fn env_home(&self) -> Option<String> {
        self.env_home.clone()
    }

    fn home(&self) -> Option<PathBuf> {
        self.home.clone()
    }

    fn temp_dir(&self) -> PathBuf {
        PathBuf::from("/tmp")
    }
}
