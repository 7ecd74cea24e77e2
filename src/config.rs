use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::{NimError, Result};

pub const DEFAULT_NIMINFO_PATH: &str = "/etc/niminfo";
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_PARALLELISM: usize = 16;

/// Locations of the AIX commands the collector shells out to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommandPaths {
    pub lsnim: String,
    pub c_rsh: String,
    pub oslevel: String,
}

impl Default for CommandPaths {
    fn default() -> Self {
        Self {
            lsnim: "/usr/sbin/lsnim".to_string(),
            c_rsh: "/usr/lpp/bos.sysmgt/nim/methods/c_rsh".to_string(),
            oslevel: "/usr/bin/oslevel".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Local niminfo file describing this machine's NIM role
    pub niminfo_path: PathBuf,
    /// niminfo path read on each client and VIOS
    pub remote_niminfo_path: String,
    pub remote_timeout_secs: u64,
    /// Local `lsnim` and `oslevel` calls run unbounded unless set
    pub local_timeout_secs: Option<u64>,
    pub max_parallelism: usize,
    pub commands: CommandPaths,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            niminfo_path: PathBuf::from(DEFAULT_NIMINFO_PATH),
            remote_niminfo_path: DEFAULT_NIMINFO_PATH.to_string(),
            remote_timeout_secs: DEFAULT_REMOTE_TIMEOUT_SECS,
            local_timeout_secs: None,
            max_parallelism: DEFAULT_MAX_PARALLELISM,
            commands: CommandPaths::default(),
        }
    }
}

impl Settings {
    pub fn from_yaml(text: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|source| NimError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings from `path`, or from the per-user default location when
    /// no path is given. A missing default file yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_settings_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        match fs::read_to_string(&path) {
            Ok(text) => {
                debug!(path = %path.display(), "loaded settings file");
                Self::from_yaml(&text, &path)
            }
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(NimError::SettingsIo { path, source }),
        }
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }

    pub fn local_timeout(&self) -> Option<Duration> {
        self.local_timeout_secs.map(Duration::from_secs)
    }

    /// Tasks allowed to run at once, within what a [Semaphore] can hold.
    pub fn parallelism(&self) -> usize {
        self.max_parallelism.clamp(1, Semaphore::MAX_PERMITS)
    }
}

pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nim-inventory").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nim::tasks::BoundedTaskSet;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "\
remote_timeout_secs: 10
commands:
  c_rsh: /opt/bin/c_rsh
";
        let settings = Settings::from_yaml(yaml, Path::new("config.yaml")).unwrap();
        assert_eq!(settings.remote_timeout(), Duration::from_secs(10));
        assert_eq!(settings.commands.c_rsh, "/opt/bin/c_rsh");
        assert_eq!(settings.commands.lsnim, "/usr/sbin/lsnim");
        assert_eq!(settings.niminfo_path, PathBuf::from("/etc/niminfo"));
        assert_eq!(settings.local_timeout(), None);
        assert_eq!(settings.parallelism(), DEFAULT_MAX_PARALLELISM);
    }

    #[test]
    fn test_invalid_yaml_is_reported() {
        let err = Settings::from_yaml("max_parallelism: lots", Path::new("bad.yaml")).unwrap_err();
        assert!(matches!(err, NimError::Settings { .. }));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(matches!(err, NimError::SettingsIo { .. }));
    }

    #[test]
    fn test_zero_parallelism_is_clamped() {
        let settings = Settings {
            max_parallelism: 0,
            ..Settings::default()
        };
        assert_eq!(settings.parallelism(), 1);
    }

    #[test]
    fn test_huge_parallelism_is_clamped() {
        let settings = Settings::from_yaml(&format!("max_parallelism: {}", usize::MAX), Path::new("config.yaml")).unwrap();
        assert_eq!(settings.parallelism(), Semaphore::MAX_PERMITS);

        // must not panic in Semaphore::new
        let set: BoundedTaskSet<()> = BoundedTaskSet::new(settings.parallelism());
        assert_eq!(set.len(), 0);
    }
}
