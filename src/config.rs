//! Environment configuration.

use std::env;
use std::path::{Path, PathBuf};

use session_store::session_root;

pub const DEBUG_ENV: &str = "PI_SESSION_DEBUG";
pub const LOG_ENV: &str = "PI_SESSION_LOG";
pub const SESSION_DIR_ENV: &str = "PI_SESSION_DIR";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub debug: bool,
    pub log_filter: Option<String>,
    pub session_dir: Option<PathBuf>,
}

impl EnvConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration from any variable source. Blank values count
    /// as unset, and the debug flag is on only for exactly `1`.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            debug: value(DEBUG_ENV).is_some_and(|flag| flag == "1"),
            log_filter: value(LOG_ENV),
            session_dir: value(SESSION_DIR_ENV).map(PathBuf::from),
        }
    }

    /// Directory session files are created under: the configured override,
    /// else `<cwd>/.pi/sessions`.
    #[must_use]
    pub fn session_root(&self, cwd: &Path) -> PathBuf {
        self.session_dir
            .clone()
            .unwrap_or_else(|| session_root(cwd))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    use super::{EnvConfig, DEBUG_ENV, LOG_ENV, SESSION_DIR_ENV};

    fn config_from(vars: &[(&str, &str)]) -> EnvConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        EnvConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn unset_variables_give_defaults() {
        assert_eq!(config_from(&[]), EnvConfig::default());
    }

    #[test]
    fn variables_are_read() {
        let config = config_from(&[
            (DEBUG_ENV, "1"),
            (LOG_ENV, "pi_session=trace"),
            (SESSION_DIR_ENV, "/var/sessions"),
        ]);

        assert!(config.debug);
        assert_eq!(config.log_filter.as_deref(), Some("pi_session=trace"));
        assert_eq!(config.session_dir, Some(PathBuf::from("/var/sessions")));
    }

    #[test]
    fn debug_flag_requires_exactly_one() {
        assert!(!config_from(&[(DEBUG_ENV, "true")]).debug);
        assert!(!config_from(&[(DEBUG_ENV, "0")]).debug);
    }

    #[test]
    fn blank_strings_are_ignored() {
        let config = config_from(&[(LOG_ENV, "  "), (SESSION_DIR_ENV, "")]);

        assert!(config.log_filter.is_none());
        assert!(config.session_dir.is_none());
    }

    #[test]
    fn unrelated_variables_are_ignored() {
        assert_eq!(
            config_from(&[("PI_SESSION_UNKNOWN", "1"), ("RUST_LOG", "trace")]),
            EnvConfig::default()
        );
    }

    #[test]
    fn from_env_reads_the_process_environment() {
        assert_eq!(
            EnvConfig::from_env(),
            EnvConfig::from_lookup(|key| std::env::var(key).ok())
        );
    }

    #[test]
    fn session_root_prefers_override() {
        let cwd = Path::new("/work");
        assert_eq!(
            EnvConfig::default().session_root(cwd),
            Path::new("/work/.pi/sessions")
        );

        let config = EnvConfig {
            session_dir: Some(PathBuf::from("/var/sessions")),
            ..EnvConfig::default()
        };
        assert_eq!(config.session_root(cwd), Path::new("/var/sessions"));
    }
}
