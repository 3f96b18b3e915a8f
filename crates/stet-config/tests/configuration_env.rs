//! Loading configuration from the real process environment.

use std::fs;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use stet_config::{
    CONFIG_PATH_ENV, Config, ConfigError, LOG_FILTER_ENV, LOG_FORMAT_ENV, LogFormat, PROMOTE_ENV,
    SOURCE_ROOT_ENV,
};
use tempfile::TempDir;

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const VARIABLES: [&str; 5] = [
    PROMOTE_ENV,
    SOURCE_ROOT_ENV,
    LOG_FILTER_ENV,
    LOG_FORMAT_ENV,
    CONFIG_PATH_ENV,
];

/// Sets variables for the lifetime of the guard and restores them on drop.
struct EnvOverride {
    previous: Vec<(&'static str, Option<String>)>,
    guard: Option<MutexGuard<'static, ()>>,
}

impl EnvOverride {
    fn set(pairs: &[(&'static str, &str)]) -> Self {
        let guard = ENV_MUTEX.lock().expect("env mutex poisoned");
        let previous = VARIABLES
            .iter()
            .map(|key| (*key, std::env::var(key).ok()))
            .collect();
        for key in VARIABLES {
            // Environment mutation is unsafe in edition 2024; the mutex keeps
            // tests in this binary from racing on it.
            unsafe { std::env::remove_var(key) };
        }
        for (key, value) in pairs {
            unsafe { std::env::set_var(key, value) };
        }
        Self {
            previous,
            guard: Some(guard),
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            match value {
                Some(value) => unsafe { std::env::set_var(key, value) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
        drop(self.guard.take());
    }
}

#[test]
fn discover_reads_process_variables() {
    let _env = EnvOverride::set(&[
        (PROMOTE_ENV, "1"),
        (SOURCE_ROOT_ENV, "/work/project"),
        (LOG_FILTER_ENV, "stet=debug"),
        (LOG_FORMAT_ENV, "json"),
    ]);
    let config = Config::discover().expect("config");
    assert!(config.promote);
    assert_eq!(
        config.source_root.as_ref().map(|root| root.as_str()),
        Some("/work/project")
    );
    assert_eq!(config.log_filter(), "stet=debug");
    assert_eq!(config.log_format, LogFormat::Json);
}

#[test]
fn discover_without_variables_is_default() {
    let _env = EnvOverride::set(&[]);
    assert_eq!(Config::discover().expect("config"), Config::default());
}

#[test]
fn blank_promote_variable_is_off() {
    let _env = EnvOverride::set(&[(PROMOTE_ENV, "")]);
    assert!(!Config::discover().expect("config").promote);
}

#[test]
fn environment_overrides_configuration_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("stet.toml");
    fs::write(&path, "promote = true\nlog_format = \"json\"\n").expect("write config");
    let path_text = path.to_str().expect("utf-8 temp path");
    let _env = EnvOverride::set(&[(CONFIG_PATH_ENV, path_text), (PROMOTE_ENV, "off")]);

    let config = Config::discover().expect("config");
    assert!(!config.promote);
    assert_eq!(config.log_format, LogFormat::Json);
}

#[test]
fn discover_fails_fast_on_bad_values() {
    let _env = EnvOverride::set(&[(PROMOTE_ENV, "sometimes")]);
    let err = Config::discover().expect_err("invalid switch");
    assert!(matches!(err, ConfigError::Load { .. }));
}
