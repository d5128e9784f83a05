use hunt_portal::{
    AppConfig,
    config::{ConfigError, Env},
};
use serial_test::serial;
use std::{env, panic};

const CONFIG_VARS: [&str; 3] = ["APP_ENV", "BIND_ADDR", "TOAST_TTL_MS"];

// --- Setup/Teardown Utilities ---

/// Runs `test` with the given variables set (`None` removes one), then restores the
/// previous environment even if the test panicked.
fn run_with_env<T, R>(vars: &[(&'static str, Option<&str>)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            if let Some(value) = value {
                env::set_var(key, value);
            }
        }
    }

    let result = panic::catch_unwind(test);

    unsafe {
        for (key, original) in originals {
            match original {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(&[("APP_ENV", Some("local"))], AppConfig::load).unwrap();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.toast_ttl_ms, 3000);
}

#[test]
#[serial]
fn test_app_config_unset_env_is_local() {
    let config = run_with_env(&[], AppConfig::load).unwrap();
    assert_eq!(config.env, Env::Local);
}

#[test]
#[serial]
fn test_app_config_production_requires_bind_addr() {
    let result = run_with_env(&[("APP_ENV", Some("production"))], AppConfig::load);
    assert_eq!(result.unwrap_err(), ConfigError::Missing("BIND_ADDR"));
}

#[test]
#[serial]
fn test_app_config_production_reads_settings() {
    let config = run_with_env(
        &[
            ("APP_ENV", Some("production")),
            ("BIND_ADDR", Some("10.0.0.5:8080")),
            ("TOAST_TTL_MS", Some(" 4500 ")),
        ],
        AppConfig::load,
    )
    .unwrap();

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.bind_addr, "10.0.0.5:8080");
    assert_eq!(config.toast_ttl_ms, 4500);
}

#[test]
#[serial]
fn test_app_config_rejects_invalid_toast_ttl() {
    let result = run_with_env(&[("TOAST_TTL_MS", Some("soon"))], AppConfig::load);

    assert_eq!(
        result.unwrap_err(),
        ConfigError::InvalidNumber {
            var: "TOAST_TTL_MS",
            value: "soon".to_string(),
        }
    );
}

#[test]
fn test_app_config_default_is_local_and_ephemeral() {
    let config = AppConfig::default();
    assert_eq!(config.env, Env::Local);
    assert_eq!(config.bind_addr, "127.0.0.1:0");
}
