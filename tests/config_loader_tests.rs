use outreach_connectors::config::{ConfigError, ConfigLoader};
use std::{
    env, fs,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    unsafe {
        env::remove_var("OUTREACH_PROFILE");
        env::remove_var("OUTREACH_LOG_LEVEL");
        env::remove_var("OUTREACH_SMARTLEAD_API_KEY");
        env::remove_var("OUTREACH_SMARTLEAD_BASE_URL");
        env::remove_var("OUTREACH_REQUEST_TIMEOUT_SECS");
        env::remove_var("OUTREACH_CONTINUE_ON_FAIL");
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    fs::write(dir.path().join(name), contents).unwrap();
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let cfg = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf())
        .load()
        .expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.smartlead_base_url, "https://server.smartlead.ai/api/v1");
    assert_eq!(cfg.anymailfinder_base_url, "https://api.anymailfinder.com");
    assert!(cfg.smartlead_api_key.is_none());
    assert!(!cfg.continue_on_fail);
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "OUTREACH_SMARTLEAD_BASE_URL=http://localhost:3000\nOUTREACH_LOG_LEVEL=warn\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test",
        "OUTREACH_SMARTLEAD_BASE_URL=http://localhost:5000\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test.local",
        "OUTREACH_SMARTLEAD_BASE_URL=http://localhost:6000\nOUTREACH_SMARTLEAD_API_KEY=sl-local\n",
    );
    // Select profile via .env.local before profile-specific files load.
    write_env_file(
        &temp_dir,
        ".env.local",
        "OUTREACH_PROFILE=test\nOUTREACH_SMARTLEAD_BASE_URL=http://localhost:4000\n",
    );

    let cfg = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf())
        .load()
        .expect("config loads");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.log_level, "warn");
    assert_eq!(cfg.smartlead_base_url, "http://localhost:6000");
    assert_eq!(cfg.smartlead_api_key.as_deref(), Some("sl-local"));
}

#[test]
fn process_env_overrides_files() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "OUTREACH_REQUEST_TIMEOUT_SECS=30\nOUTREACH_CONTINUE_ON_FAIL=false\n",
    );
    unsafe {
        env::set_var("OUTREACH_REQUEST_TIMEOUT_SECS", "90");
        env::set_var("OUTREACH_CONTINUE_ON_FAIL", "true");
    }

    let cfg = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf())
        .load()
        .expect("config loads");

    assert_eq!(cfg.request_timeout_secs, 90);
    assert!(cfg.continue_on_fail);
    clear_env();
}

#[test]
fn rejects_invalid_values() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "OUTREACH_REQUEST_TIMEOUT_SECS=soon\n");
    let err = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf())
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));

    write_env_file(&temp_dir, ".env", "OUTREACH_SMARTLEAD_BASE_URL=not-a-url\n");
    let err = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf())
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
}
