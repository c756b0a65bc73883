// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use ticketpad_tui::{DeleteModifier, UiOptions};

const CONFIG_VERSION: i64 = 1;
const DEFAULT_COPIED_DURATION: &str = "2s";
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_FILE_NAME: &str = "ticketpad.log";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub show_history: Option<bool>,
    pub copied_duration: Option<String>,
    pub delete_modifier: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            show_history: Some(false),
            copied_duration: Some(DEFAULT_COPIED_DURATION.to_owned()),
            delete_modifier: Some(DeleteModifier::default().as_str().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("TICKETPAD_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set TICKETPAD_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(ticketpad_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and keep values under [storage], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.storage.db_path {
            ticketpad_db::validate_db_path(db_path)?;
        }

        if let Some(raw) = &self.ui.copied_duration {
            let parsed = parse_duration(raw)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "ui.copied_duration in {} must be positive, got {}",
                    path.display(),
                    raw
                );
            }
        }

        if let Some(raw) = &self.ui.delete_modifier
            && DeleteModifier::parse(raw).is_none()
        {
            bail!(
                "ui.delete_modifier in {} must be one of ctrl, alt, shift; got {:?}",
                path.display(),
                raw
            );
        }

        if let Some(level) = &self.log.level {
            crate::logging::parse_filter(level)
                .with_context(|| format!("log.level in {}", path.display()))?;
        }

        if let Some(file) = &self.log.file
            && file.trim().is_empty()
        {
            bail!(
                "log.file in {} must not be empty; remove it to use the default",
                path.display()
            );
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => ticketpad_db::default_db_path(),
        }
    }

    pub fn show_history(&self) -> bool {
        self.ui.show_history.unwrap_or(false)
    }

    pub fn copied_duration(&self) -> Result<Duration> {
        parse_duration(
            self.ui
                .copied_duration
                .as_deref()
                .unwrap_or(DEFAULT_COPIED_DURATION),
        )
    }

    pub fn delete_modifier(&self) -> Result<DeleteModifier> {
        match self.ui.delete_modifier.as_deref() {
            None => Ok(DeleteModifier::default()),
            Some(raw) => DeleteModifier::parse(raw)
                .ok_or_else(|| anyhow!("invalid delete modifier {raw:?}; use ctrl, alt, or shift")),
        }
    }

    pub fn ui_options(&self) -> Result<UiOptions> {
        Ok(UiOptions {
            copied_duration: self.copied_duration()?,
            delete_modifier: self.delete_modifier()?,
        })
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        match &self.log.file {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(ticketpad_db::data_dir()?.join(LOG_FILE_NAME)),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# ticketpad config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/ticketpad/ticketpad.db)\n# db_path = \"/absolute/path/to/ticketpad.db\"\n\n[ui]\nshow_history = false\n# How long the copied mark stays visible: <N>ms, <N>s, or <N>m\ncopied_duration = \"{}\"\n# Hold this while right-clicking (or pressing d) on a history entry to delete it\ndelete_modifier = \"{}\"\n\n[log]\n# Overridden by the {} environment variable\nlevel = \"{}\"\n# file = \"/absolute/path/to/ticketpad.log\"\n",
            path.display(),
            DEFAULT_COPIED_DURATION,
            DeleteModifier::default().as_str(),
            crate::logging::LOG_ENV,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 2s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;
    use ticketpad_tui::DeleteModifier;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert!(!config.show_history());
        assert_eq!(config.copied_duration()?, Duration::from_secs(2));
        assert_eq!(config.delete_modifier()?, DeleteModifier::Ctrl);
        assert_eq!(config.log_level(), "info");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[ui]\nshow_history = true\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[storage], [ui], and [log]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[storage]\ndb_path = \"/tmp/tickets.db\"\n[ui]\nshow_history = true\ncopied_duration = \"750ms\"\ndelete_modifier = \"alt\"\n[log]\nlevel = \"debug\"\nfile = \"/tmp/ticketpad-test.log\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.db_path()?, PathBuf::from("/tmp/tickets.db"));
        assert!(config.show_history());
        let options = config.ui_options()?;
        assert_eq!(options.copied_duration, Duration::from_millis(750));
        assert_eq!(options.delete_modifier, DeleteModifier::Alt);
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.log_file()?, PathBuf::from("/tmp/ticketpad-test.log"));
        Ok(())
    }

    #[test]
    fn partial_sections_fall_back_to_defaults() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\nshow_history = true\n")?;
        let config = Config::load(&path)?;
        assert_eq!(config.copied_duration()?, Duration::from_secs(2));
        assert_eq!(config.delete_modifier()?, DeleteModifier::Ctrl);
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn unknown_delete_modifier_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\ndelete_modifier = \"meta\"\n")?;
        let error = Config::load(&path).expect_err("bad modifier should fail");
        assert!(error.to_string().contains("must be one of ctrl, alt, shift"));
        Ok(())
    }

    #[test]
    fn zero_copied_duration_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\ncopied_duration = \"0s\"\n")?;
        let error = Config::load(&path).expect_err("zero duration should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn invalid_log_level_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"ticketpad=loud\"\n")?;
        let error = Config::load(&path).expect_err("bad level should fail");
        assert!(format!("{error:#}").contains("invalid log filter"));
        Ok(())
    }

    #[test]
    fn blank_log_file_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[log]\nfile = \"  \"\n")?;
        let error = Config::load(&path).expect_err("blank log file should fail");
        assert!(error.to_string().contains("log.file"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TICKETPAD_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TICKETPAD_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn db_path_prefers_storage_config_over_env_override() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) =
            write_config("version = 1\n[storage]\ndb_path = \"/explicit/from-config.db\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TICKETPAD_DB_PATH", "/from/env.db");
        }
        let config = Config::load(&path)?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TICKETPAD_DB_PATH");
        }
        assert_eq!(config.db_path()?, PathBuf::from("/explicit/from-config.db"));
        Ok(())
    }

    #[test]
    fn db_path_uses_env_override_when_storage_db_path_missing() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TICKETPAD_DB_PATH", "/from/env-only.db");
        }
        let config = Config::load(&path)?;
        let resolved = config.db_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TICKETPAD_DB_PATH");
        }
        assert_eq!(resolved, PathBuf::from("/from/env-only.db"));
        Ok(())
    }

    #[test]
    fn db_path_rejects_uri_style_storage_value() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[storage]\ndb_path = \"https://evil.example/t.db\"\n")?;
        let error = Config::load(&path).expect_err("URI db_path should fail validation");
        assert!(error.to_string().contains("looks like a URI"));
        Ok(())
    }

    #[test]
    fn parse_duration_accepts_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("2s")?, Duration::from_secs(2));
        assert_eq!(parse_duration("1m")?, Duration::from_secs(60));
        Ok(())
    }

    #[test]
    fn parse_duration_rejects_overflowing_minutes() {
        let raw = format!("{}m", u64::MAX);
        let error = parse_duration(&raw).expect_err("overflowing minutes should fail");
        assert!(error.to_string().contains("too large"));
    }

    #[test]
    fn oversized_copied_duration_in_config_is_rejected() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[ui]\ncopied_duration = \"18446744073709551615m\"\n")?;
        let error = Config::load(&path).expect_err("overflowing duration should fail");
        assert!(error.to_string().contains("too large"));
        Ok(())
    }

    #[test]
    fn parse_duration_rejects_garbage() {
        let error = parse_duration("soon").expect_err("invalid duration should fail");
        assert!(error.to_string().contains("invalid duration"));
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[storage]"));
        assert!(example.contains("[ui]"));
        assert!(example.contains("[log]"));
        assert!(example.contains("TICKETPAD_LOG"));

        std::fs::write(&path, &example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.delete_modifier()?, DeleteModifier::Ctrl);
        Ok(())
    }
}
