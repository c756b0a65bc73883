// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::Config;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TICKETPAD_LOG";

/// Sends `tracing` output to the log file. The terminal belongs to the TUI,
/// so nothing is ever written to stdout or stderr.
pub fn init_logging(config: &Config) -> Result<PathBuf> {
    let env_override = env::var(LOG_ENV).ok();
    let directive = log_directive(config.log_level(), env_override.as_deref());
    let filter = parse_filter(directive)?;

    let path = config.log_file()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| {
            format!(
                "open log file {}; set [log].file to a writable path",
                path.display()
            )
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;
    Ok(path)
}

/// `TICKETPAD_LOG` wins over `[log].level` unless it is blank.
pub fn log_directive<'a>(configured: &'a str, env_override: Option<&'a str>) -> &'a str {
    match env_override {
        Some(value) if !value.trim().is_empty() => value,
        _ => configured,
    }
}

pub fn parse_filter(directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directive).with_context(|| {
        format!("invalid log filter {directive:?}; use a level such as info or debug, or target=level pairs")
    })
}

#[cfg(test)]
mod tests {
    use super::{log_directive, parse_filter};

    #[test]
    fn env_override_wins_unless_blank() {
        assert_eq!(log_directive("info", Some("debug")), "debug");
        assert_eq!(log_directive("info", Some("  ")), "info");
        assert_eq!(log_directive("warn", None), "warn");
    }

    #[test]
    fn parse_filter_accepts_levels_and_targets() {
        assert!(parse_filter("info").is_ok());
        assert!(parse_filter("ticketpad_db=debug,warn").is_ok());
    }

    #[test]
    fn parse_filter_rejects_bad_level() {
        let error = parse_filter("ticketpad_db=loud").expect_err("bad level should fail");
        assert!(error.to_string().contains("invalid log filter"));
    }
}
