// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod clipboard;
mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use clipboard::SystemClipboard;
use config::Config;
use runtime::StoreRuntime;
use std::env;
use std::path::PathBuf;
use ticketpad_app::AppState;
use ticketpad_db::Store;
use time::format_description::well_known::Rfc3339;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `ticketpad --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let log_path = logging::init_logging(&config)?;
    info!(
        db = %db_path.display(),
        log = %log_path.display(),
        demo = options.demo,
        "starting ticketpad"
    );

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or TICKETPAD_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    if options.demo {
        store.save_history(&ticketpad_testkit::demo_history())?;
    }

    if options.export_history {
        println!("{}", store.export_history_json()?);
        return Ok(());
    }

    let ui_options = config.ui_options()?;
    if options.check_only {
        println!("{}", check_summary(&store)?);
        return Ok(());
    }

    let mut state = AppState {
        show_history: config.show_history(),
        ..AppState::default()
    };
    let mut runtime = StoreRuntime::new(&store, Box::new(SystemClipboard::new()));
    ticketpad_tui::run_app(&mut state, &mut runtime, ui_options)?;
    info!(entries = state.history.len(), "ticketpad exited");
    Ok(())
}

/// One-line report printed by `--check` once config, store and log file are
/// known to be usable.
fn check_summary(store: &Store) -> Result<String> {
    let count = store.load_history()?.len();
    let saved = match store.history_updated_at()? {
        Some(timestamp) => format!(
            "last saved {}",
            timestamp
                .format(&Rfc3339)
                .context("format history timestamp")?
        ),
        None => "never saved".to_owned(),
    };
    let noun = if count == 1 { "entry" } else { "entries" };
    Ok(format!("ok: {count} history {noun}, {saved}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    export_history: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        export_history: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let path = iter.next().ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(path.as_ref());
            }
            "--print-config-path" => options.print_config_path = true,
            "--print-path" => options.print_db_path = true,
            "--print-example-config" => options.print_example = true,
            "--demo" => options.demo = true,
            "--check" => options.check_only = true,
            "--export-history" => options.export_history = true,
            "--help" | "-h" => options.show_help = true,
            unknown => {
                bail!("unknown argument {unknown:?}; run with --help to see supported options")
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("ticketpad: support ticket notes with clipboard shortcuts");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch with seeded demo history (in-memory)");
    println!("  --check                  Validate config + DB + log file, then exit");
    println!("  --export-history         Print saved history as JSON and exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, check_summary, parse_cli_args};
    use anyhow::Result;
    use std::path::PathBuf;
    use ticketpad_db::Store;
    use ticketpad_testkit::TicketFaker;

    fn fallback_config() -> PathBuf {
        PathBuf::from("/tmp/ticketpad-config.toml")
    }

    #[test]
    fn demo_export_uses_fallback_config_and_leaves_other_flags_off() -> Result<()> {
        let options = parse_cli_args(vec!["--demo", "--export-history"], fallback_config())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: fallback_config(),
                print_config_path: false,
                print_db_path: false,
                demo: true,
                print_example: false,
                check_only: false,
                export_history: true,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn later_config_flag_replaces_earlier_one() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--config",
                "/etc/ticketpad/first.toml",
                "--check",
                "--config",
                "/home/tech/.ticketpad.toml",
            ],
            fallback_config(),
        )?;
        assert_eq!(
            options.config_path,
            PathBuf::from("/home/tech/.ticketpad.toml")
        );
        assert!(options.check_only);
        Ok(())
    }

    #[test]
    fn config_flag_without_path_is_rejected() {
        let error = parse_cli_args(vec!["--export-history", "--config"], fallback_config())
            .expect_err("dangling --config should fail");
        assert!(error.to_string().contains("--config requires a file path"));
    }

    #[test]
    fn unknown_flag_points_at_help() {
        let error = parse_cli_args(vec!["--export-json"], fallback_config())
            .expect_err("unknown flag should fail");
        let message = error.to_string();
        assert!(message.contains("\"--export-json\""));
        assert!(message.contains("--help"));
    }

    #[test]
    fn print_flags_can_be_combined() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-path", "--print-config-path", "--print-example-config"],
            fallback_config(),
        )?;
        assert!(options.print_db_path);
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(!options.demo);
        Ok(())
    }

    #[test]
    fn short_help_wins_alongside_other_flags() -> Result<()> {
        let options = parse_cli_args(vec!["--demo", "-h"], fallback_config())?;
        assert!(options.show_help);
        assert!(options.demo);
        Ok(())
    }

    #[test]
    fn check_summary_reports_empty_store() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        assert_eq!(check_summary(&store)?, "ok: 0 history entries, never saved");
        Ok(())
    }

    #[test]
    fn check_summary_reports_count_and_save_time() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        store.save_history(&TicketFaker::new(6).history(1))?;

        let summary = check_summary(&store)?;
        assert!(
            summary.starts_with("ok: 1 history entry, last saved "),
            "got {summary}"
        );
        Ok(())
    }
}
