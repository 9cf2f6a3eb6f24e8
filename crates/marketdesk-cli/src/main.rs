// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use marketdesk_api::Client;
use marketdesk_app::{AppState, TabKind};
use runtime::ApiRuntime;
use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_FILTER_ENV: &str = "MARKETDESK_LOG";

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
            "load config {}; run `marketdesk --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let base_url = config.api_base_url()?;
    let client = Client::new(&base_url).with_context(|| {
        format!(
            "invalid API base URL {base_url:?}; set [api].base_url or {}",
            config::API_URL_ENV
        )
    })?;
    if options.check_only {
        println!("config ok: {}", options.config_path.display());
        println!("api: {}", client.base_url());
        return Ok(());
    }

    if let Err(error) = init_logging(&config) {
        eprintln!("logging disabled: {error:#}");
    }
    info!(config = %options.config_path.display(), api = client.base_url(), "starting");

    let start_tab = options.start_tab.unwrap_or_else(|| config.start_tab());
    let mut state = AppState::new(start_tab);
    let mut runtime = ApiRuntime::new(client);
    marketdesk_tui::run_app(&mut state, &mut runtime)
}

/// File logging only: the terminal UI owns stdout.
fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path()?;
    open_log_file(&path).and_then(|file| {
        let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
            .or_else(|_| EnvFilter::try_new(config.log_filter()))
            .context("parse log filter")?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Arc::new(file))
            .with_ansi(false)
            .with_target(true)
            .try_init()
            .map_err(|error| anyhow!("install log subscriber: {error}"))
    })
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    start_tab: Option<TabKind>,
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
        print_example: false,
        check_only: false,
        start_tab: None,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--tab" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--tab requires one of buyers, sellers, fields"))?;
                let tab = TabKind::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!(
                        "unknown tab {:?}; expected one of buyers, sellers, fields",
                        value.as_ref()
                    )
                })?;
                options.start_tab = Some(tab);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("marketdesk: buyers, sellers, and fields console");
    println!("  --config <path>          Use a specific config path");
    println!("  --tab <name>             Start on buyers, sellers, or fields");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and API URL, then exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, open_log_file, parse_cli_args};
    use anyhow::Result;
    use marketdesk_app::TabKind;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/marketdesk-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                check_only: false,
                start_tab: None,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["--tab"], default_options_path())
            .expect_err("missing tab value should fail");
        assert!(error.to_string().contains("--tab requires"));
    }

    #[test]
    fn parse_cli_args_parses_start_tab() -> Result<()> {
        let options = parse_cli_args(vec!["--tab", "sellers"], default_options_path())?;
        assert_eq!(options.start_tab, Some(TabKind::Sellers));

        let error = parse_cli_args(vec!["--tab", "orders"], default_options_path())
            .expect_err("unknown tab should fail");
        assert!(error.to_string().contains("unknown tab"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--demo"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }

    #[test]
    fn log_file_parent_directories_are_created() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("logs").join("marketdesk.log");
        let _file = open_log_file(&path)?;
        assert!(path.exists());
        Ok(())
    }
}
