//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_run() {
    let cli = parse(&["fetchd", "run"]);
    assert!(cli.config.is_none());
    match cli.command {
        CliCommand::Run { pretty } => assert!(!pretty),
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_pretty_with_config() {
    let cli = parse(&["fetchd", "run", "--pretty", "-c", "/etc/fetch.yaml"]);
    assert_eq!(cli.config.as_deref(), Some(Path::new("/etc/fetch.yaml")));
    match cli.command {
        CliCommand::Run { pretty } => assert!(pretty),
        _ => panic!("expected Run with --pretty"),
    }
}

#[test]
fn cli_parse_check_long_config() {
    let cli = parse(&["fetchd", "--config", "fetch-config.toml", "check"]);
    assert_eq!(cli.config.as_deref(), Some(Path::new("fetch-config.toml")));
    assert!(matches!(cli.command, CliCommand::Check));
}

#[test]
fn cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["fetchd"]).is_err());
}

#[test]
fn cli_rejects_unknown_command() {
    assert!(Cli::try_parse_from(["fetchd", "pause", "1"]).is_err());
}
