//! Unit tests for the CLI runtime.

pub(crate) mod support;

use std::process::ExitCode;

use plugincode::DependencyCheck;
use plugincode::discovery::StaticDiscoverer;
use plugincode_config::Config;
use rstest::rstest;
use serde_json::Value;

use self::support::{StaticConfigLoader, args, broken_requirements, invoke, invoke_linked};

#[test]
fn lists_one_stage_in_load_order() {
    let outcome = invoke_linked("list --stage scan");
    assert_eq!(outcome.exit, ExitCode::SUCCESS, "stderr: {}", outcome.stderr);
    assert_eq!(
        outcome.stdout,
        "scan (scancode_scan)\n\
         \x20 scan:copyrights [sort_order=5] options: --copyright\n\
         \x20 scan:urls [sort_order=100]\n"
    );
}

#[test]
fn lists_empty_stages_explicitly() {
    let outcome = invoke_linked("list --stage output");
    assert_eq!(outcome.stdout, "output (scancode_output)\n  (none)\n");
}

#[test]
fn lists_every_stage_as_json() {
    let outcome = invoke_linked("list --json");
    assert_eq!(outcome.exit, ExitCode::SUCCESS, "stderr: {}", outcome.stderr);
    let listing: Value = serde_json::from_str(&outcome.stdout).expect("valid JSON");
    let stages = listing["stages"].as_array().expect("stages array");
    let ids: Vec<&str> = stages
        .iter()
        .filter_map(|stage| stage["stage"].as_str())
        .collect();
    assert_eq!(
        ids,
        ["pre_scan", "scan", "post_scan", "output_filter", "output", "location_provider"]
    );
    let consolidate = &stages[2]["plugins"][0];
    assert_eq!(consolidate["qname"], "post_scan:consolidate");
    assert_eq!(consolidate["requires"][0], "scan:copyrights");
    assert_eq!(stages[1]["contract"], "ScanPlugin");
}

#[test]
fn check_reports_the_loaded_plugins() {
    let outcome = invoke_linked("check");
    assert_eq!(outcome.exit, ExitCode::SUCCESS, "stderr: {}", outcome.stderr);
    assert_eq!(
        outcome.stdout,
        "3 plugins loaded across 6 stages; requirements satisfied\n"
    );
}

#[rstest]
#[case::strict(DependencyCheck::Strict)]
#[case::off(DependencyCheck::Off)]
fn check_is_always_strict(#[case] mode: DependencyCheck) {
    let loader = StaticConfigLoader::new(Config {
        dependency_check: mode,
        ..Config::default()
    });
    let outcome = invoke("check", &loader, &broken_requirements());
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(
        outcome
            .stderr
            .contains("plugin 'post_scan:consolidate' requires missing plugin 'scan:missing'"),
        "stderr: {}",
        outcome.stderr
    );
}

#[test]
fn list_honours_the_configured_dependency_check() {
    let loader = StaticConfigLoader::new(Config {
        dependency_check: DependencyCheck::Warn,
        ..Config::default()
    });
    let outcome = invoke("list", &loader, &broken_requirements());
    assert_eq!(outcome.exit, ExitCode::SUCCESS, "stderr: {}", outcome.stderr);
    assert!(outcome.stdout.contains("post_scan:consolidate"));
}

#[test]
fn stage_load_failures_name_the_stage() {
    let loader = StaticConfigLoader::new(Config::default());
    let discoverer = StaticDiscoverer::new().fail_group("scancode_output", "entry points unreadable");
    let outcome = invoke("list", &loader, &discoverer);
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(
        outcome.stderr.contains("cannot load plugins for stage 'output'"),
        "stderr: {}",
        outcome.stderr
    );
}

#[test]
fn unknown_stage_is_an_error() {
    let outcome = invoke_linked("list --stage nope");
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert_eq!(outcome.stderr, "unknown stage 'nope'\n");
    assert!(outcome.stdout.is_empty());
}

#[test]
fn missing_subcommand_prints_usage_to_stderr() {
    let outcome = invoke_linked("");
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("Usage: plugincode"), "stderr: {}", outcome.stderr);
}

#[test]
fn unexpected_arguments_are_usage_errors() {
    let outcome = invoke_linked("list --bogus");
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(
        outcome.stderr.contains("unexpected argument '--bogus'"),
        "stderr: {}",
        outcome.stderr
    );
    assert!(outcome.stdout.is_empty());
}

#[test]
fn help_goes_to_stdout() {
    let outcome = invoke_linked("--help");
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains("list"));
    assert!(outcome.stdout.contains("check"));
    assert!(outcome.stderr.is_empty());
}

#[test]
fn configuration_flags_reach_the_loader() {
    let loader = StaticConfigLoader::new(Config::default());
    let outcome = invoke(
        "--log-format compact --dependency-check=warn check",
        &loader,
        &StaticDiscoverer::new(),
    );
    assert_eq!(outcome.exit, ExitCode::SUCCESS, "stderr: {}", outcome.stderr);
    assert_eq!(
        loader.seen(),
        args("--log-format compact --dependency-check=warn")
    );
}
