//! CLI parse and output contracts

use clap::{CommandFactory, Parser};
use honeytree::tooling::cli::{Cli, CliContext, Commands, OutputFormat};
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["honeytree", "create", "/a/b.test"],
        vec!["honeytree", "get", "/a/"],
        vec![
            "honeytree",
            "save",
            "/a/b.test",
            "--set",
            "url=https://example.com",
            "--set",
            "browser=Firefox",
            "--clear",
            "host",
        ],
        vec!["honeytree", "delete", "/a/"],
        vec!["honeytree", "rename", "/a/b.test", "/c/b.test"],
        vec![
            "honeytree",
            "--mode",
            "phrase",
            "rename",
            "/a/b.phrase",
            "/c/b.phrase",
            "--phrase-id",
            "p-2",
        ],
        vec!["honeytree", "copy", "/a/b.test", "/c/b.test"],
        vec!["honeytree", "--format", "json", "tree"],
        vec!["honeytree", "--mode", "phrase", "phrase", "p-1"],
        vec!["honeytree", "--store", "memory", "check"],
        vec!["honeytree", "--log-level", "debug", "--log-output", "stderr", "tree"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_invalid_values() {
    let bad: Vec<Vec<&str>> = vec![
        vec!["honeytree", "--mode", "files", "tree"],
        vec!["honeytree", "--store", "rocksdb", "tree"],
        vec!["honeytree", "--format", "yaml", "tree"],
        vec!["honeytree", "save", "/a/b.test", "--set", "url"],
        vec!["honeytree", "rename", "/a/b.test"],
        vec!["honeytree"],
    ];
    for args in bad {
        assert!(
            Cli::try_parse_from(args.clone()).is_err(),
            "expected parse failure for args: {args:?}"
        );
    }
}

#[test]
fn top_level_help_lists_every_subcommand() {
    let mut command = Cli::command();
    let mut output = Vec::new();
    command.write_long_help(&mut output).unwrap();
    let output = String::from_utf8(output).unwrap();

    for token in [
        "create", "get", "save", "delete", "rename", "copy", "tree", "phrase", "check",
        "--workspace", "--config", "--mode", "--store", "--format",
    ] {
        assert!(output.contains(token), "help is missing {token}");
    }
}

fn run(ctx: &CliContext, args: &[&str]) -> Value {
    let mut argv = vec!["honeytree", "--format", "json"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    let output = ctx.execute(&cli.command, OutputFormat::Json).unwrap();
    serde_json::from_str(&output.rendered).unwrap()
}

#[test]
fn json_output_is_the_envelope() {
    let workspace = TempDir::new().unwrap();
    let config = workspace.path().join("honeytree.toml");
    fs::write(
        &config,
        "mode = \"test\"\n\n[storage]\nbackend = \"sled\"\nstore_path = \"store\"\n",
    )
    .unwrap();

    {
        let ctx = CliContext::new(workspace.path().to_path_buf(), Some(config.clone())).unwrap();
        let created = run(&ctx, &["create", "/suite/login.test"]);
        assert_eq!(created["result"], "success");
        assert_eq!(created["status"], 201);
        assert_eq!(created["data"], "/suite/login.test");
        assert!(created["errors"].is_null());

        let saved = run(
            &ctx,
            &["save", "/suite/login.test", "--set", "URL=https://example.com"],
        );
        assert_eq!(saved["data"]["properties"]["url"], "https://example.com");
        assert_eq!(saved["data"]["type"], "file");
    }

    assert!(workspace.path().join("store").exists());

    let ctx = CliContext::new(workspace.path().to_path_buf(), Some(config)).unwrap();
    let listing = run(&ctx, &["get", "/suite/"]);
    assert_eq!(listing["status"], 200);
    assert_eq!(listing["data"]["children"][0]["path"], "/suite/login.test");
    assert_eq!(
        listing["data"]["children"][0]["properties"]["url"],
        "https://example.com"
    );

    let conflict = run(&ctx, &["copy", "/suite/login.test", "/suite/login.test"]);
    assert_eq!(conflict["result"], "failure");
    assert_eq!(conflict["status"], 409);

    let folder = run(&ctx, &["rename", "/suite/", "/other/"]);
    assert_eq!(folder["status"], 400);
    assert_eq!(folder["errors"], "Unable to rename folders");

    let report = run(&ctx, &["check"]);
    assert_eq!(report["data"]["valid"], true);
    assert_eq!(report["data"]["node_count"], 3);
}

#[test]
fn phrase_lookup_in_test_mode_is_bad_request() {
    let workspace = TempDir::new().unwrap();
    let mut config = CliContext::load_config(workspace.path(), None).unwrap();
    config.storage.backend = honeytree::config::StorageBackend::Memory;
    let ctx = CliContext::from_config(workspace.path().to_path_buf(), &config).unwrap();

    let cli = Cli::try_parse_from(["honeytree", "phrase", "p-1"]).unwrap();
    let output = ctx.execute(&cli.command, OutputFormat::Text).unwrap();
    assert!(!output.success);
    assert!(output.rendered.starts_with("400"));
    assert!(matches!(cli.command, Commands::Phrase { .. }));
}
