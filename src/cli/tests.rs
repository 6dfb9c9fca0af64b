use super::*;
use crate::cli::init::InitError;
use crate::core::scenario::ScenarioCatalog;
use crate::utils::test_utils::forest_scenario;
use std::fs;
use tempfile::TempDir;

mod test_helpers {
    use super::*;

    pub(super) fn parse_args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv)
            .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
    }
}

use test_helpers::parse_args;

#[test]
fn no_subcommand_means_talk() {
    let args = parse_args(&["rpchat"]);
    assert!(args.command.is_none());
    assert!(args.model.is_none());
    assert!(args.max_tokens.is_none());
}

#[test]
fn talk_accepts_an_optional_scenario() {
    let args = parse_args(&["rpchat", "talk", "Forest"]);
    match args.command {
        Some(Commands::Talk { scenario }) => assert_eq!(scenario.as_deref(), Some("Forest")),
        _ => panic!("expected talk subcommand"),
    }

    let args = parse_args(&["rpchat", "talk"]);
    assert!(matches!(args.command, Some(Commands::Talk { scenario: None })));
}

#[test]
fn global_flags_parse_before_and_after_the_subcommand() {
    let argv = [
        "rpchat",
        "--model",
        "gpt-4o-mini",
        "talk",
        "--max-tokens",
        "200",
        "-l",
        "session.log",
        "-c",
        "/tmp/rpchat.toml",
    ];
    let args = parse_args(&argv);
    assert_eq!(args.model.as_deref(), Some("gpt-4o-mini"));
    assert_eq!(args.max_tokens, Some(200));
    assert_eq!(args.log, Some(PathBuf::from("session.log")));
    assert_eq!(args.config, Some(PathBuf::from("/tmp/rpchat.toml")));
}

#[test]
fn max_tokens_must_be_a_number() {
    assert!(Args::try_parse_from(["rpchat", "--max-tokens", "lots"]).is_err());
}

#[test]
fn init_force_flag() {
    assert!(matches!(
        parse_args(&["rpchat", "init"]).command,
        Some(Commands::Init { force: false })
    ));
    assert!(matches!(
        parse_args(&["rpchat", "init", "--force"]).command,
        Some(Commands::Init { force: true })
    ));
}

#[test]
fn init_writes_a_loadable_starter_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    write_starter_config(&path, false).unwrap();

    let loaded = Config::load_from_path(&path).unwrap();
    assert_eq!(loaded, Config::starter());
    assert_eq!(loaded.catalog().names(), vec!["Forest".to_string()]);
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "# mine\n").unwrap();

    let err = write_starter_config(&path, false).unwrap_err();
    assert!(matches!(err, InitError::AlreadyExists(_)));
    assert!(err.to_string().contains("--force"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "# mine\n");

    write_starter_config(&path, true).unwrap();
    assert_eq!(Config::load_from_path(&path).unwrap(), Config::starter());
}

#[test]
fn config_report_for_missing_file_suggests_init() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let lines = config_report(&path);
    assert!(lines[0].starts_with("Config file: "));
    assert_eq!(
        lines[1],
        "No configuration file yet. Run `rpchat init` to create one."
    );
}

#[test]
fn config_report_masks_the_api_key() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[openai]\napi_key = \"sk-test-abcdef\"\n\n[session]\nmodel = \"gpt-4o\"\n",
    )
    .unwrap();

    let report = config_report(&path).join("\n");
    assert!(!report.contains("sk-test-abcdef"));
    assert!(report.contains("  model: gpt-4o"));
}

#[test]
fn config_report_shows_parse_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[session\n").unwrap();

    let lines = config_report(&path);
    assert!(lines[1].starts_with("❌ "));
}

#[test]
fn scenario_list_aligns_descriptions() {
    let catalog = ScenarioCatalog::new(vec![
        forest_scenario(),
        Scenario {
            name: "Sea".to_string(),
            ..Default::default()
        },
        Scenario {
            name: "Tundra".to_string(),
            description: "Cold.".to_string(),
            ..Default::default()
        },
    ]);
    let mut out = Vec::new();
    list_scenarios(&catalog, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("Available scenarios:\n\n"));
    assert!(text.contains("  Forest  A grim walk through the woods.\n"));
    assert!(text.contains("  Sea\n"));
    assert!(text.contains("  Tundra  Cold.\n"));
}

#[test]
fn scenario_list_without_scenarios() {
    let mut out = Vec::new();
    list_scenarios(&ScenarioCatalog::default(), &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "No scenarios configured.\n");
}
