use super::*;

use std::collections::BTreeMap;
use std::path::PathBuf;

fn demo_dir(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
        .join("dialogues")
        .join(name)
        .to_string_lossy()
        .to_string()
}

fn report(events: Vec<ExpectedEvent>, ended: bool) -> RunReport {
    RunReport {
        observed_events: events,
        consumed_actions: 0,
        steps: 1,
        visits: BTreeMap::new(),
        ended,
    }
}

#[test]
fn boundary_lines_lists_pending_options_with_availability() {
    let lines = boundary_lines(&report(
        vec![
            ExpectedEvent::Line {
                text: "Hi \"you\"".to_string(),
            },
            ExpectedEvent::Options {
                options: vec!["A".to_string(), "B".to_string()],
                unavailable: vec![1],
            },
        ],
        false,
    ));

    assert_eq!(
        lines,
        vec![
            "RESULT:OK",
            "EVENT:OPTIONS",
            "LINE_JSON:\"Hi \\\"you\\\"\"",
            "OPTION:0|true|\"A\"",
            "OPTION:1|false|\"B\"",
            "CHOICES_USED:0",
        ]
    );
}

#[test]
fn boundary_lines_summarizes_answered_options_and_commands() {
    let lines = boundary_lines(&report(
        vec![
            ExpectedEvent::Options {
                options: vec!["A".to_string()],
                unavailable: Vec::new(),
            },
            ExpectedEvent::Command {
                text: "wave".to_string(),
            },
            ExpectedEvent::End,
        ],
        true,
    ));

    assert_eq!(
        lines,
        vec![
            "RESULT:OK",
            "EVENT:END",
            "OPTIONS_JSON:[\"A\"]",
            "COMMAND_JSON:\"wave\"",
            "CHOICES_USED:0",
        ]
    );
}

#[test]
fn play_and_check_succeed_on_demos() {
    let market = demo_dir("02-options");
    assert_eq!(
        run_cli_from_args(["bb-cli", "play", "--dialogue-dir", market.as_str()]),
        0
    );
    assert_eq!(
        run_cli_from_args([
            "bb-cli",
            "play",
            "--dialogue-dir",
            market.as_str(),
            "--choice",
            "2"
        ]),
        0
    );
    assert_eq!(
        run_cli_from_args(["bb-cli", "check", "--dialogue-dir", market.as_str()]),
        0
    );
}

#[test]
fn play_reports_errors_with_exit_code() {
    let market = demo_dir("02-options");
    assert_eq!(
        run_cli_from_args([
            "bb-cli",
            "play",
            "--dialogue-dir",
            market.as_str(),
            "--choice",
            "0"
        ]),
        1,
        "unavailable option should fail"
    );
    assert_eq!(
        run_cli_from_args([
            "bb-cli",
            "play",
            "--dialogue-dir",
            market.as_str(),
            "--entry-node",
            "Nowhere"
        ]),
        1
    );
    assert_eq!(
        run_cli_from_args(["bb-cli", "check", "--dialogue-dir", "/definitely/missing"]),
        1
    );
}

#[test]
fn invalid_arguments_return_clap_exit_code() {
    assert_eq!(run_cli_from_args(["bb-cli", "play"]), 2);
}
