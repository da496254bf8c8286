use std::ffi::OsString;
use std::path::Path;

use bb_core::DialogueError;
use bb_tool::{assert_case, play_case, ExpectedEvent, RunReport, TestAction, TestCase};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli_args;
mod error_map;

pub(crate) use cli_args::{CheckArgs, Cli, Mode, PlayArgs};
pub(crate) use error_map::{emit_error, map_tool_error};

/// Sends `tracing` output to stderr; stdout carries the `KEY:VALUE` protocol.
/// `RUST_LOG` overrides the default `warn` filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => return error.exit_code(),
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, DialogueError> {
    match cli.command {
        Mode::Play(args) => run_play(args),
        Mode::Check(args) => run_check(args),
    }
}

fn run_play(args: PlayArgs) -> Result<i32, DialogueError> {
    let case = TestCase {
        schema_version: bb_tool::TESTCASE_SCHEMA_V1.to_string(),
        entry_node: args.entry_node.unwrap_or_else(|| "Start".to_string()),
        variables: Default::default(),
        actions: args
            .choices
            .into_iter()
            .map(|index| TestAction::Select { index })
            .collect(),
        expected_events: Vec::new(),
        expected_visits: Default::default(),
    };
    let report = play_case(Path::new(&args.dialogue_dir), &case).map_err(map_tool_error)?;
    for line in boundary_lines(&report) {
        println!("{}", line);
    }
    Ok(0)
}

fn run_check(args: CheckArgs) -> Result<i32, DialogueError> {
    let dialogue_dir = Path::new(&args.dialogue_dir);
    let case_path = match &args.case {
        Some(case) => Path::new(case).to_path_buf(),
        None => dialogue_dir.join("testcase.json"),
    };
    assert_case(dialogue_dir, &case_path).map_err(map_tool_error)?;
    println!("RESULT:OK");
    println!("CASE:{}", case_path.display());
    Ok(0)
}

/// Renders a play report: the boundary event, the transcript, and the
/// options still waiting for a choice.
fn boundary_lines(report: &RunReport) -> Vec<String> {
    let mut lines = vec![
        "RESULT:OK".to_string(),
        if report.ended {
            "EVENT:END".to_string()
        } else {
            "EVENT:OPTIONS".to_string()
        },
    ];

    let last = report.observed_events.len().saturating_sub(1);
    for (index, event) in report.observed_events.iter().enumerate() {
        match event {
            ExpectedEvent::Line { text } => lines.push(format!("LINE_JSON:{}", json(text))),
            ExpectedEvent::Command { text } => {
                lines.push(format!("COMMAND_JSON:{}", json(text)))
            }
            ExpectedEvent::Options {
                options,
                unavailable,
            } if index == last && !report.ended => {
                for (id, text) in options.iter().enumerate() {
                    let available = !unavailable.contains(&id);
                    lines.push(format!("OPTION:{}|{}|{}", id, available, json(text)));
                }
            }
            ExpectedEvent::Options { options, .. } => {
                lines.push(format!("OPTIONS_JSON:{}", json(options)))
            }
            ExpectedEvent::End => {}
        }
    }

    lines.push(format!("CHOICES_USED:{}", report.consumed_actions));
    lines
}

fn json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).expect("string json")
}

#[cfg(test)]
mod tests;
