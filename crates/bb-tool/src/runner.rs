use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use bb_api::{create_dialogue, load_program_from_json, load_string_table, CreateDialogueOptions};
use bb_core::{DialogueError, DialogueOption, ExecutionState, Line, StringTable, Value};
use bb_runtime::{Dialogue, DialogueDelegates, DialogueOptions};
use tracing::debug;

use crate::source::{read_dialogue_sources, read_test_case};
use crate::{BbToolError, ExpectedEvent, TestAction, TestCase};

const MAX_STEPS: usize = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub observed_events: Vec<ExpectedEvent>,
    pub consumed_actions: usize,
    pub steps: usize,
    pub visits: BTreeMap<String, i32>,
    /// False when the run stopped at options with no action left to answer
    /// them (only from `play_case`).
    pub ended: bool,
}

#[derive(Default)]
struct Recording {
    events: Vec<ExpectedEvent>,
    failure: Option<DialogueError>,
    ended: bool,
}

/// Resolves line text as events arrive so the case compares what a player
/// would read.
struct RecordingDelegates {
    recording: Rc<RefCell<Recording>>,
}

impl RecordingDelegates {
    fn push(&self, event: ExpectedEvent) {
        self.recording.borrow_mut().events.push(event);
    }

    fn fail(&self, error: DialogueError) {
        let mut recording = self.recording.borrow_mut();
        if recording.failure.is_none() {
            recording.failure = Some(error);
        }
    }
}

impl DialogueDelegates for RecordingDelegates {
    fn on_line(&mut self, dialogue: &mut Dialogue<'_>, line: &Line) {
        match dialogue.line_text(line) {
            Ok(text) => self.push(ExpectedEvent::Line { text }),
            Err(error) => self.fail(error),
        }
    }

    fn on_options(&mut self, dialogue: &mut Dialogue<'_>, options: &[DialogueOption]) {
        let mut texts = Vec::with_capacity(options.len());
        for option in options {
            match dialogue.line_text(&option.line) {
                Ok(text) => texts.push(text),
                Err(error) => return self.fail(error),
            }
        }
        let unavailable = options
            .iter()
            .filter(|option| !option.is_available)
            .map(|option| option.id)
            .collect();
        self.push(ExpectedEvent::Options {
            options: texts,
            unavailable,
        });
    }

    fn on_command(&mut self, _dialogue: &mut Dialogue<'_>, command: &str) {
        self.push(ExpectedEvent::Command {
            text: command.to_string(),
        });
    }

    fn on_dialogue_complete(&mut self, _dialogue: &mut Dialogue<'_>) {
        let mut recording = self.recording.borrow_mut();
        recording.events.push(ExpectedEvent::End);
        recording.ended = true;
    }
}

/// Runs a fixture to its end. Every options event must be answered by the
/// next action, and every action must be used.
pub fn run_case(example_dir: &Path, case: &TestCase) -> Result<RunReport, BbToolError> {
    drive(example_dir, case, true)
}

/// Like `run_case`, but stops cleanly at the first options event the actions
/// run out for.
pub fn play_case(example_dir: &Path, case: &TestCase) -> Result<RunReport, BbToolError> {
    drive(example_dir, case, false)
}

fn drive(example_dir: &Path, case: &TestCase, strict: bool) -> Result<RunReport, BbToolError> {
    let sources = read_dialogue_sources(example_dir)?;
    let program = load_program_from_json(&sources.program)?;
    let options = DialogueOptions::default();
    let strings = match &sources.strings {
        Some(csv) => load_string_table(csv, &options)?,
        None => StringTable::new(options.string_arena_chunk),
    };

    let recording = Rc::new(RefCell::new(Recording::default()));
    let mut dialogue = create_dialogue(CreateDialogueOptions {
        program: &program,
        strings,
        options,
        start_node: Some(case.entry_node.clone()),
        delegates: Some(Box::new(RecordingDelegates {
            recording: recording.clone(),
        })),
    })?;
    for (name, operand) in &case.variables {
        dialogue.store_variable(name, Value::from(operand));
    }

    let mut observed_events = Vec::new();
    let mut action_index = 0usize;

    for step in 1..=MAX_STEPS {
        dialogue.continue_dialogue()?;

        let (events, failure, ended) = {
            let mut recording = recording.borrow_mut();
            (
                std::mem::take(&mut recording.events),
                recording.failure.take(),
                recording.ended,
            )
        };
        if let Some(error) = failure {
            return Err(error.into());
        }
        observed_events.extend(events);

        let waiting = dialogue.execution_state() == ExecutionState::WaitingOptionSelection;
        let unanswered = waiting && action_index == case.actions.len();
        if ended || (unanswered && !strict) {
            if ended && action_index != case.actions.len() {
                return Err(BbToolError::UnusedActions {
                    used: action_index,
                    total: case.actions.len(),
                });
            }
            let visits = program
                .nodes
                .iter()
                .map(|node| (node.name.clone(), dialogue.visited_count(&node.name)))
                .collect();
            debug!(
                dir = %example_dir.display(),
                events = observed_events.len(),
                steps = step,
                ended,
                "case finished"
            );
            return Ok(RunReport {
                observed_events,
                consumed_actions: action_index,
                steps: step,
                visits,
                ended,
            });
        }

        if waiting {
            let event_index = observed_events.len().saturating_sub(1);
            let TestAction::Select { index } = case
                .actions
                .get(action_index)
                .ok_or(BbToolError::MissingAction { event_index })?;
            dialogue.select_option(*index)?;
            action_index += 1;
        }
    }

    Err(BbToolError::GuardExceeded {
        max_steps: MAX_STEPS,
    })
}

pub fn assert_case(example_dir: &Path, case_path: &Path) -> Result<(), BbToolError> {
    let case = read_test_case(case_path)?;
    let report = run_case(example_dir, &case)?;

    if report.observed_events.len() != case.expected_events.len() {
        let observed = serde_json::to_string_pretty(&report.observed_events)
            .map_err(BbToolError::EventSerialize)?;
        return Err(BbToolError::EventCountMismatch {
            expected: case.expected_events.len(),
            actual: report.observed_events.len(),
            observed,
        });
    }

    for (index, (expected, actual)) in case
        .expected_events
        .iter()
        .zip(report.observed_events.iter())
        .enumerate()
    {
        if expected != actual {
            let expected = serde_json::to_string(expected).map_err(BbToolError::EventSerialize)?;
            let actual = serde_json::to_string(actual).map_err(BbToolError::EventSerialize)?;
            return Err(BbToolError::EventMismatch {
                index,
                expected,
                actual,
            });
        }
    }

    for (node, expected) in &case.expected_visits {
        let actual = report.visits.get(node).copied().unwrap_or(0);
        if actual != *expected {
            return Err(BbToolError::VisitMismatch {
                node: node.clone(),
                expected: *expected,
                actual,
            });
        }
    }

    Ok(())
}
