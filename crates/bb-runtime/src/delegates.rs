use bb_core::{DialogueOption, Line};
use tracing::{debug, info, warn};

use crate::engine::Dialogue;

/// Host callbacks. Every method receives the dialogue so a handler can resume
/// it (`continue_dialogue`, `select_option`) before returning. Unimplemented
/// methods do nothing.
pub trait DialogueDelegates {
    fn on_line(&mut self, _dialogue: &mut Dialogue<'_>, _line: &Line) {}

    fn on_options(&mut self, _dialogue: &mut Dialogue<'_>, _options: &[DialogueOption]) {}

    fn on_command(&mut self, _dialogue: &mut Dialogue<'_>, _command: &str) {}

    fn on_node_start(&mut self, _dialogue: &mut Dialogue<'_>, _node: &str) {}

    fn on_node_complete(&mut self, _dialogue: &mut Dialogue<'_>, _node: &str) {}

    fn on_dialogue_complete(&mut self, _dialogue: &mut Dialogue<'_>) {}

    fn on_prepare_for_lines(&mut self, _dialogue: &mut Dialogue<'_>, _line_ids: &[&str]) {}
}

impl<D: DialogueDelegates + ?Sized> DialogueDelegates for Box<D> {
    fn on_line(&mut self, dialogue: &mut Dialogue<'_>, line: &Line) {
        (**self).on_line(dialogue, line)
    }

    fn on_options(&mut self, dialogue: &mut Dialogue<'_>, options: &[DialogueOption]) {
        (**self).on_options(dialogue, options)
    }

    fn on_command(&mut self, dialogue: &mut Dialogue<'_>, command: &str) {
        (**self).on_command(dialogue, command)
    }

    fn on_node_start(&mut self, dialogue: &mut Dialogue<'_>, node: &str) {
        (**self).on_node_start(dialogue, node)
    }

    fn on_node_complete(&mut self, dialogue: &mut Dialogue<'_>, node: &str) {
        (**self).on_node_complete(dialogue, node)
    }

    fn on_dialogue_complete(&mut self, dialogue: &mut Dialogue<'_>) {
        (**self).on_dialogue_complete(dialogue)
    }

    fn on_prepare_for_lines(&mut self, dialogue: &mut Dialogue<'_>, line_ids: &[&str]) {
        (**self).on_prepare_for_lines(dialogue, line_ids)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct InertDelegates;

impl DialogueDelegates for InertDelegates {}

/// Logs every event, resumes after each line and command, and picks the first
/// available option.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoAdvanceDelegates;

impl DialogueDelegates for AutoAdvanceDelegates {
    fn on_line(&mut self, dialogue: &mut Dialogue<'_>, line: &Line) {
        match dialogue.line_text(line) {
            Ok(text) => info!(id = %line.id, %text, "line"),
            Err(error) => warn!(id = %line.id, %error, "line text unavailable"),
        }
        resume(dialogue);
    }

    fn on_options(&mut self, dialogue: &mut Dialogue<'_>, options: &[DialogueOption]) {
        let Some(choice) = options.iter().find(|option| option.is_available) else {
            warn!(count = options.len(), "no available option to pick");
            return;
        };
        debug!(id = choice.id, destination = %choice.destination_node, "auto-selecting option");
        if let Err(error) = dialogue.select_option(choice.id) {
            warn!(%error, "option selection failed");
        }
    }

    fn on_command(&mut self, dialogue: &mut Dialogue<'_>, command: &str) {
        info!(command, "command");
        resume(dialogue);
    }

    fn on_node_start(&mut self, _dialogue: &mut Dialogue<'_>, node: &str) {
        debug!(node, "node start");
    }

    fn on_node_complete(&mut self, _dialogue: &mut Dialogue<'_>, node: &str) {
        debug!(node, "node complete");
    }

    fn on_dialogue_complete(&mut self, _dialogue: &mut Dialogue<'_>) {
        info!("dialogue complete");
    }
}

fn resume(dialogue: &mut Dialogue<'_>) {
    if let Err(error) = dialogue.continue_dialogue() {
        warn!(%error, "resume failed");
    }
}
