use std::collections::BTreeSet;
use std::path::Path;

use bb_core::{DialogueError, Program, StringTable};
use bb_runtime::{Dialogue, DialogueDelegates, DialogueOptions};

pub const DEFAULT_START_NODE: &str = "Start";

pub struct CreateDialogueOptions<'p> {
    pub program: &'p Program,
    pub strings: StringTable,
    pub options: DialogueOptions,
    pub start_node: Option<String>,
    pub delegates: Option<Box<dyn DialogueDelegates + 'p>>,
}

pub fn load_program_from_json(source: &str) -> Result<Program, DialogueError> {
    let program: Program = serde_json::from_str(source).map_err(|error| {
        DialogueError::new(
            "API_PROGRAM_JSON",
            format!("Failed to decode program JSON: {}", error),
        )
    })?;
    validate_program(&program)?;
    Ok(program)
}

pub fn load_program_from_path(path: &Path) -> Result<Program, DialogueError> {
    let source = std::fs::read_to_string(path).map_err(|error| {
        DialogueError::new(
            "API_PROGRAM_READ",
            format!("Failed to read program \"{}\": {}", path.display(), error),
        )
    })?;
    load_program_from_json(&source)
}

/// Parses a `id,text,file,node,lineNumber` CSV into a table sized by
/// `options.string_arena_chunk`.
pub fn load_string_table(
    source: &str,
    options: &DialogueOptions,
) -> Result<StringTable, DialogueError> {
    let mut table = StringTable::new(options.string_arena_chunk);
    bb_parser::load_string_table(source, &mut table)?;
    Ok(table)
}

/// Builds a dialogue over `program`, positioned on the start node and ready
/// for the first `continue_dialogue`.
pub fn create_dialogue<'p>(
    options: CreateDialogueOptions<'p>,
) -> Result<Dialogue<'p>, DialogueError> {
    let start_node = resolve_start_node(options.program, options.start_node)?;

    let mut dialogue = Dialogue::new(options.options)?;
    dialogue.load_program(options.program);
    dialogue.set_string_table(options.strings);
    if let Some(delegates) = options.delegates {
        dialogue.set_delegates(delegates);
    }
    dialogue.set_node(&start_node);
    Ok(dialogue)
}

fn validate_program(program: &Program) -> Result<(), DialogueError> {
    let mut names = BTreeSet::new();
    for node in &program.nodes {
        if !names.insert(node.name.as_str()) {
            return Err(DialogueError::new(
                "API_PROGRAM_DUPLICATE_NODE",
                format!("Program \"{}\" declares node \"{}\" twice.", program.name, node.name),
            ));
        }

        for (label, index) in &node.labels {
            if *index > node.instructions.len() {
                return Err(DialogueError::new(
                    "API_PROGRAM_LABEL_RANGE",
                    format!(
                        "Label \"{}\" in node \"{}\" points at {} but the node has {} instruction(s).",
                        label,
                        node.name,
                        index,
                        node.instructions.len()
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn resolve_start_node(program: &Program, explicit: Option<String>) -> Result<String, DialogueError> {
    if let Some(start) = explicit {
        if program.node_index(&start).is_none() {
            return Err(DialogueError::new(
                "API_START_NODE_NOT_FOUND",
                format!("Start node \"{}\" is not in program \"{}\".", start, program.name),
            ));
        }
        return Ok(start);
    }

    if program.node_index(DEFAULT_START_NODE).is_some() {
        return Ok(DEFAULT_START_NODE.to_string());
    }

    Err(DialogueError::new(
        "API_START_NODE_NOT_FOUND",
        format!(
            "Expected node with name=\"{}\" as default start.",
            DEFAULT_START_NODE
        ),
    ))
}
