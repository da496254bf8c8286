use bb_core::{
    format_value, substitute, DialogueError, DialogueOption, ExecutionState, Instruction,
    InstructionLocation, KvMap, Line, Node, Opcode, Program, StringLookup, StringTable, Value,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::delegates::{DialogueDelegates, InertDelegates};
use crate::library::{FunctionDecl, FunctionLibrary};
use crate::stdlib::STANDARD_LIBRARY;
use crate::storage::{MapVariableStorage, VariableStorage};
use crate::visited::visited_variable_name;

pub const DEFAULT_STACK_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DialogueOptions {
    pub stack_capacity: usize,
    pub variable_capacity: usize,
    pub function_capacity: usize,
    pub string_arena_chunk: usize,
}

impl Default for DialogueOptions {
    fn default() -> Self {
        Self {
            stack_capacity: DEFAULT_STACK_CAPACITY,
            variable_capacity: 32,
            function_capacity: 64,
            string_arena_chunk: bb_core::arena::DEFAULT_CHUNK_CAPACITY,
        }
    }
}

/// Executes one compiled program, borrowed for the dialogue's lifetime.
pub struct Dialogue<'p> {
    options: DialogueOptions,
    program: Option<&'p Program>,
    stack: Vec<Value<'p>>,
    state: ExecutionState,
    current_node: Option<usize>,
    current_instruction: usize,
    pending_options: Vec<DialogueOption>,
    library: FunctionLibrary,
    storage: Box<dyn VariableStorage + 'p>,
    strings: Box<dyn StringLookup + 'p>,
    delegates: Option<Box<dyn DialogueDelegates + 'p>>,
    dispatching: bool,
    redirected: bool,
    initial_values: KvMap<Value<'p>>,
}

impl<'p> Dialogue<'p> {
    pub fn new(options: DialogueOptions) -> Result<Self, DialogueError> {
        let mut library = FunctionLibrary::with_capacity(options.function_capacity);
        library.register(STANDARD_LIBRARY)?;

        Ok(Self {
            stack: Vec::with_capacity(options.stack_capacity),
            storage: Box::new(MapVariableStorage::with_capacity(
                options.variable_capacity,
            )),
            strings: Box::new(StringTable::new(options.string_arena_chunk)),
            options,
            program: None,
            state: ExecutionState::Stopped,
            current_node: None,
            current_instruction: 0,
            pending_options: Vec::new(),
            library,
            delegates: Some(Box::new(InertDelegates)),
            dispatching: false,
            redirected: false,
            initial_values: KvMap::default(),
        })
    }

    pub fn load_program(&mut self, program: &'p Program) {
        assert!(
            !self.dispatching,
            "load_program cannot be called from a delegate callback"
        );
        self.reset();
        let mut initial_values = KvMap::with_capacity(program.initial_values.len() * 2);
        for (name, operand) in &program.initial_values {
            initial_values.insert(name, Value::from(operand));
        }
        self.initial_values = initial_values;
        self.program = Some(program);
        debug!(program = %program.name, nodes = program.nodes.len(), "program loaded");
    }

    pub fn set_string_table(&mut self, strings: impl StringLookup + 'p) {
        self.strings = Box::new(strings);
    }

    pub fn set_storage(&mut self, storage: impl VariableStorage + 'p) {
        self.storage = Box::new(storage);
    }

    pub fn set_delegates(&mut self, delegates: impl DialogueDelegates + 'p) {
        self.delegates = Some(Box::new(delegates));
    }

    pub fn register_functions(&mut self, decls: &[FunctionDecl]) -> Result<(), DialogueError> {
        self.library.register(decls)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.library.contains(name)
    }

    pub fn set_node(&mut self, name: &str) {
        let program = self.loaded_program();
        let Some(index) = program.node_index(name) else {
            panic!("set_node: program \"{}\" has no node \"{}\"", program.name, name);
        };
        // Inside a handler the running loop must not advance past instruction 0.
        self.state = ExecutionState::Stopped;
        self.redirected = self.dispatching;
        self.enter_node(index);
    }

    pub fn reset(&mut self) {
        self.clear_node_state();
        self.current_node = None;
        self.state = ExecutionState::Stopped;
        self.redirected = false;
    }

    pub fn is_active(&self) -> bool {
        self.state != ExecutionState::Stopped
    }

    pub fn execution_state(&self) -> ExecutionState {
        self.state
    }

    pub fn pending_options(&self) -> &[DialogueOption] {
        &self.pending_options
    }

    pub fn current_node_name(&self) -> Option<&'p str> {
        let program = self.program?;
        let index = self.current_node?;
        Some(program.nodes[index].name.as_str())
    }

    pub fn current_instruction(&self) -> usize {
        self.current_instruction
    }

    pub fn load_variable(&self, name: &str) -> Option<Value<'static>> {
        self.storage.load(name)
    }

    pub fn store_variable(&mut self, name: &str, value: Value<'_>) {
        self.storage.save(name, value.into_owned());
    }

    pub fn line_text(&self, line: &Line) -> Result<String, DialogueError> {
        let template = self.strings.lookup(&line.id).ok_or_else(|| {
            DialogueError::new(
                "ENGINE_LINE_NOT_FOUND",
                format!("String table has no line \"{}\".", line.id),
            )
        })?;
        substitute(template, &line.substitutions)
    }

    fn loaded_program(&self) -> &'p Program {
        self.program
            .expect("a program must be loaded before the dialogue can run")
    }

    fn clear_node_state(&mut self) {
        self.stack.clear();
        self.current_instruction = 0;
        self.pending_options.clear();
    }

    fn enter_node(&mut self, index: usize) {
        let program = self.loaded_program();
        let node = &program.nodes[index];
        self.clear_node_state();
        self.current_node = Some(index);
        debug!(node = %node.name, "node started");

        self.notify("node_start", |delegates, dialogue| {
            delegates.on_node_start(dialogue, &node.name)
        });

        let line_ids = line_ids(node);
        self.notify("prepare_for_lines", |delegates, dialogue| {
            delegates.on_prepare_for_lines(dialogue, &line_ids)
        });
    }
}

fn line_ids(node: &Node) -> Vec<&str> {
    node.instructions
        .iter()
        .filter(|instruction| {
            matches!(instruction.opcode, Opcode::RunLine | Opcode::AddOption)
        })
        .filter_map(|instruction| instruction.string_operand(0).ok())
        .collect()
}
