use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DialogueError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Opcode {
    JumpTo,
    Jump,
    RunLine,
    RunCommand,
    AddOption,
    ShowOptions,
    PushString,
    PushFloat,
    PushBool,
    PushNull,
    JumpIfFalse,
    Pop,
    CallFunc,
    PushVariable,
    StoreVariable,
    Stop,
    RunNode,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Bool(bool),
    Float(f32),
    String(String),
}

impl Operand {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    #[serde(default)]
    pub operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(opcode: Opcode, operands: Vec<Operand>) -> Self {
        Self { opcode, operands }
    }

    pub fn operand(&self, index: usize) -> Result<&Operand, DialogueError> {
        self.operands.get(index).ok_or_else(|| {
            DialogueError::new(
                "OPERAND_MISSING",
                format!("{:?} has no operand {}.", self.opcode, index),
            )
        })
    }

    pub fn string_operand(&self, index: usize) -> Result<&str, DialogueError> {
        match self.operand(index)? {
            Operand::String(text) => Ok(text.as_str()),
            other => Err(self.operand_type_error(index, "string", other)),
        }
    }

    pub fn float_operand(&self, index: usize) -> Result<f32, DialogueError> {
        match self.operand(index)? {
            Operand::Float(value) => Ok(*value),
            other => Err(self.operand_type_error(index, "float", other)),
        }
    }

    pub fn bool_operand(&self, index: usize) -> Result<bool, DialogueError> {
        match self.operand(index)? {
            Operand::Bool(value) => Ok(*value),
            other => Err(self.operand_type_error(index, "bool", other)),
        }
    }

    /// Trailing operands may be left out entirely; a present one must still
    /// carry the expected type.
    pub fn optional_float_operand(&self, index: usize) -> Result<Option<f32>, DialogueError> {
        if index >= self.operands.len() {
            return Ok(None);
        }
        self.float_operand(index).map(Some)
    }

    pub fn optional_bool_operand(&self, index: usize) -> Result<Option<bool>, DialogueError> {
        if index >= self.operands.len() {
            return Ok(None);
        }
        self.bool_operand(index).map(Some)
    }

    fn operand_type_error(&self, index: usize, expected: &str, actual: &Operand) -> DialogueError {
        DialogueError::new(
            "OPERAND_TYPE",
            format!(
                "{:?} operand {} must be {}, got {}.",
                self.opcode,
                index,
                expected,
                actual.type_name()
            ),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub labels: BTreeMap<String, usize>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Node {
    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.labels.get(label).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub initial_values: BTreeMap<String, Operand>,
}

impl Program {
    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.name == name)
    }
}

/// A line of dialogue: the string table id plus its already formatted
/// substitutions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub id: String,
    #[serde(default)]
    pub substitutions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueOption {
    pub line: Line,
    pub id: usize,
    pub destination_node: String,
    pub is_available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionState {
    #[default]
    Stopped,
    Running,
    WaitingForContinue,
    WaitingOptionSelection,
    DeliveringContent,
}
