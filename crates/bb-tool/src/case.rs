use std::collections::BTreeMap;

use bb_core::Operand;
use serde::{Deserialize, Serialize};

pub const TESTCASE_SCHEMA_V1: &str = "bb-tool-case.v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub schema_version: String,
    #[serde(default = "default_entry_node")]
    pub entry_node: String,
    /// Stored before the first `continue_dialogue`.
    #[serde(default)]
    pub variables: BTreeMap<String, Operand>,
    #[serde(default)]
    pub actions: Vec<TestAction>,
    #[serde(default)]
    pub expected_events: Vec<ExpectedEvent>,
    #[serde(default)]
    pub expected_visits: BTreeMap<String, i32>,
}

fn default_entry_node() -> String {
    "Start".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TestAction {
    Select { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExpectedEvent {
    Line {
        text: String,
    },
    Options {
        options: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        unavailable: Vec<usize>,
    },
    Command {
        text: String,
    },
    End,
}
