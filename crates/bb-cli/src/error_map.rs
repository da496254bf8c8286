use bb_core::DialogueError;
use bb_tool::BbToolError;

pub(crate) fn emit_error(error: DialogueError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).expect("string json")
    );
    1
}

pub(crate) fn map_tool_error(error: BbToolError) -> DialogueError {
    let code = match error {
        BbToolError::Dialogue(inner) => return inner,
        BbToolError::ReadFile { .. }
        | BbToolError::SourceEmpty { .. }
        | BbToolError::DuplicateSource { .. } => "CLI_SOURCE_READ",
        BbToolError::ParseCase { .. } | BbToolError::InvalidSchemaVersion { .. } => {
            "CLI_CASE_INVALID"
        }
        BbToolError::GuardExceeded { .. } => "CLI_GUARD_EXCEEDED",
        BbToolError::MissingAction { .. }
        | BbToolError::UnusedActions { .. }
        | BbToolError::EventCountMismatch { .. }
        | BbToolError::EventMismatch { .. }
        | BbToolError::VisitMismatch { .. }
        | BbToolError::EventSerialize(_) => "CLI_CHECK_FAILED",
    };
    DialogueError::new(code, error.to_string())
}
