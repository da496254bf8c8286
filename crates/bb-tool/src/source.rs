use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{BbToolError, TestCase, TESTCASE_SCHEMA_V1};

/// The raw inputs of one fixture directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueSources {
    pub program_path: PathBuf,
    pub program: String,
    pub strings: Option<String>,
}

pub fn read_dialogue_sources(example_dir: &Path) -> Result<DialogueSources, BbToolError> {
    let mut program: Option<(PathBuf, String)> = None;
    let mut strings: Option<String> = None;

    for entry in WalkDir::new(example_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let path_str = path.to_string_lossy();
        let kind = if path_str.ends_with(".program.json") {
            "program"
        } else if path_str.ends_with(".csv") {
            "strings"
        } else {
            continue;
        };

        let content = fs::read_to_string(path).map_err(|source| BbToolError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        let duplicate = match kind {
            "program" => program.replace((path.to_path_buf(), content)).is_some(),
            _ => strings.replace(content).is_some(),
        };
        if duplicate {
            return Err(BbToolError::DuplicateSource {
                kind,
                path: example_dir.to_path_buf(),
            });
        }
    }

    let Some((program_path, program)) = program else {
        return Err(BbToolError::SourceEmpty {
            path: example_dir.to_path_buf(),
        });
    };

    Ok(DialogueSources {
        program_path,
        program,
        strings,
    })
}

pub fn read_test_case(case_path: &Path) -> Result<TestCase, BbToolError> {
    let raw = fs::read_to_string(case_path).map_err(|source| BbToolError::ReadFile {
        path: case_path.to_path_buf(),
        source,
    })?;
    let parsed: TestCase = serde_json::from_str(&raw).map_err(|source| BbToolError::ParseCase {
        path: case_path.to_path_buf(),
        source,
    })?;

    if parsed.schema_version != TESTCASE_SCHEMA_V1 {
        return Err(BbToolError::InvalidSchemaVersion {
            expected: TESTCASE_SCHEMA_V1.to_string(),
            found: parsed.schema_version,
        });
    }

    Ok(parsed)
}

#[cfg(test)]
mod source_tests {
    use super::*;

    use std::time::{SystemTime, UNIX_EPOCH};
    #[cfg(unix)]
    use std::{fs::Permissions, os::unix::fs::PermissionsExt};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should move forward")
            .as_nanos();
        std::env::temp_dir().join(format!("bb-tool-{}-{}", name, nanos))
    }

    fn write_file(path: &Path, content: &str) {
        let parent = path.parent().expect("path should have parent");
        fs::create_dir_all(parent).expect("parent dir should be created");
        fs::write(path, content).expect("file should be written");
    }

    #[test]
    fn read_dialogue_sources_collects_program_and_strings() {
        let root = temp_dir("sources");
        write_file(&root.join("tavern.program.json"), r#"{"name":"tavern"}"#);
        write_file(&root.join("lines/tavern.csv"), "id,text,file,node,lineNumber\n");
        write_file(&root.join("testcase.json"), "{}");
        write_file(&root.join("notes.txt"), "skip");

        let sources = read_dialogue_sources(&root).expect("scan should pass");
        assert!(sources.program_path.ends_with("tavern.program.json"));
        assert_eq!(sources.program, r#"{"name":"tavern"}"#);
        assert_eq!(
            sources.strings.as_deref(),
            Some("id,text,file,node,lineNumber\n")
        );
    }

    #[test]
    fn read_dialogue_sources_allows_missing_strings() {
        let root = temp_dir("no-strings");
        write_file(&root.join("a.program.json"), r#"{"name":"a"}"#);

        let sources = read_dialogue_sources(&root).expect("scan should pass");
        assert_eq!(sources.strings, None);
    }

    #[test]
    fn read_dialogue_sources_fails_without_program() {
        let root = temp_dir("empty-sources");
        write_file(&root.join("strings.csv"), "id,text,file,node,lineNumber\n");

        let error = read_dialogue_sources(&root).expect_err("empty source should fail");
        assert!(matches!(error, BbToolError::SourceEmpty { .. }));
    }

    #[test]
    fn read_dialogue_sources_rejects_duplicates() {
        let root = temp_dir("duplicate-sources");
        write_file(&root.join("a.program.json"), r#"{"name":"a"}"#);
        write_file(&root.join("b.program.json"), r#"{"name":"b"}"#);

        let error = read_dialogue_sources(&root).expect_err("duplicate should fail");
        assert!(matches!(
            error,
            BbToolError::DuplicateSource {
                kind: "program",
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn read_dialogue_sources_reports_read_errors() {
        let root = temp_dir("read-error");
        let program_path = root.join("a.program.json");
        write_file(&program_path, r#"{"name":"a"}"#);

        let mut perms = fs::metadata(&program_path)
            .expect("metadata should exist")
            .permissions();
        perms.set_mode(0o000);
        fs::set_permissions(&program_path, perms).expect("permissions should update");

        let result = read_dialogue_sources(&root);

        fs::set_permissions(&program_path, Permissions::from_mode(0o644))
            .expect("permissions should reset");
        // Running as root ignores the mode bits.
        if let Err(error) = result {
            assert!(matches!(error, BbToolError::ReadFile { .. }));
        }
    }

    #[test]
    fn read_test_case_parses_valid_json() {
        let root = temp_dir("case-ok");
        let case_path = root.join("testcase.json");
        write_file(
            &case_path,
            r#"{
  "schemaVersion":"bb-tool-case.v1",
  "entryNode":"Start",
  "actions":[],
  "expectedEvents":[{"kind":"end"}]
}"#,
        );

        let parsed = read_test_case(&case_path).expect("case should parse");
        assert_eq!(parsed.schema_version, TESTCASE_SCHEMA_V1);
        assert_eq!(parsed.entry_node, "Start");
        assert_eq!(parsed.expected_events.len(), 1);
    }

    #[test]
    fn read_test_case_reports_read_error() {
        let root = temp_dir("case-read-error");
        fs::create_dir_all(&root).expect("root should be created");
        let error = read_test_case(&root.join("missing.json")).expect_err("missing case should fail");
        assert!(matches!(error, BbToolError::ReadFile { .. }));
    }

    #[test]
    fn read_test_case_reports_parse_and_schema_errors() {
        let root = temp_dir("case-errors");

        let bad_json_path = root.join("bad.json");
        write_file(&bad_json_path, "{");
        let parse_error = read_test_case(&bad_json_path).expect_err("parse should fail");
        assert!(matches!(parse_error, BbToolError::ParseCase { .. }));

        let bad_schema_path = root.join("bad-schema.json");
        write_file(
            &bad_schema_path,
            r#"{
  "schemaVersion":"v0",
  "expectedEvents":[{"kind":"end"}]
}"#,
        );
        let schema_error = read_test_case(&bad_schema_path).expect_err("schema should fail");
        assert!(matches!(
            schema_error,
            BbToolError::InvalidSchemaVersion { .. }
        ));
    }
}
