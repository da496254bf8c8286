use std::collections::BTreeSet;

use bb_core::{DialogueError, StringTable};

pub const STRING_TABLE_COLUMNS: [&str; 5] = ["id", "text", "file", "node", "lineNumber"];

/// One CSV record and the 1-based source line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Splits CSV text into records. Quoted fields may contain commas, line
/// breaks and doubled quotes. Rows end with LF or CRLF; blank rows are skipped.
pub fn parse_csv_records(source: &str) -> Result<Vec<CsvRecord>, DialogueError> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut line = 1usize;
    let mut record_line = 1usize;
    let mut chars = source.chars().peekable();
    let mut at_field_start = true;

    while let Some(ch) = chars.next() {
        match ch {
            '"' if at_field_start => {
                let quote_line = line;
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            field.push('"');
                        }
                        Some('"') => break,
                        Some(inner) => {
                            if inner == '\n' {
                                line += 1;
                            }
                            field.push(inner);
                        }
                        None => {
                            return Err(DialogueError::new(
                                "STRING_TABLE_QUOTE",
                                format!("Unterminated quoted field starting on line {}.", quote_line),
                            ))
                        }
                    }
                }
                match chars.peek() {
                    None | Some(',') | Some('\n') | Some('\r') => {}
                    Some(other) => {
                        return Err(DialogueError::new(
                            "STRING_TABLE_QUOTE",
                            format!(
                                "Unexpected '{}' after closing quote on line {}.",
                                other, line
                            ),
                        ))
                    }
                }
                at_field_start = false;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, record_line, std::mem::take(&mut fields));
                line += 1;
                record_line = line;
                at_field_start = true;
            }
            other => {
                field.push(other);
                at_field_start = false;
            }
        }
    }

    if !at_field_start || !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        push_record(&mut records, record_line, fields);
    }

    Ok(records)
}

fn push_record(records: &mut Vec<CsvRecord>, line: usize, fields: Vec<String>) {
    if fields.len() == 1 && fields[0].is_empty() {
        return;
    }
    records.push(CsvRecord { line, fields });
}

/// Parses an `id,text,file,node,lineNumber` table into a fresh [`StringTable`].
pub fn parse_string_table(source: &str) -> Result<StringTable, DialogueError> {
    let mut table = StringTable::default();
    load_string_table(source, &mut table)?;
    Ok(table)
}

/// Replaces the contents of `table` with the lines in `source`. On error the
/// table keeps what it held before.
pub fn load_string_table(source: &str, table: &mut StringTable) -> Result<(), DialogueError> {
    let records = parse_csv_records(source)?;
    let Some((header, rows)) = records.split_first() else {
        return Err(DialogueError::new(
            "STRING_TABLE_HEADER",
            "String table is empty; expected a header row.",
        ));
    };

    if header.fields != STRING_TABLE_COLUMNS {
        return Err(DialogueError::new(
            "STRING_TABLE_HEADER",
            format!(
                "Expected header \"{}\", got \"{}\".",
                STRING_TABLE_COLUMNS.join(","),
                header.fields.join(",")
            ),
        ));
    }

    let mut seen = BTreeSet::new();
    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let [id, text, file, node, line_number] = row.fields.as_slice() else {
            return Err(DialogueError::new(
                "STRING_TABLE_COLUMNS",
                format!(
                    "Row on line {} has {} column(s), expected {}.",
                    row.line,
                    row.fields.len(),
                    STRING_TABLE_COLUMNS.len()
                ),
            ));
        };
        if !seen.insert(id.as_str()) {
            return Err(DialogueError::new(
                "STRING_TABLE_DUPLICATE_ID",
                format!("Line id \"{}\" repeats on line {}.", id, row.line),
            ));
        }
        let line_number = parse_line_number(line_number, row.line)?;
        entries.push((id, text, file, node, line_number));
    }

    table.clear()?;
    for (id, text, file, node, line_number) in entries {
        table.insert(id, text, file, node, line_number)?;
    }
    Ok(())
}

fn parse_line_number(raw: &str, row_line: usize) -> Result<i32, DialogueError> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(DialogueError::new(
            "STRING_TABLE_LINE_NUMBER",
            format!("lineNumber \"{}\" on line {} is not a number.", raw, row_line),
        ));
    }
    raw.parse::<i32>().map_err(|_| {
        DialogueError::new(
            "STRING_TABLE_LINE_NUMBER",
            format!("lineNumber \"{}\" on line {} overflows.", raw, row_line),
        )
    })
}
