mod csv;

pub use csv::{
    load_string_table, parse_csv_records, parse_string_table, CsvRecord, STRING_TABLE_COLUMNS,
};
