pub mod arena;
pub mod error;
pub mod kvmap;
pub mod string_table;
pub mod text;
pub mod types;
pub mod value;

pub use arena::{Arena, ArenaBlock, ArenaError};
pub use error::{DialogueError, InstructionLocation};
pub use kvmap::KvMap;
pub use string_table::{StringLookup, StringRecord, StringTable};
pub use text::{format_value, substitute};
pub use types::*;
pub use value::*;
