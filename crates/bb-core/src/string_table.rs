use std::collections::BTreeMap;

use crate::arena::{Arena, ArenaBlock, DEFAULT_CHUNK_CAPACITY};
use crate::error::DialogueError;
use crate::kvmap::KvMap;

/// Resolves a line id to its localized text.
pub trait StringLookup {
    fn lookup(&self, id: &str) -> Option<&str>;
}

impl StringLookup for BTreeMap<String, String> {
    fn lookup(&self, id: &str) -> Option<&str> {
        self.get(id).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy)]
struct StringEntry {
    text: ArenaBlock,
    file: ArenaBlock,
    node: ArenaBlock,
    line_number: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringRecord<'a> {
    pub text: &'a str,
    pub file: &'a str,
    pub node: &'a str,
    pub line_number: i32,
}

/// Localized strings keyed by line id. Text lives in an arena; the map only
/// holds handles into it.
#[derive(Debug)]
pub struct StringTable {
    arena: Arena,
    entries: KvMap<StringEntry>,
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_CAPACITY)
    }
}

impl StringTable {
    pub fn new(chunk_capacity: usize) -> Self {
        Self {
            arena: Arena::new(chunk_capacity),
            entries: KvMap::with_capacity(16),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds or replaces a line. A replaced line's old text stays in the arena
    /// until the next [`StringTable::clear`].
    pub fn insert(
        &mut self,
        id: &str,
        text: &str,
        file: &str,
        node: &str,
        line_number: i32,
    ) -> Result<(), DialogueError> {
        let entry = StringEntry {
            text: self.arena.alloc_str(text)?,
            file: self.arena.alloc_str(file)?,
            node: self.arena.alloc_str(node)?,
            line_number,
        };
        self.entries.insert(id, entry);
        Ok(())
    }

    pub fn record(&self, id: &str) -> Option<StringRecord<'_>> {
        let entry = self.entries.get(id)?;
        Some(StringRecord {
            text: self.arena.str(entry.text)?,
            file: self.arena.str(entry.file)?,
            node: self.arena.str(entry.node)?,
            line_number: entry.line_number,
        })
    }

    /// Drops every line and folds the arena into a single chunk for reuse.
    pub fn clear(&mut self) -> Result<(), DialogueError> {
        self.entries.clear();
        self.arena.clear_and_coalesce()?;
        Ok(())
    }
}

impl StringLookup for StringTable {
    fn lookup(&self, id: &str) -> Option<&str> {
        let entry = self.entries.get(id)?;
        self.arena.str(entry.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup_lines() {
        let mut table = StringTable::new(32);
        table
            .insert("line:start-0", "Hello, {0}!", "intro.yarn", "Start", 3)
            .expect("insert should pass");
        table
            .insert("line:start-1", "Bye.", "intro.yarn", "Start", 4)
            .expect("insert should pass");

        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("line:start-0"), Some("Hello, {0}!"));
        assert_eq!(table.lookup("line:missing"), None);
        let record = table.record("line:start-1").expect("record should exist");
        assert_eq!(record.file, "intro.yarn");
        assert_eq!(record.node, "Start");
        assert_eq!(record.line_number, 4);
    }

    #[test]
    fn replacing_a_line_updates_text() {
        let mut table = StringTable::default();
        table.insert("a", "one", "f", "n", 1).expect("insert should pass");
        table.insert("a", "two", "f", "n", 2).expect("insert should pass");
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("a"), Some("two"));
    }

    #[test]
    fn clear_allows_reload() {
        let mut table = StringTable::new(16);
        for index in 0..20 {
            table
                .insert(&format!("id-{}", index), "text", "file", "node", index)
                .expect("insert should pass");
        }
        table.clear().expect("clear should pass");
        assert!(table.is_empty());
        assert_eq!(table.lookup("id-0"), None);

        table.insert("id-0", "again", "file", "node", 1).expect("insert should pass");
        assert_eq!(table.lookup("id-0"), Some("again"));
    }

    #[test]
    fn btree_map_is_a_lookup() {
        let mut map = BTreeMap::new();
        map.insert("x".to_string(), "text".to_string());
        assert_eq!(StringLookup::lookup(&map, "x"), Some("text"));
    }
}
