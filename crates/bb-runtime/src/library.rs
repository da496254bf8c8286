use bb_core::{DialogueError, KvMap, Value};

use crate::engine::Dialogue;

/// A callable exposed to dialogue scripts. It pops its own arguments off the
/// dialogue stack, last argument first.
pub type LibraryFunction = for<'p> fn(&mut Dialogue<'p>) -> Result<Value<'p>, DialogueError>;

#[derive(Clone, Copy)]
pub struct FunctionDecl {
    pub name: &'static str,
    pub arity: usize,
    pub function: LibraryFunction,
}

#[derive(Clone, Copy)]
pub struct LibraryEntry {
    pub arity: usize,
    pub function: LibraryFunction,
}

pub struct FunctionLibrary {
    entries: KvMap<LibraryEntry>,
}

impl FunctionLibrary {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: KvMap::with_capacity(capacity),
        }
    }

    /// Registers every declaration or none of them.
    pub fn register(&mut self, decls: &[FunctionDecl]) -> Result<(), DialogueError> {
        for (index, decl) in decls.iter().enumerate() {
            let repeated = decls[..index].iter().any(|other| other.name == decl.name);
            if repeated || self.entries.contains_key(decl.name) {
                return Err(DialogueError::new(
                    "ENGINE_FUNCTION_DUPLICATE",
                    format!("Function \"{}\" is already registered.", decl.name),
                ));
            }
        }

        for decl in decls {
            self.entries.insert(
                decl.name,
                LibraryEntry {
                    arity: decl.arity,
                    function: decl.function,
                },
            );
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<LibraryEntry> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
