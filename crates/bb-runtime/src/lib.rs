pub mod delegates;
mod engine;
pub mod library;
pub mod stdlib;
pub mod storage;
mod visited;

pub use delegates::{AutoAdvanceDelegates, DialogueDelegates, InertDelegates};
pub use engine::{Dialogue, DialogueOptions, DEFAULT_STACK_CAPACITY};
pub use library::{FunctionDecl, FunctionLibrary, LibraryFunction};
pub use stdlib::STANDARD_LIBRARY;
pub use storage::{MapVariableStorage, VariableStorage};
pub use visited::visited_variable_name;
