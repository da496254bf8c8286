use bb_core::{KvMap, Value};

/// Backing store for dialogue variables. Only owned values cross this
/// boundary, so nothing stored can outlive the program it was read from.
pub trait VariableStorage {
    fn load(&self, name: &str) -> Option<Value<'static>>;
    fn save(&mut self, name: &str, value: Value<'static>);
    fn clear(&mut self);
}

#[derive(Debug, Clone)]
pub struct MapVariableStorage {
    values: KvMap<Value<'static>>,
}

impl Default for MapVariableStorage {
    fn default() -> Self {
        Self::with_capacity(32)
    }
}

impl MapVariableStorage {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: KvMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl VariableStorage for MapVariableStorage {
    fn load(&self, name: &str) -> Option<Value<'static>> {
        self.values.get(name).cloned()
    }

    fn save(&mut self, name: &str, value: Value<'static>) {
        self.values.insert(name, value);
    }

    fn clear(&mut self) {
        self.values.clear();
    }
}
