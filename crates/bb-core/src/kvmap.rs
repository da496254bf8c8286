//! Open-addressing string map with linear probing.
//!
//! Keys are hashed with DJB2 and placed at `hash % capacity`. Collisions probe
//! forward with wrap-around. The table doubles before an insertion of a new key
//! would push the load factor past [`MAX_LOAD_FACTOR`], and removal closes the
//! hole with backward-shift deletion so no tombstones are needed.

pub const MAX_LOAD_FACTOR: f64 = 0.7;

/// DJB2 over the raw key bytes.
pub fn hash_key(key: &str) -> u32 {
    key.bytes().fold(5381u32, |hash, byte| {
        hash.wrapping_mul(33).wrapping_add(u32::from(byte))
    })
}

#[derive(Debug, Clone)]
struct Slot<V> {
    hash: u32,
    key: Box<str>,
    value: V,
}

#[derive(Debug, Clone)]
pub struct KvMap<V> {
    slots: Vec<Option<Slot<V>>>,
    used: usize,
}

impl<V> Default for KvMap<V> {
    fn default() -> Self {
        Self::with_capacity(1)
    }
}

impl<V> KvMap<V> {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots, used: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Inserts or replaces. Returns the previous value for an existing key.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        let hash = hash_key(key);
        if let Some(index) = self.find(hash, key) {
            return self.slots[index]
                .as_mut()
                .map(|slot| std::mem::replace(&mut slot.value, value));
        }

        while exceeds_load(self.used + 1, self.capacity()) {
            self.grow();
        }
        self.place(Slot {
            hash,
            key: key.into(),
            value,
        });
        self.used += 1;
        None
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let index = self.find(hash_key(key), key)?;
        self.slots[index].as_ref().map(|slot| &slot.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let index = self.find(hash_key(key), key)?;
        self.slots[index].as_mut().map(|slot| &mut slot.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find(hash_key(key), key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        let index = self.find(hash_key(key), key)?;
        let removed = self.slots[index].take()?;
        self.used -= 1;
        self.shift_back(index);
        Some(removed.value)
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.used = 0;
    }

    /// Unordered walk over live entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|slot| (&*slot.key, &slot.value)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(key, _)| key)
    }

    fn find(&self, hash: u32, key: &str) -> Option<usize> {
        let capacity = self.capacity();
        let mut index = home(hash, capacity);
        for _ in 0..capacity {
            match &self.slots[index] {
                None => return None,
                Some(slot) => {
                    if slot.hash == hash
                        && slot.key.len() == key.len()
                        && slot.key.as_bytes() == key.as_bytes()
                    {
                        return Some(index);
                    }
                }
            }
            index = (index + 1) % capacity;
        }
        None
    }

    fn place(&mut self, slot: Slot<V>) {
        let capacity = self.capacity();
        let mut index = home(slot.hash, capacity);
        while self.slots[index].is_some() {
            index = (index + 1) % capacity;
        }
        self.slots[index] = Some(slot);
    }

    fn grow(&mut self) {
        let new_capacity = self.capacity() * 2;
        let mut fresh = Vec::with_capacity(new_capacity);
        fresh.resize_with(new_capacity, || None);
        let old = std::mem::replace(&mut self.slots, fresh);
        for slot in old.into_iter().flatten() {
            self.place(slot);
        }
    }

    /// Walks the cluster after `hole`, pulling back every entry whose home
    /// bucket does not sit cyclically inside `(hole, position]`.
    fn shift_back(&mut self, mut hole: usize) {
        let capacity = self.capacity();
        let mut position = (hole + 1) % capacity;
        loop {
            let home_index = match &self.slots[position] {
                None => return,
                Some(slot) => home(slot.hash, capacity),
            };
            if !cyclically_within(home_index, hole, position) {
                self.slots[hole] = self.slots[position].take();
                hole = position;
            }
            position = (position + 1) % capacity;
            if position == hole {
                return;
            }
        }
    }
}

fn home(hash: u32, capacity: usize) -> usize {
    hash as usize % capacity
}

fn exceeds_load(used: usize, capacity: usize) -> bool {
    used as f64 > capacity as f64 * MAX_LOAD_FACTOR
}

/// True when `index` lies in the half-open cyclic range `(start, end]`.
fn cyclically_within(index: usize, start: usize, end: usize) -> bool {
    if start <= end {
        start < index && index <= end
    } else {
        start < index || index <= end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn djb2_matches_reference_values() {
        assert_eq!(hash_key(""), 5381);
        assert_eq!(hash_key("a"), 5381 * 33 + 97);
        assert_eq!(hash_key("ab"), (5381 * 33 + 97) * 33 + 98);
    }

    #[test]
    fn insert_get_and_replace() {
        let mut map = KvMap::with_capacity(3);
        assert_eq!(map.insert("hello", 1), None);
        assert_eq!(map.insert("world", 2), None);
        assert_eq!(map.get("hello"), Some(&1));
        assert_eq!(map.insert("hello", 10), Some(1));
        assert_eq!(map.get("hello"), Some(&10));
        assert_eq!(map.used(), 2);
        assert!(map.contains_key("world"));
        assert!(!map.contains_key("nope"));
    }

    #[test]
    fn load_factor_never_exceeds_limit_after_insert() {
        let mut map = KvMap::with_capacity(3);
        let mut last_capacity = map.capacity();
        for index in 0..200 {
            map.insert(&format!("key-{}", index), index);
            assert!(map.used() as f64 <= map.capacity() as f64 * MAX_LOAD_FACTOR);
            assert!(map.capacity() >= last_capacity);
            last_capacity = map.capacity();
        }
        for index in 0..200 {
            assert_eq!(map.get(&format!("key-{}", index)), Some(&index));
        }
    }

    #[test]
    fn zero_capacity_becomes_one() {
        let mut map = KvMap::with_capacity(0);
        assert_eq!(map.capacity(), 1);
        map.insert("only", ());
        assert!(map.capacity() >= 2);
        assert!(map.contains_key("only"));
    }

    #[test]
    fn remove_keeps_cluster_reachable() {
        let mut map = KvMap::with_capacity(64);
        let keys: Vec<String> = (0..40).map(|index| format!("k{}", index)).collect();
        for key in &keys {
            map.insert(key, key.clone());
        }
        for key in keys.iter().step_by(3) {
            assert_eq!(map.remove(key), Some(key.clone()));
            assert!(map.get(key).is_none());
        }
        for (index, key) in keys.iter().enumerate() {
            if index % 3 == 0 {
                assert!(!map.contains_key(key));
            } else {
                assert_eq!(map.get(key), Some(key));
            }
        }
        assert_eq!(map.used(), 40 - 14);
        assert_eq!(map.remove("k0"), None);
    }

    #[test]
    fn remove_handles_wrapped_cluster() {
        let capacity = 8;
        let mut map = KvMap::with_capacity(capacity);
        // Find three keys that all hash to the last bucket so the cluster
        // wraps to the front of the table.
        let colliding: Vec<String> = (0..10_000)
            .map(|index| format!("w{}", index))
            .filter(|key| home(hash_key(key), capacity) == capacity - 1)
            .take(3)
            .collect();
        assert_eq!(colliding.len(), 3);
        for key in &colliding {
            map.insert(key, 0u8);
        }
        assert_eq!(map.capacity(), capacity);

        map.remove(&colliding[0]);
        assert!(map.contains_key(&colliding[1]));
        assert!(map.contains_key(&colliding[2]));
        map.remove(&colliding[1]);
        assert!(map.contains_key(&colliding[2]));
        assert_eq!(map.used(), 1);
    }

    #[test]
    fn iter_visits_every_live_key_once() {
        let mut map = KvMap::with_capacity(4);
        for key in ["a", "b", "c", "d", "e"] {
            map.insert(key, key.len());
        }
        map.remove("c");
        let mut keys: Vec<&str> = map.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["a", "b", "d", "e"]);
        assert_eq!(map.iter().count(), map.used());
    }

    #[test]
    fn get_mut_and_clear() {
        let mut map = KvMap::with_capacity(2);
        map.insert("count", 1);
        if let Some(value) = map.get_mut("count") {
            *value += 1;
        }
        assert_eq!(map.get("count"), Some(&2));
        let capacity = map.capacity();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), capacity);
        assert!(map.get("count").is_none());
    }
}
