use crate::diagnostics::Diagnostic;

const INITIAL_CAPACITY: usize = 8;
const REHASH_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone)]
enum Slot {
    Unused,
    InUse { key: String, value: f64 },
    Deleted,
}

/// The session's variable store: an open-addressing hash table from
/// variable names to values, with linear probing and deletion tombstones.
/// Capacity is always a power of two, starting at 8 and doubling whenever
/// the load factor (in-use plus tombstoned slots, over capacity) exceeds
/// 0.6 after an insert.
#[derive(Debug)]
pub struct Environment {
    slots: Vec<Slot>,
    stored: usize,
    deleted: usize,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot::Unused; INITIAL_CAPACITY],
            stored: 0,
            deleted: 0,
        }
    }

    /// Number of bindings currently stored.
    pub fn len(&self) -> usize {
        self.stored
    }

    pub fn is_empty(&self) -> bool {
        self.stored == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn load_factor(&self) -> f64 {
        (self.stored + self.deleted) as f64 / self.slots.len() as f64
    }

    pub fn contains(&self, key: &str) -> bool {
        self.retrieve(key).is_some()
    }

    /// Looks a name up by probing from its home slot. Tombstones are
    /// passed through; an unused slot (or a full sweep) is a miss.
    pub fn retrieve(&self, key: &str) -> Option<f64> {
        let capacity = self.slots.len();
        let mut index = hash(key, capacity);
        for _ in 0..capacity {
            match &self.slots[index] {
                Slot::Unused => return None,
                Slot::InUse { key: existing, value } if existing == key => {
                    return Some(*value);
                }
                _ => {}
            }
            index = (index + 1) % capacity;
        }
        None
    }

    /// Inserts or updates a binding. NaN is not a storable value; storing
    /// it is a no-op. A new key lands in the first tombstone seen on its
    /// probe chain (reclaiming it) or, failing that, the first unused slot.
    pub fn store(&mut self, key: &str, value: f64) {
        if value.is_nan() {
            return;
        }

        let capacity = self.slots.len();
        let mut index = hash(key, capacity);
        let mut tombstone = None;
        let mut unused = None;
        for _ in 0..capacity {
            match &mut self.slots[index] {
                Slot::InUse { key: existing, value: stored } if existing.as_str() == key => {
                    *stored = value;
                    return;
                }
                Slot::InUse { .. } => {}
                Slot::Deleted => {
                    if tombstone.is_none() {
                        tombstone = Some(index);
                    }
                }
                Slot::Unused => {
                    unused = Some(index);
                    break;
                }
            }
            index = (index + 1) % capacity;
        }

        match tombstone.or(unused) {
            Some(target) => {
                if matches!(self.slots[target], Slot::Deleted) {
                    self.deleted -= 1;
                }
                self.slots[target] = Slot::InUse {
                    key: key.to_string(),
                    value,
                };
                self.stored += 1;
                if self.load_factor() > REHASH_THRESHOLD {
                    self.rehash();
                }
            }
            None => {
                // Every slot holds another live key; the load ceiling
                // normally rules this out. Grow and retry.
                self.rehash();
                self.store(key, value);
            }
        }
    }

    /// Removes a binding, tombstoning its slot. A miss is reported as a
    /// diagnostic but is never fatal.
    pub fn remove(&mut self, key: &str) -> Result<(), Diagnostic> {
        let capacity = self.slots.len();
        let mut index = hash(key, capacity);
        let mut found = None;
        for _ in 0..capacity {
            match &self.slots[index] {
                Slot::Unused => break,
                Slot::InUse { key: existing, .. } if existing == key => {
                    found = Some(index);
                    break;
                }
                _ => {}
            }
            index = (index + 1) % capacity;
        }
        match found {
            Some(index) => {
                self.slots[index] = Slot::Deleted;
                self.stored -= 1;
                self.deleted += 1;
                Ok(())
            }
            None => Err(Diagnostic::runtime(format!(
                "cannot delete `{key}`: no such variable"
            ))),
        }
    }

    /// Visits every live binding in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::InUse { key, value } => Some((key.as_str(), *value)),
            _ => None,
        })
    }

    /// Doubles capacity, reinserting live entries against the new table and
    /// discarding every tombstone.
    fn rehash(&mut self) {
        let new_capacity = self.slots.len() * 2;
        let old = std::mem::replace(&mut self.slots, vec![Slot::Unused; new_capacity]);
        self.deleted = 0;
        for slot in old {
            if let Slot::InUse { key, value } = slot {
                let mut index = hash(&key, new_capacity);
                while matches!(self.slots[index], Slot::InUse { .. }) {
                    index = (index + 1) % new_capacity;
                }
                self.slots[index] = Slot::InUse { key, value };
            }
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

// Multiplicative string hash with deterministic, per-process-stable output:
// seed from the first byte, fold left to right with a large odd multiplier,
// then mix in the length.
fn hash(key: &str, capacity: usize) -> usize {
    let bytes = key.as_bytes();
    let Some(&first) = bytes.first() else {
        return 0;
    };
    let mut state = (first as u64) << 7;
    for &byte in bytes {
        state = state.wrapping_mul(1_000_003) ^ byte as u64;
    }
    state ^= bytes.len() as u64;
    (state % capacity as u64) as usize
}
