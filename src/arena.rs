//! A minimal generational arena. Used wherever spec.md §9 calls for
//! "arena + index" instead of owning references, so that cyclic structures
//! (`NavShape.parent/children`, `NavElement.groupId`) never need `Rc`/`RefCell`.

use std::marker::PhantomData;

/// A `Copy` handle into an [`Arena<T>`]. Carries a generation counter so a
/// handle to a removed slot is never silently mistaken for the slot that
/// replaced it.
#[derive(Debug)]
pub struct Index<T> {
    slot: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Index<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Index<T> {}
impl<T> PartialEq for Index<T> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot && self.generation == other.generation
    }
}
impl<T> Eq for Index<T> {}
impl<T> std::hash::Hash for Index<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
        self.generation.hash(state);
    }
}
impl<T> std::fmt::Display for Index<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.slot)
    }
}

impl<T> Index<T> {
    /// The arena slot this handle points at, exposed for callers that need a
    /// stable total order over handles (e.g. canonicalising an undirected
    /// edge key) without parsing the `Display` string.
    pub(crate) fn raw(self) -> u32 {
        self.slot
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// A generational arena: stable, `Copy`-able indices into a `Vec`-backed
/// store, with O(1) removal and reuse of freed slots.
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> Index<T> {
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.value = Some(value);
            Index {
                slot,
                generation: entry.generation,
                _marker: PhantomData,
            }
        } else {
            let slot = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
            Index {
                slot,
                generation: 0,
                _marker: PhantomData,
            }
        }
    }

    pub fn remove(&mut self, index: Index<T>) -> Option<T> {
        let entry = self.slots.get_mut(index.slot as usize)?;
        if entry.generation != index.generation {
            return None;
        }
        let taken = entry.value.take();
        if taken.is_some() {
            entry.generation = entry.generation.wrapping_add(1);
            self.free.push(index.slot);
        }
        taken
    }

    pub fn get(&self, index: Index<T>) -> Option<&T> {
        self.slots
            .get(index.slot as usize)
            .filter(|s| s.generation == index.generation)
            .and_then(|s| s.value.as_ref())
    }

    pub fn get_mut(&mut self, index: Index<T>) -> Option<&mut T> {
        self.slots
            .get_mut(index.slot as usize)
            .filter(|s| s.generation == index.generation)
            .and_then(|s| s.value.as_mut())
    }

    pub fn contains(&self, index: Index<T>) -> bool {
        self.get(index).is_some()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.value.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Index<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(slot, s)| {
            s.value.as_ref().map(|v| {
                (
                    Index {
                        slot: slot as u32,
                        generation: s.generation,
                        _marker: PhantomData,
                    },
                    v,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Index<T>, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(slot, s)| {
            let generation = s.generation;
            s.value.as_mut().map(|v| {
                (
                    Index {
                        slot: slot as u32,
                        generation,
                        _marker: PhantomData,
                    },
                    v,
                )
            })
        })
    }
}

impl<T> std::ops::Index<Index<T>> for Arena<T> {
    type Output = T;
    fn index(&self, index: Index<T>) -> &T {
        self.get(index).expect("stale or invalid arena index")
    }
}

impl<T> std::ops::IndexMut<Index<T>> for Arena<T> {
    fn index_mut(&mut self, index: Index<T>) -> &mut T {
        self.get_mut(index).expect("stale or invalid arena index")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove_round_trip() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.remove(a), Some("a"));
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.get(b), Some(&"b"));
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        arena.remove(a);
        let c = arena.insert(2);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(c), Some(&2));
    }
}
