use std::any::Any;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Typed key into a [`Blackboard`].
///
/// Keys are plain u64 ids carrying the value type as a phantom; collisions
/// between ids of different types are a programming error surfaced by the
/// accessors.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    id: u64,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(id: u64) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    pub fn id(self) -> u64 {
        self.id
    }
}

/// Shared scratch space owned by a tree.
///
/// Abort conditions read it, tasks may read and write it, and tree events
/// route through it. Deliberately minimal: a typed map with no change
/// notification.
#[derive(Default)]
pub struct Blackboard {
    values: BTreeMap<u64, Box<dyn Any>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn contains<T: 'static>(&self, key: BbKey<T>) -> bool {
        self.values.contains_key(&key.id)
    }

    pub fn set<T: 'static>(&mut self, key: BbKey<T>, value: T) {
        self.values.insert(key.id, Box::new(value));
    }

    pub fn get<T: 'static>(&self, key: BbKey<T>) -> Option<&T> {
        let value = self.values.get(&key.id)?;
        value.downcast_ref::<T>().or_else(|| {
            panic!(
                "blackboard type mismatch for key id={} (stored type differs from requested)",
                key.id
            )
        })
    }

    pub fn get_mut<T: 'static>(&mut self, key: BbKey<T>) -> Option<&mut T> {
        let value = self.values.get_mut(&key.id)?;
        value.downcast_mut::<T>().or_else(|| {
            panic!(
                "blackboard type mismatch for key id={} (stored type differs from requested)",
                key.id
            )
        })
    }

    pub fn remove<T: 'static>(&mut self, key: BbKey<T>) -> Option<T> {
        let value = self.values.remove(&key.id)?;
        value.downcast::<T>().map(|b| *b).ok().or_else(|| {
            panic!(
                "blackboard type mismatch for key id={} (stored type differs from requested)",
                key.id
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTER: BbKey<u32> = BbKey::new(1);
    const LABEL: BbKey<&'static str> = BbKey::new(2);

    #[test]
    fn set_then_get_round_trips() {
        let mut bb = Blackboard::new();
        bb.set(COUNTER, 7);
        assert_eq!(bb.get(COUNTER), Some(&7));
        assert!(bb.contains(COUNTER));
    }

    #[test]
    fn missing_key_is_none() {
        let bb = Blackboard::new();
        assert_eq!(bb.get(COUNTER), None);
        assert!(!bb.contains(COUNTER));
    }

    #[test]
    fn get_mut_mutates_in_place() {
        let mut bb = Blackboard::new();
        bb.set(COUNTER, 1);
        if let Some(v) = bb.get_mut(COUNTER) {
            *v += 1;
        }
        assert_eq!(bb.get(COUNTER), Some(&2));
    }

    #[test]
    fn remove_takes_the_value_out() {
        let mut bb = Blackboard::new();
        bb.set(LABEL, "idle");
        assert_eq!(bb.remove(LABEL), Some("idle"));
        assert!(!bb.contains(LABEL));
    }

    #[test]
    #[should_panic(expected = "type mismatch")]
    fn mismatched_type_for_present_id_panics() {
        let mut bb = Blackboard::new();
        bb.set(COUNTER, 1u32);
        let wrong: BbKey<i64> = BbKey::new(1);
        let _ = bb.get(wrong);
    }
}
