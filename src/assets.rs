use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Typed key into an [`AssetManager`].
pub struct Handle<T> {
    id: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(id: u64) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> std::hash::Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.id)
    }
}

struct Slot<T> {
    asset: T,
    generation: u64,
}

/// Owns loaded assets. Replacing an asset bumps its generation so GPU caches
/// know to upload it again.
pub struct AssetManager<T> {
    assets: HashMap<u64, Slot<T>>,
    next_id: u64,
}

impl<T> Default for AssetManager<T> {
    fn default() -> Self {
        Self {
            assets: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<T> AssetManager<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset: T) -> Handle<T> {
        let id = self.next_id;
        self.next_id += 1;
        self.assets.insert(
            id,
            Slot {
                asset,
                generation: 0,
            },
        );
        Handle::new(id)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.assets.get(&handle.id).map(|slot| &slot.asset)
    }

    /// Mutable access. Counts as a modification, so the generation advances.
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.assets.get_mut(&handle.id).map(|slot| {
            slot.generation += 1;
            &mut slot.asset
        })
    }

    /// Current generation of the asset behind `handle`.
    pub fn generation(&self, handle: Handle<T>) -> Option<u64> {
        self.assets.get(&handle.id).map(|slot| slot.generation)
    }

    /// Swaps in a new asset, returning `false` if the handle is stale.
    pub fn replace(&mut self, handle: Handle<T>, asset: T) -> bool {
        match self.assets.get_mut(&handle.id) {
            Some(slot) => {
                slot.asset = asset;
                slot.generation += 1;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        self.assets.remove(&handle.id).map(|slot| slot.asset)
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.assets.contains_key(&handle.id)
    }

    /// Drops every asset. Handles issued before the call stay invalid.
    pub fn clear(&mut self) {
        self.assets.clear();
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_bumps_generation() {
        let mut assets = AssetManager::new();
        let handle = assets.insert("a");
        assert_eq!(assets.generation(handle), Some(0));
        assert!(assets.replace(handle, "b"));
        assert_eq!(assets.get(handle), Some(&"b"));
        assert_eq!(assets.generation(handle), Some(1));
    }

    #[test]
    fn get_mut_counts_as_modification() {
        let mut assets = AssetManager::new();
        let handle = assets.insert(vec![1, 2]);
        if let Some(values) = assets.get_mut(handle) {
            values.push(3);
        }
        assert_eq!(assets.get(handle).map(Vec::len), Some(3));
        assert_eq!(assets.generation(handle), Some(1));
    }

    #[test]
    fn handles_are_not_reused_after_clear() {
        let mut assets = AssetManager::new();
        let first = assets.insert(1);
        assets.clear();
        let second = assets.insert(2);
        assert_ne!(first, second);
        assert!(assets.get(first).is_none());
        assert!(!assets.replace(first, 3));
    }

    #[test]
    fn remove_returns_asset() {
        let mut assets = AssetManager::new();
        let handle = assets.insert(String::from("mesh"));
        assert_eq!(assets.remove(handle).as_deref(), Some("mesh"));
        assert!(assets.is_empty());
    }
}
