//! Bounded body cache with LRU eviction.

use std::collections::{HashMap, VecDeque};

use loft_mesh::SolidMesh;
use tracing::debug;

use crate::BodyId;

/// Body to solid map bounded at `capacity`, evicting the least
/// recently used entry on overflow.
#[derive(Debug)]
pub(crate) struct BodyCache {
    capacity: usize,
    solids: HashMap<BodyId, SolidMesh>,
    order: VecDeque<BodyId>,
}

impl BodyCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            solids: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub(crate) fn get(&mut self, id: &BodyId) -> Option<&SolidMesh> {
        if self.solids.contains_key(id) {
            self.touch(id);
            self.solids.get(id)
        } else {
            None
        }
    }

    pub(crate) fn insert(&mut self, id: BodyId, solid: SolidMesh) {
        if self.solids.insert(id, solid).is_some() {
            self.touch(&id);
        } else {
            self.order.push_back(id);
            if self.order.len() > self.capacity {
                if let Some(evicted) = self.order.pop_front() {
                    self.solids.remove(&evicted);
                    debug!(?evicted, "evicted body from cache");
                }
            }
        }
    }

    pub(crate) fn contains(&self, id: &BodyId) -> bool {
        self.solids.contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.solids.len()
    }

    fn touch(&mut self, id: &BodyId) {
        if let Some(pos) = self.order.iter().position(|x| x == id) {
            self.order.remove(pos);
            self.order.push_back(*id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid() -> SolidMesh {
        SolidMesh::new()
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = BodyCache::new(2);
        cache.insert(BodyId(1), solid());
        cache.insert(BodyId(2), solid());
        // Touch body 1 so body 2 is the eviction candidate
        assert!(cache.get(&BodyId(1)).is_some());
        cache.insert(BodyId(3), solid());
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&BodyId(1)));
        assert!(!cache.contains(&BodyId(2)));
        assert!(cache.contains(&BodyId(3)));
    }

    #[test]
    fn test_reinsert_updates_without_growth() {
        let mut cache = BodyCache::new(2);
        cache.insert(BodyId(1), solid());
        cache.insert(BodyId(1), solid());
        assert_eq!(cache.len(), 1);
    }
}
