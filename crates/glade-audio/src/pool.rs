//! Channel bookkeeping for proximity audio

use std::collections::{HashMap, HashSet};

use glade_core::{EntityId, GladeError, Result};

use crate::backend::SourceId;

/// Every pooled source is either available or assigned to exactly one entity.
///
/// Available sources are handed out last-in first-out.
#[derive(Debug, Clone)]
pub struct AudioChannelPool {
    available: Vec<SourceId>,
    assigned: HashMap<EntityId, SourceId>,
    total: usize,
}

impl AudioChannelPool {
    pub fn new(sources: Vec<SourceId>) -> Self {
        Self {
            total: sources.len(),
            available: sources,
            assigned: HashMap::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn available(&self) -> usize {
        self.available.len()
    }

    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_assigned(&self, entity: EntityId) -> bool {
        self.assigned.contains_key(&entity)
    }

    pub fn source_of(&self, entity: EntityId) -> Option<SourceId> {
        self.assigned.get(&entity).copied()
    }

    /// Give `entity` a source, keeping the one it already has.
    /// Returns `None` when the pool is exhausted.
    pub fn assign(&mut self, entity: EntityId) -> Option<SourceId> {
        if let Some(source) = self.source_of(entity) {
            return Some(source);
        }
        let source = self.available.pop()?;
        self.assigned.insert(entity, source);
        log::debug!("Assigned {} to entity {}", source, entity);
        Some(source)
    }

    /// Take the source back from `entity`
    pub fn reclaim(&mut self, entity: EntityId) -> Option<SourceId> {
        let source = self.assigned.remove(&entity)?;
        self.available.push(source);
        log::debug!("Reclaimed {} from entity {}", source, entity);
        Some(source)
    }

    /// Current assignments, in no particular order
    pub fn assignments(&self) -> impl Iterator<Item = (EntityId, SourceId)> + '_ {
        self.assigned.iter().map(|(e, s)| (*e, *s))
    }

    /// Verify that every source is held exactly once
    pub fn check_conservation(&self) -> Result<()> {
        let held = self.available.len() + self.assigned.len();
        if held != self.total {
            return Err(GladeError::ValidationError(format!(
                "audio pool holds {} sources, expected {}",
                held, self.total
            )));
        }
        let mut seen = HashSet::with_capacity(self.total);
        for source in self.available.iter().chain(self.assigned.values()) {
            if !seen.insert(*source) {
                return Err(GladeError::ValidationError(format!(
                    "{} is held twice by the audio pool",
                    source
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: u32) -> AudioChannelPool {
        AudioChannelPool::new((0..n).map(SourceId).collect())
    }

    #[test]
    fn test_assign_is_lifo_and_sticky() {
        let mut pool = pool(3);
        let a = EntityId::from_raw(1);
        assert_eq!(pool.assign(a), Some(SourceId(2)));
        assert_eq!(pool.assign(a), Some(SourceId(2)));
        assert_eq!(pool.available(), 2);

        pool.reclaim(a);
        assert_eq!(pool.assign(EntityId::from_raw(2)), Some(SourceId(2)));
    }

    #[test]
    fn test_exhausted_pool_returns_none() {
        let mut pool = pool(1);
        assert!(pool.assign(EntityId::from_raw(1)).is_some());
        assert_eq!(pool.assign(EntityId::from_raw(2)), None);
        assert!(!pool.is_assigned(EntityId::from_raw(2)));
        pool.check_conservation().unwrap();
    }

    #[test]
    fn test_reclaim_unassigned_is_noop() {
        let mut pool = pool(2);
        assert_eq!(pool.reclaim(EntityId::from_raw(5)), None);
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn test_conservation_detects_duplicates() {
        let mut pool = AudioChannelPool::new(vec![SourceId(0), SourceId(0)]);
        assert!(pool.check_conservation().is_err());
        pool.assign(EntityId::from_raw(1));
        assert!(pool.check_conservation().is_err());
    }

    #[test]
    fn test_conservation_over_many_operations() {
        let mut pool = pool(4);
        for i in 0..50u64 {
            let entity = EntityId::from_raw(i % 7);
            if i % 3 == 0 {
                pool.reclaim(entity);
            } else {
                pool.assign(entity);
            }
            pool.check_conservation().unwrap();
            assert_eq!(pool.available() + pool.assigned_count(), pool.total());
        }
    }
}
